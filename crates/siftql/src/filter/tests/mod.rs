
use crate::filter::{BoolOp, Clause, Filter, FilterNode};

fn clause(field: &str) -> Filter {
    Filter::from(Clause::eq(field, "foo"))
}

#[test]
fn bool_op_parses_case_insensitively() {
    assert_eq!(BoolOp::parse("and"), Some(BoolOp::And));
    assert_eq!(BoolOp::parse("AND"), Some(BoolOp::And));
    assert_eq!(BoolOp::parse("Or"), Some(BoolOp::Or));
    assert_eq!(BoolOp::parse("xor"), None);
    assert_eq!(BoolOp::And.as_str(), "and");
    assert_eq!(BoolOp::Or.opposite(), BoolOp::And);
}

#[test]
fn constructors_build_the_expected_clauses() {
    let c = Clause::eq("name", "test");
    assert_eq!((c.field.as_str(), c.cmp.as_str()), ("name", "="));

    let c = Clause::between("age", 18, 65);
    assert_eq!(c.cmp, "between");
    assert_eq!(
        c.value,
        crate::value::Value::List(vec![18.into(), 65.into()])
    );

    let c = Clause::in_iter("status", ["a", "b"]);
    assert_eq!(c.cmp, "in");
    assert_eq!(
        c.value,
        crate::value::Value::List(vec!["a".into(), "b".into()])
    );
}

#[test]
fn same_operator_addition_appends_without_demotion() {
    let base = clause("a").and(Clause::eq("b", "bar"));

    assert_eq!(base.op, BoolOp::And);
    assert_eq!(base.children.len(), 2);
}

#[test]
fn opposite_operator_addition_demotes_the_base() {
    let base = clause("a").and(Clause::eq("b", "bar"));
    let mixed = base.or(Clause::eq("c", "baz"));

    assert_eq!(mixed.op, BoolOp::Or);
    assert_eq!(mixed.children.len(), 2);

    // The whole original and-tree survives as the first child.
    match &mixed.children[0] {
        FilterNode::Filter(demoted) => {
            assert_eq!(demoted.op, BoolOp::And);
            assert_eq!(demoted.children.len(), 2);
        }
        FilterNode::Clause(_) => panic!("expected the demoted base tree"),
    }
}

#[test]
fn top_level_operator_always_matches_the_joining_operator() {
    let or_tree = Filter::new(BoolOp::Or, vec![Clause::eq("a", 1).into()]);

    assert_eq!(or_tree.and(Clause::eq("b", 2)).op, BoolOp::And);
    assert_eq!(or_tree.or(Clause::eq("b", 2)).op, BoolOp::Or);
}

#[test]
fn or_joining_an_and_tree_appends_it_as_a_child() {
    let or_tree = Filter::new(BoolOp::Or, vec![Clause::eq("a", 1).into()]);
    let addition = Filter::from(Clause::eq("b", 2));

    let combined = or_tree.or(addition.clone());

    assert_eq!(combined.op, BoolOp::Or);
    assert_eq!(combined.children.len(), 2);
    assert_eq!(combined.children[1], FilterNode::Filter(addition));
}

#[test]
fn combinators_never_mutate_their_inputs() {
    let base = clause("a").and(Clause::eq("b", "bar"));
    let snapshot = base.clone();

    let _anded = base.and(Clause::eq("x", 1));
    let _ored = base.or(Clause::eq("y", 2));

    assert_eq!(base, snapshot);
}

#[test]
fn node_sequences_convert_to_and_trees() {
    let filter: Filter = vec![
        FilterNode::Clause(Clause::eq("a", 1)),
        FilterNode::Clause(Clause::eq("b", 2)),
    ]
    .into();

    assert_eq!(filter.op, BoolOp::And);
    assert_eq!(filter.children.len(), 2);
}

#[test]
fn bit_operators_delegate_to_the_combination_rule() {
    let combined = clause("a") & clause("b");
    assert_eq!(combined.op, BoolOp::And);

    let combined = clause("a") | clause("b");
    assert_eq!(combined.op, BoolOp::Or);
}

#[test]
fn map_fields_leaves_unmapped_names_untouched() {
    let map = [("name", "n"), ("age", "a")]
        .into_iter()
        .collect::<crate::filter::FieldMap>();

    let filter = clause("name").and(Clause::gt("height", 180));
    let mapped = filter.map_fields(&map);

    assert!(mapped.contains_field("n"));
    assert!(mapped.contains_field("height"));
    assert!(!mapped.contains_field("name"));

    // The input tree is untouched.
    assert!(filter.contains_field("name"));
}

#[test]
fn map_fields_composes_order_dependently() {
    let first = [("a", "b")].into_iter().collect::<crate::filter::FieldMap>();
    let second = [("b", "c")].into_iter().collect::<crate::filter::FieldMap>();

    let mapped = clause("a").map_fields(&first).map_fields(&second);
    assert!(mapped.contains_field("c"));

    let mapped = clause("a").map_fields(&second).map_fields(&first);
    assert!(mapped.contains_field("b"));
}

#[test]
fn field_lookup_recurses_into_subtrees() {
    let filter = clause("outer").or(clause("inner"));

    assert!(filter.contains_field("outer"));
    assert!(filter.contains_field("inner"));
    assert!(!filter.contains_field("missing"));
    assert_eq!(filter.clauses_for("inner").len(), 1);
}
