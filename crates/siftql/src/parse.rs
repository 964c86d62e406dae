use crate::{
    MAX_FILTER_DEPTH,
    error::{Error, FilterError},
    filter::{BoolOp, Clause, Filter, FilterNode},
    spec::DomainSpec,
    validate::{Obstruction, validate_filter},
    value::Value,
};

const TREE_KEY_OPERATOR: &str = "o";
const TREE_KEY_CHILDREN: &str = "v";

/// Parse filter text into a canonical tree.
///
/// Blank input (empty or all-whitespace) is the "no filter" signal and
/// yields `Ok(None)`; it is not an error.
pub(crate) fn parse_text(raw: &str, spec: &DomainSpec) -> Result<Option<Filter>, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let doc: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|err| FilterError::InvalidJson {
            raw: raw.to_string(),
            message: err.to_string(),
        })?;

    parse_document(&doc, spec, raw).map(Some)
}

/// Parse an already-decoded document into a canonical tree.
///
/// Structural failures (wrong shape, excessive depth) fail fast; semantic
/// violations are accumulated across the entire tree and reported together
/// as one `Obstructions` failure. On success the tree is fully valid — there
/// is no partial state.
pub(crate) fn parse_document(
    doc: &serde_json::Value,
    spec: &DomainSpec,
    raw: &str,
) -> Result<Filter, Error> {
    if !doc.is_object() && !doc.is_array() {
        return Err(FilterError::NonObject {
            raw: raw.to_string(),
        }
        .into());
    }

    let mut obstructions = Vec::new();
    let filter = normalize(doc, raw, &mut obstructions)?;
    obstructions.extend(validate_filter(&filter, spec));

    if obstructions.is_empty() {
        Ok(filter)
    } else {
        Err(FilterError::Obstructions(obstructions).into())
    }
}

/// Normalize the three accepted input shapes into canonical tree form with
/// default operator `and`:
///
/// 1. a clause triple `[field, cmp, value]`
/// 2. a flat sequence of nodes (triples and/or tree objects)
/// 3. a tree object `{"o": ..., "v": [...]}`
fn normalize(
    doc: &serde_json::Value,
    raw: &str,
    obstructions: &mut Vec<Obstruction>,
) -> Result<Filter, Error> {
    if let Some(clause) = decode_clause(doc) {
        return Ok(Filter::from(clause));
    }

    if let Some(items) = doc.as_array() {
        let children = decode_children(items, raw, obstructions, 2)?;
        return Ok(Filter::new(BoolOp::And, children));
    }

    if is_tree_object(doc) {
        return decode_tree(doc, raw, obstructions, 1);
    }

    Err(malformed(raw))
}

// The `"v"`-key test that distinguishes a tree object from anything else
// during recursive descent.
fn is_tree_object(doc: &serde_json::Value) -> bool {
    doc.as_object()
        .is_some_and(|object| object.contains_key(TREE_KEY_CHILDREN))
}

/// Decode a tree object. `depth` is the tree's nesting level, guarded
/// against pathological input so hostile nesting fails cleanly instead of
/// exhausting the stack.
fn decode_tree(
    doc: &serde_json::Value,
    raw: &str,
    obstructions: &mut Vec<Obstruction>,
    depth: usize,
) -> Result<Filter, Error> {
    if depth > MAX_FILTER_DEPTH {
        return Err(FilterError::DepthExceeded {
            max: MAX_FILTER_DEPTH,
        }
        .into());
    }

    // Callers only enter here through is_tree_object.
    let Some(object) = doc.as_object() else {
        return Err(malformed(raw));
    };

    // An unrecognized combinator is not a structural failure: record the
    // obstruction and keep descending under `and` so every deeper violation
    // is still collected. The substituted tree is discarded with the error.
    let op = match object.get(TREE_KEY_OPERATOR) {
        None => BoolOp::And,
        Some(serde_json::Value::String(s)) => BoolOp::parse(s).unwrap_or_else(|| {
            obstructions.push(Obstruction::invalid_bool_operator(s));
            BoolOp::And
        }),
        Some(other) => {
            obstructions.push(Obstruction::invalid_bool_operator(&other.to_string()));
            BoolOp::And
        }
    };

    let Some(items) = object.get(TREE_KEY_CHILDREN).and_then(|v| v.as_array()) else {
        return Err(malformed(raw));
    };

    let children = decode_children(items, raw, obstructions, depth + 1)?;

    Ok(Filter::new(op, children))
}

// Decode a node sequence; `depth` is the nesting level of any tree objects
// found among the items.
fn decode_children(
    items: &[serde_json::Value],
    raw: &str,
    obstructions: &mut Vec<Obstruction>,
    depth: usize,
) -> Result<Vec<FilterNode>, Error> {
    let mut children = Vec::with_capacity(items.len());

    for item in items {
        if let Some(clause) = decode_clause(item) {
            children.push(FilterNode::Clause(clause));
        } else if is_tree_object(item) {
            children.push(FilterNode::Filter(decode_tree(
                item,
                raw,
                obstructions,
                depth,
            )?));
        } else {
            return Err(malformed(raw));
        }
    }

    Ok(children)
}

// A clause triple is `[string, string, scalar-or-array]`. JSON objects in
// value position are not representable and make the triple (and therefore
// the input) malformed.
fn decode_clause(doc: &serde_json::Value) -> Option<Clause> {
    let items = doc.as_array()?;
    if items.len() != 3 {
        return None;
    }

    let field = items[0].as_str()?;
    let cmp = items[1].as_str()?;
    let value = Value::from_json(&items[2])?;

    Some(Clause::new(field, cmp, value))
}

fn malformed(raw: &str) -> Error {
    FilterError::MalformedInput {
        raw: raw.to_string(),
    }
    .into()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: &str) -> Result<Option<Filter>, Error> {
        parse_text(raw, &DomainSpec::default())
    }

    #[test]
    fn blank_input_is_the_no_filter_signal() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("     ").unwrap(), None);
        assert_eq!(parse("   \n\n  ").unwrap(), None);
    }

    #[test]
    fn invalid_json_fails_with_the_original_text() {
        let err = parse("not a good query").unwrap_err();
        assert_eq!(err.subcode(), "InvalidJson");
        assert!(err.to_string().contains("not a good query"));
    }

    #[test]
    fn non_container_documents_are_rejected() {
        for raw in ["false", "true", "null", "42", "\"some string\""] {
            let err = parse(raw).unwrap_err();
            assert_eq!(err.subcode(), "NonObject", "for input {raw}");
        }
    }

    #[test]
    fn a_clause_triple_wraps_into_an_and_tree() {
        let filter = parse(r#"["name", "=", "test"]"#).unwrap().unwrap();
        assert_eq!(filter, Filter::from(Clause::eq("name", "test")));
    }

    #[test]
    fn a_node_sequence_wraps_into_an_and_tree() {
        let filter = parse(r#"[["name", "=", "test"], ["age", ">", 30]]"#)
            .unwrap()
            .unwrap();

        assert_eq!(filter.op, BoolOp::And);
        assert_eq!(filter.children.len(), 2);
    }

    #[test]
    fn an_empty_sequence_is_the_empty_tree() {
        let filter = parse("[]").unwrap().unwrap();
        assert_eq!(filter, Filter::empty());
    }

    #[test]
    fn tree_objects_default_and_lowercase_the_operator() {
        let filter = parse(r#"{ "v": [["name", "=", "test"]] }"#).unwrap().unwrap();
        assert_eq!(filter.op, BoolOp::And);

        let filter = parse(r#"{ "o": "OR", "v": [["name", "=", "test"]] }"#)
            .unwrap()
            .unwrap();
        assert_eq!(filter.op, BoolOp::Or);
    }

    #[test]
    fn nested_trees_decode_recursively() {
        let filter = parse(
            r#"{
                "o": "and",
                "v": [
                    ["name", "=", "test"],
                    { "o": "or", "v": [["age", ">", 30], ["status", "in", ["a", "b"]]] }
                ]
            }"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(filter.children.len(), 2);
        match &filter.children[1] {
            FilterNode::Filter(nested) => {
                assert_eq!(nested.op, BoolOp::Or);
                assert_eq!(nested.children.len(), 2);
            }
            FilterNode::Clause(_) => panic!("expected nested tree"),
        }
    }

    #[test]
    fn malformed_shapes_are_rejected() {
        for raw in [
            r#"{ "v": ["one", "two", "three", "four"] }"#,
            r#"["one", "two", "three", "four"]"#,
            r#"{ "v": "not correct" }"#,
            r#"{ "nope": [] }"#,
            r#"["name", "=", {"bad": "value"}]"#,
        ] {
            let err = parse(raw).unwrap_err();
            assert_eq!(err.subcode(), "MalformedInputObject", "for input {raw}");
        }
    }

    #[test]
    fn unrecognized_bool_operator_is_an_obstruction_not_a_parse_failure() {
        let err = parse(r#"{ "o": "xor", "v": [["name", "=", "test"], ["f", "bogus", 1]] }"#)
            .unwrap_err();

        assert_eq!(err.subcode(), "Obstructions");
        let obstructions = err.obstructions().unwrap();
        // Descent continued: the bad combinator AND the deeper bad operator
        // were both collected.
        assert_eq!(obstructions.len(), 2);
        assert_eq!(obstructions[0].code.as_str(), "DslQueryInvalidOperator");
    }

    #[test]
    fn depth_guard_rejects_pathological_nesting() {
        let mut doc = json!({ "v": [["name", "=", "test"]] });
        for _ in 0..(MAX_FILTER_DEPTH + 1) {
            doc = json!({ "v": [doc] });
        }

        let err = parse_document(&doc, &DomainSpec::default(), "nested").unwrap_err();
        assert_eq!(err.subcode(), "DepthExceeded");
    }

    #[test]
    fn nesting_below_the_guard_parses() {
        let mut doc = json!({ "v": [["name", "=", "test"]] });
        for _ in 0..(MAX_FILTER_DEPTH / 2) {
            doc = json!({ "v": [doc] });
        }

        assert!(parse_document(&doc, &DomainSpec::default(), "nested").is_ok());
    }

    #[test]
    fn semantic_violations_merge_into_one_failure() {
        let spec = DomainSpec::new([("name".to_string(), vec!["=".to_string()])]);
        let err = parse_document(
            &json!([["name", "!=", "x"], ["ghost", "=", 1]]),
            &spec,
            "raw",
        )
        .unwrap_err();

        assert_eq!(err.code(), "BAD_FILTER");
        assert_eq!(err.subcode(), "Obstructions");
        assert_eq!(err.obstructions().map(<[Obstruction]>::len), Some(2));
    }
}
