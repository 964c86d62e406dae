use crate::value::Value;
use derive_more::{Deref, DerefMut};
use std::{
    collections::BTreeMap,
    fmt,
    ops::{BitAnd, BitOr},
};

///
/// BoolOp
///
/// The boolean combinator of a filter tree. Always stored lower-case;
/// parsed case-insensitively.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BoolOp {
    #[default]
    And,
    Or,
}

impl BoolOp {
    /// Parse an operator string, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("and") {
            Some(Self::And)
        } else if s.eq_ignore_ascii_case("or") {
            Some(Self::Or)
        } else {
            None
        }
    }

    /// The canonical lower-case operator token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::And => Self::Or,
            Self::Or => Self::And,
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

///
/// Clause
///
/// One comparison predicate: `field cmp value`. Immutable once constructed.
///
/// The comparison operator is an open string rather than a closed enum: the
/// permitted vocabulary is declared per deployment by a [`DomainSpec`] and
/// enforced during validation, not at construction.
///
/// [`DomainSpec`]: crate::spec::DomainSpec
///

#[derive(Clone, Debug, PartialEq)]
pub struct Clause {
    pub field: String,
    pub cmp: String,
    pub value: Value,
}

impl Clause {
    #[must_use]
    pub fn new(field: impl Into<String>, cmp: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            cmp: cmp.into(),
            value: value.into(),
        }
    }

    // --- Equality ---

    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, "=", value)
    }

    #[must_use]
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, "!=", value)
    }

    // --- Ordering ---

    #[must_use]
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, "<", value)
    }

    #[must_use]
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, "<=", value)
    }

    #[must_use]
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, ">", value)
    }

    #[must_use]
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, ">=", value)
    }

    // --- Text ---

    #[must_use]
    pub fn like(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, "like", value)
    }

    #[must_use]
    pub fn not_like(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, "not like", value)
    }

    // --- Membership / Range ---

    #[must_use]
    pub fn in_iter<I>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::new(
            field,
            "in",
            Value::List(values.into_iter().map(Into::into).collect()),
        )
    }

    #[must_use]
    pub fn not_in_iter<I>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::new(
            field,
            "not in",
            Value::List(values.into_iter().map(Into::into).collect()),
        )
    }

    #[must_use]
    pub fn between(
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::new(field, "between", Value::List(vec![low.into(), high.into()]))
    }
}

///
/// FilterNode
///
/// One child of a filter tree: either a comparison clause or a nested
/// subtree. The explicit sum replaces shape-probing at every use site;
/// variants are discriminated once, at the parse boundary.
///

#[derive(Clone, Debug, PartialEq)]
pub enum FilterNode {
    Clause(Clause),
    Filter(Filter),
}

impl From<Clause> for FilterNode {
    fn from(clause: Clause) -> Self {
        Self::Clause(clause)
    }
}

impl From<Filter> for FilterNode {
    fn from(filter: Filter) -> Self {
        Self::Filter(filter)
    }
}

///
/// Filter
///
/// The canonical filter tree: an ordered boolean combination of child nodes.
///
/// Child order is semantically significant for rendering — fragments and
/// bound values are emitted in exactly this order. `children` may be empty;
/// an empty tree renders to an empty clause with no parameters.
///
/// Combinators never mutate their inputs: `and`/`or` take `&self` and return
/// a fresh tree, so any `Filter` already handed out stays valid and
/// unchanged for concurrent readers.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    pub op: BoolOp,
    pub children: Vec<FilterNode>,
}

impl Filter {
    #[must_use]
    pub const fn new(op: BoolOp, children: Vec<FilterNode>) -> Self {
        Self { op, children }
    }

    /// The empty and-tree: the identity element for composition.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            op: BoolOp::And,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Combine with another filter under `and`.
    ///
    /// A bare [`Clause`] or node sequence converts via `Into<Filter>` by
    /// wrapping in an and-tree first.
    #[must_use]
    pub fn and(&self, addition: impl Into<Self>) -> Self {
        self.combine(addition.into(), BoolOp::And)
    }

    /// Combine with another filter under `or`.
    #[must_use]
    pub fn or(&self, addition: impl Into<Self>) -> Self {
        self.combine(addition.into(), BoolOp::Or)
    }

    /// The combination rule shared by [`and`](Self::and) and
    /// [`or`](Self::or).
    ///
    /// If the base tree's operator is the opposite of the joining operator,
    /// the whole base is demoted one level under a fresh `joining` wrapper so
    /// the existing grouping is preserved losslessly instead of silently
    /// flattening mixed operators. The result's top-level operator therefore
    /// always equals the joining operator, and the addition is appended as
    /// one child subtree.
    fn combine(&self, addition: Self, joining: BoolOp) -> Self {
        let mut base = self.clone();

        if base.op == joining.opposite() {
            base = Self::new(joining, vec![FilterNode::Filter(base)]);
        }
        base.children.push(FilterNode::Filter(addition));

        base
    }

    /// Rewrite field names throughout the tree.
    ///
    /// Clauses whose field appears in the map get the mapped name; all other
    /// clauses, operators, and values are copied verbatim.
    #[must_use]
    pub fn map_fields(&self, map: &FieldMap) -> Self {
        let children = self
            .children
            .iter()
            .map(|node| match node {
                FilterNode::Clause(clause) => FilterNode::Clause(Clause {
                    field: map
                        .get(&clause.field)
                        .cloned()
                        .unwrap_or_else(|| clause.field.clone()),
                    cmp: clause.cmp.clone(),
                    value: clause.value.clone(),
                }),
                FilterNode::Filter(filter) => FilterNode::Filter(filter.map_fields(map)),
            })
            .collect();

        Self::new(self.op, children)
    }

    /// Whether any clause in the tree compares against `field`.
    #[must_use]
    pub fn contains_field(&self, field: &str) -> bool {
        self.children.iter().any(|node| match node {
            FilterNode::Clause(clause) => clause.field == field,
            FilterNode::Filter(filter) => filter.contains_field(field),
        })
    }

    /// All clauses comparing against `field`, in document order.
    #[must_use]
    pub fn clauses_for(&self, field: &str) -> Vec<&Clause> {
        let mut out = Vec::new();
        self.collect_clauses(field, &mut out);
        out
    }

    fn collect_clauses<'a>(&'a self, field: &str, out: &mut Vec<&'a Clause>) {
        for node in &self.children {
            match node {
                FilterNode::Clause(clause) => {
                    if clause.field == field {
                        out.push(clause);
                    }
                }
                FilterNode::Filter(filter) => filter.collect_clauses(field, out),
            }
        }
    }
}

impl From<Clause> for Filter {
    fn from(clause: Clause) -> Self {
        Self::new(BoolOp::And, vec![FilterNode::Clause(clause)])
    }
}

impl From<Vec<FilterNode>> for Filter {
    fn from(children: Vec<FilterNode>) -> Self {
        Self::new(BoolOp::And, children)
    }
}

///
/// Bit Operations
/// allow `&` and `|` composition sugar over the same combination rule
///

impl BitAnd for Filter {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for Filter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

///
/// FieldMap
///
/// A public-to-storage field vocabulary translation table.
///

#[repr(transparent)]
#[derive(Clone, Debug, Default, Deref, DerefMut, Eq, PartialEq)]
pub struct FieldMap(pub BTreeMap<String, String>);

impl FieldMap {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for FieldMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}
