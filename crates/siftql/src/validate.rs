use crate::{
    filter::{Clause, Filter, FilterNode},
    spec::DomainSpec,
    value::Value,
};
use std::fmt;

///
/// ObstructionCode
///
/// Stable machine-readable classification of one validation violation.
/// External callers key on [`as_str`](Self::as_str) to render field-level
/// messages, so the strings are part of the public contract.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ObstructionCode {
    InvalidBoolOperator,
    InvalidComparisonOperator,
    InvalidField,
    InvalidValue,
}

impl ObstructionCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidBoolOperator => "DslQueryInvalidOperator",
            Self::InvalidComparisonOperator => "InvalidDslQueryComparisonOperator",
            Self::InvalidField => "InvalidDslQueryField",
            Self::InvalidValue => "InvalidDslQueryValue",
        }
    }
}

impl fmt::Display for ObstructionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

///
/// Obstruction
///
/// One structured validation violation. Violations are accumulated across
/// the whole tree and reported together, never one at a time.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Obstruction {
    pub code: ObstructionCode,
    pub text: String,
}

impl Obstruction {
    #[must_use]
    pub fn new(code: ObstructionCode, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    /// Obstruction for an unrecognized boolean combinator token.
    pub(crate) fn invalid_bool_operator(found: &str) -> Self {
        Self::new(
            ObstructionCode::InvalidBoolOperator,
            format!("only 'and' or 'or' may combine filter nodes; got '{found}'"),
        )
    }
}

impl fmt::Display for Obstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.text, self.code)
    }
}

/// Validate every clause of a filter tree against a domain spec, collecting
/// all violations in document order. Returns an empty list for a valid tree.
#[must_use]
pub fn validate_filter(filter: &Filter, spec: &DomainSpec) -> Vec<Obstruction> {
    let mut out = Vec::new();
    walk(filter, spec, &mut out);
    out
}

fn walk(filter: &Filter, spec: &DomainSpec, out: &mut Vec<Obstruction>) {
    for node in &filter.children {
        match node {
            FilterNode::Clause(clause) => check_clause(clause, spec, out),
            FilterNode::Filter(nested) => walk(nested, spec, out),
        }
    }
}

fn check_clause(clause: &Clause, spec: &DomainSpec, out: &mut Vec<Obstruction>) {
    let mut check_cmp = true;

    // An unknown field makes the operator check meaningless, so it is
    // skipped for that clause.
    if let Some(fields) = spec.field_specs() {
        if !fields.contains_key(&clause.field) {
            let valid = fields.keys().cloned().collect::<Vec<_>>().join("', '");
            out.push(Obstruction::new(
                ObstructionCode::InvalidField,
                format!(
                    "'{}' is not a valid field for this filter; valid fields are '{valid}'",
                    clause.field
                ),
            ));
            check_cmp = false;
        }
    }

    if check_cmp {
        let allowed = spec.allowed_operators(&clause.field);
        if !allowed
            .iter()
            .any(|op| op.eq_ignore_ascii_case(&clause.cmp))
        {
            out.push(Obstruction::new(
                ObstructionCode::InvalidComparisonOperator,
                format!(
                    "'{}' is not a valid comparison operator for the '{}' field; valid operators are '{}'",
                    clause.cmp,
                    clause.field,
                    allowed.join("', '")
                ),
            ));
        }
    }

    check_value(clause, out);
}

fn check_value(clause: &Clause, out: &mut Vec<Obstruction>) {
    let Value::List(items) = &clause.value else {
        // Scalars (null, text, numbers, bool) are always valid values.
        return;
    };

    if items.is_empty() {
        out.push(Obstruction::new(
            ObstructionCode::InvalidValue,
            format!(
                "field '{}': an array of values was supplied, but it was empty",
                clause.field
            ),
        ));
        return;
    }

    if !supports_value_list(&clause.cmp) {
        out.push(Obstruction::new(
            ObstructionCode::InvalidValue,
            format!(
                "field '{}': arrays of values may only be used with the 'in', 'not in', or 'between' operators; got '{}'",
                clause.field, clause.cmp
            ),
        ));
        return;
    }

    if clause.cmp.eq_ignore_ascii_case("between") && items.len() != 2 {
        out.push(Obstruction::new(
            ObstructionCode::InvalidValue,
            format!(
                "field '{}': 'between' requires exactly two values; got {}",
                clause.field,
                items.len()
            ),
        ));
    }

    for (index, item) in items.iter().enumerate() {
        if !item.is_scalar() {
            out.push(Obstruction::new(
                ObstructionCode::InvalidValue,
                format!(
                    "field '{}' (argument #{}): values must be null, string, number, or boolean; got {item}",
                    clause.field,
                    index + 1
                ),
            ));
        }
    }
}

// The operators whose right-hand side may be a value list.
fn supports_value_list(cmp: &str) -> bool {
    cmp.eq_ignore_ascii_case("in")
        || cmp.eq_ignore_ascii_case("not in")
        || cmp.eq_ignore_ascii_case("between")
}

///
/// TESTS
///
