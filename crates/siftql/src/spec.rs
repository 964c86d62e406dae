use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Built-in comparison-operator vocabulary, used whenever a domain spec does
/// not declare its own default set.
pub const DEFAULT_COMPARISON_OPERATORS: [&str; 15] = [
    "=",
    "!=",
    ">",
    "<",
    ">=",
    "<=",
    "regexp",
    "not regexp",
    "like",
    "not like",
    "in",
    "not in",
    "between",
    "is",
    "is not",
];

const SPEC_KEY_FIELD_SPECS: &str = "fieldSpecs";
const SPEC_KEY_DEFAULT_OPERATORS: &str = "defaultComparisonOperators";

///
/// DomainSpecError
///
/// The domain spec itself is malformed. This is a caller/configuration bug,
/// not a user-input failure; it carries the stable top code
/// `BAD_DOMAIN_SPEC`.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DomainSpecError {
    #[error("domain spec must be a JSON object")]
    ObjectRequired,

    #[error("domain spec contains invalid keys: '{}'", .0.join("', '"))]
    InvalidKeys(Vec<String>),

    #[error("domain spec is missing the 'defaultComparisonOperators' array")]
    MissingComparisonOperators,

    #[error("'defaultComparisonOperators' must be an array of operator strings")]
    ComparisonOperatorsNotArray,

    #[error(
        "'fieldSpecs' must be a map of field names to arrays of acceptable comparison operators"
    )]
    MalformedFieldSpecs,
}

impl DomainSpecError {
    /// Stable machine-readable subcode.
    #[must_use]
    pub const fn subcode(&self) -> &'static str {
        match self {
            Self::ObjectRequired => "ObjectRequired",
            Self::InvalidKeys(_) => "InvalidKeys",
            Self::MissingComparisonOperators => "MissingComparisonOperators",
            Self::ComparisonOperatorsNotArray => "ComparisonOperatorsNotArray",
            Self::MalformedFieldSpecs => "MalformedFieldSpecs",
        }
    }
}

///
/// DomainSpec
///
/// Declares the permitted field and operator vocabulary a filter is
/// validated against. Constructed once (typically at startup) and treated as
/// read-only for the lifetime of every query it validates.
///
/// A field listed with an *empty* operator list is valid and falls back to
/// the default operator set — the empty list is a sentinel, not a
/// "no operators allowed" marker.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DomainSpec {
    field_specs: Option<BTreeMap<String, Vec<String>>>,
    default_comparison_operators: Vec<String>,
}

impl Default for DomainSpec {
    /// The permissive spec: any field, built-in default operators.
    fn default() -> Self {
        Self {
            field_specs: None,
            default_comparison_operators: DEFAULT_COMPARISON_OPERATORS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl DomainSpec {
    /// A spec restricting fields to the given whitelist, with the built-in
    /// default operator set.
    #[must_use]
    pub fn new(field_specs: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            field_specs: Some(field_specs.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Full constructor: explicit field whitelist and default operator set.
    #[must_use]
    pub fn with_operators(
        field_specs: Option<BTreeMap<String, Vec<String>>>,
        default_comparison_operators: Vec<String>,
    ) -> Self {
        Self {
            field_specs,
            default_comparison_operators,
        }
    }

    /// Strictly check an untyped spec document.
    ///
    /// Unlike [`from_json`](Self::from_json), a missing
    /// `defaultComparisonOperators` key is an error here.
    pub fn validate_json(doc: &serde_json::Value) -> Result<(), DomainSpecError> {
        Self::check_json(doc, true)
    }

    /// Build a spec from an untyped document, auto-filling a missing
    /// `defaultComparisonOperators` with the built-in list before
    /// validation.
    pub fn from_json(doc: &serde_json::Value) -> Result<Self, DomainSpecError> {
        Self::check_json(doc, false)?;

        // check_json guarantees the object shape below.
        let object = doc.as_object().ok_or(DomainSpecError::ObjectRequired)?;

        let default_comparison_operators = match object.get(SPEC_KEY_DEFAULT_OPERATORS) {
            Some(ops) => decode_operator_list(ops)
                .ok_or(DomainSpecError::ComparisonOperatorsNotArray)?,
            None => DEFAULT_COMPARISON_OPERATORS
                .iter()
                .map(ToString::to_string)
                .collect(),
        };

        let field_specs = match object.get(SPEC_KEY_FIELD_SPECS) {
            Some(specs) => {
                let fields = specs
                    .as_object()
                    .ok_or(DomainSpecError::MalformedFieldSpecs)?;
                let mut out = BTreeMap::new();
                for (field, ops) in fields {
                    let ops =
                        decode_operator_list(ops).ok_or(DomainSpecError::MalformedFieldSpecs)?;
                    out.insert(field.clone(), ops);
                }
                Some(out)
            }
            None => None,
        };

        Ok(Self {
            field_specs,
            default_comparison_operators,
        })
    }

    #[must_use]
    pub const fn field_specs(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        self.field_specs.as_ref()
    }

    #[must_use]
    pub fn default_comparison_operators(&self) -> &[String] {
        &self.default_comparison_operators
    }

    /// The operator set a given field is checked against: the field's own
    /// non-empty list, else the default set.
    #[must_use]
    pub fn allowed_operators(&self, field: &str) -> &[String] {
        match self
            .field_specs
            .as_ref()
            .and_then(|fields| fields.get(field))
        {
            Some(ops) if !ops.is_empty() => ops,
            _ => &self.default_comparison_operators,
        }
    }

    fn check_json(doc: &serde_json::Value, require_defaults: bool) -> Result<(), DomainSpecError> {
        let object = doc.as_object().ok_or(DomainSpecError::ObjectRequired)?;

        let invalid_keys = object
            .keys()
            .filter(|k| {
                k.as_str() != SPEC_KEY_FIELD_SPECS && k.as_str() != SPEC_KEY_DEFAULT_OPERATORS
            })
            .cloned()
            .collect::<Vec<_>>();

        if !invalid_keys.is_empty() {
            return Err(DomainSpecError::InvalidKeys(invalid_keys));
        }

        match object.get(SPEC_KEY_DEFAULT_OPERATORS) {
            Some(ops) => {
                if decode_operator_list(ops).is_none() {
                    return Err(DomainSpecError::ComparisonOperatorsNotArray);
                }
            }
            None => {
                if require_defaults {
                    return Err(DomainSpecError::MissingComparisonOperators);
                }
            }
        }

        if let Some(specs) = object.get(SPEC_KEY_FIELD_SPECS) {
            let fields = specs
                .as_object()
                .ok_or(DomainSpecError::MalformedFieldSpecs)?;
            for ops in fields.values() {
                if decode_operator_list(ops).is_none() {
                    return Err(DomainSpecError::MalformedFieldSpecs);
                }
            }
        }

        Ok(())
    }
}

// An operator list is an array of strings; anything else is malformed.
fn decode_operator_list(doc: &serde_json::Value) -> Option<Vec<String>> {
    doc.as_array()?
        .iter()
        .map(|op| op.as_str().map(ToString::to_string))
        .collect()
}

///
/// TESTS
///
