use crate::{spec::DomainSpecError, validate::Obstruction};
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level failure surface, split into the two kinds callers must
/// distinguish: a malformed domain spec (a configuration bug, stable top
/// code `BAD_DOMAIN_SPEC`) and a malformed or non-conforming filter (a
/// user-input failure, stable top code `BAD_FILTER`). Both carry a stable
/// machine-readable subcode.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum Error {
    #[error("{0}")]
    DomainSpec(#[from] DomainSpecError),

    #[error("{0}")]
    Filter(#[from] FilterError),
}

impl Error {
    /// Stable top-level error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DomainSpec(_) => "BAD_DOMAIN_SPEC",
            Self::Filter(_) => "BAD_FILTER",
        }
    }

    /// Stable machine-readable subcode.
    #[must_use]
    pub const fn subcode(&self) -> &'static str {
        match self {
            Self::DomainSpec(err) => err.subcode(),
            Self::Filter(err) => err.subcode(),
        }
    }

    /// The structured violation list, when this failure is an accumulated
    /// validation report.
    #[must_use]
    pub fn obstructions(&self) -> Option<&[Obstruction]> {
        match self {
            Self::Filter(FilterError::Obstructions(list)) => Some(list),
            _ => None,
        }
    }
}

///
/// FilterError
///
/// The filter expression is malformed or violates the domain spec.
///
/// Structural failures (`InvalidJson`, `NonObject`, `MalformedInput`,
/// `DepthExceeded`) fail fast and carry the original input for diagnostics.
/// Semantic violations are accumulated across the entire tree and reported
/// together as one `Obstructions` failure, so a caller can surface
/// everything wrong with a query in a single round trip.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum FilterError {
    #[error("filter is not valid JSON: {message}; original filter:\n\n{raw}")]
    InvalidJson { raw: String, message: String },

    #[error(
        "filter must decode to a JSON object or array; original filter: '{raw}'"
    )]
    NonObject { raw: String },

    #[error(
        "filter must be a clause triple, a sequence of nodes, or a tree object; original filter: '{raw}'"
    )]
    MalformedInput { raw: String },

    #[error("filter nesting exceeds the maximum depth of {max}")]
    DepthExceeded { max: usize },

    #[error("filter is not valid:\n{}", render_obstructions(.0))]
    Obstructions(Vec<Obstruction>),
}

impl FilterError {
    /// Stable machine-readable subcode.
    #[must_use]
    pub const fn subcode(&self) -> &'static str {
        match self {
            Self::InvalidJson { .. } => "InvalidJson",
            Self::NonObject { .. } => "NonObject",
            Self::MalformedInput { .. } => "MalformedInputObject",
            Self::DepthExceeded { .. } => "DepthExceeded",
            Self::Obstructions(_) => "Obstructions",
        }
    }
}

// One `* text (code)` line per violation.
fn render_obstructions(list: &[Obstruction]) -> String {
    list.iter()
        .map(|o| format!("* {o}"))
        .collect::<Vec<_>>()
        .join("\n")
}

///
/// TESTS
///
