use crate::{
    error::Error,
    filter::{Clause, FieldMap, Filter},
    parse,
    render::{Rendered, SqlTranslator, Translator},
    spec::DomainSpec,
};

///
/// Query
///
/// The public entry object: an optional canonical filter tree.
///
/// A `Query` without a filter is the canonical "no filter" state — distinct
/// from a validation failure. It renders to an empty clause, contains no
/// fields, and behaves as the empty and-tree under composition.
///
/// Every operation is a pure function from immutable input to immutable
/// output; combinators return a new `Query` and never touch the original.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    filter: Option<Filter>,
}

impl Query {
    /// The "no filter" query.
    #[must_use]
    pub const fn none() -> Self {
        Self { filter: None }
    }

    /// Wrap an already-constructed canonical tree.
    #[must_use]
    pub const fn from_filter(filter: Filter) -> Self {
        Self {
            filter: Some(filter),
        }
    }

    /// Parse filter text, validating against `spec`.
    ///
    /// Blank input yields the "no filter" query. See [`parse_opt`](Self::parse_opt)
    /// for optional input.
    pub fn parse(raw: &str, spec: &DomainSpec) -> Result<Self, Error> {
        Ok(Self {
            filter: parse::parse_text(raw, spec)?,
        })
    }

    /// Parse optional filter text; `None` yields the "no filter" query.
    pub fn parse_opt(raw: Option<&str>, spec: &DomainSpec) -> Result<Self, Error> {
        match raw {
            Some(raw) => Self::parse(raw, spec),
            None => Ok(Self::none()),
        }
    }

    /// Parse an already-decoded JSON document, validating against `spec`.
    pub fn from_json(doc: &serde_json::Value, spec: &DomainSpec) -> Result<Self, Error> {
        let raw = doc.to_string();

        Ok(Self {
            filter: Some(parse::parse_document(doc, spec, &raw)?),
        })
    }

    /// The canonical tree, when one is present.
    #[must_use]
    pub const fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    #[must_use]
    pub fn into_filter(self) -> Option<Filter> {
        self.filter
    }

    #[must_use]
    pub const fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    /// Combine with an addition under `and`, returning a new query.
    #[must_use]
    pub fn and(&self, addition: impl Into<Filter>) -> Self {
        Self {
            filter: Some(self.base().and(addition)),
        }
    }

    /// Combine with an addition under `or`, returning a new query.
    #[must_use]
    pub fn or(&self, addition: impl Into<Filter>) -> Self {
        Self {
            filter: Some(self.base().or(addition)),
        }
    }

    /// Rewrite field names throughout the tree, returning a new query.
    #[must_use]
    pub fn map_fields(&self, map: &FieldMap) -> Self {
        Self {
            filter: self.filter.as_ref().map(|filter| filter.map_fields(map)),
        }
    }

    /// Whether any clause compares against `field`.
    #[must_use]
    pub fn contains_field(&self, field: &str) -> bool {
        self.filter
            .as_ref()
            .is_some_and(|filter| filter.contains_field(field))
    }

    /// All clauses comparing against `field`, in document order.
    #[must_use]
    pub fn clauses_for(&self, field: &str) -> Vec<&Clause> {
        self.filter
            .as_ref()
            .map(|filter| filter.clauses_for(field))
            .unwrap_or_default()
    }

    /// Render to a parameterized clause fragment; the "no filter" query
    /// renders to `("", [])`.
    #[must_use]
    pub fn render<T: Translator>(&self, translator: &T) -> Rendered {
        self.filter
            .as_ref()
            .map_or_else(Rendered::empty, |filter| filter.render(translator))
    }

    /// Render with the default SQL translator.
    #[must_use]
    pub fn to_sql(&self) -> Rendered {
        self.render(&SqlTranslator::default())
    }

    // Combination treats a missing filter as the empty and-tree.
    fn base(&self) -> Filter {
        self.filter.clone().unwrap_or_else(Filter::empty)
    }
}

impl From<Filter> for Query {
    fn from(filter: Filter) -> Self {
        Self::from_filter(filter)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::BoolOp;

    #[test]
    fn none_query_is_inert() {
        let query = Query::none();
        assert!(!query.has_filter());
        assert!(!query.contains_field("name"));
        assert!(query.clauses_for("name").is_empty());
        assert_eq!(query.to_sql(), Rendered::empty());
    }

    #[test]
    fn and_on_a_none_query_starts_from_the_empty_tree() {
        let query = Query::none().and(Clause::eq("name", "x"));
        let filter = query.filter().unwrap();

        assert_eq!(filter.op, BoolOp::And);
        assert_eq!(filter.children.len(), 1);
        assert_eq!(query.to_sql().clause, "`name` = ?");
    }

    #[test]
    fn or_on_a_none_query_renders_without_artifacts() {
        let query = Query::none().or(Clause::eq("name", "x"));

        assert_eq!(query.filter().unwrap().op, BoolOp::Or);
        assert_eq!(query.to_sql().clause, "`name` = ?");
    }

    #[test]
    fn combinators_do_not_mutate_the_original_query() {
        let original = Query::from_filter(Filter::from(Clause::eq("name", "x")));
        let snapshot = original.clone();

        let _combined = original.and(Clause::gt("age", 30));
        let _mixed = original.or(Clause::eq("status", "active"));

        assert_eq!(original, snapshot);
    }

    #[test]
    fn map_fields_rewrites_only_mapped_names() {
        let map = [("name", "users.name")].into_iter().collect::<FieldMap>();
        let query = Query::from_filter(
            Filter::from(Clause::eq("name", "x")).and(Clause::gt("age", 30)),
        )
        .map_fields(&map);

        assert!(query.contains_field("users.name"));
        assert!(query.contains_field("age"));
        assert!(!query.contains_field("name"));
    }

    #[test]
    fn clause_lookup_spans_nested_trees() {
        let query = Query::from_filter(
            Filter::from(Clause::in_iter("status", ["retired"]))
                .or(Clause::eq("status", "youthful")),
        );

        let clauses = query.clauses_for("status");
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].cmp, "in");
        assert_eq!(clauses[1].cmp, "=");
    }
}
