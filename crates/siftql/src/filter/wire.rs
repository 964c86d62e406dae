use crate::filter::{Clause, Filter, FilterNode};
use serde::{
    Serialize, Serializer,
    ser::{SerializeMap, SerializeTuple},
};

// Wire shape: a clause is the triple `[field, cmp, value]`, a tree is the
// object `{"o": "and"|"or", "v": [...]}`. Parsing the same shape lives in
// `parse`; these impls exist so a canonical tree round-trips through JSON.

impl Serialize for Clause {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut triple = serializer.serialize_tuple(3)?;
        triple.serialize_element(&self.field)?;
        triple.serialize_element(&self.cmp)?;
        triple.serialize_element(&self.value)?;
        triple.end()
    }
}

impl Serialize for FilterNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Clause(clause) => clause.serialize(serializer),
            Self::Filter(filter) => filter.serialize(serializer),
        }
    }
}

impl Serialize for Filter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("o", self.op.as_str())?;
        map.serialize_entry("v", &self.children)?;
        map.end()
    }
}

///
/// TESTS
///
