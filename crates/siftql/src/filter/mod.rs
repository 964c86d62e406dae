mod expr;
mod wire;

#[cfg(test)]
mod tests;

pub use expr::{BoolOp, Clause, FieldMap, Filter, FilterNode};
