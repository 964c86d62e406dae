use crate::{
    filter::{Clause, Filter, FilterNode},
    value::Value,
};

///
/// Rendered
///
/// The output pair of rendering: a clause fragment with one `?` placeholder
/// per entry in `params`, in matching left-to-right order. The order
/// correspondence is the correctness-critical invariant for
/// prepared-statement binding.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rendered {
    pub clause: String,
    pub params: Vec<Value>,
}

impl Rendered {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            clause: String::new(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.clause.is_empty() && self.params.is_empty()
    }
}

///
/// Translator
///
/// Renders one clause into a backend-specific fragment and its bound
/// values. Pure, caller-supplied, and swappable per target backend; the
/// tree walk itself has no backend-specific logic.
///

pub trait Translator {
    fn translate(&self, clause: &Clause) -> Rendered;
}

// A plain function works as a translator.
impl<F> Translator for F
where
    F: Fn(&Clause) -> Rendered,
{
    fn translate(&self, clause: &Clause) -> Rendered {
        self(clause)
    }
}

///
/// SqlTranslator
///
/// The reference translator: `` `field` cmp `` followed by the placeholder
/// form the value calls for. Field names are wrapped in a configurable
/// delimiter on both sides; a bare `*` field is emitted unquoted.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SqlTranslator {
    pub field_delimiter: char,
}

impl Default for SqlTranslator {
    fn default() -> Self {
        Self {
            field_delimiter: '`',
        }
    }
}

impl SqlTranslator {
    #[must_use]
    pub const fn with_delimiter(field_delimiter: char) -> Self {
        Self { field_delimiter }
    }
}

impl Translator for SqlTranslator {
    fn translate(&self, clause: &Clause) -> Rendered {
        let d = self.field_delimiter;
        let field = if clause.field == "*" {
            clause.field.clone()
        } else {
            format!("{d}{}{d}", clause.field)
        };

        let mut sql = format!("{field} {}", clause.cmp);
        let mut params = Vec::new();

        match &clause.value {
            // `between` takes its bounds as placeholders joined by `and`.
            Value::List(items) if clause.cmp.eq_ignore_ascii_case("between") => {
                sql.push(' ');
                sql.push_str(&join_placeholders(items.len(), " and "));
                params.extend(items.iter().cloned());
            }
            // Any other list is a parenthesized placeholder list.
            Value::List(items) => {
                sql.push_str(" (");
                sql.push_str(&join_placeholders(items.len(), ", "));
                sql.push(')');
                params.extend(items.iter().cloned());
            }
            value => {
                sql.push_str(" ?");
                params.push(value.clone());
            }
        }

        Rendered {
            clause: sql,
            params,
        }
    }
}

fn join_placeholders(count: usize, separator: &str) -> String {
    vec!["?"; count].join(separator)
}

impl Filter {
    /// Render the tree to a parameterized clause fragment.
    ///
    /// Children render in insertion order; fragments join with the tree's
    /// operator and bound values concatenate in the identical left-to-right
    /// order. Nested subtrees are parenthesized; the top level never is.
    /// An empty tree renders to `("", [])`.
    #[must_use]
    pub fn render<T: Translator>(&self, translator: &T) -> Rendered {
        render_nested(self, translator, false)
    }

    /// Render with the default SQL translator.
    #[must_use]
    pub fn to_sql(&self) -> Rendered {
        self.render(&SqlTranslator::default())
    }
}

fn render_nested<T: Translator>(filter: &Filter, translator: &T, parens: bool) -> Rendered {
    if filter.children.is_empty() {
        return Rendered::empty();
    }

    let mut parts = Vec::with_capacity(filter.children.len());
    let mut params = Vec::new();

    for node in &filter.children {
        let rendered = match node {
            FilterNode::Clause(clause) => translator.translate(clause),
            FilterNode::Filter(nested) => render_nested(nested, translator, true),
        };

        // Empty subtrees contribute nothing to the join.
        if rendered.is_empty() {
            continue;
        }

        parts.push(rendered.clause);
        params.extend(rendered.params);
    }

    if parts.is_empty() {
        return Rendered::empty();
    }

    let joined = parts.join(&format!(" {} ", filter.op));
    let clause = if parens { format!("({joined})") } else { joined };

    Rendered { clause, params }
}

///
/// TESTS
///
