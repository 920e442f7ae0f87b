//! Defines common, reusable AST nodes for building SQL statements.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    /// Splits a possibly schema-qualified name (`schema.table`) on the first
    /// dot that is not inside a quoted part.
    pub fn parse(qualified: &str) -> Self {
        let qualified = qualified.trim();
        let parts = schema_separator(qualified).map(|i| (&qualified[..i], &qualified[i + 1..]));
        match parts {
            Some((schema, name)) if !schema.is_empty() && !name.is_empty() => TableRef {
                schema: Some(schema.to_string()),
                name: name.to_string(),
            },
            _ => TableRef {
                schema: None,
                name: qualified.to_string(),
            },
        }
    }

    /// Returns a sibling table in the same schema with a suffix appended to the
    /// name. A quoted name keeps its quotes around the whole result.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let name = match quoted_parts(&self.name) {
            Some((quote, inner)) => format!("{quote}{inner}_{suffix}{quote}"),
            None => format!("{}_{suffix}", self.name),
        };
        TableRef {
            schema: self.schema.clone(),
            name,
        }
    }
}

fn schema_separator(qualified: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in qualified.char_indices() {
        match (quote, c) {
            (None, '"' | '`') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            (None, '.') => return Some(i),
            _ => {}
        }
    }
    None
}

fn quoted_parts(name: &str) -> Option<(char, &str)> {
    let quote = name.chars().next().filter(|c| *c == '"' || *c == '`')?;
    let inner = name.strip_prefix(quote)?.strip_suffix(quote)?;
    Some((quote, inner))
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
