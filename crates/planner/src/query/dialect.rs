//! Defines the `Dialect` trait for database-specific SQL syntax.

/// How a dialect removes a single date partition from a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStyle {
    /// `ALTER TABLE t DROP PARTITION p` (MySQL range/list partitioning).
    AlterTableDrop,
    /// Each partition is its own child table, `t_p`, dropped with `DROP TABLE`.
    ChildTable,
}

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - PostgreSQL uses double quotes: `"my_column"`
    /// - MySQL uses backticks: `` `my_column` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// The character `quote_identifier` wraps identifiers in.
    fn quote_char(&self) -> char;

    /// Writes a configured identifier into a statement.
    ///
    /// Plain names (`orders`, `Sales`) and names that are already quoted go in
    /// verbatim, so the server folds and resolves them exactly as it would in
    /// hand-written SQL. Anything else (spaces, dashes, ...) is quoted.
    fn render_identifier(&self, ident: &str) -> String {
        if is_plain_identifier(ident) || is_quoted(ident, self.quote_char()) {
            ident.to_string()
        } else {
            self.quote_identifier(ident)
        }
    }

    /// Returns the placeholder for a parameterized query.
    ///
    /// - PostgreSQL uses `$1`, `$2`, etc.
    /// - MySQL uses `?`
    fn get_placeholder(&self, index: usize) -> String;

    /// Returns the name of the dialect (e.g., "PostgreSQL", "MySQL").
    fn name(&self) -> String;

    fn partition_style(&self) -> PartitionStyle;
}

fn is_plain_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_quoted(ident: &str, quote: char) -> bool {
    ident.len() >= 2 && ident.starts_with(quote) && ident.ends_with(quote)
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', r#""""#))
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn get_placeholder(&self, index: usize) -> String {
        // PostgreSQL uses $1, $2, etc.
        format!("${}", index + 1)
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }

    fn partition_style(&self) -> PartitionStyle {
        PartitionStyle::ChildTable
    }
}

#[derive(Debug, Clone)]
pub struct MySql;

impl Dialect for MySql {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn get_placeholder(&self, _index: usize) -> String {
        // MySQL uses ?
        "?".into()
    }

    fn name(&self) -> String {
        "MySQL".into()
    }

    fn partition_style(&self) -> PartitionStyle {
        PartitionStyle::AlterTableDrop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_quote_chars() {
        assert_eq!(Postgres.quote_identifier(r#"we"ird"#), r#""we""ird""#);
        assert_eq!(MySql.quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_plain_identifiers_are_kept_verbatim() {
        assert_eq!(Postgres.render_identifier("Orders"), "Orders");
        assert_eq!(Postgres.render_identifier("order_id"), "order_id");
        assert_eq!(MySql.render_identifier("ID"), "ID");
    }

    #[test]
    fn test_quoted_identifiers_are_not_quoted_twice() {
        assert_eq!(Postgres.render_identifier(r#""Orders""#), r#""Orders""#);
        assert_eq!(MySql.render_identifier("`Orders`"), "`Orders`");
    }

    #[test]
    fn test_special_identifiers_are_quoted() {
        assert_eq!(
            Postgres.render_identifier("order date"),
            r#""order date""#
        );
        assert_eq!(MySql.render_identifier("unit-price"), "`unit-price`");
        assert_eq!(Postgres.render_identifier("1st"), r#""1st""#);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Postgres.get_placeholder(0), "$1");
        assert_eq!(Postgres.get_placeholder(9), "$10");
        assert_eq!(MySql.get_placeholder(3), "?");
    }
}
