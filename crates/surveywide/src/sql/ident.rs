use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{WideFormatError, WideFormatResult};

/// Every keyword the SQLite tokenizer recognizes, fallback-capable or not.
pub const SQLITE_KEYWORDS: &[&str] = &[
    "abort", "action", "add", "after", "all", "alter", "always", "analyze", "and", "as", "asc",
    "attach", "autoincrement", "before", "begin", "between", "by", "cascade", "case", "cast",
    "check", "collate", "column", "commit", "conflict", "constraint", "create", "cross",
    "current", "current_date", "current_time", "current_timestamp", "database", "default",
    "deferrable", "deferred", "delete", "desc", "detach", "distinct", "do", "drop", "each",
    "else", "end", "escape", "except", "exclude", "exclusive", "exists", "explain", "fail",
    "filter", "first", "following", "for", "foreign", "from", "full", "generated", "glob",
    "group", "groups", "having", "if", "ignore", "immediate", "in", "index", "indexed",
    "initially", "inner", "insert", "instead", "intersect", "into", "is", "isnull", "join", "key",
    "last", "left", "like", "limit", "match", "materialized", "natural", "no", "not", "nothing",
    "notnull", "null", "nulls", "of", "offset", "on", "or", "order", "others", "outer", "over",
    "partition", "plan", "pragma", "preceding", "primary", "query", "raise", "range",
    "recursive", "references", "regexp", "reindex", "release", "rename", "replace", "restrict",
    "returning", "right", "rollback", "row", "rows", "savepoint", "select", "set", "table",
    "temp", "temporary", "then", "ties", "to", "transaction", "trigger", "unbounded", "union",
    "unique", "update", "using", "vacuum", "values", "view", "virtual", "when", "where",
    "window", "with", "without",
];

fn bare_identifier_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("bare identifier regex should compile")
    })
}

/// A validated SQL identifier. Renders bare when that is unambiguous and
/// double-quoted otherwise, so metadata can never splice raw text into the
/// statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> WideFormatResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(WideFormatError::InvalidIdentifier {
                name,
                reason: "identifier is empty",
            });
        }
        if name.chars().any(char::is_control) {
            return Err(WideFormatError::InvalidIdentifier {
                name,
                reason: "identifier contains control characters",
            });
        }
        Ok(Self { name })
    }

    /// Builds `<self><suffix>`, e.g. `sex` + `_label`.
    pub fn with_suffix(&self, suffix: &str) -> WideFormatResult<Self> {
        Self::new(format!("{}{suffix}", self.name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_bare(&self) -> bool {
        bare_identifier_regex().is_match(&self.name)
            && !SQLITE_KEYWORDS.contains(&self.name.to_ascii_lowercase().as_str())
    }

    #[must_use]
    pub fn to_sql(&self) -> String {
        if self.is_bare() {
            self.name.clone()
        } else {
            format!("\"{}\"", self.name.replace('"', "\"\""))
        }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Renders `value` as a single-quoted SQL string literal.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::{Identifier, SQLITE_KEYWORDS, quote_literal};

    #[test]
    fn plain_names_render_bare() {
        let ident = Identifier::new("symptoms").expect("identifier should be valid");
        assert_eq!(ident.to_sql(), "symptoms");
        assert_eq!(
            ident.with_suffix("_labels").expect("suffix").to_sql(),
            "symptoms_labels"
        );
    }

    #[test]
    fn unsafe_names_are_quoted() {
        let spaced = Identifier::new("first name").expect("identifier should be valid");
        assert_eq!(spaced.to_sql(), "\"first name\"");

        let injected = Identifier::new("x\" FROM t; --").expect("identifier should be valid");
        assert_eq!(injected.to_sql(), "\"x\"\" FROM t; --\"");

        let leading_digit = Identifier::new("1st").expect("identifier should be valid");
        assert_eq!(leading_digit.to_sql(), "\"1st\"");
    }

    #[test]
    fn keywords_are_quoted_case_insensitively() {
        assert_eq!(Identifier::new("order").expect("valid").to_sql(), "\"order\"");
        assert_eq!(Identifier::new("Group").expect("valid").to_sql(), "\"Group\"");
        assert_eq!(
            Identifier::new("order").expect("valid").with_suffix("_label").expect("valid").to_sql(),
            "order_label"
        );
    }

    #[test]
    fn transaction_and_ddl_keywords_are_quoted() {
        for name in [
            "add",
            "autoincrement",
            "commit",
            "deferrable",
            "nothing",
            "returning",
            "transaction",
        ] {
            let ident = Identifier::new(name).expect("valid");
            assert!(!ident.is_bare(), "{name} must not render bare");
            assert_eq!(ident.to_sql(), format!("\"{name}\""));
        }
    }

    #[test]
    fn keyword_list_is_lowercase_and_sorted() {
        assert_eq!(SQLITE_KEYWORDS.len(), 147);
        assert!(SQLITE_KEYWORDS.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(
            SQLITE_KEYWORDS
                .iter()
                .all(|keyword| *keyword == keyword.to_ascii_lowercase())
        );
    }

    #[test]
    fn rejects_empty_and_control_characters() {
        let err = Identifier::new("").expect_err("empty identifier must fail");
        assert!(err.to_string().contains("identifier is empty"), "unexpected error: {err}");

        let err = Identifier::new("a\nb").expect_err("newline must fail");
        assert!(
            err.to_string().contains("control characters"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn literals_double_embedded_quotes() {
        assert_eq!(quote_literal("assets/surveys/survey.xml"), "'assets/surveys/survey.xml'");
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
    }
}
