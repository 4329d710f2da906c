use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How an option value is matched against a multi-choice answer's JSON array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MembershipMatch {
    /// Exact element membership through `json_each`.
    #[default]
    Json,
    /// Legacy `LIKE '%"<value>"%'` containment. `%` and `_` inside option
    /// values act as wildcards and ASCII case is ignored.
    Substring,
}

impl MembershipMatch {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Substring => "substring",
        }
    }

    /// Join condition relating `o.value` to `a.value_json`. Malformed JSON
    /// matches nothing instead of aborting the statement.
    #[must_use]
    pub const fn condition(self) -> &'static str {
        match self {
            Self::Json => {
                "EXISTS (SELECT 1 FROM json_each(CASE WHEN json_valid(a.value_json) THEN a.value_json ELSE '[]' END) AS je WHERE CAST(je.value AS TEXT) = o.value)"
            }
            Self::Substring => "a.value_json LIKE '%\"' || o.value || '\"%'",
        }
    }
}
