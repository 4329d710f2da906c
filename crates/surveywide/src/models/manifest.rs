use serde::{Deserialize, Serialize};

use crate::sql::MembershipMatch;

pub const MANIFEST_SCHEMA_VERSION: &str = "surveywide.manifest.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    InterviewId,
    System,
    Value,
    Label,
    Values,
    Labels,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestColumn {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,

    pub role: ColumnRole,
}

/// Describes the result columns of one generated wide query, in projection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WideManifest {
    pub schema_version: String,
    pub survey_id: String,
    pub generated_at_utc: String,
    pub membership_match: MembershipMatch,
    pub columns: Vec<ManifestColumn>,
}

impl WideManifest {
    #[must_use]
    pub fn new(
        survey_id: impl Into<String>,
        membership_match: MembershipMatch,
        generated_at_utc: impl Into<String>,
    ) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION.to_string(),
            survey_id: survey_id.into(),
            generated_at_utc: generated_at_utc.into(),
            membership_match,
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_columns(mut self, columns: Vec<ManifestColumn>) -> Self {
        self.columns = columns;
        self
    }
}
