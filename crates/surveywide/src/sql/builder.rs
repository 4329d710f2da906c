use crate::error::WideFormatResult;
use crate::models::{ColumnRole, ManifestColumn, SystemField};

use super::ident::{Identifier, quote_literal};
use super::membership::MembershipMatch;

pub const INTERVIEW_ID_COLUMN: &str = "interview_id";
pub const LABEL_SEPARATOR: &str = "; ";

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionKind {
    /// Raw `a.value_text`.
    Value,
    /// Label of the option whose value equals `a.value_text`.
    Label,
    /// Raw `a.value_json`.
    Values,
    /// Aggregated labels from the field's label CTE.
    Labels,
}

impl ProjectionKind {
    #[must_use]
    pub const fn role(self) -> ColumnRole {
        match self {
            Self::Value => ColumnRole::Value,
            Self::Label => ColumnRole::Label,
            Self::Values => ColumnRole::Values,
            Self::Labels => ColumnRole::Labels,
        }
    }

    const fn source_expr(self) -> Option<&'static str> {
        match self {
            Self::Value => Some("a.value_text"),
            Self::Label => Some("o.label"),
            Self::Values => Some("a.value_json"),
            Self::Labels => None,
        }
    }
}

/// One result column derived from a question field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    kind: ProjectionKind,
    field: Identifier,
    alias: Identifier,
}

impl Projection {
    pub fn value(field: &Identifier) -> Self {
        Self {
            kind: ProjectionKind::Value,
            field: field.clone(),
            alias: field.clone(),
        }
    }

    pub fn label(field: &Identifier) -> WideFormatResult<Self> {
        Ok(Self {
            kind: ProjectionKind::Label,
            field: field.clone(),
            alias: field.with_suffix("_label")?,
        })
    }

    pub fn values(field: &Identifier) -> WideFormatResult<Self> {
        Ok(Self {
            kind: ProjectionKind::Values,
            field: field.clone(),
            alias: field.with_suffix("_values")?,
        })
    }

    #[must_use]
    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    #[must_use]
    pub fn field(&self) -> &Identifier {
        &self.field
    }

    #[must_use]
    pub fn alias(&self) -> &Identifier {
        &self.alias
    }

    #[must_use]
    pub fn to_sql(&self) -> String {
        match self.kind.source_expr() {
            Some(source) => format!(
                "MAX(CASE WHEN q.fieldname = {} THEN {source} END) AS {}",
                quote_literal(self.field.as_str()),
                self.alias
            ),
            None => format!("MAX({alias}.labels) AS {alias}", alias = self.alias),
        }
    }
}

/// Per-interview label aggregation for one multi-choice field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCte {
    field: Identifier,
    name: Identifier,
}

impl LabelCte {
    pub fn new(field: &Identifier) -> WideFormatResult<Self> {
        Ok(Self {
            field: field.clone(),
            name: field.with_suffix("_labels")?,
        })
    }

    #[must_use]
    pub fn name(&self) -> &Identifier {
        &self.name
    }

    #[must_use]
    pub fn column(&self) -> Projection {
        Projection {
            kind: ProjectionKind::Labels,
            field: self.field.clone(),
            alias: self.name.clone(),
        }
    }

    fn to_sql(&self, survey_literal: &str, membership: MembershipMatch) -> String {
        let body = [
            format!("{} AS (", self.name),
            format!("{INDENT}SELECT"),
            format!("{INDENT}{INDENT}a.interview_id,"),
            format!(
                "{INDENT}{INDENT}GROUP_CONCAT(o.label, {}) AS labels",
                quote_literal(LABEL_SEPARATOR)
            ),
            format!("{INDENT}FROM answers a"),
            format!("{INDENT}JOIN questions q ON a.question_id = q.id"),
            format!("{INDENT}LEFT JOIN options o ON q.id = o.question_id"),
            format!("{INDENT}{INDENT}AND {}", membership.condition()),
            format!("{INDENT}WHERE q.survey_id = {survey_literal}"),
            format!(
                "{INDENT}{INDENT}AND q.fieldname = {}",
                quote_literal(self.field.as_str())
            ),
            format!("{INDENT}{INDENT}AND a.value_json IS NOT NULL"),
            format!("{INDENT}GROUP BY a.interview_id"),
            ")".to_string(),
        ];
        body.iter()
            .map(|line| format!("{INDENT}{line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A wide-format pivot over one survey, assembled from typed fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideQuery {
    survey_id: String,
    membership: MembershipMatch,
    fragments: Vec<Projection>,
    label_ctes: Vec<LabelCte>,
}

impl WideQuery {
    #[must_use]
    pub fn new(survey_id: impl Into<String>, membership: MembershipMatch) -> Self {
        Self {
            survey_id: survey_id.into(),
            membership,
            fragments: Vec::new(),
            label_ctes: Vec::new(),
        }
    }

    pub fn push_fragment(&mut self, projection: Projection) {
        self.fragments.push(projection);
    }

    pub fn push_label_cte(&mut self, cte: LabelCte) {
        self.label_ctes.push(cte);
    }

    #[must_use]
    pub fn survey_id(&self) -> &str {
        &self.survey_id
    }

    #[must_use]
    pub fn membership(&self) -> MembershipMatch {
        self.membership
    }

    #[must_use]
    pub fn fragments(&self) -> &[Projection] {
        &self.fragments
    }

    #[must_use]
    pub fn label_ctes(&self) -> &[LabelCte] {
        &self.label_ctes
    }

    /// Per-question fragments followed by the label CTE columns.
    #[must_use]
    pub fn projections(&self) -> Vec<Projection> {
        self.fragments
            .iter()
            .cloned()
            .chain(self.label_ctes.iter().map(LabelCte::column))
            .collect()
    }

    /// Result columns in projection order, fixed interview columns first.
    #[must_use]
    pub fn manifest_columns(&self) -> Vec<ManifestColumn> {
        let mut columns = vec![ManifestColumn {
            name: INTERVIEW_ID_COLUMN.to_string(),
            source_field: None,
            role: ColumnRole::InterviewId,
        }];
        columns.extend(SystemField::ALL.into_iter().map(|field| ManifestColumn {
            name: field.column().to_string(),
            source_field: Some(field.column().to_string()),
            role: ColumnRole::System,
        }));
        columns.extend(self.projections().into_iter().map(|projection| {
            ManifestColumn {
                name: projection.alias().as_str().to_string(),
                source_field: Some(projection.field().as_str().to_string()),
                role: projection.kind().role(),
            }
        }));
        columns
    }

    #[must_use]
    pub fn render(&self) -> String {
        let survey_literal = quote_literal(&self.survey_id);
        let mut lines = Vec::new();

        if !self.label_ctes.is_empty() {
            lines.push("WITH".to_string());
            let ctes = self
                .label_ctes
                .iter()
                .map(|cte| cte.to_sql(&survey_literal, self.membership))
                .collect::<Vec<_>>();
            lines.push(ctes.join(",\n"));
            lines.push(String::new());
        }

        let mut select_items = vec![format!("i.id AS {INTERVIEW_ID_COLUMN}")];
        select_items.extend(
            SystemField::ALL
                .into_iter()
                .map(|field| format!("i.{}", field.column())),
        );
        select_items.extend(self.projections().iter().map(Projection::to_sql));

        lines.push("SELECT".to_string());
        lines.push(
            select_items
                .iter()
                .map(|item| format!("{INDENT}{item}"))
                .collect::<Vec<_>>()
                .join(",\n"),
        );
        lines.push("FROM interviews i".to_string());
        lines.push("LEFT JOIN answers a ON i.id = a.interview_id".to_string());
        lines.push("LEFT JOIN questions q ON a.question_id = q.id".to_string());
        lines.push(
            "LEFT JOIN options o ON q.id = o.question_id AND a.value_text = o.value".to_string(),
        );
        for cte in &self.label_ctes {
            lines.push(format!(
                "LEFT JOIN {name} ON i.id = {name}.interview_id",
                name = cte.name()
            ));
        }
        lines.push(format!("WHERE i.survey_id = {survey_literal}"));
        lines.push("GROUP BY i.id, i.starttime, i.stoptime, i.lastmod".to_string());
        lines.push("ORDER BY i.starttime;".to_string());

        lines.join("\n")
    }
}
