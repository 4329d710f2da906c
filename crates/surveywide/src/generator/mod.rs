use std::collections::HashSet;

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::WideFormatResult;
use crate::models::{Question, QuestionKind, SystemField};
use crate::sql::{Identifier, LabelCte, MembershipMatch, Projection, WideQuery};

pub const DEFAULT_SURVEY_ID: &str = "assets/surveys/survey.xml";

/// How a single question contributes to the wide query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPlan {
    /// Sourced from the interview row; contributes no fragments.
    System(SystemField),
    Scalar(Identifier),
    SingleChoice(Identifier),
    MultiChoice(Identifier),
}

impl FieldPlan {
    pub fn classify(question: &Question) -> WideFormatResult<Self> {
        if let Some(field) = question.system_field() {
            return Ok(Self::System(field));
        }

        let field = Identifier::new(question.fieldname.as_str())?;
        Ok(match question.kind() {
            QuestionKind::Scalar => Self::Scalar(field),
            QuestionKind::SingleChoice => Self::SingleChoice(field),
            QuestionKind::MultiChoice => Self::MultiChoice(field),
        })
    }

    pub fn projections(&self) -> WideFormatResult<Vec<Projection>> {
        match self {
            Self::System(_) => Ok(Vec::new()),
            Self::Scalar(field) => Ok(vec![Projection::value(field)]),
            Self::SingleChoice(field) => {
                Ok(vec![Projection::value(field), Projection::label(field)?])
            }
            Self::MultiChoice(field) => {
                Ok(vec![Projection::value(field), Projection::values(field)?])
            }
        }
    }

    pub fn label_cte(&self) -> WideFormatResult<Option<LabelCte>> {
        match self {
            Self::MultiChoice(field) => LabelCte::new(field).map(Some),
            _ => Ok(None),
        }
    }
}

/// Builds the wide query for already-loaded questions, which must be in
/// display order.
pub fn build_wide_query(
    questions: &[Question],
    survey_id: &str,
    membership: MembershipMatch,
) -> WideFormatResult<WideQuery> {
    let mut query = WideQuery::new(survey_id, membership);
    let mut seen_label_ctes = HashSet::new();

    for question in questions {
        let plan = FieldPlan::classify(question)?;
        debug!(
            fieldname = %question.fieldname,
            qtype = %question.qtype,
            plan = ?plan,
            "classified question"
        );

        for projection in plan.projections()? {
            query.push_fragment(projection);
        }
        if let Some(cte) = plan.label_cte()? {
            if seen_label_ctes.insert(cte.name().clone()) {
                query.push_label_cte(cte);
            }
        }
    }

    Ok(query)
}

/// Reads question metadata for `survey_id` and assembles its wide query.
pub fn generate_wide_query(
    connection: &Connection,
    survey_id: &str,
    membership: MembershipMatch,
) -> WideFormatResult<WideQuery> {
    crate::sqlite::verify_input_schema(connection)?;
    let questions = crate::sqlite::load_questions(connection, survey_id)?;
    if questions.is_empty() {
        warn!(survey_id, "survey has no questions; only interview columns will be projected");
    }

    let query = build_wide_query(&questions, survey_id, membership)?;
    debug!(
        survey_id,
        questions = questions.len(),
        fragments = query.fragments().len(),
        label_ctes = query.label_ctes().len(),
        "assembled wide query"
    );
    Ok(query)
}
