use serde::{Deserialize, Serialize};

pub const RADIO_QTYPE: &str = "radio";
pub const CHECKBOX_QTYPE: &str = "checkbox";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Scalar,
    SingleChoice,
    MultiChoice,
}

impl QuestionKind {
    /// Maps a stored `qtype` tag onto the projection kind. Unknown tags are
    /// projected as plain scalar values.
    #[must_use]
    pub fn from_qtype(qtype: &str) -> Self {
        match qtype {
            RADIO_QTYPE => Self::SingleChoice,
            CHECKBOX_QTYPE => Self::MultiChoice,
            _ => Self::Scalar,
        }
    }
}

/// Interview columns that are read from `interviews` directly, never pivoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemField {
    StartTime,
    StopTime,
    LastMod,
}

impl SystemField {
    pub const ALL: [Self; 3] = [Self::StartTime, Self::StopTime, Self::LastMod];

    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::StartTime => "starttime",
            Self::StopTime => "stoptime",
            Self::LastMod => "lastmod",
        }
    }

    #[must_use]
    pub fn from_fieldname(fieldname: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.column() == fieldname)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub fieldname: String,
    pub qtype: String,
    pub fieldtype: Option<String>,
    pub questiontext: Option<String>,
    pub position: Option<f64>,
}

impl Question {
    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        QuestionKind::from_qtype(&self.qtype)
    }

    #[must_use]
    pub fn system_field(&self) -> Option<SystemField> {
        SystemField::from_fieldname(&self.fieldname)
    }
}

#[cfg(test)]
mod tests {
    use super::{QuestionKind, SystemField};

    #[test]
    fn classifies_known_qtypes() {
        assert_eq!(QuestionKind::from_qtype("radio"), QuestionKind::SingleChoice);
        assert_eq!(QuestionKind::from_qtype("checkbox"), QuestionKind::MultiChoice);
        assert_eq!(QuestionKind::from_qtype("text"), QuestionKind::Scalar);
        assert_eq!(QuestionKind::from_qtype("Radio"), QuestionKind::Scalar);
    }

    #[test]
    fn recognizes_system_fields_by_exact_name() {
        assert_eq!(
            SystemField::from_fieldname("starttime"),
            Some(SystemField::StartTime)
        );
        assert_eq!(SystemField::from_fieldname("lastmod"), Some(SystemField::LastMod));
        assert_eq!(SystemField::from_fieldname("StartTime"), None);
        assert_eq!(SystemField::from_fieldname("uniqueid"), None);
    }
}
