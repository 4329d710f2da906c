pub mod manifest;
pub mod question;

pub use manifest::{ColumnRole, MANIFEST_SCHEMA_VERSION, ManifestColumn, WideManifest};
pub use question::{CHECKBOX_QTYPE, Question, QuestionKind, RADIO_QTYPE, SystemField};
