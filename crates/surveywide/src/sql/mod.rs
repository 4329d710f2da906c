//! Typed construction of the wide-format pivot statement.

pub mod builder;
pub mod ident;
pub mod membership;

pub use builder::{
    INTERVIEW_ID_COLUMN, LABEL_SEPARATOR, LabelCte, Projection, ProjectionKind, WideQuery,
};
pub use ident::{Identifier, SQLITE_KEYWORDS, quote_literal};
pub use membership::MembershipMatch;
