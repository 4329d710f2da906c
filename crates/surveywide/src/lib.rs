#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod output;
pub mod sql;
pub mod sqlite;

pub use cli::app::Cli;
pub use error::{WideFormatError, WideFormatResult};
pub use generator::{FieldPlan, build_wide_query, generate_wide_query};
pub use sql::{MembershipMatch, WideQuery};
