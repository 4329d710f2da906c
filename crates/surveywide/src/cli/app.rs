use clap::{Args, Parser};

use super::commands::generate::GenerateArgs;

#[derive(Debug, Parser)]
#[command(
    name = "surveywide",
    version,
    about = "Generate a wide-format SQL pivot from survey question metadata"
)]
pub struct Cli {
    #[command(flatten)]
    pub generate: GenerateArgs,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

#[derive(Debug, Clone, Args)]
pub struct LoggingArgs {
    /// Only log errors.
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log classification and assembly details.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl LoggingArgs {
    #[must_use]
    pub fn level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}
