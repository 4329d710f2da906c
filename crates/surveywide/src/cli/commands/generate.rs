use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use crate::config::{DEFAULT_DB_PATH, GeneratorConfig, GeneratorSettings};
use crate::generator::{DEFAULT_SURVEY_ID, generate_wide_query};
use crate::models::WideManifest;
use crate::output::{
    DEFAULT_OUTPUT_FILE, render_saved_status, render_stdout, write_manifest_artifact,
    write_sql_artifact,
};
use crate::sql::MembershipMatch;

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Survey database to introspect.
    #[arg(value_name = "DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Survey whose questions and interviews are pivoted.
    #[arg(long, value_name = "ID", default_value = DEFAULT_SURVEY_ID)]
    pub survey_id: String,

    /// File the generated statement is written to.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Print the statement without writing the output file.
    #[arg(long, default_value_t = false)]
    pub no_write: bool,

    /// Multi-choice label matching strategy.
    #[arg(long, value_enum, default_value_t = MembershipMatch::Json)]
    pub membership: MembershipMatch,

    /// Also write a JSON description of the result columns.
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Prepare the statement against the database before emitting it.
    #[arg(long, default_value_t = false)]
    pub verify: bool,
}

impl GenerateArgs {
    #[must_use]
    pub fn settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            db_path: self.db_path.clone(),
            survey_id: self.survey_id.clone(),
            output: (!self.no_write).then(|| self.output.clone()),
            manifest: self.manifest.clone(),
            membership: self.membership,
            verify: self.verify,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub sql: String,
    pub manifest: WideManifest,
}

/// Introspects the database and renders the statement. Writes nothing.
pub fn generate(config: &GeneratorConfig) -> Result<GenerationOutcome> {
    let connection = crate::sqlite::open_survey_database(&config.db_path)?;
    let query = generate_wide_query(&connection, &config.survey_id, config.membership)
        .with_context(|| format!("failed to generate wide query for survey {:?}", config.survey_id))?;
    let sql = query.render();
    let manifest = WideManifest::new(query.survey_id(), query.membership(), generated_at_utc_now()?)
        .with_columns(query.manifest_columns());

    if config.verify {
        let columns = crate::sqlite::verify_statement(&connection, &sql, manifest.columns.len())?;
        info!(columns = columns.len(), "generate: statement verified");
    }
    drop(connection);

    Ok(GenerationOutcome { sql, manifest })
}

pub fn run(args: &GenerateArgs, home_dir: Option<&Path>, cwd: &Path) -> Result<()> {
    let config = crate::config::resolve_generator_config(args.settings(), home_dir, cwd)?;
    info!(
        db_path = %config.db_path.display(),
        survey_id = %config.survey_id,
        membership = config.membership.key(),
        "generate: start"
    );

    let outcome = generate(&config)?;
    println!("{}", render_stdout(&outcome.sql));

    if let Some(output_path) = &config.output_path {
        write_sql_artifact(output_path, &outcome.sql)?;
        eprintln!("{}", render_saved_status(output_path));
    }

    if let Some(manifest_path) = &config.manifest_path {
        write_manifest_artifact(manifest_path, &outcome.manifest)?;
        info!(
            manifest = %manifest_path.display(),
            columns = outcome.manifest.columns.len(),
            "generate: manifest written"
        );
    }

    info!(
        columns = outcome.manifest.columns.len(),
        bytes = outcome.sql.len(),
        "generate: complete"
    );
    Ok(())
}

fn generated_at_utc_now() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("failed to format manifest timestamp")
}
