use std::path::Path;

use crate::error::{WideFormatError, WideFormatResult};
use crate::models::WideManifest;

pub const DEFAULT_OUTPUT_FILE: &str = "gistx_dynamic_wide_format.sql";

const BANNER_TITLE: &str = "GiSTX Survey Data - Dynamically Generated Wide Format Query";
const BANNER_SUBTITLE: &str = "Generated from questions table - no hardcoded field names";
const BANNER_RULE_WIDTH: usize = 76;

#[must_use]
pub fn render_banner() -> String {
    let rule = format!("-- {}", "=".repeat(BANNER_RULE_WIDTH));
    [
        rule.clone(),
        format!("-- {BANNER_TITLE}"),
        format!("-- {BANNER_SUBTITLE}"),
        rule,
    ]
    .join("\n")
}

/// Banner, blank line, then the statement.
#[must_use]
pub fn render_stdout(sql: &str) -> String {
    format!("{}\n\n{sql}", render_banner())
}

#[must_use]
pub fn render_saved_status(path: &Path) -> String {
    format!("\n\nSQL saved to: {}", path.display())
}

/// Writes the statement verbatim, replacing any existing file.
pub fn write_sql_artifact(path: &Path, sql: &str) -> WideFormatResult<()> {
    write_artifact(path, sql.as_bytes())
}

pub fn write_manifest_artifact(path: &Path, manifest: &WideManifest) -> WideFormatResult<()> {
    let encoded = serde_json::to_vec_pretty(manifest)?;
    write_artifact(path, &encoded)
}

fn write_artifact(path: &Path, contents: &[u8]) -> WideFormatResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }
    std::fs::write(path, contents).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> WideFormatError {
    WideFormatError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{render_banner, render_saved_status, render_stdout, write_sql_artifact};
    use crate::error::WideFormatError;

    #[test]
    fn banner_is_framed_by_matching_rules() {
        let banner = render_banner();
        let lines = banner.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].len(), 79);
        assert_eq!(lines[0], lines[3]);
        assert!(lines[1].starts_with("-- GiSTX Survey Data"));
    }

    #[test]
    fn stdout_separates_banner_from_statement() {
        let rendered = render_stdout("SELECT 1;");
        assert!(rendered.ends_with("=\n\nSELECT 1;"));
    }

    #[test]
    fn status_names_the_output_path() {
        assert_eq!(
            render_saved_status(Path::new("out/wide.sql")),
            "\n\nSQL saved to: out/wide.sql"
        );
    }

    #[test]
    fn writing_onto_a_directory_is_an_io_error() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("surveywide-output-dir-{nanos}"));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");

        let err = write_sql_artifact(&dir, "SELECT 1;").expect_err("directory target must fail");
        match err {
            WideFormatError::Io { path, .. } => assert_eq!(path, dir),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn creates_missing_parent_directories() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir()
            .join(format!("surveywide-output-nested-{nanos}"))
            .join("out/wide.sql");

        write_sql_artifact(&path, "SELECT 1;").expect("nested write should succeed");
        assert_eq!(
            std::fs::read_to_string(&path).expect("file should exist"),
            "SELECT 1;"
        );
    }
}
