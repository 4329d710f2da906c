use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};

use crate::sql::MembershipMatch;

pub const DEFAULT_DB_PATH: &str = "gistx.sqlite";

/// Settings as supplied on the command line, before path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub db_path: PathBuf,
    pub survey_id: String,
    pub output: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub membership: MembershipMatch,
    pub verify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub db_path: PathBuf,
    pub survey_id: String,
    /// `None` when the statement is only printed.
    pub output_path: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub membership: MembershipMatch,
    pub verify: bool,
}

pub fn resolve_generator_config(
    settings: GeneratorSettings,
    home_dir: Option<&Path>,
    cwd: &Path,
) -> Result<GeneratorConfig> {
    if !cwd.is_absolute() {
        bail!("cwd must be absolute: {}", cwd.display());
    }
    if let Some(home_dir) = home_dir {
        if !home_dir.is_absolute() {
            bail!("home_dir must be absolute: {}", home_dir.display());
        }
    }

    let cwd = normalize_lexical(cwd);
    let home_dir = home_dir.map(normalize_lexical);
    let resolve = |path: &Path| resolve_user_path(path, home_dir.as_deref(), &cwd);

    Ok(GeneratorConfig {
        db_path: resolve(settings.db_path.as_path())?,
        survey_id: settings.survey_id,
        output_path: settings.output.as_deref().map(resolve).transpose()?,
        manifest_path: settings.manifest.as_deref().map(resolve).transpose()?,
        membership: settings.membership,
        verify: settings.verify,
    })
}

fn resolve_user_path(path: &Path, home_dir: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path, home_dir)?;
    let resolved = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    Ok(normalize_lexical(&resolved))
}

fn expand_tilde(path: &Path, home_dir: Option<&Path>) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let Some(home_dir) = home_dir else {
                bail!("HOME is not set; cannot expand {}", path.display());
            };
            let mut expanded = home_dir.to_path_buf();
            for component in components {
                expanded.push(component.as_os_str());
            }
            Ok(expanded)
        }
        Some(Component::Normal(first))
            if first
                .to_str()
                .is_some_and(|segment| segment.starts_with('~')) =>
        {
            bail!(
                "unsupported home expansion syntax (only `~` and `~/...` are supported): {}",
                path.display()
            )
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            _ => normalized.push(component.as_os_str()),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{DEFAULT_DB_PATH, GeneratorSettings, resolve_generator_config};
    use crate::generator::DEFAULT_SURVEY_ID;
    use crate::output::DEFAULT_OUTPUT_FILE;
    use crate::sql::MembershipMatch;

    fn settings(db_path: &str, output: Option<&str>) -> GeneratorSettings {
        GeneratorSettings {
            db_path: PathBuf::from(db_path),
            survey_id: DEFAULT_SURVEY_ID.to_string(),
            output: output.map(PathBuf::from),
            manifest: None,
            membership: MembershipMatch::Json,
            verify: false,
        }
    }

    #[test]
    fn resolves_relative_paths_against_cwd() {
        let config = resolve_generator_config(
            settings("./data/../data/gistx.sqlite", Some("wide.sql")),
            Some(Path::new("/home/tester")),
            Path::new("/work/repo"),
        )
        .expect("config should resolve");

        assert_eq!(config.db_path, Path::new("/work/repo/data/gistx.sqlite"));
        assert_eq!(config.output_path.as_deref(), Some(Path::new("/work/repo/wide.sql")));
        assert!(config.manifest_path.is_none());
    }

    #[test]
    fn legacy_defaults_resolve_next_to_each_other() {
        let config = resolve_generator_config(
            settings(DEFAULT_DB_PATH, Some(DEFAULT_OUTPUT_FILE)),
            None,
            Path::new("/srv/gistx/"),
        )
        .expect("defaults should resolve without HOME");

        assert_eq!(config.db_path, Path::new("/srv/gistx/gistx.sqlite"));
        assert_eq!(
            config.output_path.as_deref(),
            Some(Path::new("/srv/gistx/gistx_dynamic_wide_format.sql"))
        );
        assert_eq!(config.survey_id, DEFAULT_SURVEY_ID);
    }

    #[test]
    fn manifest_and_survey_settings_pass_through() {
        let mut settings = settings("/data/gistx.sqlite", None);
        settings.manifest = Some(PathBuf::from("~/reports/wide.json"));
        settings.survey_id = "assets/surveys/followup.xml".to_string();
        settings.membership = MembershipMatch::Substring;
        settings.verify = true;

        let config = resolve_generator_config(
            settings,
            Some(Path::new("/home/analyst")),
            Path::new("/work/repo"),
        )
        .expect("config should resolve");

        assert_eq!(config.db_path, Path::new("/data/gistx.sqlite"));
        assert!(config.output_path.is_none());
        assert_eq!(
            config.manifest_path.as_deref(),
            Some(Path::new("/home/analyst/reports/wide.json"))
        );
        assert_eq!(config.survey_id, "assets/surveys/followup.xml");
        assert_eq!(config.membership, MembershipMatch::Substring);
        assert!(config.verify);
    }

    #[test]
    fn expands_tilde_against_home_dir() {
        let config = resolve_generator_config(
            settings("~/surveys/gistx.sqlite", None),
            Some(Path::new("/home/tester")),
            Path::new("/work/repo"),
        )
        .expect("tilde path should resolve");

        assert_eq!(config.db_path, Path::new("/home/tester/surveys/gistx.sqlite"));
        assert!(config.output_path.is_none());
    }

    #[test]
    fn tilde_without_home_dir_fails() {
        let err = resolve_generator_config(
            settings("~/gistx.sqlite", None),
            None,
            Path::new("/work/repo"),
        )
        .expect_err("tilde without HOME must fail");

        assert!(
            err.to_string().contains("HOME is not set"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_tilde_username_syntax() {
        let err = resolve_generator_config(
            settings("/data/gistx.sqlite", Some("~someone/out.sql")),
            Some(Path::new("/home/tester")),
            Path::new("/work/repo"),
        )
        .expect_err("~username syntax must fail");

        assert!(
            err.to_string()
                .contains("unsupported home expansion syntax"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_non_absolute_cwd() {
        let err = resolve_generator_config(settings("gistx.sqlite", None), None, Path::new("repo"))
            .expect_err("relative cwd must fail");

        assert!(
            err.to_string().contains("cwd must be absolute"),
            "unexpected error: {err}"
        );
    }
}
