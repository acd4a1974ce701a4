//! Loading `resizer.toml`.
//!
//! ```toml
//! [resizer]
//! max_formula_length = 255
//! literal_prefix = "'"
//!
//! [sheet]
//! max_rows = 1048576
//! max_columns = 16384
//! ```

use directories::ProjectDirs;
use resizer_core::{ResizerConfig, SheetLimits};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub resizer: ResizerConfig,
    pub sheet: SheetSettings,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetSettings {
    pub max_rows: u32,
    pub max_columns: u32,
}

impl Default for SheetSettings {
    fn default() -> Self {
        let limits = SheetLimits::default();
        SheetSettings {
            max_rows: limits.max_rows,
            max_columns: limits.max_columns,
        }
    }
}

impl SheetSettings {
    pub fn limits(&self) -> SheetLimits {
        SheetLimits {
            max_rows: self.max_rows,
            max_columns: self.max_columns,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("me", "shoryuken", "resizer")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("resizer.toml");
    Some(path)
}

pub fn parse_settings(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(content)
}

/// Load settings from `explicit`, or from the user config dir when no path
/// is given. Problems are reported as warnings and defaults are used.
pub fn load_settings(explicit: Option<&Path>) -> (Settings, Vec<String>) {
    let mut warnings = Vec::new();
    let Some(path) = explicit.map(Path::to_path_buf).or_else(default_config_path) else {
        return (Settings::default(), warnings);
    };

    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Settings::default(), warnings);
    }

    let settings = match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            None
        }
        Ok(_) => match std::fs::read_to_string(&path) {
            Ok(content) => match parse_settings(&content) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                    None
                }
            },
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                None
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                path.display(),
                err
            ));
            None
        }
    };

    (settings.unwrap_or_default(), warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_path_names_resizer_toml() {
        if let Some(path) = default_config_path() {
            assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("resizer.toml"));
        }
    }

    #[test]
    fn test_parse_partial_settings_keeps_defaults() {
        let settings = parse_settings(
            r#"
            [resizer]
            literal_prefix = "`"

            [sheet]
            max_rows = 100
            "#,
        )
        .unwrap();
        assert_eq!(settings.resizer.literal_prefix, "`");
        assert_eq!(settings.resizer.max_formula_length, 255);
        assert_eq!(settings.sheet.limits().max_rows, 100);
        assert_eq!(settings.sheet.limits().max_columns, 16_384);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(parse_settings("[resizer]\nmax_formula_lenght = 10\n").is_err());
    }

    #[test]
    fn test_load_reports_parse_errors_as_warnings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sheet]\nmax_rows = \"many\"").unwrap();

        let (settings, warnings) = load_settings(Some(file.path()));
        assert_eq!(settings, Settings::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[resizer]\nmax_formula_length = 80").unwrap();

        let (settings, warnings) = load_settings(Some(file.path()));
        assert!(warnings.is_empty());
        assert_eq!(settings.resizer.max_formula_length, 80);
    }

    #[test]
    fn test_missing_explicit_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let (settings, warnings) = load_settings(Some(dir.path().join("nope.toml").as_path()));
        assert_eq!(settings, Settings::default());
        assert!(warnings[0].starts_with("Config file not found"));
    }
}
