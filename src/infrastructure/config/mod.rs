use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::table::TypeInference;

const DEFAULT_CONFIG_FILE: &str = "tabconv.toml";
const CONFIG_PATH_ENV: &str = "TABCONV_CONFIG";
const ENV_PREFIX: &str = "TABCONV_";

/// Excel caps worksheet names at 31 characters
const MAX_SHEET_NAME_LEN: usize = 31;
const SHEET_NAME_FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest decoded upload accepted by the HTTP layer
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            max_upload_bytes: 200 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Levels of nested JSON objects flattened into dotted column names
    pub json_normalize_depth: usize,
    /// Overrides the built-in missing-value spellings
    pub na_tokens: Option<Vec<String>>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            json_normalize_depth: 1,
            na_tokens: None,
        }
    }
}

impl IngestSettings {
    pub fn type_inference(&self) -> TypeInference {
        match &self.na_tokens {
            Some(tokens) => TypeInference::new().with_na_tokens(tokens.iter().cloned()),
            None => TypeInference::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub rows: usize,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self { rows: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub max_columns: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self { max_columns: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub sheet_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
        }
    }
}

/// Runtime configuration: defaults, then `tabconv.toml`, then `TABCONV_*`
/// environment variables (nested keys split on `__`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub server: ServerSettings,
    pub ingest: IngestSettings,
    pub preview: PreviewSettings,
    pub chart: ChartSettings,
    pub export: ExportSettings,
    pub log_filter: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            ingest: IngestSettings::default(),
            preview: PreviewSettings::default(),
            chart: ChartSettings::default(),
            export: ExportSettings::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl ConverterConfig {
    /// Load from `.env`, the config file named by `TABCONV_CONFIG` (or
    /// `tabconv.toml`), and the environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::load_from(&path)
    }

    /// A missing file is not an error; the defaults and environment apply
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: ConverterConfig = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::ConfigError("server.port must be > 0".to_string()));
        }
        if self.preview.rows == 0 {
            return Err(AppError::ConfigError("preview.rows must be > 0".to_string()));
        }
        if self.chart.max_columns == 0 {
            return Err(AppError::ConfigError(
                "chart.max_columns must be > 0".to_string(),
            ));
        }
        let sheet = self.export.sheet_name.trim();
        if sheet.is_empty() {
            return Err(AppError::ConfigError(
                "export.sheet_name must not be empty".to_string(),
            ));
        }
        if sheet.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(AppError::ConfigError(format!(
                "export.sheet_name must be at most {} characters",
                MAX_SHEET_NAME_LEN
            )));
        }
        if sheet.contains(SHEET_NAME_FORBIDDEN)
            || sheet.starts_with('\'')
            || sheet.ends_with('\'')
        {
            return Err(AppError::ConfigError(format!(
                "export.sheet_name contains characters Excel does not allow: {}",
                sheet
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_are_valid() {
        let config = ConverterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.preview.rows, 5);
        assert_eq!(config.chart.max_columns, 2);
        assert_eq!(config.export.sheet_name, "Sheet1");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConverterConfig::load_from(Path::new("absent.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(config, ConverterConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "tabconv.toml",
                r#"
                log_filter = "debug"

                [server]
                port = 8080

                [preview]
                rows = 10
                "#,
            )?;
            jail.set_env("TABCONV_SERVER__PORT", "9090");

            let config = ConverterConfig::load_from(Path::new("tabconv.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.preview.rows, 10);
            assert_eq!(config.log_filter, "debug");
            assert_eq!(config.server.host, "127.0.0.1");
            Ok(())
        });
    }

    #[test]
    fn test_rejects_long_sheet_name() {
        let mut config = ConverterConfig::default();
        config.export.sheet_name = "x".repeat(32);
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), "config_error");
    }

    #[test]
    fn test_rejects_sheet_name_excel_cannot_store() {
        for name in ["Q1/Q2", "[raw]", "'quoted'"] {
            let mut config = ConverterConfig::default();
            config.export.sheet_name = name.to_string();
            assert_eq!(config.validate().unwrap_err().kind(), "config_error", "{}", name);
        }
    }

    #[test]
    fn test_custom_na_tokens() {
        let settings = IngestSettings {
            na_tokens: Some(vec!["?".to_string()]),
            ..IngestSettings::default()
        };
        let inference = settings.type_inference();
        assert!(inference.is_na("?"));
        assert!(!inference.is_na("NA"));
    }
}
