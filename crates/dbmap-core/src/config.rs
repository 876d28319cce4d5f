use crate::dialect::{Dialect, DialectKind};
use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// DbConfig
///
/// Optional TOML-backed settings for a `Db` handle.
///
/// ```toml
/// dialect = "postgres"
/// log_statements = true
/// ```
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    pub dialect: DialectKind,

    /// Log every compiled statement at debug level instead of trace.
    pub log_statements: bool,
}

impl DbConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(ConfigError::Parse)
    }

    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect.dialect()
    }
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("dbmap: invalid config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_defaults_to_sqlite() {
        let config = DbConfig::from_toml_str("").unwrap();

        assert_eq!(config, DbConfig::default());
        assert_eq!(config.dialect().name, "sqlite");
        assert!(!config.log_statements);
    }

    #[test]
    fn dialect_and_logging_are_read() {
        let config = DbConfig::from_toml_str(
            r#"
            dialect = "postgres"
            log_statements = true
            "#,
        )
        .unwrap();

        assert_eq!(config.dialect, DialectKind::Postgres);
        assert!(config.dialect().custom_insert.is_some());
        assert!(config.log_statements);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = DbConfig::from_toml_str("pool_size = 4").unwrap_err();

        assert!(err.to_string().starts_with("dbmap: invalid config"));
    }

    #[test]
    fn unknown_dialect_is_rejected() {
        assert!(DbConfig::from_toml_str(r#"dialect = "oracle""#).is_err());
    }
}
