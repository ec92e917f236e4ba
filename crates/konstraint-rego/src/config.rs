use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Environment variable consulted by [`ParserConfig::from_env`].
pub const MALFORMED_LABELS_ENV: &str = "KONSTRAINT_MALFORMED_LABELS";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// What to do with a `@matchlabels` token that has no `=`
    #[serde(default)]
    pub malformed_labels: MalformedLabelPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum MalformedLabelPolicy {
    /// Fail the parse with `MalformedLabel`
    #[default]
    Reject,
    /// Keep the token as a key with an empty value
    EmptyValue,
}

impl MalformedLabelPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "empty-value" | "empty_value" => Some(Self::EmptyValue),
            _ => None,
        }
    }
}

// YAML and the environment accept the same spellings
impl TryFrom<String> for MalformedLabelPolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| {
            format!(
                "unknown malformed_labels policy {:?}, expected reject or empty-value",
                value
            )
        })
    }
}

impl ParserConfig {
    /// Load config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load config from environment or defaults
    pub fn from_env() -> Self {
        let malformed_labels = match std::env::var(MALFORMED_LABELS_ENV) {
            Ok(value) => MalformedLabelPolicy::parse(&value).unwrap_or_else(|| {
                tracing::warn!(
                    "Ignoring unknown {} value {:?}, using default",
                    MALFORMED_LABELS_ENV,
                    value
                );
                MalformedLabelPolicy::default()
            }),
            Err(_) => MalformedLabelPolicy::default(),
        };

        ParserConfig { malformed_labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let cfg = ParserConfig::default();
        assert_eq!(cfg.malformed_labels, MalformedLabelPolicy::Reject);
    }

    #[test]
    fn test_config_yaml_parse() {
        let yaml = r#"
malformed_labels: empty-value
"#;

        let cfg = ParserConfig::from_yaml(yaml).expect("parse failed");
        assert_eq!(cfg.malformed_labels, MalformedLabelPolicy::EmptyValue);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let cfg = ParserConfig::from_yaml("").expect("parse failed");
        assert_eq!(cfg, ParserConfig::default());

        let cfg = ParserConfig::from_yaml("{}").expect("parse failed");
        assert_eq!(cfg, ParserConfig::default());
    }

    #[test]
    fn test_invalid_policy_value() {
        let yaml = r#"
malformed_labels: maybe
"#;

        let result = ParserConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile failed");
        writeln!(file, "malformed_labels: reject").expect("write failed");

        let cfg = ParserConfig::from_file(file.path()).expect("load failed");
        assert_eq!(cfg.malformed_labels, MalformedLabelPolicy::Reject);
    }

    #[test]
    fn test_config_file_not_found() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let result = ParserConfig::from_file(dir.path().join("missing.yaml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            MalformedLabelPolicy::parse("reject"),
            Some(MalformedLabelPolicy::Reject)
        );
        assert_eq!(
            MalformedLabelPolicy::parse(" Empty-Value "),
            Some(MalformedLabelPolicy::EmptyValue)
        );
        assert_eq!(MalformedLabelPolicy::parse("accept"), None);
    }

    #[test]
    fn test_yaml_accepts_env_spellings() {
        for value in ["empty-value", "empty_value", "EMPTY-VALUE", "Empty_Value"] {
            let yaml = format!("malformed_labels: {}", value);
            let cfg = ParserConfig::from_yaml(&yaml).expect("parse failed");
            assert_eq!(
                cfg.malformed_labels,
                MalformedLabelPolicy::EmptyValue,
                "value: {}",
                value
            );
        }

        let cfg = ParserConfig::from_yaml("malformed_labels: REJECT").expect("parse failed");
        assert_eq!(cfg.malformed_labels, MalformedLabelPolicy::Reject);
    }

    #[test]
    fn test_serialized_policy_is_kebab_case() {
        let cfg = ParserConfig {
            malformed_labels: MalformedLabelPolicy::EmptyValue,
        };
        let yaml = serde_yaml::to_string(&cfg).expect("serialize failed");
        assert_eq!(yaml.trim(), "malformed_labels: empty-value");
        assert_eq!(ParserConfig::from_yaml(&yaml).expect("parse failed"), cfg);
    }

    // Sole reader and writer of the variable in this crate, so the
    // assignments below are not raced by other tests
    #[test]
    fn test_config_from_env() {
        std::env::remove_var(MALFORMED_LABELS_ENV);
        assert_eq!(
            ParserConfig::from_env().malformed_labels,
            MalformedLabelPolicy::Reject
        );

        std::env::set_var(MALFORMED_LABELS_ENV, "empty-value");
        assert_eq!(
            ParserConfig::from_env().malformed_labels,
            MalformedLabelPolicy::EmptyValue
        );

        std::env::set_var(MALFORMED_LABELS_ENV, "EMPTY_VALUE");
        assert_eq!(
            ParserConfig::from_env().malformed_labels,
            MalformedLabelPolicy::EmptyValue
        );

        // Unknown values fall back to the default
        std::env::set_var(MALFORMED_LABELS_ENV, "bogus");
        assert_eq!(
            ParserConfig::from_env().malformed_labels,
            MalformedLabelPolicy::Reject
        );

        std::env::remove_var(MALFORMED_LABELS_ENV);
    }
}
