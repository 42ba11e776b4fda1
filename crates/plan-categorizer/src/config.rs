//! Configuration management for plan-categorizer.
//!
//! Configuration is an optional YAML file. Every field has a default, so an
//! empty file (or no file at all) yields a working configuration.
//!
//! ```yaml
//! sentinels:
//!   launch-blocking: arn:aws:rmsv2:::milestone/26ab1cff-e0b3-49d8-82a4-efd6e5e2b677
//!   mandatory: arn:aws:rmsv2:::milestone/b05fdb54-ff54-44e9-9549-9085402268ed
//! services: [ec2, s3]
//! report:
//!   services-per-line: 10
//! ```

use crate::domain::ServiceId;
use crate::engine::Sentinels;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

/// Default number of successor services per line in the basic report.
pub const DEFAULT_SERVICES_PER_LINE: usize = 10;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CategorizerConfig {
    /// The milestones that categorize everything that reaches them
    pub sentinels: Sentinels,

    /// Services to classify. `None` classifies every service with nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<ServiceId>>,

    /// Report formatting
    pub report: ReportConfig,
}

/// Report formatting section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ReportConfig {
    /// Successor services joined per line in the basic report
    pub services_per_line: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            services_per_line: DEFAULT_SERVICES_PER_LINE,
        }
    }
}

impl CategorizerConfig {
    /// Load configuration from a YAML file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Load configuration from `path`, or defaults when no path is given.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The service allowlist as a set, if one is configured.
    pub fn service_filter(&self) -> Option<HashSet<ServiceId>> {
        self.services
            .as_ref()
            .map(|services| services.iter().cloned().collect())
    }

    fn validate(&self) -> Result<()> {
        if self.sentinels.launch_blocking == self.sentinels.mandatory {
            return Err(Error::Config(
                "launch-blocking and mandatory sentinels must differ".to_string(),
            ));
        }
        if self.report.services_per_line == 0 {
            return Err(Error::Config(
                "report.services-per-line must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Arn;
    use crate::engine::{DEFAULT_LAUNCH_BLOCKING_ARN, DEFAULT_MANDATORY_ARN};

    #[test]
    fn empty_yaml_is_default() {
        let config = CategorizerConfig::from_yaml("  \n").unwrap();
        assert_eq!(config, CategorizerConfig::default());
        assert_eq!(
            config.sentinels.launch_blocking,
            Arn::new(DEFAULT_LAUNCH_BLOCKING_ARN)
        );
        assert_eq!(config.sentinels.mandatory, Arn::new(DEFAULT_MANDATORY_ARN));
        assert!(config.service_filter().is_none());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = CategorizerConfig::from_yaml(
            "sentinels:\n  mandatory: arn:m/custom\nservices: [ec2, s3]\n",
        )
        .unwrap();

        assert_eq!(config.sentinels.mandatory, Arn::new("arn:m/custom"));
        assert_eq!(
            config.sentinels.launch_blocking,
            Arn::new(DEFAULT_LAUNCH_BLOCKING_ARN)
        );
        assert_eq!(config.report.services_per_line, DEFAULT_SERVICES_PER_LINE);
        let filter = config.service_filter().unwrap();
        assert!(filter.contains("ec2") && filter.contains("s3"));
    }

    #[test]
    fn rejects_identical_sentinels() {
        let err = CategorizerConfig::from_yaml(
            "sentinels:\n  launch-blocking: arn:m/x\n  mandatory: arn:m/x\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_zero_services_per_line() {
        let err =
            CategorizerConfig::from_yaml("report:\n  services-per-line: 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("services-per-line")));
    }

    #[tokio::test]
    async fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CategorizerConfig::load(&dir.path().join("absent.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn default_when_no_path() {
        let config = CategorizerConfig::load_or_default(None).await.unwrap();
        assert_eq!(config, CategorizerConfig::default());
    }
}
