//! Deployment mode controlling how much internal detail errors expose.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where the service runs.
///
/// Development exposes raw engine messages and error traces in responses;
/// production replaces them with fixed, non-leaking sentences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentMode {
    /// Local or test deployments.
    Development,
    /// Anything reachable by real clients.
    #[default]
    Production,
}

impl DeploymentMode {
    /// Whether internal details may be returned to clients.
    #[must_use]
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Name recorded on request log rows.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "Development",
            Self::Production => "Production",
        }
    }
}

/// Raised when a deployment mode string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown deployment mode '{0}'; expected development|production")]
pub struct UnknownDeploymentMode(String);

impl FromStr for DeploymentMode {
    type Err = UnknownDeploymentMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(UnknownDeploymentMode(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Development", DeploymentMode::Development)]
    #[case("dev", DeploymentMode::Development)]
    #[case(" PRODUCTION ", DeploymentMode::Production)]
    #[case("prod", DeploymentMode::Production)]
    fn parses_known_names(#[case] raw: &str, #[case] expected: DeploymentMode) {
        assert_eq!(raw.parse::<DeploymentMode>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_names() {
        assert!("staging".parse::<DeploymentMode>().is_err());
    }

    #[rstest]
    fn defaults_to_production() {
        assert_eq!(DeploymentMode::default(), DeploymentMode::Production);
    }
}
