//! process configuration
//!
//! Built once before the first invocation and shared read-only afterwards.

/// Environment variable holding the ARN of the custom resource provider
pub const SERVICE_TOKEN_ENV: &str = "LAMBDA_ARN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroConfig {
    service_token: String,
}

impl MacroConfig {
    /// Rejects a token that is empty or consists only of whitespace
    pub fn new(service_token: impl Into<String>) -> Result<Self, ConfigError> {
        let service_token = service_token.into();
        if service_token.trim().is_empty() {
            return Err(ConfigError::EmptyServiceToken);
        }

        Ok(Self { service_token })
    }

    /// Reads the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(SERVICE_TOKEN_ENV) {
            Ok(value) => Self::new(value),
            Err(std::env::VarError::NotPresent) => Err(ConfigError::MissingVar(SERVICE_TOKEN_ENV)),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(SERVICE_TOKEN_ENV)),
        }
    }

    /// Like [MacroConfig::from_env] but with the environment supplied by the caller
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = lookup(SERVICE_TOKEN_ENV).ok_or(ConfigError::MissingVar(SERVICE_TOKEN_ENV))?;
        Self::new(value)
    }

    /// Value injected as `Properties.ServiceToken`
    pub fn service_token(&self) -> &str {
        &self.service_token
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {0} is not valid unicode")]
    NotUnicode(&'static str),
    #[error("service token must not be empty or blank")]
    EmptyServiceToken,
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARN: &str = "arn:aws:lambda:ap-northeast-1:123456789012:function:mackerel";

    #[test]
    fn from_lookup() {
        let config = MacroConfig::from_lookup(|key| (key == "LAMBDA_ARN").then(|| ARN.to_string()))
            .expect("valid config");
        assert_eq!(config.service_token(), ARN);
    }

    #[test]
    fn missing_var() {
        let err = MacroConfig::from_lookup(|_| None).expect_err("must error");
        assert_eq!(err, ConfigError::MissingVar("LAMBDA_ARN"));
    }

    #[test]
    fn empty_token() {
        assert_eq!(MacroConfig::new(""), Err(ConfigError::EmptyServiceToken));
        assert_eq!(
            MacroConfig::from_lookup(|_| Some("  ".to_string())),
            Err(ConfigError::EmptyServiceToken)
        );
    }
}
