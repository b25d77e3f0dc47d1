//! Deployment environment.
//!
//! Components that behave differently per deployment (password work factor,
//! cookie `Secure` flag) take an [`Environment`] at construction. Nothing in
//! the service reads ambient environment state after startup.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown environment `{0}` (expected development, test or production)")]
pub struct UnknownEnvironment(pub String);

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            other => Err(UnknownEnvironment(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_case_insensitively() {
        assert_eq!("production".parse(), Ok(Environment::Production));
        assert_eq!("PROD".parse(), Ok(Environment::Production));
        assert_eq!("dev".parse(), Ok(Environment::Development));
        assert_eq!(" test ".parse(), Ok(Environment::Test));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn only_production_is_production() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Test.is_production());
    }
}
