// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! Environment-based configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment type for deployment-specific behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated testing
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database backed by a file
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory `SQLite`, used by tests
    Memory,
}

impl DatabaseUrl {
    /// Parse from a connection-string style value
    ///
    /// # Errors
    ///
    /// Returns an error for URL schemes other than `sqlite:`.
    pub fn parse(url: &str) -> Result<Self> {
        if url == "sqlite::memory:" {
            return Ok(Self::Memory);
        }
        url.strip_prefix("sqlite:").map_or_else(
            || {
                anyhow::bail!("Unsupported DATABASE_URL '{url}': only sqlite: URLs are supported")
            },
            |path| {
                Ok(Self::SQLite {
                    path: PathBuf::from(path),
                })
            },
        )
    }

    /// Render as a sqlx connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".into(),
        }
    }
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Deployment environment
    pub environment: Environment,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Recognized variables: `HTTP_PORT` (default 3000), `DATABASE_URL`
    /// (default `sqlite:data/fratelli.db`), `ENVIRONMENT`.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but unparseable.
    pub fn from_env() -> Result<Self> {
        let http_port = match env::var("HTTP_PORT") {
            Ok(port) => port
                .parse::<u16>()
                .with_context(|| format!("Invalid HTTP_PORT '{port}'"))?,
            Err(_) => 3000,
        };

        let database_url = DatabaseUrl::parse(
            &env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/fratelli.db".into()),
        )?;

        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT").unwrap_or_default(),
        );

        Ok(Self {
            http_port,
            database_url,
            environment,
        })
    }

    /// One-line configuration summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "environment={} http_port={} database={}",
            self.environment,
            self.http_port,
            self.database_url.to_connection_string()
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_database_url_parse() {
        let url = DatabaseUrl::parse("sqlite:data/fratelli.db").unwrap();
        assert_eq!(url.to_connection_string(), "sqlite:data/fratelli.db");

        let memory = DatabaseUrl::parse("sqlite::memory:").unwrap();
        assert_eq!(memory.to_connection_string(), "sqlite::memory:");

        assert!(DatabaseUrl::parse("postgresql://localhost/x").is_err());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("anything"),
            Environment::Development
        );
        assert!(Environment::Production.is_production());
    }
}
