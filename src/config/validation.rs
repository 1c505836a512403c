//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! collected so an operator sees every mistake in one run.

use std::net::{SocketAddr, ToSocketAddrs};

use thiserror::Error;

use crate::config::schema::TrackerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: '{value}' does not resolve to a bindable address")]
    UnresolvableAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("store.data_path must not be empty")]
    EmptyDataPath,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &TrackerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Resolved the same way the listener binds, so host names are accepted.
    let resolves = config
        .listener
        .bind_address
        .to_socket_addrs()
        .is_ok_and(|mut addrs| addrs.next().is_some());
    if !resolves {
        errors.push(ValidationError::UnresolvableAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("limits.max_body_bytes"));
    }

    if matches!(config.store.data_path.as_deref(), Some(p) if p.trim().is_empty()) {
        errors.push(ValidationError::EmptyDataPath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&TrackerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = TrackerConfig::default();
        config.listener.bind_address = "localhost".into();
        config.timeouts.request_secs = 0;
        config.limits.max_body_bytes = 0;
        config.store.data_path = Some("  ".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero("timeouts.request_secs")));
        assert!(errors.contains(&ValidationError::EmptyDataPath));
        assert!(errors.contains(&ValidationError::UnresolvableAddress {
            field: "listener.bind_address",
            value: "localhost".into(),
        }));
    }

    #[test]
    fn test_bind_address_accepts_host_names() {
        let mut config = TrackerConfig::default();
        config.listener.bind_address = "localhost:3000".into();
        assert!(validate_config(&config).is_ok());

        config.listener.bind_address = "[::1]:3000".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_must_be_literal() {
        let mut config = TrackerConfig::default();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "localhost:9090".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidAddress {
                field: "observability.metrics_address",
                value: "localhost:9090".into(),
            }]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = TrackerConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(validate_config(&config).unwrap_err().len(), 1);
    }
}
