//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate listener addresses and timeout ranges
//! - Validate every route the same way route table construction does
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::routing::Route;

/// A single semantic problem in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("route #{index}: pattern must not be empty")]
    EmptyPattern { index: usize },

    #[error("route '{pattern}': invalid backend URL '{url}': {source}")]
    InvalidBackendUrl {
        pattern: String,
        url: String,
        source: url::ParseError,
    },

    #[error("route '{pattern}': backend URL '{url}' has no host")]
    MissingBackendHost { pattern: String, url: String },

    #[error("route '{pattern}': unsupported backend scheme '{scheme}', only http is supported")]
    UnsupportedScheme { pattern: String, scheme: String },

    #[error("route '{pattern}': invalid method token '{method}'")]
    InvalidMethod { pattern: String, method: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: String },

    #[error("invalid {field} '{address}'")]
    InvalidAddress { field: &'static str, address: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);
    check_address("admin.bind_address", &config.admin.bind_address, &mut errors);

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "timeouts.connect_secs".to_string(),
        });
    }
    if config.timeouts.response_header_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "timeouts.response_header_secs".to_string(),
        });
    }

    for (index, route) in config.routes.iter().enumerate() {
        if let Err(route_errors) = Route::from_config(index, route, &config.timeouts) {
            errors.extend(route_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, address: &str, errors: &mut Vec<ValidationError>) {
    if address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            address: address.to_string(),
        });
    }
}
