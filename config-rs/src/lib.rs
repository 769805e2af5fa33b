//! config-rs/lib.rs
//! Shared configuration utilities for service ports and bind addresses.
//! Settings come from `<SERVICE>_SERVICE_ADDR` and `<SERVICE>_SERVICE_PORT`.

use std::env;
use std::net::{Ipv4Addr, SocketAddr};

/// Get service port from environment variables with proper fallback
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "CONTENT")
/// * `default_port` - The default port to use if not specified in environment
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    match env::var(&var_name) {
        Ok(value) => value.trim().parse::<u16>().unwrap_or_else(|_| {
            log::warn!("Invalid port in {}, using default {}", var_name, default_port);
            default_port
        }),
        Err(_) => default_port,
    }
}

/// Parse `host:port`, optionally prefixed with `http://` or `https://`
fn parse_address(value: &str) -> Option<SocketAddr> {
    let trimmed = value
        .trim()
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');
    trimmed.parse().ok()
}

/// Create a SocketAddr for binding a service
///
/// A full address in `<SERVICE>_SERVICE_ADDR` wins; otherwise the service
/// listens on all interfaces at the configured port.
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr_str) = env::var(&var_name) {
        match parse_address(&addr_str) {
            Some(addr) => return addr,
            None => log::warn!("Invalid address format in {}, using default", var_name),
        }
    }

    let port = get_service_port(service_name, default_port);
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

/// Get service name for logging and monitoring
pub fn get_formatted_service_name(service_name: &str) -> String {
    match service_name.to_uppercase().as_str() {
        "CONTENT" => "content-service".to_string(),
        other => format!("{}-service", other.to_lowercase().replace('_', "-")),
    }
}
