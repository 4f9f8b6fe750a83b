use anyhow::Result;
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};

use crate::config::CorsConfig;

/// Build a CORS layer from config. Returns `None` when CORS is disabled.
///
/// With credentials enabled, `*` methods and headers are mirrored from the
/// request instead of answered with a literal wildcard.
///
/// # Errors
/// Returns an error if `allowed_origins` contains `"*"` while
/// `allow_credentials` is `true`.
pub fn build_cors_layer(cfg: &CorsConfig) -> Result<Option<CorsLayer>> {
    if !cfg.enabled {
        return Ok(None);
    }
    cfg.validate()?;

    let mirror = cfg.allow_credentials;
    let mut layer = CorsLayer::new();

    // Allowed origins
    if cfg.allowed_origins.iter().any(|o| o == "*") {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cfg
            .allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();
        if !origins.is_empty() {
            layer = layer.allow_origin(origins);
        }
    }

    // Methods
    if cfg.allowed_methods.iter().any(|m| m == "*") {
        layer = if mirror {
            layer.allow_methods(AllowMethods::mirror_request())
        } else {
            layer.allow_methods(Any)
        };
    } else {
        let methods: Vec<Method> = cfg
            .allowed_methods
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        if !methods.is_empty() {
            layer = layer.allow_methods(methods);
        }
    }

    // Headers
    if cfg.allowed_headers.iter().any(|h| h == "*") {
        layer = if mirror {
            layer.allow_headers(AllowHeaders::mirror_request())
        } else {
            layer.allow_headers(Any)
        };
    } else {
        let headers: Vec<HeaderName> = cfg
            .allowed_headers
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        if !headers.is_empty() {
            layer = layer.allow_headers(headers);
        }
    }

    if cfg.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    if cfg.max_age_seconds > 0 {
        layer = layer.max_age(std::time::Duration::from_secs(cfg.max_age_seconds));
    }

    Ok(Some(layer))
}
