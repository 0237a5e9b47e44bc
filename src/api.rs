//! HTTP API for the barista service

mod handlers;
mod types;

pub use handlers::create_router;

use crate::config::LOCAL_FRONTEND_ORIGIN;
use crate::runtime::Barista;
use axum::http::{header, request, HeaderValue, Method};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub barista: Arc<Barista>,
}

impl AppState {
    pub fn new(barista: Arc<Barista>) -> Self {
        Self { barista }
    }
}

/// CORS for the local frontend, the configured frontend, and Vercel previews
pub fn cors_layer(frontend_url: Option<String>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _: &request::Parts| {
            origin
                .to_str()
                .is_ok_and(|origin| is_allowed_origin(origin, frontend_url.as_deref()))
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(true)
}

fn is_allowed_origin(origin: &str, frontend_url: Option<&str>) -> bool {
    if origin == LOCAL_FRONTEND_ORIGIN || frontend_url == Some(origin) {
        return true;
    }
    // https://<label>.vercel.app
    origin
        .strip_prefix("https://")
        .and_then(|rest| rest.strip_suffix(".vercel.app"))
        .is_some_and(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins() {
        assert!(is_allowed_origin("http://localhost:3000", None));
        assert!(is_allowed_origin(
            "https://barista.example.com",
            Some("https://barista.example.com")
        ));
        assert!(is_allowed_origin("https://barista-git-main.vercel.app", None));
    }

    #[test]
    fn test_rejected_origins() {
        assert!(!is_allowed_origin("http://localhost:8080", None));
        assert!(!is_allowed_origin("https://barista.example.com", None));
        assert!(!is_allowed_origin("http://preview.vercel.app", None));
        assert!(!is_allowed_origin("https://.vercel.app", None));
        assert!(!is_allowed_origin("https://a.b.vercel.app", None));
        assert!(!is_allowed_origin("https://evil.com/x.vercel.app", None));
    }
}
