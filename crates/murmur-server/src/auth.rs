use axum::{
    Json,
    extract::Request,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};

/// Alternative header for clients that can't send a bearer token
const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests without the configured API key
///
/// The key is accepted as `Authorization: Bearer <key>` or `X-API-Key: <key>`.
/// Public paths skip the check.
pub async fn auth_middleware(api_key: SecretString, public_paths: Vec<String>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if public_paths.iter().any(|p| path.starts_with(p.as_str())) {
        return next.run(request).await;
    }

    let authorized = presented_key(request.headers()).map(|key| keys_match(key, api_key.expose_secret()));

    match authorized {
        Some(true) => next.run(request).await,
        Some(false) => {
            tracing::warn!(%path, "rejected request with invalid API key");
            unauthorized("Invalid API key")
        }
        None => unauthorized("Missing API key"),
    }
}

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .or_else(|| headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()))
        .map(str::trim)
}

/// Compare without short-circuiting on the first differing byte
fn keys_match(presented: &str, expected: &str) -> bool {
    presented.len() == expected.len()
        && presented
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

fn unauthorized(message: &str) -> Response {
    let body = serde_json::json!({
        "error": {
            "message": message,
            "type": "authentication_error",
            "code": StatusCode::UNAUTHORIZED.as_u16(),
        }
    });

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
