//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{
        HeaderMap,
        header::{CONTENT_TYPE, HeaderValue},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::internal_server_error::InternalServerError;

/// Bodies longer than this many bytes are truncated at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields whose values never appear in the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level. If a body
/// is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated and the
/// full body is logged at the `debug` level. Passwords in form submissions
/// are redacted.
///
/// Only text bodies are read. Other bodies, such as the server-sent event
/// stream and file downloads, are passed through untouched.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let request = if is_text(&parts.headers) {
        let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::error!("could not read request body: {error}");
                return InternalServerError::default().into_response();
            }
        };
        let body_text = String::from_utf8_lossy(&body_bytes);

        if is_form(&parts.headers) {
            log_request(&parts, &redact_form(&body_text));
        } else {
            log_request(&parts, &body_text);
        }

        Request::from_parts(parts, Body::from(body_bytes))
    } else {
        log_request(&parts, "<not logged>");
        Request::from_parts(parts, body)
    };

    let response = next.run(request).await;
    let (parts, body) = response.into_parts();

    if !is_text(&parts.headers) {
        log_response(&parts, "<not logged>");
        return Response::from_parts(parts, body);
    }

    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            Bytes::new()
        }
    };
    log_response(&parts, &String::from_utf8_lossy(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value: &HeaderValue| value.to_str().ok())
}

/// Whether the body is text that can be read in full, bodies without a content type are assumed to be empty.
fn is_text(headers: &HeaderMap) -> bool {
    match content_type(headers) {
        None => true,
        Some(content_type) => {
            content_type.starts_with("text/html")
                || content_type.starts_with("text/plain")
                || content_type.starts_with("application/json")
                || content_type.starts_with("application/x-www-form-urlencoded")
        }
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    content_type(headers)
        .is_some_and(|content_type| content_type.starts_with("application/x-www-form-urlencoded"))
}

/// Replace the values of [REDACTED_FIELDS] in a URL encoded form.
fn redact_form(form_text: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if REDACTED_FIELDS.contains(&name) => format!("{name}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// The first [LOG_BODY_LENGTH_LIMIT] bytes of `body`, shortened to a character boundary.
fn truncate_body(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {parts:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {parts:#?}\nbody: {body:?}");
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {parts:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {parts:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, middleware, routing::post};
    use axum_test::TestServer;

    use super::{LOG_BODY_LENGTH_LIMIT, logging_middleware, redact_form, truncate_body};

    #[test]
    fn redacts_password_fields() {
        let form = "email=test%40example.com&password=hunter2&confirm_password=hunter2";

        assert_eq!(
            redact_form(form),
            "email=test%40example.com&password=********&confirm_password=********"
        );
    }

    #[test]
    fn leaves_other_fields_alone() {
        let form = "amount=12.5&description=password%20manager";

        assert_eq!(redact_form(form), form);
    }

    #[test]
    fn truncates_on_character_boundary() {
        let body = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let truncated = truncate_body(&body);

        assert!(truncated.len() <= LOG_BODY_LENGTH_LIMIT);
        assert!(truncated.chars().all(|c| c == 'é'));
    }

    #[tokio::test]
    async fn passes_body_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post("/echo")
            .form(&[("email", "test@example.com"), ("password", "hunter2")])
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "email=test%40example.com&password=hunter2");
    }
}
