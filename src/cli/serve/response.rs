//! HTTP response handlers.

use anyhow::{Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::surface::blob::Blob;
use crate::utils::mime::{HTML, PLAIN};

/// Respond with the shell page.
pub fn respond_shell(request: Request, body: String) -> Result<()> {
    let response = Response::from_string(body)
        .with_header(header("Content-Type", HTML)?)
        .with_header(header("Cache-Control", "no-store")?);
    respond(request, response)
}

/// Respond with a blob, honouring `If-None-Match`.
pub fn respond_blob(request: Request, blob: &Blob) -> Result<()> {
    if if_none_match(&request).is_some_and(|tag| tag == blob.etag) {
        let response = Response::empty(StatusCode(304)).with_header(header("ETag", &blob.etag)?);
        return respond(request, response);
    }

    let body = if is_head_request(&request) {
        Vec::new()
    } else {
        blob.body.as_bytes().to_vec()
    };
    let response = Response::from_data(body)
        .with_header(header("Content-Type", HTML)?)
        .with_header(header("ETag", &blob.etag)?)
        .with_header(header("Cache-Control", "no-cache")?);
    respond(request, response)
}

/// Respond with 404 (unknown route or revoked blob).
pub fn respond_not_found(request: Request) -> Result<()> {
    send_plain(request, 404, "404 Not Found")
}

/// Respond with 405 for anything but GET/HEAD.
pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    send_plain(request, 405, "405 Method Not Allowed")
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_plain(request, 503, "503 Service Unavailable")
}

pub fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn if_none_match(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case("if-none-match"))
        .map(|h| h.value.to_string())
}

fn send_plain(request: Request, status: u16, body: &str) -> Result<()> {
    let response = Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", PLAIN)?);
    respond(request, response)
}

fn respond<R: std::io::Read>(request: Request, response: Response<R>) -> Result<()> {
    request.respond(response)?;
    Ok(())
}

fn header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header {key}: {value}"))
}
