use bytes::Bytes;
use serde::Serialize;
use status::Status;
use std::collections::HashMap;

pub mod deadline;
pub mod handler;
pub mod method;
pub mod middleware;
pub mod parse;
pub mod request;
pub mod router;
pub mod server;
pub mod status;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug)]
pub struct Response {
    pub status: Status,
    pub headers: HashMap<String, String>,
    pub content: Option<Bytes>,
}

impl Response {
    pub fn from_parts(
        status: Status,
        headers: HashMap<String, String>,
        content: Option<Bytes>,
    ) -> Response {
        Response {
            status,
            headers,
            content,
        }
    }

    pub fn json<T: Serialize + ?Sized>(status: Status, value: &T) -> anyhow::Result<Response> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::with_type(status, JSON_CONTENT_TYPE, body))
    }

    pub fn text(status: Status, message: impl Into<String>) -> Response {
        Self::with_type(status, TEXT_CONTENT_TYPE, message.into().into_bytes())
    }

    fn with_type(status: Status, content_type: &str, body: Vec<u8>) -> Response {
        let headers = HashMap::from([("Content-Type".to_string(), content_type.to_string())]);
        Response::from_parts(status, headers, Some(Bytes::from(body)))
    }
}

pub fn not_found() -> Response {
    Response::text(Status::NOT_FOUND, "Not Found")
}

pub fn bad_request(reason: impl Into<String>) -> Response {
    Response::text(Status::BAD_REQUEST, reason)
}

pub fn internal_error() -> Response {
    Response::text(Status::INTERNAL_SERVER_ERROR, "Internal Server Error")
}
