use crate::config::ReadLimits;
use crate::http::method::Method;
use crate::http::request::Request;
use bytes::Bytes;
use std::cmp::min;
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Read};
use std::str::FromStr;
use thiserror::Error;

const BUFFER_SIZE: usize = 1024;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("connection closed before a request line was sent")]
    EmptyStream,
    #[error("bad request line: {0:?}")]
    BadRequestLine(String),
    #[error("unsupported HTTP version: {0}")]
    UnsupportedVersion(String),
    #[error("invalid header line: {0:?}")]
    InvalidHeader(String),
    #[error("request head exceeds {0} bytes")]
    HeadersTooLarge(usize),
    #[error("request head is not valid UTF-8")]
    NotUtf8,
    #[error("invalid content-length: {0:?}")]
    InvalidContentLength(String),
    #[error("content-length {length} exceeds limit of {limit} bytes")]
    BodyTooLarge { length: usize, limit: usize },
    #[error("body ended after {received} of {expected} bytes")]
    IncompleteBody { expected: usize, received: usize },
    #[error("i/o error while reading request")]
    Io(#[from] io::Error),
}

impl RequestError {
    /// Errors caused by what the client sent, as opposed to the transport.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            RequestError::EmptyStream | RequestError::IncompleteBody { .. } | RequestError::Io(_)
        )
    }
}

pub fn read_request(readable: &mut impl Read, limits: ReadLimits) -> Result<Request, RequestError> {
    let mut rdr = BufReader::new(readable);
    let mut budget = limits.max_header_bytes;

    let first_line = match read_head_line(&mut rdr, &mut budget, limits.max_header_bytes)? {
        Some(line) => line,
        None => return Err(RequestError::EmptyStream),
    };
    let (method, url, version) = parse_request_line(&first_line)?;

    let mut headers: HashMap<String, String> = HashMap::new();
    while let Some(line) = read_head_line(&mut rdr, &mut budget, limits.max_header_bytes)? {
        if line.is_empty() {
            break;
        }

        let (k, v) = line
            .split_once(':')
            .ok_or_else(|| RequestError::InvalidHeader(line.clone()))?;
        let k = k.trim_ascii();
        if k.is_empty() {
            return Err(RequestError::InvalidHeader(line));
        }
        let (k, v) = (k.to_lowercase(), String::from(v.trim_ascii()));

        // Repeating content-length is only tolerated when every copy agrees.
        if k == "content-length" {
            if let Some(prev) = headers.get(&k).filter(|prev| **prev != v) {
                return Err(RequestError::InvalidContentLength(format!("{}, {}", prev, v)));
            }
        }
        headers.insert(k, v);
    }

    let content = match headers.get("content-length") {
        Some(raw) => {
            let length = parse_content_length(raw)?;
            if length > limits.max_body_bytes {
                return Err(RequestError::BodyTooLarge {
                    length,
                    limit: limits.max_body_bytes,
                });
            }
            read_content(&mut rdr, length)?
        }
        None => Bytes::new(),
    };

    Ok(Request {
        method,
        url,
        version,
        headers,
        content,
    })
}

/// Plain decimal digits only; `usize::from_str` would also take a leading `+`.
fn parse_content_length(raw: &str) -> Result<usize, RequestError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RequestError::InvalidContentLength(raw.to_string()));
    }
    raw.parse()
        .map_err(|_| RequestError::InvalidContentLength(raw.to_string()))
}

fn parse_request_line(line: &str) -> Result<(Method, String, Option<String>), RequestError> {
    let parts: Vec<&str> = line.split(' ').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(RequestError::BadRequestLine(line.to_string()));
    }

    let (method_raw, target, version) = match parts[..] {
        [method_raw, target] => (method_raw, target, None),
        [method_raw, target, version] => {
            if version != "HTTP/1.1" && version != "HTTP/1.0" {
                return Err(RequestError::UnsupportedVersion(version.to_string()));
            }
            (method_raw, target, Some(version.to_string()))
        }
        _ => return Err(RequestError::BadRequestLine(line.to_string())),
    };

    // Every token parses; unknown ones land in `Method::Other`.
    let method = Method::from_str(method_raw)
        .unwrap_or_else(|_| Method::Other(method_raw.to_string()));

    Ok((method, String::from(target), version))
}

/// Reads one CRLF (or LF) terminated line of the request head, charging it
/// against `budget`. Returns `None` at end of stream.
fn read_head_line<R: BufRead>(
    rdr: &mut R,
    budget: &mut usize,
    limit: usize,
) -> Result<Option<String>, RequestError> {
    let mut buf = Vec::new();
    let n = rdr.by_ref().take(*budget as u64).read_until(b'\n', &mut buf)?;
    if n == 0 {
        if *budget == 0 {
            return Err(RequestError::HeadersTooLarge(limit));
        }
        return Ok(None);
    }

    *budget -= n;
    if !buf.ends_with(b"\n") && *budget == 0 {
        return Err(RequestError::HeadersTooLarge(limit));
    }

    let line = String::from_utf8(buf).map_err(|_| RequestError::NotUtf8)?;
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn read_content<R: Read>(rdr: &mut R, content_length: usize) -> Result<Bytes, RequestError> {
    let mut content = Vec::with_capacity(min(BUFFER_SIZE, content_length));
    rdr.by_ref()
        .take(content_length as u64)
        .read_to_end(&mut content)?;

    if content.len() < content_length {
        return Err(RequestError::IncompleteBody {
            expected: content_length,
            received: content.len(),
        });
    }
    Ok(Bytes::from(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(raw: &[u8]) -> Result<Request, RequestError> {
        read_request(&mut Cursor::new(raw.to_vec()), ReadLimits::default())
    }

    #[test]
    fn parses_get_without_body() {
        let req = parse(b"GET /api/users/ HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url, "/api/users/");
        assert_eq!(req.version.as_deref(), Some("HTTP/1.1"));
        assert_eq!(req.get_header("host"), Some("localhost"));
        assert!(req.content.is_empty());
    }

    #[test]
    fn header_keys_are_lowercased_and_values_trimmed() {
        let req = parse(b"GET / HTTP/1.1\r\nX-Thing:   spaced out  \r\nAccept: a:b\r\n\r\n").unwrap();
        assert_eq!(req.headers.get("x-thing").map(String::as_str), Some("spaced out"));
        assert_eq!(req.get_header("ACCEPT"), Some("a:b"));
    }

    #[test]
    fn reads_exactly_content_length_bytes() {
        let body = r#"{"name":"Zoe"}"#;
        let raw = format!(
            "POST /api/users/ HTTP/1.1\r\ncOnTeNt-LeNgTh: {}\r\n\r\n{}trailing",
            body.len(),
            body
        );
        let req = parse(raw.as_bytes()).unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(&req.content[..], body.as_bytes());
    }

    #[test]
    fn missing_content_length_means_empty_body() {
        let req = parse(b"POST /api/users/ HTTP/1.1\r\n\r\n{\"name\":\"x\"}").unwrap();
        assert!(req.content.is_empty());
    }

    #[test]
    fn accepts_bare_lf_and_two_token_request_line() {
        let req = parse(b"DELETE /api/users/3\n\n").unwrap();
        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.url, "/api/users/3");
        assert_eq!(req.version, None);
    }

    #[test]
    fn headers_may_end_with_the_stream() {
        let req = parse(b"GET /api/users/ HTTP/1.1\r\nHost: x\r\n").unwrap();
        assert_eq!(req.get_header("host"), Some("x"));
    }

    #[test]
    fn empty_stream_is_reported() {
        assert!(matches!(parse(b""), Err(RequestError::EmptyStream)));
    }

    #[test]
    fn rejects_malformed_request_lines() {
        for raw in [
            &b"GET\r\n\r\n"[..],
            b"\r\n\r\n",
            b"GET  /api/users/ HTTP/1.1\r\n\r\n",
            b"GET /a HTTP/1.1 extra\r\n\r\n",
        ] {
            let err = parse(raw).unwrap_err();
            assert!(matches!(err, RequestError::BadRequestLine(_)), "{:?}", err);
            assert!(err.is_client_error());
        }
        assert!(matches!(
            parse(b"GET / HTTP/2\r\n\r\n"),
            Err(RequestError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn unknown_method_is_kept() {
        let req = parse(b"BREW /pot HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.method, Method::Other("BREW".to_string()));
    }

    #[test]
    fn rejects_header_without_colon() {
        let err = parse(b"GET / HTTP/1.1\r\nnot a header\r\n\r\n").unwrap_err();
        assert!(matches!(err, RequestError::InvalidHeader(_)));
    }

    #[test]
    fn rejects_bad_content_length() {
        for value in ["abc", "-1", "", "+5", "5 5", "0x10", "99999999999999999999999"] {
            let raw = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", value);
            let err = parse(raw.as_bytes()).unwrap_err();
            assert!(matches!(err, RequestError::InvalidContentLength(_)), "{:?}", err);
        }
    }

    #[test]
    fn duplicate_content_length_must_agree() {
        let req = parse(b"POST / HTTP/1.1\r\nContent-Length: 2\r\ncontent-length: 2\r\n\r\nok").unwrap();
        assert_eq!(&req.content[..], b"ok");

        let err = parse(b"POST / HTTP/1.1\r\nContent-Length: 2\r\nContent-Length: 5\r\n\r\nhello")
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidContentLength(_)), "{:?}", err);
        assert!(err.is_client_error());
    }

    #[test]
    fn early_close_during_body_is_an_error() {
        let err = parse(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc").unwrap_err();
        match err {
            RequestError::IncompleteBody { expected, received } => {
                assert_eq!(expected, 10);
                assert_eq!(received, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn enforces_head_and_body_limits() {
        let limits = ReadLimits {
            max_header_bytes: 64,
            max_body_bytes: 4,
        };

        let raw = format!("GET / HTTP/1.1\r\nX-Big: {}\r\n\r\n", "a".repeat(100));
        let err = read_request(&mut Cursor::new(raw.into_bytes()), limits).unwrap_err();
        assert!(matches!(err, RequestError::HeadersTooLarge(64)));

        let raw = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello".to_vec();
        let err = read_request(&mut Cursor::new(raw), limits).unwrap_err();
        assert!(matches!(err, RequestError::BodyTooLarge { length: 5, limit: 4 }));
    }

    #[test]
    fn rejects_non_utf8_head() {
        let err = parse(b"GET /\xff HTTP/1.1\r\n\r\n").unwrap_err();
        assert!(matches!(err, RequestError::NotUtf8));
    }
}
