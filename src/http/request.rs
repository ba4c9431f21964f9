use crate::http::method::Method;
use bytes::Bytes;
use std::collections::HashMap;

pub type UrlVars = HashMap<String, String>;

#[derive(Debug)]
pub struct RequestContext<'a> {
    request: &'a Request,
    url_vars: UrlVars,
}

impl RequestContext<'_> {
    pub fn from(request: &Request, url_vars: UrlVars) -> RequestContext<'_> {
        RequestContext { request, url_vars }
    }

    pub fn get_var(&self, k: &str) -> Option<&str> {
        self.url_vars.get(k).map(|v| v.as_str())
    }

    pub fn get_header(&self, k: &str) -> Option<&str> {
        self.request.get_header(k)
    }

    pub fn body(&self) -> &[u8] {
        &self.request.content
    }

    pub fn request(&self) -> &Request {
        self.request
    }
}

/// One parsed request. Header keys are stored lower-cased with trimmed values.
#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub version: Option<String>,
    pub headers: HashMap<String, String>,
    pub content: Bytes,
}

impl Request {
    pub fn get_header(&self, k: &str) -> Option<&str> {
        self.headers.get(&k.to_lowercase()).map(|v| v.as_str())
    }
}
