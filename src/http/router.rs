use crate::http::handler::HandlerFunc;
use crate::http::method::Method;
use crate::http::request::UrlVars;
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PATTERN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?P<var>[a-z][a-z0-9_]*)(?::(?P<kind>int))?>").unwrap());

pub struct Route {
    method: Method,
    regex: Regex,
    pattern: String,
    pub f: HandlerFunc,
}

impl Route {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn url_vars(&self, capt: &Captures) -> UrlVars {
        self.regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                capt.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect()
    }
}

/// Ordered route table. The first route whose method and full path both match
/// wins, so a specific pattern must be added before a general one that could
/// match the same path.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

/// Turns `/api/users/<id:int>` into `^/api/users/(?<id>\d+)$`. A bare `<name>`
/// matches a single path segment.
fn compile_pattern(pattern: &str) -> anyhow::Result<Regex> {
    let mut out = String::from("^");
    let mut last = 0;
    for capt in PATTERN_RE.captures_iter(pattern) {
        let (Some(whole), Some(var)) = (capt.get(0), capt.name("var")) else {
            continue;
        };
        out.push_str(&regex::escape(&pattern[last..whole.start()]));
        let class = match capt.name("kind") {
            Some(_) => r"\d+",
            None => r"[^/?]+",
        };
        out.push_str(&format!("(?<{}>{})", var.as_str(), class));
        last = whole.end();
    }
    out.push_str(&regex::escape(&pattern[last..]));
    out.push('$');

    Regex::new(&out).with_context(|| format!("Invalid route pattern {}", pattern))
}

impl Router {
    pub fn new() -> Router {
        Router::default()
    }

    pub fn add(&mut self, m: Method, pattern: &str, f: HandlerFunc) -> anyhow::Result<()> {
        let regex = compile_pattern(pattern)?;
        self.routes.push(Route {
            method: m,
            regex,
            pattern: pattern.to_string(),
            f,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn find(&self, method: &Method, path: &str) -> Option<(&Route, UrlVars)> {
        self.routes
            .iter()
            .filter(|r| &r.method == method)
            .find_map(|r| r.regex.captures(path).map(|c| (r, r.url_vars(&c))))
    }
}
