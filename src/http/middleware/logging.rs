use crate::http::Response;
use crate::http::middleware::{Middleware, Next};
use crate::http::request::RequestContext;
use std::time::Instant;

/// Writes one access-log line per routed request.
pub struct LoggingMw {}

impl Middleware for LoggingMw {
    fn handle(&self, ctx: &RequestContext, next: Next) -> anyhow::Result<Response> {
        let started = Instant::now();
        let req = ctx.request();
        let agent = ctx.get_header("user-agent").unwrap_or("-");
        let result = next.run(ctx);

        match &result {
            Ok(resp) => log::info!(
                "{} {} {} -> {} ({:?}, {})",
                req.method,
                req.url,
                req.version.as_deref().unwrap_or("-"),
                resp.status.code_num,
                started.elapsed(),
                agent
            ),
            Err(e) => log::error!(
                "{} {} -> handler failed after {:?}: {:#}",
                req.method,
                req.url,
                started.elapsed(),
                e
            ),
        }

        result
    }
}
