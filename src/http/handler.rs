use crate::http::Response;
use crate::http::request::RequestContext;

/// An `Err` means the handler failed unexpectedly and becomes a 500. Expected
/// outcomes such as 400 and 404 are returned as `Ok` responses.
pub type HandlerFunc = Box<dyn Fn(&RequestContext) -> anyhow::Result<Response> + Sync + Send>;
