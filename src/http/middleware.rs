use crate::http::Response;
use crate::http::handler::HandlerFunc;
use crate::http::request::RequestContext;

pub mod logging;

pub trait Middleware: Send + Sync {
    fn handle(&self, ctx: &RequestContext, next: Next) -> anyhow::Result<Response>;
}

pub struct Next<'a> {
    pub(crate) middlewares: &'a [Box<dyn Middleware>],
    pub(crate) handler: &'a HandlerFunc,
}

impl<'a> Next<'a> {
    pub fn run(self, ctx: &RequestContext) -> anyhow::Result<Response> {
        if let Some((first, rest)) = self.middlewares.split_first() {
            let next = Next {
                middlewares: rest,
                handler: self.handler,
            };
            first.handle(ctx, next)
        } else {
            (self.handler)(ctx)
        }
    }
}
