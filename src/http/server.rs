use crate::concurrency::ConnectionTasks;
use crate::config::ServerConfig;
use crate::http;
use crate::http::deadline::DeadlineReader;
use crate::http::handler::HandlerFunc;
use crate::http::method::Method;
use crate::http::middleware::logging::LoggingMw;
use crate::http::middleware::{Middleware, Next};
use crate::http::parse::{RequestError, read_request};
use crate::http::request::{Request, RequestContext};
use crate::http::router::Router;
use crate::http::Response;
use anyhow::Context;
use std::io::{self, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub struct Server {
    listener: TcpListener,
    router: Router,
    tasks: ConnectionTasks,
    middlewares: Vec<Box<dyn Middleware>>,
    config: ServerConfig,
}

impl Server {
    fn new(listener: TcpListener, config: ServerConfig) -> Server {
        let mut s = Server {
            listener,
            router: Router::new(),
            tasks: ConnectionTasks::new(),
            middlewares: Vec::new(),
            config,
        };

        s.add_middleware(Box::new(LoggingMw {}));
        s
    }

    pub fn from_config(config: ServerConfig) -> anyhow::Result<Server> {
        let listener = TcpListener::bind(&config.addr)
            .with_context(|| format!("Can't bind address {}", config.addr))?;
        Ok(Server::new(listener, config))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn add_handler(&mut self, m: Method, pattern: &str, f: HandlerFunc) -> anyhow::Result<()> {
        self.router.add(m, pattern, f)
    }

    pub fn add_middleware(&mut self, m: Box<dyn Middleware>) {
        self.middlewares.push(m);
    }

    /// Accepts connections until the listener fails. Each connection gets its
    /// own thread and exactly one request/response cycle.
    pub fn run(self) -> anyhow::Result<()> {
        log::info!(
            "listening on {} with {} routes",
            self.local_addr()?,
            self.router.len()
        );

        let server = Arc::new(self);
        for stream in server.listener.incoming() {
            let stream = stream.context("Error accepting connection")?;
            let thread_server = Arc::clone(&server);
            if let Err(e) = server
                .tasks
                .spawn(move || thread_server.process_incoming(stream))
            {
                log::error!("can't spawn connection thread: {}", e);
            }
        }
        Ok(())
    }

    fn process_incoming(&self, mut stream: TcpStream) {
        let peer = stream.peer_addr().ok();
        log::debug!(
            "accepted connection from {:?} ({} live)",
            peer,
            self.tasks.live()
        );

        if let Err(e) = stream.set_write_timeout(Some(self.config.write_timeout)) {
            log::warn!("can't set write timeout for {:?}: {}", peer, e);
        }

        let mut reader = DeadlineReader::new(
            &stream,
            self.config.read_timeout,
            self.config.request_deadline,
        );
        let response = match read_request(&mut reader, self.config.limits()) {
            Ok(request) => self.dispatch(&request),
            Err(RequestError::EmptyStream) => {
                log::debug!("{:?} closed without sending a request", peer);
                return;
            }
            Err(e) if e.is_client_error() => {
                log::warn!("rejecting request from {:?}: {}", peer, e);
                http::bad_request(e.to_string())
            }
            Err(e) => {
                log::error!("failed reading request from {:?}: {:#}", peer, anyhow::Error::from(e));
                http::internal_error()
            }
        };

        if let Err(e) = stream
            .write_all(&serialize_response(&response))
            .and_then(|_| stream.flush())
        {
            log::warn!("can't write response to {:?}: {}", peer, e);
        }
    }

    fn dispatch(&self, req: &Request) -> Response {
        let Some((route, vars)) = self.router.find(&req.method, &req.url) else {
            log::info!("{} {} -> 404 (no route)", req.method, req.url);
            return http::not_found();
        };

        log::debug!("{} {} matched {}", req.method, req.url, route.pattern());
        let ctx = RequestContext::from(req, vars);
        let next = Next {
            middlewares: self.middlewares.as_ref(),
            handler: &route.f,
        };

        match panic::catch_unwind(AssertUnwindSafe(|| next.run(&ctx))) {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                log::debug!("{} {} failed: {:?}", req.method, req.url, e);
                http::internal_error()
            }
            Err(_) => {
                log::error!("handler for {} {} panicked", req.method, req.url);
                http::internal_error()
            }
        }
    }
}

pub fn serialize_response(response: &Response) -> Vec<u8> {
    let content_len = response.content.as_ref().map(|c| c.len()).unwrap_or(0);
    let mut resp_bytes = Vec::with_capacity(content_len + (response.headers.len() + 3) * 32);

    resp_bytes.extend(
        format!(
            "HTTP/1.1 {} {}\r\n",
            response.status.code_num, response.status.message
        )
        .as_bytes(),
    );

    for (key, value) in &response.headers {
        resp_bytes.extend(format!("{}: {}\r\n", key, value).as_bytes());
    }

    resp_bytes.extend(format!("Content-Length: {}\r\n", content_len).as_bytes());
    resp_bytes.extend("Connection: close\r\n\r\n".as_bytes());

    if let Some(c) = &response.content {
        resp_bytes.extend_from_slice(c);
    }

    resp_bytes
}
