use std::time::Duration;

pub const LISTEN_ADDR: &str = "0.0.0.0:4444";

const READ_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_DEADLINE: Duration = Duration::from_secs(30);
const MAX_HEADER_BYTES: usize = 8 * 1024;
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    /// Longest gap between two reads.
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    /// Total time allowed for reading one request, head and body together.
    pub request_deadline: Duration,
    /// Upper bound for the request line plus all header lines.
    pub max_header_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: LISTEN_ADDR.to_string(),
            read_timeout: READ_TIMEOUT,
            write_timeout: WRITE_TIMEOUT,
            request_deadline: REQUEST_DEADLINE,
            max_header_bytes: MAX_HEADER_BYTES,
            max_body_bytes: MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn limits(&self) -> ReadLimits {
        ReadLimits {
            max_header_bytes: self.max_header_bytes,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadLimits {
    pub max_header_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for ReadLimits {
    fn default() -> Self {
        ServerConfig::default().limits()
    }
}
