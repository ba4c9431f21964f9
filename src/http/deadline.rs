use std::io::{self, Read};
use std::net::TcpStream;
use std::time::{Duration, Instant};

/// Reads from a socket until a fixed deadline. Before every read the socket
/// timeout is shrunk to what is left of the deadline, so a client trickling
/// bytes under the idle timeout still runs out of time.
pub struct DeadlineReader<'a> {
    stream: &'a TcpStream,
    idle: Duration,
    deadline: Instant,
}

impl<'a> DeadlineReader<'a> {
    pub fn new(stream: &'a TcpStream, idle: Duration, total: Duration) -> DeadlineReader<'a> {
        DeadlineReader {
            stream,
            idle,
            deadline: Instant::now() + total,
        }
    }
}

impl Read for DeadlineReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let left = self.deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "request deadline exceeded",
            ));
        }

        self.stream.set_read_timeout(Some(left.min(self.idle)))?;
        self.stream.read(buf)
    }
}
