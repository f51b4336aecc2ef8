//! Blocking whois client (RFC 3912).
//!
//! Queries IANA first; if IANA refers the address to a regional registry the
//! registry is queried and its answer returned. The configured timeout is a
//! deadline for the whole lookup: both queries, including every connect,
//! write and read, share it, so a server trickling bytes can't stretch a
//! lookup past it.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{IpAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use log::debug;

use crate::domain::LookupError;

use super::resolver::DirectoryLookup;

pub const IANA_SERVER: &str = "whois.iana.org";
pub const WHOIS_PORT: u16 = 43;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const ARIN_SERVER: &str = "whois.arin.net";

const READ_CHUNK: usize = 4096;

/// A byte source whose next blocking read can be bounded
pub trait BoundedRead: Read {
    /// Bound the next read to `limit`, which is never zero
    ///
    /// # Errors
    /// Fails when the underlying source can't take a timeout
    fn bound_next_read(&mut self, limit: Duration) -> io::Result<()>;
}

impl BoundedRead for TcpStream {
    fn bound_next_read(&mut self, limit: Duration) -> io::Result<()> {
        self.set_read_timeout(Some(limit))
    }
}

/// Read until end of stream, failing with [`LookupError::Timeout`] once
/// `deadline` passes
///
/// Each read is bounded by the time left, not by a fresh timeout.
///
/// # Errors
/// Fails on timeout or on any other read error
pub fn read_to_end_before<R: BoundedRead>(
    reader: &mut R,
    deadline: Instant,
    timeout: Duration,
) -> Result<Vec<u8>, LookupError> {
    let mut body = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let left = time_left(deadline, timeout)?;
        reader.bound_next_read(left)?;
        match reader.read(&mut chunk) {
            Ok(0) => return Ok(body),
            Ok(n) => body.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(LookupError::Timeout { timeout });
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn time_left(deadline: Instant, timeout: Duration) -> Result<Duration, LookupError> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        Err(LookupError::Timeout { timeout })
    } else {
        Ok(left)
    }
}

#[derive(Debug, Clone)]
pub struct WhoisClient {
    timeout: Duration,
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl WhoisClient {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Send one query to `server` and read the whole response within the
    /// client's timeout
    ///
    /// # Errors
    /// Fails when the server can't be resolved or reached, answers with
    /// nothing, or doesn't finish answering in time
    pub fn query(&self, server: &str, query: &str) -> Result<String, LookupError> {
        self.query_before(server, query, Instant::now() + self.timeout)
    }

    fn query_before(
        &self,
        server: &str,
        query: &str,
        deadline: Instant,
    ) -> Result<String, LookupError> {
        let addr = (server, WHOIS_PORT)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| LookupError::Resolve { server: server.to_string() })?;

        let mut stream =
            TcpStream::connect_timeout(&addr, time_left(deadline, self.timeout)?).map_err(
                |source| match source.kind() {
                    ErrorKind::TimedOut => LookupError::Timeout { timeout: self.timeout },
                    _ => LookupError::Connect { server: server.to_string(), source },
                },
            )?;
        stream.set_write_timeout(Some(time_left(deadline, self.timeout)?))?;
        stream.write_all(format!("{query}\r\n").as_bytes())?;

        let body = read_to_end_before(&mut stream, deadline, self.timeout)?;

        let text = String::from_utf8_lossy(&body).into_owned();
        if text.trim().is_empty() {
            return Err(LookupError::EmptyResponse(server.to_string()));
        }
        Ok(text)
    }
}

/// The `refer:` server named in an IANA answer
#[must_use]
pub fn referral(iana_response: &str) -> Option<&str> {
    iana_response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let value = value.trim();
        (key.trim().eq_ignore_ascii_case("refer") && !value.is_empty()).then_some(value)
    })
}

/// Query text for `server`; ARIN wants the `n + <ip>` network form
#[must_use]
pub fn query_for(server: &str, ip: IpAddr) -> String {
    if server.eq_ignore_ascii_case(ARIN_SERVER) {
        format!("n + {ip}")
    } else {
        ip.to_string()
    }
}

impl DirectoryLookup for WhoisClient {
    fn lookup(&self, ip: IpAddr) -> Result<String, LookupError> {
        let deadline = Instant::now() + self.timeout;
        let iana = self.query_before(IANA_SERVER, &ip.to_string(), deadline)?;
        let Some(server) = referral(&iana) else {
            return Ok(iana);
        };
        debug!("whois {ip}: {IANA_SERVER} refers to {server}");
        self.query_before(server, &query_for(server, ip), deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral() {
        let iana = "% IANA WHOIS server\n\nrefer:        whois.ripe.net\n\ninetnum: 193.0.0.0\n";
        assert_eq!(referral(iana), Some("whois.ripe.net"));
        assert_eq!(referral("refer:\nstatus: ALLOCATED\n"), None);
        assert_eq!(referral("no referral"), None);
    }

    /// Serves `body` in `step`-sized pieces, sleeping `delay` before each,
    /// and records the bound set before every read
    struct Trickle {
        body: Vec<u8>,
        pos: usize,
        step: usize,
        delay: Duration,
        bounds: Vec<Duration>,
    }

    impl Trickle {
        fn new(body: &[u8], step: usize, delay: Duration) -> Self {
            Self { body: body.to_vec(), pos: 0, step, delay, bounds: Vec::new() }
        }
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let limit = *self.bounds.last().unwrap();
            if self.delay >= limit {
                std::thread::sleep(limit);
                return Err(ErrorKind::WouldBlock.into());
            }
            std::thread::sleep(self.delay);
            let end = (self.pos + self.step).min(self.body.len()).min(self.pos + buf.len());
            let n = end - self.pos;
            buf[..n].copy_from_slice(&self.body[self.pos..end]);
            self.pos = end;
            Ok(n)
        }
    }

    impl BoundedRead for Trickle {
        fn bound_next_read(&mut self, limit: Duration) -> io::Result<()> {
            self.bounds.push(limit);
            Ok(())
        }
    }

    #[test]
    fn test_read_completes_before_deadline() {
        let timeout = Duration::from_secs(5);
        let mut src = Trickle::new(b"refer: whois.ripe.net\n", 8, Duration::ZERO);
        let body = read_to_end_before(&mut src, Instant::now() + timeout, timeout).unwrap();
        assert_eq!(body, b"refer: whois.ripe.net\n");
        // The bound shrinks with the time already spent
        assert!(src.bounds.windows(2).all(|w| w[1] <= w[0]));
        assert!(src.bounds.iter().all(|b| *b <= timeout));
    }

    #[test]
    fn test_trickling_source_hits_deadline() {
        // Every read makes progress, so a per-read timeout would never fire
        let timeout = Duration::from_millis(150);
        let mut src = Trickle::new(&[b'x'; 10_000], 1, Duration::from_millis(20));
        let started = Instant::now();

        let err = read_to_end_before(&mut src, started + timeout, timeout).unwrap_err();
        assert!(matches!(err, LookupError::Timeout { timeout: t } if t == timeout));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(src.pos < 10_000);
    }

    #[test]
    fn test_expired_deadline_skips_read() {
        let timeout = Duration::from_millis(10);
        let mut src = Trickle::new(b"late", 4, Duration::ZERO);
        let err = read_to_end_before(&mut src, Instant::now(), timeout).unwrap_err();
        assert!(matches!(err, LookupError::Timeout { .. }));
        assert!(src.bounds.is_empty());
    }

    #[test]
    fn test_arin_query_form() {
        let ip: IpAddr = "8.8.8.8".parse().unwrap();
        assert_eq!(query_for("whois.arin.net", ip), "n + 8.8.8.8");
        assert_eq!(query_for("whois.ripe.net", ip), "8.8.8.8");
    }
}
