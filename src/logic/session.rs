//! Device Session
//!
//! One request/response exchange with the signing device. The device has no
//! framing protocol: we write the whole payload, half-close our write side,
//! and the device's own close marks the end of its response. One deadline
//! covers the entire exchange (connect, send, drain) so a stalled peer cannot
//! wedge the caller.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Read chunk size while draining the response
const RECV_CHUNK: usize = 16 * 1024;

/// Failure of a single exchange. In collect mode this is absorbed as a
/// latency sentinel; in sign mode it surfaces to the operator.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot resolve device address {addr}:{port}")]
    Resolve { addr: String, port: u16 },

    #[error("connect to {peer} failed: {source}")]
    Connect {
        peer: SocketAddr,
        source: std::io::Error,
    },

    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),

    #[error("receive failed: {0}")]
    Recv(#[source] std::io::Error),

    #[error("device did not complete the exchange within {0:?}")]
    Timeout(Duration),
}

/// Perform one exchange: connect, send `payload`, half-close, drain until the
/// device closes its side. Returns the accumulated response bytes.
pub fn exchange(
    addr: &str,
    port: u16,
    payload: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, SessionError> {
    let deadline = Instant::now() + timeout;

    let peer = (addr, port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| SessionError::Resolve {
            addr: addr.to_string(),
            port,
        })?;

    let stream = TcpStream::connect_timeout(&peer, timeout)
        .map_err(|source| SessionError::Connect { peer, source })?;

    send_all(&stream, payload, deadline, timeout)?;
    stream
        .shutdown(Shutdown::Write)
        .map_err(SessionError::Send)?;

    drain(&stream, deadline, timeout)
}

fn remaining(deadline: Instant, total: Duration) -> Result<Duration, SessionError> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        Err(SessionError::Timeout(total))
    } else {
        Ok(left)
    }
}

fn send_all(
    mut stream: &TcpStream,
    payload: &[u8],
    deadline: Instant,
    total: Duration,
) -> Result<(), SessionError> {
    stream
        .set_write_timeout(Some(remaining(deadline, total)?))
        .map_err(SessionError::Send)?;
    match stream.write_all(payload) {
        Ok(()) => Ok(()),
        Err(e) if is_timeout(&e) => Err(SessionError::Timeout(total)),
        Err(e) => Err(SessionError::Send(e)),
    }
}

fn drain(
    mut stream: &TcpStream,
    deadline: Instant,
    total: Duration,
) -> Result<Vec<u8>, SessionError> {
    let mut response = Vec::new();
    let mut chunk = [0u8; RECV_CHUNK];

    loop {
        stream
            .set_read_timeout(Some(remaining(deadline, total)?))
            .map_err(SessionError::Recv)?;

        match stream.read(&mut chunk) {
            Ok(0) => break, // peer closed: end of message
            Ok(n) => response.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if is_timeout(&e) => return Err(SessionError::Timeout(total)),
            Err(e) => return Err(SessionError::Recv(e)),
        }
    }

    log::debug!("device exchange complete, {} response bytes", response.len());
    Ok(response)
}

// Socket timeouts surface as WouldBlock on unix and TimedOut on windows.
fn is_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
