use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Mutex;
use std::time::Duration;
use tracing::trace;

/// One accepted TCP connection, shared between the accept loop and the
/// worker that owns its lifetime.
///
/// The socket handle lives behind a mutex so `close` never races `send` /
/// `recv` from another thread. Reads and writes are blocking, bounded by
/// whatever timeout [`TcpConnection::set_timeout`] installed; a timeout, a
/// peer close and an I/O error all surface uniformly as a zero-byte read.
pub struct TcpConnection {
    stream: Mutex<Option<TcpStream>>,
    peer: SocketAddr,
}

impl TcpConnection {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> TcpConnection {
        TcpConnection {
            stream: Mutex::new(Some(stream)),
            peer,
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_open(&self) -> bool {
        self.stream.lock().unwrap().is_some()
    }

    /// Install both receive and send timeouts.
    pub fn set_timeout(&self, timeout: Option<Duration>) {
        let guard = self.stream.lock().unwrap();
        if let Some(stream) = guard.as_ref() {
            let _ = stream.set_read_timeout(timeout);
            let _ = stream.set_write_timeout(timeout);
        }
    }

    /// Read into `buf`, returning the byte count; 0 means closed, errored
    /// or timed out and always ends the connection's request loop.
    pub fn recv(&self, buf: &mut [u8]) -> usize {
        let mut guard = self.stream.lock().unwrap();
        let Some(stream) = guard.as_mut() else {
            return 0;
        };
        match stream.read(buf) {
            Ok(n) => n,
            Err(err) => {
                trace!(peer = %self.peer, %err, "recv failed");
                0
            }
        }
    }

    /// Write all of `data`, looping over partial writes. Returns the total
    /// number of bytes that reached the socket.
    pub fn send_all(&self, data: &[u8]) -> usize {
        let mut guard = self.stream.lock().unwrap();
        let Some(stream) = guard.as_mut() else {
            return 0;
        };
        let mut sent = 0;
        while sent < data.len() {
            match stream.write(&data[sent..]) {
                Ok(0) => break,
                Ok(n) => sent += n,
                Err(err) => {
                    trace!(peer = %self.peer, %err, "send failed");
                    break;
                }
            }
        }
        sent
    }

    /// Shut the socket down and drop it. Idempotent; also runs on drop.
    pub fn close(&self) {
        let mut guard = self.stream.lock().unwrap();
        if let Some(stream) = guard.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        self.close();
    }
}
