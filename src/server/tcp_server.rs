use super::connection::TcpConnection;
use super::thread_pool::ThreadPool;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{info, warn};

/// Callback invoked on a worker thread for every accepted connection.
pub type ConnectionHandler = dyn Fn(Arc<TcpConnection>) + Send + Sync + 'static;

/// Blocking TCP acceptor in front of a bounded [`ThreadPool`].
///
/// One dedicated thread accepts connections and hands each one to the pool
/// with a non-blocking enqueue; when the queue is full the connection is
/// closed immediately rather than stalling accept (backpressure by
/// shedding). The listener prefers IPv6 with `IPV6_V6ONLY = 0` so a single
/// socket serves both families, and falls back to IPv4 for literal IPv4
/// bind addresses.
pub struct TcpServer {
    bind_addr: String,
    port: u16,
    thread_count: usize,
    max_queue_size: usize,
    handler: Arc<ConnectionHandler>,
    pool: Option<Arc<ThreadPool>>,
    local_addr: Option<SocketAddr>,
    running: Arc<AtomicBool>,
    accept_thread: Option<JoinHandle<()>>,
}

impl TcpServer {
    pub fn new(
        bind_addr: &str,
        port: u16,
        thread_count: usize,
        max_queue_size: usize,
        handler: Arc<ConnectionHandler>,
    ) -> TcpServer {
        TcpServer {
            bind_addr: bind_addr.to_string(),
            port,
            thread_count,
            max_queue_size,
            handler,
            pool: None,
            local_addr: None,
            running: Arc::new(AtomicBool::new(false)),
            accept_thread: None,
        }
    }

    /// The address actually bound, available after [`TcpServer::start`].
    /// Useful when binding port 0 in tests.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Bind, listen and spawn the accept thread.
    ///
    /// Bind and listen failures are fatal and returned to the caller; once
    /// this returns `Ok` the accept loop only logs transient errors.
    pub fn start(&mut self) -> io::Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let listener = match self.bind_listener() {
            Ok(listener) => listener,
            Err(err) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(err);
            }
        };
        self.local_addr = Some(listener.local_addr()?);

        let pool = Arc::new(ThreadPool::new(self.thread_count, self.max_queue_size));
        self.pool = Some(Arc::clone(&pool));

        let running = Arc::clone(&self.running);
        let handler = Arc::clone(&self.handler);
        let accept_thread = std::thread::Builder::new()
            .name("tcp-accept".to_string())
            .spawn(move || accept_loop(listener, running, handler, pool))?;
        self.accept_thread = Some(accept_thread);

        info!(addr = %self.local_addr.unwrap(), "listening");
        Ok(())
    }

    /// Stop accepting, wake the accept thread and join it. In-flight
    /// worker jobs finish while the pool shuts down.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        // Wake the blocking accept with a throwaway local connection; the
        // loop re-checks the running flag on every wakeup and then drops
        // the listener on its way out.
        if let Some(addr) = self.local_addr {
            let _ = TcpStream::connect((Ipv6Addr::LOCALHOST, addr.port()));
            let _ = TcpStream::connect((Ipv4Addr::LOCALHOST, addr.port()));
        }

        if let Some(thread) = self.accept_thread.take() {
            let _ = thread.join();
        }
        // Last pool reference: dropping joins the workers.
        self.pool = None;
        info!("server stopped");
    }

    fn bind_listener(&self) -> io::Result<TcpListener> {
        let any = self.bind_addr.is_empty() || self.bind_addr == "::" || self.bind_addr == "0.0.0.0";
        if any {
            return bind_dual_stack(SocketAddr::from((Ipv6Addr::UNSPECIFIED, self.port)));
        }

        if let Ok(v6) = self.bind_addr.parse::<Ipv6Addr>() {
            match bind_dual_stack(SocketAddr::from((v6, self.port))) {
                Ok(listener) => return Ok(listener),
                Err(err) => {
                    warn!(addr = %self.bind_addr, %err, "IPv6 bind failed");
                }
            }
        }

        if let Ok(v4) = self.bind_addr.parse::<Ipv4Addr>() {
            return bind_v4(SocketAddr::from((v4, self.port)));
        }

        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid bind address: {}", self.bind_addr),
        ))
    }
}

impl Drop for TcpServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// IPv6 listener with `IPV6_V6ONLY` cleared and `SO_REUSEADDR` set.
fn bind_dual_stack(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::IPV6, Type::STREAM, Some(Protocol::TCP))?;
    let _ = socket.set_only_v6(false);
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    Ok(socket.into())
}

fn bind_v4(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    Ok(socket.into())
}

fn accept_loop(
    listener: TcpListener,
    running: Arc<AtomicBool>,
    handler: Arc<ConnectionHandler>,
    pool: Arc<ThreadPool>,
) {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let conn = Arc::new(TcpConnection::new(stream, peer));
                let handler = Arc::clone(&handler);
                let queued = pool.try_execute({
                    let conn = Arc::clone(&conn);
                    move || {
                        handler(Arc::clone(&conn));
                        conn.close();
                    }
                });
                if !queued {
                    // Queue full: shed the connection instead of blocking.
                    warn!(peer = %conn.peer_addr(), "connection dropped, worker queue full");
                    conn.close();
                }
            }
            Err(err) => {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                warn!(%err, "accept failed");
            }
        }
    }
}
