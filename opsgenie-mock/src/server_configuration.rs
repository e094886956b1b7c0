use std::net::{Ipv4Addr, SocketAddr};

/// Settings used when starting an [`OpsGenieServer`](crate::OpsGenieServer).
///
/// The defaults bind an ephemeral port on the loopback interface and let tokio pick the number of
/// worker threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfiguration {
    bind_address: SocketAddr,
    worker_threads: Option<usize>,
}

impl ServerConfiguration {
    pub fn new() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            worker_threads: None,
        }
    }

    pub fn set_bind_address<A: Into<SocketAddr>>(&mut self, bind_address: A) {
        self.bind_address = bind_address.into();
    }

    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Sets the number of runtime worker threads. Zero is treated as one.
    pub fn set_worker_threads(&mut self, worker_threads: usize) {
        self.worker_threads = Some(worker_threads.max(1));
    }

    pub fn worker_threads(&self) -> Option<usize> {
        self.worker_threads
    }
}

impl Default for ServerConfiguration {
    fn default() -> Self {
        Self::new()
    }
}
