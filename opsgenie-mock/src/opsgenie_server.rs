use crate::{
    error::Error,
    runner::{RequestLog, Runner},
    RecordedRequest, ServerConfiguration,
};
use std::{net::SocketAddr, sync::Mutex};

/// An HTTP server standing in for the OpsGenie alert API in tests.
///
/// Every request it receives is answered with an empty `200 OK` and recorded, in arrival order,
/// together with its `Authorization` header and decoded alert body. The server is ready as soon
/// as it's constructed and keeps its recorded requests after it has been closed.
///
/// ```no_run
/// use opsgenie_mock::OpsGenieServer;
///
/// let server = OpsGenieServer::new()?;
/// // point the client under test at `server.url()` and let it send alerts
/// server.close();
///
/// for request in server.requests() {
///     println!("{} {}", request.url, request.post_data.message);
/// }
/// # Ok::<(), opsgenie_mock::Error>(())
/// ```
#[derive(Debug)]
pub struct OpsGenieServer {
    url: String,
    address: SocketAddr,
    requests: RequestLog,
    runner: Mutex<Option<Runner>>,
}

impl OpsGenieServer {
    /// Starts a server on an ephemeral loopback port.
    pub fn new() -> Result<Self, Error> {
        Self::with_configuration(ServerConfiguration::default())
    }

    pub fn with_configuration(configuration: ServerConfiguration) -> Result<Self, Error> {
        let requests = RequestLog::default();
        let runner = Runner::start(&configuration, requests.clone())?;
        let address = runner.address();

        Ok(Self {
            url: format!("http://{}", address),
            address,
            requests,
            runner: Mutex::new(Some(runner)),
        })
    }

    /// The base URL, `http://<host>:<port>`, clients should send their requests to.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Returns a copy of every request recorded so far, in the order they were recorded.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Forgets every request recorded so far. The server keeps recording afterwards.
    pub fn reset(&self) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Shuts the server down. Only the first call has any effect and the recorded requests stay
    /// available.
    pub fn close(&self) {
        let mut runner = self.runner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(runner) = runner.take() {
            runner.shutdown();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.runner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

impl Drop for OpsGenieServer {
    fn drop(&mut self) {
        self.close();
    }
}
