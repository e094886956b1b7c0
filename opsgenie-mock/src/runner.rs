use crate::{error::Error, util, PostData, RecordedRequest, ServerConfiguration};
use futures::channel::oneshot;
use hyper::{
    body,
    header::AUTHORIZATION,
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server,
};
use std::{
    convert::Infallible,
    net::{SocketAddr, TcpListener},
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
};
use tokio::runtime::{self, Runtime};

pub(crate) type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

/// Handle to the background thread serving one mock server.
#[derive(Debug)]
pub(crate) struct Runner {
    address: SocketAddr,
    shutdown: oneshot::Sender<()>,
    join_handle: JoinHandle<()>,
}

impl Runner {
    /// Binds the configured address and starts serving on a dedicated thread. Every request is
    /// appended to `requests`.
    pub(crate) fn start(
        configuration: &ServerConfiguration,
        requests: RequestLog,
    ) -> Result<Self, Error> {
        let listener = TcpListener::bind(configuration.bind_address())?;
        listener.set_nonblocking(true)?;

        let runtime = build_runtime(configuration)?;

        let server = {
            // hyper needs a reactor to adopt the listener
            let _guard = runtime.enter();

            Server::from_tcp(listener)?.serve(make_service_fn(move |_| {
                let requests = requests.clone();

                async move {
                    Ok::<_, Infallible>(service_fn(move |req| {
                        handle_request(requests.clone(), req)
                    }))
                }
            }))
        };

        let address = server.local_addr();
        let (shutdown, shutdown_signal) = oneshot::channel::<()>();
        let server = server.with_graceful_shutdown(async {
            let _ = shutdown_signal.await;
        });

        let join_handle = thread::Builder::new()
            .name(format!("opsgenie-mock-{}", address.port()))
            .spawn(move || {
                runtime.block_on(async {
                    if let Err(e) = server.await {
                        tracing::warn!(%address, error = %e, "OpsGenie mock server error");
                    }
                });
            })?;

        tracing::info!(%address, "OpsGenie mock server started");

        Ok(Self {
            address,
            shutdown,
            join_handle,
        })
    }

    pub(crate) fn address(&self) -> SocketAddr {
        self.address
    }

    /// Stops accepting connections, lets in-flight requests finish and waits for the thread.
    pub(crate) fn shutdown(self) {
        let Runner {
            address,
            shutdown,
            join_handle,
        } = self;

        // the receiver is gone only if the server already stopped on its own
        let _ = shutdown.send(());

        if join_handle.join().is_err() {
            tracing::warn!(%address, "OpsGenie mock server thread panicked");
        }

        tracing::info!(%address, "OpsGenie mock server stopped");
    }
}

fn build_runtime(configuration: &ServerConfiguration) -> Result<Runtime, Error> {
    let mut builder = runtime::Builder::new_multi_thread();
    builder.enable_all().thread_name("opsgenie-mock-worker");

    if let Some(worker_threads) = configuration.worker_threads() {
        builder.worker_threads(worker_threads);
    }

    Ok(builder.build()?)
}

async fn handle_request(
    requests: RequestLog,
    request: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    let method = request.method().clone();
    let recorded_request = read_request_data(request).await;
    let url = recorded_request.url.clone();

    let recorded_count = {
        let mut requests = requests.lock().unwrap_or_else(|e| e.into_inner());
        requests.push(recorded_request);
        requests.len()
    };

    tracing::debug!(%method, %url, recorded_count, "recorded request");

    Ok(Response::new(Body::empty()))
}

async fn read_request_data(request: Request<Body>) -> RecordedRequest {
    let url = request.uri().to_string();
    let authorization = util::header_value(request.headers(), AUTHORIZATION);

    // an unreadable body is recorded like an empty one
    let body = body::to_bytes(request.into_body())
        .await
        .unwrap_or_default();

    RecordedRequest {
        url,
        authorization,
        post_data: PostData::from_body(&body),
    }
}
