//! A recording stand-in for the OpsGenie alert API.
//!
//! [`OpsGenieServer`] listens on a local port, answers every request with an empty `200 OK` and
//! keeps a [`RecordedRequest`] for each of them so tests can assert on what an alerting client
//! actually sent.
mod data;
mod error;
mod opsgenie_server;
mod runner;
mod server_configuration;
mod util;

pub use data::{PostData, RecordedRequest};
pub use error::Error;
pub use opsgenie_mock_codegen::opsgenie_server_test;
pub use opsgenie_server::OpsGenieServer;
pub use server_configuration::ServerConfiguration;
