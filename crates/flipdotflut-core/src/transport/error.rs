use std::io;
use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot resolve destination {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("no usable address for {host}:{port}")]
    NoAddress { host: String, port: u16 },
    #[error("cannot bind local socket: {0}")]
    Bind(#[source] io::Error),
    #[error("send to {destination} failed: {source}")]
    Send {
        destination: SocketAddr,
        #[source]
        source: io::Error,
    },
}
