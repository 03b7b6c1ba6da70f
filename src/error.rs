use std::fmt;

use thiserror::Error;

use crate::RouterId;

/// Which end of a path query an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => f.write_str("source"),
            Endpoint::Destination => f.write_str("destination"),
        }
    }
}

/// Errors raised by address arithmetic, graph construction and path queries.
///
/// An unreachable destination is not an error: it yields an empty path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("invalid IPv4 address: {0:?}")]
    InvalidAddress(String),
    #[error("invalid prefix length: {0:?}")]
    InvalidPrefix(String),
    #[error("unknown router in topology graph: {0}")]
    UnknownVertex(RouterId),
    #[error("no router advertises a subnet containing {side} {ip}")]
    UnresolvedEndpoint { ip: String, side: Endpoint },
}
