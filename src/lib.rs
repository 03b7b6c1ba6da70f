//! Shortest-path routing between IPv4 hosts over a static router topology.
//!
//! Each router advertises one subnet and a set of directed links weighted by
//! administrative distance. A query resolves both host addresses to the
//! routers whose subnets contain them, then runs Dijkstra between the two.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod network;
pub mod routing;

pub use algorithms::{Cost, ShortestPath};
pub use error::{Endpoint, RoutingError};
pub use network::{RouterInfo, Topology};
pub use routing::{RouteOutcome, UnresolvedPolicy, route, route_batch, route_batch_concurrent};

/// Routers are identified by the dotted-quad address they are declared under.
pub type RouterId = String;
