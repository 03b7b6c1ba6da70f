pub mod addr;
pub mod graph;
pub mod resolver;
pub mod topology;

pub use graph::{TopoGraph, Weight};
pub use resolver::find_router_for_ip;
pub use topology::{Connection, RouterInfo, Topology};
