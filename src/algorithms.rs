pub mod dijkstra;

pub use dijkstra::{Cost, ShortestPath, shortest_path};
