use std::fmt;
use std::marker::PhantomData;

use ipnet::Ipv4Net;
use log::debug;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::RouterId;
use crate::error::RoutingError;
use crate::network::addr::{netmask_from_prefix, parse_address, parse_prefix};
use crate::network::graph::{TopoGraph, Weight};

/// A link advertised by a router towards one of its neighbors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Administrative distance of the link.
    pub ad: Weight,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterInfo {
    /// Prefix length of the advertised local subnet, `"/24"` or `"24"`.
    pub netmask: String,
    #[serde(default, with = "ordered")]
    pub connections: Vec<(RouterId, Connection)>,
}

impl RouterInfo {
    pub fn new(netmask: impl Into<String>) -> Self {
        Self {
            netmask: netmask.into(),
            connections: Vec::new(),
        }
    }

    pub fn connect(mut self, neighbor: impl Into<RouterId>, ad: Weight) -> Self {
        self.connections.push((neighbor.into(), Connection { ad, interface: None }));
        self
    }

    pub fn prefix_len(&self) -> Result<u8, RoutingError> {
        parse_prefix(&self.netmask)
    }

    pub fn mask(&self) -> Result<u32, RoutingError> {
        netmask_from_prefix(self.prefix_len()?)
    }
}

/// Static router topology, keyed by router address.
///
/// Routers keep the order they were declared in: resolution picks the first
/// matching router and the graph is built in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topology {
    #[serde(with = "ordered")]
    pub routers: Vec<(RouterId, RouterInfo)>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a router. Redeclaring an existing router replaces its entry in place.
    pub fn add_router(&mut self, id: impl Into<RouterId>, info: RouterInfo) {
        let id = id.into();
        match self.routers.iter_mut().find(|(r, _)| *r == id) {
            Some(entry) => entry.1 = info,
            None => self.routers.push((id, info)),
        }
    }

    pub fn router(&self, id: &str) -> Option<&RouterInfo> {
        self.routers.iter().find(|(r, _)| r == id).map(|(_, info)| info)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RouterId, &RouterInfo)> {
        self.routers.iter().map(|(id, info)| (id, info))
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    /// Subnet advertised by `id`, in canonical network form.
    pub fn subnet(&self, id: &str) -> Result<Ipv4Net, RoutingError> {
        let info = self
            .router(id)
            .ok_or_else(|| RoutingError::UnknownVertex(id.to_string()))?;
        let addr = parse_address(id)?;
        let net = Ipv4Net::new(addr.into(), info.prefix_len()?)
            .map_err(|_| RoutingError::InvalidPrefix(info.netmask.clone()))?;
        Ok(net.trunc())
    }

    /// Checks that every router address and netmask is well formed and that
    /// every connection points at a declared router.
    pub fn validate(&self) -> Result<(), RoutingError> {
        for (id, info) in &self.routers {
            parse_address(id)?;
            info.prefix_len()?;
            if let Some((neighbor, _)) = info
                .connections
                .iter()
                .find(|(neighbor, _)| self.router(neighbor).is_none())
            {
                return Err(RoutingError::UnknownVertex(neighbor.clone()));
            }
        }
        Ok(())
    }

    /// One vertex per router, one directed edge per advertised connection.
    pub fn build_graph(&self) -> Result<TopoGraph, RoutingError> {
        let mut graph = TopoGraph::new();
        for (id, _) in &self.routers {
            graph.add_vertex(id);
        }
        for (id, info) in &self.routers {
            for (neighbor, conn) in &info.connections {
                graph.add_edge(id, neighbor, conn.ad)?;
            }
        }
        debug!(
            "Built topology graph: {} routers, {} links",
            graph.vertex_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

/// (De)serializes a JSON object as a `Vec` of key/value pairs in document order.
mod ordered {
    use super::*;

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S, V>(entries: &Vec<(String, V)>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (k, v) in entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }

    struct OrderedVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map keyed by router address")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_entry::<String, V>()? {
                // duplicate keys: last one wins, first position is kept
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }
            }
            Ok(entries)
        }
    }
}
