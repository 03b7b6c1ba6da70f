use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::algorithms::{Cost, ShortestPath, shortest_path};
use crate::error::{Endpoint, RoutingError};
use crate::network::{Topology, find_router_for_ip};
use crate::RouterId;

/// What a batch does with a pair whose endpoint matches no router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Abort the batch with `UnresolvedEndpoint`.
    Fail,
    /// Report an empty path and move on to the next pair.
    #[default]
    Empty,
}

/// Result of routing one source/destination pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteOutcome {
    pub src: String,
    pub dst: String,
    /// Empty when the destination is unreachable or an endpoint is unresolved.
    pub path: Vec<RouterId>,
    pub cost: Option<Cost>,
}

impl RouteOutcome {
    fn new(src: &str, dst: &str, route: Option<ShortestPath>) -> Self {
        let (path, cost) = match route {
            Some(sp) => (sp.path, Some(sp.cost)),
            None => (Vec::new(), None),
        };
        Self {
            src: src.to_string(),
            dst: dst.to_string(),
            path,
            cost,
        }
    }
}

/// One report line: right-aligned source, left-aligned destination and
/// the router path as a quoted list, e.g. `['10.0.1.1', '10.0.2.1']`.
impl fmt::Display for RouteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>15} -> {:<15}  [", self.src, self.dst)?;
        for (i, router) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{router}'")?;
        }
        f.write_str("]")
    }
}

fn resolve<'a>(topology: &'a Topology, ip: &str, side: Endpoint) -> Result<&'a RouterId, RoutingError> {
    find_router_for_ip(topology, ip)?.ok_or_else(|| RoutingError::UnresolvedEndpoint {
        ip: ip.to_string(),
        side,
    })
}

/// Routes `src_ip` to `dst_ip` through the routers advertising their subnets.
///
/// The graph is rebuilt from `topology` on every call. `Ok(None)` means both
/// endpoints resolved but the destination router is unreachable.
pub fn route(topology: &Topology, src_ip: &str, dst_ip: &str) -> Result<Option<ShortestPath>, RoutingError> {
    let src_router = resolve(topology, src_ip, Endpoint::Source)?;
    let dst_router = resolve(topology, dst_ip, Endpoint::Destination)?;

    let graph = topology.build_graph()?;
    let result = shortest_path(&graph, src_router, dst_router)?;

    match &result {
        Some(sp) => debug!("{} -> {}: cost {} via {:?}", src_ip, dst_ip, sp.cost, sp.path),
        None => debug!("{} -> {}: {} unreachable from {}", src_ip, dst_ip, dst_router, src_router),
    }
    Ok(result)
}

fn route_pair(
    topology: &Topology,
    src: &str,
    dst: &str,
    policy: UnresolvedPolicy,
) -> Result<RouteOutcome, RoutingError> {
    match route(topology, src, dst) {
        Ok(result) => Ok(RouteOutcome::new(src, dst, result)),
        Err(e @ RoutingError::UnresolvedEndpoint { .. }) if policy == UnresolvedPolicy::Empty => {
            warn!("{}", e);
            Ok(RouteOutcome::new(src, dst, None))
        }
        Err(e) => Err(e),
    }
}

/// Routes every pair in order.
pub fn route_batch(
    topology: &Topology,
    pairs: &[(String, String)],
    policy: UnresolvedPolicy,
) -> Result<Vec<RouteOutcome>, RoutingError> {
    pairs
        .iter()
        .map(|(src, dst)| route_pair(topology, src, dst, policy))
        .collect()
}

/// Like [`route_batch`], but evaluates up to `jobs` pairs at once on the
/// blocking pool. Outcomes are returned in input order.
pub async fn route_batch_concurrent(
    topology: Arc<Topology>,
    pairs: Vec<(String, String)>,
    policy: UnresolvedPolicy,
    jobs: usize,
) -> anyhow::Result<Vec<RouteOutcome>> {
    let permits = Arc::new(Semaphore::new(jobs.max(1)));
    let mut handles = Vec::with_capacity(pairs.len());

    for (src, dst) in pairs {
        let permit = permits.clone().acquire_owned().await?;
        let topology = topology.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            route_pair(&topology, &src, &dst, policy)
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await.context("routing worker panicked")??);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::RouterInfo;
    use pretty_assertions::assert_eq;

    fn two_routers() -> Topology {
        let mut t = Topology::new();
        t.add_router("10.34.0.1", RouterInfo::new("/24").connect("10.34.0.2", 10));
        t.add_router("10.34.0.2", RouterInfo::new("/24").connect("10.34.0.1", 10));
        t
    }

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter().map(|(s, d)| (s.to_string(), d.to_string())).collect()
    }

    #[test]
    fn routes_between_adjacent_subnets() {
        let mut t = Topology::new();
        t.add_router("10.34.0.1", RouterInfo::new("/24").connect("10.34.1.1", 10));
        t.add_router("10.34.1.1", RouterInfo::new("/24").connect("10.34.0.1", 10));

        let sp = route(&t, "10.34.0.5", "10.34.1.9").unwrap().unwrap();
        assert_eq!(sp.path, vec!["10.34.0.1", "10.34.1.1"]);
        assert_eq!(sp.cost, 10);
    }

    #[test]
    fn same_subnet_is_single_router() {
        let sp = route(&two_routers(), "10.34.0.5", "10.34.0.9").unwrap().unwrap();
        assert_eq!(sp.path, vec!["10.34.0.1"]);
        assert_eq!(sp.cost, 0);
    }

    #[test]
    fn unresolved_endpoints_name_their_side() {
        let t = two_routers();
        assert_eq!(
            route(&t, "192.168.0.1", "10.34.0.9"),
            Err(RoutingError::UnresolvedEndpoint {
                ip: "192.168.0.1".to_string(),
                side: Endpoint::Source
            })
        );
        assert_eq!(
            route(&t, "10.34.0.9", "8.8.8.8"),
            Err(RoutingError::UnresolvedEndpoint {
                ip: "8.8.8.8".to_string(),
                side: Endpoint::Destination
            })
        );
    }

    #[test]
    fn unreachable_is_not_an_error() {
        let mut t = Topology::new();
        t.add_router("10.0.1.1", RouterInfo::new("/24").connect("10.0.2.1", 1));
        t.add_router("10.0.2.1", RouterInfo::new("/24"));
        assert_eq!(route(&t, "10.0.2.7", "10.0.1.7"), Ok(None));
    }

    #[test_log::test]
    fn batch_degrades_unresolved_pairs() {
        let mut t = Topology::new();
        t.add_router("10.0.1.1", RouterInfo::new("/24").connect("10.0.2.1", 4));
        t.add_router("10.0.2.1", RouterInfo::new("/24"));

        let out = route_batch(
            &t,
            &pairs(&[("10.0.1.2", "10.0.2.2"), ("1.1.1.1", "10.0.2.2"), ("10.0.2.2", "10.0.1.2")]),
            UnresolvedPolicy::Empty,
        )
        .unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].path, vec!["10.0.1.1", "10.0.2.1"]);
        assert_eq!(out[0].cost, Some(4));
        assert_eq!(out[1], RouteOutcome::new("1.1.1.1", "10.0.2.2", None));
        assert!(out[2].path.is_empty());
    }

    #[test]
    fn outcome_renders_as_report_line() {
        let out = route_batch(
            &two_routers(),
            &pairs(&[("10.34.0.5", "10.34.0.9"), ("10.34.0.5", "8.8.8.8")]),
            UnresolvedPolicy::Empty,
        )
        .unwrap();
        assert_eq!(out[0].to_string(), "      10.34.0.5 -> 10.34.0.9        ['10.34.0.1']");
        assert_eq!(out[1].to_string(), "      10.34.0.5 -> 8.8.8.8          []");

        let mut t = Topology::new();
        t.add_router("10.0.1.1", RouterInfo::new("/24").connect("10.0.2.1", 4));
        t.add_router("10.0.2.1", RouterInfo::new("/24"));
        let sp = route(&t, "10.0.1.2", "10.0.2.2").unwrap();
        assert_eq!(
            RouteOutcome::new("10.0.1.2", "10.0.2.2", sp).to_string(),
            "       10.0.1.2 -> 10.0.2.2         ['10.0.1.1', '10.0.2.1']"
        );
    }

    #[test]
    fn batch_fails_fast_when_asked() {
        let result = route_batch(
            &two_routers(),
            &pairs(&[("10.34.0.2", "10.34.0.3"), ("10.35.0.1", "10.34.0.3")]),
            UnresolvedPolicy::Fail,
        );
        assert!(matches!(result, Err(RoutingError::UnresolvedEndpoint { side: Endpoint::Source, .. })));
    }

    #[test]
    fn malformed_query_address_aborts_batch() {
        let result = route_batch(&two_routers(), &pairs(&[("10.34.0", "10.34.0.3")]), UnresolvedPolicy::Empty);
        assert_eq!(result, Err(RoutingError::InvalidAddress("10.34.0".to_string())));
    }

    #[tokio::test]
    async fn concurrent_batch_keeps_input_order() {
        let mut t = Topology::new();
        t.add_router("10.0.1.1", RouterInfo::new("/24").connect("10.0.2.1", 1));
        t.add_router("10.0.2.1", RouterInfo::new("/24").connect("10.0.3.1", 1));
        t.add_router("10.0.3.1", RouterInfo::new("/24").connect("10.0.1.1", 1));

        let list = pairs(&[
            ("10.0.1.9", "10.0.3.9"),
            ("10.0.3.9", "10.0.2.9"),
            ("10.0.2.9", "10.0.2.8"),
            ("10.0.9.9", "10.0.2.8"),
        ]);
        let expected = route_batch(&t, &list, UnresolvedPolicy::Empty).unwrap();
        let got = route_batch_concurrent(Arc::new(t), list, UnresolvedPolicy::Empty, 3)
            .await
            .unwrap();

        assert_eq!(got, expected);
        assert_eq!(got[0].path, vec!["10.0.1.1", "10.0.2.1", "10.0.3.1"]);
        assert_eq!(got[1].cost, Some(2));
        assert!(got[3].path.is_empty());
    }
}
