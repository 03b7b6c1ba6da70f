use log::debug;

use crate::RouterId;
use crate::error::RoutingError;
use crate::network::addr::{parse_address, same_subnet};
use crate::network::topology::Topology;

/// Finds the router whose advertised subnet contains `ip`.
///
/// Routers are scanned in declaration order and the first match wins, so
/// overlapping subnets resolve to whichever router was declared first.
pub fn find_router_for_ip<'a>(topology: &'a Topology, ip: &str) -> Result<Option<&'a RouterId>, RoutingError> {
    let addr = parse_address(ip)?;

    for (id, info) in topology.iter() {
        let router_addr = parse_address(id)?;
        if same_subnet(addr, router_addr, info.mask()?) {
            let subnet = topology.subnet(id)?;
            debug!("{} resolves to router {} ({})", ip, id, subnet);
            return Ok(Some(id));
        }
    }

    debug!("{} is not covered by any advertised subnet", ip);
    Ok(None)
}
