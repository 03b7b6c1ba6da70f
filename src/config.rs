use std::path::Path;
use std::fs;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::network::Topology;

/// A routing scenario: the router topology and the host pairs to route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub routers: Topology,
    #[serde(rename = "src-dest", default)]
    pub src_dest: Vec<(String, String)>,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("loading {}", path.display()))
    }

    /// Parses and validates a scenario document.
    pub fn from_json(content: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(content)?;
        scenario.routers.validate()?;
        Ok(scenario)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoutingError;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_pairs_and_routers() {
        let s = Scenario::from_json(
            r#"{
                "routers": {
                    "10.34.0.1": { "netmask": "/24", "connections": { "10.34.1.1": { "ad": 3 } } },
                    "10.34.1.1": { "netmask": "/24", "connections": {} }
                },
                "src-dest": [["10.34.0.5", "10.34.1.5"]]
            }"#,
        )
        .unwrap();
        assert_eq!(s.routers.len(), 2);
        assert_eq!(s.src_dest, vec![("10.34.0.5".to_string(), "10.34.1.5".to_string())]);
    }

    #[test]
    fn pairs_are_optional() {
        let s = Scenario::from_json(r#"{ "routers": {} }"#).unwrap();
        assert!(s.routers.is_empty());
        assert!(s.src_dest.is_empty());
    }

    #[test]
    fn invalid_router_is_rejected() {
        let err = Scenario::from_json(r#"{ "routers": { "10.0.0.1": { "netmask": "/99" } } }"#)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<RoutingError>(),
            Some(&RoutingError::InvalidPrefix("/99".to_string()))
        );
    }

    #[test]
    fn connection_to_undeclared_router_is_rejected_at_load() {
        let err = Scenario::from_json(
            r#"{
                "routers": {
                    "10.0.1.1": { "netmask": "/24", "connections": {
                        "10.0.2.1": { "ad": 1 }, "10.9.9.9": { "ad": 1 } } },
                    "10.0.2.1": { "netmask": "/24" }
                },
                "src-dest": [["10.0.1.5", "10.0.1.6"], ["10.0.1.5", "10.0.2.6"]]
            }"#,
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<RoutingError>(),
            Some(&RoutingError::UnknownVertex("10.9.9.9".to_string()))
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(Scenario::from_json(r#"{ "routers": [] }"#).is_err());
        assert!(Scenario::from_json("not json").is_err());
    }
}
