//! Configuration document loading.
//!
//! The on-disk document mirrors the graph schema loosely (string map keys,
//! boundaries as lists, optional counts). It is parsed with serde and then
//! converted into a validated [`Configuration`]:
//!
//! - super-node keys must be non-negative integers
//! - every boundary must have exactly two values
//! - declared counts (`n_supernodes`, `n_incoming_nodes`) must match what is listed
//!
//! Supported formats are chosen by file extension: `.json` and `.toml`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::domain::{
    Boundary, Configuration, Expectation, InputSpec, NodeType, SuperNodeConfig, SuperNodeId,
};
use crate::error::{AppError, GenError, GenResult};
use crate::fit::DEFAULT_NOISE_SIGMA;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDocument {
    #[serde(default)]
    n_supernodes: Option<usize>,
    n_cycles: usize,
    #[serde(default)]
    noise: Option<f64>,
    supernodes: BTreeMap<String, SuperNodeDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuperNodeDocument {
    node_type: NodeType,
    n_subnodes: usize,
    boundaries: Vec<Vec<f64>>,
    control_points: Vec<f64>,
    #[serde(default, alias = "n_incomming_nodes")]
    n_incoming_nodes: Option<usize>,
    #[serde(default)]
    inputs: Vec<InputDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InputDocument {
    input_supernode: SuperNodeId,
    correlation: f64,
    weight: f64,
    #[serde(default)]
    connections: Vec<usize>,
    #[serde(default)]
    expected_lower_bound: Option<f64>,
    #[serde(default)]
    expected_upper_bound: Option<f64>,
    #[serde(default)]
    expected_mean: Option<f64>,
}

/// Read and validate a configuration file.
pub fn load_configuration(path: &Path) -> Result<Configuration, AppError> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        AppError::new(
            2,
            format!(
                "Unsupported configuration format '{}': expected a .json or .toml file",
                path.display()
            ),
        )
    })?;
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::new(2, format!("Failed to read configuration '{}': {e}", path.display()))
    })?;
    let config = parse_configuration(&text, format)?;
    debug!(path = %path.display(), supernodes = config.supernodes.len(), "configuration loaded");
    Ok(config)
}

/// Parse and validate a configuration document.
pub fn parse_configuration(text: &str, format: ConfigFormat) -> GenResult<Configuration> {
    let doc: ConfigDocument = match format {
        ConfigFormat::Json => serde_json::from_str(text)
            .map_err(|e| GenError::config(format!("invalid JSON configuration: {e}")))?,
        ConfigFormat::Toml => toml::from_str(text)
            .map_err(|e| GenError::config(format!("invalid TOML configuration: {e}")))?,
    };
    doc.into_configuration()
}

impl ConfigDocument {
    fn into_configuration(self) -> GenResult<Configuration> {
        if let Some(declared) = self.n_supernodes {
            if declared != self.supernodes.len() {
                return Err(GenError::config(format!(
                    "n_supernodes is {declared} but {} super nodes are listed",
                    self.supernodes.len()
                )));
            }
        }

        let mut supernodes = BTreeMap::new();
        for (key, node) in self.supernodes {
            let id: SuperNodeId = key.trim().parse().map_err(|_| {
                GenError::config(format!(
                    "super node key '{key}' is not a non-negative integer"
                ))
            })?;
            let node = node.into_node(id)?;
            if supernodes.insert(id, node).is_some() {
                return Err(GenError::config(format!("super node {id} is listed twice")));
            }
        }

        let config = Configuration {
            n_cycles: self.n_cycles,
            noise: self.noise.unwrap_or(DEFAULT_NOISE_SIGMA),
            supernodes,
        };
        config.validate()?;
        Ok(config)
    }
}

impl SuperNodeDocument {
    fn into_node(self, id: SuperNodeId) -> GenResult<SuperNodeConfig> {
        let boundaries = self
            .boundaries
            .iter()
            .enumerate()
            .map(|(i, pair)| match pair.as_slice() {
                &[min, max] => Ok(Boundary::new(min, max)),
                other => Err(GenError::config(format!(
                    "super node {id}: boundary {i} must have exactly 2 values, got {}",
                    other.len()
                ))),
            })
            .collect::<GenResult<Vec<_>>>()?;

        if let Some(declared) = self.n_incoming_nodes {
            if declared != self.inputs.len() {
                return Err(GenError::config(format!(
                    "super node {id}: n_incoming_nodes is {declared} but {} inputs are listed",
                    self.inputs.len()
                )));
            }
        }

        let inputs = self.inputs.into_iter().map(InputDocument::into_input).collect();

        Ok(SuperNodeConfig {
            node_type: self.node_type,
            n_subnodes: self.n_subnodes,
            boundaries,
            control_points: self.control_points,
            inputs,
        })
    }
}

impl InputDocument {
    fn into_input(self) -> InputSpec {
        // The config generator writes 0.0 for all three when the user leaves them alone.
        let all_zero = [self.expected_lower_bound, self.expected_upper_bound, self.expected_mean]
            .iter()
            .all(|v| *v == Some(0.0));
        let expectation = if all_zero {
            Expectation::default()
        } else {
            Expectation {
                lower_bound: self.expected_lower_bound,
                upper_bound: self.expected_upper_bound,
                mean: self.expected_mean,
            }
        };
        InputSpec {
            input_supernode: self.input_supernode,
            correlation: self.correlation,
            weight: self.weight,
            connections: self.connections,
            expectation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOML_GRAPH: &str = r#"
n_supernodes = 2
n_cycles = 100

[supernodes.0]
node_type = "independent"
n_subnodes = 2
boundaries = [[0, 1], [10.0, 20.0]]
control_points = [3, 1, 2]

[supernodes.1]
node_type = "dependent"
n_subnodes = 1
boundaries = [[-1, 1]]
control_points = [0.0, 0.5, 1.0, 0.2]
n_incomming_nodes = 1

[[supernodes.1.inputs]]
input_supernode = 0
correlation = 0.4
weight = 0.5
connections = [0, 1]
expected_lower_bound = 0.0
expected_upper_bound = 0.0
expected_mean = 0.0
"#;

    #[test]
    fn parses_toml_graph() {
        let config = parse_configuration(TOML_GRAPH, ConfigFormat::Toml).unwrap();
        assert_eq!(config.n_cycles, 100);
        assert_eq!(config.noise, DEFAULT_NOISE_SIGMA);
        assert_eq!(config.supernodes.len(), 2);

        let dep = &config.supernodes[&1];
        assert_eq!(dep.node_type, NodeType::Dependent);
        assert_eq!(dep.inputs[0].connections, vec![0, 1]);
        assert!(dep.inputs[0].expectation.is_empty());
        assert_eq!(config.supernodes[&0].boundaries[1], Boundary::new(10.0, 20.0));
    }

    #[test]
    fn parses_json_graph() {
        let json = r#"{
            "n_cycles": 12,
            "noise": 0.0,
            "supernodes": {
                "3": {
                    "node_type": "independent",
                    "n_subnodes": 1,
                    "boundaries": [[0, 5]],
                    "control_points": [0, 1, 0]
                }
            }
        }"#;
        let config = parse_configuration(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.noise, 0.0);
        assert!(config.supernodes.contains_key(&3));
    }

    #[test]
    fn rejects_malformed_documents() {
        let cases = [
            (r#"{"n_cycles": 5, "supernodes": {"a": {"node_type": "independent", "n_subnodes": 1, "boundaries": [[0, 1]], "control_points": [0, 1, 2]}}}"#, "not a non-negative integer"),
            (r#"{"n_cycles": 5, "supernodes": {"0": {"node_type": "independent", "n_subnodes": 1, "boundaries": [[0, 1, 2]], "control_points": [0, 1, 2]}}}"#, "exactly 2 values"),
            (r#"{"n_cycles": 5, "supernodes": {"0": {"node_type": "independent", "n_subnodes": 1, "boundaries": [[1, 1]], "control_points": [0, 1, 2]}}}"#, "min < max"),
            (r#"{"n_cycles": 5, "supernodes": {"0": {"node_type": "independent", "n_subnodes": 1, "boundaries": [[0, 1]], "control_points": [0, 1]}}}"#, "at least 3 control points"),
            (r#"{"n_cycles": 5, "supernodes": {"0": {"node_type": "independent", "n_subnodes": 1, "boundaries": [[0, 1]], "control_points": [0, "x", 2]}}}"#, "invalid JSON"),
            (r#"{"n_cycles": 0, "supernodes": {}}"#, "n_cycles"),
            (r#"{"n_supernodes": 3, "n_cycles": 5, "supernodes": {}}"#, "n_supernodes is 3"),
        ];
        for (doc, needle) in cases {
            let err = parse_configuration(doc, ConfigFormat::Json).unwrap_err();
            assert!(err.is_config());
            assert!(err.to_string().contains(needle), "{err} should mention '{needle}'");
        }
    }

    #[test]
    fn incoming_count_must_match_inputs() {
        let doc = TOML_GRAPH.replace("n_incomming_nodes = 1", "n_incomming_nodes = 2");
        let err = parse_configuration(&doc, ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("n_incoming_nodes is 2"), "{err}");
    }

    #[test]
    fn loads_from_disk_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.toml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(TOML_GRAPH.as_bytes())
            .unwrap();
        assert_eq!(load_configuration(&path).unwrap().supernodes.len(), 2);

        let yaml = dir.path().join("graph.yaml");
        std::fs::write(&yaml, "n_cycles: 1").unwrap();
        assert_eq!(load_configuration(&yaml).unwrap_err().exit_code(), 2);
    }
}
