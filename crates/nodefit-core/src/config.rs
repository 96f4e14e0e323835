//! nodefit.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::params::{DEFAULT_OVERHEAD_FACTOR, DEFAULT_TARGET_MAX_NODES, RawInputs};

/// Default drawing-surface width in pixels.
pub const DEFAULT_SURFACE_WIDTH: u32 = 1200;

/// Default trailing-edge debounce window for interactive edits.
pub const DEFAULT_DEBOUNCE_MS: u64 = 120;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodefitConfig {
    pub executor: Option<ExecutorConfig>,
    pub node: Option<NodeConfig>,
    pub cluster: Option<ClusterConfig>,
    pub sweep: Option<SweepConfig>,
    pub render: Option<RenderConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutorConfig {
    pub cores: Option<f64>,
    pub memory_gb: Option<f64>,
    pub overhead_factor: Option<f64>,
    pub reserved: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    pub vcpus: Option<f64>,
    pub memory_gb: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub max_executors: Option<f64>,
    pub fixed_nodes: Option<bool>,
    pub num_nodes: Option<f64>,
    pub reconcile_memory: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepConfig {
    pub target_max_nodes: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    pub surface_width: Option<u32>,
    pub debounce_ms: Option<u64>,
}

impl NodefitConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: NodefitConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> ConfigResult<()> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Scaffold a config holding every documented default.
    pub fn scaffold() -> Self {
        NodefitConfig {
            executor: Some(ExecutorConfig {
                cores: Some(4.0),
                memory_gb: Some(8.0),
                overhead_factor: Some(DEFAULT_OVERHEAD_FACTOR),
                reserved: Some(1.0),
            }),
            node: Some(NodeConfig {
                vcpus: Some(16.0),
                memory_gb: Some(64.0),
            }),
            cluster: Some(ClusterConfig {
                max_executors: Some(10.0),
                fixed_nodes: Some(false),
                num_nodes: Some(3.0),
                reconcile_memory: Some(true),
            }),
            sweep: Some(SweepConfig {
                target_max_nodes: Some(f64::from(DEFAULT_TARGET_MAX_NODES)),
            }),
            render: Some(RenderConfig {
                surface_width: Some(DEFAULT_SURFACE_WIDTH),
                debounce_ms: Some(DEFAULT_DEBOUNCE_MS),
            }),
        }
    }

    /// Flatten into raw inputs; absent keys stay `None`.
    pub fn to_inputs(&self) -> RawInputs {
        let executor = self.executor.clone().unwrap_or_default();
        let node = self.node.clone().unwrap_or_default();
        let cluster = self.cluster.clone().unwrap_or_default();
        let sweep = self.sweep.clone().unwrap_or_default();

        RawInputs {
            executor_cores: executor.cores,
            executor_memory_gb: executor.memory_gb,
            overhead_factor: executor.overhead_factor,
            max_executors: cluster.max_executors,
            target_max_nodes: sweep.target_max_nodes,
            node_vcpus: node.vcpus,
            node_memory_gb: node.memory_gb,
            num_nodes: cluster.num_nodes,
            reserved_executors: executor.reserved,
            fixed_nodes: cluster.fixed_nodes,
            reconcile_memory: cluster.reconcile_memory,
        }
    }

    pub fn surface_width(&self) -> u32 {
        self.render
            .as_ref()
            .and_then(|r| r.surface_width)
            .unwrap_or(DEFAULT_SURFACE_WIDTH)
    }

    pub fn debounce_ms(&self) -> u64 {
        self.render
            .as_ref()
            .and_then(|r| r.debounce_ms)
            .unwrap_or(DEFAULT_DEBOUNCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AllocationParams;

    #[test]
    fn test_scaffold() {
        let config = NodefitConfig::scaffold();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("[executor]"));
        assert!(toml_str.contains("overhead_factor = 0.1875"));
    }

    #[test]
    fn scaffold_matches_default_params() {
        let inputs = NodefitConfig::scaffold().to_inputs();
        assert_eq!(AllocationParams::from_raw(&inputs), AllocationParams::default());
    }

    #[test]
    fn test_parse_minimal() {
        let toml_str = r#"
[node]
vcpus = 32
memory_gb = 128
"#;
        let config: NodefitConfig = toml::from_str(toml_str).unwrap();
        let inputs = config.to_inputs();
        assert_eq!(inputs.node_vcpus, Some(32.0));
        assert_eq!(inputs.node_memory_gb, Some(128.0));
        assert_eq!(inputs.executor_cores, None);
        assert_eq!(config.surface_width(), DEFAULT_SURFACE_WIDTH);
        assert_eq!(config.debounce_ms(), DEFAULT_DEBOUNCE_MS);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodefit.toml");

        NodefitConfig::scaffold().write_to(&path).unwrap();
        let loaded = NodefitConfig::from_file(&path).unwrap();

        assert_eq!(loaded.to_inputs(), NodefitConfig::scaffold().to_inputs());
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = NodefitConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[node\nvcpus = ").unwrap();

        let err = NodefitConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
