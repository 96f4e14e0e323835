pub mod init;
pub mod interactive;
pub mod plan;
pub mod sweep;

use std::path::Path;

use clap::{ArgAction, Args};
use nodefit_core::{AllocationParams, NodefitConfig, RawInputs};
use tracing_subscriber::EnvFilter;

/// Default config file picked up from the working directory.
pub const CONFIG_FILE: &str = "nodefit.toml";

/// Parameter overrides. Anything set here wins over the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct ParamArgs {
    /// Cores per executor
    #[arg(long, global = true)]
    pub executor_cores: Option<f64>,
    /// Memory per executor in GB, before overhead
    #[arg(long = "executor-memory", global = true)]
    pub executor_memory_gb: Option<f64>,
    /// Fraction of executor memory reserved as overhead (0 disables)
    #[arg(long = "overhead", global = true)]
    pub overhead_factor: Option<f64>,
    /// Executors to place, excluding reserved ones
    #[arg(long, global = true)]
    pub max_executors: Option<f64>,
    /// vCPUs per node
    #[arg(long, global = true)]
    pub node_vcpus: Option<f64>,
    /// Memory per node in GB
    #[arg(long = "node-memory", global = true)]
    pub node_memory_gb: Option<f64>,
    /// Node count for --fixed-nodes
    #[arg(long, global = true)]
    pub num_nodes: Option<f64>,
    /// Reserved coordinator ("AM") executors
    #[arg(long = "reserved", global = true)]
    pub reserved_executors: Option<f64>,
    /// Target node count for the sweep table
    #[arg(long = "target-nodes", global = true)]
    pub target_max_nodes: Option<f64>,
    /// Fit executors into --num-nodes instead of deriving the node count
    /// (`--fixed-nodes=false` returns to elastic sizing)
    #[arg(
        long,
        global = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub fixed_nodes: Option<bool>,
    /// Shrink CPU slots until an even memory split fits
    /// (`--reconcile-memory=false` skips it)
    #[arg(
        long,
        global = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub reconcile_memory: Option<bool>,
}

impl ParamArgs {
    pub fn to_inputs(&self) -> RawInputs {
        RawInputs {
            executor_cores: self.executor_cores,
            executor_memory_gb: self.executor_memory_gb,
            overhead_factor: self.overhead_factor,
            max_executors: self.max_executors,
            target_max_nodes: self.target_max_nodes,
            node_vcpus: self.node_vcpus,
            node_memory_gb: self.node_memory_gb,
            num_nodes: self.num_nodes,
            reserved_executors: self.reserved_executors,
            fixed_nodes: self.fixed_nodes,
            reconcile_memory: self.reconcile_memory,
        }
    }
}

/// Inputs after layering defaults, config file and flags.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub inputs: RawInputs,
    pub config: NodefitConfig,
}

impl Resolved {
    pub fn params(&self) -> AllocationParams {
        AllocationParams::from_raw(&self.inputs)
    }
}

/// Layer defaults, then the config file, then command-line flags.
pub fn resolve(config_path: Option<&Path>, args: &ParamArgs) -> anyhow::Result<Resolved> {
    let config = match config_path {
        Some(path) => NodefitConfig::from_file(path)?,
        None if Path::new(CONFIG_FILE).is_file() => NodefitConfig::from_file(Path::new(CONFIG_FILE))?,
        None => NodefitConfig::default(),
    };

    let inputs = RawInputs::defaults()
        .overlay(&config.to_inputs())
        .overlay(&args.to_inputs());

    Ok(Resolved { inputs, config })
}

pub fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("nodefit={level}").parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "[executor]\ncores = 2\nmemory_gb = 4\n\n[node]\nvcpus = 8\n",
        )
        .unwrap();

        let args = ParamArgs {
            executor_cores: Some(3.0),
            fixed_nodes: Some(true),
            ..ParamArgs::default()
        };
        let params = resolve(Some(&path), &args).unwrap().params();

        assert_eq!(params.executor_cores, 3);
        assert_eq!(params.executor_memory_gb, 4.0);
        assert_eq!(params.node_vcpus, 8);
        assert_eq!(params.node_memory_gb, 64.0);
        assert!(params.fixed_nodes);
        assert!(params.reconcile_memory);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(resolve(Some(&path), &ParamArgs::default()).is_err());
    }

    #[derive(clap::Parser)]
    struct TestCli {
        #[command(flatten)]
        params: ParamArgs,
    }

    fn parse(args: &[&str]) -> ParamArgs {
        use clap::Parser;
        TestCli::try_parse_from(std::iter::once("nodefit").chain(args.iter().copied()))
            .unwrap()
            .params
    }

    #[test]
    fn boolean_flags_parse_both_ways() {
        assert_eq!(parse(&[]).fixed_nodes, None);
        assert_eq!(parse(&["--fixed-nodes"]).fixed_nodes, Some(true));
        assert_eq!(parse(&["--fixed-nodes=false"]).fixed_nodes, Some(false));
        assert_eq!(parse(&["--reconcile-memory=false"]).reconcile_memory, Some(false));
        assert_eq!(parse(&["--reconcile-memory"]).reconcile_memory, Some(true));
    }

    #[test]
    fn flags_switch_config_booleans_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "[cluster]\nfixed_nodes = true\nnum_nodes = 2\nreconcile_memory = false\n",
        )
        .unwrap();

        let from_file = resolve(Some(&path), &ParamArgs::default()).unwrap().params();
        assert!(from_file.fixed_nodes);
        assert!(!from_file.reconcile_memory);

        let args = parse(&["--fixed-nodes=false", "--reconcile-memory"]);
        let params = resolve(Some(&path), &args).unwrap().params();
        assert!(!params.fixed_nodes);
        assert!(params.reconcile_memory);
    }
}
