use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::ParamArgs;

#[derive(Parser)]
#[command(
    name = "nodefit",
    about = "nodefit — executor sizing and node placement planner",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to a nodefit.toml (default: ./nodefit.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    params: ParamArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the executor distribution and draw it
    Plan {
        /// Output format: text, json or svg
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Drawing surface width in pixels (svg only)
        #[arg(short, long)]
        width: Option<u32>,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List optimal executor shapes for every core count
    Sweep {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Generate a nodefit.toml holding the defaults
    Init {
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Read key=value edits from stdin and replan as they settle
    Interactive {
        /// Quiet period before edits are applied, in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose)?;

    let resolve = || commands::resolve(cli.config.as_deref(), &cli.params);

    match cli.command {
        Commands::Plan {
            format,
            width,
            output,
        } => commands::plan::plan(&resolve()?, &format, width, output.as_deref()),
        Commands::Sweep { format } => commands::sweep::sweep(&resolve()?, &format),
        Commands::Init { path, force } => commands::init::init(&path, force),
        Commands::Interactive { debounce_ms } => {
            commands::interactive::interactive(resolve()?, debounce_ms)
        }
    }
}
