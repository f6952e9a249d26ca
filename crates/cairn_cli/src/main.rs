//! Cairn CLI: the command-line interface for the Cairn StarkNet build tool.
//!
//! Provides `cairn build` for compiling contracts with the Cairo 0, Cairo 1,
//! or Scarb toolchains, and `cairn test` / `cairn run` for running commands
//! against a StarkNet network, starting a local devnet when needed.

#![warn(missing_docs)]

mod build;
mod pipeline;

use std::path::PathBuf;
use std::process;

use cairn_common::Dialect;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Cairn: build, test and run StarkNet contracts.
#[derive(Parser, Debug)]
#[command(name = "cairn", version, about = "Cairn StarkNet build tool")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `cairn.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile contracts under the given paths.
    Build(BuildArgs),
    /// Run the project's test command against a network.
    Test(TestArgs),
    /// Run a script against a network.
    Run(RunArgs),
}

/// Arguments for the `cairn build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Files or directories to compile (default: `paths.sources`).
    pub paths: Vec<PathBuf>,

    /// Compiler toolchain to use.
    #[arg(short, long, value_enum, default_value_t = DialectArg::Legacy)]
    pub dialect: DialectArg,

    /// Extra Cairo 0 import roots, searched after the configured ones.
    #[arg(long = "cairo-path")]
    pub cairo_path: Vec<PathBuf>,

    /// Compile Cairo 0 contracts as account contracts.
    #[arg(long)]
    pub account_contract: bool,

    /// Allow unwhitelisted hints in Cairo 0 contracts.
    #[arg(long)]
    pub disable_hint_validation: bool,

    /// Compile each Cairo 1 file on its own instead of as a crate.
    #[arg(long)]
    pub single_file: bool,

    /// Emit Python hints in CASM output.
    #[arg(long)]
    pub add_pythonic_hints: bool,

    /// Skip validation of `Scarb.toml` manifests.
    #[arg(long)]
    pub skip_validate: bool,

    /// Compile every unit even if it is up to date.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `cairn test` subcommand.
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Network to test against (default: `network.default` or `alpha-goerli`).
    #[arg(long)]
    pub starknet_network: Option<String>,

    /// Test command and its arguments (default: `[test].command`).
    #[arg(last = true)]
    pub command: Vec<String>,
}

/// Arguments for the `cairn run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Network to run against (default: `network.default` or `alpha-goerli`).
    #[arg(long)]
    pub starknet_network: Option<String>,

    /// Script to execute.
    pub script: String,

    /// Arguments passed to the script.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Compiler toolchain selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// Cairo 0 (`starknet-compile-deprecated`).
    Legacy,
    /// Cairo 1 (`starknet-compile` + `starknet-sierra-compile`).
    Sierra,
    /// Scarb packages.
    Scarb,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Legacy => Dialect::Legacy,
            DialectArg::Sierra => Dialect::Sierra,
            DialectArg::Scarb => Dialect::Scarb,
        }
    }
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global).await,
        Command::Test(ref args) => test::run_test(args, &global).await,
        Command::Run(ref args) => test::run_script(args, &global).await,
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the level
/// picked from `--quiet` / `--verbose`.
fn init_tracing(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(global)));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .compact()
        .with_target(false);

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
    {
        eprintln!("warning: logging unavailable: {e}");
    }
}

fn default_level(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_build_default() {
        let cli = Cli::parse_from(["cairn", "build"]);
        match cli.command {
            Command::Build(ref args) => {
                assert!(args.paths.is_empty());
                assert_eq!(args.dialect, DialectArg::Legacy);
                assert!(args.cairo_path.is_empty());
                assert!(!args.force);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_with_args() {
        let cli = Cli::parse_from([
            "cairn",
            "build",
            "contracts/token",
            "contracts/account",
            "--dialect",
            "sierra",
            "--cairo-path",
            "lib/oz",
            "--cairo-path",
            "lib/extra",
            "--single-file",
            "--add-pythonic-hints",
            "--force",
        ]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(
                    args.paths,
                    vec![
                        PathBuf::from("contracts/token"),
                        PathBuf::from("contracts/account")
                    ]
                );
                assert_eq!(args.dialect, DialectArg::Sierra);
                assert_eq!(
                    args.cairo_path,
                    vec![PathBuf::from("lib/oz"), PathBuf::from("lib/extra")]
                );
                assert!(args.single_file);
                assert!(args.add_pythonic_hints);
                assert!(args.force);
                assert!(!args.account_contract);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_test_with_trailing_command() {
        let cli = Cli::parse_from([
            "cairn",
            "test",
            "--starknet-network",
            "integrated-devnet",
            "--",
            "pytest",
            "-x",
            "tests/",
        ]);
        match cli.command {
            Command::Test(ref args) => {
                assert_eq!(args.starknet_network.as_deref(), Some("integrated-devnet"));
                assert_eq!(args.command, vec!["pytest", "-x", "tests/"]);
            }
            _ => panic!("expected Test command"),
        }
    }

    #[test]
    fn parse_test_without_command() {
        let cli = Cli::parse_from(["cairn", "test"]);
        match cli.command {
            Command::Test(ref args) => {
                assert!(args.starknet_network.is_none());
                assert!(args.command.is_empty());
            }
            _ => panic!("expected Test command"),
        }
    }

    #[test]
    fn parse_run_with_script_args() {
        let cli = Cli::parse_from(["cairn", "run", "scripts/deploy.sh", "--fee", "10"]);
        match cli.command {
            Command::Run(ref args) => {
                assert_eq!(args.script, "scripts/deploy.sh");
                assert_eq!(args.args, vec!["--fee", "10"]);
                assert!(args.starknet_network.is_none());
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["cairn", "--quiet", "--config", "proj/cairn.toml", "build"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("proj/cairn.toml"));
    }

    #[test]
    fn dialect_arg_maps_to_dialect() {
        assert_eq!(Dialect::from(DialectArg::Legacy), Dialect::Legacy);
        assert_eq!(Dialect::from(DialectArg::Sierra), Dialect::Sierra);
        assert_eq!(Dialect::from(DialectArg::Scarb), Dialect::Scarb);
    }

    #[test]
    fn quiet_wins_over_verbose() {
        let global = GlobalArgs {
            quiet: true,
            verbose: true,
            config: None,
        };
        assert_eq!(default_level(&global), "error");
    }
}
