//! quistik command-line interface
//!
//! Samples a Bell state on the least busy IBM Quantum device:
//!
//! ```text
//! $ export QISKIT_IBM_TOKEN=...
//! $ quistik run
//! Using backend: ibm_brisbane
//! Circuit transpiled successfully
//! ...
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::{AccountArgs, SelectionArgs};
use commands::{backends, job, run, save_account, version};

/// quistik - Bell-state sampling on IBM Quantum hardware
#[derive(Parser)]
#[command(name = "quistik")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transpile a Bell circuit for the least busy device and sample it
    Run {
        #[command(flatten)]
        account: AccountArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Number of shots
        #[arg(short, long, default_value = "1024", value_parser = clap::value_parser!(u32).range(1..))]
        shots: u32,

        /// Optimization level (0-3)
        #[arg(long, default_value = "3", value_parser = clap::value_parser!(u8).range(0..=3))]
        optimization_level: u8,

        /// Use this device instead of the least busy one
        #[arg(short, long)]
        backend: Option<String>,

        /// Stop waiting for results after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Do not write the token to the account file
        #[arg(long)]
        no_save: bool,
    },

    /// Save an account to the local profile
    SaveAccount {
        #[command(flatten)]
        account: AccountArgs,

        /// Replace an account saved under the same name
        #[arg(long)]
        overwrite: bool,
    },

    /// List devices, least busy first
    Backends {
        #[command(flatten)]
        account: AccountArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// List every device, including simulators and offline ones
        #[arg(short, long)]
        all: bool,
    },

    /// Show a job's status, and its results once complete
    Job {
        /// Job ID
        job_id: String,

        #[command(flatten)]
        account: AccountArgs,

        /// Block until the job finishes
        #[arg(short, long)]
        wait: bool,

        /// Stop waiting after this many seconds
        #[arg(long, requires = "wait")]
        timeout: Option<u64>,

        /// Cancel the job instead
        #[arg(long, conflicts_with = "wait")]
        cancel: bool,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over -v
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            account,
            selection,
            shots,
            optimization_level,
            backend,
            timeout,
            no_save,
        } => {
            let options = run::RunOptions {
                shots,
                optimization_level,
                min_qubits: selection.min_qubits,
                backend,
                timeout,
                save: !no_save,
            };
            run::execute(&account, &options).await
        }

        Commands::SaveAccount { account, overwrite } => save_account::execute(&account, overwrite),

        Commands::Backends {
            account,
            selection,
            all,
        } => backends::execute(&account, &selection, all).await,

        Commands::Job {
            job_id,
            account,
            wait,
            timeout,
            cancel,
        } => job::execute(&account, &job_id, wait, timeout, cancel).await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
