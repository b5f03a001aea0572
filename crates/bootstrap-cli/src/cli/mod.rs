mod commands;
mod job;

use bootstrap_core::domain::BootstrapError;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    match run(std::env::args().skip(1)) {
        Ok(code) => code,
        Err(error) => {
            let error = error.as_bootstrap_error();
            eprintln!("{}", error.diagnostic_line());
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("bootstrap".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();

    match Cli::try_parse_from(&full_args) {
        Ok(cli) => {
            init_tracing(cli.verbose);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "bootstrap",
    about = "Bootstrap bounds on quantum energy eigenvalues"
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Run the refinement rounds described by a job file
    Run {
        /// Job file (JSON)
        #[arg(value_name = "job")]
        job: PathBuf,
        /// Neither resume from nor write the checkpoint files. Without this
        /// flag a job with no checkpoint section still saves to the keyed
        /// files in its output directory.
        #[arg(long)]
        no_checkpoint: bool,
    },
    /// Print a stored round history
    Show {
        /// History checkpoint (energy_intervals_<key>.json)
        #[arg(value_name = "history")]
        history: PathBuf,
    },
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Run { job, no_checkpoint } => commands::run_job_command(&job, !no_checkpoint),
        CliCommand::Show { history } => commands::show_history_command(&history),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(BootstrapError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_bootstrap_error(&self) -> BootstrapError {
        match self {
            Self::Usage(message) => {
                BootstrapError::input_validation("INPUT.CLI_USAGE", message.clone())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => BootstrapError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

impl From<BootstrapError> for CliError {
    fn from(error: BootstrapError) -> Self {
        Self::Compute(error)
    }
}
