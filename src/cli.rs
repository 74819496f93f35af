//! CLI entrypoint wiring for the execas binary.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;

use crate::transition;
use crate::types::LaunchError;

/// Diagnostic prefix; everything the operator sees on stderr carries it.
const TOOL: &str = "execas";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target user name
    user: String,
    /// Command and arguments to execute as the target user
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

/// Parse arguments, run the privilege transition, and never come back.
///
/// Every failure exits with code 1 and a prefixed diagnostic on stderr.
/// On success this function does not return at all: the process image has
/// been replaced by the requested command.
pub fn run() -> Result<()> {
    env_logger::init();

    // The transition is built entirely on Unix credential primitives.
    if !cfg!(unix) {
        eprintln!("{}: unsupported platform", TOOL);
        std::process::exit(1);
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayHelp || e.kind() == ErrorKind::DisplayVersion => {
            e.exit()
        }
        Err(e) => {
            // Malformed invocation is exit code 1 like every other failure,
            // not clap's default 2.
            let _ = e.print();
            std::process::exit(1);
        }
    };

    match transition::launch(&cli.user, &cli.command) {
        // launch only returns on failure; Ok is unreachable but harmless
        Ok(()) => Ok(()),
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    }
}

fn report(e: &LaunchError) {
    match e {
        LaunchError::ExecReturned => {
            // Invariant violation, not a normal failure: the kernel handed
            // control back from a successful exec.
            eprintln!("{}: internal error: {}", TOOL, e);
        }
        _ => eprintln!("{}: {}", TOOL, e),
    }
}
