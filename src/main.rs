use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use dotforge_cli::commands::{self, Terminal};
use dotforge_cli::logging::{self, Logger, Verbosity};
use dotforge_cli::repository::GitSync;
use dotforge_cli::{cli, error};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    let name = args.command.name();
    logging::init_subscriber(
        Verbosity::from_flags(args.global.verbose, args.global.quiet),
        name,
    );
    let log = Arc::new(Logger::new(name));

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut input = stdin.lock();
    let mut output = stdout.lock();
    let mut term = Terminal::new(&mut input, &mut output);

    match commands::dispatch(&args, &log, &GitSync, &mut term) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::from(u8::try_from(error::exit_code(&e)).unwrap_or(1))
        }
    }
}
