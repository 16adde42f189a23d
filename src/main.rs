use std::process::ExitCode;

use clap::Parser;
use oddsledger::adapter::inbound::cli::command::Cli;
use oddsledger::adapter::inbound::cli::{diagnostic, output, run};

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config_path = cli.config.clone();

    match run::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if output::is_json() {
                output::error(&err.to_string());
            } else {
                eprintln!("{:?}", diagnostic::report(err, &config_path));
            }
            ExitCode::FAILURE
        }
    }
}
