use anyhow::Result;

use scout_desk::cli::Command;
use scout_desk::{
    handle_competitions, handle_import, handle_players, handle_report, handle_serve, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Players(args) => handle_players(args),
        Command::Competitions => handle_competitions(),
        Command::Import { file } => handle_import(file),
        Command::Report { player_id } => handle_report(player_id),
    }
}
