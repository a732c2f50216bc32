use anyhow::Result;

use mahjong_ledger::cli::{Cli, Command};
use mahjong_ledger::{
    configure, handle_add_player, handle_check, handle_completions, handle_delete, handle_edit,
    handle_history, handle_leaderboard, handle_reconcile, handle_record, interpret,
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
    let cli = interpret();
    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    let config = configure(cli);
    match &cli.command {
        Command::AddPlayer { name } => handle_add_player(config, name),
        Command::Record {
            east,
            south,
            west,
            north,
        } => handle_record(config, [east, south, west, north].map(String::as_str)),
        Command::Delete { id } => handle_delete(config, id),
        Command::Edit {
            id,
            east,
            south,
            west,
            north,
        } => handle_edit(config, id, [east, south, west, north].map(String::as_str)),
        Command::Leaderboard => handle_leaderboard(config),
        Command::History { limit } => handle_history(config, *limit),
        Command::Check => handle_check(config),
        Command::Reconcile => handle_reconcile(config),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
