pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod registry;
pub mod scoring;
pub mod services;
pub mod storage;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;

use crate::config::settings::AppConfig;
use crate::services::ledger::LedgerService;

pub fn interpret() -> Cli {
    Cli::parse()
}

/// Builds the configuration from the environment and the global flags.
pub fn configure(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::new();
    config.storage = config
        .storage
        .with_overrides(cli.backend, cli.path.clone());
    if cli.no_color {
        config.display.color = false;
    }
    config
}

pub fn handle_add_player(config: AppConfig, name: &str) -> Result<()> {
    let mut service = LedgerService::new(config)?;
    println!("{}", service.add_player(name)?);
    Ok(())
}

pub fn handle_record(config: AppConfig, seats: [&str; 4]) -> Result<()> {
    let mut service = LedgerService::new(config)?;
    println!("{}", service.record(seats)?);
    Ok(())
}

pub fn handle_delete(config: AppConfig, game_id: &str) -> Result<()> {
    let mut service = LedgerService::new(config)?;
    println!("{}", service.delete(game_id)?);
    Ok(())
}

pub fn handle_edit(config: AppConfig, game_id: &str, scores: [&str; 4]) -> Result<()> {
    let mut service = LedgerService::new(config)?;
    println!("{}", service.edit(game_id, scores)?);
    Ok(())
}

pub fn handle_leaderboard(config: AppConfig) -> Result<()> {
    let service = LedgerService::new(config)?;
    println!("{}", service.leaderboard());
    Ok(())
}

pub fn handle_history(config: AppConfig, limit: Option<usize>) -> Result<()> {
    let service = LedgerService::new(config)?;
    println!("{}", service.history(limit));
    Ok(())
}

pub fn handle_check(config: AppConfig) -> Result<()> {
    let service = LedgerService::new(config)?;
    println!("{}", service.check()?);
    Ok(())
}

pub fn handle_reconcile(config: AppConfig) -> Result<()> {
    let mut service = LedgerService::new(config)?;
    println!("{}", service.reconcile()?);
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
