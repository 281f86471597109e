pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod http;
pub mod rate_limiter;
pub mod services;
pub mod state;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use std::path::Path;

use crate::cli::{Command, PlayerFilterArgs};
use crate::config::settings::{AppConfig, FilterSettings};
use crate::database::players::PlayersTable;
use crate::domain::age::{derive_age, derive_ages};
use crate::domain::filter::{self, parse_codes};
use crate::domain::{FilterState, Player};
use crate::services::import::import_players;
use crate::services::remote::{ChangeFeed, RemoteStore};
use crate::services::report::{AiReportClient, ReportGenerator};
use crate::services::server::ServerService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

fn connect_store(config: &AppConfig) -> Result<RemoteStore> {
    RemoteStore::connect(&config.store, ChangeFeed::new())
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_players(args: &PlayerFilterArgs) -> Result<()> {
    let config = AppConfig::from_env();
    let store = connect_store(&config)?;
    let filter_state = filter_from_args(args, &config.filter)?;

    let players = derive_ages(store.list::<PlayersTable>(), Local::now().date_naive());
    let visible = filter::filter(&players, &filter_state);

    for player in &visible {
        println!("{}", format_player(player));
    }
    println!("{}", format!("{} of {} players", visible.len(), players.len()).dimmed());
    Ok(())
}

pub fn handle_competitions() -> Result<()> {
    let config = AppConfig::from_env();
    let store = connect_store(&config)?;

    for competition in filter::competitions(&store.list::<PlayersTable>()) {
        println!("{}", competition);
    }
    Ok(())
}

pub fn handle_import(file: &Path) -> Result<()> {
    let config = AppConfig::from_env();
    let store = connect_store(&config)?;

    let count = import_players(file, &store, Local::now().date_naive())
        .with_context(|| format!("Import of {} aborted, nothing was saved", file.display()))?;
    println!("{} {} players from {}", "Imported".green().bold(), count, file.display());
    Ok(())
}

pub fn handle_report(player_id: &str) -> Result<()> {
    let config = AppConfig::from_env();
    let store = connect_store(&config)?;
    let player = store
        .find_player(player_id)?
        .with_context(|| format!("Player {} not found", player_id))?;
    let player = derive_age(player, Local::now().date_naive());

    let client = AiReportClient::new(config.report.clone())?;
    let runtime = tokio::runtime::Runtime::new()?;
    match runtime.block_on(client.generate_report(&player)) {
        Ok(report) => {
            println!("{}\n", player.name.bold());
            println!("{}", report);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.remediation().yellow());
            Err(e.into())
        }
    }
}

pub fn filter_from_args(args: &PlayerFilterArgs, defaults: &FilterSettings) -> Result<FilterState> {
    Ok(FilterState {
        search: args.search.clone().unwrap_or_default(),
        positions: parse_codes(args.positions.iter().map(String::as_str))?,
        min_age: args.min_age.unwrap_or(defaults.default_min_age),
        max_age: args.max_age.unwrap_or(defaults.default_max_age),
        recommendations: parse_codes(args.recommendations.iter().map(String::as_str))?,
        competitions: args.competitions.iter().cloned().collect(),
        scout_years: parse_codes(args.scout_years.iter().map(String::as_str))?,
        feet: parse_codes(args.feet.iter().map(String::as_str))?,
    })
}

fn format_player(player: &Player) -> String {
    let positions = player
        .positions
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join("/");
    let age = player.age.map(|a| a.to_string()).unwrap_or_else(|| "?".to_string());

    format!(
        "{:<36} {:<24} {:>3}  {:<7} {:<20} {}",
        player.id.dimmed(),
        player.name.bold(),
        age,
        positions,
        player.club,
        player.recommendation.label().cyan()
    )
}
