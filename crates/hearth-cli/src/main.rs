//! Hearth CLI - Family budget analytics
//!
//! Usage:
//!   hearth init                                   Initialize database
//!   hearth import --family Smith --file ledger.csv
//!   hearth forecast --family Smith --year 2024 --month 7
//!   hearth track --family Smith --year 2024 --month 7
//!   hearth serve --port 3000                      Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Families { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_families_list(&db),
                Some(FamiliesAction::Add { name }) => commands::cmd_families_add(&db, &name),
            }
        }
        Commands::Categories { family, action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_categories_list(&db, &family),
                Some(CategoriesAction::Add { name, kind }) => {
                    commands::cmd_categories_add(&db, &family, &name, &kind)
                }
            }
        }
        Commands::Import { family, file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &family, &file)
        }
        Commands::Transactions {
            family,
            from,
            to,
            limit,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let from = from.as_deref().map(commands::parse_date).transpose()?;
            let to = to.as_deref().map(commands::parse_date).transpose()?;
            commands::cmd_transactions_list(&db, &family, from, to, limit)
        }
        Commands::Budgets {
            family,
            year,
            month,
            action,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_budgets_list(&db, &family, year, month),
                Some(BudgetsAction::Set {
                    category,
                    month,
                    amount,
                }) => commands::cmd_budgets_set(&db, &family, &category, &month, amount),
                Some(BudgetsAction::Delete { id }) => commands::cmd_budgets_delete(&db, id),
            }
        }
        Commands::Forecast {
            family,
            year,
            month,
            as_of,
            json,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let engine = commands::load_engine()?;
            let as_of = commands::resolve_as_of(as_of.as_deref())?;
            commands::cmd_forecast(&db, &engine, &family, year, month, as_of, json)
        }
        Commands::Track {
            family,
            year,
            month,
            as_of,
            json,
            notify,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let engine = commands::load_engine()?;
            let as_of = commands::resolve_as_of(as_of.as_deref())?;
            commands::cmd_track(&db, &engine, &family, year, month, as_of, json, notify)
        }
        Commands::Alerts { family, limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_alerts(&db, family.as_deref(), limit)
        }
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth, cli.no_encrypt).await,
        Commands::Reset { soft, yes } => commands::cmd_reset(&cli.db, soft, yes, cli.no_encrypt),
    }
}
