//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Hearth - Forecast and track your family budget
#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Self-hosted family budget forecasting and tracking", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "hearth.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set HEARTH_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database status (encryption, size, row counts)
    Status,

    /// List or add families
    Families {
        #[command(subcommand)]
        action: Option<FamiliesAction>,
    },

    /// List or add categories for a family
    Categories {
        /// Family name or ID
        #[arg(short, long)]
        family: String,

        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Import ledger transactions from CSV
    ///
    /// Expected header: date,category,[kind,]amount[,description]
    Import {
        /// Family name or ID (created if missing)
        #[arg(long)]
        family: String,

        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List recent transactions
    Transactions {
        /// Family name or ID
        #[arg(short, long)]
        family: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Maximum number of rows
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Manage monthly budgets (list, set, delete)
    Budgets {
        /// Family name or ID
        #[arg(short, long)]
        family: String,

        /// Year to list (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month to list (1-12); omit for the whole year
        #[arg(short, long)]
        month: Option<u32>,

        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Forecast next month's spending per category
    Forecast {
        /// Family name or ID
        #[arg(short, long)]
        family: String,

        /// Target year
        #[arg(short, long)]
        year: i32,

        /// Target month (1-12)
        #[arg(short, long)]
        month: u32,

        /// Evaluate budgets as of this date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Track budgets against actual spending
    Track {
        /// Family name or ID
        #[arg(short, long)]
        family: String,

        /// Budget year
        #[arg(short, long)]
        year: i32,

        /// Budget month (1-12); omit to track the whole year
        #[arg(short, long)]
        month: Option<u32>,

        /// Evaluate as of this date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Record alerts at warning level and above
        #[arg(long)]
        notify: bool,
    },

    /// List recorded budget alerts
    Alerts {
        /// Family name or ID (all families if omitted)
        #[arg(short, long)]
        family: Option<String>,

        /// Maximum number of alerts
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires an API key from HEARTH_API_KEYS.
        #[arg(long)]
        no_auth: bool,
    },

    /// Reset the database (clear data)
    Reset {
        /// Soft reset: clear transactions and alerts but keep families, categories, budgets
        /// Without this flag, performs a hard reset (deletes DB file and re-initializes)
        #[arg(long)]
        soft: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum FamiliesAction {
    /// Add a family
    Add {
        /// Family name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// Add a category
    Add {
        /// Category name
        name: String,

        /// Category kind: expense or income
        #[arg(short, long, default_value = "expense")]
        kind: String,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// Set (create or replace) a monthly budget
    Set {
        /// Category name
        category: String,

        /// Budget month (YYYY-MM)
        #[arg(long)]
        month: String,

        /// Budget amount
        amount: f64,
    },

    /// Delete a budget by ID
    Delete {
        /// Budget ID
        id: i64,
    },
}
