//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analytics` - Forecast, budget tracking and alert commands
//! - `budgets` - Monthly budget management (list, set, delete)
//! - `categories` - Category management per family
//! - `core` - Init and shared utilities (open_db, resolve_family, dates)
//! - `families` - Family management
//! - `import` - CSV ledger import
//! - `serve` - Web server command
//! - `status` - Status and reset commands
//! - `transactions` - Transaction listing

pub mod analytics;
pub mod budgets;
pub mod categories;
pub mod core;
pub mod families;
pub mod import;
pub mod serve;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use analytics::*;
pub use budgets::*;
pub use categories::*;
pub use core::*;
pub use families::*;
pub use import::*;
pub use serve::*;
pub use status::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount as currency with thousands separators
pub fn money(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}.{}", if negative { "-" } else { "" }, grouped, frac)
}
