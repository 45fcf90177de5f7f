use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use stockroom_core::ItemId;
use stockroom_infra::StoreConfig;
use stockroom_inventory::Changeset;
use stockroom_observability::LogFormat;

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "Inventory table with reorder alerts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the inventory, low-stock alert and best sellers.
    Report,
    /// Apply a JSON changeset document ({"edited": {...}, "added": [...], "deleted": [...]}).
    Apply { path: PathBuf },
    /// Record a sale of QUANTITY units of item ID.
    Sell { id: ItemId, quantity: i64 },
}

fn main() -> anyhow::Result<()> {
    match std::env::var("STOCKROOM_LOG_FORMAT") {
        Ok(format) => stockroom_observability::tracing::init(LogFormat::parse(Some(&format))),
        Err(_) => stockroom_observability::init(),
    }

    let cli = Cli::parse();
    let config = StoreConfig::from_env().context("invalid configuration")?;
    tracing::info!(backend = ?config.backend, url = %config.database_url, "opening inventory");

    let store = config.open_store().context("failed to open inventory")?;
    let snapshot = store.load().context("failed to load inventory")?;

    let snapshot = match cli.command.unwrap_or(Command::Report) {
        Command::Report => snapshot,
        Command::Apply { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let changeset = Changeset::from_json(&raw)
                .with_context(|| format!("{} is not a valid changeset", path.display()))?;
            let outcome = store
                .apply(&snapshot, changeset)
                .context("failed to commit changes")?;
            if let Some(rejections) = stockroom_console::render_rejections(&outcome.report) {
                eprintln!("{rejections}");
            }
            outcome.snapshot
        }
        Command::Sell { id, quantity } => {
            let outcome = store
                .record_sale(id, quantity)
                .with_context(|| format!("failed to record sale of item {id}"))?;
            outcome.snapshot
        }
    };

    print!("{}", stockroom_console::render_report(&snapshot));
    Ok(())
}
