//! Command surface for recording and reviewing house-price predictions.
//!
//! - [`run_cli`] executes a fully parsed command line.
//! - [`build_gateway`] assembles the persistence gateway from [`StoreArgs`].
//!
//! Every setting can come from a flag or its environment variable; `main`
//! loads an optional `.env` first.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use house_price_ledger_core::{
    format_timestamp, HouseFeatures, LinearPriceModel, PriceModel, Record, RecordDraft,
};
use house_price_ledger_store::{
    average_price_by_location, Ack, FallbackStore, HistoryReport, HistorySource,
    PersistenceGateway, PredictionService, PrimaryConfig, SqlitePrimaryStore,
    DEFAULT_FALLBACK_FILE, DEFAULT_HISTORY_LIMIT,
};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "hpl")]
#[command(about = "House price prediction ledger")]
pub struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Append-only CSV used when the primary store cannot take a write.
    #[arg(long, env = "HPL_FALLBACK_FILE", default_value = DEFAULT_FALLBACK_FILE, global = true)]
    pub fallback_file: PathBuf,

    /// Primary `SQLite` database. Unset means every write uses the fallback file.
    #[arg(long, env = "HPL_PRIMARY_DB", global = true)]
    pub primary_db: Option<PathBuf>,

    #[arg(long, env = "HPL_CONNECT_TIMEOUT_MS", default_value_t = 5000, global = true)]
    pub connect_timeout_ms: u64,

    #[arg(long, env = "HPL_HISTORY_SOURCE", value_enum, default_value_t = HistorySourceArg::Merged, global = true)]
    pub history_source: HistorySourceArg,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum HistorySourceArg {
    Merged,
    FallbackOnly,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict a price with a model artifact and record it.
    Predict(PredictArgs),
    /// Record an already computed prediction.
    Record(RecordArgs),
    /// Show recent predictions.
    History(HistoryArgs),
    /// Show model feature importances, highest first.
    Importances(ModelArgs),
    /// Show average listing price per location.
    Locations(LocationsArgs),
    /// Create the primary table.
    Migrate,
}

#[derive(Debug, Args)]
pub struct ModelArgs {
    #[arg(long, env = "HPL_MODEL")]
    model: PathBuf,
}

#[derive(Debug, Args)]
pub struct FeatureArgs {
    #[arg(long)]
    bedroom: u32,
    #[arg(long)]
    bathroom: u32,
    #[arg(long)]
    land: u32,
    #[arg(long)]
    building: u32,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    #[command(flatten)]
    model: ModelArgs,
    #[command(flatten)]
    features: FeatureArgs,
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Record as JSON (`bedroom`, `bathroom`, `land_clean`, `building_clean`, `price_pred`).
    #[arg(long, conflicts_with_all = ["bedroom", "bathroom", "land", "building", "price"])]
    json: Option<String>,
    #[arg(long)]
    bedroom: Option<u32>,
    #[arg(long)]
    bathroom: Option<u32>,
    #[arg(long)]
    land: Option<u32>,
    #[arg(long)]
    building: Option<u32>,
    #[arg(long)]
    price: Option<u64>,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    limit: usize,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
pub struct LocationsArgs {
    #[arg(long, env = "HPL_LISTINGS", default_value = "listings.csv")]
    listings: PathBuf,
}

#[derive(Debug, Serialize)]
struct PersistOutput<'a> {
    record: &'a Record,
    ack: &'a Ack,
    notice: String,
}

/// Executes the parsed command.
///
/// # Errors
/// Returns an error when inputs are invalid, the model artifact cannot be
/// loaded, or a record cannot be written to either store.
pub fn run_cli(cli: Cli) -> Result<()> {
    let gateway = build_gateway(&cli.store);

    match cli.command {
        Command::Predict(args) => {
            let model = load_model(&args.model.model)?;
            let features = HouseFeatures::new(
                args.features.bedroom,
                args.features.bathroom,
                args.features.land,
                args.features.building,
            )?;
            let service = PredictionService::new(model, gateway);
            let outcome = service.predict_and_record(features)?;
            print_persisted(&outcome.record, &outcome.ack)
        }
        Command::Record(args) => {
            let record = record_from_args(args)?;
            let ack = gateway.persist(record.clone())?;
            print_persisted(&record, &ack)
        }
        Command::History(args) => {
            let report = gateway.history(args.limit);
            for warning in &report.warnings {
                eprintln!("warning: {warning}");
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_history_table(&report)?;
            }
            Ok(())
        }
        Command::Importances(args) => {
            let model = load_model(&args.model)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&model.feature_importances())?
            );
            Ok(())
        }
        Command::Locations(args) => {
            let averages = average_price_by_location(&args.listings)?;
            println!("{}", serde_json::to_string_pretty(&averages)?);
            Ok(())
        }
        Command::Migrate => {
            gateway.primary().migrate()?;
            println!(
                "{}",
                serde_json::json!({ "migrated": true, "table": house_price_ledger_store::PRIMARY_TABLE })
            );
            Ok(())
        }
    }
}

/// Builds the gateway described by the store settings.
#[must_use]
pub fn build_gateway(args: &StoreArgs) -> PersistenceGateway<SqlitePrimaryStore> {
    let primary = match &args.primary_db {
        Some(database) => SqlitePrimaryStore::new(
            PrimaryConfig::new(database)
                .with_connect_timeout(Duration::from_millis(args.connect_timeout_ms)),
        ),
        None => SqlitePrimaryStore::unconfigured(),
    };

    PersistenceGateway::new(primary, FallbackStore::new(&args.fallback_file))
        .with_history_source(match args.history_source {
            HistorySourceArg::Merged => HistorySource::Merged,
            HistorySourceArg::FallbackOnly => HistorySource::FallbackOnly,
        })
}

fn load_model(path: &Path) -> Result<LinearPriceModel> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("failed to read model artifact {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&body)
        .with_context(|| format!("model artifact {} is not valid JSON", path.display()))?;
    LinearPriceModel::from_json(&value)
        .with_context(|| format!("invalid model artifact {}", path.display()))
}

fn record_from_args(args: RecordArgs) -> Result<Record> {
    let draft = match args.json {
        Some(raw) => {
            let value: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("record must be valid JSON: {raw}"))?;
            RecordDraft::from_json(&value)?
        }
        None => RecordDraft {
            bedroom: args.bedroom,
            bathroom: args.bathroom,
            land_clean: args.land,
            building_clean: args.building,
            price_pred: args.price,
        },
    };
    Ok(draft.into_record()?)
}

fn print_persisted(record: &Record, ack: &Ack) -> Result<()> {
    let notice = ack.notice();
    if ack.is_fallback() {
        eprintln!("notice: {notice}");
    }
    let output = PersistOutput {
        record,
        ack,
        notice,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_history_table(report: &HistoryReport) -> Result<()> {
    if report.records.is_empty() {
        println!("no predictions recorded yet");
        return Ok(());
    }

    println!(
        "{:<19} {:>7} {:>8} {:>10} {:>14} {:>15}",
        "timestamp", "bedroom", "bathroom", "land_clean", "building_clean", "price_pred"
    );
    println!("{}", "-".repeat(78));
    for record in &report.records {
        let timestamp = format_timestamp(record.created_at())
            .map_err(|err| anyhow!("failed to format timestamp: {err}"))?;
        println!(
            "{:<19} {:>7} {:>8} {:>10} {:>14} {:>15}",
            timestamp,
            record.bedroom_count(),
            record.bathroom_count(),
            record.land_area_m2(),
            record.building_area_m2(),
            record.predicted_price()
        );
    }
    Ok(())
}
