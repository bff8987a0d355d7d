use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use engine::{Engine, ProcessingRun};
use migration::MigratorTrait;
use uuid::Uuid;

mod settings;
mod spend_csv;

#[derive(Parser, Debug)]
#[command(name = "spendfall")]
#[command(about = "Run the daily-statement batch over a raw spend export")]
struct Cli {
    /// Inclusive lower bound of the processing range (YYYY-MM-DD).
    #[arg(long)]
    update_from: NaiveDate,

    /// Restrict the run to one account's campaigns.
    #[arg(long)]
    account_id: Option<Uuid>,

    /// Restrict the run to specific campaigns (repeatable).
    #[arg(long = "campaign-id")]
    campaign_ids: Vec<Uuid>,

    /// Raw spend export with date,campaign_id,media_spend_nano,data_spend_nano rows.
    #[arg(long)]
    spend_csv: PathBuf,

    /// Delete existing statements from --update-from onward and regenerate.
    #[arg(long)]
    reprocess: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spendfall={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = sea_orm::Database::connect(&settings.database.url).await?;
    migration::Migrator::up(&db, None).await?;

    let engine = Engine::builder().database(db).build().await?;
    let spend_source = spend_csv::CsvSpendSource::from_path(&cli.spend_csv)?;

    let mut run = ProcessingRun::new(cli.update_from, Utc::now().date_naive());
    run.account_id = cli.account_id;
    if !cli.campaign_ids.is_empty() {
        run.campaign_ids = Some(cli.campaign_ids);
    }

    let summary = if cli.reprocess {
        engine.reprocess(&spend_source, &run).await?
    } else {
        engine.process(&spend_source, &run).await?
    };

    tracing::info!(
        campaigns = summary.campaigns_processed,
        dates = summary.dates_processed,
        written = summary.statements_written,
        skipped = summary.statements_skipped,
        failures = summary.failures.len(),
        "run complete"
    );
    for failure in &summary.failures {
        tracing::error!(
            campaign = %failure.campaign_id,
            error = %failure.error,
            "campaign failed"
        );
    }

    if summary.failures.is_empty() {
        Ok(())
    } else {
        Err("one or more campaigns failed; rerun with the same --update-from".into())
    }
}
