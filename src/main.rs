use clap::Parser;
use inkstamp::{init_logging, run_job, BakeJob, BakeOutcome, Cli, BUILD_DATE, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = cli.load_config()?;
    tracing::info!("InkStamp {} (built {})", VERSION, BUILD_DATE);

    let job = BakeJob::load(&cli.job)?;
    tracing::info!(
        "Baking {} placement(s) onto {}",
        job.placements.len(),
        job.page.display()
    );

    match run_job(&job, &config).await? {
        BakeOutcome::Complete { stamped } => {
            tracing::info!("Stamped {} placement(s) into {}", stamped, job.output.display());
        }
        BakeOutcome::Partial { stamped, omitted } => {
            tracing::warn!(
                "Stamped {} placement(s) into {}, omitted {}",
                stamped,
                job.output.display(),
                omitted.len()
            );
            for skipped in &omitted {
                tracing::warn!("Omitted {}: {}", skipped.id, skipped.reason);
            }
        }
    }

    Ok(())
}
