use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dvf_maintenance::{clean, store, PipelineConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Clean and store French land-value (DVF) transaction exports"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Worker threads for the fusion phase [env: DVF_THREADS]
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Rows per batch when reading the source [env: DVF_BATCH_SIZE]
    #[arg(long, global = true)]
    batch_size: Option<usize>,

    /// Brotli quality of the Parquet output, 0 to 11 [env: DVF_BROTLI_LEVEL]
    #[arg(long, global = true)]
    brotli_level: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Fuse the export into one record per mutation and write it as Parquet
    Clean(Target),
    /// Convert the export to Parquet as is
    Store(Target),
}

#[derive(Args)]
struct Target {
    /// Source file
    path: PathBuf,

    /// Output file, or a directory to write into
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source format: csv, parquet or pickle
    #[arg(short, long, default_value = "csv")]
    format: String,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env()?.with_overrides(
        cli.threads,
        cli.batch_size,
        cli.brotli_level,
    )?;
    info!(?config, "startup");

    match cli.command {
        Command::Clean(t) => {
            let report = clean(&t.path, t.output.as_deref(), &t.format, &config)?;
            println!("{}", report.output.display());
        }
        Command::Store(t) => {
            let report = store(&t.path, t.output.as_deref(), &t.format, &config)?;
            println!("{}", report.output.display());
        }
    }
    Ok(())
}
