use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oscegen::config;
use oscegen::error::PipelineError;
use oscegen::model::OllamaClient;
use oscegen::retry::RetryRunner;
use oscegen::runner::{GenerationRunner, LoopConfig};
use oscegen::store::CaseStore;
use oscegen::taxonomy::ComplaintTaxonomy;

#[derive(Parser)]
#[command(name = config::APP_NAME, version, about = "Synthesize OSCE-style clinical cases with a local model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the primary generation pass over the taxonomy.
    Generate {
        #[command(flatten)]
        common: CommonArgs,

        /// Cap on work items per complaint (0 means the full list).
        #[arg(long, default_value_t = 0)]
        max_cases: usize,

        /// Only process complaints matching these substrings
        /// (case-insensitive). Repeatable.
        #[arg(long = "complaints")]
        complaints: Vec<String>,
    },
    /// Re-attempt previously failed differentials found in the output
    /// directory.
    Retry {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Line-delimited JSON taxonomy of complaints and differentials.
    #[arg(long, default_value = config::DEFAULT_TAXONOMY_PATH)]
    taxonomy: PathBuf,

    /// Output root for generated cases.
    #[arg(long, default_value = config::DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Model name, defaults to OSCEGEN_MODEL or the built-in default.
    #[arg(long)]
    model: Option<String>,

    /// Endpoint base URL, defaults to OSCEGEN_BASE_URL or the built-in
    /// default.
    #[arg(long)]
    base_url: Option<String>,

    /// HTTP timeout for a single generation call, in seconds.
    #[arg(long, default_value_t = config::DEFAULT_MODEL_TIMEOUT_SECS)]
    timeout_secs: u64,
}

impl CommonArgs {
    fn client(&self) -> anyhow::Result<OllamaClient> {
        let base_url = self
            .base_url
            .clone()
            .unwrap_or_else(config::model_base_url);
        let model = self.model.clone().unwrap_or_else(config::model_name);
        tracing::info!(%base_url, %model, "model endpoint configured");
        OllamaClient::new(&base_url, &model, self.timeout_secs)
            .context("building model client")
    }

    fn taxonomy(&self) -> anyhow::Result<ComplaintTaxonomy> {
        let taxonomy = ComplaintTaxonomy::load(&self.taxonomy);
        if taxonomy.is_empty() {
            return Err(PipelineError::EmptyTaxonomy(self.taxonomy.clone()).into());
        }
        Ok(taxonomy)
    }

    fn store(&self) -> anyhow::Result<CaseStore> {
        CaseStore::open(&self.output).with_context(|| {
            format!("opening output directory {}", self.output.display())
        })
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match Cli::parse().command {
        Command::Generate {
            common,
            max_cases,
            complaints,
        } => generate(common, max_cases, complaints),
        Command::Retry { common } => retry(common),
    }
}

fn generate(common: CommonArgs, max_cases: usize, complaints: Vec<String>) -> anyhow::Result<()> {
    let mut taxonomy = common.taxonomy()?;

    let targets: Vec<String> = if complaints.is_empty() {
        config::COMPLAINTS_TO_RUN.iter().map(|s| s.to_string()).collect()
    } else {
        complaints
    };
    taxonomy.filter_complaints(&targets);
    if taxonomy.is_empty() {
        return Err(PipelineError::NoMatchingComplaints.into());
    }

    let model = common.client()?;
    let mut store = common.store()?;
    let summary = GenerationRunner::new(&model, &taxonomy, &mut store, max_cases, LoopConfig::primary())
        .run()
        .context("primary generation pass")?;

    tracing::info!(
        accepted = summary.accepted,
        exhausted = summary.exhausted,
        skipped = summary.skipped,
        "generation finished"
    );
    Ok(())
}

fn retry(common: CommonArgs) -> anyhow::Result<()> {
    let taxonomy = ComplaintTaxonomy::load(&common.taxonomy);
    if taxonomy.is_empty() {
        tracing::warn!(
            path = %common.taxonomy.display(),
            "taxonomy unavailable, relying on failure logs only"
        );
    }

    let model = common.client()?;
    let mut store = common.store()?;
    let summary = RetryRunner::new(&model, &taxonomy, &mut store, LoopConfig::resumption())
        .run()
        .context("resumption pass")?;

    tracing::info!(
        recovered = summary.recovered,
        still_failed = summary.still_failed,
        skipped = summary.skipped,
        "retry finished"
    );
    Ok(())
}
