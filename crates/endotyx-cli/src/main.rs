mod report;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use endotyx_common::AnalysisConfig;
use endotyx_ingest::{attach_predictions, load_expression_csv, load_predictions, FileBaselineProvider};
use endotyx_stats::baseline_provider::{BaselineProvider, NoBaseline};
use endotyx_stats::gene_list_provider::{GeneListProvider, StaticGeneList, TopVarianceGeneList};
use endotyx_stats::prediction_provider::InMemoryPredictions;
use endotyx_stats::GeneComparisonEngine;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::report::{gene_report, GeneReport, NoGenesReport};

/// Compare positive-label patients against a baseline cohort, gene by gene.
#[derive(Debug, Parser)]
#[command(name = "endotyx", version, about)]
struct Cli {
    /// Config file (.toml, .yaml or .json); defaults to $ENDOTYX_CONFIG or endotyx.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Uploaded expression CSV (rows = patients, columns = genes)
    #[arg(long)]
    expression: Option<PathBuf>,

    /// Prediction service response (JSON)
    #[arg(long)]
    predictions: Option<PathBuf>,

    /// Baseline cohort (.json or .csv)
    #[arg(long)]
    baseline: Option<PathBuf>,

    /// Compare this gene only
    #[arg(long, conflicts_with_all = ["all", "index"])]
    gene: Option<String>,

    /// Select the gene at this position of the gene list
    #[arg(long, conflicts_with = "all")]
    index: Option<usize>,

    /// Compare every gene in the gene list
    #[arg(long)]
    all: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("endotyx=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("endotyx {}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_path(path)
            .with_context(|| format!("Could not load config {:?}", path))?,
        None => AnalysisConfig::load().context("Could not load configuration")?,
    };

    let expression_path = cli
        .expression
        .or_else(|| config.data.expression_csv.clone())
        .context("No expression CSV given (--expression or data.expression_csv)")?;
    let predictions_path = cli
        .predictions
        .or_else(|| config.data.predictions_json.clone())
        .context("No predictions given (--predictions or data.predictions_json)")?;
    let baseline_path = cli.baseline.or_else(|| config.data.baseline.clone());

    let matrix = load_expression_csv(&expression_path, &config.ingest).await?;
    let entries = load_predictions(&predictions_path).await?;
    let predictions = InMemoryPredictions::new(attach_predictions(&matrix.to_samples(), &entries));

    let baseline: Box<dyn BaselineProvider> = match baseline_path {
        Some(path) => Box::new(FileBaselineProvider::open(path, &config.ingest).await),
        None => {
            info!("No baseline configured; comparing positive patients only");
            Box::new(NoBaseline)
        }
    };

    let gene_list: Box<dyn GeneListProvider> = if config.genes.explicit.is_empty() {
        Box::new(TopVarianceGeneList::new(&matrix, config.genes.top_n))
    } else {
        Box::new(StaticGeneList::new(config.genes.explicit.clone()))
    };

    let mut engine = GeneComparisonEngine::from_provider(gene_list.as_ref(), &config);
    if engine.gene_count() == 0 {
        println!("{}", serde_json::to_string_pretty(&NoGenesReport::new())?);
        return Ok(());
    }
    info!("Comparing over {} genes", engine.gene_count());

    let genes: Vec<String> = if cli.all {
        engine.genes().to_vec()
    } else if let Some(gene) = cli.gene {
        vec![gene]
    } else {
        if let Some(index) = cli.index {
            engine.select(index)?;
        }
        engine.active_gene().map(str::to_string).into_iter().collect()
    };

    let reports = genes
        .iter()
        .map(|gene| gene_report(&engine, gene, &predictions, baseline.as_ref()))
        .collect::<Result<Vec<GeneReport>, _>>()?;

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
