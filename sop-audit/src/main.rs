//! sop-audit - Content audit SOP command-line driver
//!
//! Wraps the analysis library: reads an exported page-performance CSV,
//! runs the content inventory or time-based analysis, optionally enriches
//! undated pages first, and writes the CSV exports.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sop_audit::export::{pages_to_csv, write_csv_file};
use sop_audit::parsing::read_csv_file;
use sop_audit::services::{load_cache, save_cache};
use sop_audit::{
    AnalysisStrategy, InventoryAnalyzer, PageRecord, PublishDateEnricher, SimulatedDateLookup,
    TimeBasedAnalysis,
};
use sop_common::config::{default_config_path, init_config, ConfigResolver, TomlConfig};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for sop-audit
#[derive(Parser, Debug)]
#[command(name = "sop-audit")]
#[command(about = "Content audit analysis for SEO page exports")]
#[command(version)]
struct Args {
    /// Configuration file (takes priority over SOP_AUDIT_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank pages by referring-domain and traffic quartiles
    Inventory {
        /// Exported CSV (URL, Title, Referring domains, Traffic)
        input: PathBuf,

        /// Write the ranked inventory CSV here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of top performers to print
        #[arg(long)]
        top: Option<usize>,

        /// Also list pages whose RD or traffic quartile equals this value
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        quartile: Option<u8>,

        /// Weight of the referring-domains quartile
        #[arg(long)]
        rd_weight: Option<f64>,

        /// Weight of the traffic quartile
        #[arg(long)]
        traffic_weight: Option<f64>,
    },

    /// Index pages against content published before them
    TimeBased {
        /// Exported CSV, optionally with a "Publish date" column
        input: PathBuf,

        /// Write the time-based analysis CSV here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Prior aggregate: median or average
        #[arg(short, long)]
        strategy: Option<String>,

        /// Out/underperformer threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// First publish date of the listed range (inclusive)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Last publish date of the listed range (inclusive)
        #[arg(long, requires = "from")]
        to: Option<String>,

        /// Look up publish dates for undated pages first
        #[arg(long)]
        enrich: bool,

        /// Delay between lookups in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// JSON file caching looked-up publish dates
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Print performance statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fill in missing publish dates and write the records back out
    Enrich {
        /// Exported CSV (URL, Title, Referring domains, Traffic)
        input: PathBuf,

        /// Write the enriched records CSV here
        #[arg(short, long)]
        output: PathBuf,

        /// Delay between lookups in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// JSON file caching looked-up publish dates
        #[arg(long)]
        cache: Option<PathBuf>,
    },

    /// Write a config file with the default settings (to --config or the platform path)
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Runs before loading, since the target file may not exist yet
    if let Command::InitConfig { force } = args.command {
        let path = args
            .config
            .or_else(default_config_path)
            .context("No platform config directory; pass --config")?;
        init_config(&path, force)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    // Config is loaded before the real subscriber exists; surface its warnings anyway
    let bootstrap = tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        ConfigResolver::new(args.config.clone()).load()
    })
    .context("Failed to load configuration")?;

    // Initialize tracing (stdout is reserved for results)
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("sop-audit {}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Inventory {
            input,
            output,
            top,
            quartile,
            rd_weight,
            traffic_weight,
        } => run_inventory(
            &config,
            &input,
            output.as_deref(),
            top,
            quartile,
            rd_weight,
            traffic_weight,
        ),
        Command::TimeBased {
            input,
            output,
            strategy,
            threshold,
            from,
            to,
            enrich,
            delay_ms,
            cache,
            json,
        } => {
            let strategy: AnalysisStrategy = strategy
                .as_deref()
                .unwrap_or(config.analysis.strategy.as_str())
                .parse()?;
            let range = from.zip(to);
            let enrichment = (enrich || config.enrichment.enabled)
                .then(|| enrichment_settings(&config, delay_ms, cache));

            run_time_based(
                &input,
                output.as_deref(),
                strategy,
                threshold.unwrap_or(config.analysis.threshold),
                range,
                enrichment,
                json,
            )
            .await
        }
        Command::Enrich {
            input,
            output,
            delay_ms,
            cache,
        } => run_enrich(&input, &output, enrichment_settings(&config, delay_ms, cache)).await,
        Command::InitConfig { .. } => Ok(()),
    }
}

/// Delay and cache location for an enrichment run, CLI over config
struct EnrichmentSettings {
    delay: Duration,
    cache_file: Option<PathBuf>,
}

fn enrichment_settings(
    config: &TomlConfig,
    delay_ms: Option<u64>,
    cache: Option<PathBuf>,
) -> EnrichmentSettings {
    EnrichmentSettings {
        delay: Duration::from_millis(delay_ms.unwrap_or(config.enrichment.delay_ms)),
        cache_file: cache.or_else(|| config.enrichment.cache_file.clone()),
    }
}

fn load_pages(input: &Path) -> Result<Vec<PageRecord>> {
    read_csv_file(input).with_context(|| format!("Failed to read {}", input.display()))
}

fn run_inventory(
    config: &TomlConfig,
    input: &Path,
    output: Option<&Path>,
    top: Option<usize>,
    quartile: Option<u8>,
    rd_weight: Option<f64>,
    traffic_weight: Option<f64>,
) -> Result<()> {
    let pages = load_pages(input)?;

    let analyzer = InventoryAnalyzer::new()
        .with_rd_weight(rd_weight.unwrap_or(config.analysis.rd_weight))?
        .with_traffic_weight(traffic_weight.unwrap_or(config.analysis.traffic_weight))?;
    let inventory = analyzer.run(&pages);

    let top_n = top.unwrap_or(config.analysis.top_n);
    let top_items = inventory.top_performers(top_n);
    println!("Top {} of {} pages by composite score:", top_items.len(), inventory.len());
    for (rank, item) in top_items.iter().enumerate() {
        println!(
            "{:>4}. {:>5.1}  RD Q{}  Traffic Q{}  RD/visit Q{}  {}  {}",
            rank + 1,
            item.composite_score,
            item.rd_quartile,
            item.traffic_quartile,
            item.rd_per_visit_quartile,
            item.url,
            item.page_title
        );
    }

    if let Some(q) = quartile {
        let matches = inventory.by_quartile(q);
        println!();
        println!("{} pages with RD or traffic in quartile {}:", matches.len(), q);
        for item in matches {
            println!("      {}  {}", item.url, item.page_title);
        }
    }

    if let Some(path) = output {
        write_csv_file(path, &inventory.to_csv())
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

async fn run_time_based(
    input: &Path,
    output: Option<&Path>,
    strategy: AnalysisStrategy,
    threshold: f64,
    range: Option<(String, String)>,
    enrichment: Option<EnrichmentSettings>,
    json: bool,
) -> Result<()> {
    let mut pages = load_pages(input)?;
    if let Some(settings) = enrichment {
        pages = enrich_pages(&pages, &settings).await?;
    }

    let analysis = TimeBasedAnalysis::from_pages(&pages, strategy);
    let stats = analysis.performance_stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Time-based analysis ({} strategy)", analysis.strategy());
        println!("  Pages analyzed:  {}", stats.total_pages);
        println!("  Outperformers:   {}", stats.outperformers);
        println!("  Underperformers: {}", stats.underperformers);
        println!("  Average index:   {:.4}", stats.average_index);
        println!("  Median index:    {:.4}", stats.median_index);

        println!(
            "  At threshold {}: {} above, {} below",
            threshold,
            analysis.outperformers(threshold).len(),
            analysis.underperformers(threshold).len()
        );
    }

    if let Some((from, to)) = range {
        let slice = analysis.by_date_range(&from, &to);
        println!();
        println!("{} pages published {} to {}:", slice.len(), from, to);
        for item in slice {
            println!(
                "  {}  {:>8.4}  {}",
                item.publish_date, item.time_based_index, item.url
            );
        }
    }

    if let Some(path) = output {
        write_csv_file(path, &analysis.to_csv())
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

async fn run_enrich(input: &Path, output: &Path, settings: EnrichmentSettings) -> Result<()> {
    let pages = load_pages(input)?;
    let enriched = enrich_pages(&pages, &settings).await?;

    let dated = enriched.iter().filter(|p| p.has_publish_date()).count();
    println!("{} of {} pages now have a publish date", dated, enriched.len());

    write_csv_file(output, &pages_to_csv(&enriched))
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

async fn enrich_pages(pages: &[PageRecord], settings: &EnrichmentSettings) -> Result<Vec<PageRecord>> {
    let mut cache = match &settings.cache_file {
        Some(path) => load_cache(path)
            .with_context(|| format!("Failed to load date cache {}", path.display()))?,
        None => Default::default(),
    };

    let enricher = PublishDateEnricher::new(Arc::new(SimulatedDateLookup::new()))
        .with_delay(settings.delay);

    let enriched = enricher
        .enrich(pages, Some(&mut cache), |progress| {
            info!("Publish dates: {}", progress.display_string());
        })
        .await;

    if let Some(path) = &settings.cache_file {
        save_cache(&cache, path)
            .with_context(|| format!("Failed to save date cache {}", path.display()))?;
    }

    Ok(enriched)
}
