use clap::Parser;
use odp_recommender::config::toml_config::TomlConfig;
use odp_recommender::core::{ConfigProvider, Storage};
use odp_recommender::utils::logger::{self, LogFormat};
use odp_recommender::utils::validation::Validate;
use odp_recommender::{LocalStorage, RecommendationEngine, RecommendationPipeline};

#[derive(Parser)]
#[command(name = "toml-recommender")]
#[command(about = "ODP recommendation with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "odp-recommender.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override matching radius (meters) from config
    #[arg(long)]
    max_distance: Option<f64>,

    /// Check inputs and column bindings without matching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌；命令列 --verbose 優先於設定檔
    let level = if args.verbose {
        "debug"
    } else {
        config.log_level().unwrap_or("info")
    };
    let format = if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger_with_level(level, format);

    tracing::info!("🚀 Starting TOML-based ODP recommender");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(max_distance) = args.max_distance {
        config.matching.max_distance_meters = Some(max_distance);
        tracing::info!("🔧 Max distance overridden to: {} m", max_distance);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No matching will occur");
        let pipeline = RecommendationPipeline::new(LocalStorage::default(), config);
        return perform_dry_run(&pipeline).await;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = RecommendationPipeline::new(LocalStorage::default(), config);
    let engine = RecommendationEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Recommendation run completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Recommendation run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            Err(anyhow::anyhow!(e.user_friendly_message()))
        }
    }
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let matching = config.match_config();

    println!("📋 Configuration Summary:");
    println!("  Job: {}", config.job.name);
    if let Some(description) = &config.job.description {
        println!("  Description: {}", description);
    }
    println!("  ODP file: {}", config.odp_file());
    println!("  Customer file: {}", config.customer_file());
    println!("  Max distance: {} m", matching.max_distance_meters);
    println!(
        "  Min available: {} ({} policy)",
        matching.min_available, matching.capacity_policy
    );
    println!("  Group filter: {}", matching.group_filter_enabled);
    println!(
        "  Output: {}/{} [{}]",
        config.output_path(),
        config.archive_name(),
        config.output_formats().join(", ")
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run<S: Storage, C: ConfigProvider>(
    pipeline: &RecommendationPipeline<S, C>,
) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");

    let report = pipeline
        .inspect()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_friendly_message()))?;
    let catalog = &report.catalog;

    println!();
    println!("📡 ODP Catalog:");
    println!("  Rows: {}", report.odp_table.len());
    println!("  Usable candidates: {}", catalog.nodes.len());
    for rejected in catalog.rejected.iter().take(10) {
        println!("  ⚠️ Row {}: {}", rejected.row, rejected.reason);
    }
    if catalog.rejected.len() > 10 {
        println!("  ... and {} more", catalog.rejected.len() - 10);
    }

    println!();
    println!("👥 Customers:");
    println!("  Rows: {}", report.customers.len());
    println!("  Without usable coordinates: {}", report.invalid_customers());
    println!("  Distance evaluations: {}", report.distance_evaluations());

    println!();
    println!("✅ Dry run analysis complete.");
    Ok(())
}
