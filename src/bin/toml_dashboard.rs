use anyhow::Context;
use clap::Parser;
use order_dashboard::config::toml_config::TomlConfig;
use order_dashboard::core::ConfigProvider;
use order_dashboard::utils::{logger, validation::Validate};
use order_dashboard::{aggregate, load, DashboardPipeline, EtlEngine, LoadOptions, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-dashboard")]
#[command(about = "Build sales dashboard tables from a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "dashboard.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Load and aggregate, print the tables, write nothing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    logger::init_logger(args.verbose, config.log_format());
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        return perform_dry_run(&config);
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let pipeline = DashboardPipeline::new(LocalStorage::new("."), config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(outcome) => {
            println!("✅ Dashboard tables built from {} orders", outcome.summary.order_count());
            println!("📁 Output saved to: {}", outcome.output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Dashboard build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Dashboard: {}", config.dashboard_name());
    tracing::info!("   Input: {}", config.input_path());
    tracing::info!("   Missing keys: {}", config.missing_keys());
    tracing::info!("   Output: {}", config.output_path());
    tracing::info!(
        "   Formats: {}",
        config
            .output_formats()
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let options = LoadOptions {
        missing_keys: config.missing_keys(),
    };
    let table = load(config.input_path(), &options)
        .with_context(|| format!("could not load orders from '{}'", config.input_path()))?;
    let summary = aggregate(&table).context("aggregation failed")?;

    println!("Loaded {} orders from {}", table.len(), table.origin);
    for t in summary.tables() {
        println!("  {:<16} {:>6} rows  [{}]", t.name, t.len(), t.columns().join(", "));
    }
    println!("  {:<16} {:>6} rows", "hour_to_clock", summary.hour_to_clock.len());
    Ok(())
}
