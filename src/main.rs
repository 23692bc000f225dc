use clap::Parser;
use std::time::Duration;
use storefront_shipping::config::require_api_key;
use storefront_shipping::core::ConfigProvider;
use storefront_shipping::utils::{logger, validation::Validate};
use storefront_shipping::{
    CliConfig, DistanceMatrixClient, LocalTableStore, RefreshConfig, RefreshEngine, RefreshPlan,
    ShippingError,
};

type Engine = RefreshEngine<DistanceMatrixClient, LocalTableStore>;

fn exit_with(e: &ShippingError) -> ! {
    tracing::error!(
        "❌ Refresh failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    // anything that reaches here aborted the run
    std::process::exit(e.exit_code().max(1));
}

fn load_config(cli: &CliConfig) -> Result<RefreshConfig, ShippingError> {
    let config = cli.resolve()?;
    config.validate()?;
    Ok(config)
}

/// Fails only when the credential is absent or the client cannot be built.
fn build_engine<C: ConfigProvider>(
    config: &C,
    default_distance_km: u32,
) -> Result<Engine, ShippingError> {
    let api_key = require_api_key(config)?;
    let client = DistanceMatrixClient::new(config.endpoint(), api_key)?;
    let store = LocalTableStore::new(config.table_path());

    Ok(RefreshEngine::new(client, store, config.origin())
        .with_request_delay(Duration::from_millis(config.request_delay_ms()))
        .with_default_distance(default_distance_km))
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();
    logger::init_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting update-distances");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    if cli.verbose {
        tracing::debug!(
            "Refresh config: origin={}, endpoint={}, table={}, delay={}ms",
            config.origin,
            config.endpoint,
            config.table_path,
            config.request_delay_ms
        );
    }

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no requests will be sent");
        let store = LocalTableStore::new(config.table_path());
        let plan = match RefreshPlan::load(&store, config.cities()).await {
            Ok(plan) => plan,
            Err(e) => exit_with(&e),
        };
        println!("📍 Origin: {}", config.origin);
        println!("📁 Table: {}", config.table_path);
        println!("🏙 {} cities would be refreshed:", plan.targets.len());
        for city in &plan.targets {
            match plan.previous_km(city) {
                Some(km) => println!("  {:<20} {} km", city, km),
                None => println!("  {:<20} (new)", city),
            }
        }
        return;
    }

    let engine = match build_engine(&config, config.fees.default_distance_km) {
        Ok(engine) => engine,
        Err(e) => exit_with(&e),
    };

    match engine.run(config.cities()).await {
        Ok(report) => {
            let degraded = report.degraded();
            println!(
                "✅ {} updated with {} cities ({} refreshed, {} kept)",
                config.table_path,
                report.table.cities.len(),
                report.updated_count(),
                degraded.len()
            );
            if !degraded.is_empty() {
                println!("⚠ Kept previous distances for: {}", degraded.join(", "));
            }
        }
        Err(e) => exit_with(&e),
    }
}
