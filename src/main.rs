use clap::Parser;
use resume_screener::core::ConfigProvider;
use resume_screener::utils::{logger, validation::Validate};
use resume_screener::{
    BatchEngine, CliConfig, LocalStorage, OpenRouterClient, ScreenerError, ScreeningPipeline,
};

fn exit_with(e: &ScreenerError) -> ! {
    tracing::error!(
        "❌ Screening failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init(config.verbose, config.log_json);
    tracing::info!("Starting resume-screener");

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let settings = config.llm_settings();
    tracing::info!("🧠 Model: {} via {}", settings.model, settings.endpoint);

    let client = OpenRouterClient::new(settings)?;
    let storage = LocalStorage::new(config.output_path().to_string());
    let monitor_enabled = config.monitor;
    let pipeline = ScreeningPipeline::new(storage, config, client);
    let engine = BatchEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(location) => {
            tracing::info!("✅ Screening completed");
            println!("✅ Screening completed");
            println!("📁 Results saved to: {}", location);
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}
