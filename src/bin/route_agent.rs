use clap::Parser;
use resume_screener::core::resumes::load_resumes;
use resume_screener::core::tools::describe_tools;
use resume_screener::core::{ConfigProvider, RoutingConfig};
use resume_screener::utils::logger;
use resume_screener::{
    BatchEngine, LocalStorage, OpenRouterClient, RoutingPipeline, ScreenerError, WorkshopConfig,
};

#[derive(Parser)]
#[command(name = "route-agent")]
#[command(about = "Run the application routing agent over a batch of resumes")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "workshop.toml")]
    config: String,

    /// Only route these candidate IDs (overrides dataset.resume_ids)
    #[arg(long, value_delimiter = ',')]
    ids: Vec<String>,

    /// Override agent.max_steps
    #[arg(long)]
    max_steps: Option<usize>,

    /// Override model from config
    #[arg(long)]
    model: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    #[arg(long)]
    log_json: bool,

    /// Show the selected candidates and tools without calling the LLM
    #[arg(long)]
    dry_run: bool,
}

fn fail(e: &ScreenerError) -> ! {
    tracing::error!(
        "❌ Routing failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.verbose, args.log_json);

    tracing::info!("📁 Loading configuration from: {}", args.config);
    let mut config = match WorkshopConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 命令列覆蓋設定
    if !args.ids.is_empty() {
        config.dataset.resume_ids = args.ids.clone();
    }
    if let Some(model) = &args.model {
        config.llm.model = model.clone();
    }
    if let (Some(steps), Some(agent)) = (args.max_steps, config.agent.as_mut()) {
        agent.max_steps = Some(steps);
    }

    if let Err(e) = config.validate_for_routing() {
        fail(&e);
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the LLM will not be called");
        if let Err(e) = perform_dry_run(&config) {
            fail(&e);
        }
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let client = OpenRouterClient::new(config.llm.clone())?;
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = RoutingPipeline::new(storage, config, client);
    let engine = BatchEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(location) => {
            println!("✅ Routing completed");
            println!("📁 Results saved to: {}", location);
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn display_config_summary(config: &WorkshopConfig) {
    println!("📋 Configuration Summary:");
    println!("  Model: {}", config.llm.model);
    println!("  Resumes: {}", config.resumes_path());
    println!("  Job requirements: {}", config.job_requirements_path());
    println!("  Output: {}", config.output_path());
    println!("  Max steps per candidate: {}", config.max_steps());
    if !config.resume_ids().is_empty() {
        println!("  Candidates: {}", config.resume_ids().join(", "));
    }
    if let Some(max) = config.max_resumes() {
        println!("  Max resumes: {}", max);
    }
    println!();
}

fn perform_dry_run(config: &WorkshopConfig) -> Result<(), ScreenerError> {
    let book = load_resumes(config.resumes_path())?;
    let selected = book.select(config.resume_ids(), config.max_resumes())?;

    println!("🔍 Dry Run Analysis:");
    println!("  Dataset size: {}", book.len());
    println!("  Would route {} candidates:", selected.len());
    for resume in &selected {
        println!(
            "    - {} ({} chars)",
            resume.id,
            resume.text.chars().count()
        );
    }

    println!();
    println!("🛠️ Available tools:");
    println!("{}", describe_tools());
    Ok(())
}
