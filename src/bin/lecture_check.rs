use clap::Parser;
use resume_screener::core::layout::{scan_workshop, LayoutReport};
use resume_screener::utils::logger;

#[derive(Parser)]
#[command(name = "lecture-check")]
#[command(about = "Verify the lecture_N/ layout of a workshop checkout")]
struct Args {
    /// Workshop root containing lecture_N directories
    #[arg(short, long, default_value = ".")]
    root: String,

    /// Lecture numbers that must be present
    #[arg(long, value_delimiter = ',')]
    expect: Vec<u32>,

    /// Treat warnings (missing slide sources) as failures
    #[arg(long)]
    strict: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn print_report(report: &LayoutReport) {
    println!("📚 Workshop: {}", report.root.display());
    for lecture in &report.lectures {
        let mark = if lecture.is_complete() { "✅" } else { "❌" };
        println!(
            "{} lecture_{} ({} notebooks, {} slide sources)",
            mark,
            lecture.number,
            lecture.notebook_count,
            lecture.slide_sources.len()
        );
        for entry in &lecture.missing {
            println!("    missing: {}", entry);
        }
        for target in &lecture.missing_targets {
            println!("    Makefile lacks target: {}", target);
        }
        for warning in &lecture.warnings {
            println!("    ⚠️ {}", warning);
        }
    }
    for number in &report.missing_lectures {
        println!("❌ lecture_{} not found", number);
    }
    if report.lectures.is_empty() {
        println!("❌ No lecture_N directories found");
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let mut report = scan_workshop(&args.root)?;
    report.expect_lectures(&args.expect);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.is_complete(args.strict) {
        std::process::exit(1);
    }
    Ok(())
}
