use anyhow::{Context, Result};
use clap::Parser;
use court_slots::{
    export, export_to_path, live_aggregator, offline_aggregator, AvailabilityReport, DateRange,
    FacilityConfig, Period, SlotDuration,
};
use court_slots::schedule::format_date;
use std::path::PathBuf;

/// Bookable court slots from the booking widget's occupancy grid
#[derive(Parser, Debug)]
#[command(name = "court-slots", version, about)]
struct Cli {
    /// Named period: today, tomorrow, week, 2weeks
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    period: Option<Period>,

    /// First date, DD-MM-YYYY (defaults to today)
    #[arg(long)]
    from: Option<String>,

    /// Last date, DD-MM-YYYY
    #[arg(long)]
    to: Option<String>,

    /// Slot durations in minutes, e.g. -d 60 -d 90 or -d 60,90
    #[arg(short, long = "duration", value_delimiter = ',', default_value = "60", allow_negative_numbers = true)]
    durations: Vec<i64>,

    /// Facility config (TOML); built-in defaults otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read saved DD-MM-YYYY.html pages from this directory instead of fetching
    #[arg(long)]
    from_dir: Option<PathBuf>,

    /// Write the slot table to a .csv or .json file
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print the per-(date, court) slot count summary as CSV
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = FacilityConfig::load_or_default(cli.config.as_deref())?;

    // Request validation happens before anything touches the network
    let today = chrono::Local::now().date_naive();
    let range = match cli.period {
        Some(period) => period.range(today),
        None => DateRange::parse(cli.from.as_deref(), cli.to.as_deref(), today)?,
    };
    SlotDuration::parse_set(&cli.durations)?;

    let aggregator = match &cli.from_dir {
        Some(dir) => offline_aggregator(&config, dir)?,
        None => live_aggregator(&config)?,
    };

    println!(
        "🎾 Checking {} day(s): {} → {}",
        range.dates().len(),
        format_date(range.start()),
        format_date(range.end())
    );
    let report = aggregator.run(&range, &cli.durations)?;

    print_report(&report);

    if cli.summary {
        export::write_summary_csv(std::io::stdout().lock(), &report)?;
    }

    if let Some(path) = &cli.out {
        export_to_path(&report, path).with_context(|| format!("Failed to export to {}", path.display()))?;
        println!("💾 Wrote {}", path.display());
    }

    if !report.is_complete() {
        std::process::exit(2);
    }
    Ok(())
}

fn print_report(report: &AvailabilityReport) {
    for duration in &report.durations {
        println!("\n📋 Grouped by {}:", duration);
        let mut any = false;
        for slot in report.slots_for(*duration) {
            any = true;
            println!(
                "  {} to {} - court {} - {}",
                slot.start.format("%H:%M"),
                slot.end.format("%H:%M"),
                slot.court,
                format_date(slot.date)
            );
        }
        if !any {
            println!("  (no free slots)");
        }
    }

    for date in &report.empty_dates {
        println!("ℹ️  {}: no schedule data", format_date(*date));
    }
    for (date, err) in &report.failures {
        eprintln!("❌ {}: {}", format_date(*date), err);
    }
    println!("\n✓ {} slot(s) across {} day(s)", report.slots.len(), report.dates.len());
}
