use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use num_format::{Locale, ToFormattedString};
use prosperity_rs::{AppConfig, DatasetLoader, stats, storage};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "prosperity",
    version,
    about = "Load World Bank GDP per capita data and summarize global prosperity"
)]
struct Cli {
    #[command(flatten)]
    load: LoadArgs,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct LoadArgs {
    /// Path to a JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Skip the API and read the local CSV only.
    #[arg(long, global = true, default_value_t = false)]
    local_only: bool,
    /// Local CSV used when the API is unavailable.
    #[arg(long, global = true)]
    fallback: Option<PathBuf>,
    /// Year range for the API request (YYYY:YYYY).
    #[arg(short = 'd', long, global = true)]
    date: Option<String>,
    /// Enable debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Global statistics and the trend of the yearly average.
    Summary,
    /// Global average GDP per capita for each year.
    Yearly,
    /// One region compared with the world average.
    Region {
        #[arg(short, long)]
        name: String,
    },
    /// Richest and poorest region of every year.
    Gap,
    /// List all country names in the loaded table.
    Regions,
    /// Save the cleaned table (format inferred by --format or extension).
    Export {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, value_enum)]
        format: Option<OutFormat>,
    },
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

fn fmt_usd(v: f64) -> String {
    if !v.is_finite() {
        return "NA".to_string();
    }
    let whole = v.round() as i64;
    format!("${}", whole.to_formatted_string(&Locale::en))
}

fn parse_range(s: &str) -> Option<(i32, i32)> {
    let (a, b) = s.split_once(':')?;
    let start = a.trim().parse::<i32>().ok()?;
    let end = b.trim().parse::<i32>().ok()?;
    (start <= end).then_some((start, end))
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.load.verbose);

    let mut cfg = AppConfig::load(cli.load.config.as_deref())?;
    if let Some(path) = cli.load.fallback.clone() {
        cfg.fallback_path = path;
    }
    if let Some(d) = &cli.load.date {
        let (start, end) =
            parse_range(d).ok_or_else(|| anyhow::anyhow!("invalid --date, expected YYYY:YYYY"))?;
        cfg.remote.start_year = start;
        cfg.remote.end_year = end;
    }

    let loader = DatasetLoader::from_config(&cfg);
    let data = loader
        .load(!cli.load.local_only)
        .context("no data available")?;
    eprintln!(
        "Loaded {} country rows from {} source ({} aggregates excluded, {} rows dropped)",
        data.len(),
        data.source,
        data.excluded_aggregates,
        data.dropped_rows
    );
    let obs = &data.observations;

    match cli.cmd {
        Command::Summary => {
            let Some(g) = stats::global_stats(obs) else {
                println!("No data to analyze.");
                return Ok(());
            };
            println!("Countries: {}", stats::region_names(obs).len());
            println!("Global mean GDP per capita: {}", fmt_usd(g.mean));
            println!("Global std dev GDP per capita: {}", fmt_usd(g.std_dev));
            let t = stats::trend_summary(obs)?;
            println!("Average in {}: {}", t.first_year, fmt_usd(t.first_value));
            println!("Average in {}: {}", t.last_year, fmt_usd(t.last_value));
            println!("Growth since {}: {:.1}%", t.first_year, t.growth_pct);
            println!("Top 5 regions in {}:", g.latest_year);
            for (name, v) in stats::top_regions(obs, g.latest_year, 5) {
                println!(" - {name}: {}", fmt_usd(v));
            }
        }
        Command::Yearly => {
            for p in stats::yearly_average(obs) {
                println!("{}\t{}", p.year, fmt_usd(p.value));
            }
        }
        Command::Region { name } => {
            if !obs.iter().any(|o| o.region_name == name) {
                anyhow::bail!("no country named {name:?} in the loaded data");
            }
            println!("year\t{name}\tworld");
            for p in stats::region_vs_world(obs, &name) {
                let region = p.region.map(fmt_usd).unwrap_or_else(|| "NA".into());
                println!("{}\t{}\t{}", p.year, region, fmt_usd(p.world));
            }
        }
        Command::Gap => {
            println!("year\trichest\tpoorest\tgap");
            for g in stats::rich_poor_gap(obs) {
                println!(
                    "{}\t{} ({})\t{} ({})\t{}",
                    g.year,
                    g.richest_region,
                    fmt_usd(g.richest_value),
                    g.poorest_region,
                    fmt_usd(g.poorest_value),
                    fmt_usd(g.gap)
                );
            }
        }
        Command::Regions => {
            for name in stats::region_names(obs) {
                println!("{name}");
            }
        }
        Command::Export { out, format } => {
            let fmt = match format {
                Some(OutFormat::Csv) => "csv",
                Some(OutFormat::Json) => "json",
                None => out.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
            }
            .to_ascii_lowercase();
            match fmt.as_str() {
                "csv" => storage::save_csv(obs, &out)?,
                "json" => storage::save_json(obs, &out)?,
                other => anyhow::bail!("unsupported format: {}", other),
            }
            eprintln!("Saved {} rows to {}", obs.len(), out.display());
        }
    }

    Ok(())
}
