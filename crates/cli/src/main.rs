// ABOUTME: CLI binary for the gameday extraction engine.
// ABOUTME: Reads settings.json, builds an artifact request for one team, runs it, and prints the outcome report.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::Parser;
use gameday_engine::{
    ArtifactRequest, BoxScoreCount, DateRange, Engine, EngineError, RunReport, Settings,
};
use gameday_tables::parse_iso_date;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "gameday")]
#[command(about = "Save rosters, schedules, stats, box scores and articles for a team as PDFs")]
struct Args {
    /// Settings file describing teams and defaults
    #[arg(long = "settings", default_value = "settings.json")]
    settings: PathBuf,

    /// Team key from the settings file
    #[arg(long = "team")]
    team: String,

    /// Save the roster
    #[arg(long = "roster")]
    roster: bool,

    /// Save the schedule
    #[arg(long = "schedule")]
    schedule: bool,

    /// Save season stats for each YEAR
    #[arg(long = "stats", value_name = "YEAR", num_args = 1..)]
    stats: Vec<i32>,

    /// Save the N most recent box scores (default from settings)
    #[arg(
        long = "box-scores",
        value_name = "N",
        num_args = 0..=1,
        allow_negative_numbers = true
    )]
    box_scores: Option<Option<i64>>,

    /// Roster, schedule, and box scores
    #[arg(long = "all")]
    all: bool,

    /// Save articles published between START and END (YYYY-MM-DD, inclusive)
    #[arg(long = "articles", num_args = 2, value_names = ["START", "END"])]
    articles: Option<Vec<String>>,

    /// Output directory (overrides settings)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long = "json")]
    json_output: bool,
}

/// Initialize tracing from RUST_LOG (default `info`); GAMEDAY_LOG_FORMAT=json switches to JSON lines.
fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    match std::env::var("GAMEDAY_LOG_FORMAT").as_deref() {
        Ok("json") => {
            let _ = registry
                .with(fmt_layer.json().flatten_event(true))
                .try_init();
        }
        _ => {
            let _ = registry.with(fmt_layer.compact()).try_init();
        }
    }
}

fn box_score_count(
    explicit: Option<i64>,
    settings: &Settings,
) -> Result<BoxScoreCount, EngineError> {
    match explicit.or(settings.box_scores.count) {
        Some(n) => BoxScoreCount::new(n),
        None => Err(EngineError::invalid_request(
            "box-scores",
            "no count given and settings.box_scores.count is not set",
        )),
    }
}

fn date_range(bounds: &[String]) -> anyhow::Result<DateRange> {
    let [start, end] = bounds else {
        return Err(anyhow!("--articles takes a START and an END date"));
    };
    let start = parse_iso_date(start).map_err(EngineError::from)?;
    let end = parse_iso_date(end).map_err(EngineError::from)?;
    Ok(DateRange::new(start, end).map_err(EngineError::from)?)
}

fn build_request(args: &Args, settings: &Settings) -> anyhow::Result<ArtifactRequest> {
    let box_scores = match (args.box_scores, args.all) {
        (Some(explicit), _) => Some(box_score_count(explicit, settings)?),
        (None, true) => Some(box_score_count(None, settings)?),
        (None, false) => None,
    };
    let articles = args.articles.as_deref().map(date_range).transpose()?;

    let request = ArtifactRequest {
        roster: args.roster || args.all,
        schedule: args.schedule || args.all,
        stats_years: args.stats.clone(),
        box_scores,
        articles,
    };
    request.validate()?;
    Ok(request)
}

fn format_report(report: &RunReport, json_output: bool) -> anyhow::Result<String> {
    if json_output {
        let envelope = serde_json::json!({
            "team": report.team,
            "ok": report.is_success(),
            "outcomes": report.summaries(),
        });
        return Ok(serde_json::to_string_pretty(&envelope)?);
    }

    let lines: Vec<String> = report
        .outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(path) => format!("saved   {}: {}", o.name, path.display()),
            Err(e) => format!("failed  {}: {}", o.name, e.reason()),
        })
        .collect();
    Ok(lines.join("\n"))
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let text = std::fs::read_to_string(&args.settings)
        .with_context(|| format!("reading {}", args.settings.display()))?;
    let settings = Settings::from_json(&text)?;
    let team = settings.team(&args.team)?;
    let request = build_request(&args, &settings)?;
    debug!(settings = %args.settings.display(), team = %team.name, ?request, "request built");

    let mut builder = Engine::builder().settings(&settings);
    if let Some(dir) = &args.output {
        builder = builder.output_dir(dir.display().to_string());
    }
    let engine = builder.build()?;

    let report = engine.run(team, &request).await?;
    println!("{}", format_report(&report, args.json_output)?);
    Ok(report.is_success())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
