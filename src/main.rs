/// Command line entry point for the OurSky SDA client
use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use oursky_sda::services::write_result;
use oursky_sda::{
    ObservationService, OrbitType, PipelineReport, PipelineRequest, SdaClient, SdaConfig,
    SdaError, SdaResult, SearchPattern, SequenceResults, TrackingType,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Look up satellites, forecast observation windows and task observations
/// through the OurSky SDA API.
///
/// Requires `OURSKY_API_TOKEN` in the environment or a `.env` file.
/// Longest forecast or history span accepted on the command line
const MAX_HOURS: i64 = 24 * MAX_DAYS;
const MAX_DAYS: i64 = 366;

#[derive(Debug, Parser)]
#[command(name = "oursky-sda", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find a target, list its upcoming windows, optionally task it, then show results.
    /// This is the default when no command is given.
    Pipeline(PipelineArgs),

    /// List upcoming observation windows of a target, earliest first.
    Potentials {
        #[arg(long)]
        target_id: String,
        #[arg(long, default_value_t = 48, value_parser = clap::value_parser!(i64).range(1..=MAX_HOURS))]
        hours: i64,
    },

    /// Fetch recent observation sequence results for a NORAD id.
    Osrs {
        #[arg(long)]
        norad_id: String,
        /// Only results created within this many days.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(i64).range(1..=MAX_DAYS))]
        since_days: i64,
        /// Write each result as JSON into this directory instead of printing it.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// List tracking data messages.
    Tdms {
        /// Only messages after this RFC 3339 timestamp.
        #[arg(long)]
        after: Option<DateTime<Utc>>,
    },

    /// Plan and submit search instructions for every upcoming window of a target.
    Search {
        #[arg(long)]
        target_id: String,
        #[arg(long, value_enum)]
        pattern: SearchPattern,
        #[arg(long, value_enum, default_value_t = Tracking::TargetRate)]
        tracking: Tracking,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(i64).range(1..=MAX_DAYS))]
        days: i64,
        /// Print the plan without submitting it.
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Args)]
struct PipelineArgs {
    #[arg(long, default_value = "25544")]
    norad_id: String,
    #[arg(long, default_value = "LEO")]
    orbit_type: OrbitType,
    /// Forecast horizon.
    #[arg(long, default_value_t = 48, value_parser = clap::value_parser!(i64).range(1..=MAX_HOURS))]
    hours: i64,
    /// Create an organization target (an observation task) for the satellite.
    #[arg(long)]
    submit: bool,
    /// Exit with an error when the target has no observation sequence results yet.
    #[arg(long)]
    require_results: bool,
}

impl Default for PipelineArgs {
    fn default() -> Self {
        Self {
            norad_id: "25544".to_string(),
            orbit_type: OrbitType::Leo,
            hours: 48,
            submit: false,
            require_results: false,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Tracking {
    Sidereal,
    TargetRate,
}

impl From<Tracking> for TrackingType {
    fn from(t: Tracking) -> Self {
        match t {
            Tracking::Sidereal => TrackingType::Sidereal,
            Tracking::TargetRate => TrackingType::TargetRate,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; stdout is reserved for the report
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();

    let config = SdaConfig::from_env()?;
    info!("Configuration loaded ({})", config.base_url);

    let service = ObservationService::new(SdaClient::new(&config)?);

    match cli.command.unwrap_or(Command::Pipeline(PipelineArgs::default())) {
        Command::Pipeline(args) => {
            let request = PipelineRequest {
                norad_id: args.norad_id,
                orbit_type: Some(args.orbit_type),
                until: shift(Utc::now(), TimeDelta::try_hours(args.hours))?,
                submit: args.submit,
                require_results: args.require_results,
            };
            let report = service.run_pipeline(&request).await?;
            print_report(&report)?;
        }
        Command::Potentials { target_id, hours } => {
            let until = shift(Utc::now(), TimeDelta::try_hours(hours))?;
            let windows = service.require_upcoming_windows(&target_id, until).await?;
            for window in windows {
                println!("first observable time: {}", window.first_observable_time);
                println!("last observable time: {}", window.last_observable_time);
                println!();
            }
        }
        Command::Osrs {
            norad_id,
            since_days,
            out_dir,
        } => {
            let target = service.find_target(&norad_id, None).await?;
            println!("Fetching OSRs for ({})", norad_id);

            let from = shift(Utc::now(), TimeDelta::try_days(since_days).map(|d| -d))?;
            let results = service.fetch_results_since(&target.id, from).await?;
            println!("Fetched {} total OSRs for ({})", results.len(), norad_id);

            for result in &results {
                match &out_dir {
                    Some(dir) => {
                        let path = write_result(dir, &norad_id, result)?;
                        println!("wrote {}", path.display());
                    }
                    None => println!("{}", serde_json::to_string_pretty(result)?),
                }
            }
        }
        Command::Tdms { after } => {
            let tdms = service.client().list_tdms(after).await?;
            println!("{}", serde_json::to_string_pretty(&tdms)?);
        }
        Command::Search {
            target_id,
            pattern,
            tracking,
            days,
            dry_run,
        } => {
            let now = Utc::now();
            let until = shift(now, TimeDelta::try_days(days))?;
            let instructions = service
                .plan_search(&target_id, pattern, tracking.into(), until, now)
                .await?;

            for instruction in &instructions {
                if let (Some(first), Some(last)) =
                    (instruction.steps.first(), instruction.steps.last())
                {
                    println!(
                        "{} search with {} steps: {} to {}",
                        pattern,
                        instruction.steps.len(),
                        first.start_time,
                        last.end_time
                    );
                }
            }

            if dry_run {
                println!("Dry run: {} search instructions not submitted", instructions.len());
            } else {
                let submitted = service
                    .submit_search(&instructions)
                    .await
                    .context("failed to schedule search instructions")?;
                println!("Scheduled {} search instructions for {}", submitted, target_id);
            }
        }
    }

    Ok(())
}

/// `at` moved by `delta`, rejecting spans chrono cannot represent
fn shift(at: DateTime<Utc>, delta: Option<TimeDelta>) -> SdaResult<DateTime<Utc>> {
    delta
        .and_then(|d| at.checked_add_signed(d))
        .ok_or_else(|| SdaError::InvalidInput("time span out of range".to_string()))
}

fn print_report(report: &PipelineReport) -> anyhow::Result<()> {
    println!("==================== Target ====================");
    println!("{}", serde_json::to_string_pretty(&report.target)?);

    println!("==================== Upcoming Passes ====================");
    for window in &report.windows {
        println!(
            "{} -> {} ({} s)",
            window.first_observable_time,
            window.last_observable_time,
            window.duration().num_seconds()
        );
    }

    if let Some(task) = &report.task {
        println!("==================== Task Request ====================");
        println!("{}", serde_json::to_string_pretty(task)?);
    }

    println!("==================== Observation Sequence ====================");
    match &report.results {
        SequenceResults::Pending => {
            println!(
                "No observation sequence results yet for target {}; check back after the task completes.",
                report.target.id
            );
        }
        SequenceResults::Ready(results) => {
            for result in results {
                println!("{}", serde_json::to_string_pretty(result)?);
            }
            for entry in &report.nodes {
                println!("node {}:", entry.image_set.node_id);
                println!("{}", serde_json::to_string_pretty(&entry.node)?);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_horizon_flags_are_bounded() {
        for bad in ["0", "-5", "9223372036854775807"] {
            let potentials = ["oursky-sda", "potentials", "--target-id", "x", "--hours", bad];
            assert!(Cli::try_parse_from(potentials).is_err(), "--hours {} accepted", bad);

            let osrs = ["oursky-sda", "osrs", "--norad-id", "1", "--since-days", bad];
            assert!(Cli::try_parse_from(osrs).is_err(), "--since-days {} accepted", bad);

            let search = [
                "oursky-sda",
                "search",
                "--target-id",
                "x",
                "--pattern",
                "onestep",
                "--days",
                bad,
            ];
            assert!(Cli::try_parse_from(search).is_err(), "--days {} accepted", bad);
        }

        let cli =
            Cli::try_parse_from(["oursky-sda", "pipeline", "--hours", "72", "--require-results"])
                .unwrap();
        match cli.command {
            Some(Command::Pipeline(args)) => {
                assert_eq!(args.hours, 72);
                assert!(args.require_results);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_shift_rejects_unrepresentable_spans() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            shift(now, TimeDelta::try_hours(MAX_HOURS)).unwrap(),
            now + TimeDelta::days(MAX_DAYS)
        );
        assert!(matches!(
            shift(now, TimeDelta::try_hours(i64::MAX)),
            Err(SdaError::InvalidInput(_))
        ));
        assert!(matches!(
            shift(now, TimeDelta::try_days(i64::MAX / 100_000)),
            Err(SdaError::InvalidInput(_))
        ));
    }
}
