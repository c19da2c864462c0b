use std::path::PathBuf;

use anyhow::Context;
use bunk_advisor::advisor::{advise_group, advise_slot, validate_target};
use bunk_advisor::attendance::{overall_summary, project_skip, reconstruct_by_group};
use bunk_advisor::config::Config;
use bunk_advisor::models::{AttendanceStatus, Standing, SuggestionType};
use bunk_advisor::report::{build_report, subject_rows};
use bunk_advisor::schedule::schedule_for;
use bunk_advisor::store::{self, HolidayOutcome};
use chrono::{Local, NaiveDate};
use clap::{ArgGroup, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bunk-advisor")]
#[command(about = "Tells you when skipping a class is safe", long_about = None)]
struct Cli {
    /// Snapshot JSON holding subjects, attendance records and holidays
    #[arg(long, global = true, env = "BUNK_ADVISOR_DATA")]
    data: Option<PathBuf>,
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Treat this date as today
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,
    /// Emit debug logs on stderr
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a demo timetable with two weeks of marks
    Seed,
    /// Import attendance records from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Attendance per subject, lowest first
    Status {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Suggest whether bunking is safe
    #[command(group(
        ArgGroup::new("scope")
            .args(["subject", "slot"])
            .multiple(false)
    ))]
    Advise {
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        slot: Option<String>,
        #[arg(long)]
        target: Option<f64>,
    },
    /// Show how skipping classes would move a subject's percentage
    Plan {
        #[arg(long)]
        subject: String,
        #[arg(long, default_value_t = 1)]
        skips: u32,
    },
    /// List the classes for a day
    Schedule {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Mark a class present or absent; repeating a mark clears it
    Mark {
        #[arg(long)]
        slot: String,
        #[arg(long, value_enum)]
        status: AttendanceStatus,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Declare a holiday; repeating it on the same date lifts the holiday
    Holiday {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "attendance-report.md")]
        out: PathBuf,
        #[arg(long)]
        target: Option<f64>,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_target(flag: Option<f64>, config: &Config) -> anyhow::Result<f64> {
    let target = flag.unwrap_or(config.target_percentage);
    Ok(validate_target(target)?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = Config::load(cli.config.as_deref())?;
    let data_path = config.resolve_data_path(cli.data.as_deref())?;
    let today = cli.as_of.unwrap_or_else(|| Local::now().date_naive());
    info!(data = %data_path.display(), %today, "starting");

    match cli.command {
        Commands::Seed => {
            let snapshot = store::seed_snapshot(today);
            store::save_snapshot(&data_path, &snapshot)?;
            println!("Seed data written to {}.", data_path.display());
        }
        Commands::Import { csv } => {
            let mut snapshot = store::load_snapshot(&data_path)?;
            let inserted = store::import_records_csv(&mut snapshot, &csv)?;
            store::save_snapshot(&data_path, &snapshot)?;
            println!("Inserted {inserted} records from {}.", csv.display());
        }
        Commands::Status { limit } => {
            let snapshot = store::load_snapshot(&data_path)?;
            let mut rows = subject_rows(&snapshot, today);

            if rows.is_empty() {
                println!("No subjects in the timetable.");
                return Ok(());
            }

            rows.sort_by(|a, b| {
                a.summary
                    .percentage
                    .partial_cmp(&b.summary.percentage)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let overall = overall_summary(
                &snapshot.subjects,
                &snapshot.attendance_records,
                &snapshot.holidays,
                today,
            );

            println!(
                "Overall {:.1}% (attended {} of {})",
                overall.percentage, overall.attended, overall.total
            );
            for row in rows.iter().take(limit) {
                println!(
                    "- {} {:.1}% ({} of {}, {} bunked) [{}]",
                    row.name,
                    row.summary.percentage,
                    row.summary.attended,
                    row.summary.total,
                    row.summary.bunked,
                    Standing::from_percentage(row.summary.percentage).label()
                );
            }
        }
        Commands::Advise {
            subject,
            slot,
            target,
        } => {
            let snapshot = store::load_snapshot(&data_path)?;
            let target = resolve_target(target, &config)?;

            let advice = match (subject, slot) {
                (Some(name), _) => vec![(
                    name.clone(),
                    advise_group(
                        &name,
                        &snapshot.subjects,
                        &snapshot.attendance_records,
                        target,
                        &snapshot.holidays,
                        today,
                    ),
                )],
                (None, Some(id)) => {
                    let label = snapshot
                        .slot(&id)
                        .map(|slot| slot.name.trim().to_string())
                        .with_context(|| format!("no class slot with id {id}"))?;
                    vec![(
                        label,
                        advise_slot(
                            &id,
                            &snapshot.subjects,
                            &snapshot.attendance_records,
                            target,
                            &snapshot.holidays,
                            today,
                        ),
                    )]
                }
                (None, None) => subject_rows(&snapshot, today)
                    .into_iter()
                    .map(|row| {
                        let advice = advise_group(
                            &row.name,
                            &snapshot.subjects,
                            &snapshot.attendance_records,
                            target,
                            &snapshot.holidays,
                            today,
                        );
                        (row.name, advice)
                    })
                    .collect(),
            };

            if advice.is_empty() {
                println!("No subjects in the timetable.");
            }
            for (name, suggestion) in advice {
                let marker = match suggestion.suggestion_type {
                    SuggestionType::Safe => "safe",
                    SuggestionType::Danger => "danger",
                    SuggestionType::Neutral => "-",
                };
                println!(
                    "{} [{}] {:.1}% ({} of {}): {}",
                    name,
                    marker,
                    suggestion.percentage,
                    suggestion.attended,
                    suggestion.total,
                    suggestion.suggestion
                );
            }
        }
        Commands::Plan { subject, skips } => {
            let snapshot = store::load_snapshot(&data_path)?;
            let summary = reconstruct_by_group(
                &subject,
                &snapshot.subjects,
                &snapshot.attendance_records,
                &snapshot.holidays,
                today,
            );
            let projection = project_skip(&summary, skips);
            println!(
                "If you skip {skips} more of {subject}, attendance drops from {}% to {}%.",
                projection.original, projection.projected
            );
        }
        Commands::Schedule { date } => {
            let snapshot = store::load_snapshot(&data_path)?;
            let date = date.unwrap_or(today);
            let schedule = schedule_for(
                &snapshot.subjects,
                &snapshot.attendance_records,
                &snapshot.holidays,
                date,
            );

            if schedule.is_holiday {
                println!(
                    "{} is a holiday. No classes are counted.",
                    date.format("%A %-d %B")
                );
                return Ok(());
            }
            if schedule.classes.is_empty() {
                println!("No subjects scheduled for {}.", date.format("%A"));
                return Ok(());
            }

            println!("Schedule for {}:", date.format("%-d %B"));
            for class in schedule.classes {
                let mark = match class.status {
                    Some(AttendanceStatus::Present) => "attended",
                    Some(AttendanceStatus::Absent) => "bunked",
                    None => "unmarked",
                };
                println!(
                    "- {}-{} {} ({}) [{}]",
                    class.slot.start_time,
                    class.slot.end_time,
                    class.slot.name,
                    class.slot.id,
                    mark
                );
            }
        }
        Commands::Mark { slot, status, date } => {
            let mut snapshot = store::load_snapshot(&data_path)?;
            if snapshot.slot(&slot).is_none() {
                anyhow::bail!("no class slot with id {slot}");
            }
            let date = date.unwrap_or(today);
            if snapshot.is_holiday(date) {
                anyhow::bail!("{date} is a holiday; lift it with `holiday --date {date}` first");
            }
            let outcome = snapshot.toggle_mark(&slot, date, status);
            store::save_snapshot(&data_path, &snapshot)?;
            println!("{}.", outcome.describe());
        }
        Commands::Holiday { date, reason } => {
            let mut snapshot = store::load_snapshot(&data_path)?;
            let outcome = snapshot.toggle_holiday(date, reason);
            store::save_snapshot(&data_path, &snapshot)?;
            match outcome {
                HolidayOutcome::Added => println!("{date} has been marked as a holiday."),
                HolidayOutcome::Removed => println!("{date} is no longer a holiday."),
            }
        }
        Commands::Report { out, target } => {
            let snapshot = store::load_snapshot(&data_path)?;
            let target = resolve_target(target, &config)?;
            let report = build_report(&snapshot, target, today);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
