//! Fairway CLI binary.
//!
//! Provides a command-line interface for salary-fairness audits. Logs go to
//! stderr; stdout carries only the audit output.

use clap::{Parser, Subcommand};
use fairway::{AuditConfig, AuditRun, Auditor};
use fairway_data::{ColumnMapping, RecordSet};
use fairway_metrics::{GroupProfile, MetricKind, UndefinedRatePolicy, metrics_by_kind};
use fairway_output::{ExportFormat, Exporter, format_value};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const THIN_RULE: &str = "──────────────────────────────────────────────────────────────";

#[derive(Parser)]
#[command(name = "fairway")]
#[command(about = "Fairway: salary-fairness audit for HR datasets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a CSV file for gender bias in salary
    Audit {
        /// CSV file with a header row
        csv: PathBuf,

        /// Salary column
        #[arg(long, env = "FAIRWAY_SALARY")]
        salary: String,

        /// Gender column (exactly two distinct values)
        #[arg(long, env = "FAIRWAY_GENDER")]
        gender: String,

        /// Performance score column
        #[arg(long, env = "FAIRWAY_PERFORMANCE")]
        performance: String,

        /// Absences column
        #[arg(long, env = "FAIRWAY_ABSENCES")]
        absences: String,

        /// JSON config file
        #[arg(long, env = "FAIRWAY_CONFIG")]
        config: Option<PathBuf>,

        /// Name of the derived label column
        #[arg(long, env = "FAIRWAY_LABEL_COLUMN")]
        label_column: Option<String>,

        /// Disparity above which bias is reported as significant
        #[arg(long, env = "FAIRWAY_BIAS_THRESHOLD")]
        bias_threshold: Option<f64>,

        /// Fail instead of reporting undefined rates
        #[arg(long)]
        strict: bool,

        /// Write the markdown report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Export the report to this file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Export format (csv, json or pretty-json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
    },

    /// List the columns of a CSV file and preview its first rows
    Columns {
        /// CSV file with a header row
        csv: PathBuf,

        /// Number of preview rows
        #[arg(long, default_value = "5")]
        rows: usize,
    },

    /// List the metrics an audit reports
    Metrics,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Audit {
            csv,
            salary,
            gender,
            performance,
            absences,
            config,
            label_column,
            bias_threshold,
            strict,
            report,
            export,
            format,
        } => {
            let mut audit_config = match config {
                Some(path) => AuditConfig::from_json_file(&path)?,
                None => AuditConfig::default(),
            };
            if let Some(label_column) = label_column {
                audit_config.label_column = label_column;
            }
            if let Some(threshold) = bias_threshold {
                audit_config.bias_threshold = threshold;
            }
            if strict {
                audit_config.undefined_rates = UndefinedRatePolicy::Reject;
            }

            let columns = ColumnMapping::new(salary, gender, performance, absences);
            let run = Auditor::new(audit_config)?.run_csv(&csv, &columns)?;
            print_audit(&run);

            if let Some(path) = report {
                run.report.write_markdown(&path)?;
                info!(path = %path.display(), "Markdown report written");
            }
            if let Some(path) = export {
                run.report.export_to_file(&path, format)?;
                info!(path = %path.display(), format = format.extension(), "Report exported");
            }
        }
        Commands::Columns { csv, rows } => {
            list_columns(&RecordSet::from_csv_path(&csv)?, rows);
        }
        Commands::Metrics => list_metrics(),
    }

    Ok(())
}

fn print_header(title: &str) {
    println!("{RULE}");
    println!("{title}");
    println!("{RULE}\n");
}

fn print_audit(run: &AuditRun) {
    let report = &run.report;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", "FAIRNESS AUDIT");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Dataset:             {}", report.dataset);
    println!("Records:             {}", report.records);
    println!("Sensitive column:    {}", report.columns.gender);
    println!(
        "High salary cut-off: {:.2} (median of {})\n",
        report.label_threshold, report.columns.salary
    );

    print_header("RATES BY GROUP");
    println!(
        "{:<16} {:>6} {:>15} {:>10} {:>10}",
        "Group", "Rows", "Selection Rate", "TPR", "FPR"
    );
    println!("{THIN_RULE}");
    for group in report.group_metrics.groups() {
        println!(
            "{:<16} {:>6} {:>15} {:>10} {:>10}",
            group.category.as_str(),
            group.counts.rows,
            format_value(group.selection_rate),
            format_value(group.true_positive_rate),
            format_value(group.false_positive_rate)
        );
    }
    println!();

    print_header("DISPARITIES");
    println!(
        "Demographic Parity Difference: {}",
        format_value(report.disparities.demographic_parity_difference)
    );
    println!(
        "Equalized Odds Difference:     {}",
        format_value(report.disparities.equalized_odds_difference)
    );
    for undefined in &report.disparities.undefined_rates {
        println!(
            "  note: {} undefined for {} (empty denominator)",
            undefined.metric, undefined.category
        );
    }
    println!();

    print_header("GROUP PROFILES");
    for profile in &run.profiles {
        print_profile(profile);
    }

    print_header("ASSESSMENT");
    println!("{}", report.assessment);
}

fn print_profile(profile: &GroupProfile) {
    println!("{} ({} rows)", profile.category, profile.rows);
    println!("  Average salary: {:.2}", profile.mean_salary);

    println!("  Performance scores:");
    for (score, count) in &profile.performance_counts {
        println!("    {score:<20} {count:>6}");
    }

    match &profile.absences {
        Some(summary) => println!(
            "  Absences: min {:.1}  q1 {:.1}  median {:.1}  q3 {:.1}  max {:.1}",
            summary.min, summary.q1, summary.median, summary.q3, summary.max
        ),
        None => println!("  Absences: no values"),
    }
    println!();
}

fn list_columns(records: &RecordSet, rows: usize) {
    print_header("COLUMNS");
    for name in records.column_names() {
        println!("  {name}");
    }
    println!("\n{} rows\n", records.height());

    print_header("DATA PREVIEW");
    println!("{}", records.preview(rows));
}

fn list_metrics() {
    for (title, kind) in [
        ("GROUP RATES", MetricKind::GroupRate),
        ("DISPARITIES", MetricKind::Disparity),
    ] {
        print_header(title);
        for metric in metrics_by_kind(kind) {
            println!("{}", metric.name);
            println!("  {}", metric.description);
            println!("  {}\n", metric.formula);
        }
    }
}
