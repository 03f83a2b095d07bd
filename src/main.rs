use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use jmae_case::{
    CaseLoader, CaseLoaderConfig, CaseOutcome, CaseScanResult, CaseStatus, CaseSummary, ScanConfig,
    scan_cases,
};

/// Inspect and scan JMAE vulnerability-assessment cases
#[derive(Parser, Debug)]
#[command(name = "jmae-case", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load one case from its output file and print a summary
    Inspect {
        /// Path to the .out file
        out_file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Decode the companion files one after another
        #[arg(long)]
        sequential: bool,

        /// Don't load the detail trace
        #[arg(long)]
        skip_detail: bool,

        /// Fail when the matrix and kill definition disagree on the kill id
        #[arg(long)]
        strict: bool,
    },
    /// Load every case under a directory
    Scan {
        dir: PathBuf,

        /// Cases loaded at once (defaults to the number of CPUs)
        #[arg(long)]
        threads: Option<usize>,

        /// Only look at the top level of the directory
        #[arg(long)]
        no_recursive: bool,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Inspect {
            out_file,
            json,
            sequential,
            skip_detail,
            strict,
        } => {
            let loader = CaseLoader::with_config(CaseLoaderConfig {
                parallel: !sequential,
                load_detail: !skip_detail,
                strict_kill_check: strict,
            });
            // decoding is blocking file I/O
            let outcome = tokio::task::spawn_blocking(move || loader.load(&out_file)).await??;
            match outcome {
                CaseOutcome::Complete(model) => {
                    let summary = model.summary();
                    if json {
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                    } else {
                        print_summary(&summary);
                    }
                }
                CaseOutcome::Incomplete(metadata) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&metadata)?);
                    } else {
                        println!("Run is incomplete: no RUN COMPLETE marker in the output file");
                    }
                }
            }
        }
        Command::Scan {
            dir,
            threads,
            no_recursive,
            json,
        } => {
            let mut config = ScanConfig {
                recursive: !no_recursive,
                ..ScanConfig::default()
            };
            if let Some(threads) = threads {
                config.threads = threads;
            }
            let results = scan_cases(&dir, &config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_scan(&results);
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &CaseSummary) {
    let show = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());

    println!("Terminal velocity:  {}", show(summary.terminal_velocity));
    println!("Burst height:       {}", show(summary.burst_height));
    println!("Angle of fall:      {}", show(summary.angle_of_fall));
    println!(
        "Attack azimuths:    {:?}{}",
        summary.attack_azimuths,
        if summary.azimuth_averaging { " (averaged)" } else { "" }
    );
    println!(
        "Kill:               {} ({})",
        summary.kill_description.as_deref().unwrap_or("-"),
        summary.kill_id.as_deref().unwrap_or("unresolved")
    );
    println!(
        "Components:         {} ({} direct hit, {} blast, {} fragmentation, {} invulnerable)",
        summary.component_count,
        summary.direct_hit_components,
        summary.blast_components,
        summary.fragmentation_components,
        summary.invulnerable_components
    );
    println!("AV table cells:     {}", summary.av_cells);
    println!("Surface quads:      {}", summary.surface_quads);
    if let Some(bounds) = &summary.surface_bounds {
        println!(
            "Surface bounds:     x [{}, {}], y [{}, {}], top {}",
            bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y, bounds.max_z
        );
    }
    match summary.matrix_cells {
        Some((range, deflection)) => println!(
            "Matrix:             {} x {} cells, max PK {}",
            range,
            deflection,
            show(summary.max_pk)
        ),
        None => println!("Matrix:             -"),
    }
    println!("Kill nodes:         {}", summary.kill_nodes);
    match (summary.burst_points, summary.burst_records) {
        (Some(points), Some(records)) => println!(
            "Detail trace:       {} burst points, {} records{}",
            points,
            records,
            if summary.remedial_points_skipped { ", remedial points skipped" } else { "" }
        ),
        _ => println!("Detail trace:       -"),
    }
}

fn print_scan(results: &[CaseScanResult]) {
    for result in results {
        let status = match &result.status {
            CaseStatus::Complete(summary) => format!(
                "complete, {} components, kill {}",
                summary.component_count,
                summary.kill_id.as_deref().unwrap_or("-")
            ),
            CaseStatus::Incomplete => "incomplete".to_string(),
            CaseStatus::Failed(message) => format!("failed: {}", message),
        };
        println!("{:<24} {}  {}", result.case_name, &result.hash[..result.hash.len().min(12)], status);
    }
    println!("{} cases", results.len());
}
