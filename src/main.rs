use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use apiprobe::cli::{Cli, Commands, TargetArgs};
use apiprobe::models::FinalReport;
use apiprobe::reporter::{ConsoleReporter, HtmlExporter, JsonExporter};
use apiprobe::scanner::{Orchestrator, RunMode};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.command.verbose() {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::builder().with_default_directive(level.into()).from_env_lossy())
        .with_target(false)
        .init();

    match run(cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<bool> {
    if let Some((mode, target)) = command.run_mode() {
        return assess(mode, target).await;
    }

    match command {
        Commands::Config { target } => {
            let mut config = target.resolve()?;
            config.identity.password = "********".to_string();
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(true)
        }
        Commands::Report {
            input,
            format,
            output,
        } => {
            let report = JsonExporter::load(&input)?;
            match format.as_str() {
                "html" => {
                    let path = output.unwrap_or_else(|| "report.html".to_string());
                    HtmlExporter::export(&report, &path)?;
                    println!("{} {}", "HTML report saved to".green(), path);
                }
                "json" => {
                    let path = output.unwrap_or_else(|| "report.json".to_string());
                    JsonExporter::export(&report, &path)?;
                    println!("{} {}", "JSON report saved to".green(), path);
                }
                "console" => ConsoleReporter::new().print_report(&report),
                other => bail!("unknown report format '{}' (expected html, json or console)", other),
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}

async fn assess(mode: RunMode, target: &TargetArgs) -> Result<bool> {
    let config = target.resolve()?;

    println!(
        "\n{} {} against {}",
        "apiprobe".cyan().bold(),
        mode.to_string().bold(),
        config.base_url.yellow()
    );

    let mut orchestrator = Orchestrator::new(config, target.verbose)?;
    let report = orchestrator.run(mode).await?;

    ConsoleReporter::new().print_report(&report);

    if let Some(path) = &target.output {
        save(&report, path)?;
    }

    Ok(report.success)
}

fn save(report: &FinalReport, path: &str) -> Result<()> {
    if path.ends_with(".html") || path.ends_with(".htm") {
        HtmlExporter::export(report, path)?;
    } else {
        JsonExporter::export(report, path)?;
    }
    println!("{} {}", "Report saved to".green(), path);
    Ok(())
}
