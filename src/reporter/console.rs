use colored::Colorize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::matrix::{PhaseMatrix, campaign_entries, recommendations, verdict_label};
use crate::models::{Classification, FinalReport, LoadAssessment, SecurityAssessment, Severity};

pub struct ConsoleReporter;

#[derive(Tabled)]
struct PhaseRow {
    #[tabled(rename = "Phase")]
    phase: String,
    #[tabled(rename = "Tested")]
    tested: usize,
    #[tabled(rename = "Flagged")]
    flagged: usize,
    #[tabled(rename = "Score")]
    score: String,
}

#[derive(Tabled)]
struct CampaignRow {
    #[tabled(rename = "Campaign")]
    campaign: String,
    #[tabled(rename = "Tested")]
    tested: usize,
    #[tabled(rename = "Flagged")]
    flagged: usize,
    #[tabled(rename = "429s")]
    rate_limited: usize,
    #[tabled(rename = "Verdict")]
    verdict: String,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_report(&self, report: &FinalReport) {
        self.print_phase_table(report);
        if let Some(load) = &report.load {
            self.print_load_details(load);
        }
        if let Some(security) = &report.security {
            self.print_campaigns(security);
            self.print_findings(security);
        }
        self.print_recommendations(report);
        self.print_summary(report);
    }

    pub fn print_phase_table(&self, report: &FinalReport) {
        let matrix = PhaseMatrix::from_report(report);
        if matrix.entries().is_empty() {
            return;
        }

        let rows: Vec<PhaseRow> = matrix
            .entries()
            .iter()
            .map(|entry| PhaseRow {
                phase: entry.phase.to_string(),
                tested: entry.tested,
                flagged: entry.flagged,
                score: Self::colored_score(entry.score, entry.classification),
            })
            .collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();

        println!("\n{}", table);
    }

    pub fn print_load_details(&self, load: &LoadAssessment) {
        println!("\n{}", "Load / Stress".bold().underline());

        for report in [&load.public_rate_limit, &load.authenticated_rate_limit] {
            let status = if report.working {
                "ENFORCED".green()
            } else {
                "NOT ENFORCED".red()
            };
            println!(
                "  Rate limit ({}): {} - {}/{} blocked ({:.1}%)",
                report.scope,
                status,
                report.blocked,
                report.total_requests,
                report.block_rate()
            );
        }

        let c = &load.concurrency;
        println!(
            "  Concurrency: {}/{} ok ({:.1}%), latency avg {}ms min {}ms max {}ms",
            c.successful, c.total_requests, c.success_rate, c.avg_latency_ms, c.min_latency_ms, c.max_latency_ms
        );

        let t = &load.throughput;
        println!(
            "  Throughput: {:.1} req/s ({} of {} in {:.2}s)",
            t.requests_per_second,
            t.successful,
            t.total_requests,
            t.total_duration_ms as f64 / 1000.0
        );

        let p = &load.packet_loss;
        let loss = format!("{:.1}%", p.loss_rate);
        println!(
            "  Packet loss: {} ({} timeouts, {} network errors, {} server errors)",
            if p.within_threshold { loss.green() } else { loss.red() },
            p.timeouts,
            p.network_errors,
            p.server_errors
        );

        for (endpoint, profile) in &load.response_times {
            println!(
                "  {}: avg {}ms, median {}ms, min {}ms, max {}ms",
                endpoint.cyan(),
                profile.avg_ms,
                profile.median_ms,
                profile.min_ms,
                profile.max_ms
            );
        }
    }

    pub fn print_campaigns(&self, security: &SecurityAssessment) {
        let rows: Vec<CampaignRow> = campaign_entries(security)
            .into_iter()
            .map(|entry| CampaignRow {
                campaign: entry.kind.to_string(),
                tested: entry.tested,
                flagged: entry.flagged,
                rate_limited: entry.rate_limited,
                verdict: if entry.vulnerable {
                    verdict_label(true).red().bold().to_string()
                } else {
                    verdict_label(false).green().to_string()
                },
            })
            .collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();

        println!("\n{}", table);
    }

    pub fn print_findings(&self, security: &SecurityAssessment) {
        let findings = security.findings();
        if findings.is_empty() {
            println!("\n{}", "No vulnerabilities flagged.".green());
            return;
        }

        println!("\n{}", "Findings".bold().underline());

        for finding in &findings {
            println!(
                "\n[{}] {} - {}",
                Self::colored_severity(finding.severity),
                finding.endpoint.white().bold(),
                finding.category
            );
            println!("  Payload: {}", finding.payload_excerpt.cyan());
            match finding.status {
                Some(status) => println!("  Evidence: {} (status {})", finding.evidence_kind, status),
                None => println!("  Evidence: {}", finding.evidence_kind),
            }
        }

        for campaign in &security.campaigns {
            for note in &campaign.notes {
                println!("  {} {}: {}", "note".dimmed(), campaign.kind, note);
            }
        }
    }

    pub fn print_recommendations(&self, report: &FinalReport) {
        let advice = recommendations(report);
        if advice.is_empty() {
            return;
        }

        println!("\n{}", "Recommendations".bold().underline());
        for line in advice {
            println!("  → {}", line);
        }
    }

    pub fn print_summary(&self, report: &FinalReport) {
        println!("\n{}", "Summary".bold().underline());
        println!(
            "{} in {:.2}s",
            report.target,
            report.duration_ms() as f64 / 1000.0
        );

        if let Some(error) = &report.error {
            println!("  {}: {}", "Stopped early".red().bold(), error);
        }

        println!(
            "  Score: {} ({})",
            Self::colored_score(report.composite_score, report.classification),
            report.classification
        );
        println!();
    }

    fn colored_score(score: u8, classification: Classification) -> String {
        let text = format!("{}/100", score);
        match classification {
            Classification::Excellent | Classification::Good => text.green().to_string(),
            Classification::Average => text.yellow().to_string(),
            Classification::Poor => text.red().to_string(),
            Classification::Critical => text.red().bold().to_string(),
        }
    }

    fn colored_severity(severity: Severity) -> String {
        match severity {
            Severity::Critical => "CRITICAL".red().bold().to_string(),
            Severity::High => "HIGH".red().to_string(),
            Severity::Medium => "MEDIUM".yellow().to_string(),
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}
