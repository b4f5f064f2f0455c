use anyhow::{Context, Result};
use std::fs;
use tera::{Context as TeraContext, Tera};

use super::matrix::{PhaseMatrix, campaign_entries, recommendations, verdict_label};
use crate::models::{Classification, FinalReport, Severity};

pub struct JsonExporter;

impl JsonExporter {
    pub fn export(report: &FinalReport, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json).with_context(|| format!("Failed to write to {}", path))?;
        Ok(())
    }

    pub fn load(path: &str) -> Result<FinalReport> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;

        serde_json::from_str(&content).with_context(|| format!("{} is not a saved report", path))
    }
}

pub struct HtmlExporter;

impl HtmlExporter {
    pub fn export(report: &FinalReport, path: &str) -> Result<()> {
        let html = Self::render(report)?;
        fs::write(path, html).with_context(|| format!("Failed to write to {}", path))?;
        Ok(())
    }

    pub fn render(report: &FinalReport) -> Result<String> {
        let mut tera = Tera::default();
        tera.add_raw_template("report.html", Self::get_template())?;

        let mut context = TeraContext::new();
        context.insert("target", &report.target);
        context.insert(
            "scan_time",
            &report.finished_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        context.insert("duration_s", &format!("{:.2}", report.duration_ms() as f64 / 1000.0));
        context.insert("score", &report.composite_score);
        context.insert("classification", &report.classification.to_string());
        context.insert("score_class", Self::score_class(report.classification));
        context.insert("error", &report.error);

        let phases: Vec<PhaseRow> = PhaseMatrix::from_report(report)
            .entries()
            .iter()
            .map(|e| PhaseRow {
                phase: e.phase.to_string(),
                tested: e.tested,
                flagged: e.flagged,
                score: e.score,
                score_class: Self::score_class(e.classification).to_string(),
            })
            .collect();
        context.insert("phases", &phases);

        let campaigns: Vec<CampaignRow> = report
            .security
            .as_ref()
            .map(|security| {
                campaign_entries(security)
                    .into_iter()
                    .map(|e| CampaignRow {
                        campaign: e.kind.to_string(),
                        tested: e.tested,
                        flagged: e.flagged,
                        verdict: verdict_label(e.vulnerable).to_string(),
                        verdict_class: if e.vulnerable { "critical" } else { "ok" }.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        context.insert("campaigns", &campaigns);

        let findings: Vec<FindingRow> = report
            .security
            .as_ref()
            .map(|security| {
                security
                    .findings()
                    .iter()
                    .map(|f| FindingRow {
                        severity: f.severity.to_string(),
                        severity_class: Self::severity_class(f.severity).to_string(),
                        endpoint: f.endpoint.clone(),
                        category: f.category.to_string(),
                        payload: f.payload_excerpt.clone(),
                        evidence: f.evidence_kind.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        context.insert("findings", &findings);
        context.insert("recommendations", &recommendations(report));

        Ok(tera.render("report.html", &context)?)
    }

    fn score_class(classification: Classification) -> &'static str {
        match classification {
            Classification::Excellent | Classification::Good => "ok",
            Classification::Average => "medium",
            Classification::Poor => "high",
            Classification::Critical => "critical",
        }
    }

    fn severity_class(severity: Severity) -> &'static str {
        match severity {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
        }
    }

    fn get_template() -> &'static str {
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>apiprobe report</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #0d1117; color: #c9d1d9; line-height: 1.6; }
        .container { max-width: 1100px; margin: 0 auto; padding: 2rem; }
        h1 { color: #58a6ff; margin-bottom: 0.5rem; }
        h2 { color: #c9d1d9; margin: 2rem 0 1rem; font-size: 1.2rem; }
        .subtitle { color: #8b949e; margin-bottom: 2rem; }
        .score { background: #161b22; border: 1px solid #30363d; border-radius: 6px; padding: 1.5rem; text-align: center; margin-bottom: 1rem; }
        .score-value { font-size: 3rem; font-weight: bold; }
        .score.ok .score-value { color: #3fb950; }
        .score.medium .score-value { color: #d29922; }
        .score.high .score-value, .score.critical .score-value { color: #f85149; }
        .error { background: #f8514922; border: 1px solid #f85149; border-radius: 6px; padding: 1rem; margin-bottom: 1rem; }
        table { width: 100%; border-collapse: collapse; background: #161b22; border: 1px solid #30363d; border-radius: 6px; overflow: hidden; }
        th, td { padding: 0.75rem 1rem; text-align: left; border-bottom: 1px solid #30363d; }
        th { background: #21262d; font-weight: 600; }
        tr:hover { background: #21262d; }
        .badge { padding: 0.25rem 0.5rem; border-radius: 4px; font-size: 0.75rem; font-weight: 600; }
        .badge.critical, .badge.high { background: #f8514933; color: #f85149; }
        .badge.medium { background: #d2992233; color: #d29922; }
        .badge.ok { background: #3fb95033; color: #3fb950; }
        code { color: #f0883e; }
        ul { padding-left: 1.5rem; }
    </style>
</head>
<body>
    <div class="container">
        <h1>apiprobe report</h1>
        <p class="subtitle">{{ target }} &middot; {{ scan_time }} &middot; {{ duration_s }}s</p>

        <div class="score {{ score_class }}">
            <div class="score-value">{{ score }}/100</div>
            <div>{{ classification }}</div>
        </div>

        {% if error %}
        <div class="error">Run stopped early: {{ error }}</div>
        {% endif %}

        <h2>Phases</h2>
        <table>
            <thead><tr><th>Phase</th><th>Tested</th><th>Flagged</th><th>Score</th></tr></thead>
            <tbody>
                {% for row in phases %}
                <tr>
                    <td>{{ row.phase }}</td>
                    <td>{{ row.tested }}</td>
                    <td>{{ row.flagged }}</td>
                    <td><span class="badge {{ row.score_class }}">{{ row.score }}</span></td>
                </tr>
                {% endfor %}
            </tbody>
        </table>

        {% if campaigns %}
        <h2>Security campaigns</h2>
        <table>
            <thead><tr><th>Campaign</th><th>Tested</th><th>Flagged</th><th>Verdict</th></tr></thead>
            <tbody>
                {% for row in campaigns %}
                <tr>
                    <td>{{ row.campaign }}</td>
                    <td>{{ row.tested }}</td>
                    <td>{{ row.flagged }}</td>
                    <td><span class="badge {{ row.verdict_class }}">{{ row.verdict }}</span></td>
                </tr>
                {% endfor %}
            </tbody>
        </table>
        {% endif %}

        {% if findings %}
        <h2>Findings</h2>
        <table>
            <thead><tr><th>Severity</th><th>Endpoint</th><th>Category</th><th>Payload</th><th>Evidence</th></tr></thead>
            <tbody>
                {% for f in findings %}
                <tr>
                    <td><span class="badge {{ f.severity_class }}">{{ f.severity }}</span></td>
                    <td>{{ f.endpoint }}</td>
                    <td>{{ f.category }}</td>
                    <td><code>{{ f.payload }}</code></td>
                    <td>{{ f.evidence }}</td>
                </tr>
                {% endfor %}
            </tbody>
        </table>
        {% endif %}

        {% if recommendations %}
        <h2>Recommendations</h2>
        <ul>
            {% for r in recommendations %}<li>{{ r }}</li>{% endfor %}
        </ul>
        {% endif %}
    </div>
</body>
</html>"#
    }
}

#[derive(serde::Serialize)]
struct PhaseRow {
    phase: String,
    tested: usize,
    flagged: usize,
    score: u8,
    score_class: String,
}

#[derive(serde::Serialize)]
struct CampaignRow {
    campaign: String,
    tested: usize,
    flagged: usize,
    verdict: String,
    verdict_class: String,
}

#[derive(serde::Serialize)]
struct FindingRow {
    severity: String,
    severity_class: String,
    endpoint: String,
    category: String,
    payload: String,
    evidence: String,
}
