//! Reduces measurements to bounded `[0, 100]` scores.

use std::collections::BTreeMap;

use crate::models::{
    BaselineReport, CampaignKind, Classification, LoadAssessment, PhaseKind, PhaseResult,
    SecurityAssessment,
};

pub const RATE_LIMIT_POINTS: u8 = 15;
pub const BRUTE_FORCE_RATE_LIMIT_BONUS: i32 = 5;

pub struct ScoreAggregator;

impl ScoreAggregator {
    pub fn rate_limit_points(working: bool) -> u8 {
        if working { RATE_LIMIT_POINTS } else { 0 }
    }

    /// Up to 20 for success rate (percent) plus up to 10 for average latency.
    pub fn concurrency_points(success_rate: f64, avg_latency_ms: u64) -> u8 {
        let rate_points = if success_rate >= 95.0 {
            20
        } else if success_rate >= 90.0 {
            15
        } else if success_rate >= 80.0 {
            10
        } else if success_rate >= 70.0 {
            5
        } else {
            0
        };

        let latency_points = match avg_latency_ms {
            0..500 => 10,
            500..1000 => 7,
            1000..2000 => 5,
            2000..5000 => 2,
            _ => 0,
        };

        rate_points + latency_points
    }

    pub fn throughput_points(requests_per_second: f64) -> u8 {
        if requests_per_second >= 50.0 {
            10
        } else if requests_per_second >= 30.0 {
            7
        } else if requests_per_second >= 20.0 {
            5
        } else if requests_per_second >= 10.0 {
            3
        } else {
            0
        }
    }

    /// `loss_rate` is a percentage.
    pub fn packet_loss_points(loss_rate: f64) -> u8 {
        if loss_rate <= 1.0 {
            20
        } else if loss_rate <= 3.0 {
            15
        } else if loss_rate <= 5.0 {
            10
        } else if loss_rate <= 10.0 {
            5
        } else {
            0
        }
    }

    pub fn load_score(assessment: &LoadAssessment) -> u8 {
        let total = u32::from(Self::rate_limit_points(assessment.public_rate_limit.working))
            + u32::from(Self::rate_limit_points(
                assessment.authenticated_rate_limit.working,
            ))
            + u32::from(Self::concurrency_points(
                assessment.concurrency.success_rate,
                assessment.concurrency.avg_latency_ms,
            ))
            + u32::from(Self::throughput_points(
                assessment.throughput.requests_per_second,
            ))
            + u32::from(Self::packet_loss_points(assessment.packet_loss.loss_rate));

        total.min(100) as u8
    }

    pub fn campaign_deduction(kind: CampaignKind) -> i32 {
        match kind {
            CampaignKind::SqlInjection => 20,
            CampaignKind::Xss => 15,
            CampaignKind::PathTraversal => 15,
            CampaignKind::BruteForce => 25,
            CampaignKind::JwtBypass => 20,
            CampaignKind::HeaderInjection => 10,
            CampaignKind::AuthenticatedRoutes => 15,
        }
    }

    /// Starts at 100, deducts once per vulnerable campaign, adds a bonus when
    /// brute force ran into rate limiting.
    pub fn security_score(assessment: &SecurityAssessment) -> u8 {
        let mut score: i32 = 100;

        for campaign in &assessment.campaigns {
            if campaign.is_vulnerable() {
                score -= Self::campaign_deduction(campaign.kind);
            }
        }

        if assessment
            .get(CampaignKind::BruteForce)
            .is_some_and(|c| c.rate_limited > 0)
        {
            score += BRUTE_FORCE_RATE_LIMIT_BONUS;
        }

        score.clamp(0, 100) as u8
    }

    pub fn baseline_score(report: &BaselineReport) -> u8 {
        let mut score = 0;
        if report.connectivity {
            score += 50;
        }
        if report.auth_protection {
            score += 50;
        }
        score
    }

    /// Rounded mean of the phases that completed; 0 when none did.
    pub fn composite(phase_results: &BTreeMap<PhaseKind, PhaseResult>) -> u8 {
        if phase_results.is_empty() {
            return 0;
        }
        let total: u32 = phase_results.values().map(|r| u32::from(r.score)).sum();
        let mean = (total as f64 / phase_results.len() as f64).round();
        mean.clamp(0.0, 100.0) as u8
    }

    pub fn classify(score: u8) -> Classification {
        Classification::from_score(score)
    }

    /// Five sub-assessments; any that fell short of full marks is flagged.
    pub fn load_phase(assessment: &LoadAssessment) -> PhaseResult {
        let concurrency = Self::concurrency_points(
            assessment.concurrency.success_rate,
            assessment.concurrency.avg_latency_ms,
        );
        let throughput = Self::throughput_points(assessment.throughput.requests_per_second);
        let packet_loss = Self::packet_loss_points(assessment.packet_loss.loss_rate);

        let shortfalls = [
            (
                !assessment.public_rate_limit.working,
                "public rate limiting not enforced".to_string(),
            ),
            (
                !assessment.authenticated_rate_limit.working,
                "authenticated users do not get a higher allowance".to_string(),
            ),
            (
                concurrency < 30,
                format!(
                    "concurrency: {:.1}% success, {}ms average",
                    assessment.concurrency.success_rate, assessment.concurrency.avg_latency_ms
                ),
            ),
            (
                throughput < 10,
                format!(
                    "throughput: {:.1} req/s",
                    assessment.throughput.requests_per_second
                ),
            ),
            (
                packet_loss < 20,
                format!("packet loss: {:.1}%", assessment.packet_loss.loss_rate),
            ),
        ];

        let notes: Vec<String> = shortfalls
            .iter()
            .filter(|(short, _)| *short)
            .map(|(_, note)| note.clone())
            .collect();

        PhaseResult::new(shortfalls.len(), notes.len(), Self::load_score(assessment))
            .with_notes(notes)
    }

    pub fn security_phase(assessment: &SecurityAssessment) -> PhaseResult {
        let notes = assessment
            .campaigns
            .iter()
            .flat_map(|c| c.notes.iter().map(move |note| format!("{}: {}", c.kind, note)))
            .collect();

        PhaseResult::new(
            assessment.total_tested(),
            assessment.total_flagged(),
            Self::security_score(assessment),
        )
        .with_details(assessment.findings())
        .with_notes(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CampaignResult;

    fn campaign(kind: CampaignKind, flagged: usize, rate_limited: usize) -> CampaignResult {
        let mut result = CampaignResult::new(kind);
        result.tested = 10;
        result.flagged = flagged;
        result.rate_limited = rate_limited;
        result
    }

    #[test]
    fn test_concurrency_buckets() {
        assert_eq!(ScoreAggregator::concurrency_points(100.0, 20), 30);
        assert_eq!(ScoreAggregator::concurrency_points(92.0, 700), 22);
        assert_eq!(ScoreAggregator::concurrency_points(80.0, 1500), 15);
        assert_eq!(ScoreAggregator::concurrency_points(70.0, 4999), 7);
        assert_eq!(ScoreAggregator::concurrency_points(50.0, 5000), 0);
    }

    #[test]
    fn test_throughput_and_packet_loss_buckets() {
        assert_eq!(ScoreAggregator::throughput_points(50.0), 10);
        assert_eq!(ScoreAggregator::throughput_points(29.9), 5);
        assert_eq!(ScoreAggregator::throughput_points(9.0), 0);
        assert_eq!(ScoreAggregator::packet_loss_points(0.0), 20);
        assert_eq!(ScoreAggregator::packet_loss_points(3.0), 15);
        assert_eq!(ScoreAggregator::packet_loss_points(7.5), 5);
        assert_eq!(ScoreAggregator::packet_loss_points(50.0), 0);
    }

    #[test]
    fn test_clean_security_run_is_perfect() {
        let assessment = SecurityAssessment {
            campaigns: CampaignKind::ALL.iter().map(|k| campaign(*k, 0, 0)).collect(),
        };
        assert_eq!(ScoreAggregator::security_score(&assessment), 100);
    }

    #[test]
    fn test_deductions_apply_once_per_campaign() {
        let assessment = SecurityAssessment {
            campaigns: vec![
                campaign(CampaignKind::SqlInjection, 7, 0),
                campaign(CampaignKind::Xss, 1, 0),
                campaign(CampaignKind::BruteForce, 0, 2),
            ],
        };
        assert_eq!(ScoreAggregator::security_score(&assessment), 100 - 20 - 15 + 5);
    }

    #[test]
    fn test_security_score_never_negative() {
        let assessment = SecurityAssessment {
            campaigns: CampaignKind::ALL.iter().map(|k| campaign(*k, 3, 0)).collect(),
        };
        assert_eq!(ScoreAggregator::security_score(&assessment), 0);
    }

    #[test]
    fn test_security_phase_totals_across_campaigns() {
        let mut sqli = campaign(CampaignKind::SqlInjection, 0, 0);
        sqli.notes.push("unexpected status 404 for x".into());
        let assessment = SecurityAssessment {
            campaigns: vec![sqli, campaign(CampaignKind::JwtBypass, 2, 0)],
        };
        let result = ScoreAggregator::security_phase(&assessment);
        assert_eq!(result.tested, 20);
        assert_eq!(result.flagged, 2);
        assert_eq!(result.score, 80);
        assert_eq!(result.notes, vec!["SQL Injection: unexpected status 404 for x"]);
    }

    #[test]
    fn test_composite_excludes_missing_phases() {
        let mut phases = BTreeMap::new();
        assert_eq!(ScoreAggregator::composite(&phases), 0);

        phases.insert(PhaseKind::Authentication, PhaseResult::new(5, 0, 100));
        phases.insert(PhaseKind::Security, PhaseResult::new(10, 2, 65));
        assert_eq!(ScoreAggregator::composite(&phases), 83);
    }

    #[test]
    fn test_composite_bounded_for_any_scores() {
        for a in (0..=100).step_by(7) {
            for b in (0..=100).step_by(13) {
                let mut phases = BTreeMap::new();
                phases.insert(PhaseKind::Load, PhaseResult::new(5, 0, a));
                phases.insert(PhaseKind::Security, PhaseResult::new(5, 0, b));
                let score = ScoreAggregator::composite(&phases);
                assert!(score <= 100);
                assert!(score >= a.min(b) && score <= a.max(b));
            }
        }
    }
}
