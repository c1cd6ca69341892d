use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use blackjack_bot::{CountReport, TableRules};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::simulator::{SimulationOutcome, SimulationSettings};

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything printed and persisted about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub run_id: String,
    /// Short rules line, e.g. `6 deck H17 DAS`.
    pub description: String,
    pub rules: TableRules,
    pub strategy: String,
    pub settings: SimulationSettings,
    pub workers: usize,
    pub elapsed_secs: f64,
    pub shoes: u64,
    pub rounds: u64,
    pub hands: u64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
    pub blackjacks: u64,
    pub insurance_saves: u64,
    pub ev: f64,
    pub wagered: f64,
    pub ev_per_round: f64,
    pub ev_per_hand: f64,
    pub ev_per_hour: f64,
    pub edge: f64,
    pub win_rate: f64,
    pub loss_rate: f64,
    pub push_rate: f64,
    pub sd_per_round: f64,
    pub sd_per_hour: f64,
    pub hours: u64,
    /// 95% confidence interval on EV per round.
    pub ci95: (f64, f64),
    /// Normal-approximation probability that the true EV per round is positive.
    pub probability_positive: f64,
    pub count: CountReport,
}

impl SimulationSummary {
    pub fn from_outcome(run_id: &str, outcome: &SimulationOutcome) -> Self {
        let result = &outcome.result;
        let settings = &outcome.settings;
        let ev_per_round = result.ev_per_round();
        let std_error = result.round_moments.std_error();
        let margin = CONFIDENCE_Z * std_error;
        let probability_positive = if std_error > 0.0 {
            Normal::new(0.0, 1.0)
                .map(|normal| normal.cdf(ev_per_round / std_error))
                .unwrap_or(0.5)
        } else if ev_per_round > 0.0 {
            1.0
        } else {
            0.0
        };

        Self {
            run_id: run_id.to_string(),
            description: describe(settings.decks, &outcome.rules),
            rules: outcome.rules,
            strategy: outcome.strategy.to_string(),
            settings: settings.clone(),
            workers: outcome.workers,
            elapsed_secs: outcome.elapsed.as_secs_f64(),
            shoes: result.shoes,
            rounds: result.rounds,
            hands: result.hands,
            wins: result.wins,
            losses: result.losses,
            pushes: result.pushes,
            blackjacks: result.blackjacks,
            insurance_saves: result.insurance_saves,
            ev: result.ev,
            wagered: result.wagered,
            ev_per_round,
            ev_per_hand: result.ev_per_hand(),
            ev_per_hour: ev_per_round * settings.rounds_per_hour as f64,
            edge: result.edge(),
            win_rate: result.win_rate(),
            loss_rate: result.loss_rate(),
            push_rate: result.push_rate(),
            sd_per_round: result.round_moments.std_dev(),
            sd_per_hour: result.hourly_moments.std_dev(),
            hours: result.hourly_moments.count,
            ci95: (ev_per_round - margin, ev_per_round + margin),
            probability_positive,
            count: result.count.clone(),
        }
    }

    /// Plain-text report for the terminal.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({}), strategy {}", self.description, self.rules, self.strategy);
        let _ = writeln!(
            out,
            "{} shoes, {} rounds, {} hands on {} workers in {:.2}s",
            self.shoes, self.rounds, self.hands, self.workers, self.elapsed_secs
        );
        let _ = writeln!(
            out,
            "EV {:+.2} units | {:+.4} per round | {:+.4} per hand | {:+.3} per hour | edge {:+.3}%",
            self.ev,
            self.ev_per_round,
            self.ev_per_hand,
            self.ev_per_hour,
            self.edge * 100.0
        );
        let _ = writeln!(
            out,
            "95% CI per round [{:+.4}, {:+.4}], P(EV > 0) {:.3}",
            self.ci95.0, self.ci95.1, self.probability_positive
        );
        let _ = writeln!(
            out,
            "W/L/P {:.2}% / {:.2}% / {:.2}% | blackjacks {} | insurance saves {}",
            self.win_rate * 100.0,
            self.loss_rate * 100.0,
            self.push_rate * 100.0,
            self.blackjacks,
            self.insurance_saves
        );
        let _ = writeln!(
            out,
            "1 SD {:.3} per round, {:.3} per hour ({} hours of {} rounds)",
            self.sd_per_round, self.sd_per_hour, self.hours, self.settings.rounds_per_hour
        );

        if self.count.bids > 0 {
            let _ = writeln!(
                out,
                "TC high {:.2} low {:.2} mean {:.3} over {} bids",
                self.count.high_true_count,
                self.count.low_true_count,
                self.count.mean_true_count(),
                self.count.bids
            );
            for (tc, bids) in &self.count.bids_by_true_count {
                let share = *bids as f64 / self.count.bids as f64 * 100.0;
                let _ = writeln!(out, "  TC {tc:>+3}: {bids:>10} ({share:6.2}%)");
            }
        }
        out
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        ensure_parent(path.as_ref())?;
        let body = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), body).map_err(|e| ReportError::Io {
            context: "writing summary json",
            source: e,
        })?;
        Ok(())
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        ensure_parent(path.as_ref())?;
        let mut rows = String::new();
        rows.push_str(&format!("# Simulation Summary: {}\n\n", self.run_id));
        rows.push_str(&format!(
            "{} ({}), strategy `{}`, {} shoes on {} workers\n\n",
            self.description, self.rules, self.strategy, self.shoes, self.workers
        ));
        rows.push_str("| Rounds | Hands | EV | EV/round | 95% CI | EV/hour | Win % | Loss % | Push % | SD/round | SD/hour |\n");
        rows.push_str("|--------|-------|----|----------|--------|---------|-------|--------|--------|----------|---------|\n");
        rows.push_str(&format!(
            "| {rounds} | {hands} | {ev:+.2} | {per_round:+.4} | [{lo:+.4}, {hi:+.4}] | {per_hour:+.3} | {win:.2}% | {loss:.2}% | {push:.2}% | {sd_round:.3} | {sd_hour:.3} |\n",
            rounds = self.rounds,
            hands = self.hands,
            ev = self.ev,
            per_round = self.ev_per_round,
            lo = self.ci95.0,
            hi = self.ci95.1,
            per_hour = self.ev_per_hour,
            win = self.win_rate * 100.0,
            loss = self.loss_rate * 100.0,
            push = self.push_rate * 100.0,
            sd_round = self.sd_per_round,
            sd_hour = self.sd_per_hour,
        ));

        if !self.count.bids_by_true_count.is_empty() {
            rows.push_str("\n| True count | Bids | Share |\n");
            rows.push_str("|------------|------|-------|\n");
            for (tc, bids) in &self.count.bids_by_true_count {
                let share = *bids as f64 / self.count.bids as f64 * 100.0;
                rows.push_str(&format!("| {tc:+} | {bids} | {share:.2}% |\n"));
            }
        }

        fs::write(path.as_ref(), rows).map_err(|e| ReportError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

/// `6 deck H17 DAS`, with `RSA` appended when aces may be resplit.
pub fn describe(decks: usize, rules: &TableRules) -> String {
    let mut text = format!(
        "{decks} deck {}",
        if rules.dealer_hits_soft17 { "H17" } else { "S17" }
    );
    if rules.double_after_split {
        text.push_str(" DAS");
    }
    if rules.resplit_aces {
        text.push_str(" RSA");
    }
    text
}

fn ensure_parent(path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ReportError::Io {
            context: "creating summary directory",
            source: e,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{GameResult, Moments};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn outcome() -> SimulationOutcome {
        let mut result = GameResult {
            shoes: 2,
            rounds: 4,
            hands: 4,
            wins: 2,
            losses: 1,
            pushes: 1,
            ev: 1.0,
            wagered: 4.0,
            ..GameResult::default()
        };
        result.round_moments = Moments::from_samples(&[1.0, 1.0, -1.0, 0.0]);
        result.hourly_moments = Moments::from_grouped(&[1.0, 1.0, -1.0, 0.0], 2);
        result.count = CountReport {
            bids: 4,
            high_true_count: 2.5,
            low_true_count: -1.0,
            summed_true_count: 2.0,
            bids_by_true_count: BTreeMap::from([(-1, 1), (0, 2), (2, 1)]),
        };
        SimulationOutcome {
            result,
            settings: SimulationSettings {
                rounds_per_hour: 2,
                workers: 1,
                ..SimulationSettings::default()
            },
            rules: TableRules::default(),
            strategy: "hilo",
            workers: 1,
            elapsed: Duration::from_millis(250),
        }
    }

    #[test]
    fn describes_common_rule_sets() {
        assert_eq!(describe(6, &TableRules::default()), "6 deck H17 DAS");
        let s17 = TableRules {
            dealer_hits_soft17: false,
            double_after_split: false,
            resplit_aces: true,
            ..TableRules::default()
        };
        assert_eq!(describe(2, &s17), "2 deck S17 RSA");
    }

    #[test]
    fn summary_derives_rates_and_interval() {
        let summary = SimulationSummary::from_outcome("unit", &outcome());
        assert_eq!(summary.ev_per_round, 0.25);
        assert_eq!(summary.ev_per_hour, 0.5);
        assert_eq!(summary.edge, 0.25);
        assert_eq!(summary.hours, 2);
        assert!(summary.ci95.0 < 0.25 && summary.ci95.1 > 0.25);
        assert!(summary.probability_positive > 0.5 && summary.probability_positive < 1.0);

        let text = summary.render_text();
        assert!(text.starts_with("6 deck H17 DAS"));
        assert!(text.contains("TC  +2:"));
    }

    #[test]
    fn writes_json_and_markdown() {
        let dir = tempfile::tempdir().expect("temp dir");
        let summary = SimulationSummary::from_outcome("unit", &outcome());
        let json_path = dir.path().join("nested/summary.json");
        let md_path = dir.path().join("summary.md");
        summary.write_json(&json_path).expect("json written");
        summary.write_markdown(&md_path).expect("markdown written");

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).expect("read json"))
                .expect("valid json");
        assert_eq!(json["rounds"], 4);
        assert_eq!(json["description"], "6 deck H17 DAS");

        let md = fs::read_to_string(&md_path).expect("read markdown");
        assert!(md.contains("# Simulation Summary: unit"));
        assert!(md.contains("| +2 | 1 | 25.00% |"));
    }
}
