/*
 *     Copyright 2025 The Bandwatch Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use bandwatch_storage::PeriodState;
use bandwatch_util::net::CounterSnapshot;
use chrono::Datelike;

/// UsageReport is the usage accrued since the start of the current period.
/// It is produced only when a notification should be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageReport {
    /// used_rx is the received bytes since the period baseline.
    pub used_rx: u128,

    /// used_tx is the transmitted bytes since the period baseline.
    pub used_tx: u128,

    /// used_total is the sum of used_rx and used_tx.
    pub used_total: u128,
}

/// Decision is the action the accounting engine takes for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Skip starts a fresh baseline without reporting, on the first ever run
    /// and on period rollover.
    Skip,

    /// ResetDetected re-baselines after a cumulative counter decreased
    /// mid-period, discarding the partial-period data instead of reporting
    /// negative or wrapped usage.
    ResetDetected,

    /// Report carries the usage accrued since the period baseline.
    Report(UsageReport),
}

/// Outcome is the decision together with the state to persist, if any.
/// The caller must persist the state before acting on the decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// decision is the action to take this invocation.
    pub decision: Decision,

    /// state is the new accounting state to persist, or None when the
    /// baseline stays fixed for the rest of the period.
    pub state: Option<PeriodState>,
}

/// period_key derives the accounting period identifier from a calendar date,
/// a year-month like "2025-01". It changes exactly once per calendar month.
pub fn period_key(date: &impl Datelike) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// decide determines what this invocation does, from the persisted state and
/// a fresh counter snapshot. It is a pure, total function:
///
/// 1. No prior state: baseline the current period at the snapshot, skip.
/// 2. Period changed: baseline the new period at the snapshot, skip.
/// 3. A counter decreased mid-period: re-baseline at the snapshot, keep the
///    period, report the reset.
/// 4. Otherwise: report the delta against the baseline; the state is not
///    rewritten.
pub fn decide(
    prior: Option<&PeriodState>,
    snapshot: &CounterSnapshot,
    current_period: &str,
) -> Outcome {
    let baseline = PeriodState {
        period: current_period.to_string(),
        rx: snapshot.rx,
        tx: snapshot.tx,
    };

    // First run: persist a baseline so the next invocation has something to
    // diff against, never report the interface's full history.
    let Some(prior) = prior else {
        return Outcome {
            decision: Decision::Skip,
            state: Some(baseline),
        };
    };

    // Period rollover: usage for the new month starts fresh.
    if prior.period != current_period {
        return Outcome {
            decision: Decision::Skip,
            state: Some(baseline),
        };
    }

    // The cumulative counters are monotonic unless the counter source
    // restarted, e.g. after a reboot.
    if snapshot.rx < prior.rx || snapshot.tx < prior.tx {
        return Outcome {
            decision: Decision::ResetDetected,
            state: Some(baseline),
        };
    }

    let used_rx = snapshot.rx - prior.rx;
    let used_tx = snapshot.tx - prior.tx;
    Outcome {
        decision: Decision::Report(UsageReport {
            used_rx,
            used_tx,
            used_total: used_rx + used_tx,
        }),
        state: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot(rx: u128, tx: u128) -> CounterSnapshot {
        CounterSnapshot { rx, tx }
    }

    fn state(period: &str, rx: u128, tx: u128) -> PeriodState {
        PeriodState {
            period: period.to_string(),
            rx,
            tx,
        }
    }

    #[test]
    fn test_period_key() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(period_key(&date), "2025-01");

        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(period_key(&date), "2025-12");
    }

    #[test]
    fn first_run_persists_baseline_and_skips() {
        let outcome = decide(None, &snapshot(1000, 500), "2025-01");

        assert_eq!(outcome.decision, Decision::Skip);
        assert_eq!(outcome.state, Some(state("2025-01", 1000, 500)));
    }

    #[test]
    fn same_period_reports_exact_delta() {
        let prior = state("2025-01", 1000, 500);
        let outcome = decide(Some(&prior), &snapshot(1500, 800), "2025-01");

        assert_eq!(
            outcome.decision,
            Decision::Report(UsageReport {
                used_rx: 500,
                used_tx: 300,
                used_total: 800,
            })
        );
        // The baseline stays fixed for the whole period.
        assert_eq!(outcome.state, None);
    }

    #[test]
    fn unchanged_counters_report_zero_usage() {
        let prior = state("2025-01", 1000, 500);
        let outcome = decide(Some(&prior), &snapshot(1000, 500), "2025-01");

        assert_eq!(
            outcome.decision,
            Decision::Report(UsageReport {
                used_rx: 0,
                used_tx: 0,
                used_total: 0,
            })
        );
    }

    #[test]
    fn rollover_rebaselines_and_skips() {
        let prior = state("2025-01", 1000, 500);
        let outcome = decide(Some(&prior), &snapshot(9999, 8888), "2025-02");

        assert_eq!(outcome.decision, Decision::Skip);
        assert_eq!(outcome.state, Some(state("2025-02", 9999, 8888)));
    }

    #[test]
    fn rollover_skips_even_when_counters_decreased() {
        // A rollover takes precedence over the counter-reset check.
        let prior = state("2025-01", 1000, 500);
        let outcome = decide(Some(&prior), &snapshot(10, 10), "2025-02");

        assert_eq!(outcome.decision, Decision::Skip);
        assert_eq!(outcome.state, Some(state("2025-02", 10, 10)));
    }

    #[test]
    fn rx_reset_rebaselines_within_period() {
        let prior = state("2025-01", 900, 900);
        let outcome = decide(Some(&prior), &snapshot(100, 900), "2025-01");

        assert_eq!(outcome.decision, Decision::ResetDetected);
        assert_eq!(outcome.state, Some(state("2025-01", 100, 900)));
    }

    #[test]
    fn tx_reset_rebaselines_within_period() {
        let prior = state("2025-01", 900, 900);
        let outcome = decide(Some(&prior), &snapshot(950, 100), "2025-01");

        assert_eq!(outcome.decision, Decision::ResetDetected);
        assert_eq!(outcome.state, Some(state("2025-01", 950, 100)));
    }

    #[test]
    fn rerun_after_rollover_reports_zero() {
        // Persisting the rollover outcome and re-running with the same
        // snapshot must account zero usage, never skip again.
        let outcome = decide(Some(&state("2025-01", 1000, 500)), &snapshot(1500, 800), "2025-02");
        let rolled = outcome.state.unwrap();

        let outcome = decide(Some(&rolled), &snapshot(1500, 800), "2025-02");
        assert_eq!(
            outcome.decision,
            Decision::Report(UsageReport {
                used_rx: 0,
                used_tx: 0,
                used_total: 0,
            })
        );
        assert_eq!(outcome.state, None);
    }

    #[test]
    fn rerun_after_reset_reports_zero() {
        let outcome = decide(Some(&state("2025-01", 900, 900)), &snapshot(100, 900), "2025-01");
        let rebaselined = outcome.state.unwrap();

        let outcome = decide(Some(&rebaselined), &snapshot(100, 900), "2025-01");
        assert_eq!(
            outcome.decision,
            Decision::Report(UsageReport {
                used_rx: 0,
                used_tx: 0,
                used_total: 0,
            })
        );
    }

    #[test]
    fn large_counters_do_not_overflow() {
        let prior = state("2025-01", 0, 0);
        let outcome = decide(
            Some(&prior),
            &snapshot(u64::MAX as u128 + 1, u64::MAX as u128 + 1),
            "2025-01",
        );

        assert_eq!(
            outcome.decision,
            Decision::Report(UsageReport {
                used_rx: u64::MAX as u128 + 1,
                used_tx: u64::MAX as u128 + 1,
                used_total: (u64::MAX as u128 + 1) * 2,
            })
        );
    }
}
