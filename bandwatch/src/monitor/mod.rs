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

use crate::accounting::{self, Decision};
use crate::notifier::Notifier;
use bandwatch_config::bwdaemon::Config;
use bandwatch_core::{
    error::{ErrorType, OrErr},
    Result,
};
use bandwatch_storage::Storage;
use bandwatch_util::fmt::format_bytes;
use bandwatch_util::net::CounterSource;
use bandwatch_util::shutdown;
use chrono::{DateTime, Datelike, Duration, LocalResult, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

/// REPORT_LEAD_MINUTES is how long before period rollover the monthly usage
/// report fires. Firing near period-end keeps the report at most once per
/// period while losing only the final minutes of usage to the rollover.
const REPORT_LEAD_MINUTES: i64 = 5;

/// Monitor runs the accounting engine: once at startup when no state has
/// been persisted yet, then once per month shortly before period rollover.
pub struct Monitor {
    /// config is the configuration of the bwdaemon.
    config: Arc<Config>,

    /// storage is the persisted accounting state.
    storage: Arc<Storage>,

    /// counter_source reads the interface's cumulative byte counters.
    counter_source: CounterSource,

    /// notifier delivers the usage report.
    notifier: Arc<Notifier>,

    /// timezone is the timezone the accounting period is derived in.
    timezone: Tz,

    /// shutdown is used to shutdown the monitor.
    shutdown: shutdown::Shutdown,

    /// _shutdown_complete is used to notify the monitor is shutdown.
    _shutdown_complete: mpsc::UnboundedSender<()>,
}

/// Monitor implements the accounting monitor of the bwdaemon.
impl Monitor {
    /// new creates a new Monitor.
    pub fn new(
        config: Arc<Config>,
        storage: Arc<Storage>,
        counter_source: CounterSource,
        notifier: Arc<Notifier>,
        shutdown: shutdown::Shutdown,
        shutdown_complete_tx: mpsc::UnboundedSender<()>,
    ) -> Result<Self> {
        let timezone = match config.timezone.as_deref() {
            Some(timezone) => timezone
                .parse::<Tz>()
                .or_context(ErrorType::ConfigError, "parse timezone")?,
            None => Tz::UTC,
        };

        Ok(Self {
            config,
            storage,
            counter_source,
            notifier,
            timezone,
            shutdown,
            _shutdown_complete: shutdown_complete_tx,
        })
    }

    /// now returns the current time in the accounting timezone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    /// run runs the accounting monitor.
    pub async fn run(&self) {
        // Clone the shutdown channel.
        let mut shutdown = self.shutdown.clone();

        // The very first invocation has no baseline yet, run immediately so
        // the current period starts accounting from now.
        if !self.storage.exists().await {
            if let Err(err) = self.run_once(self.now()).await {
                error!("initial accounting run failed: {}", err);
            }
        }

        loop {
            let now = self.now();
            let Some(trigger_at) = next_trigger(&now) else {
                error!("can not compute the next report trigger from {}", now);
                return;
            };

            let wait = (trigger_at - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            info!("next usage report scheduled at {}", trigger_at);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    if let Err(err) = self.run_once(self.now()).await {
                        // Skip this cycle, the next trigger retries.
                        error!("scheduled accounting run failed: {}", err);
                    }
                }
                _ = shutdown.recv() => {
                    // Shutdown the monitor.
                    info!("monitor shutting down");
                    return
                }
            }
        }
    }

    /// run_once executes one accounting invocation at the given time: load
    /// the persisted state, snapshot the counters, decide, persist the new
    /// baseline if any, and notify when there is usage to report.
    #[instrument(skip_all)]
    pub async fn run_once(&self, now: DateTime<Tz>) -> Result<Decision> {
        let current_period = accounting::period_key(&now);

        let prior = self.storage.load().await?;
        let snapshot = self.counter_source.snapshot().await?;
        let outcome = accounting::decide(prior.as_ref(), &snapshot, &current_period);

        // The new baseline must be durable before any notification, otherwise
        // the next run would account the same traffic twice.
        if let Some(state) = outcome.state.as_ref() {
            self.storage.save(state).await?;
        }

        match outcome.decision {
            Decision::Skip => {
                info!("started accounting for period {}", current_period);
            }
            Decision::ResetDetected => {
                warn!(
                    "counter reset detected, re-baselined period {}",
                    current_period
                );
            }
            Decision::Report(report) => {
                self.notifier
                    .send(
                        &current_period,
                        &format_bytes(report.used_rx),
                        &format_bytes(report.used_tx),
                        &format_bytes(report.used_total),
                    )
                    .await?;
                info!(
                    "period {} usage on {}: rx {}, tx {}, total {}",
                    current_period,
                    self.counter_source.interface(),
                    report.used_rx,
                    report.used_tx,
                    report.used_total
                );
            }
        }

        Ok(outcome.decision)
    }
}

/// next_rollover returns the first instant of the next calendar month.
fn next_rollover(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };

    match now.timezone().with_ymd_and_hms(year, month, 1, 0, 0, 0) {
        LocalResult::Single(rollover) => Some(rollover),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        // Midnight does not exist in zones whose DST change skips it; the
        // period then starts at the next representable hour.
        LocalResult::None => now
            .timezone()
            .with_ymd_and_hms(year, month, 1, 1, 0, 0)
            .earliest(),
    }
}

/// next_trigger returns the next time the usage report fires, shortly before
/// the upcoming period rollover. A trigger already in the past moves on to
/// the following month, so each period fires at most once.
fn next_trigger(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let rollover = next_rollover(now)?;
    let trigger_at = rollover - Duration::minutes(REPORT_LEAD_MINUTES);
    if trigger_at > *now {
        return Some(trigger_at);
    }

    Some(next_rollover(&rollover)? - Duration::minutes(REPORT_LEAD_MINUTES))
}
