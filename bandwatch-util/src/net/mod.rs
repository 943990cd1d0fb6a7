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

use bandwatch_core::{
    error::{ErrorType, ExternalError, OrErr},
    Error, Result,
};
use std::path::PathBuf;
use tokio::fs;

/// DEFAULT_PROC_NET_DEV_PATH is the default path of the kernel's per-interface
/// traffic statistics.
pub const DEFAULT_PROC_NET_DEV_PATH: &str = "/proc/net/dev";

/// TX_BYTES_FIELD is the index of the transmit byte counter among the
/// per-interface columns of /proc/net/dev, after the eight receive columns.
const TX_BYTES_FIELD: usize = 8;

/// CounterSnapshot is the cumulative receive/transmit byte counters of an
/// interface at a single point in time. It is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// rx is the cumulative received bytes.
    pub rx: u128,

    /// tx is the cumulative transmitted bytes.
    pub tx: u128,
}

/// CounterSource reads the cumulative byte counters of a named interface.
#[derive(Debug, Clone)]
pub struct CounterSource {
    /// interface is the name of the interface to read.
    interface: String,

    /// path is the path of the statistics source.
    path: PathBuf,
}

/// CounterSource implements the counter source.
impl CounterSource {
    /// new creates a new CounterSource reading from /proc/net/dev.
    pub fn new(interface: &str) -> CounterSource {
        Self::with_path(interface, DEFAULT_PROC_NET_DEV_PATH)
    }

    /// with_path creates a new CounterSource reading from the given path.
    pub fn with_path(interface: &str, path: impl Into<PathBuf>) -> CounterSource {
        CounterSource {
            interface: interface.to_string(),
            path: path.into(),
        }
    }

    /// interface returns the name of the monitored interface.
    pub fn interface(&self) -> &str {
        self.interface.as_str()
    }

    /// snapshot reads the current cumulative counters of the interface.
    pub async fn snapshot(&self) -> Result<CounterSnapshot> {
        let content = fs::read_to_string(&self.path)
            .await
            .or_context(ErrorType::CounterSourceError, "read network statistics")?;

        Self::parse(&content, &self.interface)
    }

    /// parse extracts the receive/transmit byte counters for the interface
    /// from the statistics content.
    ///
    /// The first two lines are column headers. Each following line is
    /// `<name>: <16 counters>` with the receive bytes first and the transmit
    /// bytes ninth. The interface name is matched exactly, so querying
    /// "eth0" never picks up "veth0".
    fn parse(content: &str, interface: &str) -> Result<CounterSnapshot> {
        for line in content.lines().skip(2) {
            let Some((name, counters)) = line.split_once(':') else {
                continue;
            };

            if name.trim() != interface {
                continue;
            }

            let fields: Vec<&str> = counters.split_whitespace().collect();
            if fields.len() <= TX_BYTES_FIELD {
                return Err(ExternalError::new(ErrorType::CounterSourceError)
                    .with_context(format!("malformed statistics entry for {}", interface))
                    .into());
            }

            let rx = fields[0]
                .parse::<u128>()
                .or_context(ErrorType::CounterSourceError, "parse receive counter")?;
            let tx = fields[TX_BYTES_FIELD]
                .parse::<u128>()
                .or_context(ErrorType::CounterSourceError, "parse transmit counter")?;

            return Ok(CounterSnapshot { rx, tx });
        }

        Err(Error::InterfaceNotFound(interface.to_string()))
    }
}
