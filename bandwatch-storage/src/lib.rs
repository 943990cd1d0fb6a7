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
    error::{ErrorType, OrErr},
    Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// PeriodState is the persisted accounting state. There is exactly one on
/// disk at any time, representing the most recently started period. It is
/// absent only before the very first run and is never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodState {
    /// period is the identifier of the accounting period, a calendar
    /// year-month like "2025-01".
    pub period: String,

    /// rx is the cumulative receive counter recorded at the start of the
    /// period.
    pub rx: u128,

    /// tx is the cumulative transmit counter recorded at the start of the
    /// period.
    pub tx: u128,
}

/// Storage owns the persisted accounting state file.
#[derive(Debug, Clone)]
pub struct Storage {
    /// path is the path of the state file.
    path: PathBuf,
}

/// Storage implements the storage of the accounting state.
impl Storage {
    /// new creates a new Storage.
    pub fn new(path: impl Into<PathBuf>) -> Storage {
        Storage { path: path.into() }
    }

    /// path returns the path of the state file.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// exists returns whether a state file has been persisted yet.
    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// load loads the persisted state, returning None before the first run.
    #[instrument(skip_all)]
    pub async fn load(&self) -> Result<Option<PeriodState>> {
        if !self.exists().await {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .await
            .or_context(ErrorType::PersistenceError, "read state file")?;
        let state: PeriodState = serde_json::from_str(&content)
            .or_context(ErrorType::PersistenceError, "parse state file")?;

        Ok(Some(state))
    }

    /// save persists the state, replacing any previous period's record.
    ///
    /// The state is written to a temporary file and renamed into place, so a
    /// failed write never leaves a truncated state file behind.
    #[instrument(skip_all)]
    pub async fn save(&self, state: &PeriodState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .or_context(ErrorType::PersistenceError, "create state directory")?;
        }

        let content =
            serde_json::to_string(state).or_context(ErrorType::PersistenceError, "serialize state")?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, content)
            .await
            .or_context(ErrorType::PersistenceError, "write state file")?;
        fs::rename(&tmp_path, &self.path)
            .await
            .or_context(ErrorType::PersistenceError, "rename state file")?;

        info!(
            "persisted baseline for period {} to {}",
            state.period,
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn state() -> PeriodState {
        PeriodState {
            period: "2025-01".to_string(),
            rx: 123_456_789,
            tx: 987_654_321,
        }
    }

    #[tokio::test]
    async fn load_returns_none_before_first_run() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("stats.json"));

        assert!(!storage.exists().await);
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("stats.json"));

        storage.save(&state()).await.unwrap();
        assert!(storage.exists().await);
        assert_eq!(storage.load().await.unwrap(), Some(state()));
    }

    #[tokio::test]
    async fn save_overwrites_previous_period() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("stats.json"));

        storage.save(&state()).await.unwrap();
        let rolled = PeriodState {
            period: "2025-02".to_string(),
            rx: 42,
            tx: 7,
        };
        storage.save(&rolled).await.unwrap();

        assert_eq!(storage.load().await.unwrap(), Some(rolled));
    }

    #[tokio::test]
    async fn save_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("nested").join("stats.json"));

        storage.save(&state()).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(state()));
    }

    #[tokio::test]
    async fn load_rejects_malformed_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let storage = Storage::new(path);
        assert!(storage.load().await.is_err());
    }

    #[test]
    fn state_serializes_with_stable_field_names() {
        let content = serde_json::to_string(&state()).unwrap();
        assert_eq!(
            content,
            r#"{"period":"2025-01","rx":123456789,"tx":987654321}"#
        );
    }
}
