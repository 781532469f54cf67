// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use alloy_primitives::U256;
use rocketpool_oracle_core::provider::{SmoothingPoolEstimator, SmoothingPoolRequest, StateManager};
use rocketpool_oracle_core::state::NetworkState;
use rocketpool_oracle_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One dump written by the snapshot service: the network state at a slot and the
/// smoothing pool estimate that was computed alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: NetworkState,
    pub smoothing_pool_share: U256,
}

/// Directory of snapshot dumps, `head.json` plus one `slot_<n>.json` per captured slot
#[derive(Debug, Clone)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn head_path(&self) -> PathBuf {
        self.root.join("head.json")
    }

    fn slot_path(&self, slot: u64) -> PathBuf {
        self.root.join(format!("slot_{slot}.json"))
    }

    async fn read(path: &Path) -> Result<Snapshot> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::upstream(format!("could not read {}", path.display()), e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::upstream(format!("could not parse {}", path.display()), e))
    }

    /// Snapshot for `slot`, falling back to the head dump when it was taken at that slot
    #[tracing::instrument(skip(self))]
    pub async fn snapshot_for_slot(&self, slot: u64) -> Result<Snapshot> {
        let path = self.slot_path(slot);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Self::read(&path).await;
        }

        let head = Self::read(&self.head_path()).await?;
        if head.state.beacon_slot_number == slot {
            tracing::debug!("using head snapshot for slot {}", slot);
            return Ok(head);
        }
        Err(Error::upstream(
            format!("no snapshot for slot {slot}"),
            format!("{} does not exist", path.display()),
        ))
    }
}

impl StateManager for StateDir {
    async fn head_state(&self) -> Result<NetworkState> {
        Ok(Self::read(&self.head_path()).await?.state)
    }

    async fn state_for_slot(&self, slot: u64) -> Result<NetworkState> {
        Ok(self.snapshot_for_slot(slot).await?.state)
    }
}

impl SmoothingPoolEstimator for StateDir {
    async fn approximate_staker_share(&self, request: SmoothingPoolRequest<'_>) -> Result<U256> {
        let snapshot = self
            .snapshot_for_slot(request.target_slot)
            .await
            .map_err(|e| Error::upstream("error getting approximate share of smoothing pool", e))?;
        tracing::debug!(
            interval = request.interval_index,
            intervals_passed = request.intervals_passed,
            "smoothing pool share {} wei",
            snapshot.smoothing_pool_share
        );
        Ok(snapshot.smoothing_pool_share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocketpool_oracle_core::state::BlockHeader;

    fn snapshot(slot: u64, share: u64) -> Snapshot {
        Snapshot {
            state: NetworkState {
                beacon_slot_number: slot,
                el_block_number: slot + 100,
                ..Default::default()
            },
            smoothing_pool_share: U256::from(share),
        }
    }

    fn write(dir: &Path, name: &str, snapshot: &Snapshot) {
        std::fs::write(dir.join(name), serde_json::to_vec(snapshot).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn reads_slot_and_head_dumps() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "head.json", &snapshot(20, 2));
        write(dir.path(), "slot_10.json", &snapshot(10, 1));
        let states = StateDir::new(dir.path());

        assert_eq!(states.head_state().await?.beacon_slot_number, 20);
        assert_eq!(states.state_for_slot(10).await?.el_block_number, 110);
        // head dump serves its own slot
        assert_eq!(states.state_for_slot(20).await?.el_block_number, 120);
        assert!(matches!(
            states.state_for_slot(15).await,
            Err(Error::UpstreamUnavailable(_))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn smoothing_pool_share_comes_from_the_target_slot() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "head.json", &snapshot(20, 2));
        write(dir.path(), "slot_10.json", &snapshot(10, 1));
        let states = StateDir::new(dir.path());

        let state = states.state_for_slot(10).await?;
        let header = BlockHeader {
            number: 110,
            timestamp: 0,
        };
        let share = states
            .approximate_staker_share(SmoothingPoolRequest {
                interval_index: 0,
                start_time: 0,
                end_time: 0,
                target_slot: 10,
                header: &header,
                intervals_passed: 0,
                state: &state,
            })
            .await?;
        assert_eq!(share, U256::from(1));

        Ok(())
    }
}
