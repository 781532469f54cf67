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

use crate::error::{Error, Result};
use crate::provider::{BeaconClient, ExecutionClient};
use crate::state::BeaconConfig;

/// Where on the chain a duty should be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTarget {
    Head,
    Slot { el_block: u64, slot: u64 },
}

/// The beacon slot a given unix timestamp falls in. Rounds down.
pub fn slot_at_time(config: &BeaconConfig, timestamp: u64) -> Result<u64> {
    let since_genesis = timestamp.checked_sub(config.genesis_time).ok_or_else(|| {
        Error::InvalidTarget(format!(
            "time {} predates beacon genesis at {}",
            timestamp, config.genesis_time
        ))
    })?;
    since_genesis
        .checked_div(config.seconds_per_slot)
        .ok_or_else(|| Error::InvalidState("seconds per slot is zero".into()))
}

/// Align an optional execution layer block with the beacon slot it was produced in.
/// `None` targets the chain head.
#[tracing::instrument(skip(ec, bc))]
pub async fn resolve_target<E, B>(ec: &E, bc: &B, target_block: Option<u64>) -> Result<StateTarget>
where
    E: ExecutionClient,
    B: BeaconClient,
{
    let Some(el_block) = target_block else {
        tracing::info!("Target block not set, getting the state of the chain head.");
        return Ok(StateTarget::Head);
    };

    let header = ec.header_by_number(el_block).await?;
    let config = bc.eth2_config().await?;
    let slot = slot_at_time(&config, header.timestamp)?;
    tracing::debug!(el_block, slot, "aligned target block with beacon slot");

    Ok(StateTarget::Slot { el_block, slot })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_is_slot_zero() {
        let config = BeaconConfig::default();
        assert_eq!(slot_at_time(&config, config.genesis_time).unwrap(), 0);
    }

    #[test]
    fn rounds_down_within_a_slot() {
        let config = BeaconConfig::default();
        assert_eq!(slot_at_time(&config, config.genesis_time + 11).unwrap(), 0);
        assert_eq!(slot_at_time(&config, config.genesis_time + 12).unwrap(), 1);
        assert_eq!(
            slot_at_time(&config, config.genesis_time + 12 * 7_000_000 + 5).unwrap(),
            7_000_000
        );
    }

    #[test]
    fn pre_genesis_is_invalid() {
        let config = BeaconConfig::default();
        let err = slot_at_time(&config, config.genesis_time - 1).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget(_)));
    }

    #[test]
    fn zero_slot_duration_is_rejected() {
        let config = BeaconConfig {
            seconds_per_slot: 0,
            ..Default::default()
        };
        assert!(matches!(
            slot_at_time(&config, config.genesis_time + 1),
            Err(Error::InvalidState(_))
        ));
    }
}
