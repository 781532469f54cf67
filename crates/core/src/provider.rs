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

//! Seams to the services the duties read from. Implementations own their transport,
//! caching and timeouts and report failures as [Error::UpstreamUnavailable](crate::Error).
//! All of them are shared by reference across concurrently running sub-computations.

use crate::error::Result;
use crate::state::{BeaconConfig, BlockHeader, NetworkState};
use alloy_primitives::{Address, U256};
use std::future::Future;

pub trait ExecutionClient {
    fn header_by_number(&self, number: u64) -> impl Future<Output = Result<BlockHeader>> + Send;
}

pub trait BeaconClient {
    fn eth2_config(&self) -> impl Future<Output = Result<BeaconConfig>> + Send;
}

/// Produces consistent joint snapshots of both layers
pub trait StateManager {
    fn head_state(&self) -> impl Future<Output = Result<NetworkState>> + Send;

    fn state_for_slot(&self, slot: u64) -> impl Future<Output = Result<NetworkState>> + Send;
}

/// Everything the smoothing pool estimator is given for one approximation
#[derive(Debug, Clone, Copy)]
pub struct SmoothingPoolRequest<'a> {
    pub interval_index: u64,
    /// Unix timestamp of the start of the current interval
    pub start_time: u64,
    /// Unix timestamp the approximation runs up to
    pub end_time: u64,
    pub target_slot: u64,
    pub header: &'a BlockHeader,
    pub intervals_passed: u64,
    pub state: &'a NetworkState,
}

pub trait SmoothingPoolEstimator {
    /// Approximate the rETH holders' share of the smoothing pool balance
    fn approximate_staker_share(
        &self,
        request: SmoothingPoolRequest<'_>,
    ) -> impl Future<Output = Result<U256>> + Send;
}

/// A concentrated liquidity pool exposing cumulative tick observations
pub trait TwapPool {
    /// Returns the tick cumulatives at each of `seconds_agos` relative to `block_number`
    fn observe(
        &self,
        pool: Address,
        block_number: u64,
        seconds_agos: [u32; 2],
    ) -> impl Future<Output = Result<[i64; 2]>> + Send;
}
