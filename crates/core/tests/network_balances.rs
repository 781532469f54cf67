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
use rocketpool_oracle_core::state::{MinipoolDepositType, MinipoolStatus, ValidatorDetails};
use rocketpool_oracle_core::{compute_network_balances, Error};
use test_utils::{ether, FailingSmoothingPool, FixedSmoothingPool, TestStateBuilder};

const SLOT: u64 = 7_000_000;

/// A state exercising every minipool case, two nodes and distinct deposit pool fields
fn mixed_state() -> TestStateBuilder {
    let mut b = TestStateBuilder::new(SLOT);
    let epoch = b.epoch();

    b.with_staking_minipool(ether("25"));
    b.with_prelaunch_minipool(ether("31"));

    let mut vacant = b.minipool(MinipoolStatus::Staking, MinipoolDepositType::Variable);
    vacant.is_vacant = true;
    let validator = b.active_validator();
    b.with_minipool(vacant, Some(validator));

    let dissolved = b.minipool(MinipoolStatus::Dissolved, MinipoolDepositType::Half);
    b.with_minipool(dissolved, None);

    // exited full minipool waiting on its refund
    let mut refunding = b.minipool(MinipoolStatus::Withdrawable, MinipoolDepositType::Full);
    refunding.user_deposit_balance = U256::ZERO;
    refunding.user_share_of_balance_including_beacon = ether("20");
    let validator = ValidatorDetails {
        exit_epoch: epoch - 10,
        ..b.active_validator()
    };
    b.with_minipool(refunding, Some(validator));

    b.with_node(ether("1.5"), ether("2"));
    b.with_node(ether("0.25"), ether("1"));
    b.with_network_details(|d| {
        d.deposit_pool_balance = ether("100");
        d.deposit_pool_user_balance = ether("97");
        d.reth_balance = ether("5");
        d.total_reth_supply = ether("150");
    });
    b
}

#[tokio::test]
async fn test_balances_with_atlas() -> anyhow::Result<()> {
    let b = mixed_state();
    let state = b.build();
    let header = b.header();
    let smoothing_pool = FixedSmoothingPool::new(ether("3"));

    let balances = compute_network_balances(&state, &header, &smoothing_pool, true).await?;

    assert_eq!(balances.block, header.number);
    assert_eq!(balances.deposit_pool, ether("97"));
    // 25 staking + 31 prelaunch + 4 refunding
    assert_eq!(balances.minipools_total, ether("60"));
    assert_eq!(balances.minipools_staking, ether("25"));
    assert_eq!(balances.distributor_share_total, ether("1.75"));
    assert_eq!(balances.smoothing_pool_share, ether("3"));
    assert_eq!(balances.reth_contract, ether("5"));
    assert_eq!(balances.reth_supply, ether("150"));
    assert_eq!(balances.node_credit_balance, ether("3"));

    Ok(())
}

#[tokio::test]
async fn test_balances_before_atlas() -> anyhow::Result<()> {
    let b = mixed_state();
    let state = b.build();
    let smoothing_pool = FixedSmoothingPool::new(ether("3"));

    let balances = compute_network_balances(&state, &b.header(), &smoothing_pool, false).await?;

    assert_eq!(balances.deposit_pool, ether("100"));
    assert_eq!(balances.node_credit_balance, U256::ZERO);
    assert_eq!(balances.minipools_total, ether("60"));

    Ok(())
}

#[tokio::test]
async fn test_total_backing_and_ratio() -> anyhow::Result<()> {
    let b = mixed_state();
    let state = b.build();
    let smoothing_pool = FixedSmoothingPool::new(ether("3"));

    let balances = compute_network_balances(&state, &b.header(), &smoothing_pool, true).await?;

    // 97 + 60 + 5 + 1.75 + 3 - 3
    let total = balances.total_backing();
    assert_eq!(total.into_raw(), ether("163.75"));
    assert!((balances.implied_exchange_rate() - 163.75 / 150.0).abs() < 1e-12);

    Ok(())
}

#[tokio::test]
async fn test_smoothing_pool_request() -> anyhow::Result<()> {
    let b = mixed_state();
    let state = b.build();
    let header = b.header();
    let smoothing_pool = FixedSmoothingPool::new(U256::ZERO);

    compute_network_balances(&state, &header, &smoothing_pool, true).await?;

    let details = &state.network_details;
    let expected_intervals = (header.timestamp - details.interval_start) / details.interval_duration;
    assert_eq!(
        smoothing_pool.requests(),
        vec![(
            details.reward_index,
            details.interval_start,
            header.timestamp,
            SLOT,
            expected_intervals
        )]
    );

    Ok(())
}

#[tokio::test]
async fn test_failed_smoothing_pool_discards_report() -> anyhow::Result<()> {
    let b = mixed_state();
    let state = b.build();

    let result = compute_network_balances(&state, &b.header(), &FailingSmoothingPool, true).await;

    match result {
        Err(Error::AggregationFailed(inner)) => {
            assert!(matches!(*inner, Error::UpstreamUnavailable(_)))
        }
        other => panic!("expected aggregation failure, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_zero_interval_duration_fails_aggregation() -> anyhow::Result<()> {
    let mut b = mixed_state();
    b.with_network_details(|d| d.interval_duration = 0);
    let state = b.build();
    let smoothing_pool = FixedSmoothingPool::new(U256::ZERO);

    let result = compute_network_balances(&state, &b.header(), &smoothing_pool, true).await;
    assert!(matches!(result, Err(Error::AggregationFailed(_))));

    Ok(())
}

#[tokio::test]
async fn test_aggregation_is_idempotent() -> anyhow::Result<()> {
    let b = mixed_state();
    let state = b.build();
    let header = b.header();
    let smoothing_pool = FixedSmoothingPool::new(ether("3"));

    let first = compute_network_balances(&state, &header, &smoothing_pool, true).await?;
    let second = compute_network_balances(&state, &header, &smoothing_pool, true).await?;

    assert_eq!(first, second);
    assert_eq!(serde_json::to_vec(&first)?, serde_json::to_vec(&second)?);

    Ok(())
}

#[tokio::test]
async fn test_negative_minipool_total_is_rejected() -> anyhow::Result<()> {
    let mut b = TestStateBuilder::new(SLOT);
    // node funds exceed everything held, which no consistent contract state allows
    let mut broken = b.minipool(MinipoolStatus::Staking, MinipoolDepositType::Variable);
    broken.version = 2;
    broken.node_deposit_balance = ether("40");
    let validator = b.active_validator();
    b.with_minipool(broken, Some(validator));
    let state = b.build();

    let result =
        compute_network_balances(&state, &b.header(), &FixedSmoothingPool::default(), true).await;
    assert!(matches!(result, Err(Error::NegativeBalance { .. })));

    Ok(())
}
