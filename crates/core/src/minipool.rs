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

use crate::state::{MinipoolDepositType, MinipoolDetails, MinipoolStatus, ValidatorDetails};
use crate::units::{eth_to_wei, gwei_to_wei, signed};
use alloy_primitives::I256;

/// Node principal of a full minipool that has already been refunded on-chain
pub const FULL_MINIPOOL_REFUND_ETH: u64 = 16;

/// Delegate version whose variable deposit minipools report their blended balance
const RECONCILED_VARIABLE_VERSION: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinipoolBalanceDetails {
    pub is_staking: bool,
    /// Can only go negative for a minipool whose contract state is itself inconsistent
    pub user_balance: I256,
}

/// How a minipool's user balance is attributed. Variants are tested in declaration order,
/// each one only applying to minipools not claimed by an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceCase<'a> {
    /// Vacant minipools contribute nothing
    Vacant,
    /// Dissolved minipools don't back rETH
    Dissolved,
    /// Funds are held but not yet at risk on the beacon chain
    PreStake,
    /// Redstone delegate variable deposit minipools report their full balance, which still
    /// includes the node deposit and any pending refund
    ReconciledVariable {
        validator: Option<&'a ValidatorDetails>,
    },
    /// No validator on the beacon chain yet, or not active at this epoch
    NotYetActive,
    Active {
        validator: &'a ValidatorDetails,
        /// A full minipool in the refund queue, whose user share still counts the node's 16 ETH
        in_refund_queue: bool,
    },
}

impl<'a> BalanceCase<'a> {
    pub fn classify(
        minipool: &MinipoolDetails,
        validator: Option<&'a ValidatorDetails>,
        epoch: u64,
    ) -> Self {
        if minipool.is_vacant {
            return BalanceCase::Vacant;
        }
        match minipool.status {
            MinipoolStatus::Dissolved => return BalanceCase::Dissolved,
            MinipoolStatus::Initialized | MinipoolStatus::Prelaunch => {
                return BalanceCase::PreStake
            }
            MinipoolStatus::Staking | MinipoolStatus::Withdrawable => {}
        }
        if minipool.deposit_type == MinipoolDepositType::Variable
            && minipool.version == RECONCILED_VARIABLE_VERSION
        {
            return BalanceCase::ReconciledVariable { validator };
        }
        match validator {
            Some(validator) if validator.exists && validator.activation_epoch < epoch => {
                BalanceCase::Active {
                    validator,
                    in_refund_queue: minipool.user_deposit_balance.is_zero()
                        && minipool.deposit_type == MinipoolDepositType::Full,
                }
            }
            _ => BalanceCase::NotYetActive,
        }
    }

    pub fn balance_details(&self, minipool: &MinipoolDetails, epoch: u64) -> MinipoolBalanceDetails {
        match *self {
            BalanceCase::Vacant | BalanceCase::Dissolved => MinipoolBalanceDetails {
                is_staking: false,
                user_balance: I256::ZERO,
            },
            BalanceCase::PreStake | BalanceCase::NotYetActive => MinipoolBalanceDetails {
                is_staking: false,
                user_balance: signed(minipool.user_deposit_balance),
            },
            BalanceCase::ReconciledVariable { validator } => {
                let beacon_balance = validator.map_or(0, |v| v.balance);
                let user_balance = signed(minipool.balance) + signed(gwei_to_wei(beacon_balance))
                    - signed(minipool.node_refund_balance)
                    - signed(minipool.node_deposit_balance);
                MinipoolBalanceDetails {
                    is_staking: validator.is_some_and(|v| {
                        v.exists && v.activation_epoch < epoch && v.exit_epoch > epoch
                    }),
                    user_balance,
                }
            }
            BalanceCase::Active {
                validator,
                in_refund_queue,
            } => {
                let mut user_balance = signed(minipool.user_share_of_balance_including_beacon);
                if in_refund_queue {
                    user_balance -= signed(eth_to_wei(FULL_MINIPOOL_REFUND_ETH));
                }
                MinipoolBalanceDetails {
                    is_staking: validator.exit_epoch > epoch,
                    user_balance,
                }
            }
        }
    }
}

/// User balance and staking status of a single minipool at the given beacon epoch
pub fn minipool_balance_details(
    minipool: &MinipoolDetails,
    validator: Option<&ValidatorDetails>,
    epoch: u64,
) -> MinipoolBalanceDetails {
    BalanceCase::classify(minipool, validator, epoch).balance_details(minipool, epoch)
}
