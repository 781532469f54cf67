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

use alloy_primitives::Address;
use std::fmt::Display;

pub mod mainnet {
    use alloy_primitives::{address, Address};

    pub const CHAIN_ID: u64 = 1;

    /// The RPL/WETH pool whose oracle the price duty reads.
    pub const RPL_TWAP_POOL_ADDRESS: Address = address!("e42318eA3b998e8355a3Da364EB9D48eC725Eb45");
}

pub mod prater {
    pub const CHAIN_ID: u64 = 5;
}

pub mod zhejiang {
    pub const CHAIN_ID: u64 = 1337803;
}

/// Networks the oracle duties can be simulated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Prater,
    Zhejiang,
}

impl Network {
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            mainnet::CHAIN_ID => Some(Network::Mainnet),
            prater::CHAIN_ID => Some(Network::Prater),
            zhejiang::CHAIN_ID => Some(Network::Zhejiang),
            _ => None,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => mainnet::CHAIN_ID,
            Network::Prater => prater::CHAIN_ID,
            Network::Zhejiang => zhejiang::CHAIN_ID,
        }
    }

    /// Address of the pool backing the RPL price, if one is deployed on this network
    pub fn rpl_twap_pool_address(&self) -> Option<Address> {
        match self {
            Network::Mainnet => Some(mainnet::RPL_TWAP_POOL_ADDRESS),
            Network::Prater | Network::Zhejiang => None,
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Prater => write!(f, "prater"),
            Network::Zhejiang => write!(f, "zhejiang"),
        }
    }
}
