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

use crate::network::Network;
use alloy_primitives::I256;
use std::fmt::Display;

/// The oracle duty that a [Error::FeatureDisabled] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duty {
    Balances,
    Prices,
}

impl Display for Duty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Duty::Balances => write!(f, "Balance"),
            Duty::Prices => write!(f, "Price"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("upstream node unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("{0} submissions are currently disabled")]
    FeatureDisabled(Duty),

    #[error("RPL TWAP pool contract not deployed on {0}")]
    PriceSourceUnavailable(Network),

    #[error("network balance aggregation failed: {0}")]
    AggregationFailed(#[source] Box<Error>),

    #[error("average tick {0} is outside the range the price oracle can encode")]
    TickOutOfRange(i64),

    #[error("{field} would be negative ({value} wei)")]
    NegativeBalance { field: &'static str, value: I256 },

    #[error("inconsistent network state: {0}")]
    InvalidState(String),

    #[error("Failed to convert between integers: {0}")]
    IntegerConversion(#[from] std::num::TryFromIntError),
}

impl Error {
    /// Wrap a collaborator failure, keeping the context of what was being fetched.
    pub fn upstream(context: impl Display, err: impl Display) -> Self {
        Error::UpstreamUnavailable(format!("{context}: {err}"))
    }

    /// A disabled duty is a skip, not a failure.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Error::FeatureDisabled(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
