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
use alloy_primitives::utils::format_units;
use alloy_primitives::{I256, U256};

pub const WEI_PER_GWEI: u64 = 1_000_000_000;
pub const WEI_PER_ETH: u64 = 1_000_000_000_000_000_000;

pub fn gwei_to_wei(gwei: u64) -> U256 {
    U256::from(gwei) * U256::from(WEI_PER_GWEI)
}

pub fn eth_to_wei(eth: u64) -> U256 {
    U256::from(eth) * U256::from(WEI_PER_ETH)
}

/// Lift a wei amount into signed space. Amounts of ETH are always far below 2^255.
pub(crate) fn signed(value: U256) -> I256 {
    I256::from_raw(value)
}

/// Convert an accumulated amount back to unsigned, refusing to wrap negatives
pub(crate) fn unsigned(field: &'static str, value: I256) -> Result<U256> {
    if value.is_negative() {
        return Err(Error::NegativeBalance { field, value });
    }
    Ok(value.into_raw())
}

/// Lossy conversion for display purposes only
pub fn wei_to_eth(wei: I256) -> f64 {
    format_units(wei, "ether")
        .ok()
        .and_then(|eth| eth.parse().ok())
        .unwrap_or(f64::NAN)
}

/// Round towards negative infinity at the given number of decimal places
pub fn round_down(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).floor() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gwei_scales_exactly() {
        assert_eq!(gwei_to_wei(32_000_000_000), eth_to_wei(32));
        assert_eq!(gwei_to_wei(1), U256::from(WEI_PER_GWEI));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let err = unsigned("test", I256::MINUS_ONE).unwrap_err();
        assert!(matches!(err, Error::NegativeBalance { field: "test", .. }));
        assert_eq!(unsigned("test", signed(eth_to_wei(3))).unwrap(), eth_to_wei(3));
    }

    #[test]
    fn display_helpers() {
        assert_eq!(wei_to_eth(signed(eth_to_wei(2))), 2.0);
        assert_eq!(wei_to_eth(-signed(eth_to_wei(3)) / I256::try_from(2).unwrap()), -1.5);
        assert_eq!(round_down(0.0123459, 6), 0.012345);
    }
}
