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

//! RPL price from the pool's tick oracle.
//!
//! Ticks encode price as `1.0001^tick`. The oracle reports cumulative ticks so the
//! arithmetic mean over a window is `(cumulative[1] - cumulative[0]) / window`, and the
//! price in ETH is `1 / 1.0001^avg_tick` scaled to 18 decimals:
//!
//! ```text
//! price = 1e18^2 / ((1.0001e18^tick * 1e18) / 1e18^tick)
//! ```
//!
//! Every step is done on big integers with the same truncating divisions as the
//! submitting oracle so the result matches it to the wei.

use crate::error::{Error, Result};
use crate::network::Network;
use crate::provider::TwapPool;
use alloy_primitives::U256;
use num_bigint::BigUint;
use num_traits::Zero;

/// Length of the averaging window, 12 hours
pub const TWAP_INTERVAL_SECONDS: u32 = 60 * 60 * 12;

/// Largest tick magnitude a pool can be initialised with
pub const MAX_TICK: i64 = 887272;

/// Largest tick magnitude whose price is still at least 1 wei. Beyond it the price
/// truncates to zero, or the reciprocal ratio does for negative ticks.
pub const MAX_PRICED_TICK: i64 = 414486;

/// Two cumulative tick readings `interval` seconds apart, oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickObservation {
    pub tick_cumulatives: [i64; 2],
    pub interval: u32,
}

impl TickObservation {
    /// Arithmetic mean tick over the window, rounded towards negative infinity
    pub fn average_tick(&self) -> Result<i64> {
        if self.interval == 0 {
            return Err(Error::InvalidState("TWAP interval is zero".into()));
        }
        let [start, end] = self.tick_cumulatives;
        let diff = end.checked_sub(start).ok_or_else(|| {
            Error::InvalidState(format!("tick cumulatives {start} and {end} overflow"))
        })?;
        Ok(diff.div_euclid(i64::from(self.interval)))
    }

    /// The time weighted price over the window in wei per RPL
    pub fn price(&self) -> Result<U256> {
        price_at_tick(self.average_tick()?)
    }
}

fn one() -> BigUint {
    BigUint::from(10u64).pow(18)
}

/// 1.0001 in 18 decimal fixed point
fn tick_base() -> BigUint {
    BigUint::from(10001u64) * BigUint::from(10u64).pow(14)
}

/// Price in wei for a given tick. Negative ticks are evaluated through the reciprocal of
/// the base so the result stays exact instead of collapsing to parity.
pub fn price_at_tick(tick: i64) -> Result<U256> {
    if !(-MAX_PRICED_TICK..=MAX_PRICED_TICK).contains(&tick) {
        return Err(Error::TickOutOfRange(tick));
    }
    let exponent = u32::try_from(tick.unsigned_abs())?;
    let one = one();

    // (1.0001e18^tick * 1e18) / 1e18^tick
    let (numerator, denominator) = if tick >= 0 {
        (tick_base().pow(exponent) * &one, one.pow(exponent))
    } else {
        (one.pow(exponent + 1), tick_base().pow(exponent))
    };
    let scaled_ratio = numerator / denominator;
    if scaled_ratio.is_zero() {
        return Err(Error::TickOutOfRange(tick));
    }

    let price = (&one * &one) / scaled_ratio;
    if price.is_zero() {
        return Err(Error::TickOutOfRange(tick));
    }
    U256::try_from_be_slice(&price.to_bytes_be()).ok_or(Error::TickOutOfRange(tick))
}

/// Query the network's RPL pool at `block_number` and derive the TWAP price from it
#[tracing::instrument(skip(pool))]
pub async fn compute_twap_price<P: TwapPool>(
    pool: &P,
    network: Network,
    block_number: u64,
) -> Result<U256> {
    let address = network
        .rpl_twap_pool_address()
        .ok_or(Error::PriceSourceUnavailable(network))?;
    tracing::info!("TWAP Address: {}", address);
    tracing::info!("Number of seconds in interval: {}", TWAP_INTERVAL_SECONDS);

    let tick_cumulatives = pool
        .observe(address, block_number, [TWAP_INTERVAL_SECONDS, 0])
        .await?;
    let observation = TickObservation {
        tick_cumulatives,
        interval: TWAP_INTERVAL_SECONDS,
    };
    tracing::debug!(average_tick = observation.average_tick()?, "observed pool ticks");

    observation.price()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe(start: i64, end: i64) -> TickObservation {
        TickObservation {
            tick_cumulatives: [start, end],
            interval: TWAP_INTERVAL_SECONDS,
        }
    }

    fn wei(value: &str) -> U256 {
        value.parse().unwrap()
    }

    #[test]
    fn flat_ticks_are_parity() {
        assert_eq!(observe(0, 0).price().unwrap(), wei("1000000000000000000"));
    }

    #[test]
    fn average_tick_rounds_down() {
        assert_eq!(observe(0, -4_320_000).average_tick().unwrap(), -100);
        assert_eq!(observe(0, -4_320_001).average_tick().unwrap(), -101);
        assert_eq!(observe(0, 4_320_000).average_tick().unwrap(), 100);
        assert_eq!(observe(0, 4_320_001).average_tick().unwrap(), 100);
        assert_eq!(observe(10, 10 + 43_199).average_tick().unwrap(), 0);
    }

    #[test]
    fn single_tick_prices() {
        assert_eq!(observe(0, 43_200).price().unwrap(), wei("999900009999000099"));
        assert_eq!(observe(0, -43_200).price().unwrap(), wei("1000100000000000000"));
    }

    #[test]
    fn negative_ticks_do_not_truncate() {
        let price = observe(0, -4_320_000).price().unwrap();
        assert_eq!(price, wei("1010049662092876569"));

        let price = observe(0, -4_320_001).price().unwrap();
        assert_eq!(price, wei("1010150667059085857"));
    }

    #[test]
    fn positive_ticks() {
        assert_eq!(observe(0, 4_320_000).price().unwrap(), wei("990050328741209482"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let observation = TickObservation {
            tick_cumulatives: [0, 100],
            interval: 0,
        };
        assert!(matches!(observation.price(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn overflowing_cumulatives_are_rejected() {
        let observation = observe(i64::MIN, i64::MAX);
        assert!(matches!(observation.average_tick(), Err(Error::InvalidState(_))));
        assert!(matches!(observation.price(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn unpriceable_ticks_are_rejected() {
        for tick in [MAX_TICK, MAX_PRICED_TICK + 1, -MAX_PRICED_TICK - 1, -MAX_TICK] {
            assert!(matches!(
                price_at_tick(tick),
                Err(Error::TickOutOfRange(t)) if t == tick
            ));
        }
    }

    #[test]
    fn ticks_beyond_the_pool_range_are_rejected() {
        assert!(matches!(
            price_at_tick(MAX_TICK + 1),
            Err(Error::TickOutOfRange(_))
        ));
        assert!(matches!(
            price_at_tick(-MAX_TICK - 1),
            Err(Error::TickOutOfRange(_))
        ));
    }
}
