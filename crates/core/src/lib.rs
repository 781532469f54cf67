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

mod balances;
mod duties;
mod error;
pub mod minipool;
pub mod network;
pub mod price;
pub mod provider;
pub mod slot;
pub mod state;
pub mod units;

pub use balances::{compute_network_balances, NetworkBalances};
pub use duties::Oracle;
pub use error::{Duty, Error, Result};
pub use network::Network;
pub use price::{compute_twap_price, TickObservation, TWAP_INTERVAL_SECONDS};
