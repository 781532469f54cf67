// Copyright 2024 RISC Zero, Inc.
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

mod beacon_client;
mod execution;
mod state_dir;

use anyhow::Result;
use beacon_client::BeaconHttpClient;
use clap::{Parser, ValueEnum};
use execution::ExecutionRpc;
use rocketpool_oracle_core::{Network, Oracle};
use state_dir::StateDir;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Dry-run the Rocket Pool oracle DAO duties against a past or current block
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Execution client HTTP RPC endpoint.
    #[clap(long, env)]
    eth_rpc_url: Url,

    /// Ethereum beacon node HTTP RPC endpoint.
    #[clap(long, env)]
    beacon_rpc_url: Url,

    #[clap(long, env, value_enum, default_value_t = NetworkArg::Mainnet)]
    network: NetworkArg,

    /// Execution layer block to evaluate the duty at. Uses the chain head if omitted
    #[clap(long, short = 't')]
    target_block: Option<u64>,

    /// Directory holding the network state snapshots
    #[clap(long, env, default_value = "./state")]
    state_dir: PathBuf,

    #[clap(long, env, default_value = "./beacon-cache")]
    cache_dir: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NetworkArg {
    Mainnet,
    Prater,
    Zhejiang,
}

impl From<NetworkArg> for Network {
    fn from(value: NetworkArg) -> Self {
        match value {
            NetworkArg::Mainnet => Network::Mainnet,
            NetworkArg::Prater => Network::Prater,
            NetworkArg::Zhejiang => Network::Zhejiang,
        }
    }
}

/// Oracle DAO duties that can be simulated.
#[derive(Parser, Debug)]
enum Command {
    /// Calculate the RPL price the oracle DAO would submit
    #[clap(alias = "p")]
    SubmitRplPrice,
    /// Calculate the network balances the oracle DAO would submit
    #[clap(alias = "b")]
    SubmitNetworkBalances,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let execution = ExecutionRpc::new(args.eth_rpc_url);
    let beacon = BeaconHttpClient::new_with_cache(args.beacon_rpc_url, &args.cache_dir)?;
    let states = StateDir::new(args.state_dir);
    let oracle = Oracle::new(execution.clone(), beacon, states.clone(), args.network.into());

    let output = match args.command {
        Command::SubmitRplPrice => oracle
            .rpl_price(args.target_block, &execution)
            .await
            .map(|price| price.to_string()),
        Command::SubmitNetworkBalances => oracle
            .network_balances(args.target_block, &states)
            .await
            .and_then(|balances| {
                serde_json::to_string_pretty(&balances).map_err(|e| {
                    rocketpool_oracle_core::Error::InvalidState(format!(
                        "could not serialize balances: {e}"
                    ))
                })
            }),
    };

    match output {
        Ok(output) => writeln!(std::io::stdout(), "{output}")?,
        Err(e) if e.is_disabled() => tracing::info!("{}", e),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
