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

use http_cache_reqwest::{CACacheManager, Cache, CacheMode, HttpCache, HttpCacheOptions};
use reqwest::IntoUrl;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use rocketpool_oracle_core::provider::BeaconClient;
use rocketpool_oracle_core::state::BeaconConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Errors returned by the [BeaconHttpClient].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not parse URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON request middleware failed: {0}")]
    Middleware(#[from] reqwest_middleware::Error),
    #[error("invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Response returned by the `genesis` API.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenesisResponse {
    pub genesis_time: String,
}

/// The subset of the chain config returned by the `spec` API that the oracle uses.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SpecResponse {
    pub seconds_per_slot: String,
    pub slots_per_epoch: String,
}

/// Wrapper returned by the API calls.
#[derive(Serialize, Deserialize)]
struct Response<T> {
    data: T,
    #[serde(flatten)]
    meta: HashMap<String, serde_json::Value>,
}

/// Simple beacon API client that reads the chain's timing config.
pub struct BeaconHttpClient {
    http: ClientWithMiddleware,
    endpoint: Url,
}

impl BeaconHttpClient {
    /// Creates a new beacon endpoint API client with caching.
    pub fn new_with_cache<U: IntoUrl>(endpoint: U, cache_dir: &str) -> Result<Self, Error> {
        let client = reqwest::Client::new();
        let manager = CACacheManager {
            path: cache_dir.into(),
        };
        // genesis and spec never change for a given endpoint
        let cache = Cache(HttpCache {
            mode: CacheMode::ForceCache,
            manager,
            options: HttpCacheOptions::default(),
        });
        let client_with_middleware = ClientBuilder::new(client).with(cache).build();

        Ok(Self {
            http: client_with_middleware,
            endpoint: endpoint.into_url()?,
        })
    }

    async fn http_get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let target = self.endpoint.join(path)?;
        let resp = self.http.get(target).send().await?;
        let value = resp.error_for_status()?.json().await?;
        Ok(value)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_genesis(&self) -> Result<GenesisResponse, Error> {
        let result: Response<GenesisResponse> = self.http_get("eth/v1/beacon/genesis").await?;
        Ok(result.data)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_spec(&self) -> Result<SpecResponse, Error> {
        let result: Response<SpecResponse> = self.http_get("eth/v1/config/spec").await?;
        Ok(result.data)
    }

    /// Genesis time and slot timing of the connected chain.
    pub async fn get_beacon_config(&self) -> Result<BeaconConfig, Error> {
        let genesis = self.get_genesis().await?;
        let spec = self.get_spec().await?;
        beacon_config(&genesis, &spec)
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<u64, Error> {
    value.parse().map_err(|_| Error::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn beacon_config(genesis: &GenesisResponse, spec: &SpecResponse) -> Result<BeaconConfig, Error> {
    Ok(BeaconConfig {
        genesis_time: parse_field("genesis_time", &genesis.genesis_time)?,
        seconds_per_slot: parse_field("SECONDS_PER_SLOT", &spec.seconds_per_slot)?,
        slots_per_epoch: parse_field("SLOTS_PER_EPOCH", &spec.slots_per_epoch)?,
    })
}

impl BeaconClient for BeaconHttpClient {
    async fn eth2_config(&self) -> rocketpool_oracle_core::Result<BeaconConfig> {
        self.get_beacon_config().await.map_err(|e| {
            rocketpool_oracle_core::Error::upstream("error getting beacon config", e)
        })
    }
}
