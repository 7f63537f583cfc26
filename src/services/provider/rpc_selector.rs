//! # RPC Endpoint Selector
//!
//! Weighted round-robin selection over configured RPC endpoints with failure
//! tracking: an endpoint that accumulates consecutive failures is paused for a
//! period and automatically recovers when the pause elapses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use log::info;
use parking_lot::RwLock;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::constants::{DEFAULT_ENDPOINT_FAILURE_THRESHOLD, DEFAULT_ENDPOINT_PAUSE_DURATION_SECS};
use crate::models::RpcConfig;

#[derive(Error, Debug, Serialize)]
pub enum RpcSelectorError {
    #[error("No providers available")]
    NoProviders,
    #[error("All available providers have failed")]
    AllProvidersFailed,
}

#[derive(Debug, Default)]
struct EndpointHealth {
    consecutive_failures: u32,
    paused_until: Option<Instant>,
}

/// Manages selection of RPC endpoints based on configuration.
#[derive(Debug)]
pub struct RpcSelector {
    configs: Vec<RpcConfig>,
    /// Ring of config indices, repeated per weight so heavier endpoints are
    /// selected proportionally more often.
    ring: Vec<usize>,
    next_position: AtomicUsize,
    health: RwLock<HashMap<String, EndpointHealth>>,
    failure_threshold: u32,
    pause_duration: Duration,
}

impl RpcSelector {
    pub fn new(
        configs: Vec<RpcConfig>,
        failure_threshold: u32,
        pause_duration_secs: u64,
    ) -> Result<Self, RpcSelectorError> {
        if configs.is_empty() {
            return Err(RpcSelectorError::NoProviders);
        }

        let ring: Vec<usize> = configs
            .iter()
            .enumerate()
            .flat_map(|(index, config)| {
                std::iter::repeat(index).take(config.get_weight().max(1) as usize)
            })
            .collect();

        // Randomized start so restarts don't always hit the same endpoint first.
        let start = rand::rng().random_range(0..ring.len());

        Ok(Self {
            configs,
            ring,
            next_position: AtomicUsize::new(start),
            health: RwLock::new(HashMap::new()),
            failure_threshold,
            pause_duration: Duration::from_secs(pause_duration_secs),
        })
    }

    /// Creates a selector with the default failure threshold and pause duration.
    pub fn new_with_defaults(configs: Vec<RpcConfig>) -> Result<Self, RpcSelectorError> {
        Self::new(
            configs,
            DEFAULT_ENDPOINT_FAILURE_THRESHOLD,
            DEFAULT_ENDPOINT_PAUSE_DURATION_SECS,
        )
    }

    pub fn provider_count(&self) -> usize {
        self.configs.len()
    }

    /// Number of endpoints currently eligible for selection.
    pub fn available_provider_count(&self) -> usize {
        self.configs
            .iter()
            .filter(|config| !self.is_paused(&config.url))
            .count()
    }

    fn is_paused(&self, url: &str) -> bool {
        let health = self.health.read();
        health
            .get(url)
            .and_then(|entry| entry.paused_until)
            .is_some_and(|until| until > Instant::now())
    }

    /// Picks the next endpoint URL, skipping paused endpoints.
    pub fn select_url(&self) -> Result<String, RpcSelectorError> {
        for _ in 0..self.ring.len() {
            let position = self.next_position.fetch_add(1, Ordering::Relaxed) % self.ring.len();
            let config = &self.configs[self.ring[position]];
            if !self.is_paused(&config.url) {
                return Ok(config.url.clone());
            }
        }
        Err(RpcSelectorError::AllProvidersFailed)
    }

    /// Records a failure for the endpoint; endpoints reaching the failure
    /// threshold are paused for the configured duration.
    pub fn mark_failed(&self, url: &str) {
        let mut health = self.health.write();
        let entry = health.entry(url.to_string()).or_default();
        entry.consecutive_failures += 1;
        if entry.consecutive_failures >= self.failure_threshold {
            info!(
                "pausing RPC endpoint {url} for {}s after {} consecutive failures",
                self.pause_duration.as_secs(),
                entry.consecutive_failures
            );
            entry.paused_until = Some(Instant::now() + self.pause_duration);
            entry.consecutive_failures = 0;
        }
    }

    /// Resets the failure counter after a successful call.
    pub fn mark_succeeded(&self, url: &str) {
        let mut health = self.health.write();
        if let Some(entry) = health.get_mut(url) {
            entry.consecutive_failures = 0;
        }
    }
}
