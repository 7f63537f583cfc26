//! # Solana Wallet Health
//!
//! Library for classifying the lifecycle state of a wallet's transactions and
//! reducing them to a single health indicator.
//!
//! Given a wallet address, the monitor fetches the address's recent signature
//! history, resolves each signature's state through a batched status lookup
//! with a two-stage direct-fetch fallback, determines whether each transaction
//! was initiated by the wallet, and folds the results into
//! [`models::TransactionMetrics`] and a derived [`models::WalletStatus`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use solana_wallet_health::{config::MonitorConfig, services::SolanaProvider, TransactionMonitor};
//!
//! # async fn run() -> eyre::Result<()> {
//! let config = MonitorConfig::from_env();
//! let provider = SolanaProvider::new(config.rpc_urls.clone(), config.timeout_seconds())?;
//! let monitor = TransactionMonitor::new(Arc::new(provider));
//! let report = monitor.wallet_report("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin").await?;
//! println!("{}: {:?}", report.status, report.metrics);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod domain;
pub mod logging;
pub mod models;
pub mod services;

pub use domain::{MonitorError, TransactionMonitor};
pub use models::{TransactionMetrics, TransactionRecord, TransactionState, WalletReport, WalletStatus};
