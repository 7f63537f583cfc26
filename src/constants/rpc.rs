//! Default values for RPC access and provider retry behavior.

/// Public endpoint used when `RPC_URLS` is not configured.
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Default per-request timeout (in milliseconds) for RPC calls.
///
/// A request that exceeds this budget is treated downstream exactly like a
/// "not found" response, so a hung endpoint cannot stall a classification pass.
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 30_000;

/// Maximum number of signatures accepted by `getSignatureStatuses` in one call.
/// Larger sets are chunked by the provider.
pub const SIGNATURE_STATUS_BATCH_SIZE: usize = 256;

/// Default number of attempts for a retriable RPC operation.
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;

/// Default base delay (in milliseconds) for exponential retry backoff.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;

/// Consecutive failures before an endpoint is paused by the selector.
pub const DEFAULT_ENDPOINT_FAILURE_THRESHOLD: u32 = 3;

/// How long (in seconds) a paused endpoint is excluded from selection.
pub const DEFAULT_ENDPOINT_PAUSE_DURATION_SECS: u64 = 60;
