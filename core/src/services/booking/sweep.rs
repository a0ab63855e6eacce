//! Expiry sweep for lapsed booking holds.
//!
//! Lapsed PENDING holds stop reserving inventory the moment `expires_at`
//! passes, but their status rows still say PENDING. This sweep periodically
//! rewrites them to CANCELLED so status and inventory bookkeeping converge.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::{BookingRepository, ItemRepository};

use super::service::BookingService;

/// Configuration for the booking expiry sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often to run the sweep (in seconds)
    pub interval_seconds: u64,
    /// Maximum number of holds to rewrite in one cycle
    pub batch_size: usize,
    /// Whether the sweep is enabled
    pub enabled: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 900, // Run every 15 minutes
            batch_size: 500,
            enabled: true,
        }
    }
}

/// Service for rewriting lapsed holds to CANCELLED
pub struct BookingSweepService<B, I>
where
    B: BookingRepository + 'static,
    I: ItemRepository + 'static,
{
    service: Arc<BookingService<B, I>>,
    config: SweepConfig,
}

impl<B, I> BookingSweepService<B, I>
where
    B: BookingRepository + 'static,
    I: ItemRepository + 'static,
{
    /// Create a new sweep service
    pub fn new(service: Arc<BookingService<B, I>>, config: SweepConfig) -> Self {
        Self { service, config }
    }

    /// Run a single sweep cycle
    ///
    /// # Returns
    /// * `Ok(SweepResult)` - Summary of the cycle
    /// * `Err(DomainError)` - If the sweep fails
    pub async fn run_sweep(&self) -> Result<SweepResult, DomainError> {
        if !self.config.enabled {
            return Ok(SweepResult::default());
        }

        info!("Starting booking expiry sweep");

        let mut result = SweepResult::default();
        match self.service.expire_stale_pending(self.config.batch_size).await {
            Ok(count) => {
                result.holds_cancelled = count;
                info!("Sweep cancelled {} lapsed hold(s)", count);
            }
            Err(e) => {
                error!("Booking expiry sweep failed: {}", e);
                result.errors.push(format!("Sweep error: {}", e));
            }
        }

        Ok(result)
    }

    /// Start the sweep as a background task
    ///
    /// Spawns a tokio task that runs the sweep at regular intervals.
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Booking expiry sweep is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "Booking expiry sweep started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_sweep().await {
                    Ok(result) => {
                        if !result.errors.is_empty() {
                            warn!("Sweep completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Booking expiry sweep cycle failed: {}", e);
                    }
                }
            }
        });
    }
}

/// Result of a sweep cycle
#[derive(Debug, Default)]
pub struct SweepResult {
    /// Number of lapsed holds rewritten to CANCELLED
    pub holds_cancelled: usize,
    /// Any errors encountered during the cycle
    pub errors: Vec<String>,
}

impl SweepResult {
    /// Check whether the cycle completed without errors
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
