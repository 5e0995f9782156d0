//! Mock remote service with artificial latency.
//!
//! # Responsibility
//! - Emulate a network round trip without any I/O.
//! - Enforce the even-total rule on saves.
//!
//! # Invariants
//! - Calls never return errors; rejections are `success: false` responses.
//! - A rejected save leaves the repository untouched.
//! - Nothing is read or written before the delay elapses, so dropping the
//!   future early has no effect on storage.

use crate::model::response::ApiResponse;
use crate::model::trade::{InputData, StoredData};
use crate::repo::record_repo::RecordRepository;
use log::{info, warn};
use std::time::{Duration, Instant};

/// Simulated round-trip time of the remote API.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1000);

pub const SAVE_OK_MESSAGE: &str = "Data saved successfully.";
pub const SAVE_ODD_TOTAL_MESSAGE: &str = "Failed to save: Total is not even.";
pub const LOAD_OK_MESSAGE: &str = "Data loaded successfully.";

/// Async facade over a [`RecordRepository`].
pub struct MockApiService<R: RecordRepository> {
    repo: R,
    latency: Duration,
}

impl<R: RecordRepository> MockApiService<R> {
    /// Creates a service with [`DEFAULT_LATENCY`].
    pub fn new(repo: R) -> Self {
        Self::with_latency(repo, DEFAULT_LATENCY)
    }

    pub fn with_latency(repo: R, latency: Duration) -> Self {
        Self { repo, latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Saves `data` after the simulated delay if its total is even.
    pub async fn save(&self, data: InputData) -> ApiResponse<StoredData> {
        let started_at = Instant::now();
        self.simulate_latency().await;

        if !data.has_even_total() {
            warn!(
                "event=api_save module=service status=rejected reason=odd_total duration_ms={}",
                started_at.elapsed().as_millis()
            );
            return ApiResponse::failure(SAVE_ODD_TOTAL_MESSAGE);
        }

        let stored = self.repo.save(&data);
        info!(
            "event=api_save module=service status=ok counter={} duration_ms={}",
            stored.counter,
            started_at.elapsed().as_millis()
        );
        ApiResponse::success(SAVE_OK_MESSAGE, stored)
    }

    /// Returns every stored record after the simulated delay.
    pub async fn load(&self) -> ApiResponse<Vec<StoredData>> {
        let started_at = Instant::now();
        self.simulate_latency().await;

        let records = self.repo.load();
        info!(
            "event=api_load module=service status=ok records={} duration_ms={}",
            records.len(),
            started_at.elapsed().as_millis()
        );
        ApiResponse::success(LOAD_OK_MESSAGE, records)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MockApiService, DEFAULT_LATENCY, SAVE_ODD_TOTAL_MESSAGE};
    use crate::model::trade::InputData;
    use crate::repo::record_repo::{MemoryRecordRepository, RecordRepository};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn save_resolves_only_after_latency() {
        let service = MockApiService::new(MemoryRecordRepository::new());
        let started = tokio::time::Instant::now();

        let response = service.save(InputData::new(10.0, 2.0, 20.0)).await;

        assert!(response.success);
        assert!(started.elapsed() >= DEFAULT_LATENCY);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_save_never_writes() {
        let service = MockApiService::new(MemoryRecordRepository::new());

        let outcome = tokio::time::timeout(
            Duration::from_millis(10),
            service.save(InputData::new(1.0, 2.0, 2.0)),
        )
        .await;

        assert!(outcome.is_err());
        assert!(service.repository().load().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn odd_total_is_a_response_not_an_error() {
        let service = MockApiService::with_latency(MemoryRecordRepository::new(), Duration::ZERO);

        let response = service.save(InputData::new(5.0, 3.0, 15.0)).await;

        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some(SAVE_ODD_TOTAL_MESSAGE));
        assert_eq!(response.data, None);
        assert!(service.repository().load().is_empty());
    }
}
