//! GPS acquisition and verification.
//!
//! Every clock transition goes through [`LocationVerifier::verify`], which
//! acquires a fix from the platform [`LocationProvider`] and rejects it when
//! acquisition times out, the sample comes from a mock provider, or the
//! reported accuracy is worse than the configured threshold.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::VerificationConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::GpsSample;

/// Platform seam for obtaining a GPS fix.
///
/// Production implementations wrap the device location stack; tests use
/// scripted fakes.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Acquires a single fix. May take arbitrarily long; the verifier
    /// enforces the timeout.
    async fn acquire(&self) -> EngineResult<GpsSample>;
}

/// Applies the acquisition timeout and sample-quality policy on top of a
/// [`LocationProvider`].
pub struct LocationVerifier {
    provider: Arc<dyn LocationProvider>,
    config: VerificationConfig,
}

impl LocationVerifier {
    /// Wraps a provider with the given verification policy.
    pub fn new(provider: Arc<dyn LocationProvider>, config: VerificationConfig) -> Self {
        Self { provider, config }
    }

    /// The verification policy in force.
    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Acquires and vets a fix.
    ///
    /// Fails with [`EngineError::AcquisitionTimeout`] when no fix arrives in
    /// time, [`EngineError::SpoofDetected`] for mock-sourced samples, and
    /// [`EngineError::AccuracyInsufficient`] when the fix is too coarse.
    /// Geofence containment is checked by the caller, which knows the site.
    pub async fn verify(&self) -> EngineResult<GpsSample> {
        let timeout = Duration::from_secs(self.config.acquisition_timeout_secs);
        let sample = tokio::time::timeout(timeout, self.provider.acquire())
            .await
            .map_err(|_| EngineError::AcquisitionTimeout {
                timeout_secs: self.config.acquisition_timeout_secs,
            })??;

        if sample.is_mock_source {
            return Err(EngineError::SpoofDetected);
        }
        if sample.accuracy_meters > self.config.accuracy_threshold_meters {
            return Err(EngineError::AccuracyInsufficient {
                measured_meters: sample.accuracy_meters,
                threshold_meters: self.config.accuracy_threshold_meters,
            });
        }

        debug!(
            accuracy = sample.accuracy_meters,
            "location fix accepted"
        );
        Ok(sample)
    }
}
