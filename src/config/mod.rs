//! Policy configuration for the CAO compliance engine.
//!
//! Premium multipliers, working limits, and verification thresholds are
//! deployment policy, loaded from YAML or taken from defaults.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BreakRequirement, CaoConfig, CaoMetadata, InferenceConfig, LimitsConfig, NightWindow,
    PremiumConfig, PremiumRates, VerificationConfig, WorkingLimits,
};
