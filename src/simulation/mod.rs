//! # Synthetic Collaborators
//!
//! Clearly labelled synthetic stand-ins for the external forecasting,
//! weather and text-generation services. Used by the demo binary and by
//! tests; nothing here pretends to be a real service response.
//!
//! ## Components
//!
//! - **HvacLoadProfile**: diurnal HVAC load and outdoor temperature curves with seeded noise
//! - **SyntheticLoadForecaster**: [`LoadForecaster`](crate::forecast::LoadForecaster) over the profile
//! - **SyntheticWeather**: [`WeatherProvider`](crate::forecast::WeatherProvider) over the outdoor curve
//! - **ScriptedRecommendations**: fixed candidate list for the comfort engine
//!
//! ## Usage
//!
//! ```rust
//! use hvac_optimizer::simulation::{synthetic_history, HvacLoadProfile};
//! use chrono::{FixedOffset, TimeZone};
//!
//! let start = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
//! let profile = HvacLoadProfile::default().with_random_seed(7);
//!
//! // One week of hourly metering
//! let history = synthetic_history(&profile, start, 7).unwrap();
//! assert_eq!(history.len(), 7 * 24);
//! ```

pub mod profile;
pub mod recommendations;
pub mod weather;

use std::sync::atomic::{AtomicBool, Ordering};

pub use profile::{synthetic_history, HvacLoadProfile, SyntheticLoadForecaster};
pub use recommendations::ScriptedRecommendations;
pub use weather::SyntheticWeather;

/// Connection flag shared by the synthetic services.
#[derive(Debug, Default)]
pub(crate) struct SimulatedConnection {
    connected: AtomicBool,
}

impl SimulatedConnection {
    pub(crate) fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    pub(crate) fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
