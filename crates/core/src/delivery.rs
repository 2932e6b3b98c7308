//! Delivery
//!
//! Postal code serviceability. The state only changes through an explicit check; it is never
//! inferred from other data.

use serde::{Deserialize, Serialize};

/// Message used when the backend says a postal code is not served.
pub const NOT_SERVICEABLE_MESSAGE: &str = "Not Serviceable in this area yet.";

/// Message used when the backend could not be reached.
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection Error";

/// Whether delivery is offered to the checked postal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Serviceability {
    /// No check has been made.
    #[default]
    Unknown,

    /// The last check succeeded.
    Serviceable,

    /// The last check was refused or failed.
    NotServiceable,
}

/// Result of a serviceability check the backend answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceabilityCheck {
    /// Delivery is available.
    Serviceable {
        /// City served.
        city: Option<String>,

        /// Expected delivery time in hours.
        delivery_time_hrs: Option<u32>,

        /// Diagnostic text from the backend.
        debug_log: Option<String>,
    },

    /// Delivery is not available.
    NotServiceable {
        /// Message from the backend, if it sent one.
        message: Option<String>,

        /// Diagnostic text from the backend.
        debug_log: Option<String>,
    },
}

/// Delivery state for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryState {
    zip_code: Option<String>,
    city: Option<String>,
    delivery_time_hrs: Option<u32>,
    serviceability: Serviceability,
    is_loading: bool,
    error: Option<String>,
    last_debug_log: Option<String>,
}

impl DeliveryState {
    /// Create an unchecked state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unchecked state remembering a previously entered postal code.
    pub fn with_zip_code(zip_code: Option<String>) -> Self {
        Self {
            zip_code,
            ..Self::default()
        }
    }

    /// Postal code last entered.
    pub fn zip_code(&self) -> Option<&str> {
        self.zip_code.as_deref()
    }

    /// City served, from the last successful check.
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Expected delivery time, from the last successful check.
    pub fn delivery_time_hrs(&self) -> Option<u32> {
        self.delivery_time_hrs
    }

    /// Serviceability from the last check.
    pub fn serviceability(&self) -> Serviceability {
        self.serviceability
    }

    /// Whether the last check succeeded.
    pub fn is_serviceable(&self) -> bool {
        self.serviceability == Serviceability::Serviceable
    }

    /// Whether a check is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message from the last refused or failed check.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Diagnostic text from the last answered check.
    pub fn last_debug_log(&self) -> Option<&str> {
        self.last_debug_log.as_deref()
    }

    /// Remember `zip_code` as the one being checked.
    ///
    /// A different postal code discards the previous verdict, so serviceability, city and
    /// delivery time always describe the current code.
    pub fn set_zip_code(&mut self, zip_code: impl Into<String>) {
        let zip_code = zip_code.into();

        if self.zip_code.as_deref() != Some(zip_code.as_str()) {
            self.serviceability = Serviceability::Unknown;
            self.city = None;
            self.delivery_time_hrs = None;
            self.error = None;
        }

        self.zip_code = Some(zip_code);
    }

    /// Mark a check as started.
    pub fn begin_check(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Apply an answered check.
    ///
    /// A refusal clears the city and delivery time from any earlier successful check.
    pub fn record_check(&mut self, check: ServiceabilityCheck) {
        self.is_loading = false;

        match check {
            ServiceabilityCheck::Serviceable {
                city,
                delivery_time_hrs,
                debug_log,
            } => {
                self.serviceability = Serviceability::Serviceable;
                self.city = city;
                self.delivery_time_hrs = delivery_time_hrs;
                self.error = None;
                self.last_debug_log = debug_log;
            }
            ServiceabilityCheck::NotServiceable { message, debug_log } => {
                self.mark_not_serviceable(
                    message.unwrap_or_else(|| NOT_SERVICEABLE_MESSAGE.to_string()),
                );
                self.last_debug_log = debug_log;
            }
        }
    }

    /// Apply a check that never reached the backend.
    pub fn record_failure(&mut self, message: Option<String>) {
        self.is_loading = false;
        self.mark_not_serviceable(message.unwrap_or_else(|| CONNECTION_ERROR_MESSAGE.to_string()));
    }

    /// Forget everything, including the postal code.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn mark_not_serviceable(&mut self, message: String) {
        self.serviceability = Serviceability::NotServiceable;
        self.city = None;
        self.delivery_time_hrs = None;
        self.error = Some(message);
    }
}
