#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod event;
pub mod filters;
pub mod model;
pub mod query;

use serde::{Deserialize, Serialize};

pub use app::{Annotation, App, FilterPanel, ListRow, PointDetail, UserFacingError, ViewModel};
pub use capabilities::{AuthorizationStatus, Capabilities, Effect};
pub use event::Event;
pub use filters::{FilterDraft, FilterSettings};
pub use model::{
    ElementList, ElementType, LatLon, ListSource, MapRegion, Model, PointOfInterest, ViewType,
};

/// Used until the shell hands over its configured endpoint at start-up.
pub const DEFAULT_BASE_URL: &str = "https://api.wowedo.app";

/// Viewport span when centering on the user or a selected point.
pub const SELECTED_REGION_SPAN_M: f64 = 500.0;

/// Quiet period between a category keystroke and its auto-complete lookup.
pub const CATEGORY_LOOKUP_DEBOUNCE_MS: u64 = 300;

/// The events endpoint counts pages from one.
pub const FIRST_EVENTS_PAGE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    Deserialization,
    Validation,
    Location,
    LocationPermissionDenied,
    InvalidState,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::Location => "LOCATION_ERROR",
            Self::LocationPermissionDenied => "LOCATION_PERMISSION_DENIED",
            Self::InvalidState => "INVALID_STATE",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to connect. Please check your internet connection and try again.".into()
            }
            ErrorKind::Timeout => "The request timed out. Please try again.".into(),
            ErrorKind::Deserialization => {
                "A data error occurred. Please contact support if this persists.".into()
            }
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::Location => {
                "Unable to determine your location. Please check your GPS settings.".into()
            }
            ErrorKind::LocationPermissionDenied => {
                "Location access is required to center the map on you. \
                 Please enable location permissions in Settings."
                    .into()
            }
            ErrorKind::InvalidState => {
                "The app is in an invalid state. Please restart the app.".into()
            }
            ErrorKind::Unknown => "An unexpected error occurred. Please try again.".into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ErrorKind::Network.code(), "NETWORK_ERROR");
        assert_eq!(
            ErrorKind::LocationPermissionDenied.code(),
            "LOCATION_PERMISSION_DENIED"
        );
    }

    #[test]
    fn validation_errors_surface_their_own_message() {
        let error = AppError::new(ErrorKind::Validation, "latitude out of range");
        assert_eq!(error.user_facing_message(), "latitude out of range");
        assert_eq!(error.to_string(), "[VALIDATION_ERROR] latitude out of range");
    }
}
