use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Device location authorization, mirroring the platform's states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    AuthorizedWhenInUse,
    Denied,
    Restricted,
}

impl AuthorizationStatus {
    #[must_use]
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::AuthorizedWhenInUse)
    }

    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Denied | Self::Restricted)
    }

    #[must_use]
    pub const fn needs_request(self) -> bool {
        matches!(self, Self::NotDetermined)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op")]
pub enum LocationOperation {
    AuthorizationStatus,
    RequestWhenInUseAuthorization,
    CurrentCoordinate,
    StartUpdates,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationError {
    #[error("location services are disabled on this device")]
    ServicesDisabled,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("no position fix available")]
    PositionUnavailable,

    #[error("location error: {message}")]
    Unknown { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum LocationOutput {
    Status(AuthorizationStatus),
    Coordinate { lat: f64, lon: f64 },
    UpdatesStarted,
}

pub type LocationResult = Result<LocationOutput, LocationError>;

impl Operation for LocationOperation {
    type Output = LocationResult;
}

/// Capability seam over the shell's positioning service.
///
/// Authorization prompts and coordinate fixes resolve through the shell on
/// whatever thread the platform delivers them; results re-enter the core
/// as events, so state mutation stays on the core's single update path.
pub struct Location<Ev> {
    context: CapabilityContext<LocationOperation, Ev>,
}

impl<Ev> std::fmt::Debug for Location<Ev> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Location").finish_non_exhaustive()
    }
}

impl<Ev> Clone for Location<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<Ev> Location<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, Ev>) -> Self {
        Self { context }
    }

    /// Reads the current authorization state without prompting.
    pub fn authorization_status<F>(&self, event: F)
    where
        F: FnOnce(AuthorizationStatus) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(LocationOperation::AuthorizationStatus)
                .await;
            context.update_app(event(status_of(result)));
        });
    }

    /// Asks the platform to show the when-in-use permission prompt and
    /// reports the user's decision.
    pub fn request_when_in_use_authorization<F>(&self, event: F)
    where
        F: FnOnce(AuthorizationStatus) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(LocationOperation::RequestWhenInUseAuthorization)
                .await;
            context.update_app(event(status_of(result)));
        });
    }

    /// One-shot fix of the device's current coordinate.
    pub fn current_coordinate<F>(&self, event: F)
    where
        F: FnOnce(LocationResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(LocationOperation::CurrentCoordinate)
                .await;
            context.update_app(event(result));
        });
    }

    /// Tells the shell to begin streaming coordinate updates; each fix
    /// arrives later as its own event from the shell.
    pub fn start_updates(&self) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(LocationOperation::StartUpdates).await;
        });
    }
}

/// A failed or malformed status probe reads as "not determined": the
/// caller will simply re-request, which is always safe.
fn status_of(result: LocationResult) -> AuthorizationStatus {
    match result {
        Ok(LocationOutput::Status(status)) => status,
        _ => AuthorizationStatus::NotDetermined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_status_checks() {
        assert!(AuthorizationStatus::AuthorizedWhenInUse.is_authorized());
        assert!(!AuthorizationStatus::Denied.is_authorized());
        assert!(!AuthorizationStatus::NotDetermined.is_authorized());

        assert!(AuthorizationStatus::Denied.is_denied());
        assert!(AuthorizationStatus::Restricted.is_denied());
        assert!(!AuthorizationStatus::AuthorizedWhenInUse.is_denied());

        assert!(AuthorizationStatus::NotDetermined.needs_request());
        assert!(!AuthorizationStatus::Restricted.needs_request());
    }

    #[test]
    fn status_extraction_defaults_to_not_determined() {
        assert_eq!(
            status_of(Ok(LocationOutput::Status(AuthorizationStatus::Denied))),
            AuthorizationStatus::Denied
        );
        assert_eq!(
            status_of(Ok(LocationOutput::UpdatesStarted)),
            AuthorizationStatus::NotDetermined
        );
        assert_eq!(
            status_of(Err(LocationError::ServicesDisabled)),
            AuthorizationStatus::NotDetermined
        );
    }

    #[test]
    fn operation_serialization_round_trips() {
        let op = LocationOperation::RequestWhenInUseAuthorization;
        let json = serde_json::to_string(&op).unwrap();
        let back: LocationOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }

    #[test]
    fn output_serialization_round_trips() {
        let output = LocationOutput::Coordinate {
            lat: 45.46,
            lon: 9.19,
        };
        let json = serde_json::to_string(&output).unwrap();
        let back: LocationOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(output, back);
    }
}
