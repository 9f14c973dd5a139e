mod delay;
mod location;

pub use self::delay::{Delay, DelayOperation};
pub use self::location::{
    AuthorizationStatus, Location, LocationError, LocationOperation, LocationOutput,
    LocationResult,
};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

pub type AppHttp = Http<Event>;
pub type AppRender = Render<Event>;
pub type AppLocation = Location<Event>;
pub type AppDelay = Delay<Event>;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub http: Http<Event>,
    pub location: Location<Event>,
    pub delay: Delay<Event>,
}
