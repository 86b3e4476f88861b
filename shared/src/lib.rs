pub mod api;
pub mod bridge;
pub mod config;
mod de;
pub mod highlight;
pub mod live;
pub mod poll;
pub mod reconcile;
pub mod selection;
pub mod station;
pub mod time;
pub mod trip;
pub mod viewing;

pub use api::{ApiRoutes, FetchError, MapTheme};
pub use bridge::BridgeMessage;
pub use config::{AppConfig, ConfigError, PollConfig};
pub use highlight::{HighlightInbox, HighlightState, StationRole, StationStyle};
pub use live::{LiveSnapshot, TrainPosition, TripKey};
pub use poll::{PollState, PollTicket, TickOutcome, apply_tick};
pub use reconcile::{MarkerSet, MarkerSurface, ReconcileReport, SurfaceError, reconcile};
pub use selection::{Selection, Slot};
pub use station::Station;
pub use trip::{RouteStop, SearchRoute, Trip, TripSummary};
pub use viewing::{TimeMode, ViewingContext};
