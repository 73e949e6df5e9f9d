// breezly-api: Async Rust client for the Breezeway property-management API

pub mod auth;
pub mod client;
pub mod error;
pub mod kind;
pub mod record;
pub mod search;
pub mod sweep;
pub mod transport;
pub mod update;

pub use auth::{Clock, Credentials, SystemClock, TOKEN_VALIDITY, TokenManager, TokenStatus};
pub use client::{BreezewayClient, DEFAULT_BASE_URL};
pub use error::Error;
pub use kind::EntityKind;
pub use record::Record;
pub use search::SearchResult;
pub use sweep::{DEFAULT_PROPERTY_DELAY, SweepReport, SweepSource, TaskSweep, parse_timestamp};
pub use transport::{TlsMode, TransportConfig};
pub use update::{NotesUpdate, PropertyUpdate};
