//! In-memory collaborators forming the addressable object graph.
//!
//! ```text
//! Simulator (root) ── Session ──┬── Track
//!        │                      └── Car* ── Gauge*
//!        └── extensions (Plugin/...)
//! ```
//!
//! Telemetry readers own the feeding side: they call the `update` methods
//! from their poll loop while dispatch reads through the registered
//! operations. Every piece of mutable state sits behind a `parking_lot` lock.

mod car;
mod session;
mod simulator;
mod track;

pub use car::{Car, CarInfo};
pub use session::{LEADER_CAR, PLAYER_CAR, Session, SessionInfo};
pub use simulator::Simulator;
pub use track::{Track, TrackInfo};
