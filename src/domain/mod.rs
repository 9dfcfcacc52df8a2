//! Transport-agnostic value types shared by the lifecycle, registry and
//! transport layers.

mod address;
mod id;
mod settings;
mod state;
mod stats;

pub use address::TargetAddress;
pub use id::{ConnectionId, ConnectionIdGenerator};
pub use settings::{ConnectionSettings, SocketOption};
pub use state::ConnectionState;
pub use stats::LifecycleStats;
