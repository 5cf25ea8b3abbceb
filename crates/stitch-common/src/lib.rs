//! Common types shared across the stitch crates and services.

pub mod error;
pub mod request;
pub mod tile;
pub mod time;
pub mod transport;

pub use error::{StitchError, StitchResult};
pub use request::{parse_filter_spec, BuildRequest, FilterContext, FilterInvocation};
pub use tile::{ProductId, TileKey};
pub use time::Timestamp;
pub use transport::{Transport, TransportError};
