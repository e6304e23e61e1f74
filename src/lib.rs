//! Bluetooth HID report registry and routing library.
//!
//! Parses the report maps a HID peer exposes into a per-device [`Registry`]
//! and routes report traffic between that registry and a radio stack back
//! end implementing [`Transport`]. The registry is built once when a device
//! is opened and queried from transport callbacks to match wire data back to
//! the report that produced it.
//!
//! Report map decoding itself lives in the [`hidreg_map`] crate, re-exported
//! here as [`map`].

#![warn(missing_debug_implementations)]
#![warn(non_ascii_idents)]
#![warn(unused_crate_dependencies)]
#![warn(unused_extern_crates)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]
#![allow(clippy::enum_glob_use)]
#![allow(clippy::inline_always)]
#![allow(clippy::module_name_repetitions)]

pub use hidreg_map as map;
pub use hidreg_map::{Protocol, ReportMap, ReportType, Usage};

pub use crate::dev::*;
pub use crate::registry::*;
pub use crate::transport::*;

mod dev;
mod registry;
mod transport;

/// Error type returned by the registry layer.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid report map: {0}")]
    Map(#[from] map::Error),
    #[error("no report with id {id} of type {typ} in {protocol} mode")]
    UnknownReport {
        id: u8,
        typ: ReportType,
        protocol: Protocol,
    },
    #[error("report value of {len} bytes where {want} are expected")]
    LengthMismatch { len: usize, want: u16 },
    #[error("unroutable {len}-byte input in {protocol} mode")]
    UnknownInput { protocol: Protocol, len: usize },
    #[error("transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a transport back end error.
    #[inline]
    pub fn transport(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport(e.into())
    }
}

/// Common registry layer result type.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) type SyncMutex<T> = parking_lot::Mutex<T>;
