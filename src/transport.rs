//! Report transport abstraction.
//!
//! The parser and registry are transport-agnostic. A radio stack back end
//! (Bluetooth Classic HID, GATT client or server, or another host stack)
//! implements [`Transport`] to move report values and HID control requests
//! over the wire; [`crate::Device`] routes between a back end and the
//! registry without knowing which one it is talking to.

use std::fmt::Debug;

use hidreg_map::Protocol;

use crate::registry::ReportEntry;
use crate::Result;

/// Report transport back end.
///
/// Implementations report their own failures through
/// [`Error::transport`](crate::Error::transport). All calls are made with
/// the owning device record locked, so an implementation never sees two
/// calls at once.
pub trait Transport: Debug + Send {
    /// Writes a report value to the peer. `entry.handle` identifies the
    /// wire object when the back end assigned one.
    fn write_report(&mut self, entry: &ReportEntry, value: &[u8]) -> Result<()>;

    /// Reads a report value from the peer.
    fn read_report(&mut self, entry: &ReportEntry) -> Result<Vec<u8>>;

    /// Returns the peer's idle rate in 4 ms units, 0 meaning indefinite
    /// (\[HID\] Section 7.2.3).
    fn get_idle(&mut self) -> Result<u8>;

    /// Sets the peer's idle rate (\[HID\] Section 7.2.4).
    fn set_idle(&mut self, rate: u8) -> Result<()>;

    /// Returns the peer's current protocol mode (\[HID\] Section 7.2.5).
    fn get_protocol(&mut self) -> Result<Protocol>;

    /// Switches the peer to the given protocol mode
    /// (\[HID\] Section 7.2.6).
    fn set_protocol(&mut self, protocol: Protocol) -> Result<()>;
}
