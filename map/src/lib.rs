#![doc = include_str!("../README.md")]
#![no_std]
#![warn(unused_crate_dependencies)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

use core::fmt;

pub use report::*;
pub use usage::{Appearance, Usage};

pub mod descriptor;
mod report;
pub mod usage;

/// Report type (\[HID\] Section 7.2.1).
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    enum_iterator::Sequence,
    num_enum::TryFromPrimitive,
)]
#[repr(u8)]
pub enum ReportType {
    Input = 1,
    Output = 2,
    Feature = 3,
}

impl ReportType {
    /// Returns the report type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "INPUT",
            Self::Output => "OUTPUT",
            Self::Feature => "FEATURE",
        }
    }

    /// Returns the name for a raw report type value, or `"UNKNOWN"` if the
    /// value is out of range.
    #[must_use]
    pub fn name(v: u8) -> &'static str {
        Self::try_from(v).map_or("UNKNOWN", Self::as_str)
    }

    /// Returns whether this is an input report.
    #[inline(always)]
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Self::Input)
    }
}

impl fmt::Display for ReportType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Protocol mode (\[HID\] Section 7.2.5).
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    enum_iterator::Sequence,
    num_enum::TryFromPrimitive,
)]
#[repr(u8)]
pub enum Protocol {
    Boot = 0,
    Report = 1,
}

impl Default for Protocol {
    #[inline(always)]
    fn default() -> Self {
        Self::Report
    }
}

impl Protocol {
    /// Returns the protocol mode name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boot => "BOOT",
            Self::Report => "REPORT",
        }
    }

    /// Returns the name for a raw protocol mode value, or `"UNKNOWN"` if
    /// the value is out of range.
    #[must_use]
    pub fn name(v: u8) -> &'static str {
        Self::try_from(v).map_or("UNKNOWN", Self::as_str)
    }
}

impl fmt::Display for Protocol {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Report map parse error. Every error aborts the whole parse; no partial
/// map is ever returned.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The descriptor ends in the middle of an item.
    Truncated,
    /// An application collection prologue expected one item and got another.
    UnexpectedTag { want: descriptor::Tag, got: u8 },
    /// Accumulated report bits do not form whole bytes at a report boundary.
    UnalignedReport { id: u8 },
    /// The descriptor declares more than [`MAX_REPORTS`] reports.
    TooManyReports,
    /// A report value longer than a report can carry.
    ReportTooLong,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Truncated => f.write_str("truncated item"),
            Self::UnexpectedTag { want, got } => {
                write!(f, "expected {want:?} item, got tag {got:#04X}")
            }
            Self::UnalignedReport { id } => {
                write!(f, "report {id} is not a whole number of bytes")
            }
            Self::TooManyReports => f.write_str("too many reports"),
            Self::ReportTooLong => f.write_str("report value too long"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
