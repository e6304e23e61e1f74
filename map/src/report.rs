//! Report map parsing.
//!
//! A report map describes every report a device multiplexes over one
//! connection: its ID, direction, value length, and the application
//! collection it belongs to. [`ReportMap::parse`] walks the encoded
//! descriptor once and flattens it into that table, synthesizing the fixed
//! boot protocol entries (\[HID\] Appendix B) for keyboards and mice so that
//! hosts can route boot mode traffic without re-reading the descriptor.

use alloc::vec::Vec;

use crate::descriptor::{Collection, Items, Tag};
use crate::usage::{Appearance, Usage, UsageSet};
use crate::{Error, Protocol, ReportType};

/// Upper bound on the number of reports accepted from one descriptor.
/// Parsing fails with [`Error::TooManyReports`] beyond it.
pub const MAX_REPORTS: usize = 64;

/// Boot protocol report value lengths (\[HID\] Appendix B).
const BOOT_KBD_INPUT: u16 = 8;
const BOOT_KBD_OUTPUT: u16 = 1;
const BOOT_MOUSE_INPUT: u16 = 3;

/// One report declared by a report map.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReportItem {
    /// Report ID, 0 when the map does not use IDs.
    pub id: u8,
    /// Report direction.
    pub typ: ReportType,
    /// Protocol mode the report is exchanged in.
    pub protocol: Protocol,
    /// Category of the application collection that declared the report.
    pub usage: Usage,
    /// Report value length in bytes, excluding the ID prefix.
    pub len: u16,
}

/// Parsed report map. Reports keep their discovery order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportMap {
    usage: Usage,
    appearance: Appearance,
    reports: Vec<ReportItem>,
}

impl ReportMap {
    /// Parses an encoded report descriptor into the flat report table.
    ///
    /// Any error discards the partial table; a map is either fully usable
    /// or not at all.
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        let mut p = Parser::default();
        for item in Items::new(data) {
            let (tag, _, v) = item?;
            p.item(tag, v)?;
        }
        Ok(p.finish())
    }

    /// Returns the dominant category over all reports in the map.
    #[inline(always)]
    #[must_use]
    pub const fn usage(&self) -> Usage {
        self.usage
    }

    /// Returns the appearance code matching the dominant category.
    #[inline(always)]
    #[must_use]
    pub const fn appearance(&self) -> Appearance {
        self.appearance
    }

    /// Returns the reports in discovery order.
    #[inline(always)]
    #[must_use]
    pub fn reports(&self) -> &[ReportItem] {
        &self.reports
    }
}

/// Parse step. Each top-level application collection must open with the
/// usage page, usage, collection item sequence; everything else happens
/// between the collection open and its matching close.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Step {
    #[default]
    UsagePage,
    Usage,
    Collection,
    Body,
}

/// Single-pass descriptor walker. One instance lives on the stack for the
/// duration of one [`ReportMap::parse`] call.
#[derive(Debug, Default)]
struct Parser {
    step: Step,
    /// Usage context of the current top-level collection.
    usage_page: u16,
    usage: u16,
    /// Usage context declared inside the collection body. Becomes the
    /// top-level context when a new report ID starts a new chunk.
    inner_usage_page: u16,
    inner_usage: u16,
    /// Current report ID, 0 until the first REPORT_ID item.
    report_id: u8,
    depth: u32,
    report_size: u32,
    report_count: u32,
    /// Accumulated input/output/feature bits since the last report boundary.
    bits: [u64; 3],
    seen: UsageSet,
    reports: Vec<ReportItem>,
}

impl Parser {
    #[allow(clippy::cast_possible_truncation)]
    fn item(&mut self, tag: u8, v: u32) -> Result<(), Error> {
        match self.step {
            Step::UsagePage => {
                expect(Tag::UsagePage, tag)?;
                self.usage_page = v as u16;
                self.report_size = 0;
                self.report_count = 0;
                self.bits = [0; 3];
                self.step = Step::Usage;
            }
            Step::Usage => {
                expect(Tag::Usage, tag)?;
                self.usage = v as u16;
                self.step = Step::Collection;
            }
            Step::Collection => {
                expect(Tag::Collection, tag)?;
                if v != Collection::Application as u32 {
                    return Err(Error::UnexpectedTag {
                        want: Tag::Collection,
                        got: tag,
                    });
                }
                self.report_id = 0;
                self.depth = 1;
                self.inner_usage_page = self.usage_page;
                self.inner_usage = self.usage;
                self.step = Step::Body;
            }
            Step::Body => return self.body(tag, v),
        }
        Ok(())
    }

    /// Handles one item inside an application collection. Tags that do not
    /// affect report layout are skipped.
    #[allow(clippy::cast_possible_truncation)]
    fn body(&mut self, tag: u8, v: u32) -> Result<(), Error> {
        let Ok(tag) = Tag::try_from(tag) else {
            return Ok(());
        };
        match tag {
            Tag::ReportId => {
                let id = v as u8;
                if self.report_id != 0 && self.report_id != id {
                    self.flush()?;
                    // The next chunk belongs to the usage context declared
                    // since the previous boundary.
                    self.usage_page = self.inner_usage_page;
                    self.usage = self.inner_usage;
                }
                self.report_id = id;
            }
            Tag::UsagePage => self.inner_usage_page = v as u16,
            Tag::Usage => self.inner_usage = v as u16,
            Tag::ReportSize => self.report_size = v,
            Tag::ReportCount => self.report_count = v,
            Tag::Input => self.add_bits(ReportType::Input),
            Tag::Output => self.add_bits(ReportType::Output),
            Tag::Feature => self.add_bits(ReportType::Feature),
            Tag::Collection => self.depth += 1,
            Tag::EndCollection => {
                self.depth -= 1;
                if self.depth == 0 {
                    self.flush()?;
                    self.step = Step::UsagePage;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Accumulates the field bits of one INPUT, OUTPUT, or FEATURE item.
    fn add_bits(&mut self, typ: ReportType) {
        let n = u64::from(self.report_size) * u64::from(self.report_count);
        let bits = &mut self.bits[typ as usize - 1];
        *bits = bits.saturating_add(n);
    }

    /// Closes out the current report chunk: verifies byte alignment,
    /// classifies the chunk, and emits its table entries. Keyboard and mouse
    /// chunks additionally get the synthesized boot protocol entries.
    fn flush(&mut self) -> Result<(), Error> {
        if self.bits.iter().any(|b| b % 8 != 0) {
            return Err(Error::UnalignedReport { id: self.report_id });
        }
        let len = |bits: u64| u16::try_from(bits / 8).map_err(|_| Error::ReportTooLong);
        let (input, output, feature) =
            (len(self.bits[0])?, len(self.bits[1])?, len(self.bits[2])?);
        self.bits = [0; 3];

        let usage = Usage::classify(self.usage_page, self.usage);
        self.seen |= usage.flag();
        use {Protocol::*, ReportType::*};
        match usage {
            Usage::Keyboard => {
                if input > 0 {
                    self.push(Input, Report, usage, input)?;
                    self.push(Input, Boot, usage, BOOT_KBD_INPUT)?;
                }
                if output > 0 {
                    self.push(Output, Report, usage, output)?;
                    self.push(Output, Boot, usage, BOOT_KBD_OUTPUT)?;
                }
                if feature > 0 {
                    self.push(Feature, Report, usage, feature)?;
                }
            }
            Usage::Mouse => {
                if input > 0 {
                    self.push(Input, Report, usage, input)?;
                    self.push(Input, Boot, usage, BOOT_MOUSE_INPUT)?;
                }
                if output > 0 {
                    self.push(Output, Report, usage, output)?;
                }
                if feature > 0 {
                    self.push(Feature, Report, usage, feature)?;
                }
            }
            _ => {
                if input > 0 {
                    self.push(Input, Report, usage, input)?;
                }
                if output > 0 {
                    self.push(Output, Report, usage, output)?;
                }
                if feature > 0 {
                    self.push(Feature, Report, usage, feature)?;
                }
            }
        }
        Ok(())
    }

    fn push(
        &mut self,
        typ: ReportType,
        protocol: Protocol,
        usage: Usage,
        len: u16,
    ) -> Result<(), Error> {
        if self.reports.len() == MAX_REPORTS {
            return Err(Error::TooManyReports);
        }
        self.reports.push(ReportItem {
            id: self.report_id,
            typ,
            protocol,
            usage,
            len,
        });
        Ok(())
    }

    fn finish(self) -> ReportMap {
        let usage = self.seen.dominant();
        ReportMap {
            usage,
            appearance: usage.appearance(),
            reports: self.reports,
        }
    }
}

fn expect(want: Tag, got: u8) -> Result<(), Error> {
    if want as u8 == got {
        Ok(())
    } else {
        Err(Error::UnexpectedTag { want, got })
    }
}
