//! Report registry.
//!
//! A device's registry is the flat union of its parsed report maps, built
//! once at open time and queried by transport callbacks to route wire data.
//! Entries are immutable after construction except for the fields a
//! transport assigns while wiring the device up ([`ReportEntry::handle`],
//! [`ReportEntry::notify`]). Callers serialize construction against queries;
//! [`crate::Device`] does so with a mutex around the whole device record.

use smallvec::SmallVec;

use hidreg_map::{Protocol, ReportMap, ReportType, Usage};

/// One registered report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReportEntry {
    /// Index of the report map that declared the report.
    pub map_index: u8,
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
    /// Transport-assigned wire handle.
    pub handle: Option<u16>,
    /// Whether the transport enabled input notifications for the report.
    pub notify: bool,
}

/// Report registry. Entries keep the discovery order of the source maps.
/// Every lookup is a linear scan; device report counts are tens, not
/// thousands.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    entries: SmallVec<[ReportEntry; 8]>,
}

impl Registry {
    /// Builds a registry from parsed report maps. The `map_index` of each
    /// entry is the position of its map in `maps`.
    #[must_use]
    pub fn build(maps: &[ReportMap]) -> Self {
        let mut entries = SmallVec::new();
        for (i, m) in maps.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let map_index = i as u8;
            entries.extend(m.reports().iter().map(|r| ReportEntry {
                map_index,
                id: r.id,
                typ: r.typ,
                protocol: r.protocol,
                usage: r.usage,
                len: r.len,
                handle: None,
                notify: false,
            }));
        }
        Self { entries }
    }

    /// Returns the number of registered reports.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the registry is empty.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries in discovery order.
    #[inline(always)]
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Returns the entry matching all four key fields. Used for explicit
    /// GET/SET report operations.
    #[must_use]
    pub fn get(
        &self,
        map_index: u8,
        id: u8,
        typ: ReportType,
        protocol: Protocol,
    ) -> Option<&ReportEntry> {
        (self.entries.iter()).find(|e| {
            e.map_index == map_index && e.id == id && e.typ == typ && e.protocol == protocol
        })
    }

    /// Mutable counterpart of [`Self::get`] for transport wiring.
    pub fn get_mut(
        &mut self,
        map_index: u8,
        id: u8,
        typ: ReportType,
        protocol: Protocol,
    ) -> Option<&mut ReportEntry> {
        (self.entries.iter_mut()).find(|e| {
            e.map_index == map_index && e.id == id && e.typ == typ && e.protocol == protocol
        })
    }

    /// Returns the report mode entry with the given ID and type. Used to
    /// route standard report mode traffic.
    #[must_use]
    pub fn get_by_id_type(&self, id: u8, typ: ReportType) -> Option<&ReportEntry> {
        (self.entries.iter())
            .find(|e| e.id == id && e.typ == typ && e.protocol == Protocol::Report)
    }

    /// Returns the first input entry whose value length matches the wire
    /// payload length. Fallback for devices that omit report IDs in boot
    /// mode.
    #[must_use]
    pub fn input_by_len(&self, protocol: Protocol, len: usize) -> Option<&ReportEntry> {
        (self.entries.iter()).find(|e| {
            e.typ.is_input() && e.protocol == protocol && usize::from(e.len) == len
        })
    }

    /// Returns the input entry with the given ID in the given protocol mode.
    #[must_use]
    pub fn input_by_id(&self, protocol: Protocol, id: u8) -> Option<&ReportEntry> {
        (self.entries.iter())
            .find(|e| e.typ.is_input() && e.protocol == protocol && e.id == id)
    }

    /// Routes an inbound report that carries no explicit ID information.
    ///
    /// The first pass assumes the payload has no ID prefix and matches
    /// ID-less input entries on exact length. Only when that fails is the
    /// first byte tried as a report ID with the remainder as the value. The
    /// precedence is asymmetric on purpose: a boot mode peer never prefixes
    /// the ID, so assume-no-id must win when both readings are plausible.
    ///
    /// Returns the matched entry and the report value with any ID prefix
    /// stripped.
    #[must_use]
    pub fn route_input<'a>(
        &self,
        protocol: Protocol,
        data: &'a [u8],
    ) -> Option<(&ReportEntry, &'a [u8])> {
        let no_id = (self.entries.iter()).find(|e| {
            e.id == 0 && e.typ.is_input() && e.protocol == protocol && usize::from(e.len) == data.len()
        });
        if let Some(e) = no_id {
            return Some((e, data));
        }
        let (&id, value) = data.split_first()?;
        (self.entries.iter())
            .find(|e| {
                e.id == id
                    && e.typ.is_input()
                    && e.protocol == protocol
                    && usize::from(e.len) == value.len()
            })
            .map(|e| (e, value))
    }
}
