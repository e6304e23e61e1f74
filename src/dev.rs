//! HID device record: a report registry bound to a transport.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use hidreg_map::{Protocol, ReportMap, ReportType};

use crate::registry::{Registry, ReportEntry};
use crate::transport::Transport;
use crate::{Error, Result, SyncMutex};

/// Shared HID device record. The registry and the transport live behind one
/// mutex, which serializes registry queries against the construction-time
/// wiring and keeps transport calls single file.
#[derive(Clone, Debug)]
#[repr(transparent)]
pub struct Device<T>(Arc<SyncMutex<Inner<T>>>);

#[derive(Debug)]
struct Inner<T> {
    transport: T,
    registry: Registry,
    /// Protocol mode the device is currently operated in. Selects which
    /// registry entries report traffic resolves against.
    protocol: Protocol,
}

impl<T: Transport> Device<T> {
    /// Opens a device: parses each raw report map, builds the registry, and
    /// binds it to the transport.
    ///
    /// A map that fails to parse fails the whole open and nothing is
    /// registered; a peer whose descriptor cannot be decoded cannot have
    /// its traffic routed.
    pub fn open(transport: T, raw_maps: &[&[u8]]) -> Result<Self> {
        let mut maps = Vec::with_capacity(raw_maps.len());
        for (i, raw) in raw_maps.iter().enumerate() {
            match ReportMap::parse(raw) {
                Ok(m) => maps.push(m),
                Err(e) => {
                    warn!("report map {i} unusable: {e}");
                    return Err(e.into());
                }
            }
        }
        let registry = Registry::build(&maps);
        debug!(
            "device opened with {} reports from {} maps",
            registry.len(),
            maps.len()
        );
        Ok(Self(Arc::new(SyncMutex::new(Inner {
            transport,
            registry,
            protocol: Protocol::Report,
        }))))
    }

    /// Calls `f` with the report registry, e.g. to assign wire handles.
    #[inline(always)]
    pub fn registry<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        f(&mut self.0.lock().registry)
    }

    /// Returns the protocol mode the device is operated in.
    #[inline]
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.0.lock().protocol
    }

    /// Reads a report value from the peer. The report is resolved in the
    /// current protocol mode.
    pub fn get_report(&self, map_index: u8, id: u8, typ: ReportType) -> Result<Vec<u8>> {
        let mut d = self.0.lock();
        let e = *d.entry(map_index, id, typ)?;
        d.transport.read_report(&e)
    }

    /// Writes a report value to the peer. The value length must match the
    /// registered report exactly.
    pub fn set_report(&self, map_index: u8, id: u8, typ: ReportType, value: &[u8]) -> Result<()> {
        let mut d = self.0.lock();
        let e = *d.entry(map_index, id, typ)?;
        if value.len() != usize::from(e.len) {
            return Err(Error::LengthMismatch {
                len: value.len(),
                want: e.len,
            });
        }
        d.transport.write_report(&e, value)
    }

    /// Returns the peer's idle rate.
    pub fn get_idle(&self) -> Result<u8> {
        self.0.lock().transport.get_idle()
    }

    /// Sets the peer's idle rate.
    pub fn set_idle(&self, rate: u8) -> Result<()> {
        self.0.lock().transport.set_idle(rate)
    }

    /// Queries the peer's protocol mode and adopts it for report routing.
    pub fn get_protocol(&self) -> Result<Protocol> {
        let mut d = self.0.lock();
        let p = d.transport.get_protocol()?;
        d.protocol = p;
        Ok(p)
    }

    /// Switches the peer to the given protocol mode. Subsequent report
    /// operations resolve against that mode's registry entries.
    pub fn set_protocol(&self, protocol: Protocol) -> Result<()> {
        let mut d = self.0.lock();
        d.transport.set_protocol(protocol)?;
        if d.protocol != protocol {
            d.protocol = protocol;
            debug!("protocol mode: {protocol}");
        }
        Ok(())
    }

    /// Routes an inbound report in the current protocol mode, returning the
    /// matched entry and the value with any ID prefix stripped.
    pub fn input<'a>(&self, data: &'a [u8]) -> Result<(ReportEntry, &'a [u8])> {
        let d = self.0.lock();
        d.registry
            .route_input(d.protocol, data)
            .map(|(e, value)| (*e, value))
            .ok_or_else(|| {
                debug!("unroutable {}-byte input", data.len());
                Error::UnknownInput {
                    protocol: d.protocol,
                    len: data.len(),
                }
            })
    }

    /// Writes a human-readable listing of the device's registry to `w`.
    pub fn dump(&self, w: &mut impl fmt::Write) -> fmt::Result {
        let d = self.0.lock();
        writeln!(w, "protocol mode: {}", d.protocol)?;
        writeln!(w, "reports: {}", d.registry.len())?;
        for e in d.registry.entries() {
            writeln!(
                w,
                "  map {} id {:3} {:7} {:6} {:8} len {:3} handle {}",
                e.map_index,
                e.id,
                e.typ,
                e.protocol,
                e.usage,
                e.len,
                e.handle.map_or("-".into(), |h| format!("{h:#06X}")),
            )?;
        }
        Ok(())
    }
}

impl<T> Inner<T> {
    /// Resolves one report in the current protocol mode.
    fn entry(&self, map_index: u8, id: u8, typ: ReportType) -> Result<&ReportEntry> {
        self.registry
            .get(map_index, id, typ, self.protocol)
            .ok_or(Error::UnknownReport {
                id,
                typ,
                protocol: self.protocol,
            })
    }
}

#[cfg(test)]
mod tests {
    use matches::assert_matches;

    use hidreg_map::Usage;

    use super::*;

    /// Keyboard with a report ID and an LED output report.
    const KEYBOARD: &[u8] = &[
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x06, // Usage (Keyboard)
        0xA1, 0x01, // Collection (Application)
        0x85, 0x01, //   Report ID (1)
        0x75, 0x01, //   Report Size (1)
        0x95, 0x08, //   Report Count (8)
        0x81, 0x02, //   Input ; modifiers
        0x75, 0x08, //   Report Size (8)
        0x95, 0x06, //   Report Count (6)
        0x81, 0x00, //   Input ; key array
        0x95, 0x01, //   Report Count (1)
        0x91, 0x02, //   Output ; LEDs
        0xC0, // End Collection
    ];

    /// Shared log of the writes a [`Script`] transport performed.
    #[derive(Clone, Debug, Default)]
    struct Log(Arc<SyncMutex<Vec<(u8, ReportType, Vec<u8>)>>>);

    /// Scripted transport that records every call.
    #[derive(Debug, Default)]
    struct Script {
        written: Log,
        idle: u8,
        protocol: Option<Protocol>,
    }

    impl Transport for Script {
        fn write_report(&mut self, entry: &ReportEntry, value: &[u8]) -> Result<()> {
            (self.written.0.lock()).push((entry.id, entry.typ, value.to_vec()));
            Ok(())
        }

        fn read_report(&mut self, entry: &ReportEntry) -> Result<Vec<u8>> {
            Ok(vec![0; usize::from(entry.len)])
        }

        fn get_idle(&mut self) -> Result<u8> {
            Ok(self.idle)
        }

        fn set_idle(&mut self, rate: u8) -> Result<()> {
            self.idle = rate;
            Ok(())
        }

        fn get_protocol(&mut self) -> Result<Protocol> {
            self.protocol.ok_or_else(|| Error::transport("no mode"))
        }

        fn set_protocol(&mut self, protocol: Protocol) -> Result<()> {
            self.protocol = Some(protocol);
            Ok(())
        }
    }

    fn device() -> Device<Script> {
        Device::open(Script::default(), &[KEYBOARD]).unwrap()
    }

    #[test]
    fn open_rejects_bad_map() {
        let e = Device::open(Script::default(), &[KEYBOARD, &[0x05]]).unwrap_err();
        assert_matches!(e, Error::Map(hidreg_map::Error::Truncated));
    }

    #[test]
    fn report_io() {
        use ReportType::*;
        let log = Log::default();
        let t = Script {
            written: log.clone(),
            ..Script::default()
        };
        let d = Device::open(t, &[KEYBOARD]).unwrap();
        assert_eq!(d.get_report(0, 1, Input).unwrap(), [0; 7]);

        d.set_report(0, 1, Output, &[0b101]).unwrap();
        assert_eq!(log.0.lock().as_slice(), [(1, Output, vec![0b101])]);
        assert_matches!(
            d.set_report(0, 1, Output, &[0, 0]).unwrap_err(),
            Error::LengthMismatch { len: 2, want: 1 }
        );
        assert_matches!(
            d.get_report(0, 2, Input).unwrap_err(),
            Error::UnknownReport { id: 2, .. }
        );
    }

    #[test]
    fn protocol_mode_selects_entries() {
        use ReportType::*;
        let d = device();
        assert_eq!(d.protocol(), Protocol::Report);
        assert_eq!(d.get_report(0, 1, Input).unwrap().len(), 7);

        // Boot mode resolves the same (map, id, type) key to the fixed
        // boot entries.
        d.set_protocol(Protocol::Boot).unwrap();
        assert_eq!(d.protocol(), Protocol::Boot);
        assert_eq!(d.get_report(0, 1, Input).unwrap().len(), 8);
        assert_matches!(
            d.set_report(0, 1, Output, &[0, 0]).unwrap_err(),
            Error::LengthMismatch { len: 2, want: 1 }
        );
    }

    #[test]
    fn get_protocol_adopts_peer_mode() {
        let d = device();
        assert_matches!(d.get_protocol().unwrap_err(), Error::Transport(_));
        d.set_protocol(Protocol::Boot).unwrap();
        assert_eq!(d.get_protocol().unwrap(), Protocol::Boot);
        assert_eq!(d.protocol(), Protocol::Boot);
    }

    #[test]
    fn idle() {
        let d = device();
        d.set_idle((500 / 4) as u8).unwrap();
        assert_eq!(d.get_idle().unwrap(), 125);
    }

    #[test]
    fn input_routing() {
        let d = device();
        let data = [0x01, 0, 0x04, 0, 0, 0, 0, 0];
        let (e, value) = d.input(&data).unwrap();
        assert_eq!((e.id, e.usage), (1, Usage::Keyboard));
        assert_eq!(value, &data[1..]);
        assert_matches!(
            d.input(&[0; 3]).unwrap_err(),
            Error::UnknownInput {
                protocol: Protocol::Report,
                len: 3,
            }
        );
    }

    #[test]
    fn transport_wiring() {
        use {Protocol::*, ReportType::*};
        let d = device();
        d.registry(|r| {
            r.get_mut(0, 1, Input, Report).unwrap().handle = Some(0x2A);
        });
        let mut s = String::new();
        d.dump(&mut s).unwrap();
        assert!(s.contains("reports: 4"), "{s}");
        assert!(s.contains("0x002A"), "{s}");
        assert!(s.contains("KEYBOARD"), "{s}");
    }
}
