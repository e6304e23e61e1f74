//! HID usage tables and the device categories derived from them.

use core::fmt;

/// Usage page IDs (\[HUT\] Section 3). Only the pages that influence report
/// classification are named; vendor-defined pages occupy `0xFF00..=0xFFFF`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, num_enum::TryFromPrimitive)]
#[non_exhaustive]
#[repr(u16)]
pub enum Page {
    /// Generic Desktop Page.
    GenericDesktop = 0x01,
    /// Keyboard/Keypad Page.
    Key = 0x07,
    /// LED Page.
    Led = 0x08,
    /// Button Page.
    Button = 0x09,
    /// Consumer Page.
    Consumer = 0x0C,
    /// Digitizers Page.
    Digitizer = 0x0D,
}

/// Generic Desktop usage IDs (\[HUT\] Section 4).
#[derive(Clone, Copy, Debug, Eq, PartialEq, num_enum::TryFromPrimitive)]
#[non_exhaustive]
#[repr(u16)]
pub enum GenericDesktop {
    Pointer = 0x01,
    Mouse = 0x02,
    Joystick = 0x04,
    Gamepad = 0x05,
    Keyboard = 0x06,
    Keypad = 0x07,
    X = 0x30,
    Y = 0x31,
    Wheel = 0x38,
}

/// Consumer usage IDs (\[HUT\] Section 15).
#[derive(Clone, Copy, Debug, Eq, PartialEq, num_enum::TryFromPrimitive)]
#[non_exhaustive]
#[repr(u16)]
pub enum Consumer {
    Control = 0x01,
}

/// Device category declared by a top-level application collection.
///
/// Values are one-hot so that the categories seen across one report map can
/// be collected into a [`UsageSet`]. Variants are declared in dominance
/// order: when several categories share a map, the first one declared here
/// names the whole map.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, enum_iterator::Sequence, num_enum::TryFromPrimitive,
)]
#[non_exhaustive]
#[repr(u8)]
pub enum Usage {
    Keyboard = 1 << 0,
    Mouse = 1 << 1,
    Joystick = 1 << 2,
    Gamepad = 1 << 3,
    Tablet = 1 << 4,
    CControl = 1 << 5,
    Vendor = 1 << 6,
    Generic = 0,
}

impl Default for Usage {
    #[inline(always)]
    fn default() -> Self {
        Self::Generic
    }
}

impl Usage {
    /// Classifies the `(usage page, usage)` pair of an application
    /// collection. Anything without a more specific category, including
    /// pointer-only and keypad collections, is [`Usage::Generic`].
    #[must_use]
    pub fn classify(page: u16, usage: u16) -> Self {
        if page >= 0xFF {
            return Self::Vendor;
        }
        match Page::try_from(page) {
            Ok(Page::GenericDesktop) => match GenericDesktop::try_from(usage) {
                Ok(GenericDesktop::Mouse) => Self::Mouse,
                Ok(GenericDesktop::Joystick) => Self::Joystick,
                Ok(GenericDesktop::Gamepad) => Self::Gamepad,
                Ok(GenericDesktop::Keyboard) => Self::Keyboard,
                _ => Self::Generic,
            },
            Ok(Page::Consumer) if usage == Consumer::Control as u16 => Self::CControl,
            Ok(Page::Digitizer) => Self::Tablet,
            _ => Self::Generic,
        }
    }

    /// Returns the category as a [`UsageSet`] member. [`Usage::Generic`] is
    /// the empty set.
    #[inline(always)]
    #[must_use]
    pub const fn flag(self) -> UsageSet {
        UsageSet::from_bits_truncate(self as u8)
    }

    /// Returns the GAP appearance code advertised for the category
    /// (\[CSS\] Part A, Section 1.12).
    #[must_use]
    pub const fn appearance(self) -> Appearance {
        match self {
            Self::Keyboard => Appearance::Keyboard,
            Self::Mouse => Appearance::Mouse,
            Self::Joystick => Appearance::Joystick,
            Self::Gamepad => Appearance::Gamepad,
            Self::Tablet => Appearance::DigitizerTablet,
            _ => Appearance::GenericHid,
        }
    }

    /// Returns the category name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyboard => "KEYBOARD",
            Self::Mouse => "MOUSE",
            Self::Joystick => "JOYSTICK",
            Self::Gamepad => "GAMEPAD",
            Self::Tablet => "TABLET",
            Self::CControl => "CCONTROL",
            Self::Vendor => "VENDOR",
            Self::Generic => "GENERIC",
        }
    }

    /// Returns the name for a raw category value, or `"UNKNOWN"` if the
    /// value is out of range.
    #[must_use]
    pub fn name(v: u8) -> &'static str {
        Self::try_from(v).map_or("UNKNOWN", Self::as_str)
    }
}

impl fmt::Display for Usage {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

bitflags::bitflags! {
    /// Set of device categories seen across one report map.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct UsageSet: u8 {
        const KEYBOARD = 1 << 0;
        const MOUSE = 1 << 1;
        const JOYSTICK = 1 << 2;
        const GAMEPAD = 1 << 3;
        const TABLET = 1 << 4;
        const CCONTROL = 1 << 5;
        const VENDOR = 1 << 6;
    }
}

impl UsageSet {
    /// Returns the dominant category of the set, in [`Usage`] declaration
    /// order. The empty set is [`Usage::Generic`].
    #[must_use]
    pub fn dominant(self) -> Usage {
        enum_iterator::all::<Usage>()
            .find(|&u| self.intersects(u.flag()))
            .unwrap_or(Usage::Generic)
    }
}

/// External appearance codes of HID peripherals
/// (\[CSS\] Part A, Section 1.12).
#[derive(Clone, Copy, Debug, Eq, PartialEq, num_enum::TryFromPrimitive)]
#[non_exhaustive]
#[repr(u16)]
pub enum Appearance {
    GenericHid = 0x03C0,
    Keyboard = 0x03C1,
    Mouse = 0x03C2,
    Joystick = 0x03C3,
    Gamepad = 0x03C4,
    DigitizerTablet = 0x03C5,
    CardReader = 0x03C6,
    DigitalPen = 0x03C7,
    BarcodeScanner = 0x03C8,
}

impl From<Appearance> for u16 {
    #[inline(always)]
    fn from(v: Appearance) -> Self {
        v as Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify() {
        use Usage::*;
        let gd = Page::GenericDesktop as u16;
        for (page, usage, want) in [
            (gd, GenericDesktop::Keyboard as u16, Keyboard),
            (gd, GenericDesktop::Mouse as u16, Mouse),
            (gd, GenericDesktop::Joystick as u16, Joystick),
            (gd, GenericDesktop::Gamepad as u16, Gamepad),
            (gd, GenericDesktop::Pointer as u16, Generic),
            (gd, GenericDesktop::Keypad as u16, Generic),
            (Page::Consumer as u16, Consumer::Control as u16, CControl),
            (Page::Consumer as u16, 0x30, Generic),
            (Page::Digitizer as u16, 0x02, Tablet),
            (0xFF, 0x01, Vendor),
            (0xFF00, 0x01, Vendor),
            (Page::Button as u16, 0x01, Generic),
        ] {
            assert_eq!(Usage::classify(page, usage), want, "{page:#06X}/{usage:#06X}");
        }
    }

    #[test]
    fn dominant() {
        assert_eq!(UsageSet::empty().dominant(), Usage::Generic);
        assert_eq!(UsageSet::VENDOR.dominant(), Usage::Vendor);
        assert_eq!(
            (UsageSet::MOUSE | UsageSet::CCONTROL).dominant(),
            Usage::Mouse
        );
        assert_eq!(UsageSet::all().dominant(), Usage::Keyboard);
    }

    #[test]
    fn appearance() {
        assert_eq!(u16::from(Usage::Keyboard.appearance()), 0x03C1);
        assert_eq!(u16::from(Usage::Mouse.appearance()), 0x03C2);
        assert_eq!(u16::from(Usage::Joystick.appearance()), 0x03C3);
        assert_eq!(u16::from(Usage::Gamepad.appearance()), 0x03C4);
        assert_eq!(u16::from(Usage::Tablet.appearance()), 0x03C5);
        for u in [Usage::CControl, Usage::Vendor, Usage::Generic] {
            assert_eq!(u.appearance(), Appearance::GenericHid);
        }
    }

    #[test]
    fn names() {
        for u in enum_iterator::all::<Usage>() {
            assert_ne!(u.as_str(), "UNKNOWN");
            assert_eq!(Usage::name(u as u8), u.as_str());
        }
        assert_eq!(Usage::name(0x03), "UNKNOWN");
        assert_eq!(Usage::name(0x80), "UNKNOWN");
    }
}
