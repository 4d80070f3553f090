//! Wi-Fi access point discovery on a heap-constrained radio.
//!
//! A full-band scan is tried first. When it keeps failing with memory
//! pressure the scanner degrades to one channel at a time, merging results by
//! BSSID, and reports every failed strategy if nothing worked.

use alloc::vec::Vec;
use core::fmt;

mod channel;
mod dedup;
mod diagnostics;
mod error;
pub mod listing;
mod scanner;


pub use channel::{ChannelOverride, scan_channel};
pub use dedup::ResultSet;
pub use diagnostics::{DiagnosticSink, LogDiagnostics};
pub use error::{
    ChannelError, ChannelScanError, ENOMEM, ScanError, ScanFailure, is_memory_pressure,
};
pub use scanner::{ChannelFallbackScanner, DEFAULT_MAX_FULL_ATTEMPTS, scan_networks};

/// Longest SSID allowed by 802.11.
pub const SSID_MAX_BYTES: usize = 32;

/// Highest 2.4 GHz channel number used by the target radios.
pub const MAX_CHANNEL: u8 = 14;

/// Channel value meaning "no override, sweep the whole band".
pub const FULL_BAND: u8 = 0;

/// 2.4 GHz channels swept by the per-channel fallback, in order.
pub const DEFAULT_CHANNELS: [u8; MAX_CHANNEL as usize] =
    [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14];

pub type Ssid = heapless::Vec<u8, SSID_MAX_BYTES>;

/// Hardware address of one access point radio.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Bssid(pub [u8; 6]);

impl Bssid {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub const fn octets(self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for Bssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// One access point as reported by a scan. Never mutated after the radio
/// produced it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkRecord {
    ssid: Ssid,
    bssid: Bssid,
    channel: u8,
    rssi: i8,
    auth_mode: u8,
    hidden: Option<bool>,
}

impl NetworkRecord {
    /// SSIDs longer than [`SSID_MAX_BYTES`] are truncated.
    pub fn new(ssid: &[u8], bssid: Bssid, channel: u8, rssi: i8, auth_mode: u8) -> Self {
        let len = ssid.len().min(SSID_MAX_BYTES);
        let mut stored = Ssid::new();
        // Cannot fail, `len` is within capacity.
        let _ = stored.extend_from_slice(&ssid[..len]);

        Self {
            ssid: stored,
            bssid,
            channel,
            rssi,
            auth_mode,
            hidden: None,
        }
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    pub fn ssid(&self) -> &[u8] {
        &self.ssid
    }

    pub fn bssid(&self) -> Bssid {
        self.bssid
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Signal strength in dBm, larger is stronger.
    pub fn rssi(&self) -> i8 {
        self.rssi
    }

    pub fn auth_mode(&self) -> u8 {
        self.auth_mode
    }

    pub fn hidden(&self) -> Option<bool> {
        self.hidden
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden == Some(true) || self.ssid.is_empty()
    }

    /// Short label for the authentication mode code.
    pub fn auth_label(&self) -> &'static str {
        match self.auth_mode {
            0 => "open",
            1 => "WEP",
            2 => "WPA",
            3 => "WPA2",
            4 => "WPA/2",
            5 => "WPA2-E",
            6 => "WPA3",
            7 => "WPA2/3",
            _ => "?",
        }
    }

    /// SSID as text; invalid UTF-8 sequences become U+FFFD.
    pub fn ssid_display(&self) -> SsidDisplay<'_> {
        SsidDisplay(self)
    }
}

/// Lossy UTF-8 view of an SSID.
pub struct SsidDisplay<'a>(&'a NetworkRecord);

impl fmt::Display for SsidDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_hidden() {
            return f.write_str("<hidden>");
        }
        for chunk in self.0.ssid.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_str("\u{FFFD}")?;
            }
        }
        Ok(())
    }
}

/// Shape of a channel configuration call.
///
/// Driver shims disagree on how the channel is written: some expose a
/// dedicated setter, others only a generic parameter write keyed by name. A
/// radio answers [`ChannelError::CallShape`] for the shape it does not take.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChannelCall {
    Direct(u8),
    Parameter(u8),
}

impl ChannelCall {
    pub const fn channel(self) -> u8 {
        match self {
            Self::Direct(channel) | Self::Parameter(channel) => channel,
        }
    }
}

/// Radio capability consumed by the scanner.
///
/// The handle is a single exclusive-access resource: a channel switch changes
/// global radio state, so the scanner borrows it mutably for a whole call.
/// Sharing one radio between concurrent scans is undefined at the hardware
/// level, which `&mut` rules out at compile time.
pub trait RadioHandle {
    /// Blocking scan. Sweeps the whole band unless a channel override is
    /// active, in which case only that channel is scanned.
    fn scan(&mut self) -> Result<Vec<NetworkRecord>, ScanError>;

    /// Currently configured channel, [`FULL_BAND`] when none is pinned.
    fn channel(&mut self) -> Result<u8, ChannelError> {
        Err(ChannelError::Unsupported)
    }

    fn set_channel(&mut self, call: ChannelCall) -> Result<(), ChannelError> {
        let _ = call;
        Err(ChannelError::Unsupported)
    }
}

impl<R: RadioHandle + ?Sized> RadioHandle for &mut R {
    fn scan(&mut self) -> Result<Vec<NetworkRecord>, ScanError> {
        (**self).scan()
    }

    fn channel(&mut self) -> Result<u8, ChannelError> {
        (**self).channel()
    }

    fn set_channel(&mut self, call: ChannelCall) -> Result<(), ChannelError> {
        (**self).set_channel(call)
    }
}
