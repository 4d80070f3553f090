use alloc::{format, string::String, vec::Vec};

use log::{debug, info, warn};

use super::{
    DEFAULT_CHANNELS, DiagnosticSink, LogDiagnostics, NetworkRecord, RadioHandle, ResultSet,
    ScanFailure, is_memory_pressure, scan_channel,
};
use crate::memory::{HeapReclaim, NoReclaim};

/// Full-band attempts made before degrading to per-channel scans.
pub const DEFAULT_MAX_FULL_ATTEMPTS: u8 = 2;

/// Layered scan strategy for radios that run out of heap on full-band scans.
///
/// 1. Up to `max_full_attempts` full-band scans. The first success wins. A
///    failure that is not memory pressure is returned immediately. Memory
///    failures trigger the reclaim hook before the next attempt.
/// 2. One scan per channel, in order. Unsupported channels and per-channel
///    errors are noted and skipped. Results are merged by BSSID.
/// 3. If no channel could be scanned at all, every noted failure is folded
///    into one [`ScanFailure::Exhausted`].
///
/// Worst-case latency is bounded by `max_full_attempts` full scans plus one
/// scan per channel; nothing is retried beyond that.
#[derive(Clone, Debug)]
pub struct ChannelFallbackScanner<'a, H = NoReclaim> {
    channels: &'a [u8],
    max_full_attempts: u8,
    reclaim: H,
}

impl ChannelFallbackScanner<'static, NoReclaim> {
    pub const fn new() -> Self {
        Self {
            channels: &DEFAULT_CHANNELS,
            max_full_attempts: DEFAULT_MAX_FULL_ATTEMPTS,
            reclaim: NoReclaim,
        }
    }
}

impl Default for ChannelFallbackScanner<'static, NoReclaim> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, H: HeapReclaim> ChannelFallbackScanner<'a, H> {
    /// Channels swept by the fallback, in the given order.
    pub fn with_channels<'b>(self, channels: &'b [u8]) -> ChannelFallbackScanner<'b, H> {
        ChannelFallbackScanner {
            channels,
            max_full_attempts: self.max_full_attempts,
            reclaim: self.reclaim,
        }
    }

    /// At least one full-band attempt is always made.
    pub fn with_max_full_attempts(mut self, attempts: u8) -> Self {
        self.max_full_attempts = attempts.max(1);
        self
    }

    pub fn with_reclaim<H2: HeapReclaim>(self, reclaim: H2) -> ChannelFallbackScanner<'a, H2> {
        ChannelFallbackScanner {
            channels: self.channels,
            max_full_attempts: self.max_full_attempts,
            reclaim,
        }
    }

    pub fn channels(&self) -> &[u8] {
        self.channels
    }

    pub fn max_full_attempts(&self) -> u8 {
        self.max_full_attempts
    }

    /// Scans with diagnostics routed to the logger.
    pub fn scan_networks<R>(&mut self, radio: &mut R) -> Result<Vec<NetworkRecord>, ScanFailure>
    where
        R: RadioHandle + ?Sized,
    {
        self.scan_networks_with_diagnostics(radio, &mut LogDiagnostics)
    }

    /// Scans, reporting every failed sub-strategy and every swallowed
    /// channel problem to `diagnostics`.
    pub fn scan_networks_with_diagnostics<R, D>(
        &mut self,
        radio: &mut R,
        diagnostics: &mut D,
    ) -> Result<Vec<NetworkRecord>, ScanFailure>
    where
        R: RadioHandle + ?Sized,
        D: DiagnosticSink + ?Sized,
    {
        let mut attempt_log = Vec::new();

        if let Some(records) = self.full_scan(radio, &mut attempt_log, diagnostics)? {
            return Ok(records);
        }

        info!(
            "wifi-scan: full scan starved {} times; scanning {} channels one by one",
            self.max_full_attempts,
            self.channels.len()
        );
        self.per_channel_scan(radio, attempt_log, diagnostics)
    }

    fn full_scan<R, D>(
        &mut self,
        radio: &mut R,
        attempt_log: &mut Vec<String>,
        diagnostics: &mut D,
    ) -> Result<Option<Vec<NetworkRecord>>, ScanFailure>
    where
        R: RadioHandle + ?Sized,
        D: DiagnosticSink + ?Sized,
    {
        for attempt in 1..=self.max_full_attempts {
            if attempt > 1 {
                debug!("wifi-scan: reclaiming heap before full scan attempt {}", attempt);
                self.reclaim.reclaim();
            }

            match radio.scan() {
                Ok(records) => {
                    debug!(
                        "wifi-scan: full scan attempt {} found {} networks",
                        attempt,
                        records.len()
                    );
                    return Ok(Some(records));
                }
                Err(err) if is_memory_pressure(&err) => {
                    let entry = format!("full scan attempt {attempt}: {err}");
                    diagnostics.record(&entry);
                    attempt_log.push(entry);
                }
                Err(err) => {
                    warn!("wifi-scan: full scan attempt {} failed: {}", attempt, err);
                    return Err(ScanFailure::Scan(err));
                }
            }
        }

        Ok(None)
    }

    fn per_channel_scan<R, D>(
        &self,
        radio: &mut R,
        mut attempt_log: Vec<String>,
        diagnostics: &mut D,
    ) -> Result<Vec<NetworkRecord>, ScanFailure>
    where
        R: RadioHandle + ?Sized,
        D: DiagnosticSink + ?Sized,
    {
        let mut results = ResultSet::new();
        let mut any_channel_scanned = false;

        for &channel in self.channels {
            let mut notes: Vec<String> = Vec::new();
            let outcome = scan_channel(radio, channel, &mut notes);

            let failure = match outcome {
                Ok(Some(records)) => {
                    debug!(
                        "wifi-scan: channel {} returned {} networks",
                        channel,
                        records.len()
                    );
                    any_channel_scanned = true;
                    results.merge_all(records);
                    None
                }
                Ok(None) if notes.is_empty() => {
                    Some(format!("channel {channel}: channel switching unsupported"))
                }
                Ok(None) => {
                    let detail = notes.join("; ");
                    notes.clear();
                    Some(format!("channel {channel}: {detail}"))
                }
                Err(err) => Some(format!("channel {channel}: {err}")),
            };

            for note in &notes {
                diagnostics.record(&format!("channel {channel}: {note}"));
            }
            if let Some(entry) = failure {
                diagnostics.record(&entry);
                attempt_log.push(entry);
            }
        }

        if any_channel_scanned {
            info!(
                "wifi-scan: per-channel fallback found {} unique networks",
                results.len()
            );
            return Ok(results.into_records());
        }

        Err(ScanFailure::exhausted(&attempt_log))
    }
}

/// Scans `channels` with the default full-scan attempt cap and no reclaim
/// hook, logging diagnostics.
pub fn scan_networks<R>(radio: &mut R, channels: &[u8]) -> Result<Vec<NetworkRecord>, ScanFailure>
where
    R: RadioHandle + ?Sized,
{
    ChannelFallbackScanner::new()
        .with_channels(channels)
        .scan_networks(radio)
}
