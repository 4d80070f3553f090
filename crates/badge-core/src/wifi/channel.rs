use alloc::{format, vec::Vec};

use log::{debug, warn};

use super::{
    ChannelCall, ChannelError, ChannelScanError, DiagnosticSink, FULL_BAND, NetworkRecord,
    RadioHandle, is_memory_pressure,
};

/// Writes `channel` using the direct call shape, falling back to the
/// parameter shape only when the radio rejects the shape itself.
///
/// Any other failure of the direct call is returned as is.
fn apply_channel<R>(radio: &mut R, channel: u8) -> Result<(), ChannelError>
where
    R: RadioHandle + ?Sized,
{
    match radio.set_channel(ChannelCall::Direct(channel)) {
        Err(ChannelError::CallShape) => radio.set_channel(ChannelCall::Parameter(channel)),
        outcome => outcome,
    }
}

/// Scoped channel override.
///
/// Holds the radio pinned to one channel and puts the previous channel back
/// when dropped, whichever way the enclosed scan ended. A failed restore is
/// reported to the diagnostic sink and never escalated.
pub struct ChannelOverride<'a, R, D>
where
    R: RadioHandle + ?Sized,
    D: DiagnosticSink + ?Sized,
{
    radio: &'a mut R,
    diagnostics: &'a mut D,
    channel: u8,
    previous: u8,
}

impl<'a, R, D> ChannelOverride<'a, R, D>
where
    R: RadioHandle + ?Sized,
    D: DiagnosticSink + ?Sized,
{
    /// Pins `radio` to `channel`.
    ///
    /// Returns `Ok(None)` when the radio cannot switch channels, either
    /// because it lacks the capability or because neither call shape was
    /// accepted. `Err` means the radio understood the request and refused it.
    ///
    /// A radio that switches but cannot report its current channel is put
    /// back on [`FULL_BAND`] afterwards, and a note says so.
    pub fn acquire(
        radio: &'a mut R,
        channel: u8,
        diagnostics: &'a mut D,
    ) -> Result<Option<Self>, ChannelError> {
        let current = radio.channel();

        match radio.set_channel(ChannelCall::Direct(channel)) {
            Ok(()) => {}
            Err(ChannelError::Unsupported) => return Ok(None),
            Err(ChannelError::CallShape) => {
                match radio.set_channel(ChannelCall::Parameter(channel)) {
                    Ok(()) => {}
                    Err(ChannelError::Unsupported) => return Ok(None),
                    Err(err) => {
                        diagnostics.record(&format!(
                            "setting channel via parameter call failed: {err}"
                        ));
                        return Ok(None);
                    }
                }
            }
            Err(err) => return Err(err),
        }

        let previous = match current {
            Ok(previous) => previous,
            Err(err) => {
                diagnostics.record(&format!(
                    "reading current channel failed ({err}); restoring full band"
                ));
                FULL_BAND
            }
        };

        debug!("wifi-scan: channel {} pinned (previous={})", channel, previous);
        Ok(Some(Self {
            radio,
            diagnostics,
            channel,
            previous,
        }))
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Channel put back on drop.
    pub fn previous(&self) -> u8 {
        self.previous
    }

    pub fn radio(&mut self) -> &mut R {
        &mut *self.radio
    }

    pub fn diagnostics(&mut self) -> &mut D {
        &mut *self.diagnostics
    }
}

impl<R, D> Drop for ChannelOverride<'_, R, D>
where
    R: RadioHandle + ?Sized,
    D: DiagnosticSink + ?Sized,
{
    fn drop(&mut self) {
        let previous = self.previous;
        if let Err(err) = apply_channel(&mut *self.radio, previous) {
            warn!("wifi-scan: restoring channel {} failed: {}", previous, err);
            self.diagnostics
                .record(&format!("restoring channel {previous} failed: {err}"));
        }
    }
}

/// Scans a single channel.
///
/// Returns `Ok(None)` when the radio cannot switch channels; that is a
/// capability answer, not a failure. Memory exhaustion on this one channel
/// yields an empty list. The previous channel is restored on every path.
pub fn scan_channel<R, D>(
    radio: &mut R,
    channel: u8,
    diagnostics: &mut D,
) -> Result<Option<Vec<NetworkRecord>>, ChannelScanError>
where
    R: RadioHandle + ?Sized,
    D: DiagnosticSink + ?Sized,
{
    let Some(mut pinned) =
        ChannelOverride::acquire(radio, channel, diagnostics).map_err(ChannelScanError::Channel)?
    else {
        return Ok(None);
    };

    match pinned.radio().scan() {
        Ok(records) => Ok(Some(records)),
        Err(err) if is_memory_pressure(&err) => {
            pinned
                .diagnostics()
                .record(&format!("scan on channel {channel} exhausted memory: {err}"));
            Ok(Some(Vec::new()))
        }
        Err(err) => Err(ChannelScanError::Scan(err)),
    }
}
