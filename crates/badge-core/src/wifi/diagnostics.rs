use alloc::{string::String, vec::Vec};

use log::warn;

/// Receiver for human-readable notes about failed scan sub-strategies.
///
/// The caller decides visibility: collect into a `Vec<String>` to show them
/// on screen, or use [`LogDiagnostics`] to route them through the logger.
pub trait DiagnosticSink {
    fn record(&mut self, entry: &str);
}

impl DiagnosticSink for Vec<String> {
    fn record(&mut self, entry: &str) {
        self.push(entry.into());
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn record(&mut self, entry: &str) {
        (**self).record(entry);
    }
}

/// Forwards every entry to `log::warn!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn record(&mut self, entry: &str) {
        warn!("wifi-scan: {}", entry);
    }
}
