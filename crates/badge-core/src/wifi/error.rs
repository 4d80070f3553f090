use alloc::string::String;
use core::fmt;

/// POSIX `ENOMEM`, as reported by the radio drivers.
pub const ENOMEM: i32 = 12;

const EXHAUSTED_PREFIX: &str = "Wi-Fi scan failed after attempting per-channel fallback: ";
const NO_STRATEGY_DETAIL: &str = "no scanning methods succeeded";

/// Failure of one `scan()` call on the radio.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScanError {
    /// Dedicated memory-exhaustion signal from the driver.
    OutOfMemory,
    /// Generic I/O-style failure carrying an optional error code.
    Io { code: Option<i32>, message: String },
    /// Anything else the driver reports.
    Driver(String),
}

impl ScanError {
    pub fn io(code: i32, message: impl Into<String>) -> Self {
        Self::Io {
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver(message.into())
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => f.write_str("out of memory"),
            Self::Io { code, message } => match (code, message.is_empty()) {
                (Some(code), true) => write!(f, "I/O error (errno={code})"),
                (Some(code), false) => write!(f, "I/O error (errno={code}, {message})"),
                (None, false) => write!(f, "I/O error ({message})"),
                (None, true) => f.write_str("I/O error"),
            },
            Self::Driver(message) if message.is_empty() => f.write_str("driver error"),
            Self::Driver(message) => write!(f, "driver error: {message}"),
        }
    }
}

impl core::error::Error for ScanError {}

/// Whether a scan failure means the radio ran out of heap.
///
/// Drivers surface the same condition in different ways: a dedicated
/// variant, an I/O error with `ENOMEM`, or only a message. All three are
/// normalized here and nowhere else.
pub fn is_memory_pressure(err: &ScanError) -> bool {
    match err {
        ScanError::OutOfMemory => true,
        ScanError::Io { code, message } => {
            *code == Some(ENOMEM)
                || contains_ignore_ascii_case(message, "out of memory")
                || contains_ignore_ascii_case(message, "enomem")
        }
        ScanError::Driver(_) => false,
    }
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

/// Failure of a channel configuration call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChannelError {
    /// The radio cannot read or switch channels at all.
    Unsupported,
    /// The radio does not take this [`ChannelCall`](super::ChannelCall) shape.
    CallShape,
    InvalidArgument(u8),
    /// The driver refused the configuration for another reason.
    Rejected(String),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("channel switching unsupported"),
            Self::CallShape => f.write_str("channel call shape not accepted"),
            Self::InvalidArgument(channel) => write!(f, "invalid channel {channel}"),
            Self::Rejected(message) => write!(f, "channel configuration rejected: {message}"),
        }
    }
}

impl core::error::Error for ChannelError {}

/// Failure of [`scan_channel`](super::scan_channel).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChannelScanError {
    Channel(ChannelError),
    Scan(ScanError),
}

impl fmt::Display for ChannelScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(err) => write!(f, "setting channel failed: {err}"),
            Self::Scan(err) => err.fmt(f),
        }
    }
}

impl core::error::Error for ChannelScanError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Channel(err) => Some(err),
            Self::Scan(err) => Some(err),
        }
    }
}

/// Error returned by the top-level scan entry point.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScanFailure {
    /// A full-band scan failed for a reason other than memory pressure and
    /// was passed through untouched.
    Scan(ScanError),
    /// No strategy produced a result; `report` lists every failed attempt in
    /// order, joined by `"; "`.
    Exhausted { report: String },
}

impl ScanFailure {
    pub(crate) fn exhausted<S: AsRef<str>>(details: &[S]) -> Self {
        let mut report = String::new();
        for (index, detail) in details.iter().enumerate() {
            if index > 0 {
                report.push_str("; ");
            }
            report.push_str(detail.as_ref());
        }
        if report.is_empty() {
            report.push_str(NO_STRATEGY_DETAIL);
        }
        Self::Exhausted { report }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan(err) => err.fmt(f),
            Self::Exhausted { report } => write!(f, "{EXHAUSTED_PREFIX}{report}"),
        }
    }
}

impl core::error::Error for ScanFailure {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Scan(err) => Some(err),
            Self::Exhausted { .. } => None,
        }
    }
}

impl From<ScanError> for ScanFailure {
    fn from(err: ScanError) -> Self {
        Self::Scan(err)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn dedicated_variant_is_memory_pressure() {
        assert!(is_memory_pressure(&ScanError::OutOfMemory));
    }

    #[test]
    fn enomem_code_is_memory_pressure() {
        assert!(is_memory_pressure(&ScanError::io(ENOMEM, "")));
        assert!(!is_memory_pressure(&ScanError::io(5, "wifi internal error")));
    }

    #[test]
    fn message_heuristic_is_case_insensitive() {
        assert!(is_memory_pressure(&ScanError::Io {
            code: None,
            message: "Wifi Out Of Memory".into(),
        }));
        assert!(is_memory_pressure(&ScanError::io(-1, "scan: ENOMEM")));
    }

    #[test]
    fn driver_errors_are_never_memory_pressure() {
        assert!(!is_memory_pressure(&ScanError::driver("out of memory")));
    }

    #[test]
    fn io_error_formatting_includes_code_and_message() {
        assert_eq!(
            ScanError::io(ENOMEM, "wifi out of memory").to_string(),
            "I/O error (errno=12, wifi out of memory)"
        );
        assert_eq!(ScanError::io(5, "").to_string(), "I/O error (errno=5)");
    }

    #[test]
    fn exhausted_without_details_uses_placeholder() {
        let failure = ScanFailure::exhausted::<&str>(&[]);
        assert_eq!(
            failure.to_string(),
            "Wi-Fi scan failed after attempting per-channel fallback: \
             no scanning methods succeeded"
        );
    }

    #[test]
    fn exhausted_joins_details_in_order() {
        let failure = ScanFailure::exhausted(&["a", "b", "c"]);
        assert_eq!(
            failure.to_string(),
            "Wi-Fi scan failed after attempting per-channel fallback: a; b; c"
        );
    }
}
