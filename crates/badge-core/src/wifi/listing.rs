//! Scan results shaped for the badge's monochrome display.

use alloc::{string::String, vec::Vec};
use core::fmt::{self, Write};

use heapless::String as HeaplessString;

use super::{NetworkRecord, ScanFailure};

/// Characters per row on the 128 px wide display with the small font.
pub const LISTING_ROW_CHARS: usize = 21;
/// Byte capacity of one row; SSIDs may carry multi-byte characters.
pub const LISTING_ROW_BYTES: usize = LISTING_ROW_CHARS * 4;

pub type ListingRow = HeaplessString<LISTING_ROW_BYTES>;

/// Sorts networks strongest first; equal signals are ordered by SSID bytes.
pub fn strongest_first(mut records: Vec<NetworkRecord>) -> Vec<NetworkRecord> {
    records.sort_by(|a, b| b.rssi().cmp(&a.rssi()).then_with(|| a.ssid().cmp(b.ssid())));
    records
}

/// One display row: RSSI, channel and as much of the SSID as fits.
pub fn listing_row(record: &NetworkRecord) -> ListingRow {
    let mut row = ListingRow::new();
    let mut out = CharLimited {
        out: &mut row,
        remaining: LISTING_ROW_CHARS,
    };
    let _ = write!(
        out,
        "{:>4} {:>2} {}",
        record.rssi(),
        record.channel(),
        record.ssid_display()
    );
    row
}

/// Word-wraps the failure text into lines of at most `width` characters.
/// Words longer than a line are split.
pub fn failure_lines(failure: &ScanFailure, width: usize) -> Vec<String> {
    let mut text = String::new();
    let _ = write!(text, "{failure}");
    wrap_words(&text, width.max(1))
}

/// Diagnostics still worth logging once a scan has finished. An exhausted
/// failure already carries every note in its report.
pub fn unreported_notes<'a>(
    failure: Option<&ScanFailure>,
    diagnostics: &'a [String],
) -> &'a [String] {
    match failure {
        Some(failure) if failure.is_exhausted() => &[],
        _ => diagnostics,
    }
}

fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_chars = 0usize;

    for word in text.split_whitespace() {
        let mut word = word;
        loop {
            let word_chars = word.chars().count();
            let needed = if line_chars == 0 {
                word_chars
            } else {
                line_chars + 1 + word_chars
            };

            if needed <= width {
                if line_chars > 0 {
                    line.push(' ');
                }
                line.push_str(word);
                line_chars = needed;
                break;
            }

            if line_chars > 0 {
                lines.push(core::mem::take(&mut line));
                line_chars = 0;
                continue;
            }

            // Word alone is wider than a line.
            let split = word
                .char_indices()
                .nth(width)
                .map_or(word.len(), |(index, _)| index);
            lines.push(String::from(&word[..split]));
            word = &word[split..];
            if word.is_empty() {
                break;
            }
        }
    }

    if line_chars > 0 {
        lines.push(line);
    }
    lines
}

struct CharLimited<'a, const N: usize> {
    out: &'a mut HeaplessString<N>,
    remaining: usize,
}

impl<const N: usize> fmt::Write for CharLimited<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.remaining == 0 {
                return Ok(());
            }
            self.out.push(ch).map_err(|_| fmt::Error)?;
            self.remaining -= 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::wifi::{Bssid, ScanError};

    fn net(ssid: &str, rssi: i8, channel: u8) -> NetworkRecord {
        NetworkRecord::new(ssid.as_bytes(), Bssid([rssi as u8; 6]), channel, rssi, 3)
    }

    #[test]
    fn strongest_network_comes_first() {
        let sorted = strongest_first(vec![
            net("weak", -80, 1),
            net("strong", -30, 6),
            net("b-mid", -50, 11),
            net("a-mid", -50, 3),
        ]);
        let names: Vec<&[u8]> = sorted.iter().map(NetworkRecord::ssid).collect();
        assert_eq!(
            names,
            vec![&b"strong"[..], &b"a-mid"[..], &b"b-mid"[..], &b"weak"[..]]
        );
    }

    #[test]
    fn row_shows_rssi_channel_and_ssid() {
        assert_eq!(listing_row(&net("net1", -40, 6)).as_str(), " -40  6 net1");
    }

    #[test]
    fn long_ssid_is_cut_to_row_width() {
        let row = listing_row(&net("a-very-long-conference-network", -5, 11));
        assert_eq!(row.chars().count(), LISTING_ROW_CHARS);
        assert_eq!(row.as_str(), "  -5 11 a-very-long-c");
    }

    #[test]
    fn failure_text_wraps_on_word_boundaries() {
        let failure = ScanFailure::Exhausted {
            report: String::from("channel 1: channel switching unsupported"),
        };
        let lines = failure_lines(&failure, 21);
        assert!(lines.iter().all(|line| line.chars().count() <= 21));
        assert_eq!(lines.first().map(String::as_str), Some("Wi-Fi scan failed"));
        assert_eq!(lines.last().map(String::as_str), Some("switching unsupported"));
    }

    #[test]
    fn exhausted_report_is_not_logged_twice() {
        let notes = vec![String::from("full scan attempt 1: out of memory")];
        let exhausted = ScanFailure::Exhausted {
            report: notes[0].clone(),
        };
        let scan = ScanFailure::Scan(ScanError::driver("timeout"));

        assert!(unreported_notes(Some(&exhausted), &notes).is_empty());
        assert_eq!(unreported_notes(Some(&scan), &notes), notes.as_slice());
        assert_eq!(unreported_notes(None, &notes), notes.as_slice());
    }

    #[test]
    fn oversized_word_is_split_across_lines() {
        assert_eq!(wrap_words("abcdefgh ij", 3), vec!["abc", "def", "gh", "ij"]);
    }
}
