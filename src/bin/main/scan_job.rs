use alloc::{string::String, vec::Vec};

use badge_core::{
    config::ScanSettings,
    memory::HeapReclaim,
    wifi::{
        ChannelFallbackScanner, RadioHandle, ScanFailure,
        listing::{
            LISTING_ROW_CHARS, failure_lines, listing_row, strongest_first, unreported_notes,
        },
    },
};
use badge_hal_esp32s3::radio::HeapStatsReclaim;
use embassy_time::Timer;
use log::{info, warn};

pub(super) async fn scan_loop<R>(radio: &mut R, settings: &ScanSettings) -> !
where
    R: RadioHandle + ?Sized,
{
    let mut scanner = ChannelFallbackScanner::new()
        .with_channels(&settings.channels)
        .with_max_full_attempts(settings.max_full_attempts)
        .with_reclaim(HeapStatsReclaim);
    let mut consecutive_failures = 0u32;

    info!(
        "scan: channels={:?} max_full_attempts={} interval={}s",
        scanner.channels(),
        scanner.max_full_attempts(),
        settings.rescan_interval_secs
    );

    if !settings.scan_on_startup {
        Timer::after_secs(settings.rescan_delay_secs(0)).await;
    }

    loop {
        match scan_once(&mut scanner, radio) {
            Ok(_) => consecutive_failures = 0,
            Err(_) => consecutive_failures = consecutive_failures.saturating_add(1),
        }

        let delay_secs = settings.rescan_delay_secs(consecutive_failures);
        info!(
            "scan: next in {}s (consecutive_failures={})",
            delay_secs, consecutive_failures
        );
        Timer::after_secs(delay_secs).await;
    }
}

fn scan_once<R, H>(
    scanner: &mut ChannelFallbackScanner<'_, H>,
    radio: &mut R,
) -> Result<usize, ScanFailure>
where
    R: RadioHandle + ?Sized,
    H: HeapReclaim,
{
    let mut diagnostics: Vec<String> = Vec::new();
    let heap_free_before = esp_alloc::HEAP.free();
    let outcome = scanner.scan_networks_with_diagnostics(radio, &mut diagnostics);
    info!(
        "scan: heap free before={} after={}",
        heap_free_before,
        esp_alloc::HEAP.free()
    );

    for entry in unreported_notes(outcome.as_ref().err(), &diagnostics) {
        warn!("scan: {}", entry);
    }

    match outcome {
        Ok(records) => {
            let records = strongest_first(records);
            info!("scan: found {} networks", records.len());
            for record in &records {
                info!(
                    "scan: {} bssid={} auth={}",
                    listing_row(record),
                    record.bssid(),
                    record.auth_label()
                );
            }
            Ok(records.len())
        }
        Err(failure) => {
            for line in failure_lines(&failure, LISTING_ROW_CHARS) {
                warn!("scan: {}", line);
            }
            Err(failure)
        }
    }
}
