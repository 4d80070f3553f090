#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

extern crate alloc;

use badge_core::config::{BadgeConfig, ConfigOverrides};
use badge_hal_esp32s3::radio::EspRadio;
use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};
use log::{info, warn};

#[path = "main/scan_job.rs"]
mod scan_job;

// Build-time overrides, e.g. `BADGE_SCAN_CHANNELS="1,6,11" cargo run --release`.
const CONFIG_OVERRIDES: ConfigOverrides<'static> = ConfigOverrides {
    channels: option_env!("BADGE_SCAN_CHANNELS"),
    max_full_attempts: option_env!("BADGE_SCAN_FULL_ATTEMPTS"),
    scan_on_startup: option_env!("BADGE_SCAN_ON_STARTUP"),
    rescan_interval_secs: option_env!("BADGE_RESCAN_INTERVAL_SECS"),
    debug: option_env!("BADGE_DEBUG"),
};

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

async fn halt() -> ! {
    loop {
        Timer::after_secs(1).await;
    }
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    let (config, config_error) = match BadgeConfig::from_overrides(CONFIG_OVERRIDES) {
        Ok(config) => (config, None),
        Err(err) => (BadgeConfig::default(), Some(err)),
    };

    esp_println::logger::init_logger(config.log_level());
    esp_println::println!("boot: badge starting");
    if let Some(err) = config_error {
        warn!("config override rejected ({}); using defaults", err);
    }

    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let radio_ctrl = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            halt().await
        }
    };

    let wifi_config = esp_radio::wifi::Config::default();
    let (wifi_controller, _interfaces) =
        match esp_radio::wifi::new(&radio_ctrl, peripherals.WIFI, wifi_config) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                halt().await
            }
        };

    info!(
        "Badge started: heap_free={} debug={}",
        esp_alloc::HEAP.free(),
        config.debug
    );

    let mut radio = EspRadio::new(wifi_controller);
    scan_job::scan_loop(&mut radio, &config.scan).await
}
