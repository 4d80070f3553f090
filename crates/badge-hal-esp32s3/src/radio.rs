//! Wi-Fi station radio backed by `esp-radio`.

use alloc::{format, vec::Vec};

use badge_core::{
    memory::HeapReclaim,
    wifi::{
        Bssid, ChannelCall, ChannelError, FULL_BAND, MAX_CHANNEL, NetworkRecord, RadioHandle,
        ScanError,
    },
};
use esp_radio::wifi::{
    AccessPointInfo, AuthMethod, ClientConfig, InternalWifiError, ModeConfig, ScanConfig,
    WifiController, WifiError,
};
use log::{debug, info};

/// Upper bound on access points kept from a single scan.
const SCAN_MAX_APS: usize = 64;

/// Station-mode scanner owning the Wi-Fi controller.
///
/// Channel selection is applied per scan: the driver has no standalone
/// "tune to channel" call in station mode, so the override is carried into
/// the next `ScanConfig`.
pub struct EspRadio<'d> {
    controller: WifiController<'d>,
    channel: u8,
    configured: bool,
}

impl<'d> EspRadio<'d> {
    pub fn new(controller: WifiController<'d>) -> Self {
        Self {
            controller,
            channel: FULL_BAND,
            configured: false,
        }
    }

    pub fn controller(&mut self) -> &mut WifiController<'d> {
        &mut self.controller
    }

    pub fn into_controller(self) -> WifiController<'d> {
        self.controller
    }

    fn ensure_started(&mut self) -> Result<(), ScanError> {
        if !self.configured {
            self.controller
                .set_config(&ModeConfig::Client(ClientConfig::default()))
                .map_err(map_wifi_error)?;
            self.configured = true;
        }

        if !self.controller.is_started().unwrap_or(false) {
            info!("radio: starting wifi station");
            self.controller.start().map_err(map_wifi_error)?;
        }
        Ok(())
    }

    fn scan_config(&self) -> ScanConfig<'static> {
        let config = ScanConfig::default()
            .with_show_hidden(true)
            .with_max(SCAN_MAX_APS);
        if self.channel == FULL_BAND {
            config
        } else {
            config.with_channel(self.channel)
        }
    }
}

impl RadioHandle for EspRadio<'_> {
    fn scan(&mut self) -> Result<Vec<NetworkRecord>, ScanError> {
        self.ensure_started()?;

        let config = self.scan_config();
        let access_points = self
            .controller
            .scan_with_config(config)
            .map_err(map_wifi_error)?;
        debug!(
            "radio: scan channel={} found={}",
            self.channel,
            access_points.len()
        );

        Ok(access_points.iter().map(network_record).collect())
    }

    fn channel(&mut self) -> Result<u8, ChannelError> {
        Ok(self.channel)
    }

    fn set_channel(&mut self, call: ChannelCall) -> Result<(), ChannelError> {
        match call {
            ChannelCall::Direct(channel) if channel <= MAX_CHANNEL => {
                self.channel = channel;
                Ok(())
            }
            ChannelCall::Direct(channel) => Err(ChannelError::InvalidArgument(channel)),
            ChannelCall::Parameter(_) => Err(ChannelError::CallShape),
        }
    }
}

fn network_record(ap: &AccessPointInfo) -> NetworkRecord {
    NetworkRecord::new(
        ap.ssid.as_bytes(),
        Bssid(ap.bssid),
        ap.channel,
        ap.signal_strength,
        auth_code(ap.auth_method),
    )
}

/// Numeric auth codes shared with the display listing.
fn auth_code(method: Option<AuthMethod>) -> u8 {
    match method {
        None | Some(AuthMethod::None) => 0,
        Some(AuthMethod::Wep) => 1,
        Some(AuthMethod::Wpa) => 2,
        Some(AuthMethod::Wpa2Personal) => 3,
        Some(AuthMethod::WpaWpa2Personal) => 4,
        Some(AuthMethod::Wpa2Enterprise) => 5,
        Some(AuthMethod::Wpa3Personal) => 6,
        Some(AuthMethod::Wpa2Wpa3Personal) => 7,
        Some(_) => u8::MAX,
    }
}

fn map_wifi_error(err: WifiError) -> ScanError {
    match err {
        WifiError::InternalError(InternalWifiError::NoMem) => ScanError::OutOfMemory,
        other => ScanError::driver(format!("{other:?}")),
    }
}

/// Logs heap usage before a memory-starved scan is retried.
///
/// `esp-alloc` has no compaction, so the retry relies on the driver having
/// released its scan buffers in between; the numbers make that visible.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapStatsReclaim;

impl HeapReclaim for HeapStatsReclaim {
    fn reclaim(&mut self) {
        info!(
            "heap: before retry used={} free={}",
            esp_alloc::HEAP.used(),
            esp_alloc::HEAP.free()
        );
    }
}
