//! Badge configuration values and their parsing.
//!
//! The firmware bakes overrides in at build time; anything richer (a config
//! file on flash) plugs in through [`ConfigStore`].

use core::fmt;

use heapless::Vec;
use log::LevelFilter;

use crate::wifi::{DEFAULT_CHANNELS, DEFAULT_MAX_FULL_ATTEMPTS, MAX_CHANNEL};

pub type ChannelList = Vec<u8, { MAX_CHANNEL as usize }>;

const DEFAULT_RESCAN_INTERVAL_SECS: u32 = 60;
const RESCAN_BACKOFF_MAX_SECS: u64 = 900;
const MAX_FULL_ATTEMPTS_LIMIT: u8 = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    EmptyChannelList,
    InvalidChannel,
    ChannelOutOfRange(u8),
    DuplicateChannel(u8),
    InvalidNumber,
    AttemptsOutOfRange(u8),
    InvalidFlag,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyChannelList => f.write_str("channel list is empty"),
            Self::InvalidChannel => f.write_str("channel is not a number"),
            Self::ChannelOutOfRange(channel) => {
                write!(f, "channel {channel} outside 1..={MAX_CHANNEL}")
            }
            Self::DuplicateChannel(channel) => write!(f, "channel {channel} listed twice"),
            Self::InvalidNumber => f.write_str("value is not a number"),
            Self::AttemptsOutOfRange(attempts) => write!(
                f,
                "full scan attempts {attempts} outside 1..={MAX_FULL_ATTEMPTS_LIMIT}"
            ),
            Self::InvalidFlag => f.write_str("flag must be one of 1/0/true/false/yes/no/on/off"),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Wi-Fi scanning behaviour.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanSettings {
    pub channels: ChannelList,
    pub max_full_attempts: u8,
    pub scan_on_startup: bool,
    pub rescan_interval_secs: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        let mut channels = ChannelList::new();
        for channel in DEFAULT_CHANNELS {
            // Capacity equals the default list length.
            let _ = channels.push(channel);
        }

        Self {
            channels,
            max_full_attempts: DEFAULT_MAX_FULL_ATTEMPTS,
            scan_on_startup: true,
            rescan_interval_secs: DEFAULT_RESCAN_INTERVAL_SECS,
        }
    }
}

impl ScanSettings {
    /// Delay before the next scan. Each consecutive failure doubles the
    /// interval (up to 16x), capped at 15 minutes unless the configured
    /// interval is already longer.
    pub fn rescan_delay_secs(&self, consecutive_failures: u32) -> u64 {
        let base = u64::from(self.rescan_interval_secs.max(1));
        let shift = consecutive_failures.min(4);
        base.saturating_mul(1u64 << shift).min(RESCAN_BACKOFF_MAX_SECS.max(base))
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BadgeConfig {
    pub scan: ScanSettings,
    pub debug: bool,
}

/// Raw override strings, typically `option_env!` values.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfigOverrides<'a> {
    pub channels: Option<&'a str>,
    pub max_full_attempts: Option<&'a str>,
    pub scan_on_startup: Option<&'a str>,
    pub rescan_interval_secs: Option<&'a str>,
    pub debug: Option<&'a str>,
}

impl BadgeConfig {
    /// Defaults with every present override applied. The first invalid
    /// override aborts with its error.
    pub fn from_overrides(overrides: ConfigOverrides<'_>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = overrides.channels {
            config.scan.channels = parse_channel_list(raw)?;
        }
        if let Some(raw) = overrides.max_full_attempts {
            config.scan.max_full_attempts = parse_attempts(raw)?;
        }
        if let Some(raw) = overrides.scan_on_startup {
            config.scan.scan_on_startup = parse_flag(raw)?;
        }
        if let Some(raw) = overrides.rescan_interval_secs {
            config.scan.rescan_interval_secs =
                raw.trim().parse().map_err(|_| ConfigError::InvalidNumber)?;
        }
        if let Some(raw) = overrides.debug {
            config.debug = parse_flag(raw)?;
        }

        Ok(config)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

/// Parses `"1,6,11"` (commas and/or spaces) into an ordered channel list.
pub fn parse_channel_list(raw: &str) -> Result<ChannelList, ConfigError> {
    let mut channels = ChannelList::new();

    for token in raw
        .split(|c: char| c == ',' || c.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
    {
        let channel: u8 = token.parse().map_err(|_| ConfigError::InvalidChannel)?;
        if channel == 0 || channel > MAX_CHANNEL {
            return Err(ConfigError::ChannelOutOfRange(channel));
        }
        if channels.contains(&channel) {
            return Err(ConfigError::DuplicateChannel(channel));
        }
        // Distinct values in 1..=MAX_CHANNEL always fit.
        let _ = channels.push(channel);
    }

    if channels.is_empty() {
        return Err(ConfigError::EmptyChannelList);
    }
    Ok(channels)
}

pub fn parse_flag(raw: &str) -> Result<bool, ConfigError> {
    let raw = raw.trim();
    const TRUE: [&str; 4] = ["1", "true", "yes", "on"];
    const FALSE: [&str; 4] = ["0", "false", "no", "off"];

    if TRUE.iter().any(|word| raw.eq_ignore_ascii_case(word)) {
        Ok(true)
    } else if FALSE.iter().any(|word| raw.eq_ignore_ascii_case(word)) {
        Ok(false)
    } else {
        Err(ConfigError::InvalidFlag)
    }
}

fn parse_attempts(raw: &str) -> Result<u8, ConfigError> {
    let attempts: u8 = raw.trim().parse().map_err(|_| ConfigError::InvalidNumber)?;
    if attempts == 0 || attempts > MAX_FULL_ATTEMPTS_LIMIT {
        return Err(ConfigError::AttemptsOutOfRange(attempts));
    }
    Ok(attempts)
}

/// Persistence backend for the badge configuration.
///
/// This is the seam for a config-file loader on flash. The firmware ships
/// without one and builds its config from [`BadgeConfig::from_overrides`].
/// `load` answers `Ok(None)` when nothing has been saved yet.
pub trait ConfigStore {
    type Error;

    fn load(&mut self) -> Result<Option<BadgeConfig>, Self::Error>;
    fn save(&mut self, config: &BadgeConfig) -> Result<(), Self::Error>;
}
