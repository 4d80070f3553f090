#![cfg_attr(not(test), no_std)]

//! Hardware-independent core of the badge firmware: Wi-Fi scanning with
//! channel fallback, scan configuration and the heap reclamation hook.

extern crate alloc;

pub mod config;
pub mod memory;
pub mod wifi;
