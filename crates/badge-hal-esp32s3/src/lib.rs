#![no_std]

//! ESP32-S3 bindings for the badge core traits.

extern crate alloc;

pub mod radio;
