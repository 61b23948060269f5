//! Board-agnostic core logic for the craftmon status monitor
//!
//! Everything that does not touch hardware lives here:
//!
//! - wire-format decoding for the two status endpoints
//! - the display surface capability and the fixed screen layouts
//! - the wireless connectivity manager with its bounded retry policy
//! - scheduling primitives for the alternating poll loop
//!
//! The firmware crate binds these to the ESP32 radio, network stack and
//! OLED controller.

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod fetch;
pub mod link;
pub mod mcstatus;
pub mod panel;
pub mod schedule;
pub mod screens;
