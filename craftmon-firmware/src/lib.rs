#![no_std]

extern crate alloc;

pub mod fetch;
pub mod http;
pub mod ssd1306;
pub mod wifi;
