//! WirelessLink implementation over the esp-radio controller
//!
//! "Joined" here means associated with an IPv4 address bound, which is
//! what the connectivity manager polls for before declaring the link up.

use core::net::Ipv4Addr;

use craftmon_core::link::WirelessLink;
use embassy_net::Stack;
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiError};
use log::debug;

pub struct WifiLink<'d> {
    controller: WifiController<'d>,
    stack: Stack<'d>,
}

impl<'d> WifiLink<'d> {
    pub fn new(controller: WifiController<'d>, stack: Stack<'d>) -> Self {
        Self { controller, stack }
    }
}

impl WirelessLink for WifiLink<'_> {
    type Error = WifiError;

    fn activate(&mut self) -> Result<(), Self::Error> {
        // The station interface exists from radio init on; the controller
        // itself cannot start until credentials are configured in join().
        debug!("station interface ready");
        Ok(())
    }

    fn join(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error> {
        let config = ModeConfig::Client(
            ClientConfig::default()
                .with_ssid(ssid.into())
                .with_password(password.into()),
        );
        self.controller.set_config(&config)?;

        if !matches!(self.controller.is_started(), Ok(true)) {
            self.controller.start()?;
        }
        debug!("starting association with {}", ssid);
        self.controller.connect()
    }

    fn is_joined(&mut self) -> bool {
        matches!(self.controller.is_connected(), Ok(true)) && self.stack.config_v4().is_some()
    }

    fn address_info(&mut self) -> Option<Ipv4Addr> {
        self.stack.config_v4().map(|config| config.address.address().into())
    }
}
