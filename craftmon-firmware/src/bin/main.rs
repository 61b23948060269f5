//! Craftmon Firmware - ESP32-S3 OLED Status Monitor
//!
//! Joins the configured network once at boot, then alternates forever
//! between the game-server status endpoint and the MCSManager panel,
//! rendering each result to the SSD1306.
//!
//! Environment variables required:
//! - WIFI_SSID: WiFi network name
//! - WIFI_PASS: WiFi password
//! - MCSM_URL: MCSManager base URL (e.g. http://192.168.1.10:23333)
//! - MCSM_API_KEY: MCSManager API key
//! - MC_STATUS_URL: game status service base URL
//! - MC_SERVER_IP: game server address to query

#![no_std]
#![no_main]

extern crate alloc;

use craftmon_core::link::{self, ConnectConfig, ConnectivityState, JoinFailurePolicy};
use craftmon_core::schedule::{CancelToken, POLL_INTERVAL_SECS, PollSlot};
use craftmon_core::screens;
use craftmon_firmware::fetch;
use craftmon_firmware::ssd1306::Ssd1306;
use craftmon_firmware::wifi::WifiLink;
use embassy_executor::Spawner;
use embassy_net::{Runner, Stack, StackResources};
use embassy_time::{Delay, Duration, Timer};
use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{
    clock::CpuClock,
    i2c::master::{Config as I2cConfig, I2c},
    rng::Rng,
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_radio::{
    Controller,
    wifi::{Config as WifiConfig, WifiDevice},
};
use log::{error, info, warn};

esp_bootloader_esp_idf::esp_app_desc!();

// When you are okay with using a nightly compiler it's better to use https://docs.rs/static_cell/2.1.0/static_cell/macro.make_static.html
macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

const SSID: &str = env!("WIFI_SSID");
const PASSWORD: &str = env!("WIFI_PASS");

/// MCSManager remote-services endpoint, keyed at build time.
const PANEL_URL: &str = concat!(
    env!("MCSM_URL"),
    "/api/service/remote_services_system?apikey=",
    env!("MCSM_API_KEY"),
);

/// Game-server status endpoint.
const GAME_URL: &str = concat!(env!("MC_STATUS_URL"), "/api/?ip=", env!("MC_SERVER_IP"));

/// Join retry budget.
const MAX_RETRIES: u32 = 10;
const RETRY_DELAY_SECS: u32 = 5;

/// What to do when the join retry budget is exhausted.
const ON_JOIN_FAILURE: JoinFailurePolicy = JoinFailurePolicy::ProceedDegraded;

/// Cooperative stop flag for the poll loop; nothing on the device sets it.
static SHUTDOWN: CancelToken = CancelToken::new();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // Init logger first so we can see any early crashes
    esp_println::logger::init_logger_from_env();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("Initializing heap...");
    esp_alloc::heap_allocator!(size: 72 * 1024);

    info!("Starting RTOS...");
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(
        timg0.timer0,
        #[cfg(target_arch = "riscv32")]
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT)
            .software_interrupt0,
    );

    // ==================== OLED Setup ====================
    // SSD1306 on I2C0: SDA=GPIO47, SCL=GPIO48, address 0x3C
    let i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(400)),
    )
    .expect("I2C init failed")
    .with_sda(peripherals.GPIO47)
    .with_scl(peripherals.GPIO48);

    let mut oled = Ssd1306::new(i2c);
    if let Err(e) = oled.init() {
        // A dead panel leaves the serial log as the only output; the
        // monitor still runs.
        error!("OLED init failed: {:?}", e);
    }

    // ==================== WiFi Setup ====================
    let rng = Rng::new();
    let esp_radio_ctrl = mk_static!(Controller<'static>, esp_radio::init().unwrap());

    let (wifi_controller, ifaces) =
        esp_radio::wifi::new(esp_radio_ctrl, peripherals.WIFI, WifiConfig::default()).unwrap();

    let net_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, runner) = embassy_net::new(
        ifaces.sta,
        net_config,
        mk_static!(StackResources<3>, StackResources::<3>::new()),
        (rng.random() as u64) << 32 | rng.random() as u64,
    );
    let stack = mk_static!(Stack<'static>, stack);
    spawner.spawn(net_task(runner)).ok();

    // ==================== Join (sole gate before the loop) ====================
    let mut delay = Delay;
    let mut wifi_link = WifiLink::new(wifi_controller, *stack);
    let connect_config = ConnectConfig {
        ssid: SSID,
        password: PASSWORD,
        max_retries: MAX_RETRIES,
        retry_delay_secs: RETRY_DELAY_SECS,
    };

    let state = link::connect(&mut wifi_link, &mut oled, &mut delay, &connect_config).await;
    if state == ConnectivityState::Failed {
        match ON_JOIN_FAILURE {
            JoinFailurePolicy::ProceedDegraded => {
                warn!("no network link; polling anyway in degraded mode");
            }
            JoinFailurePolicy::Halt => {
                error!("no network link; halting before the poll loop");
                loop {
                    Timer::after(Duration::from_secs(3600)).await;
                }
            }
        }
    }

    // ==================== Poll Loop ====================
    info!("polling every {}s", POLL_INTERVAL_SECS);

    let mut tick: u32 = 0;
    loop {
        if SHUTDOWN.is_cancelled() {
            info!("shutdown requested, leaving poll loop");
            break;
        }

        let drawn = match PollSlot::for_tick(tick) {
            PollSlot::GameServer => {
                let snapshot = fetch::fetch_game(*stack, GAME_URL).await;
                screens::game_status(&mut oled, &snapshot)
            }
            PollSlot::PanelService => {
                let outcome = fetch::fetch_panel(*stack, PANEL_URL).await;
                screens::panel_status(&mut oled, &outcome)
            }
        };
        if let Err(e) = drawn {
            warn!("screen render failed: {:?}", e);
        }

        tick = tick.wrapping_add(1);
        Timer::after(Duration::from_secs(POLL_INTERVAL_SECS)).await;
    }

    // Only reachable through the cancel token; idle with the radio quiet.
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
