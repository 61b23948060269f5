//! SSD1306 OLED display driver
//!
//! Driver for 128x64 SSD1306-based OLED displays via I2C. Pixels
//! accumulate in a paged frame buffer; `flush` pushes the whole buffer in
//! a single data write using horizontal addressing.

use craftmon_core::display::{DisplayError, HEIGHT, StatusDisplay, WIDTH};
use embedded_graphics::Drawable;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics_core::Pixel;
use embedded_graphics_core::draw_target::DrawTarget;
use embedded_graphics_core::geometry::{OriginDimensions, Point, Size};
use embedded_graphics_core::pixelcolor::BinaryColor;
use log::warn;

/// SSD1306 I2C address (0x3D with the address strap high)
const ADDR: u8 = 0x3C;

const PAGES: usize = HEIGHT as usize / 8;

/// SSD1306 commands
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_ADDR_MODE: u8 = 0x20;
    pub const SET_COL_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const RAM_TO_DISPLAY: u8 = 0xA4;
}

/// SSD1306 driver with a local frame buffer
pub struct Ssd1306<I2C> {
    i2c: I2C,
    /// Frame buffer (1 bit per pixel, organized as pages)
    buffer: [[u8; WIDTH as usize]; PAGES],
}

impl<I2C> Ssd1306<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Create a new SSD1306 driver
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            buffer: [[0; WIDTH as usize]; PAGES],
        }
    }

    /// Initialize the display
    pub fn init(&mut self) -> Result<(), DisplayError> {
        let init_cmds: &[u8] = &[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80, // Default clock
            cmd::SET_MUX_RATIO,
            0x3F, // 64 lines
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14, // Enable charge pump
            cmd::SET_ADDR_MODE,
            0x00,                  // Horizontal addressing
            cmd::SET_SEG_REMAP,    // Flip horizontally
            cmd::SET_COM_SCAN_DEC, // Flip vertically
            cmd::SET_COM_PINS,
            0x12, // Alternative COM config
            cmd::SET_CONTRAST,
            0xCF, // High contrast
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::RAM_TO_DISPLAY,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ];

        for &c in init_cmds {
            self.command(c)?;
        }
        Ok(())
    }

    /// Send a command to the display
    fn command(&mut self, c: u8) -> Result<(), DisplayError> {
        self.i2c.write(ADDR, &[0x00, c]).map_err(bus_error)
    }

    /// Set a pixel in the frame buffer, ignoring out-of-bounds writes
    fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return;
        }
        let bit = 1u8 << (y % 8);
        let column = &mut self.buffer[(y / 8) as usize][x as usize];
        if on {
            *column |= bit;
        } else {
            *column &= !bit;
        }
    }
}

fn bus_error<E: core::fmt::Debug>(e: E) -> DisplayError {
    warn!("oled i2c write failed: {:?}", e);
    DisplayError::Communication
}

impl<I2C> OriginDimensions for Ssd1306<I2C> {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

impl<I2C> DrawTarget for Ssd1306<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}

impl<I2C> StatusDisplay for Ssd1306<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn clear(&mut self) -> Result<(), DisplayError> {
        for page in self.buffer.iter_mut() {
            page.fill(0);
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayError> {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
            .draw(self)
            .map_err(|_| DisplayError::Communication)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.i2c
            .write(ADDR, &[0x00, cmd::SET_COL_ADDR, 0, (WIDTH - 1) as u8])
            .map_err(bus_error)?;
        self.i2c
            .write(ADDR, &[0x00, cmd::SET_PAGE_ADDR, 0, (PAGES - 1) as u8])
            .map_err(bus_error)?;

        // One data write for the whole frame: control byte, then pages in
        // row-major order (horizontal addressing auto-advances)
        let mut frame = [0u8; 1 + WIDTH as usize * PAGES];
        frame[0] = 0x40;
        for (page, chunk) in self.buffer.iter().enumerate() {
            let start = 1 + page * WIDTH as usize;
            frame[start..start + WIDTH as usize].copy_from_slice(chunk);
        }
        self.i2c.write(ADDR, &frame).map_err(bus_error)
    }
}
