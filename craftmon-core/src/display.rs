//! Display surface capability
//!
//! Defines the interface renderers draw through. There is a single thread
//! of control, so whichever component currently holds the surface owns it
//! outright and no locking sits behind this trait.

/// Pixel width of the target display.
pub const WIDTH: u32 = 128;

/// Pixel height of the target display.
pub const HEIGHT: u32 = 64;

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// Communication error with the display controller.
    Communication,
    /// A formatted line exceeded its buffer.
    BufferOverflow,
}

/// Monochrome text display surface.
pub trait StatusDisplay {
    /// Clear the draw buffer.
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw text with its top-left corner at the given pixel position.
    fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayError>;

    /// Push the draw buffer to the panel.
    fn flush(&mut self) -> Result<(), DisplayError>;
}
