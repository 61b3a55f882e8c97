//! Screen enumeration and access traits.
//!
//! A [`ScreenBus`] lists the attached screens in enumeration order and opens
//! them one at a time. An opened [`Screen`] is closed when dropped.

use crate::identifier::DisplayId;
use crate::lcd::Framebuffer;
use crate::Result;

/// Enumeration record for one attached screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenInfo {
    /// Platform path used to open the screen.
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial: Option<String>,
    pub interface: i32,
}

impl ScreenInfo {
    /// One-line description of the screen's USB identity.
    pub fn describe(&self) -> String {
        let product = self.product.as_deref().unwrap_or("Artista screen");
        let mut text = match &self.manufacturer {
            Some(manufacturer) => format!("{} by {}", product, manufacturer),
            None => product.to_string(),
        };
        text.push_str(&format!(
            " (VID:{:04X} PID:{:04X}",
            self.vendor_id, self.product_id
        ));
        if let Some(serial) = &self.serial {
            text.push_str(&format!(", serial {}", serial));
        }
        text.push_str(&format!(", interface {}, path {})", self.interface, self.path));
        text
    }
}

/// An opened screen.
pub trait Screen {
    /// Number of pixel columns (width).
    fn columns(&self) -> u16;

    /// Number of pixel lines (height).
    fn lines(&self) -> u16;

    /// Total pixel count.
    fn pixels(&self) -> usize {
        self.columns() as usize * self.lines() as usize
    }

    /// Firmware version as (major, minor).
    fn firmware(&self) -> (u8, u8);

    /// Reads the identifier stored in the screen.
    fn display_id(&mut self) -> Result<DisplayId>;

    /// Stores a new identifier in the screen.
    fn set_display_id(&mut self, id: &DisplayId) -> Result<()>;

    /// Switches display power.
    fn set_display_power(&mut self, on: bool) -> Result<()>;

    /// Switches the backlight.
    fn set_backlight(&mut self, on: bool) -> Result<()>;

    /// Transfers a full framebuffer; returns the number of bytes accepted.
    fn write(&mut self, framebuffer: &Framebuffer) -> Result<usize>;
}

/// Source of attached screens.
pub trait ScreenBus {
    type Screen: Screen;

    /// Lists attached screens in enumeration order.
    fn enumerate(&self) -> Result<Vec<ScreenInfo>>;

    /// Opens one enumerated screen.
    fn open(&self, info: &ScreenInfo) -> Result<Self::Screen>;
}
