//! Artista Screen Hardware Library
//!
//! Enumerates USB-attached Artista LCD screens, packs images into their
//! RGB565 framebuffer format and drives power, backlight and the
//! firmware-held display identifier.

pub mod bus;
pub mod control;
pub mod error;
pub mod identifier;
pub mod lcd;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use bus::{Screen, ScreenBus, ScreenInfo};
pub use control::{Controller, ScreenListing, StampOutcome};
pub use error::{Error, Result};
pub use identifier::DisplayId;
pub use lcd::{Framebuffer, UsbBus, UsbScreen};

/// Default USB VID:PID of Artista screens.
pub const ARTISTA_VID: u16 = 0x16C0;
pub const ARTISTA_PID: u16 = 0x08AC;

/// Timeout for a single transfer acknowledgement, in milliseconds.
pub const SCREEN_TIMEOUT_MS: i32 = 5000;
