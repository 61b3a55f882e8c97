//! LCD screen module.
//!
//! Provides RGB565 framebuffers, image packing and USB HID access to
//! Artista screens.

mod device;
pub mod packer;
pub mod protocol;

pub mod framebuffer;

pub use device::{UsbBus, UsbScreen};
pub use framebuffer::{rgb16_to_rgb565, Framebuffer};
