//! Error types for the Artista hardware library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when interacting with the screens.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested screen index is not in the enumerated range.
    #[error("screen {0} does not exist")]
    ScreenNotFound(String),

    /// No screen carries the requested identifier.
    #[error("no screen with id '{0}'")]
    IdNotFound(String),

    /// Screen index argument is not a number or `all`.
    #[error("invalid screen index: {0}")]
    InvalidIndex(String),

    /// The screen list could not be read.
    #[error("screen bus unavailable: {0}")]
    Bus(String),

    /// USB HID communication error.
    #[error("USB HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// Image decoding or encoding error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The screen rejected or truncated a framebuffer write.
    #[error("writing to screen {screen} failed: {reason}")]
    Write { screen: String, reason: String },

    /// The screen did not acknowledge a transfer in time.
    #[error("screen did not answer within {0}ms")]
    Timeout(i32),

    /// The screen answered with a malformed report.
    #[error("malformed reply from screen: {0}")]
    BadReply(String),

    /// Framebuffer size mismatch.
    #[error("Framebuffer size mismatch: expected {expected}, got {actual}")]
    FramebufferSize { expected: usize, actual: usize },
}
