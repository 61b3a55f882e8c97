//! Screen operations behind each control verb.
//!
//! Every operation enumerates the bus, locates its target by enumeration
//! index or display id, opens it, issues one or two requests and drops the
//! handle again.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::bus::{Screen, ScreenBus};
use crate::identifier::DisplayId;
use crate::lcd::{packer, Framebuffer};
use crate::{Error, Result};

/// Listing entry for one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenListing {
    pub index: usize,
    pub description: String,
    pub columns: u16,
    pub lines: u16,
    pub firmware: (u8, u8),
    pub display_id: DisplayId,
}

/// Result of stamping one screen.
#[derive(Debug)]
pub struct StampOutcome {
    pub index: usize,
    pub display_id: DisplayId,
    /// Bytes sent, or the write error.
    pub sent: Result<usize>,
}

/// Runs screen operations against a bus.
pub struct Controller<B> {
    bus: B,
}

impl<B: ScreenBus> Controller<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Returns the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Opens every screen and describes it.
    pub fn list(&self) -> Result<Vec<ScreenListing>> {
        let infos = self.bus.enumerate()?;
        let mut screens = infos
            .iter()
            .map(|info| self.bus.open(info))
            .collect::<Result<Vec<_>>>()?;

        let mut listing = Vec::with_capacity(screens.len());
        for (index, (info, screen)) in infos.iter().zip(screens.iter_mut()).enumerate() {
            listing.push(ScreenListing {
                index,
                description: info.describe(),
                columns: screen.columns(),
                lines: screen.lines(),
                firmware: screen.firmware(),
                display_id: screen.display_id()?,
            });
        }
        Ok(listing)
    }

    /// Shows an image file on the screen at enumeration index `screen`.
    ///
    /// Power and backlight stay on afterwards. Returns the bytes sent.
    pub fn show<P: AsRef<Path>>(&self, screen: &str, path: P) -> Result<usize> {
        let mut handle = self.open_index(screen)?;
        display_file(&mut handle, screen, path.as_ref())
    }

    /// Switches power and backlight off on one screen, or on every screen
    /// when `screen` is `all`.
    pub fn reset(&self, screen: &str) -> Result<()> {
        if screen == "all" {
            let count = self.reset_all()?;
            info!("Reset {} screen(s)", count);
            return Ok(());
        }

        let mut handle = self.open_index(screen)?;
        blank(&mut handle)?;
        info!("Screen {} reset", screen);
        Ok(())
    }

    /// Switches power and backlight off on every screen.
    pub fn reset_all(&self) -> Result<usize> {
        let infos = self.bus.enumerate()?;
        for info in &infos {
            let mut handle = self.bus.open(info)?;
            blank(&mut handle)?;
        }
        Ok(infos.len())
    }

    /// Writes a generated test image to every screen.
    ///
    /// `render` receives the enumeration index, the screen's id and its
    /// geometry. A failed write is reported in the outcome and does not stop
    /// the remaining screens.
    pub fn stamp<F>(&self, render: F) -> Result<Vec<StampOutcome>>
    where
        F: Fn(usize, &DisplayId, u16, u16) -> Framebuffer,
    {
        let infos = self.bus.enumerate()?;
        let mut screens = infos
            .iter()
            .map(|info| self.bus.open(info))
            .collect::<Result<Vec<_>>>()?;

        let mut outcomes = Vec::with_capacity(screens.len());
        for (index, screen) in screens.iter_mut().enumerate() {
            let display_id = screen.display_id()?;
            let frame = render(index, &display_id, screen.columns(), screen.lines());
            screen.set_display_power(true)?;
            screen.set_backlight(true)?;
            let sent = screen.write(&frame);
            if let Err(e) = &sent {
                warn!("Stamping screen {} failed: {}", index, e);
            }
            outcomes.push(StampOutcome {
                index,
                display_id,
                sent,
            });
        }
        Ok(outcomes)
    }

    /// Returns the display ids of all screens in enumeration order.
    pub fn ids(&self) -> Result<Vec<DisplayId>> {
        self.bus
            .enumerate()?
            .iter()
            .map(|info| self.bus.open(info)?.display_id())
            .collect()
    }

    /// Renames the first screen whose id is `old_id`.
    ///
    /// Returns false, leaving every screen untouched, when none matches.
    pub fn set_id(&self, old_id: &str, new_id: &str) -> Result<bool> {
        let new_id = DisplayId::new(new_id);
        for info in self.bus.enumerate()? {
            let mut handle = self.bus.open(&info)?;
            if handle.display_id()? == old_id {
                handle.set_display_id(&new_id)?;
                info!("Screen '{}' relabelled as '{}'", old_id, new_id);
                return Ok(true);
            }
        }
        warn!("No screen with id '{}', nothing relabelled", old_id);
        Ok(false)
    }

    /// Sets the id of the screen at enumeration index `screen`.
    pub fn set_id_by_index(&self, screen: &str, new_id: &str) -> Result<()> {
        let mut handle = self.open_index(screen)?;
        let new_id = DisplayId::new(new_id);
        handle.set_display_id(&new_id)?;
        info!("Screen {} id set to '{}'", screen, new_id);
        Ok(())
    }

    /// Shows an image file on the first screen whose id is `display_id`.
    pub fn show_by_id<P: AsRef<Path>>(&self, path: P, display_id: &str) -> Result<usize> {
        for info in self.bus.enumerate()? {
            let mut handle = self.bus.open(&info)?;
            if handle.display_id()? == display_id {
                return display_file(&mut handle, display_id, path.as_ref());
            }
        }
        Err(Error::IdNotFound(display_id.to_string()))
    }

    fn open_index(&self, screen: &str) -> Result<B::Screen> {
        let infos = self.bus.enumerate()?;
        let index = parse_index(screen, infos.len())?;
        debug!("Opening screen {} ({})", index, infos[index].path);
        self.bus.open(&infos[index])
    }
}

/// Parses a screen index argument against the enumerated count.
pub fn parse_index(screen: &str, count: usize) -> Result<usize> {
    let index: i64 = screen
        .trim()
        .parse()
        .map_err(|_| Error::InvalidIndex(screen.to_string()))?;
    usize::try_from(index)
        .ok()
        .filter(|&i| i < count)
        .ok_or_else(|| Error::ScreenNotFound(screen.to_string()))
}

fn blank<S: Screen>(screen: &mut S) -> Result<()> {
    screen.set_display_power(false)?;
    screen.set_backlight(false)
}

fn display_file<S: Screen>(screen: &mut S, label: &str, path: &Path) -> Result<usize> {
    let frame = packer::load(path, screen.columns(), screen.lines())?;
    screen.set_display_power(true)?;
    screen.set_backlight(true)?;
    let sent = screen.write(&frame).map_err(|e| Error::Write {
        screen: label.to_string(),
        reason: e.to_string(),
    })?;
    info!("Sent {} bytes of {} to screen {}", sent, path.display(), label);
    Ok(sent)
}
