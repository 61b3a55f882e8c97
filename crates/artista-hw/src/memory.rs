//! In-memory screen bus.
//!
//! Simulates a bank of screens so the controller, the CLI and the manager can
//! be exercised without hardware. Clones share the same screens.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::bus::{Screen, ScreenBus, ScreenInfo};
use crate::identifier::DisplayId;
use crate::lcd::Framebuffer;
use crate::{Error, Result, ARTISTA_PID, ARTISTA_VID};

/// State of one simulated screen.
#[derive(Debug, Clone)]
pub struct MemoryScreenState {
    pub info: ScreenInfo,
    pub columns: u16,
    pub lines: u16,
    pub display_id: DisplayId,
    pub power: bool,
    pub backlight: bool,
    /// Last framebuffer written.
    pub frame: Option<Framebuffer>,
    /// Number of completed writes.
    pub writes: usize,
    /// Fail every write when set.
    pub failing: bool,
    /// Refuse identifier changes when set.
    pub id_locked: bool,
}

/// Shared bank of simulated screens.
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    screens: Arc<Mutex<Vec<MemoryScreenState>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryBus {
    /// Creates a bus with no screens attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a screen and returns the bus.
    pub fn with_screen(self, columns: u16, lines: u16, id: &str) -> Self {
        self.attach(columns, lines, id);
        self
    }

    /// Attaches a screen at the end of the enumeration order.
    pub fn attach(&self, columns: u16, lines: u16, id: &str) {
        let mut screens = self.screens.lock().unwrap();
        let index = screens.len();
        screens.push(MemoryScreenState {
            info: ScreenInfo {
                path: format!("memory:{}", index),
                vendor_id: ARTISTA_VID,
                product_id: ARTISTA_PID,
                manufacturer: Some("Simulated".to_string()),
                product: Some("Artista".to_string()),
                serial: None,
                interface: 0,
            },
            columns,
            lines,
            display_id: DisplayId::new(id),
            power: false,
            backlight: false,
            frame: None,
            writes: 0,
            failing: false,
            id_locked: false,
        });
    }

    /// Returns a snapshot of one screen.
    pub fn screen(&self, index: usize) -> Option<MemoryScreenState> {
        self.screens.lock().unwrap().get(index).cloned()
    }

    /// Returns the identifiers of all screens as strings.
    pub fn ids(&self) -> Vec<String> {
        self.screens
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.display_id.to_string())
            .collect()
    }

    /// Makes writes to one screen fail.
    pub fn set_failing(&self, index: usize, failing: bool) {
        if let Some(screen) = self.screens.lock().unwrap().get_mut(index) {
            screen.failing = failing;
        }
    }

    /// Makes identifier changes on one screen fail.
    pub fn set_id_locked(&self, index: usize, locked: bool) {
        if let Some(screen) = self.screens.lock().unwrap().get_mut(index) {
            screen.id_locked = locked;
        }
    }

    /// Makes enumeration fail, as if the bus went away.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

impl ScreenBus for MemoryBus {
    type Screen = MemoryScreen;

    fn enumerate(&self) -> Result<Vec<ScreenInfo>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Bus("simulated bus is offline".to_string()));
        }
        Ok(self
            .screens
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.info.clone())
            .collect())
    }

    fn open(&self, info: &ScreenInfo) -> Result<MemoryScreen> {
        let screens = self.screens.lock().unwrap();
        let index = screens
            .iter()
            .position(|s| s.info.path == info.path)
            .ok_or_else(|| Error::ScreenNotFound(info.path.clone()))?;
        Ok(MemoryScreen {
            screens: self.screens.clone(),
            index,
            columns: screens[index].columns,
            lines: screens[index].lines,
        })
    }
}

/// An opened simulated screen.
pub struct MemoryScreen {
    screens: Arc<Mutex<Vec<MemoryScreenState>>>,
    index: usize,
    columns: u16,
    lines: u16,
}

impl MemoryScreen {
    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryScreenState) -> T) -> T {
        let mut screens = self.screens.lock().unwrap();
        f(&mut screens[self.index])
    }
}

impl Screen for MemoryScreen {
    fn columns(&self) -> u16 {
        self.columns
    }

    fn lines(&self) -> u16 {
        self.lines
    }

    fn firmware(&self) -> (u8, u8) {
        (1, 0)
    }

    fn display_id(&mut self) -> Result<DisplayId> {
        Ok(self.with_state(|s| s.display_id))
    }

    fn set_display_id(&mut self, id: &DisplayId) -> Result<()> {
        self.with_state(|s| {
            if s.id_locked {
                return Err(Error::Write {
                    screen: s.info.path.clone(),
                    reason: "identifier slot locked".to_string(),
                });
            }
            s.display_id = *id;
            Ok(())
        })
    }

    fn set_display_power(&mut self, on: bool) -> Result<()> {
        self.with_state(|s| s.power = on);
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.with_state(|s| s.backlight = on);
        Ok(())
    }

    fn write(&mut self, framebuffer: &Framebuffer) -> Result<usize> {
        let expected = self.pixels();
        self.with_state(|s| {
            if s.failing {
                return Err(Error::Write {
                    screen: s.info.path.clone(),
                    reason: "simulated failure".to_string(),
                });
            }
            if framebuffer.pixels() != expected {
                return Err(Error::FramebufferSize {
                    expected,
                    actual: framebuffer.pixels(),
                });
            }
            s.frame = Some(framebuffer.clone());
            s.writes += 1;
            Ok(framebuffer.byte_len())
        })
    }
}
