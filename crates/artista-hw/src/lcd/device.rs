//! Screen communication via USB HID.

use crate::bus::{Screen, ScreenBus, ScreenInfo};
use crate::identifier::DisplayId;
use crate::{Error, Result, ARTISTA_PID, ARTISTA_VID, SCREEN_TIMEOUT_MS};
use hidapi::{HidApi, HidDevice};
use std::ffi::CString;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::framebuffer::Framebuffer;
use super::protocol::{
    build_backlight_packet, build_power_packet, build_set_id_packet, build_write_chunk,
    chunk_count, parse_ack, parse_query, query_request, QueryReply, ACK_SIZE,
};

/// The HID interface used for display control.
/// Composite firmwares expose a second interface that must be skipped.
const SCREEN_INTERFACE: i32 = 0;

/// Enumerates Artista screens over USB HID.
///
/// The device list is refreshed on every enumeration so screens attached
/// after startup are found.
pub struct UsbBus {
    api: Mutex<HidApi>,
    vendor_id: u16,
    product_id: u16,
}

impl UsbBus {
    /// Creates a bus matching the default Artista VID:PID.
    pub fn new() -> Result<Self> {
        Self::with_ids(ARTISTA_VID, ARTISTA_PID)
    }

    /// Creates a bus matching a specific VID:PID.
    pub fn with_ids(vendor_id: u16, product_id: u16) -> Result<Self> {
        let api = HidApi::new()?;
        Ok(Self {
            api: Mutex::new(api),
            vendor_id,
            product_id,
        })
    }

    fn api(&self) -> Result<MutexGuard<'_, HidApi>> {
        self.api
            .lock()
            .map_err(|_| Error::Bus("HID API lock poisoned".to_string()))
    }
}

impl ScreenBus for UsbBus {
    type Screen = UsbScreen;

    fn enumerate(&self) -> Result<Vec<ScreenInfo>> {
        let mut api = self.api()?;
        api.refresh_devices()?;

        let screens: Vec<ScreenInfo> = api
            .device_list()
            .filter(|d| d.vendor_id() == self.vendor_id && d.product_id() == self.product_id)
            .inspect(|d| {
                debug!(
                    "Found HID device: path={:?}, interface={}",
                    d.path(),
                    d.interface_number()
                )
            })
            // -1 means the platform does not report interfaces
            .filter(|d| matches!(d.interface_number(), SCREEN_INTERFACE | -1))
            .map(|d| ScreenInfo {
                path: d.path().to_string_lossy().into_owned(),
                vendor_id: d.vendor_id(),
                product_id: d.product_id(),
                manufacturer: d.manufacturer_string().map(str::to_string),
                product: d.product_string().map(str::to_string),
                serial: d.serial_number().map(str::to_string),
                interface: d.interface_number(),
            })
            .collect();

        debug!(
            "{} screen(s) match VID:{:04X} PID:{:04X}",
            screens.len(),
            self.vendor_id,
            self.product_id
        );
        Ok(screens)
    }

    fn open(&self, info: &ScreenInfo) -> Result<UsbScreen> {
        let path =
            CString::new(info.path.as_str()).map_err(|_| Error::ScreenNotFound(info.path.clone()))?;
        let device = self.api()?.open_path(&path).map_err(|e| {
            debug!("Failed to open {}: {}", info.path, e);
            Error::ScreenNotFound(info.path.clone())
        })?;

        let reply = query(&device)?;
        info!(
            "Screen opened at {} ({}x{}, firmware {}.{})",
            info.path, reply.columns, reply.lines, reply.firmware.0, reply.firmware.1
        );

        Ok(UsbScreen {
            device,
            path: info.path.clone(),
            columns: reply.columns,
            lines: reply.lines,
            firmware: reply.firmware,
        })
    }
}

fn query(device: &HidDevice) -> Result<QueryReply> {
    let mut report = query_request();
    let len = device.get_feature_report(&mut report)?;
    parse_query(&report[..len])
}

/// An opened Artista screen. Closed on drop.
pub struct UsbScreen {
    device: HidDevice,
    path: String,
    columns: u16,
    lines: u16,
    firmware: (u8, u8),
}

impl Screen for UsbScreen {
    fn columns(&self) -> u16 {
        self.columns
    }

    fn lines(&self) -> u16 {
        self.lines
    }

    fn firmware(&self) -> (u8, u8) {
        self.firmware
    }

    fn display_id(&mut self) -> Result<DisplayId> {
        Ok(query(&self.device)?.display_id)
    }

    fn set_display_id(&mut self, id: &DisplayId) -> Result<()> {
        self.device.write(&build_set_id_packet(id))?;
        debug!("Set display id of {} to '{}'", self.path, id);
        Ok(())
    }

    fn set_display_power(&mut self, on: bool) -> Result<()> {
        self.device.write(&build_power_packet(on))?;
        debug!("Display power {}", if on { "on" } else { "off" });
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.device.write(&build_backlight_packet(on))?;
        debug!("Backlight {}", if on { "on" } else { "off" });
        Ok(())
    }

    fn write(&mut self, framebuffer: &Framebuffer) -> Result<usize> {
        if framebuffer.pixels() != self.pixels() {
            return Err(Error::FramebufferSize {
                expected: self.pixels(),
                actual: framebuffer.pixels(),
            });
        }

        let payload = framebuffer.to_le_bytes();
        let chunks = chunk_count(payload.len());
        for chunk_idx in 0..chunks {
            self.device.write(&build_write_chunk(chunk_idx, &payload))?;
        }
        debug!("Framebuffer sent ({} chunks)", chunks);

        let mut report = [0u8; ACK_SIZE];
        let len = self.device.read_timeout(&mut report, SCREEN_TIMEOUT_MS)?;
        if len == 0 {
            return Err(Error::Timeout(SCREEN_TIMEOUT_MS));
        }

        let ack = parse_ack(&report[..len])?;
        if ack.status != 0 {
            return Err(Error::Write {
                screen: self.path.clone(),
                reason: format!("status {:#04X}", ack.status),
            });
        }
        if ack.received as usize != payload.len() {
            return Err(Error::Write {
                screen: self.path.clone(),
                reason: format!("accepted {} of {} bytes", ack.received, payload.len()),
            });
        }
        Ok(payload.len())
    }
}
