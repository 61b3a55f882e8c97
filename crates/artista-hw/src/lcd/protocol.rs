//! Artista HID report layout.
//!
//! Output reports (report ID 0):
//! - Buffer size: 4107 bytes (1 report byte + 10 header bytes + 4096 data bytes)
//! - Signature byte: 0xA5
//! - Command bytes: 0xB1 (power), 0xB2 (backlight), 0xB3 (set id), 0xB4 (write)
//!
//! Feature report 0x01 answers geometry, firmware version and display id.
//! Input reports acknowledge a completed framebuffer write.

use crate::identifier::{DisplayId, ID_SIZE};
use crate::{Error, Result};

/// Total buffer size including report byte.
pub const BUFFER_SIZE: usize = 4107; // 1 report + 10 header + 4096 data

/// Header size (excluding report byte).
pub const HEADER_SIZE: usize = 10;

/// Data payload size.
pub const DATA_SIZE: usize = 4096;

/// Report byte size (HID report ID).
pub const REPORT_SIZE: usize = 1;

/// Protocol signature byte.
pub const ARTISTA_SIGNATURE: u8 = 0xA5;

/// Feature report carrying the screen query.
pub const QUERY_REPORT_ID: u8 = 0x01;

/// Feature report size including report byte.
pub const QUERY_SIZE: usize = 64;

/// Write acknowledgement size.
pub const ACK_SIZE: usize = 8;

/// Screen command types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Display power on/off.
    Power = 0xB1,
    /// Backlight on/off.
    Backlight = 0xB2,
    /// Store a new display id in firmware.
    SetId = 0xB3,
    /// Framebuffer transfer chunk.
    Write = 0xB4,
}

/// Write sub-commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WritePhase {
    /// First chunk of a write.
    Start = 0xF0,
    /// Middle chunks of a write.
    Continue = 0xF1,
    /// Final chunk; the screen acknowledges after it.
    End = 0xF2,
}

/// Decoded answer to the query feature report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryReply {
    pub columns: u16,
    pub lines: u16,
    pub firmware: (u8, u8),
    pub display_id: DisplayId,
}

/// Decoded write acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Zero on success, firmware error code otherwise.
    pub status: u8,
    /// Bytes the screen accepted.
    pub received: u32,
}

fn command_packet(command: Command) -> [u8; BUFFER_SIZE] {
    let mut buffer = [0u8; BUFFER_SIZE];
    // Skip report byte (index 0)
    buffer[1] = ARTISTA_SIGNATURE;
    buffer[2] = command as u8;
    buffer
}

/// Builds a display power packet.
pub fn build_power_packet(on: bool) -> [u8; BUFFER_SIZE] {
    let mut buffer = command_packet(Command::Power);
    buffer[3] = u8::from(on);
    buffer
}

/// Builds a backlight packet.
pub fn build_backlight_packet(on: bool) -> [u8; BUFFER_SIZE] {
    let mut buffer = command_packet(Command::Backlight);
    buffer[3] = u8::from(on);
    buffer
}

/// Builds a set-display-id packet.
pub fn build_set_id_packet(id: &DisplayId) -> [u8; BUFFER_SIZE] {
    let mut buffer = command_packet(Command::SetId);
    let data_start = REPORT_SIZE + HEADER_SIZE;
    buffer[data_start..data_start + ID_SIZE].copy_from_slice(id.as_bytes());
    buffer
}

/// Number of chunks needed to transfer `byte_len` bytes.
pub fn chunk_count(byte_len: usize) -> usize {
    byte_len.div_ceil(DATA_SIZE).max(1)
}

/// Builds one framebuffer write chunk.
///
/// `payload` is the whole little-endian framebuffer; the chunk carries the
/// slice starting at `chunk_index * DATA_SIZE`.
pub fn build_write_chunk(chunk_index: usize, payload: &[u8]) -> [u8; BUFFER_SIZE] {
    let mut buffer = command_packet(Command::Write);
    let last = chunk_count(payload.len()) - 1;

    let phase = match chunk_index {
        i if i == last => WritePhase::End,
        0 => WritePhase::Start,
        _ => WritePhase::Continue,
    };
    buffer[3] = phase as u8;

    let offset = chunk_index * DATA_SIZE;
    let end = (offset + DATA_SIZE).min(payload.len());
    let data = payload.get(offset..end).unwrap_or_default();

    // Byte offset into the framebuffer (little-endian)
    buffer[4..8].copy_from_slice(&(offset as u32).to_le_bytes());
    // Chunk size (little-endian)
    buffer[8..10].copy_from_slice(&(data.len() as u16).to_le_bytes());

    let data_start = REPORT_SIZE + HEADER_SIZE;
    buffer[data_start..data_start + data.len()].copy_from_slice(data);
    buffer
}

/// Builds the buffer used to request the query feature report.
pub fn query_request() -> [u8; QUERY_SIZE] {
    let mut buffer = [0u8; QUERY_SIZE];
    buffer[0] = QUERY_REPORT_ID;
    buffer
}

/// Parses the query feature report (report byte included).
pub fn parse_query(report: &[u8]) -> Result<QueryReply> {
    if report.len() < 6 + ID_SIZE {
        return Err(Error::BadReply(format!(
            "query report too short ({} bytes)",
            report.len()
        )));
    }
    if report[0] != QUERY_REPORT_ID || report[1] != ARTISTA_SIGNATURE {
        return Err(Error::BadReply(format!(
            "unexpected query header {:02X} {:02X}",
            report[0], report[1]
        )));
    }

    let columns = u16::from_le_bytes([report[2], report[3]]);
    let lines = u16::from_le_bytes([report[4], report[5]]);
    let mut id = [0u8; ID_SIZE];
    id.copy_from_slice(&report[6..6 + ID_SIZE]);
    let firmware = match report.get(6 + ID_SIZE..8 + ID_SIZE) {
        Some(&[major, minor]) => (major, minor),
        _ => (0, 0),
    };

    Ok(QueryReply {
        columns,
        lines,
        firmware,
        display_id: DisplayId::from_bytes(id),
    })
}

/// Parses a write acknowledgement input report.
pub fn parse_ack(report: &[u8]) -> Result<Ack> {
    match report {
        [ARTISTA_SIGNATURE, status, a, b, c, d, ..] => Ok(Ack {
            status: *status,
            received: u32::from_le_bytes([*a, *b, *c, *d]),
        }),
        _ => Err(Error::BadReply(format!("unexpected ack {:02X?}", report))),
    }
}
