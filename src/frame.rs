//! Frame boundaries of the LD2450 serial protocol.
//!
//! Two frame kinds share the wire:
//!
//! ```text
//! report:  AA FF 03 00 | 3 x (cx, cy, speed, resolution) u16 LE | 55 CC
//! command: FD FC FB FA | len u16 LE | code, marker | payload | 04 03 02 01
//! ```
//!
//! The command length counts the two-byte command word plus the payload.

use heapless::Vec;
use log::debug;

use crate::{
    Error, ACK_MARKER, CAPACITY, COMMAND_WORD_LEN, DATA_FOOTER, DATA_FRAME_LEN, DATA_HEADER,
    FRAME_FOOTER, FRAME_HEADER, FRAME_OVERHEAD, MAX_PAYLOAD, SLOT_COUNT, SLOT_LEN,
};

/// Largest encoded command frame.
pub const MAX_FRAME_LEN: usize = CAPACITY;

/// A command sent to, or an acknowledgement received from, the sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    /// Command code.
    pub command: u8,
    /// Set on frames produced by the sensor.
    pub ack: bool,
    /// Bytes following the command word.
    pub payload: Vec<u8, MAX_PAYLOAD>,
}

impl CommandFrame {
    /// Creates an outbound command frame.
    pub fn new(command: u8, payload: &[u8]) -> Result<Self, Error> {
        let payload = Vec::from_slice(payload).map_err(|_| Error::PayloadTooLarge)?;
        Ok(Self {
            command,
            ack: false,
            payload,
        })
    }

    /// Creates an outbound command frame without payload.
    pub fn empty(command: u8) -> Self {
        Self {
            command,
            ack: false,
            payload: Vec::new(),
        }
    }

    /// Value of the length field: command word plus payload.
    pub fn length_field(&self) -> u16 {
        (COMMAND_WORD_LEN + self.payload.len()) as u16
    }

    /// Encodes this frame into `buffer` and returns the number of bytes written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, Error> {
        let frame_len = FRAME_OVERHEAD + COMMAND_WORD_LEN + self.payload.len();
        if buffer.len() < frame_len {
            return Err(Error::PayloadTooLarge);
        }

        let body = FRAME_HEADER.len() + 2;
        buffer[..FRAME_HEADER.len()].copy_from_slice(&FRAME_HEADER);
        buffer[FRAME_HEADER.len()..body].copy_from_slice(&self.length_field().to_le_bytes());
        buffer[body] = self.command;
        buffer[body + 1] = if self.ack { ACK_MARKER } else { 0x00 };
        let payload_start = body + COMMAND_WORD_LEN;
        buffer[payload_start..payload_start + self.payload.len()].copy_from_slice(&self.payload);
        buffer[payload_start + self.payload.len()..frame_len].copy_from_slice(&FRAME_FOOTER);

        Ok(frame_len)
    }

    /// Encodes this frame into a heapless Vec.
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_LEN>, Error> {
        let mut buffer = [0u8; MAX_FRAME_LEN];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| Error::PayloadTooLarge)
    }
}

/// One complete, validated frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Target report: the three raw slots, header and footer stripped.
    Data([u8; SLOT_COUNT * SLOT_LEN]),
    /// Command or acknowledgement.
    Command(CommandFrame),
}

/// Outcome of scanning the receive buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// A frame was found. `consumed` covers it and any garbage before it.
    Frame { frame: Frame, consumed: usize },
    /// No complete frame yet. The first `discard` bytes can never start one.
    Incomplete { discard: usize },
}

/// Searches `buf` for the first complete frame.
///
/// Leading garbage and frames with a bad footer or impossible length are
/// skipped. When a header is found but its frame is not fully buffered yet,
/// everything from that header onward is kept.
pub fn detect(buf: &[u8]) -> Scan {
    let mut offset = 0;
    while offset < buf.len() {
        let rest = &buf[offset..];

        if rest.starts_with(&DATA_HEADER) {
            if rest.len() < DATA_FRAME_LEN {
                return Scan::Incomplete { discard: offset };
            }
            if rest[DATA_FRAME_LEN - DATA_FOOTER.len()..DATA_FRAME_LEN] != DATA_FOOTER {
                debug!("Bad report footer at offset {}, resyncing", offset);
                offset += DATA_HEADER.len();
                continue;
            }
            let mut slots = [0u8; SLOT_COUNT * SLOT_LEN];
            slots.copy_from_slice(&rest[DATA_HEADER.len()..DATA_FRAME_LEN - DATA_FOOTER.len()]);
            return Scan::Frame {
                frame: Frame::Data(slots),
                consumed: offset + DATA_FRAME_LEN,
            };
        }

        if rest.starts_with(&FRAME_HEADER) {
            let body = FRAME_HEADER.len() + 2;
            if rest.len() < body {
                return Scan::Incomplete { discard: offset };
            }
            let length = u16::from_le_bytes([rest[4], rest[5]]) as usize;
            let frame_len = FRAME_OVERHEAD + length;
            if length < COMMAND_WORD_LEN || frame_len > CAPACITY {
                debug!(
                    "Impossible command length {} at offset {}, resyncing",
                    length, offset
                );
                offset += FRAME_HEADER.len();
                continue;
            }
            if rest.len() < frame_len {
                return Scan::Incomplete { discard: offset };
            }
            if rest[frame_len - FRAME_FOOTER.len()..frame_len] != FRAME_FOOTER {
                debug!("Bad command footer at offset {}, resyncing", offset);
                offset += FRAME_HEADER.len();
                continue;
            }
            let mut payload = Vec::new();
            let copied = payload
                .extend_from_slice(&rest[body + COMMAND_WORD_LEN..frame_len - FRAME_FOOTER.len()]);
            debug_assert!(copied.is_ok(), "length check bounds the payload");
            return Scan::Frame {
                frame: Frame::Command(CommandFrame {
                    command: rest[body],
                    ack: rest[body + 1] == ACK_MARKER,
                    payload,
                }),
                consumed: offset + frame_len,
            };
        }

        if is_header_prefix(rest) {
            return Scan::Incomplete { discard: offset };
        }
        offset += 1;
    }
    Scan::Incomplete { discard: buf.len() }
}

// A few trailing bytes that could still grow into a header.
fn is_header_prefix(rest: &[u8]) -> bool {
    rest.len() < DATA_HEADER.len()
        && (DATA_HEADER.starts_with(rest) || FRAME_HEADER.starts_with(rest))
}
