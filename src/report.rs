//! Decoding of validated frames into target reports and acknowledgements.

use core::fmt::Write as _;

use heapless::{String, Vec};
use log::{debug, warn};

use crate::{
    geometry, CommandFrame, Frame, RegionConfig, TargetMode, DISABLE_CONFIG, ENABLE_CONFIG,
    FACTORY_RESET, GET_MAC, GET_REGIONS, MAX_PAYLOAD, MULTI_TARGET, QUERY_TARGET_MODE,
    READ_FIRMWARE, REBOOT, SET_BAUD_RATE, SET_BLUETOOTH, SET_REGIONS, SINGLE_TARGET, SLOT_COUNT,
    SLOT_LEN,
};

/// Firmware version text, e.g. `V1.02.22062416`.
pub type VersionString = String<24>;

/// MAC address text, e.g. `8C:AA:B5:01:02:03`.
pub type MacString = String<17>;

/// Raw fields of one target slot, as sent by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersonSlot {
    pub cx: u16,
    pub cy: u16,
    pub speed: u16,
    pub resolution: u16,
}

impl PersonSlot {
    /// Parses a slot from the first eight bytes of `bytes`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < SLOT_LEN {
            return None;
        }
        let read = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        Some(Self {
            cx: read(0),
            cy: read(2),
            speed: read(4),
            resolution: read(6),
        })
    }

    pub fn to_bytes(&self) -> [u8; SLOT_LEN] {
        let mut bytes = [0u8; SLOT_LEN];
        bytes[0..2].copy_from_slice(&self.cx.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.cy.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.speed.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.resolution.to_le_bytes());
        bytes
    }

    /// An unused slot is sent as all zeroes.
    pub fn is_empty(&self) -> bool {
        self.cx == 0 && self.cy == 0 && self.speed == 0 && self.resolution == 0
    }

    /// Decodes the slot, or `None` for an unused slot.
    pub fn decode(&self) -> Option<Target> {
        if self.is_empty() {
            return None;
        }
        Some(Target {
            x: f32::from(geometry::signed_magnitude(self.cx)),
            y: f32::from(geometry::signed_magnitude(self.cy)),
            speed: geometry::signed_magnitude(self.speed),
            resolution: self.resolution,
        })
    }
}

/// A tracked target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// Horizontal position in millimetres.
    pub x: f32,
    /// Distance from the sensor in millimetres.
    pub y: f32,
    /// Speed in cm/s, negative when approaching.
    pub speed: i16,
    /// Distance resolution in millimetres.
    pub resolution: u16,
}

impl Target {
    /// Returns this target with its position rotated by `degrees`.
    pub fn rotated(self, degrees: f32) -> Self {
        let (x, y) = geometry::rotate(self.x, self.y, degrees);
        Self { x, y, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresenceFlags {
    /// At least one target is tracked.
    pub any: bool,
    /// At least one tracked target is moving.
    pub moving: bool,
    /// At least one tracked target is standing still.
    pub still: bool,
}

/// One decoded target report.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetReport {
    pub targets: [Option<Target>; SLOT_COUNT],
    pub flags: PresenceFlags,
}

impl TargetReport {
    /// Decodes the three raw slots of a report frame.
    pub fn from_slots(slots: &[u8; SLOT_COUNT * SLOT_LEN]) -> Self {
        let mut targets = [None; SLOT_COUNT];
        for (target, raw) in targets.iter_mut().zip(slots.chunks_exact(SLOT_LEN)) {
            *target = PersonSlot::parse(raw).and_then(|slot| slot.decode());
        }
        let mut flags = PresenceFlags::default();
        for target in targets.iter().flatten() {
            flags.any = true;
            if target.speed != 0 {
                flags.moving = true;
            } else {
                flags.still = true;
            }
        }
        Self { targets, flags }
    }

    /// Rotates every present target. Absent slots stay absent.
    pub fn rotated(mut self, degrees: f32) -> Self {
        if degrees != 0.0 {
            for target in self.targets.iter_mut().flatten() {
                *target = target.rotated(degrees);
            }
        }
        self
    }

    pub fn target_count(&self) -> usize {
        self.targets.iter().flatten().count()
    }
}

/// Data carried by an acknowledgement, beyond its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain acknowledgement.
    Empty,
    /// Reply to entering config mode.
    ConfigMode { protocol_version: u16, buffer_size: u16 },
    FirmwareVersion(VersionString),
    Mac(MacString),
    Regions(RegionConfig),
    TargetMode(TargetMode),
    /// Payload of an unknown command, a failed command, or a reply that
    /// could not be decoded.
    Raw(Vec<u8, MAX_PAYLOAD>),
}

/// Acknowledgement of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAck {
    pub command: u8,
    pub success: bool,
    pub reply: Reply,
}

/// Everything a frame can decode to.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Targets(TargetReport),
    Ack(CommandAck),
}

/// Decodes a validated frame.
pub fn decode(frame: &Frame) -> Event {
    match frame {
        Frame::Data(slots) => Event::Targets(TargetReport::from_slots(slots)),
        Frame::Command(frame) => Event::Ack(decode_ack(frame)),
    }
}

fn decode_ack(frame: &CommandFrame) -> CommandAck {
    let raw = || Reply::Raw(frame.payload.clone());
    if !frame.ack {
        debug!("Command frame 0x{:02X} without ack marker", frame.command);
    }
    if frame.payload.len() < 2 {
        warn!(
            "Ack for 0x{:02X} is missing its status: {:02X?}",
            frame.command, frame.payload
        );
        return CommandAck {
            command: frame.command,
            success: false,
            reply: raw(),
        };
    }

    let success = u16::from_le_bytes([frame.payload[0], frame.payload[1]]) == 0;
    let data = &frame.payload[2..];
    let reply = if !success {
        raw()
    } else {
        let decoded = match frame.command {
            ENABLE_CONFIG => config_mode(data),
            READ_FIRMWARE => firmware_version(data).map(Reply::FirmwareVersion),
            GET_MAC => mac(data).map(Reply::Mac),
            GET_REGIONS => RegionConfig::parse(data).map(Reply::Regions),
            QUERY_TARGET_MODE => data
                .get(..2)
                .and_then(|mode| TargetMode::from_raw(u16::from_le_bytes([mode[0], mode[1]])))
                .map(Reply::TargetMode),
            DISABLE_CONFIG | SINGLE_TARGET | MULTI_TARGET | SET_BAUD_RATE | FACTORY_RESET
            | REBOOT | SET_BLUETOOTH | SET_REGIONS => Some(Reply::Empty),
            other => {
                debug!("Ack for unknown command 0x{:02X}: {:02X?}", other, data);
                None
            }
        };
        decoded.unwrap_or_else(|| {
            warn!(
                "Could not decode reply to 0x{:02X}: {:02X?}",
                frame.command, frame.payload
            );
            raw()
        })
    };

    CommandAck {
        command: frame.command,
        success,
        reply,
    }
}

fn config_mode(data: &[u8]) -> Option<Reply> {
    if data.len() < 4 {
        return None;
    }
    Some(Reply::ConfigMode {
        protocol_version: u16::from_le_bytes([data[0], data[1]]),
        buffer_size: u16::from_le_bytes([data[2], data[3]]),
    })
}

// Layout: firmware type u16, major u16, minor u32, all little-endian.
fn firmware_version(data: &[u8]) -> Option<VersionString> {
    if data.len() < 8 {
        return None;
    }
    let minor = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let mut version = VersionString::new();
    write!(version, "V{}.{:02X}.{:08X}", data[3], data[2], minor).ok()?;
    Some(version)
}

fn mac(data: &[u8]) -> Option<MacString> {
    let bytes = data.get(..6)?;
    let mut text = MacString::new();
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            text.push(':').ok()?;
        }
        write!(text, "{:02X}", byte).ok()?;
    }
    Some(text)
}
