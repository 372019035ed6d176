// CAPACITY is the size of the receive buffer. A frame that cannot be completed
// within this many bytes is never going to be recognised.
pub const CAPACITY: usize = 256;

// DATA_HEADER marks the beginning of a target report frame.
pub const DATA_HEADER: [u8; 4] = [0xAA, 0xFF, 0x03, 0x00];

// DATA_FOOTER marks the end of a target report frame.
pub const DATA_FOOTER: [u8; 2] = [0x55, 0xCC];

// FRAME_HEADER marks the beginning of a command or acknowledgement frame.
pub const FRAME_HEADER: [u8; 4] = [0xFD, 0xFC, 0xFB, 0xFA];

// FRAME_FOOTER marks the end of a command or acknowledgement frame.
pub const FRAME_FOOTER: [u8; 4] = [0x04, 0x03, 0x02, 0x01];

// Number of target slots carried by each report.
pub const SLOT_COUNT: usize = 3;

// Size of one encoded target slot (cx, cy, speed, resolution).
pub const SLOT_LEN: usize = 8;

// Total size of a target report frame.
pub const DATA_FRAME_LEN: usize = DATA_HEADER.len() + SLOT_COUNT * SLOT_LEN + DATA_FOOTER.len();

// Bytes between the length field and the payload: command code + ack marker.
pub const COMMAND_WORD_LEN: usize = 2;

// Fixed overhead of a command frame: header, length field and footer.
pub const FRAME_OVERHEAD: usize = FRAME_HEADER.len() + 2 + FRAME_FOOTER.len();

// Largest payload a command frame can carry and still fit in the buffer.
pub const MAX_PAYLOAD: usize = CAPACITY - FRAME_OVERHEAD - COMMAND_WORD_LEN;

// Second byte of the command word in frames sent by the device.
pub const ACK_MARKER: u8 = 0x01;

// Command codes.
pub const SINGLE_TARGET: u8 = 0x80;
pub const MULTI_TARGET: u8 = 0x90;
pub const QUERY_TARGET_MODE: u8 = 0x91;
pub const READ_FIRMWARE: u8 = 0xA0;
pub const SET_BAUD_RATE: u8 = 0xA1;
pub const FACTORY_RESET: u8 = 0xA2;
pub const REBOOT: u8 = 0xA3;
pub const SET_BLUETOOTH: u8 = 0xA4;
pub const GET_MAC: u8 = 0xA5;
pub const GET_REGIONS: u8 = 0xC1;
pub const SET_REGIONS: u8 = 0xC2;
pub const ENABLE_CONFIG: u8 = 0xFF;
pub const DISABLE_CONFIG: u8 = 0xFE;
