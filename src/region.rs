use crate::SLOT_COUNT;

/// Size of the region block carried by set/get region frames.
pub const REGION_BLOCK_LEN: usize = 2 + SLOT_COUNT * 8;

/// How the sensor treats its configured regions.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum RegionsMode {
    /// Regions are ignored.
    #[default]
    Disabled = 0,
    /// Only targets inside a region are reported.
    Detect = 1,
    /// Targets inside a region are not reported.
    Ignore = 2,
}

impl RegionsMode {
    pub fn from_byte(byte: u8) -> Option<RegionsMode> {
        match byte {
            0 => Some(RegionsMode::Disabled),
            1 => Some(RegionsMode::Detect),
            2 => Some(RegionsMode::Ignore),
            _ => None,
        }
    }
}

/// Rectangle spanned by two corners, in millimetres.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub struct Region {
    pub x0: i16,
    pub y0: i16,
    pub x1: i16,
    pub y1: i16,
}

impl Region {
    pub fn new(x0: i16, y0: i16, x1: i16, y1: i16) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// The sensor's zone configuration: a mode plus three regions.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub struct RegionConfig {
    pub mode: RegionsMode,
    pub regions: [Region; SLOT_COUNT],
}

impl RegionConfig {
    pub fn new(mode: RegionsMode, regions: [Region; SLOT_COUNT]) -> Self {
        Self { mode, regions }
    }

    /// Serializes to the wire block: mode, reserved byte, then each region's
    /// corners as little-endian i16.
    pub fn to_bytes(&self) -> [u8; REGION_BLOCK_LEN] {
        let mut block = [0u8; REGION_BLOCK_LEN];
        block[0] = self.mode as u8;
        for (i, region) in self.regions.iter().enumerate() {
            let base = 2 + i * 8;
            for (j, value) in [region.x0, region.y0, region.x1, region.y1].iter().enumerate() {
                block[base + j * 2..base + j * 2 + 2].copy_from_slice(&value.to_le_bytes());
            }
        }
        block
    }

    /// Parses a wire block. Returns `None` if it is short or the mode is unknown.
    pub fn parse(block: &[u8]) -> Option<Self> {
        if block.len() < REGION_BLOCK_LEN {
            return None;
        }
        let mode = RegionsMode::from_byte(block[0])?;
        let read = |at: usize| i16::from_le_bytes([block[at], block[at + 1]]);
        let mut regions = [Region::default(); SLOT_COUNT];
        for (i, region) in regions.iter_mut().enumerate() {
            let base = 2 + i * 8;
            *region = Region::new(read(base), read(base + 2), read(base + 4), read(base + 6));
        }
        Some(Self { mode, regions })
    }
}
