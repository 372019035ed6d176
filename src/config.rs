/// Represents the tracking mode of the LD2450 sensor.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum TargetMode {
    /// Only the strongest target is reported.
    Single,
    /// Up to three targets are reported.
    Multi,
}

impl TargetMode {
    /// Returns the command code that switches the sensor into this mode.
    pub fn command(self) -> u8 {
        match self {
            TargetMode::Single => crate::SINGLE_TARGET,
            TargetMode::Multi => crate::MULTI_TARGET,
        }
    }

    /// Decodes the mode value returned by a target mode query.
    pub fn from_raw(raw: u16) -> Option<TargetMode> {
        match raw {
            1 => Some(TargetMode::Single),
            2 => Some(TargetMode::Multi),
            _ => None,
        }
    }
}

/// Serial baud rates supported by the LD2450, with their selector index.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum BaudRate {
    B9600 = 1,
    B19200 = 2,
    B38400 = 3,
    B57600 = 4,
    B115200 = 5,
    B230400 = 6,
    B256000 = 7,
    B460800 = 8,
}

impl BaudRate {
    /// Returns the selector index sent in the set baud rate command.
    pub fn index(self) -> u16 {
        self as u16
    }

    /// Returns the baud rate in bits per second.
    pub fn bps(self) -> u32 {
        match self {
            BaudRate::B9600 => 9_600,
            BaudRate::B19200 => 19_200,
            BaudRate::B38400 => 38_400,
            BaudRate::B57600 => 57_600,
            BaudRate::B115200 => 115_200,
            BaudRate::B230400 => 230_400,
            BaudRate::B256000 => 256_000,
            BaudRate::B460800 => 460_800,
        }
    }

    /// Looks up a baud rate by its selector index.
    pub fn from_index(index: u16) -> Option<BaudRate> {
        match index {
            1 => Some(BaudRate::B9600),
            2 => Some(BaudRate::B19200),
            3 => Some(BaudRate::B38400),
            4 => Some(BaudRate::B57600),
            5 => Some(BaudRate::B115200),
            6 => Some(BaudRate::B230400),
            7 => Some(BaudRate::B256000),
            8 => Some(BaudRate::B460800),
            _ => None,
        }
    }
}

/// Configuration settings for the LD2450 sensor.
///
/// These values are a local cache of what was last sent to the sensor. The
/// sensor itself remains the source of truth.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// Rotation applied to reported target positions, in degrees.
    pub rotation: f32,
    /// The tracking mode of the sensor.
    pub target_mode: TargetMode,
    /// The serial baud rate of the sensor.
    pub baud_rate: BaudRate,
    /// Whether the sensor's bluetooth radio is enabled.
    pub bluetooth: bool,
}

impl Config {
    /// Creates a new `Config` instance.
    ///
    /// # Arguments
    ///
    /// * `target_mode` - The `TargetMode` for the sensor.
    /// * `baud_rate` - The `BaudRate` the sensor is running at.
    ///
    /// # Returns
    ///
    /// A new `Config` instance with no rotation and bluetooth enabled.
    pub fn new(target_mode: TargetMode, baud_rate: BaudRate) -> Config {
        Config {
            target_mode,
            baud_rate,
            ..Config::default()
        }
    }
    /// Sets the rotation angle, in degrees, applied to target positions.
    pub fn rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
    /// Sets the target mode for the configuration.
    ///
    /// # Arguments
    ///
    /// * `mode` - The `TargetMode` to set.
    ///
    /// # Returns
    ///
    /// The updated `Config` instance.
    pub fn target_mode(mut self, mode: TargetMode) -> Self {
        self.target_mode = mode;
        self
    }
    /// Sets the baud rate for the configuration.
    pub fn baud_rate(mut self, baud_rate: BaudRate) -> Self {
        self.baud_rate = baud_rate;
        self
    }
    /// Sets whether bluetooth is enabled.
    pub fn bluetooth(mut self, enabled: bool) -> Self {
        self.bluetooth = enabled;
        self
    }
}

/// Provides the factory configuration of the LD2450 sensor.
impl Default for Config {
    /// Returns the default configuration.
    ///
    /// The factory configuration is multi-target tracking at 256000 baud with
    /// bluetooth enabled. No rotation is applied.
    fn default() -> Config {
        Config {
            rotation: 0.0,
            target_mode: TargetMode::Multi,
            baud_rate: BaudRate::B256000,
            bluetooth: true,
        }
    }
}
