use crate::{
    BaudRate, CommandFrame, Error, RegionConfig, TargetMode, DISABLE_CONFIG, ENABLE_CONFIG,
    FACTORY_RESET, GET_MAC, GET_REGIONS, QUERY_TARGET_MODE, READ_FIRMWARE, REBOOT, SET_BAUD_RATE,
    SET_BLUETOOTH, SET_REGIONS,
};

/// Commands understood by the LD2450.
///
/// Everything except [`Command::EnableConfig`] must be sent while the sensor
/// is in config mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    EnableConfig,
    DisableConfig,
    SetTargetMode(TargetMode),
    QueryTargetMode,
    ReadFirmware,
    SetBaudRate(BaudRate),
    FactoryReset,
    Reboot,
    SetBluetooth(bool),
    ReadMac,
    ReadRegions,
    SetRegions(RegionConfig),
}

impl Command {
    /// Returns the command code, which is echoed back in the acknowledgement.
    pub fn code(&self) -> u8 {
        match self {
            Command::EnableConfig => ENABLE_CONFIG,
            Command::DisableConfig => DISABLE_CONFIG,
            Command::SetTargetMode(mode) => mode.command(),
            Command::QueryTargetMode => QUERY_TARGET_MODE,
            Command::ReadFirmware => READ_FIRMWARE,
            Command::SetBaudRate(_) => SET_BAUD_RATE,
            Command::FactoryReset => FACTORY_RESET,
            Command::Reboot => REBOOT,
            Command::SetBluetooth(_) => SET_BLUETOOTH,
            Command::ReadMac => GET_MAC,
            Command::ReadRegions => GET_REGIONS,
            Command::SetRegions(_) => SET_REGIONS,
        }
    }

    /// Builds the frame for this command.
    pub fn to_frame(&self) -> Result<CommandFrame, Error> {
        let code = self.code();
        match self {
            Command::EnableConfig => CommandFrame::new(code, &[0x01, 0x00]),
            Command::SetBaudRate(baud) => CommandFrame::new(code, &baud.index().to_le_bytes()),
            Command::SetBluetooth(enabled) => CommandFrame::new(code, &[u8::from(*enabled), 0x00]),
            Command::ReadMac => CommandFrame::new(code, &[0x01, 0x00]),
            Command::SetRegions(config) => CommandFrame::new(code, &config.to_bytes()),
            Command::DisableConfig
            | Command::SetTargetMode(_)
            | Command::QueryTargetMode
            | Command::ReadFirmware
            | Command::FactoryReset
            | Command::Reboot
            | Command::ReadRegions => Ok(CommandFrame::empty(code)),
        }
    }
}
