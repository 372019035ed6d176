#![cfg_attr(not(test), no_std)]

use embedded_io_async::{Read, Write};
use log::{debug, info};

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod buffer;
pub use buffer::*;

mod frame;
pub use frame::*;

pub mod geometry;

mod region;
pub use region::*;

mod report;
pub use report::*;

mod command;
pub use command::*;

mod parser;
pub use parser::*;

/// Size of a single read from the serial port in [`Ld2450::poll`].
const READ_CHUNK: usize = 64;

/// Device details learned from the sensor's replies.
#[derive(Debug, Clone, Default)]
struct DeviceInfo {
    firmware: Option<VersionString>,
    mac: Option<MacString>,
    /// Last regions reported by the sensor, dropped while a change is in flight.
    regions: Option<RegionConfig>,
    /// Last regions sent or reported. Region edits are merged into this.
    last_regions: Option<RegionConfig>,
}

/// Represents an HLK-LD2450 radar sensor.
///
/// The sensor continuously streams target reports. Incoming bytes are turned
/// into [`Listener`] callbacks by [`Ld2450::poll`] or [`Ld2450::feed`].
/// Configuration methods write their frames immediately and return; the
/// sensor's acknowledgements show up on a later poll.
///
/// # Type Parameters
///
/// * `Serial`: The type of the serial interface used to communicate with the sensor.
///   It must implement `embedded_io_async::Read` and `embedded_io_async::Write`.
pub struct Ld2450<Serial> {
    serial: Serial,
    config: Config,
    parser: Parser,
    info: DeviceInfo,
}

impl<S> Ld2450<S>
where
    S: Read + Write,
{
    /// Creates a new `Ld2450` sensor instance.
    ///
    /// # Arguments
    ///
    /// * `serial`: The serial interface for communication with the sensor.
    /// * `config`: The initial configuration for the sensor.
    ///
    /// # Returns
    ///
    /// A new `Ld2450` instance.
    pub fn new(serial: S, config: Config) -> Self {
        Self {
            serial,
            parser: Parser::with_rotation(config.rotation),
            config,
            info: DeviceInfo::default(),
        }
    }

    /// Initializes the sensor according to the provided configuration.
    ///
    /// Applies the configured target mode and requests the firmware version,
    /// MAC address and region configuration in a single config session.
    pub async fn init(&mut self) -> Result<(), Error> {
        self.serial.flush().await.map_err(|_| Error::WriteFailure)?;
        self.configure(&[
            Command::SetTargetMode(self.config.target_mode),
            Command::ReadFirmware,
            Command::ReadMac,
            Command::ReadRegions,
        ])
        .await
        .map_err(|e| {
            log::error!("Failed to run LD2450 init sequence: {:?}", e);
            e
        })?;
        debug!("LD2450 init sequence complete.");
        Ok(())
    }

    /// Returns the cached configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Firmware version from the last firmware reply, if any.
    pub fn firmware_version(&self) -> Option<&str> {
        self.info.firmware.as_deref()
    }

    /// MAC address from the last MAC reply, if any.
    pub fn mac(&self) -> Option<&str> {
        self.info.mac.as_deref()
    }

    /// Region configuration from the last region reply.
    ///
    /// Cleared whenever the regions are changed, until the sensor reports them
    /// again.
    pub fn regions(&self) -> Option<&RegionConfig> {
        self.info.regions.as_ref()
    }

    /// Reads once from the serial port and processes the received bytes.
    ///
    /// Returns the number of frames decoded.
    pub async fn poll<L: Listener + ?Sized>(&mut self, listener: &mut L) -> Result<usize, Error> {
        let mut read_buffer = [0u8; READ_CHUNK];
        let bytes_read = self.serial.read(&mut read_buffer).await.map_err(|e| {
            log::error!("Serial read error: {:?}", e);
            Error::ReadFailure
        })?;
        Ok(self.feed(&read_buffer[..bytes_read], listener))
    }

    /// Processes bytes received from the sensor by other means.
    ///
    /// Returns the number of frames decoded.
    pub fn feed<L: Listener + ?Sized>(&mut self, bytes: &[u8], listener: &mut L) -> usize {
        let mut tracker = Tracker {
            info: &mut self.info,
            config: &mut self.config,
            inner: listener,
        };
        self.parser.feed(bytes, &mut tracker)
    }

    /// Writes a single command frame.
    ///
    /// Apart from enabling config mode, commands are only accepted while the
    /// sensor is in config mode; see [`Ld2450::configure`].
    pub async fn send(&mut self, command: Command) -> Result<(), Error> {
        let frame = command.to_frame()?.encode_to_vec()?;
        debug!("Executing command {:?}: {:02X?}", command, frame);
        self.serial
            .write_all(&frame)
            .await
            .map_err(|_| Error::WriteFailure)?;
        self.serial.flush().await.map_err(|_| Error::WriteFailure)?; // Ensure data is sent
        Ok(())
    }

    /// Sends `commands` wrapped in an enable/disable config mode session.
    pub async fn configure(&mut self, commands: &[Command]) -> Result<(), Error> {
        self.send(Command::EnableConfig).await?;
        for command in commands {
            self.send(*command).await?;
        }
        self.send(Command::DisableConfig).await
    }

    /// Enters or leaves config mode.
    pub async fn set_config_mode(&mut self, enable: bool) -> Result<(), Error> {
        let command = if enable {
            Command::EnableConfig
        } else {
            Command::DisableConfig
        };
        self.send(command).await
    }

    /// Switches between single and multi target tracking.
    pub async fn set_target_mode(&mut self, mode: TargetMode) -> Result<(), Error> {
        debug!("Setting target mode to: {:?}", mode);
        self.configure(&[Command::SetTargetMode(mode)]).await?;
        self.config.target_mode = mode;
        Ok(())
    }

    /// Enables single target tracking, or multi target tracking when `enable` is false.
    pub async fn set_single_target(&mut self, enable: bool) -> Result<(), Error> {
        let mode = if enable {
            TargetMode::Single
        } else {
            TargetMode::Multi
        };
        self.set_target_mode(mode).await
    }

    /// Asks the sensor for its current target mode.
    pub async fn query_target_mode(&mut self) -> Result<(), Error> {
        self.configure(&[Command::QueryTargetMode]).await
    }

    /// Sets the sensor's baud rate. The new rate applies after a reboot.
    pub async fn set_baud_rate(&mut self, baud_rate: BaudRate) -> Result<(), Error> {
        debug!("Setting baud rate to: {}", baud_rate.bps());
        self.configure(&[Command::SetBaudRate(baud_rate)]).await?;
        self.config.baud_rate = baud_rate;
        Ok(())
    }

    /// Turns the bluetooth radio on or off. Applies after a reboot.
    pub async fn set_bluetooth(&mut self, enable: bool) -> Result<(), Error> {
        debug!("Setting bluetooth to: {}", enable);
        self.configure(&[Command::SetBluetooth(enable)]).await?;
        self.config.bluetooth = enable;
        Ok(())
    }

    /// Restarts the sensor.
    ///
    /// The sensor leaves config mode on its own while restarting, so no
    /// disable command follows. Any partially received frame is dropped.
    pub async fn reboot(&mut self) -> Result<(), Error> {
        debug!("Rebooting sensor");
        self.send(Command::EnableConfig).await?;
        self.send(Command::Reboot).await?;
        self.parser.reset();
        // The sensor keeps its regions across a restart.
        self.info = DeviceInfo {
            last_regions: self.info.last_regions,
            ..DeviceInfo::default()
        };
        Ok(())
    }

    /// Restores factory settings. They apply after a reboot.
    pub async fn factory_reset(&mut self) -> Result<(), Error> {
        debug!("Restoring factory settings");
        self.configure(&[Command::FactoryReset]).await?;
        self.config = Config::default().rotation(self.config.rotation);
        self.info.regions = None;
        self.info.last_regions = None;
        Ok(())
    }

    /// Requests the firmware version. It arrives through
    /// [`Listener::on_firmware_version`].
    pub async fn read_firmware(&mut self) -> Result<(), Error> {
        self.configure(&[Command::ReadFirmware]).await
    }

    /// Requests the bluetooth MAC address.
    pub async fn read_mac(&mut self) -> Result<(), Error> {
        self.configure(&[Command::ReadMac]).await
    }

    /// Requests the region configuration. The reply refreshes [`Ld2450::regions`].
    pub async fn read_regions(&mut self) -> Result<(), Error> {
        self.configure(&[Command::ReadRegions]).await
    }

    /// Requests firmware version, MAC address, region configuration and
    /// target mode in one config session.
    pub async fn read_all_info(&mut self) -> Result<(), Error> {
        self.configure(&[
            Command::ReadFirmware,
            Command::ReadMac,
            Command::ReadRegions,
            Command::QueryTargetMode,
        ])
        .await
    }

    /// Replaces the sensor's region configuration.
    ///
    /// The cached regions are dropped and re-read from the sensor in the same
    /// session.
    pub async fn set_regions(&mut self, regions: RegionConfig) -> Result<(), Error> {
        debug!("Setting regions to: {:?}", regions);
        self.info.regions = None;
        self.info.last_regions = Some(regions);
        self.configure(&[Command::SetRegions(regions), Command::ReadRegions])
            .await
    }

    /// Changes how regions are applied, keeping the last known rectangles.
    ///
    /// # Returns
    ///
    /// * `Err(Error::RegionsUnknown)` if the regions were never read or set.
    pub async fn set_regions_mode(&mut self, mode: RegionsMode) -> Result<(), Error> {
        let mut regions = self.known_regions()?;
        regions.mode = mode;
        self.set_regions(regions).await
    }

    /// Replaces one of the three regions, keeping the others as last known.
    ///
    /// # Returns
    ///
    /// * `Err(Error::InvalidArg)` if `index` is not 0, 1 or 2.
    /// * `Err(Error::RegionsUnknown)` if the regions were never read or set.
    pub async fn set_region(&mut self, index: usize, region: Region) -> Result<(), Error> {
        if index >= SLOT_COUNT {
            log::error!("Region index {} out of range (0-{})", index, SLOT_COUNT - 1);
            return Err(Error::InvalidArg);
        }
        let mut regions = self.known_regions()?;
        regions.regions[index] = region;
        self.set_regions(regions).await
    }

    // Edits start from the last regions sent or reported, so back-to-back
    // changes don't need a poll in between.
    fn known_regions(&self) -> Result<RegionConfig, Error> {
        self.info.last_regions.ok_or_else(|| {
            log::error!("Region configuration unknown; read or set the regions first");
            Error::RegionsUnknown
        })
    }

    /// Sets the rotation, in degrees, applied to reported target positions.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.config.rotation = degrees;
        self.parser.set_rotation(degrees);
    }

    /// Logs the cached configuration and device details.
    pub fn dump_config(&self) {
        info!("LD2450:");
        info!("  Target mode: {:?}", self.config.target_mode);
        info!("  Baud rate: {}", self.config.baud_rate.bps());
        info!("  Bluetooth: {}", self.config.bluetooth);
        info!("  Rotation: {}", self.config.rotation);
        info!("  Firmware: {}", self.firmware_version().unwrap_or("unknown"));
        info!("  MAC: {}", self.mac().unwrap_or("unknown"));
        match self.regions() {
            Some(regions) => info!("  Regions: {:?}", regions),
            None => info!("  Regions: unknown"),
        }
    }
}

// Keeps the driver's caches current before handing events to the caller.
struct Tracker<'a, L: ?Sized> {
    info: &'a mut DeviceInfo,
    config: &'a mut Config,
    inner: &'a mut L,
}

impl<L: Listener + ?Sized> Listener for Tracker<'_, L> {
    fn on_targets_reported(&mut self, report: &TargetReport) {
        self.inner.on_targets_reported(report);
    }

    fn on_firmware_version(&mut self, version: &str) {
        self.info.firmware = VersionString::try_from(version).ok();
        self.inner.on_firmware_version(version);
    }

    fn on_mac(&mut self, mac: &str) {
        self.info.mac = MacString::try_from(mac).ok();
        self.inner.on_mac(mac);
    }

    fn on_regions_reported(&mut self, regions: &RegionConfig) {
        self.info.regions = Some(*regions);
        self.info.last_regions = Some(*regions);
        self.inner.on_regions_reported(regions);
    }

    fn on_target_mode(&mut self, mode: TargetMode) {
        self.config.target_mode = mode;
        self.inner.on_target_mode(mode);
    }

    fn on_command_ack(&mut self, command: u8, success: bool) {
        if !success {
            log::warn!("Sensor rejected command 0x{:02X}", command);
        }
        self.inner.on_command_ack(command, success);
    }
}
