use log::debug;

use crate::{
    decode, detect, ByteAccumulator, Event, RegionConfig, Reply, Scan, TargetMode, TargetReport,
};

/// Receives everything decoded from the sensor's byte stream.
///
/// All methods default to doing nothing, implement the ones you need.
pub trait Listener {
    /// A target report arrived. Absent targets are `None`.
    fn on_targets_reported(&mut self, _report: &TargetReport) {}
    /// The firmware version, formatted like `V1.02.22062416`.
    fn on_firmware_version(&mut self, _version: &str) {}
    /// The bluetooth MAC address as colon separated hex.
    fn on_mac(&mut self, _mac: &str) {}
    /// The region configuration read back from the sensor.
    fn on_regions_reported(&mut self, _regions: &RegionConfig) {}
    /// Reply to a target mode query.
    fn on_target_mode(&mut self, _mode: TargetMode) {}
    /// Called for every command acknowledgement, including ones whose
    /// payload is reported through a more specific method.
    fn on_command_ack(&mut self, _command: u8, _success: bool) {}
}

/// Turns chunks of serial bytes into decoded events.
///
/// Bytes are kept between calls until a complete frame is available, so a
/// frame may be split across any number of [`Parser::feed`] calls.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    buffer: ByteAccumulator,
    rotation: f32,
}

impl Parser {
    /// Creates a parser with no rotation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser that rotates target positions by `degrees`.
    pub fn with_rotation(degrees: f32) -> Self {
        Self {
            buffer: ByteAccumulator::new(),
            rotation: degrees,
        }
    }

    /// Rotation in degrees applied to decoded targets.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Changes the rotation used for frames decoded from now on.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    /// Number of bytes waiting for the rest of a frame.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Drops any partially received frame.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Consumes `bytes` and reports every complete frame to `listener`.
    ///
    /// Bytes are appended in pieces no larger than the free space and scanned
    /// after each piece. Anything that cannot start a frame is dropped during
    /// the scan, so the buffer never holds more than one unfinished frame and
    /// a stream without headers leaves it empty.
    ///
    /// Returns the number of frames decoded.
    pub fn feed<L: Listener + ?Sized>(&mut self, mut bytes: &[u8], listener: &mut L) -> usize {
        let mut frames = 0;
        while !bytes.is_empty() {
            let taken = self.buffer.append(bytes);
            bytes = &bytes[taken..];
            frames += self.drain(listener);
            // An unfinished frame is always shorter than the buffer.
            debug_assert!(!self.buffer.is_full());
        }
        frames
    }

    fn drain<L: Listener + ?Sized>(&mut self, listener: &mut L) -> usize {
        let mut frames = 0;
        loop {
            match detect(self.buffer.as_slice()) {
                Scan::Frame { frame, consumed } => {
                    self.buffer.consume(consumed);
                    frames += 1;
                    self.dispatch(decode(&frame), listener);
                }
                Scan::Incomplete { discard } => {
                    if discard > 0 {
                        debug!("Discarding {} bytes of garbage", discard);
                        self.buffer.consume(discard);
                    }
                    return frames;
                }
            }
        }
    }

    fn dispatch<L: Listener + ?Sized>(&self, event: Event, listener: &mut L) {
        match event {
            Event::Targets(report) => {
                let report = report.rotated(self.rotation);
                listener.on_targets_reported(&report);
            }
            Event::Ack(ack) => {
                debug!(
                    "Ack for 0x{:02X}, success: {}, reply: {:?}",
                    ack.command, ack.success, ack.reply
                );
                listener.on_command_ack(ack.command, ack.success);
                match &ack.reply {
                    Reply::FirmwareVersion(version) => listener.on_firmware_version(version),
                    Reply::Mac(mac) => listener.on_mac(mac),
                    Reply::Regions(regions) => listener.on_regions_reported(regions),
                    Reply::TargetMode(mode) => listener.on_target_mode(*mode),
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommandFrame, PersonSlot, DATA_FOOTER, DATA_HEADER, GET_MAC, READ_FIRMWARE};

    #[derive(Default)]
    struct Recorder {
        reports: std::vec::Vec<TargetReport>,
        acks: std::vec::Vec<(u8, bool)>,
        versions: std::vec::Vec<std::string::String>,
        macs: std::vec::Vec<std::string::String>,
        regions: std::vec::Vec<RegionConfig>,
        modes: std::vec::Vec<TargetMode>,
    }

    impl Listener for Recorder {
        fn on_targets_reported(&mut self, report: &TargetReport) {
            self.reports.push(*report);
        }
        fn on_firmware_version(&mut self, version: &str) {
            self.versions.push(version.into());
        }
        fn on_mac(&mut self, mac: &str) {
            self.macs.push(mac.into());
        }
        fn on_regions_reported(&mut self, regions: &RegionConfig) {
            self.regions.push(*regions);
        }
        fn on_target_mode(&mut self, mode: TargetMode) {
            self.modes.push(mode);
        }
        fn on_command_ack(&mut self, command: u8, success: bool) {
            self.acks.push((command, success));
        }
    }

    fn report_frame() -> std::vec::Vec<u8> {
        let slots = [
            PersonSlot {
                cx: 0x8000 - 782,
                cy: 0x8000 | 1713,
                speed: 0x8000 - 16,
                resolution: 360,
            },
            PersonSlot::default(),
            PersonSlot {
                cx: 0x8000 | 250,
                cy: 0x8000 | 900,
                speed: 0x8000,
                resolution: 320,
            },
        ];
        let mut bytes = DATA_HEADER.to_vec();
        for slot in slots.iter() {
            bytes.extend_from_slice(&slot.to_bytes());
        }
        bytes.extend_from_slice(&DATA_FOOTER);
        bytes
    }

    fn ack_frame(command: u8, payload: &[u8]) -> std::vec::Vec<u8> {
        let mut frame = CommandFrame::new(command, payload).unwrap();
        frame.ack = true;
        frame.encode_to_vec().unwrap().to_vec()
    }

    #[test]
    fn test_feed_whole_report() {
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        assert_eq!(parser.feed(&report_frame(), &mut recorder), 1);
        assert_eq!(recorder.reports.len(), 1);

        let report = recorder.reports[0];
        assert_eq!(report.target_count(), 2);
        assert!(report.flags.any && report.flags.moving && report.flags.still);
        assert_eq!(report.targets[0].unwrap().x, -782.0);
        assert!(report.targets[1].is_none());
        assert_eq!(parser.pending(), 0);
    }

    #[test]
    fn test_feed_split_at_every_point() {
        let bytes = report_frame();
        let mut whole = Recorder::default();
        Parser::new().feed(&bytes, &mut whole);

        for split in 1..bytes.len() {
            let mut parser = Parser::new();
            let mut recorder = Recorder::default();
            assert_eq!(parser.feed(&bytes[..split], &mut recorder), 0, "split {}", split);
            assert_eq!(parser.pending(), split);
            parser.feed(&bytes[split..], &mut recorder);
            assert_eq!(recorder.reports, whole.reports, "split {}", split);
        }
    }

    #[test]
    fn test_feed_byte_by_byte() {
        let bytes = ack_frame(GET_MAC, &[0x00, 0x00, 0x8C, 0xAA, 0xB5, 0x01, 0x02, 0x03]);
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        for byte in bytes.iter() {
            parser.feed(core::slice::from_ref(byte), &mut recorder);
        }
        assert_eq!(recorder.macs, ["8C:AA:B5:01:02:03"]);
        assert_eq!(recorder.acks, [(GET_MAC, true)]);
    }

    #[test]
    fn test_garbage_before_frame() {
        let mut bytes = std::vec![0x00, 0x55, 0xCC, 0xAA, 0x01, 0xFD, 0xFC, 0x13, 0x37];
        bytes.extend(report_frame());
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        assert_eq!(parser.feed(&bytes, &mut recorder), 1);
        assert_eq!(recorder.reports.len(), 1);
        assert_eq!(recorder.reports[0].target_count(), 2);
        assert_eq!(parser.pending(), 0);
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut bytes = report_frame();
        bytes.extend(ack_frame(
            READ_FIRMWARE,
            &[0x00, 0x00, 0x00, 0x00, 0x02, 0x01, 0x16, 0x24, 0x06, 0x22],
        ));
        bytes.extend(report_frame());
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        assert_eq!(parser.feed(&bytes, &mut recorder), 3);
        assert_eq!(recorder.reports.len(), 2);
        assert_eq!(recorder.versions, ["V1.02.22062416"]);
        assert_eq!(recorder.acks, [(READ_FIRMWARE, true)]);
    }

    #[test]
    fn test_corrupt_frame_is_dropped() {
        let mut corrupt = report_frame();
        let last = corrupt.len() - 1;
        corrupt[last] = 0xCD;
        corrupt.extend(report_frame());
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        assert_eq!(parser.feed(&corrupt, &mut recorder), 1);
        assert_eq!(recorder.reports.len(), 1);
    }

    #[test]
    fn test_corrupt_ack_is_dropped() {
        let mut bytes = ack_frame(GET_MAC, &[0x00, 0x00, 0x8C, 0xAA, 0xB5, 0x01, 0x02, 0x03]);
        let last = bytes.len() - 1;
        bytes[last] = 0x11;
        bytes.extend(ack_frame(crate::SINGLE_TARGET, &[0x00, 0x00]));

        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        assert_eq!(parser.feed(&bytes, &mut recorder), 1);
        assert!(recorder.macs.is_empty());
        assert_eq!(recorder.acks, [(crate::SINGLE_TARGET, true)]);
        assert_eq!(parser.pending(), 0);
    }

    #[test]
    fn test_overflow_without_header() {
        let garbage: std::vec::Vec<u8> = (0..300u32).map(|i| (i % 0x50) as u8).collect();
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        assert_eq!(parser.feed(&garbage, &mut recorder), 0);
        assert_eq!(parser.pending(), 0);
        assert!(recorder.reports.is_empty());
        assert!(recorder.acks.is_empty());

        // Still in sync afterwards.
        assert_eq!(parser.feed(&report_frame(), &mut recorder), 1);
    }

    #[test]
    fn test_rotation_applied_to_present_targets_only() {
        let mut parser = Parser::with_rotation(90.0);
        let mut recorder = Recorder::default();
        parser.feed(&report_frame(), &mut recorder);
        let report = recorder.reports[0];
        assert!(report.targets[1].is_none());
        let target = report.targets[2].unwrap();
        assert!((target.x + 900.0).abs() < 0.05);
        assert!((target.y - 250.0).abs() < 0.05);
        assert_eq!(target.speed, 0);
    }

    #[test]
    fn test_unknown_ack_reported() {
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        parser.feed(&ack_frame(0x61, &[0x01, 0x00]), &mut recorder);
        assert_eq!(recorder.acks, [(0x61, false)]);
    }

    #[test]
    fn test_target_mode_reply() {
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        parser.feed(
            &ack_frame(crate::QUERY_TARGET_MODE, &[0x00, 0x00, 0x02, 0x00]),
            &mut recorder,
        );
        assert_eq!(recorder.modes, [TargetMode::Multi]);
    }

    #[test]
    fn test_reset_drops_partial_frame() {
        let bytes = report_frame();
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        parser.feed(&bytes[..10], &mut recorder);
        parser.reset();
        parser.feed(&bytes[10..], &mut recorder);
        assert!(recorder.reports.is_empty());
    }
}
