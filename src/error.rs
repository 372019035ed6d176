use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Writing a frame to the serial port failed.
    WriteFailure,
    /// Reading from the serial port failed.
    ReadFailure,
    /// An argument was outside the range the device accepts.
    InvalidArg,
    /// A command payload does not fit in a single frame.
    PayloadTooLarge,
    /// A region edit needs the current regions, which have not been read or set yet.
    RegionsUnknown,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WriteFailure => f.write_str("failed to write to serial port"),
            Error::ReadFailure => f.write_str("failed to read from serial port"),
            Error::InvalidArg => f.write_str("invalid argument"),
            Error::PayloadTooLarge => f.write_str("payload too large for a frame"),
            Error::RegionsUnknown => f.write_str("region configuration not known yet"),
        }
    }
}
