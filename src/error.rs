//! Error types for PT series printer operations.
//!
//! Job validation errors are raised before a single byte of raster data is
//! encoded; transport and hardware errors come from the USB layer and the
//! printer status block.

use crate::tape::TapeType;
use rusb;
use thiserror::Error;

/// Main error type for PT series printer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Tape type string outside the supported set.
    ///
    /// Carries the offending value. Raised by [`TapeType`] parsing before
    /// the image height is even looked at.
    #[error("unknown tape type `{0}`")]
    UnknownTapeType(String),

    /// Image height not printable on the given tape.
    ///
    /// Each tape width accepts only the fixed heights of the profile
    /// table; anything else cannot be positioned on the 128 dot head.
    #[error("unsupported image height {height} for tape {tape}")]
    UnsupportedDimension { tape: TapeType, height: u32 },

    #[error("unknown printer model `{0}`")]
    UnknownModel(String),

    /// USB communication error.
    ///
    /// Wraps underlying rusb errors for device communication issues,
    /// timeouts, or permission problems.
    #[error(transparent)]
    UsbError(#[from] rusb::Error),

    #[error("Device is offline")]
    DeviceOffline,

    #[error("Can't read device list, permission issue ?")]
    DeviceListNotReadable,

    #[error("Device is missing endpoint")]
    MissingEndpoint,

    #[error("Received invalid response from printer")]
    InvalidResponse(usize),

    /// Installed tape does not match the job.
    ///
    /// The printer reports the width of the loaded cartridge in its
    /// status block; the job is rejected before any raster data is sent.
    #[error("installed tape is {actual} mm wide, job needs {expected} mm")]
    TapeMismatch { expected: u8, actual: u8 },

    #[error("Status request return no response")]
    ReadStatusTimeout,

    /// Hardware-level printer error reported by the device itself.
    #[error(transparent)]
    PrinterError(PrinterError),
}

/// Hardware-specific errors reported by the printer.
///
/// Parsed from the printer's 32-byte status response; these indicate
/// physical problems that need user intervention.
#[derive(Error, Debug)]
pub enum PrinterError {
    #[error("No tape is installed")]
    NoMedia,

    #[error("End of tape")]
    EndOfMedia,

    #[error("Cutter jam")]
    CutterJam,

    #[error("Printer is in use")]
    PrinterInUse,

    #[error("Printer is offline")]
    PrinterOffline,

    #[error("Installed tape is not usable")]
    InvalidMedia,

    #[error("Expansion buffer is full")]
    BufferFull,

    #[error("Communication error")]
    CommunicationError,

    #[error("Cover is open")]
    CoverOpen,

    #[error("Tape can not be fed")]
    FeedMediaFail,

    #[error("System error")]
    SystemError,

    #[error("Unknown error")]
    UnknownError((u8, u8)),
}

impl PrinterError {
    /// Parse the error condition from a 32-byte status buffer.
    ///
    /// Bytes 8 and 9 carry "error information 1/2" as bit fields; a fully
    /// cleared pair means no error and decodes to `UnknownError((0, 0))`.
    pub fn from_buf(buf: [u8; 32]) -> Self {
        let err_1 = buf[8];
        let err_2 = buf[9];

        match err_1 {
            0b0000_0001 => Self::NoMedia,
            0b0000_0010 => Self::EndOfMedia,
            0b0000_0100 => Self::CutterJam,
            0b0001_0000 => Self::PrinterInUse,
            0b0010_0000 => Self::PrinterOffline,
            _ => match err_2 {
                0b0000_0001 => Self::InvalidMedia,
                0b0000_0010 => Self::BufferFull,
                0b0000_0100 => Self::CommunicationError,
                0b0001_0000 => Self::CoverOpen,
                0b0100_0000 => Self::FeedMediaFail,
                0b1000_0000 => Self::SystemError,
                _ => Self::UnknownError((err_1, err_2)),
            },
        }
    }

    /// Check if this represents a "no error" state.
    pub fn is_no_error(&self) -> bool {
        matches!(self, Self::UnknownError((0, 0)))
    }
}
