//! P-Touch PT Series Printer Driver
//!
//! This crate provides a printer driver for Brother P-Touch PT series tape printers.
//!
//! The PT print head is addressed column by column: every vertical slice of
//! the label image becomes one framed `G` record positioned inside the
//! 128 dot head by tape dependent padding. [`raster::assemble`] turns a
//! decoded image into the complete command stream, [`Printer`] spools it
//! over USB.
//!
//! # Example
//!
//! ```rust,no_run
//! use pt_label::{raster, Config, Model, Printer, TapeType};
//!
//! let image = image::open("label.png").unwrap().to_rgb8();
//!
//! // Encode without touching any hardware.
//! let stream = raster::assemble(&image, TapeType::Tape12, true, false).unwrap();
//!
//! // Or hand the image to a connected printer.
//! let config = Config::new(Model::PTP700, "serial".to_string(), TapeType::Tape12);
//! let printer = Printer::new(config).unwrap();
//! printer.print(&image).unwrap();
//! ```

mod error;
mod model;
mod printer;
mod tape;

pub mod raster;

pub use crate::{
    error::{Error, PrinterError},
    model::Model,
    printer::{Config, Printer, Status},
    tape::{TapeProfile, TapeType},
};

/// Data bytes in one framed column record.
///
/// The PT head is 128 dots tall, one bit per dot, so every record carries
/// exactly 16 data bytes after its 2-byte header regardless of the tape
/// width. Narrower tapes print through a padded sub-range of the head.
pub const FRAME_DATA_BYTES: usize = 16;

/// Print head height in dots for the PT series covered by this driver.
pub const HEAD_PINS: u32 = 128;
