use image::RgbImage;
use log::{debug, info};
use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, Direction, TransferType, UsbContext};
use std::time::Duration;

use crate::{
    error::{Error, PrinterError},
    model::Model,
    raster,
    tape::TapeType,
};

const VENDOR_ID: u16 = 0x04F9;

#[derive(Debug, Clone, Copy)]
struct Endpoint {
    config: u8,
    iface: u8,
    setting: u8,
    address: u8,
}

pub struct Printer {
    handle: Box<DeviceHandle<Context>>,
    endpoint_out: Endpoint,
    endpoint_in: Endpoint,
    config: Config,
}

impl Printer {
    pub fn new(config: Config) -> Result<Self, Error> {
        match Context::new() {
            Ok(mut context) => {
                match Self::open_device(&mut context, config.model.pid(), config.serial.clone()) {
                    Ok((mut device, device_desc, mut handle)) => {
                        handle.reset()?;

                        let endpoint_in = match Self::find_endpoint(
                            &mut device,
                            &device_desc,
                            Direction::In,
                            TransferType::Bulk,
                        ) {
                            Some(endpoint) => endpoint,
                            None => return Err(Error::MissingEndpoint),
                        };

                        let endpoint_out = match Self::find_endpoint(
                            &mut device,
                            &device_desc,
                            Direction::Out,
                            TransferType::Bulk,
                        ) {
                            Some(endpoint) => endpoint,
                            None => return Err(Error::MissingEndpoint),
                        };

                        // Some units ship with usblp bound to the
                        // interface; it must be detached before claiming.
                        handle.set_auto_detach_kernel_driver(true)?;
                        let has_kernel_driver = match handle.kernel_driver_active(0) {
                            Ok(true) => true,
                            _ => false,
                        };
                        info!(" Kernel driver support is {}", has_kernel_driver);
                        handle.set_active_configuration(1)?;
                        handle.claim_interface(0)?;
                        handle.set_alternate_setting(0, 0)?;

                        Ok(Printer {
                            handle: Box::new(handle),
                            endpoint_out,
                            endpoint_in,
                            config,
                        })
                    }
                    Err(err) => {
                        debug!("{:?}", err);
                        Err(Error::DeviceOffline)
                    }
                }
            }
            Err(err) => Err(Error::UsbError(err)),
        }
    }

    /// List connected PT series printers as (model, serial) pairs.
    pub fn enumerate() -> Result<Vec<(Model, String)>, Error> {
        let context = Context::new()?;
        let devices = context.devices()?;
        let timeout = Duration::from_secs(1);
        let mut found = Vec::new();

        for device in devices.iter() {
            let device_desc = match device.device_descriptor() {
                Ok(d) => d,
                Err(err) => {
                    debug!("{:?}", err);
                    continue;
                }
            };

            if device_desc.vendor_id() != VENDOR_ID {
                continue;
            }
            let model = match Model::from_pid(device_desc.product_id()) {
                Some(m) => m,
                None => continue,
            };

            let handle = match device.open() {
                Ok(h) => h,
                Err(err) => {
                    debug!("Failed to open device: {:?}", err);
                    continue;
                }
            };
            let languages = match handle.read_languages(timeout) {
                Ok(l) => l,
                Err(_) => continue,
            };
            if let Some(language) = languages.first() {
                match handle.read_serial_number_string(*language, &device_desc, timeout) {
                    Ok(serial) => found.push((model, serial)),
                    Err(err) => debug!("Failed to read serial number string: {:?}", err),
                }
            }
        }

        Ok(found)
    }

    fn open_device(
        context: &mut Context,
        pid: u16,
        serial: String,
    ) -> Result<(Device<Context>, DeviceDescriptor, DeviceHandle<Context>), Error> {
        let devices = context.devices()?;

        if devices.is_empty() {
            debug!("Failed to read device list");
            return Err(Error::DeviceListNotReadable);
        }
        for device in devices.iter() {
            let device_desc = match device.device_descriptor() {
                Ok(d) => d,
                Err(err) => {
                    debug!("{:?}", err);
                    continue;
                }
            };
            debug!("{:?}", device_desc);

            if device_desc.vendor_id() == VENDOR_ID && device_desc.product_id() == pid {
                match device.open() {
                    Ok(handle) => {
                        let timeout = Duration::from_secs(1);
                        let languages = handle.read_languages(timeout)?;

                        if languages.len() > 0 {
                            let language = languages[0];
                            match handle.read_serial_number_string(language, &device_desc, timeout)
                            {
                                Ok(s) => {
                                    if s == serial {
                                        return Ok((device, device_desc, handle));
                                    } else {
                                        continue;
                                    }
                                }
                                Err(err) => {
                                    debug!("Failed to read serial number string: {:?}", err);
                                    continue;
                                }
                            }
                        } else {
                            continue;
                        }
                    }
                    Err(err) => {
                        debug!("Failed to open device: {:?}", err);
                        continue;
                    }
                }
            }
        }
        debug!("No device match with this serial: {:?}", serial);
        Err(Error::DeviceOffline)
    }

    fn find_endpoint(
        device: &mut Device<Context>,
        device_desc: &DeviceDescriptor,
        direction: Direction,
        transfer_type: TransferType,
    ) -> Option<Endpoint> {
        for n in 0..device_desc.num_configurations() {
            let config_desc = match device.config_descriptor(n) {
                Ok(c) => c,
                Err(_) => continue,
            };
            for interface in config_desc.interfaces() {
                for interface_desc in interface.descriptors() {
                    for endpoint_desc in interface_desc.endpoint_descriptors() {
                        if endpoint_desc.direction() == direction
                            && endpoint_desc.transfer_type() == transfer_type
                        {
                            return Some(Endpoint {
                                config: config_desc.number(),
                                iface: interface_desc.interface_number(),
                                setting: interface_desc.setting_number(),
                                address: endpoint_desc.address(),
                            });
                        }
                    }
                }
            }
        }
        None
    }

    fn write(&self, buf: Vec<u8>) -> Result<usize, Error> {
        let timeout = Duration::from_secs(10);
        let result = self
            .handle
            .write_bulk(self.endpoint_out.address, &buf, timeout);
        match result {
            Ok(n) => {
                if n == buf.len() {
                    Ok(n)
                } else {
                    debug!(
                        "write error: bytes wrote {} != bytes supplied {}, possibly timeout ?",
                        n,
                        buf.len()
                    );
                    Err(Error::InvalidResponse(n))
                }
            }
            Err(e) => Err(Error::UsbError(e)),
        }
    }

    /// Read printer status.
    ///
    /// This method is convenient for inspection when a new tape is loaded.
    pub fn check_status(&self) -> Result<Status, Error> {
        self.request_status()?;
        self.read_status()
    }

    fn read_status(&self) -> Result<Status, Error> {
        let timeout = Duration::from_secs(1);
        let mut buf: [u8; 32] = [0x00; 32];
        let mut counter = 0;

        while counter < 10 {
            match self
                .handle
                .read_bulk(self.endpoint_in.address, &mut buf, timeout)
            {
                Ok(32) => {
                    let status = Status::from_buf(buf);
                    debug!("Raw status code: {:X?}", buf);
                    debug!("Parsed Status struct: {:?}", status);
                    if status.phase == Phase::Receiving {
                        return Ok(status);
                    } else {
                        std::thread::sleep(std::time::Duration::from_secs(1));
                    }
                }
                Ok(_) => {
                    std::thread::sleep(std::time::Duration::from_secs(1));
                }
                Err(e) => return Err(Error::UsbError(e)),
            };
            counter = counter + 1;
        }
        Err(Error::ReadStatusTimeout)
    }

    fn request_status(&self) -> Result<usize, Error> {
        let mut buf: Vec<u8> = Vec::new();
        buf.append(&mut [0x00; 400].to_vec());
        buf.append(&mut [0x1B, 0x40].to_vec());
        buf.append(&mut [0x1B, 0x69, 0x53].to_vec());
        self.write(buf)
    }

    /// Print one label.
    ///
    /// Checks the installed tape against the configured one before any
    /// raster data is sent, then spools the assembled stream in a single
    /// bulk transfer.
    pub fn print(&self, image: &RgbImage) -> Result<(), Error> {
        debug!("request get status");
        self.request_status()?;

        let status = self.read_status()?;
        debug!("printer status {:#?}", status);
        status.check_tape(self.config.tape)?;

        debug!("start printing label");
        let stream = raster::assemble(
            image,
            self.config.tape,
            self.config.auto_cut,
            self.config.inverse,
        )?;
        self.write(stream)?;
        Ok(())
    }
}

///
/// Status received from the printer encoded to a Rust friendly type.
///
#[derive(Debug)]
pub struct Status {
    error: PrinterError,
    media_width: u8,
    media_type: u8,
    status_type: StatusType,
    phase: Phase,
}

impl Status {
    fn from_buf(buf: [u8; 32]) -> Self {
        Status {
            error: PrinterError::from_buf(buf),
            media_width: buf[10],
            media_type: buf[11],
            status_type: StatusType::from_code(buf[18]),
            phase: Phase::from_buf(buf),
        }
    }

    /// Width in millimeters of the installed tape, as reported by the
    /// printer. Zero when no cartridge is loaded.
    pub fn media_width(&self) -> u8 {
        self.media_width
    }

    pub fn check_tape(self, tape: TapeType) -> Result<(), Error> {
        if !self.error.is_no_error() {
            return Err(Error::PrinterError(self.error));
        }
        match tape.width_mm() {
            // Calibration patterns print on whatever is loaded.
            None => Ok(()),
            Some(expected) => {
                if self.media_width == expected {
                    Ok(())
                } else {
                    Err(Error::TapeMismatch {
                        expected,
                        actual: self.media_width,
                    })
                }
            }
        }
    }
}

// StatusType

#[derive(Debug, PartialEq)]
enum StatusType {
    ReplyToRequest,
    Completed,
    Error,
    Offline,
    Notification,
    PhaseChange,
    Unknown,
}

impl StatusType {
    fn from_code(code: u8) -> StatusType {
        match code {
            0x00 => Self::ReplyToRequest,
            0x01 => Self::Completed,
            0x02 => Self::Error,
            0x04 => Self::Offline,
            0x05 => Self::Notification,
            0x06 => Self::PhaseChange,
            _ => Self::Unknown,
        }
    }
}

// Phase

#[derive(Debug, PartialEq)]
enum Phase {
    Receiving,
    Printing,
    Waiting(u16),
}

impl Phase {
    fn from_buf(buf: [u8; 32]) -> Self {
        match buf[19] {
            0x00 => Self::Receiving,
            0x01 => Self::Printing,
            _ => Self::Waiting(0),
        }
    }
}

/// Config
///
#[derive(Debug, Clone)]
pub struct Config {
    model: Model,
    serial: String,
    tape: TapeType,
    auto_cut: bool,
    inverse: bool,
}

impl Config {
    /// Initialize configuration data with default values.
    ///
    /// Model, serial and tape are not modifiable after initialization;
    /// auto cut defaults to on, inverse to off.
    pub fn new(model: Model, serial: String, tape: TapeType) -> Config {
        Config {
            model,
            serial,
            tape,
            auto_cut: true,
            inverse: false,
        }
    }

    pub fn disable_auto_cut(self) -> Self {
        Config {
            auto_cut: false,
            ..self
        }
    }

    pub fn inverse(self, flag: bool) -> Self {
        Config {
            inverse: flag,
            ..self
        }
    }
}
