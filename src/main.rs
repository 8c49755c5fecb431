use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::Parser;

use pt_label::{raster, Config, Model, Printer, TapeType};

/// Print PNG labels on Brother P-Touch PT series tape printers.
#[derive(Parser, Debug)]
#[command(name = "ptlabel", version, about = "Print PNG labels on P-Touch PT series printers")]
struct Cli {
    /// PNG image to print; its height must match the tape (e.g. 128 px for 24 mm)
    image: Option<PathBuf>,

    /// Tape cartridge loaded in the printer: 6, 9, 9+, 12, 12+, 18, 18+ or 24
    #[arg(long, short, default_value = "24")]
    tape: String,

    /// Do not cut the tape after printing
    #[arg(long)]
    no_cut: bool,

    /// Fill the frame padding with ink instead of leaving it blank
    #[arg(long)]
    inverse: bool,

    /// Print a head alignment pattern instead of a production label
    #[arg(long)]
    calibration: bool,

    /// List connected PT series printers and exit
    #[arg(long)]
    list: bool,

    /// Printer model
    #[arg(long, default_value = "p700")]
    model: String,

    /// Printer serial number; defaults to the first connected printer of the model
    #[arg(long)]
    serial: Option<String>,

    /// Write the encoded stream to a file instead of printing
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();

    if cli.list {
        let printers = Printer::enumerate()?;
        if printers.is_empty() {
            println!("no PT series printer found");
        }
        for (model, serial) in printers {
            println!("{:?} {}", model, serial);
        }
        return Ok(());
    }

    let path = match cli.image {
        Some(p) => p,
        None => bail!("no image given, nothing to print"),
    };

    let tape = if cli.calibration {
        TapeType::Calibration
    } else {
        cli.tape.parse::<TapeType>()?
    };

    let image = image::open(&path)
        .with_context(|| format!("can not open {}", path.display()))?
        .to_rgb8();

    if let Some(out) = cli.output {
        let stream = raster::assemble(&image, tape, !cli.no_cut, cli.inverse)?;
        fs::write(&out, &stream).with_context(|| format!("can not write {}", out.display()))?;
        println!("wrote {} bytes to {}", stream.len(), out.display());
        return Ok(());
    }

    let model: Model = cli.model.parse()?;
    let serial = match cli.serial {
        Some(serial) => serial,
        None => match Printer::enumerate()?
            .into_iter()
            .find(|(m, _)| *m == model)
        {
            Some((_, serial)) => serial,
            None => bail!("no connected {:?} found, try --list", model),
        },
    };

    let mut config = Config::new(model, serial, tape).inverse(cli.inverse);
    if cli.no_cut {
        config = config.disable_auto_cut();
    }

    let printer = Printer::new(config)?;
    printer.print(&image)?;

    Ok(())
}
