//! Raster stream encoding for the PT series print head.
//!
//! The printer consumes the label as a left-to-right sequence of framed
//! column records bracketed by a fixed preamble and terminator. Encoding
//! is pure: no hardware is touched here, the assembled `Vec<u8>` can be
//! spooled by [`crate::Printer`] or written to a file as-is.

use image::RgbImage;
use log::trace;

use crate::{
    error::Error,
    tape::{TapeProfile, TapeType},
};

/// Pixels with a red channel below this value print as ink.
///
/// Only the red channel is compared; source images are expected to be
/// effectively monochrome already. Kept for bit compatibility with the
/// streams produced by the vendor tooling.
pub const INK_THRESHOLD: u8 = 150;

/// Build the fixed job preamble.
///
/// The flag byte of `ESC i M` carries auto cut in its high bit; every
/// other byte is constant.
pub fn preamble(auto_cut: bool) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();

    // Older firmware wants any half-received job flushed before the first
    // real command; 400 zero bytes are tolerated by all tested units.
    buf.append(&mut [0x00; 400].to_vec());

    buf.append(&mut [0x1B, 0x40].to_vec()); // ESC @ : Initialize
    buf.append(&mut [0x1B, 0x69, 0x53].to_vec()); // ESC i S : Request status

    let mode: u8 = if auto_cut { 0b0100_0000 } else { 0b0000_0000 };
    buf.append(&mut [0x1B, 0x69, 0x4D, mode].to_vec()); // ESC i M : Set various mode

    buf.append(&mut [0x1B, 0x69, 0x64, 0x14, 0x00].to_vec()); // ESC i d : 20 dot margin

    buf
}

/// Build the job terminator: print, then cut and eject the tape.
pub fn terminator() -> Vec<u8> {
    [0x5A, 0x1A].to_vec()
}

/// Encode one vertical pixel column into a framed record.
///
/// Pixels are read top to bottom and packed 8 per byte, topmost pixel in
/// the most significant bit. `inverse` flips the padding fill bytes from
/// 0x00 to 0xFF but leaves the thresholded image bits alone.
pub fn encode_column(
    image: &RgbImage,
    x: u32,
    profile: &TapeProfile,
    inverse: bool,
) -> Result<Vec<u8>, Error> {
    if profile.image_bytes * 8 != image.height() as usize {
        return Err(Error::UnsupportedDimension {
            tape: profile.tape,
            height: image.height(),
        });
    }

    let fill: u8 = if inverse { 0xFF } else { 0x00 };

    let mut buf: Vec<u8> = Vec::with_capacity(2 + profile.frame_len());
    buf.push(0x47); // 'G'
    buf.push((profile.frame_len() - 1) as u8);

    buf.append(&mut vec![fill; profile.leading]);
    for group in 0..profile.image_bytes {
        let mut packed: u8 = 0x00;
        for bit in 0..8 {
            let y = (group * 8 + bit) as u32;
            if image.get_pixel(x, y).0[0] < INK_THRESHOLD {
                packed |= 0x80 >> bit;
            }
        }
        buf.push(packed);
    }
    buf.append(&mut vec![fill; profile.trailing]);

    trace!("column {}: {:02X?}", x, buf);

    Ok(buf)
}

/// Assemble the complete command stream for one label.
///
/// Validation happens up front: once the first column is encoded the
/// stream is guaranteed to complete. Columns are emitted strictly left to
/// right, the head prints them in arrival order.
pub fn assemble(
    image: &RgbImage,
    tape: TapeType,
    auto_cut: bool,
    inverse: bool,
) -> Result<Vec<u8>, Error> {
    let profile = tape.profile(image.height())?;

    // Calibration profiles accept any positive height; the packer still
    // needs whole bytes per column.
    if profile.image_bytes * 8 != profile.height as usize {
        return Err(Error::UnsupportedDimension {
            tape,
            height: profile.height,
        });
    }

    let mut buf = preamble(auto_cut);
    for x in 0..image.width() {
        buf.append(&mut encode_column(image, x, &profile, inverse)?);
    }
    buf.append(&mut terminator());

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn solid(width: u32, height: u32, pixel: Rgb<u8>) -> RgbImage {
        RgbImage::from_pixel(width, height, pixel)
    }

    #[test]
    fn preamble_differs_only_in_the_auto_cut_byte() {
        let with_cut = preamble(true);
        let without = preamble(false);

        assert_eq!(with_cut.len(), without.len());
        for (i, (a, b)) in with_cut.iter().zip(without.iter()).enumerate() {
            if i == 408 {
                assert_eq!(*a, 0x40);
                assert_eq!(*b, 0x00);
            } else {
                assert_eq!(a, b, "preamble byte {} should not depend on auto cut", i);
            }
        }
    }

    #[test]
    fn preamble_command_layout() {
        let buf = preamble(false);
        assert_eq!(buf.len(), 414);
        assert!(buf[..400].iter().all(|&b| b == 0x00));
        assert_eq!(&buf[400..402], &[0x1B, 0x40]);
        assert_eq!(&buf[402..405], &[0x1B, 0x69, 0x53]);
        assert_eq!(&buf[405..409], &[0x1B, 0x69, 0x4D, 0x00]);
        assert_eq!(&buf[409..414], &[0x1B, 0x69, 0x64, 0x14, 0x00]);
    }

    #[test]
    fn all_black_column_on_6mm_tape() {
        let image = solid(2, 32, BLACK);
        let stream = assemble(&image, TapeType::Tape6, true, false).unwrap();

        let mut expected_record = vec![0x47, 0x0F];
        expected_record.extend_from_slice(&[0x00; 7]);
        expected_record.extend_from_slice(&[0xFF; 4]);
        expected_record.extend_from_slice(&[0x00; 5]);

        let body = &stream[414..];
        assert_eq!(&body[..18], &expected_record[..]);
        assert_eq!(&body[18..36], &expected_record[..]);
        assert_eq!(&body[36..], &[0x5A, 0x1A]);
    }

    #[test]
    fn stream_length_is_preamble_plus_columns_plus_terminator() {
        for &(tape, height) in &[
            (TapeType::Tape6, 32),
            (TapeType::Tape9, 48),
            (TapeType::Tape12, 80),
            (TapeType::Tape18, 112),
            (TapeType::Tape24, 128),
        ] {
            let width = 37;
            let image = solid(width, height, WHITE);
            let stream = assemble(&image, tape, true, false).unwrap();
            assert_eq!(stream.len(), 414 + width as usize * (2 + 16) + 2);
        }
    }

    #[test]
    fn threshold_compares_red_channel_strictly() {
        // One column, 32 px: red values 0 and 149 ink, 150 and 255 do not.
        let image = RgbImage::from_fn(1, 32, |_, y| match y {
            0 => Rgb([0, 255, 255]),
            1 => Rgb([149, 0, 0]),
            2 => Rgb([150, 0, 0]),
            _ => Rgb([255, 0, 0]),
        });
        let profile = TapeType::Tape6.profile(32).unwrap();
        let record = encode_column(&image, 0, &profile, false).unwrap();

        // 7 lead bytes after the 2 byte header, then 4 image bytes.
        assert_eq!(&record[9..13], &[0b1100_0000, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn topmost_pixel_lands_in_the_msb() {
        let image = RgbImage::from_fn(1, 32, |_, y| if y == 8 { BLACK } else { WHITE });
        let profile = TapeType::Tape6.profile(32).unwrap();
        let record = encode_column(&image, 0, &profile, false).unwrap();
        assert_eq!(&record[9..13], &[0x00, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn columns_are_emitted_left_to_right() {
        // Left column black, right column white.
        let image = RgbImage::from_fn(2, 32, |x, _| if x == 0 { BLACK } else { WHITE });
        let stream = assemble(&image, TapeType::Tape6, true, false).unwrap();
        let body = &stream[414..];
        assert_eq!(&body[9..13], &[0xFF; 4]);
        assert_eq!(&body[27..31], &[0x00; 4]);
    }

    #[test]
    fn inverse_flips_padding_not_image() {
        // Long-standing quirk kept for stream compatibility: inverse only
        // affects the fill bytes, the thresholded image bits are
        // unchanged.
        let image = solid(1, 32, WHITE);
        let profile = TapeType::Tape6.profile(32).unwrap();
        let record = encode_column(&image, 0, &profile, true).unwrap();

        let mut expected = vec![0x47, 0x0F];
        expected.extend_from_slice(&[0xFF; 7]);
        expected.extend_from_slice(&[0x00; 4]);
        expected.extend_from_slice(&[0xFF; 5]);
        assert_eq!(record, expected);
    }

    #[test]
    fn validation_failures_emit_no_bytes() {
        let image = solid(4, 64, BLACK);
        match assemble(&image, TapeType::Tape24, true, false) {
            Err(Error::UnsupportedDimension { tape, height }) => {
                assert_eq!(tape, TapeType::Tape24);
                assert_eq!(height, 64);
            }
            other => panic!("expected UnsupportedDimension, got {:?}", other),
        }
    }

    #[test]
    fn calibration_stream_uses_its_own_frame_length() {
        let image = solid(3, 40, BLACK);
        let stream = assemble(&image, TapeType::Calibration, true, false).unwrap();

        let body = &stream[414..];
        // 'G', length byte height/8 + 4, 5 lead bytes, 5 image bytes.
        assert_eq!(body[0], 0x47);
        assert_eq!(body[1], 40 / 8 + 4);
        assert_eq!(&body[2..7], &[0x00; 5]);
        assert_eq!(&body[7..12], &[0xFF; 5]);
        assert_eq!(stream.len(), 414 + 3 * (2 + 10) + 2);

        // Heights with a partial byte never start a stream.
        let ragged = solid(3, 30, BLACK);
        assert!(assemble(&ragged, TapeType::Calibration, true, false).is_err());
    }
}
