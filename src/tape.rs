use std::fmt;
use std::str::FromStr;

use crate::{error::Error, FRAME_DATA_BYTES};

/// Tape cartridges accepted by the PT series.
///
/// The plain values are the TZ tape widths in millimeters; the `Plus`
/// variants are the high-grade cartridges of the same width, which share
/// the head geometry of their plain counterpart. `Calibration` is a
/// reserved value used to print head alignment patterns, not labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeType {
    Tape6,
    Tape9,
    Tape9Plus,
    Tape12,
    Tape12Plus,
    Tape18,
    Tape18Plus,
    Tape24,
    Calibration,
}

impl FromStr for TapeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "6" => Ok(Self::Tape6),
            "9" => Ok(Self::Tape9),
            "9+" => Ok(Self::Tape9Plus),
            "12" => Ok(Self::Tape12),
            "12+" => Ok(Self::Tape12Plus),
            "18" => Ok(Self::Tape18),
            "18+" => Ok(Self::Tape18Plus),
            "24" => Ok(Self::Tape24),
            "test" => Ok(Self::Calibration),
            _ => Err(Error::UnknownTapeType(s.to_string())),
        }
    }
}

impl fmt::Display for TapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Tape6 => "6",
            Self::Tape9 => "9",
            Self::Tape9Plus => "9+",
            Self::Tape12 => "12",
            Self::Tape12Plus => "12+",
            Self::Tape18 => "18",
            Self::Tape18Plus => "18+",
            Self::Tape24 => "24",
            Self::Calibration => "test",
        };
        write!(f, "{}", s)
    }
}

impl TapeType {
    /// Cartridge width in millimeters as reported by the printer status
    /// block. `None` for calibration, which prints on whatever is loaded.
    pub fn width_mm(self) -> Option<u8> {
        match self {
            Self::Tape6 => Some(6),
            Self::Tape9 | Self::Tape9Plus => Some(9),
            Self::Tape12 | Self::Tape12Plus => Some(12),
            Self::Tape18 | Self::Tape18Plus => Some(18),
            Self::Tape24 => Some(24),
            Self::Calibration => None,
        }
    }

    /// Resolve the frame layout for an image of the given height.
    ///
    /// Every tape width exposes a fixed sub-range of the 128 dot head, so
    /// only the listed heights are printable; the leading padding centers
    /// the printable dots on the physical tape. Calibration bypasses the
    /// table and accepts any height with a fixed 5 byte lead-in.
    pub fn profile(self, height: u32) -> Result<TapeProfile, Error> {
        if self == Self::Calibration {
            if height == 0 {
                return Err(Error::UnsupportedDimension { tape: self, height });
            }
            return Ok(TapeProfile {
                tape: self,
                height,
                leading: 5,
                image_bytes: (height / 8) as usize,
                trailing: 0,
            });
        }

        let leading = match (self, height) {
            (Self::Tape6, 32) => 7,
            (Self::Tape9, 48) | (Self::Tape9Plus, 48) => 6,
            (Self::Tape9, 56) | (Self::Tape9Plus, 56) => 6,
            (Self::Tape12, 64) | (Self::Tape12Plus, 64) => 5,
            (Self::Tape12, 80) | (Self::Tape12Plus, 80) => 4,
            (Self::Tape18, 96) | (Self::Tape18Plus, 96) => 3,
            (Self::Tape18, 112) | (Self::Tape18Plus, 112) => 2,
            (Self::Tape24, 128) => 1,
            _ => return Err(Error::UnsupportedDimension { tape: self, height }),
        };

        let image_bytes = (height / 8) as usize;
        Ok(TapeProfile {
            tape: self,
            height,
            leading,
            image_bytes,
            trailing: FRAME_DATA_BYTES - leading - image_bytes,
        })
    }
}

/// Frame layout for one (tape, height) combination.
///
/// Invariant for every table entry: `leading + image_bytes + trailing`
/// equals [`FRAME_DATA_BYTES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapeProfile {
    pub tape: TapeType,
    pub height: u32,
    pub leading: usize,
    pub image_bytes: usize,
    pub trailing: usize,
}

impl TapeProfile {
    /// Data bytes in one record, header excluded.
    pub fn frame_len(&self) -> usize {
        self.leading + self.image_bytes + self.trailing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [(TapeType, u32, usize); 14] = [
        (TapeType::Tape6, 32, 7),
        (TapeType::Tape9, 48, 6),
        (TapeType::Tape9Plus, 48, 6),
        (TapeType::Tape9, 56, 6),
        (TapeType::Tape9Plus, 56, 6),
        (TapeType::Tape12, 64, 5),
        (TapeType::Tape12Plus, 64, 5),
        (TapeType::Tape12, 80, 4),
        (TapeType::Tape12Plus, 80, 4),
        (TapeType::Tape18, 96, 3),
        (TapeType::Tape18Plus, 96, 3),
        (TapeType::Tape18, 112, 2),
        (TapeType::Tape18Plus, 112, 2),
        (TapeType::Tape24, 128, 1),
    ];

    #[test]
    fn padding_fills_the_frame_for_every_entry() {
        for &(tape, height, leading) in TABLE.iter() {
            let profile = tape.profile(height).unwrap();
            assert_eq!(profile.leading, leading, "{} @ {}", tape, height);
            assert_eq!(profile.image_bytes, (height / 8) as usize);
            assert_eq!(profile.frame_len(), FRAME_DATA_BYTES, "{} @ {}", tape, height);
        }
    }

    #[test]
    fn unknown_tape_string_is_rejected() {
        match "15".parse::<TapeType>() {
            Err(Error::UnknownTapeType(s)) => assert_eq!(s, "15"),
            other => panic!("expected UnknownTapeType, got {:?}", other),
        }
    }

    #[test]
    fn tape_strings_round_trip() {
        for s in &["6", "9", "9+", "12", "12+", "18", "18+", "24", "test"] {
            let tape: TapeType = s.parse().unwrap();
            assert_eq!(&tape.to_string(), s);
        }
    }

    #[test]
    fn mismatched_height_is_rejected() {
        match TapeType::Tape24.profile(64) {
            Err(Error::UnsupportedDimension { tape, height }) => {
                assert_eq!(tape, TapeType::Tape24);
                assert_eq!(height, 64);
            }
            other => panic!("expected UnsupportedDimension, got {:?}", other),
        }
        assert!(TapeType::Tape6.profile(48).is_err());
        assert!(TapeType::Tape9.profile(128).is_err());
    }

    #[test]
    fn calibration_accepts_heights_outside_the_table() {
        let profile = TapeType::Calibration.profile(40).unwrap();
        assert_eq!(profile.leading, 5);
        assert_eq!(profile.image_bytes, 5);
        assert_eq!(profile.trailing, 0);
        // Length byte convention: frame_len - 1 == height/8 + 4.
        assert_eq!(profile.frame_len() - 1, (40 / 8) + 4);

        assert!(TapeType::Calibration.profile(0).is_err());
    }
}
