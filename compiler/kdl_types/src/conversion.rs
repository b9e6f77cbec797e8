//! The asset conversion matrix.
//!
//! Conversions are direction-sensitive: an encoder that can read a format
//! is not necessarily able to produce it.

use std::fmt;

use kdl_diagnostic::{CompileError, CompileResult};
use kdl_ir::Lexeme;

/// A source or destination asset format.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssetFormat {
    Pict,
    Tga,
    Png,
    Cicn,
    Ppat,
    RleD,
    RleX,
    Wav,
    Snd,
    Mp3,
}

impl AssetFormat {
    /// Look up a format by its short name or long alias.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "PICT" | "MacintoshPicture" => AssetFormat::Pict,
            "TGA" => AssetFormat::Tga,
            "PNG" => AssetFormat::Png,
            "cicn" | "ColorIcon" => AssetFormat::Cicn,
            "ppat" | "PixelPattern" => AssetFormat::Ppat,
            "rleD" => AssetFormat::RleD,
            "rleX" => AssetFormat::RleX,
            "WAV" | "WaveAudio" => AssetFormat::Wav,
            "snd" | "MacintoshSound" => AssetFormat::Snd,
            "MP3" => AssetFormat::Mp3,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            AssetFormat::Pict => "PICT",
            AssetFormat::Tga => "TGA",
            AssetFormat::Png => "PNG",
            AssetFormat::Cicn => "cicn",
            AssetFormat::Ppat => "ppat",
            AssetFormat::RleD => "rleD",
            AssetFormat::RleX => "rleX",
            AssetFormat::Wav => "WAV",
            AssetFormat::Snd => "snd",
            AssetFormat::Mp3 => "MP3",
        }
    }

    /// Whether assets in this format can be converted into `output`.
    pub fn converts_to(self, output: AssetFormat) -> bool {
        use AssetFormat::{Cicn, Mp3, Pict, Png, Ppat, RleD, RleX, Snd, Tga, Wav};
        let targets: &[AssetFormat] = match self {
            Pict => &[Tga, Png, Cicn, Ppat, RleD, RleX],
            Tga => &[Pict, Png, Cicn, Ppat, RleX],
            Png => &[Pict, Tga, Cicn, Ppat, RleX],
            Cicn => &[Tga, Png, Pict, Ppat, RleD, RleX],
            Ppat => &[Tga, Png, Pict, Cicn, RleD, RleX],
            RleD | RleX => &[Png, Tga],
            Wav => &[Snd, Mp3],
            Snd => &[Wav, Mp3],
            Mp3 => &[Wav, Snd],
        };
        targets.contains(&output)
    }
}

impl fmt::Display for AssetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated source to destination conversion.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Conversion {
    pub input: AssetFormat,
    pub output: AssetFormat,
}

impl Conversion {
    /// Validate a conversion written as a pair of format names.
    pub fn new(input: &Lexeme, output: &Lexeme) -> CompileResult<Self> {
        let source = AssetFormat::from_name(&input.text).ok_or_else(|| {
            CompileError::conversion(format!(
                "Unknown conversion source format encountered '{}'",
                input.text
            ))
            .located(&input.location)
        })?;
        let destination = AssetFormat::from_name(&output.text).ok_or_else(|| {
            CompileError::conversion(format!(
                "Unknown conversion destination format encountered '{}'",
                output.text
            ))
            .located(&output.location)
        })?;
        if !source.converts_to(destination) {
            return Err(CompileError::conversion(format!(
                "Incompatible conversion source and destination formats encountered. '{}' -> '{}'.",
                input.text, output.text
            ))
            .located(&input.location));
        }
        Ok(Conversion {
            input: source,
            output: destination,
        })
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.input, self.output)
    }
}
