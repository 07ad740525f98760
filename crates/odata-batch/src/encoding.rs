//! Text encodings of a batch payload.
//!
//! Delimiters and header lines are located byte-wise, which is only sound for
//! encodings where `\r`, `\n` and `-` are single bytes that never occur
//! inside another character: UTF-8 and the single-byte encodings. Multi-byte
//! encodings are recognised so they can be rejected with a dedicated error.

use bstr::ByteSlice;

use crate::error::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BatchEncoding {
    #[default]
    Utf8,
    Ascii,
    /// ISO-8859-1; also used for windows-1252 header text.
    Latin1,
    Utf16,
    Utf32,
}

impl BatchEncoding {
    /// Maps a `charset` parameter value to an encoding.
    pub fn from_charset(charset: &str) -> Result<Self, FormatError> {
        let name = charset.trim().to_ascii_lowercase();
        Ok(match name.as_str() {
            "utf-8" | "utf8" => BatchEncoding::Utf8,
            "us-ascii" | "ascii" => BatchEncoding::Ascii,
            "iso-8859-1" | "latin1" | "latin-1" | "windows-1252" | "cp1252" => {
                BatchEncoding::Latin1
            }
            "utf-16" | "utf-16le" | "utf-16be" | "unicode" | "unicodefffe" => BatchEncoding::Utf16,
            "utf-32" | "utf-32le" | "utf-32be" => BatchEncoding::Utf32,
            _ => return Err(FormatError::UnsupportedCharset(charset.to_string())),
        })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BatchEncoding::Utf8 => "utf-8",
            BatchEncoding::Ascii => "us-ascii",
            BatchEncoding::Latin1 => "iso-8859-1",
            BatchEncoding::Utf16 => "utf-16",
            BatchEncoding::Utf32 => "utf-32",
        }
    }

    #[must_use]
    pub fn is_multi_byte(self) -> bool {
        matches!(self, BatchEncoding::Utf16 | BatchEncoding::Utf32)
    }

    /// Fails for encodings the byte scanners cannot handle.
    pub fn ensure_scannable(self) -> Result<(), FormatError> {
        if self.is_multi_byte() {
            return Err(FormatError::MultiByteEncodingNotSupported(
                self.name().to_string(),
            ));
        }
        Ok(())
    }

    /// Decodes one header or message line.
    pub fn decode(self, bytes: &[u8]) -> Result<String, FormatError> {
        match self {
            BatchEncoding::Utf8 => bytes
                .to_str()
                .map(str::to_string)
                .map_err(|_| FormatError::InvalidText(self.name())),
            BatchEncoding::Ascii if !bytes.is_ascii() => Err(FormatError::InvalidText(self.name())),
            BatchEncoding::Ascii | BatchEncoding::Latin1 => {
                Ok(bytes.iter().map(|&b| char::from(b)).collect())
            }
            BatchEncoding::Utf16 | BatchEncoding::Utf32 => Err(
                FormatError::MultiByteEncodingNotSupported(self.name().to_string()),
            ),
        }
    }
}

/// A byte-order mark at the start of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteOrderMark {
    pub encoding: BatchEncoding,
    pub len: usize,
}

/// Sniffs a byte-order mark. `None` when there is none or too few bytes to
/// tell.
#[must_use]
pub fn detect_bom(bytes: &[u8]) -> Option<ByteOrderMark> {
    let (encoding, len) = match bytes {
        [0xEF, 0xBB, 0xBF, ..] => (BatchEncoding::Utf8, 3),
        [0xFF, 0xFE, 0x00, 0x00, ..] | [0x00, 0x00, 0xFE, 0xFF, ..] => (BatchEncoding::Utf32, 4),
        [0xFF, 0xFE, ..] | [0xFE, 0xFF, ..] => (BatchEncoding::Utf16, 2),
        _ => return None,
    };
    Some(ByteOrderMark { encoding, len })
}
