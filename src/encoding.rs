//! Character-set transcoding
//!
//! The pipeline works on UTF-8 internally; this module converts the legacy
//! DOS/ISO encodings the ANSI-art corpus is stored in. Bytes below 0x80 map
//! identically for the code pages; the high halves go through fixed tables.
//! A UTF-8 BOM is stripped on decode. Encoding back substitutes `?` for
//! scalars the target cannot represent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input/output encodings understood by the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    Utf8,
    Cp437,
    Cp850,
    Iso8859_1,
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("unsupported encoding: {0}")]
    Unsupported(String),
}

impl Encoding {
    /// Parse a CLI encoding name.
    pub fn from_name(name: &str) -> Result<Self, EncodingError> {
        match name {
            "utf8" => Ok(Encoding::Utf8),
            "cp437" => Ok(Encoding::Cp437),
            "cp850" => Ok(Encoding::Cp850),
            "iso-8859-1" => Ok(Encoding::Iso8859_1),
            other => Err(EncodingError::Unsupported(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Cp437 => "cp437",
            Encoding::Cp850 => "cp850",
            Encoding::Iso8859_1 => "iso-8859-1",
        }
    }

}

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&UTF8_BOM).unwrap_or(data)
}

/// Decode `data` from `source` into a UTF-8 string.
pub fn to_utf8(data: &[u8], source: Encoding) -> String {
    match source {
        Encoding::Utf8 => String::from_utf8_lossy(strip_bom(data)).into_owned(),
        Encoding::Iso8859_1 => data.iter().map(|&b| b as char).collect(),
        Encoding::Cp437 => decode_codepage(data, &CP437_HIGH),
        Encoding::Cp850 => decode_codepage(data, &CP850_HIGH),
    }
}

/// Encode a UTF-8 string into `target` bytes. Unmappable scalars become `?`.
pub fn from_utf8(text: &str, target: Encoding) -> Vec<u8> {
    match target {
        Encoding::Utf8 => text.as_bytes().to_vec(),
        Encoding::Iso8859_1 => text
            .chars()
            .map(|c| if (c as u32) < 0x100 { c as u8 } else { b'?' })
            .collect(),
        Encoding::Cp437 => encode_codepage(text, &CP437_HIGH),
        Encoding::Cp850 => encode_codepage(text, &CP850_HIGH),
    }
}

fn decode_codepage(data: &[u8], table: &[char; 128]) -> String {
    data.iter()
        .map(|&b| {
            if b < 0x80 {
                b as char
            } else {
                table[(b - 0x80) as usize]
            }
        })
        .collect()
}

fn encode_codepage(text: &str, table: &[char; 128]) -> Vec<u8> {
    text.chars()
        .map(|c| {
            if (c as u32) < 0x80 {
                c as u8
            } else {
                match table.iter().position(|&t| t == c) {
                    Some(i) => 0x80 + i as u8,
                    None => b'?',
                }
            }
        })
        .collect()
}

/// Code page 437 (IBM PC), bytes 0x80-0xFF
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{A0}',
];

/// Code page 850 (DOS Latin-1), bytes 0x80-0xFF
const CP850_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', 'ø', '£', 'Ø', '×', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '®', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', 'Á', 'Â', 'À', '©', '╣', '║', '╗', '╝', '¢', '¥', '┐', //
    '└', '┴', '┬', '├', '─', '┼', 'ã', 'Ã', '╚', '╔', '╩', '╦', '╠', '═', '╬', '¤', //
    'ð', 'Ð', 'Ê', 'Ë', 'È', 'ı', 'Í', 'Î', 'Ï', '┘', '┌', '█', '▄', '¦', 'Ì', '▀', //
    'Ó', 'ß', 'Ô', 'Ò', 'õ', 'Õ', 'µ', 'þ', 'Þ', 'Ú', 'Û', 'Ù', 'ý', 'Ý', '¯', '´', //
    '\u{AD}', '±', '‗', '¾', '¶', '§', '÷', '¸', '°', '¨', '·', '¹', '³', '²', '■', '\u{A0}',
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Encoding::from_name("cp437").unwrap(), Encoding::Cp437);
        assert_eq!(Encoding::from_name("utf8").unwrap(), Encoding::Utf8);
        assert!(Encoding::from_name("latin9").is_err());
    }

    #[test]
    fn test_cp437_blocks() {
        // The shade and block characters ANSI art is made of
        assert_eq!(to_utf8(&[0xB0, 0xB1, 0xB2, 0xDB], Encoding::Cp437), "░▒▓█");
    }

    #[test]
    fn test_cp437_roundtrip() {
        let bytes: Vec<u8> = (0x20..=0xFF).collect();
        let text = to_utf8(&bytes, Encoding::Cp437);
        assert_eq!(from_utf8(&text, Encoding::Cp437), bytes);
    }

    #[test]
    fn test_cp850_roundtrip() {
        let bytes: Vec<u8> = (0x20..=0xFF).collect();
        let text = to_utf8(&bytes, Encoding::Cp850);
        assert_eq!(from_utf8(&text, Encoding::Cp850), bytes);
    }

    #[test]
    fn test_iso8859_1() {
        assert_eq!(to_utf8(&[0xE9, 0xE8], Encoding::Iso8859_1), "éè");
        assert_eq!(from_utf8("éè", Encoding::Iso8859_1), vec![0xE9, 0xE8]);
    }

    #[test]
    fn test_controls_pass_through() {
        let input = b"\x1b[31m\r\n";
        assert_eq!(to_utf8(input, Encoding::Cp437).as_bytes(), input);
    }

    #[test]
    fn test_bom_stripped() {
        assert_eq!(to_utf8(b"\xEF\xBB\xBFhey", Encoding::Utf8), "hey");
    }

    #[test]
    fn test_unmappable_substituted() {
        assert_eq!(from_utf8("a→b", Encoding::Cp437), b"a?b");
    }
}
