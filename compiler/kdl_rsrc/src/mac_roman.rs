//! Mac OS Roman text encoding.
//!
//! ASCII is passed through. The upper half is mapped for the characters that
//! appear in resource names and type codes; anything else becomes `?`.

const UPPER_HALF: [char; 43] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á', 'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è', //
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó', 'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü', //
    '†', '°', '¢', '£', '§', '•', '¶', 'ß', '®', '©', '™',
];

/// Encode one character.
pub fn encode_char(c: char) -> u8 {
    if c.is_ascii() {
        return u8::try_from(c).unwrap_or(b'?');
    }
    UPPER_HALF
        .iter()
        .position(|&m| m == c)
        .and_then(|i| u8::try_from(0x80 + i).ok())
        .unwrap_or(b'?')
}

/// Decode one byte.
pub fn decode_byte(b: u8) -> char {
    if b.is_ascii() {
        return char::from(b);
    }
    UPPER_HALF
        .get(usize::from(b - 0x80))
        .copied()
        .unwrap_or('?')
}

pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().copied().map(decode_byte).collect()
}
