//! Decoding of legacy (IBM code page 437) entry names.

/// Trait to convert raw bytes in code page 437 to a `String`.
pub trait FromCp437 {
    fn from_cp437(self) -> String;
}

impl FromCp437 for &[u8] {
    fn from_cp437(self) -> String {
        if self.is_ascii() {
            return String::from_utf8_lossy(self).into_owned();
        }
        self.iter().map(|&b| to_char(b)).collect()
    }
}

fn to_char(byte: u8) -> char {
    if byte < 0x80 {
        byte as char
    } else {
        HIGH_HALF[(byte - 0x80) as usize]
    }
}

#[rustfmt::skip]
const HIGH_HALF: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        assert_eq!(b"wallpapers/Rate.png".as_slice().from_cp437(), "wallpapers/Rate.png");
    }

    #[test]
    fn high_half_maps_to_unicode() {
        assert_eq!(b"\x80\x81\xe1\xff".as_slice().from_cp437(), "Çüß\u{a0}");
    }
}
