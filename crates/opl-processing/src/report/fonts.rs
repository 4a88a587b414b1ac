//! Standard 14 font metrics for the two faces the report uses.
//!
//! Widths are in 1/1000 em for the printable ASCII range (32..=126) and come
//! from the Adobe core font AFM files (WinAnsi encoding).

/// Resource name and metrics of a core font used by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

/// Width used for encoded bytes outside the ASCII table.
const FALLBACK_WIDTH: u16 = 556;

impl Font {
    pub const ALL: [Font; 2] = [Font::Regular, Font::Bold];

    /// Name of the font in the page resource dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }

    fn glyph_width(self, byte: u8) -> u16 {
        let table = match self {
            Font::Regular => &HELVETICA,
            Font::Bold => &HELVETICA_BOLD,
        };
        match byte {
            32..=126 => table[(byte - 32) as usize],
            _ => FALLBACK_WIDTH,
        }
    }

    /// Width in points of WinAnsi-encoded text at `size` points.
    pub fn text_width(self, encoded: &[u8], size: f32) -> f32 {
        let units: u32 = encoded.iter().map(|b| self.glyph_width(*b) as u32).sum();
        units as f32 * size / 1000.0
    }
}

/// Encode text as WinAnsi (cp1252) bytes. Characters the encoding cannot
/// represent become `?`; tabs become spaces.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| *c != '\r')
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_tables_cover_printable_ascii() {
        assert_eq!(HELVETICA.len(), ('~' as usize) - (' ' as usize) + 1);
        assert_eq!(HELVETICA_BOLD.len(), HELVETICA.len());
    }

    #[test]
    fn bold_text_is_wider() {
        let encoded = encode_win_ansi("Remedial Action");
        assert!(Font::Bold.text_width(&encoded, 12.0) > Font::Regular.text_width(&encoded, 12.0));
    }

    #[test]
    fn text_width_scales_with_size() {
        let encoded = encode_win_ansi("0000");
        assert!((Font::Regular.text_width(&encoded, 10.0) - 22.24).abs() < 0.001);
        assert!((Font::Regular.text_width(&encoded, 20.0) - 44.48).abs() < 0.001);
    }

    #[test]
    fn encodes_latin1_and_replaces_unknown() {
        assert_eq!(encode_win_ansi("Café"), vec![b'C', b'a', b'f', 0xe9]);
        assert_eq!(encode_win_ansi("a\tb"), b"a b".to_vec());
        assert_eq!(encode_win_ansi("温度"), b"??".to_vec());
        assert_eq!(encode_win_ansi("line\r"), b"line".to_vec());
    }
}
