//! Text support for the base-14 Helvetica font: WinAnsi encoding and advance widths.
//!
//! The report only ever draws two strings per page (title and page label), so
//! instead of embedding a font we use the standard Helvetica that every PDF
//! viewer ships, encoded as WinAnsi. Widths come from the Helvetica AFM and are
//! in 1/1000 em.

/// Encode `text` as WinAnsi bytes. Characters outside the encoding become `?`.
pub fn to_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
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
            _ => b'?',
        })
        .collect()
}

/// Helvetica advance widths for 0x20..=0x7E.
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica advance widths for 0xA0..=0xFF (Latin-1 letters and symbols).
const LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

fn glyph_width(byte: u8) -> u16 {
    match byte {
        0x20..=0x7e => ASCII_WIDTHS[(byte - 0x20) as usize],
        0xa0..=0xff => LATIN1_WIDTHS[(byte - 0xa0) as usize],
        0x82 | 0x91 | 0x92 => 222,
        0x84 | 0x88 | 0x8b | 0x93 | 0x94 | 0x98 | 0x9b => 333,
        0x95 => 350,
        0x9a | 0x9e => 500,
        0x8e => 611,
        0x8a | 0x9f => 667,
        0x9c => 944,
        0x85 | 0x89 | 0x8c | 0x97 | 0x99 => 1000,
        // Euro, florin, daggers, en dash, and unmapped bytes.
        _ => 556,
    }
}

/// Width of WinAnsi-encoded text in points at `font_size`.
pub fn text_width(encoded: &[u8], font_size: f64) -> f64 {
    let units: u32 = encoded.iter().map(|&b| u32::from(glyph_width(b))).sum();
    f64::from(units) * font_size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        assert_eq!(to_winansi("Page 1 of 3"), b"Page 1 of 3".to_vec());
    }

    #[test]
    fn latin1_accents_map_to_single_bytes() {
        assert_eq!(to_winansi("FOTOGRÁFICO"), b"FOTOGR\xc1FICO".to_vec());
        assert_eq!(to_winansi("Página"), b"P\xe1gina".to_vec());
    }

    #[test]
    fn unsupported_characters_become_question_marks() {
        assert_eq!(to_winansi("写真"), b"??".to_vec());
    }

    #[test]
    fn width_table_covers_printable_ascii() {
        assert_eq!(ASCII_WIDTHS.len(), ('~' as usize) - (' ' as usize) + 1);
        assert_eq!(glyph_width(b'A'), 667);
        assert_eq!(glyph_width(b'i'), 222);
        assert_eq!(glyph_width(b'~'), 584);
    }

    #[test]
    fn text_width_scales_with_font_size() {
        // "AA" = 2 * 667 units
        assert!((text_width(b"AA", 10.0) - 13.34).abs() < 1e-9);
        assert!((text_width(b"AA", 20.0) - 26.68).abs() < 1e-9);
    }

    #[test]
    fn latin1_symbols_use_their_own_widths() {
        assert_eq!(glyph_width(0xbf), 611); // ¿
        assert_eq!(glyph_width(0xa1), 333); // ¡
        assert_eq!(glyph_width(0xb0), 400); // °
        assert_eq!(glyph_width(0xdf), 611); // ß
        assert_eq!(glyph_width(0xe6), 889); // æ
        assert_eq!(LATIN1_WIDTHS.len(), 0x100 - 0xa0);
    }

    #[test]
    fn spanish_question_is_measured_exactly() {
        // ¿ (611) + "Si" (667 + 222) + ? (556)
        let encoded = to_winansi("¿Si?");
        assert!((text_width(&encoded, 1.0) - 2.056).abs() < 1e-9);
    }

    #[test]
    fn winansi_punctuation_widths() {
        assert_eq!(glyph_width(0x80), 556); // €
        assert_eq!(glyph_width(0x95), 350); // •
        assert_eq!(glyph_width(0x96), 556); // –
        assert_eq!(glyph_width(0x97), 1000); // —
    }

    #[test]
    fn accented_letters_use_base_width() {
        assert_eq!(glyph_width(0xc1), glyph_width(b'A'));
        assert_eq!(glyph_width(0xe1), glyph_width(b'a'));
    }
}
