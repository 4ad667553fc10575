//! Standard (base-14) PDF fonts
//!
//! Standard fonts are referenced by name and never embedded as font programs,
//! so every conforming viewer can render them. Text drawn with them must be
//! encoded with `WinAnsiEncoding`.

use crate::{PdfError, Result};
use lopdf::{Dictionary, Object};

/// The Latin standard fonts every PDF viewer ships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StandardFont {
    TimesRoman,
    TimesBold,
    #[default]
    TimesItalic,
    TimesBoldItalic,
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// PostScript name used as the `BaseFont` entry
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Build the font dictionary for this font
    pub fn to_pdf_dict(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Font".to_vec()));
        dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        dict.set(
            "BaseFont",
            Object::Name(self.base_font().as_bytes().to_vec()),
        );
        dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        dict
    }
}

/// Code points 0x80..=0x9F of WinAnsiEncoding that differ from Latin-1
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Encode text as WinAnsiEncoding bytes
///
/// Fails on the first character the encoding cannot represent, naming the
/// font so the caller can report which text run was rejected.
pub fn encode_win_ansi(text: &str, font: StandardFont) -> Result<Vec<u8>> {
    text.chars()
        .map(|ch| {
            let code = ch as u32;
            match code {
                0x20..=0x7E | 0xA0..=0xFF => Ok(code as u8),
                _ => WIN_ANSI_HIGH
                    .iter()
                    .find(|(c, _)| *c == ch)
                    .map(|(_, byte)| *byte)
                    .ok_or(PdfError::EncodingError {
                        font: font.base_font(),
                        ch,
                    }),
            }
        })
        .collect()
}
