//! Session configuration
//!
//! Hosts either pass a JSON or JS object (every field optional) or build the
//! config from URL query pairs (`doc`, `email_dest`).

use pdf_core::StandardFont;
use serde::{Deserialize, Serialize};

/// Standard font used for typed signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextFont {
    #[default]
    TimesItalic,
    TimesRoman,
    TimesBoldItalic,
    HelveticaOblique,
    CourierOblique,
}

impl From<TextFont> for StandardFont {
    fn from(font: TextFont) -> Self {
        match font {
            TextFont::TimesItalic => StandardFont::TimesItalic,
            TextFont::TimesRoman => StandardFont::TimesRoman,
            TextFont::TimesBoldItalic => StandardFont::TimesBoldItalic,
            TextFont::HelveticaOblique => StandardFont::HelveticaOblique,
            TextFont::CourierOblique => StandardFont::CourierOblique,
        }
    }
}

/// Offset of the text baseline from the placement box's bottom-left corner, in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextOffset {
    pub dx: f64,
    pub dy: f64,
}

impl Default for TextOffset {
    fn default() -> Self {
        Self { dx: 5.0, dy: 15.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Identifier used in the output filename
    pub document_id: String,
    /// Who should hear about the signed document
    pub notify_email: Option<String>,
    pub text_font: TextFont,
    /// Text size in preview pixels; divided by the scale when embedded
    pub text_size: f64,
    pub text_offset: TextOffset,
    /// Text embedded when the typed signature is empty
    pub fallback_text: String,
    /// Initial placement box width in pixels
    pub placement_width: f64,
    /// Initial placement box height in pixels
    pub placement_height: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            document_id: "000".to_string(),
            notify_email: None,
            text_font: TextFont::default(),
            text_size: 20.0,
            text_offset: TextOffset::default(),
            fallback_text: "Assinado".to_string(),
            placement_width: 150.0,
            placement_height: 50.0,
        }
    }
}

impl SessionConfig {
    /// Build a config from decoded URL query pairs
    ///
    /// Recognizes `doc` and `email_dest`; empty values keep the defaults and
    /// unknown keys are ignored.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "doc" => config.document_id = value.to_string(),
                "email_dest" => config.notify_email = Some(value.to_string()),
                _ => {}
            }
        }
        config
    }

    /// Download filename for the signed document
    pub fn filename(&self) -> String {
        let id: String = self
            .document_id
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        format!("OS_{id}_Assinada.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.document_id, "000");
        assert_eq!(config.filename(), "OS_000_Assinada.pdf");
        assert_eq!(config.text_offset, TextOffset { dx: 5.0, dy: 15.0 });
        assert_eq!(StandardFont::from(config.text_font), StandardFont::TimesItalic);
    }

    #[test]
    fn test_from_query_pairs() {
        let config = SessionConfig::from_query_pairs([
            ("doc", "4711"),
            ("email_dest", "office@example.com"),
            ("utm_source", "mail"),
        ]);
        assert_eq!(config.filename(), "OS_4711_Assinada.pdf");
        assert_eq!(config.notify_email.as_deref(), Some("office@example.com"));
    }

    #[test]
    fn test_empty_query_values_keep_defaults() {
        let config = SessionConfig::from_query_pairs([("doc", ""), ("email_dest", "  ")]);
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_filename_strips_path_separators() {
        let config = SessionConfig::from_query_pairs([("doc", "../a/b")]);
        assert_eq!(config.filename(), "OS_.._a_b_Assinada.pdf");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"documentId":"12","textFont":"courier-oblique"}"#).unwrap();
        assert_eq!(config.document_id, "12");
        assert_eq!(config.text_font, TextFont::CourierOblique);
        assert_eq!(config.fallback_text, "Assinado");
        assert_eq!(config.placement_width, 150.0);
    }
}
