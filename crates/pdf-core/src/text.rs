//! Text rendering utilities

use crate::document::Color;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "SigF1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Hex-encode bytes as a PDF string operand, e.g. `<4A616E65>`
pub fn to_hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 2);
    out.push('<');
    for byte in bytes {
        out.push_str(&format!("{byte:02X}"));
    }
    out.push('>');
    out
}

/// Generate PDF operators for a single text run
///
/// Creates the PDF text operators (BT, rg, Tf, Td, Tj, ET) that show
/// `text_hex` with its baseline starting at `(x, y)`.
///
/// # Arguments
/// * `text_hex` - Hex-encoded text (e.g., "<4A616E65>")
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Baseline Y coordinate in points (PDF coordinates, from bottom)
/// * `ctx` - Text rendering context
pub fn generate_text_operators(text_hex: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let mut ops = String::new();

    ops.push_str("BT\n");

    // Non-stroking color
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));

    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{x} {y} Td\n"));
    ops.push_str(&format!("{text_hex} Tj\n"));

    ops.push_str("ET\n");

    ops.into_bytes()
}
