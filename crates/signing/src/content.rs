use serde::{Deserialize, Serialize};

/// How the user provides their signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureMode {
    /// Typed text drawn in a script-like standard font
    #[default]
    Type,
    /// Freehand drawing embedded as a PNG raster
    Draw,
}

impl std::str::FromStr for SignatureMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "type" => Ok(SignatureMode::Type),
            "draw" => Ok(SignatureMode::Draw),
            other => Err(format!("Unknown signature mode: {other}")),
        }
    }
}

/// The signature resolved for embedding; exactly one variant per finalize
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureContent {
    Text(String),
    /// PNG bytes of the drawing surface
    Drawing(Vec<u8>),
}

impl SignatureContent {
    pub fn mode(&self) -> SignatureMode {
        match self {
            SignatureContent::Text(_) => SignatureMode::Type,
            SignatureContent::Drawing(_) => SignatureMode::Draw,
        }
    }
}
