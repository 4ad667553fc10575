//! Image handling for PDF documents

use crate::{PdfError, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Check the PNG signature
pub fn detect_png(data: &[u8]) -> Result<()> {
    if data.len() < PNG_SIGNATURE.len() {
        return Err(PdfError::ImageError("Image data too short".to_string()));
    }
    if data[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
        return Err(PdfError::ImageError("Not a PNG image".to_string()));
    }
    Ok(())
}

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Image width
    pub width: u32,
    /// Image height
    pub height: u32,
    /// Color space ("DeviceRGB", "DeviceGray")
    pub color_space: String,
    /// Bits per component
    pub bits_per_component: u8,
    /// PDF filter, always "FlateDecode" for PNG sources
    pub filter: String,
    /// Compressed color samples
    pub data: Vec<u8>,
    /// Compressed 8-bit alpha samples, present only when some pixel is not opaque
    pub alpha: Option<Vec<u8>>,
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

impl ImageXObject {
    /// Create XObject from PNG data
    ///
    /// Color samples are re-encoded with FlateDecode. Alpha is kept as a
    /// separate soft mask so transparent pixels leave the page visible
    /// underneath.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        detect_png(data)?;

        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let decoder = reader.into_decoder()?;

        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        let (raw_data, raw_alpha, color_space) = match color_type {
            image::ColorType::L8 | image::ColorType::L16 => {
                (image.to_luma8().into_raw(), None, "DeviceGray")
            }
            image::ColorType::La8 | image::ColorType::La16 => {
                let la = image.to_luma_alpha8();
                let mut gray = Vec::with_capacity((width * height) as usize);
                let mut alpha = Vec::with_capacity((width * height) as usize);
                for pixel in la.pixels() {
                    gray.push(pixel[0]);
                    alpha.push(pixel[1]);
                }
                (gray, Some(alpha), "DeviceGray")
            }
            image::ColorType::Rgba8 | image::ColorType::Rgba16 => {
                let rgba = image.to_rgba8();
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                let mut alpha = Vec::with_capacity((width * height) as usize);
                for pixel in rgba.pixels() {
                    rgb.extend_from_slice(&[pixel[0], pixel[1], pixel[2]]);
                    alpha.push(pixel[3]);
                }
                (rgb, Some(alpha), "DeviceRGB")
            }
            _ => (image.to_rgb8().into_raw(), None, "DeviceRGB"),
        };

        let alpha = match raw_alpha {
            Some(alpha) if alpha.iter().any(|a| *a != u8::MAX) => Some(deflate(&alpha)?),
            _ => None,
        };

        Ok(Self {
            width,
            height,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            filter: "FlateDecode".to_string(),
            data: deflate(&raw_data)?,
            alpha,
        })
    }

    fn image_dict(&self, color_space: &str, length: usize) -> Dictionary {
        let mut dict = Dictionary::new();

        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        dict.set("Filter", Object::Name(self.filter.as_bytes().to_vec()));
        dict.set("Length", length as i64);
        dict
    }

    /// Soft mask stream for the alpha channel, if the image has one
    pub fn smask_stream(&self) -> Option<Stream> {
        self.alpha.as_ref().map(|alpha| {
            let dict = self.image_dict("DeviceGray", alpha.len());
            Stream::new(dict, alpha.clone())
        })
    }

    /// Convert to lopdf Stream object
    ///
    /// `smask` is the object id of the stream returned by [`Self::smask_stream`]
    /// once it has been added to the document.
    pub fn to_pdf_stream(&self, smask: Option<ObjectId>) -> Stream {
        let mut dict = self.image_dict(&self.color_space, self.data.len());
        if let Some(id) = smask {
            dict.set("SMask", Object::Reference(id));
        }
        Stream::new(dict, self.data.clone())
    }
}

/// Generate operators to draw image at position
///
/// # Arguments
/// * `image_name` - Image resource name (e.g., "SigIm1")
/// * `x` - X coordinate in points
/// * `y` - Y coordinate of the image's bottom edge (PDF coordinates)
/// * `width` - Image width in points
/// * `height` - Image height in points
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    // q / cm / Do / Q: the image space unit square is mapped onto the target rect
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
