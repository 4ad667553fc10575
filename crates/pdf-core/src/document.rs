//! PDF Document wrapper

use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{generate_text_operators, to_hex_string, TextRenderContext};
use crate::{encode_win_ansi, PdfError, Result, StandardFont};
use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// A4 portrait, used when a page carries no usable MediaBox
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
}

/// A standard font that has been added to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle {
    font: StandardFont,
    object_id: ObjectId,
}

impl FontHandle {
    pub fn font(&self) -> StandardFont {
        self.font
    }
}

/// An image XObject that has been added to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    object_id: ObjectId,
    width: u32,
    height: u32,
}

impl ImageHandle {
    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Font, size and color of a text run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: FontHandle,
    /// Font size in points
    pub size: f64,
    pub color: Color,
}

impl TextStyle {
    pub fn new(font: FontHandle, size: f64, color: Color) -> Self {
        Self { font, size, color }
    }
}

/// PDF Document wrapper providing high-level operations
///
/// Drawing operations are buffered per page and written when the document
/// is serialized with [`PdfDocument::to_bytes`] or [`PdfDocument::save`].
/// All coordinates are PDF user space: points, origin at the bottom-left.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Embedded standard fonts (font -> PDF object ID)
    embedded_fonts: HashMap<StandardFont, ObjectId>,
    /// Embedded images (data hash -> handle)
    embedded_images: HashMap<u64, ImageHandle>,
    /// Resource names registered per page (page number -> object ID -> name)
    page_resources: HashMap<usize, HashMap<ObjectId, String>>,
    /// Next resource number
    next_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
}

impl PdfDocument {
    fn from_document(inner: Document) -> Self {
        Self {
            inner,
            embedded_fonts: HashMap::new(),
            embedded_images: HashMap::new(),
            page_resources: HashMap::new(),
            next_resource: 1,
            page_content_buffer: HashMap::new(),
        }
    }

    /// Open a PDF document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_document(inner))
    }

    /// Open a PDF document from bytes
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        let doc = Self::from_document(inner);
        if doc.page_count() == 0 {
            return Err(PdfError::OpenError("Document has no pages".to_string()));
        }
        Ok(doc)
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Get the size of a page in points
    ///
    /// The size is the page's MediaBox, inherited from the page tree when the
    /// page has none of its own. A CropBox never changes the reported size.
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        let page_id = self.page_id(page)?;

        let media_box = match self.find_inherited(page_id, b"MediaBox")? {
            Some(Object::Array(arr)) => arr,
            Some(Object::Reference(ref_id)) => self
                .inner
                .get_object(ref_id)?
                .as_array()
                .map_err(|_| PdfError::ParseError("MediaBox reference is not an array".to_string()))?
                .clone(),
            Some(_) => return Err(PdfError::ParseError("MediaBox is not an array".to_string())),
            None => return Ok(PageSize::A4),
        };

        extract_size_from_media_box(&media_box)
    }

    /// Get the sizes of all pages, in page order
    pub fn page_sizes(&self) -> Result<Vec<PageSize>> {
        (1..=self.page_count()).map(|page| self.page_size(page)).collect()
    }

    /// Add a standard font to the document
    ///
    /// Each font is added once; later calls return the same handle.
    pub fn embed_standard_font(&mut self, font: StandardFont) -> Result<FontHandle> {
        let object_id = match self.embedded_fonts.get(&font) {
            Some(id) => *id,
            None => {
                let id = self.inner.add_object(font.to_pdf_dict());
                debug!("embedded font {} as {:?}", font.base_font(), id);
                self.embedded_fonts.insert(font, id);
                id
            }
        };

        Ok(FontHandle { font, object_id })
    }

    /// Add a PNG image to the document
    ///
    /// Images are deduplicated by a hash of their bytes.
    pub fn embed_png(&mut self, data: &[u8]) -> Result<ImageHandle> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        if let Some(handle) = self.embedded_images.get(&data_hash) {
            return Ok(*handle);
        }

        let xobject = ImageXObject::from_png(data)?;
        let smask_id = xobject
            .smask_stream()
            .map(|stream| self.inner.add_object(stream));
        let object_id = self.inner.add_object(xobject.to_pdf_stream(smask_id));

        debug!(
            "embedded {}x{} image as {:?} (soft mask: {})",
            xobject.width,
            xobject.height,
            object_id,
            smask_id.is_some()
        );

        let handle = ImageHandle {
            object_id,
            width: xobject.width,
            height: xobject.height,
        };
        self.embedded_images.insert(data_hash, handle);
        Ok(handle)
    }

    /// Draw a text run
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    /// * `text` - Text to draw; must be representable in WinAnsiEncoding
    /// * `x` - X coordinate of the run start in points
    /// * `y` - Y coordinate of the baseline in points (from bottom)
    /// * `style` - Font, size and color
    pub fn draw_text(
        &mut self,
        page: usize,
        text: &str,
        x: f64,
        y: f64,
        style: &TextStyle,
    ) -> Result<()> {
        self.page_id(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let encoded = encode_win_ansi(text, style.font.font)?;
        let font_name = self.register_resource(page, b"Font", style.font.object_id, "SigF")?;

        let ctx = TextRenderContext {
            font_name,
            font_size: style.size,
            color: style.color,
        };
        let operators = generate_text_operators(&to_hex_string(&encoded), x, y, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Draw an image stretched over a rectangle
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    /// * `image` - Handle returned by [`PdfDocument::embed_png`]
    /// * `x`, `y` - Bottom-left corner in points
    /// * `width`, `height` - Size in points
    pub fn draw_image(
        &mut self,
        page: usize,
        image: &ImageHandle,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let image_name = self.register_resource(page, b"XObject", image.object_id, "SigIm")?;
        let operators = generate_image_operators(&image_name, x, y, width, height);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.flush_content_buffers()?;

        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush_content_buffers()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Get a mutable reference to the underlying lopdf document
    pub fn inner_mut(&mut self) -> &mut Document {
        &mut self.inner
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Look up a page attribute, following the Parent chain for inherited values
    fn find_inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels (safety limit)
        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(value) = dict.get(key) {
                return Ok(Some(value.clone()));
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(None)
    }

    fn resolve_dict(&self, obj: &Object) -> Option<Dictionary> {
        match obj {
            Object::Dictionary(dict) => Some(dict.clone()),
            Object::Reference(id) => self
                .inner
                .get_object(*id)
                .ok()
                .and_then(|o| o.as_dict().ok())
                .cloned(),
            _ => None,
        }
    }

    /// Give `object_id` a name in the page's Resources under `category`
    ///
    /// The page gets its own copy of an inherited or shared Resources
    /// dictionary, and names already present on the page are skipped.
    fn register_resource(
        &mut self,
        page: usize,
        category: &[u8],
        object_id: ObjectId,
        prefix: &str,
    ) -> Result<String> {
        if let Some(name) = self
            .page_resources
            .get(&page)
            .and_then(|names| names.get(&object_id))
        {
            return Ok(name.clone());
        }

        let page_id = self.page_id(page)?;

        let mut resources = self
            .find_inherited(page_id, b"Resources")?
            .and_then(|obj| self.resolve_dict(&obj))
            .unwrap_or_else(Dictionary::new);

        let mut category_dict = resources
            .get(category)
            .ok()
            .and_then(|obj| self.resolve_dict(obj))
            .unwrap_or_else(Dictionary::new);

        let name = loop {
            let candidate = format!("{prefix}{}", self.next_resource);
            self.next_resource += 1;
            if !category_dict.has(candidate.as_bytes()) {
                break candidate;
            }
        };

        category_dict.set(name.as_str(), Object::Reference(object_id));
        resources.set(category, Object::Dictionary(category_dict));

        let mut page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();
        page_dict.set("Resources", Object::Dictionary(resources));
        self.inner.objects.insert(page_id, Object::Dictionary(page_dict));

        self.page_resources
            .entry(page)
            .or_default()
            .insert(object_id, name.clone());

        Ok(name)
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();

        for (page, content) in buffers {
            if !content.is_empty() {
                debug!("appending {} bytes of operators to page {}", content.len(), page);
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content stream
    ///
    /// The existing content is wrapped in `q`/`Q` so graphics state it leaves
    /// behind does not apply to the appended operators.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;

        let (existing_content, mut page_dict) = {
            let page_dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;

            let existing_content = match page_dict.get(b"Contents") {
                Ok(Object::Stream(stream)) => stream_bytes(stream),
                Ok(Object::Reference(ref_id)) => match self.inner.get_object(*ref_id) {
                    Ok(Object::Stream(stream)) => stream_bytes(stream),
                    _ => Vec::new(),
                },
                Ok(Object::Array(arr)) => {
                    let mut combined = Vec::new();
                    for obj in arr {
                        let data = match obj {
                            Object::Reference(ref_id) => match self.inner.get_object(*ref_id) {
                                Ok(Object::Stream(stream)) => stream_bytes(stream),
                                _ => continue,
                            },
                            Object::Stream(stream) => stream_bytes(stream),
                            _ => continue,
                        };
                        combined.extend_from_slice(&data);
                        combined.push(b'\n');
                    }
                    combined
                }
                _ => Vec::new(),
            };

            (existing_content, page_dict.clone())
        };

        let mut new_content = Vec::with_capacity(existing_content.len() + content.len() + 8);
        if !existing_content.is_empty() {
            new_content.extend_from_slice(b"q\n");
            new_content.extend_from_slice(&existing_content);
            new_content.extend_from_slice(b"\nQ\n");
        }
        new_content.extend_from_slice(content);

        let stream_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), new_content));

        page_dict.set("Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, Object::Dictionary(page_dict));

        Ok(())
    }
}

fn stream_bytes(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

fn media_box_number(obj: &Object) -> Option<f64> {
    obj.as_f32()
        .map(|v| v as f64)
        .ok()
        .or_else(|| obj.as_i64().ok().map(|v| v as f64))
}

/// Extract width and height from a MediaBox array
fn extract_size_from_media_box(media_box: &[Object]) -> Result<PageSize> {
    if media_box.len() < 4 {
        return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
    }

    let mut coords = [0.0f64; 4];
    for (slot, obj) in coords.iter_mut().zip(media_box) {
        *slot = media_box_number(obj)
            .ok_or_else(|| PdfError::ParseError("Invalid MediaBox value".to_string()))?;
    }

    let [x1, y1, x2, y2] = coords;
    Ok(PageSize {
        width: (x2 - x1).abs(),
        height: (y2 - y1).abs(),
    })
}
