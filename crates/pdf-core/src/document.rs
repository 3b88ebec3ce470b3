//! PDF Document wrapper

use crate::font::to_hex_string;
use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{encode_win_ansi, PdfError, Result, StandardFont};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

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

/// PDF Document wrapper providing high-level operations
///
/// Text drawing is buffered per page and written to the content streams
/// when the document is serialized, so every page gets at most one new
/// content stream regardless of how many fields are drawn on it.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Current font
    current_font: StandardFont,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Font dictionaries added to the document (font -> PDF object ID)
    font_objects: BTreeMap<StandardFont, ObjectId>,
    /// Page font resources (page number -> font -> resource name)
    page_font_resources: BTreeMap<usize, BTreeMap<StandardFont, String>>,
    /// Next font resource number
    next_font_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
}

impl PdfDocument {
    fn from_lopdf(inner: Document) -> Self {
        Self {
            inner,
            current_font: StandardFont::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            font_objects: BTreeMap::new(),
            page_font_resources: BTreeMap::new(),
            next_font_resource: 1,
            page_content_buffer: BTreeMap::new(),
        }
    }

    /// Open a PDF document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_lopdf(inner))
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_lopdf(inner))
    }

    /// Create a valid document with an empty page tree
    pub fn empty() -> Self {
        let mut doc = Document::with_version("1.5");

        let pages_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Self::from_lopdf(doc)
    }

    /// Create a single-page document showing an image at its native size
    ///
    /// The page MediaBox is `[0 0 width height]` in image pixels and the
    /// image fills it exactly.
    ///
    /// # Example
    /// ```ignore
    /// let xobject = ImageXObject::from_png(&png_bytes)?;
    /// let mut doc = PdfDocument::from_image(&xobject)?;
    /// assert_eq!(doc.page_size(1)?, (600.0, 800.0));
    /// ```
    pub fn from_image(image: &ImageXObject) -> Result<Self> {
        if image.width == 0 || image.height == 0 {
            return Err(PdfError::ImageError(format!(
                "Image has no area ({}x{})",
                image.width, image.height
            )));
        }

        let mut doc = Self::empty();
        let width = image.width as f64;
        let height = image.height as f64;

        let image_id = doc.inner.add_object(image.to_pdf_stream());
        let operators = generate_image_operators("Im1", 0.0, 0.0, width, height);
        let contents_id = doc
            .inner
            .add_object(Stream::new(Dictionary::new(), operators));

        let page = lopdf::dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Integer(image.width as i64),
                Object::Integer(image.height as i64),
            ],
            "Resources" => lopdf::dictionary! {
                "XObject" => lopdf::dictionary! {
                    "Im1" => image_id,
                },
            },
            "Contents" => contents_id,
        };
        doc.append_page(page)?;

        Ok(doc)
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Set the current font and size
    pub fn set_font(&mut self, font: StandardFont, size: f32) {
        self.current_font = font;
        self.current_font_size = size;
    }

    /// Set the text color
    ///
    /// # Example
    /// ```ignore
    /// doc.set_text_color(Color::rgb(0.5, 0.5, 0.5)); // Gray
    /// ```
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Insert text at a specific position
    ///
    /// Text is encoded as WinAnsi and drawn left-anchored with its baseline
    /// at `(x, y)`, using the current font, size and color.
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points (from left)
    /// * `y` - Y coordinate in points (from bottom)
    ///
    /// # Returns
    /// The number of characters that had no WinAnsi code and were replaced
    pub fn insert_text(&mut self, text: &str, page: usize, x: f64, y: f64) -> Result<usize> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        if text.is_empty() {
            return Ok(0);
        }

        let (encoded, replaced) = encode_win_ansi(text);
        let font_resource_name = self.get_or_create_font_ref(self.current_font, page)?;

        let ctx = TextRenderContext {
            font_name: font_resource_name,
            font_size: self.current_font_size,
            color: self.current_text_color,
        };
        let operators = generate_text_operators(&to_hex_string(&encoded), x, y, &ctx);
        self.buffer_content(page, &operators);

        Ok(replaced)
    }

    /// Page width and height in points
    ///
    /// Taken from the MediaBox, following the parent chain for inherited
    /// boxes.
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let page_id = self.page_id(page)?;
        let media_box = self.get_inherited_media_box(page_id)?;

        if media_box.len() < 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }

        let coords: Vec<f64> = media_box
            .iter()
            .take(4)
            .map(|obj| {
                number(&self.inner, obj)
                    .ok_or_else(|| PdfError::ParseError("Invalid MediaBox value".to_string()))
            })
            .collect::<Result<_>>()?;

        Ok(((coords[2] - coords[0]).abs(), (coords[3] - coords[1]).abs()))
    }

    /// Reduce the document to its first page
    ///
    /// Inherited attributes are copied onto the page, the page tree is
    /// replaced by a single root node and unreachable objects are dropped.
    pub fn retain_first_page(&mut self) -> Result<()> {
        let page_id = self.page_id(1)?;
        fold_inherited_attributes(&mut self.inner, page_id)?;

        let pages_id = pages_root_id(&self.inner)?;
        let mut pages_dict = dictionary_of(&self.inner, pages_id)?;
        pages_dict.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        pages_dict.set("Count", Object::Integer(1));
        pages_dict.remove(b"Parent");
        for key in INHERITABLE_ATTRIBUTES {
            pages_dict.remove(key);
        }
        self.inner.objects.insert(pages_id, pages_dict.into());

        let mut page_dict = dictionary_of(&self.inner, page_id)?;
        page_dict.set("Parent", Object::Reference(pages_id));
        self.inner.objects.insert(page_id, page_dict.into());

        self.inner.prune_objects();

        Ok(())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        // 1. Flush buffered content streams to pages
        self.flush_content_buffers()?;

        // 2. Add font dictionaries and page font resources
        self.add_fonts()?;

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

    /// Consume the wrapper, returning the lopdf document
    ///
    /// Buffered text that was not flushed by `to_bytes` is discarded.
    pub fn into_inner(self) -> Document {
        self.inner
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Append a page dictionary to the root of the page tree
    fn append_page(&mut self, mut page_dict: Dictionary) -> Result<usize> {
        let pages_id = pages_root_id(&self.inner)?;
        page_dict.set("Parent", Object::Reference(pages_id));
        let new_page_id = self.inner.add_object(Object::Dictionary(page_dict));

        let mut pages_dict = dictionary_of(&self.inner, pages_id)?;
        let mut kids_array = pages_dict
            .get(b"Kids")
            .and_then(Object::as_array)
            .map_err(|_| PdfError::ParseError("Pages object missing Kids array".to_string()))?
            .clone();
        kids_array.push(Object::Reference(new_page_id));

        let current_count = pages_dict
            .get(b"Count")
            .and_then(Object::as_i64)
            .map_err(|_| PdfError::ParseError("Pages object missing Count".to_string()))?;

        pages_dict.set("Kids", Object::Array(kids_array));
        pages_dict.set("Count", Object::Integer(current_count + 1));
        self.inner.objects.insert(pages_id, pages_dict.into());

        Ok(self.page_count())
    }

    /// Get or create a font reference for a specific page
    ///
    /// Returns the resource name (e.g., "SF1") for use in content streams.
    /// Names already present in the page's font resources are skipped.
    fn get_or_create_font_ref(&mut self, font: StandardFont, page: usize) -> Result<String> {
        if let Some(name) = self
            .page_font_resources
            .get(&page)
            .and_then(|fonts| fonts.get(&font))
        {
            return Ok(name.clone());
        }

        let taken = self.existing_font_names(page)?;
        let resource_name = loop {
            let candidate = format!("SF{}", self.next_font_resource);
            self.next_font_resource += 1;
            if !taken.contains(candidate.as_bytes()) {
                break candidate;
            }
        };

        self.page_font_resources
            .entry(page)
            .or_default()
            .insert(font, resource_name.clone());

        Ok(resource_name)
    }

    fn existing_font_names(&self, page: usize) -> Result<BTreeSet<Vec<u8>>> {
        let resources = inherited_attribute(&self.inner, self.page_id(page)?, b"Resources")?;
        let resources = resolved_dictionary(&self.inner, resources.as_ref());
        let fonts = resolved_dictionary(&self.inner, resources.get(b"Font").ok());
        Ok(fonts.iter().map(|(key, _)| key.clone()).collect())
    }

    /// Add a font dictionary object for every font in use and register the
    /// resource names on each page
    fn add_fonts(&mut self) -> Result<()> {
        let page_resources = std::mem::take(&mut self.page_font_resources);

        for (page, fonts) in &page_resources {
            let mut entries = Vec::with_capacity(fonts.len());
            for (font, resource_name) in fonts {
                let font_id = match self.font_objects.get(font) {
                    Some(id) => *id,
                    None => {
                        let id = self.inner.add_object(font.to_pdf_dictionary());
                        self.font_objects.insert(*font, id);
                        id
                    }
                };
                entries.push((resource_name.clone(), font_id));
            }
            self.add_fonts_to_page_resources(*page, &entries)?;
        }

        Ok(())
    }

    /// Add multiple fonts to a page's Resources dictionary in a single operation
    fn add_fonts_to_page_resources(
        &mut self,
        page: usize,
        fonts: &[(String, ObjectId)],
    ) -> Result<()> {
        let page_id = self.page_id(page)?;
        fold_inherited_attributes(&mut self.inner, page_id)?;
        let mut page_dict = dictionary_of(&self.inner, page_id)?;

        let mut resources_dict = resolved_dictionary(&self.inner, page_dict.get(b"Resources").ok());
        let mut font_dict = resolved_dictionary(&self.inner, resources_dict.get(b"Font").ok());

        for (resource_name, font_id) in fonts {
            font_dict.set(resource_name.as_bytes(), Object::Reference(*font_id));
        }

        resources_dict.set("Font", Object::Dictionary(font_dict));
        page_dict.set("Resources", Object::Dictionary(resources_dict));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }

    /// Get MediaBox, following parent inheritance chain if needed
    fn get_inherited_media_box(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        match inherited_attribute(&self.inner, page_id, b"MediaBox")? {
            Some(media_box) => resolve(&self.inner, &media_box)
                .as_array()
                .cloned()
                .map_err(|_| PdfError::ParseError("MediaBox is not an array".to_string())),
            // Fallback: assume A4 page size
            None => Ok(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(595.28),
                Object::Real(841.89),
            ]),
        }
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
        let buffers = std::mem::take(&mut self.page_content_buffer);

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content stream
    ///
    /// The existing content is wrapped in `q ... Q` so that any graphics
    /// state it leaves behind does not affect the appended operators.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut page_dict = dictionary_of(&self.inner, page_id)?;

        let existing_content = match page_dict.get(b"Contents") {
            Ok(Object::Array(arr)) => {
                let mut combined = Vec::new();
                for obj in arr {
                    combined.extend_from_slice(&stream_content(&self.inner, obj));
                    combined.push(b'\n');
                }
                combined
            }
            Ok(obj) => stream_content(&self.inner, obj),
            Err(_) => Vec::new(),
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
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }
}

/// Object ID of the root Pages node
pub(crate) fn pages_root_id(doc: &Document) -> Result<ObjectId> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PdfError::ParseError("Document trailer missing Root entry".to_string()))?;
    let catalog = dictionary_of(doc, catalog_id)?;
    catalog
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| PdfError::ParseError("Catalog missing Pages entry".to_string()))
}

/// Clone of the dictionary stored under `id`
pub(crate) fn dictionary_of(doc: &Document, id: ObjectId) -> Result<Dictionary> {
    doc.get_object(id)?
        .as_dict()
        .cloned()
        .map_err(|_| PdfError::ParseError(format!("Object {} {} is not a dictionary", id.0, id.1)))
}

/// Copy inheritable attributes from ancestors onto the page dictionary
///
/// After this the page no longer depends on its parent chain and can be
/// moved into a different page tree.
pub(crate) fn fold_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut page_dict = dictionary_of(doc, page_id)?;
    let mut changed = false;

    for key in INHERITABLE_ATTRIBUTES {
        if page_dict.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(doc, page_id, key)? {
            page_dict.set(key, value);
            changed = true;
        }
    }

    if changed {
        doc.objects.insert(page_id, page_dict.into());
    }

    Ok(())
}

/// Look up an attribute on a page or the nearest ancestor that defines it
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
    let mut current_id = page_id;

    // Follow parent chain up to 32 levels
    for _ in 0..32 {
        let dict = doc
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

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Clone a dictionary that may be stored inline or behind a reference
///
/// Missing or malformed entries produce an empty dictionary.
fn resolved_dictionary(doc: &Document, obj: Option<&Object>) -> Dictionary {
    obj.map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_default()
}

fn number(doc: &Document, obj: &Object) -> Option<f64> {
    match resolve(doc, obj) {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Decompressed bytes of a content stream, inline or referenced
fn stream_content(doc: &Document, obj: &Object) -> Vec<u8> {
    match resolve(doc, obj) {
        Object::Stream(stream) => stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone()),
        _ => Vec::new(),
    }
}
