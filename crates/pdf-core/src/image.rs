//! Image handling for PDF documents

use crate::{PdfError, Result};
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Stream};
use std::io::Cursor;

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Supported raster image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        }
    }
}

/// JPEG info including dimensions and color components
#[derive(Debug, Clone, Copy)]
struct JpegInfo {
    width: u32,
    height: u32,
    num_components: u8,
}

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color space ("DeviceRGB", "DeviceGray")
    pub color_space: String,
    /// Bits per component
    pub bits_per_component: u8,
    /// PDF filter ("DCTDecode" for JPEG, "FlateDecode" for PNG)
    pub filter: String,
    /// Raw image data (compressed)
    pub data: Vec<u8>,
}

/// Get JPEG info including dimensions and color components
fn get_jpeg_info(data: &[u8]) -> Result<JpegInfo> {
    // SOF segment structure:
    // - 2 bytes: marker (0xFF, 0xC0-0xCF)
    // - 2 bytes: segment length
    // - 1 byte: precision
    // - 2 bytes: height
    // - 2 bytes: width
    // - 1 byte: number of components (1=grayscale, 3=RGB/YCbCr, 4=CMYK)
    let mut i = 2;
    while i + 10 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            let num_components = data[i + 9];
            return Ok(JpegInfo {
                width,
                height,
                num_components,
            });
        }

        if i + 4 < data.len() {
            let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            if length < 2 {
                break;
            }
            i += 2 + length;
        } else {
            break;
        }
    }

    Err(PdfError::ImageError(
        "Could not parse JPEG info".to_string(),
    ))
}

impl ImageXObject {
    /// Decode image data of the given format into an XObject
    pub fn decode(data: &[u8], format: ImageFormat) -> Result<Self> {
        match format {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// Create XObject from JPEG data
    ///
    /// The data is fully decoded once to reject corrupt files. Gray and
    /// YCbCr JPEGs are then embedded directly with DCTDecode; CMYK JPEGs are
    /// re-encoded as RGB.
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory_with_format(data, ImageFormat::Jpeg.into())?;
        let info = get_jpeg_info(data)?;

        let color_space = match info.num_components {
            1 => "DeviceGray",
            3 => "DeviceRGB",
            _ => return Self::from_decoded(image, image::ColorType::Rgb8),
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            filter: "DCTDecode".to_string(),
            data: data.to_vec(),
        })
    }

    /// Create XObject from PNG data
    ///
    /// PNG images need to be decoded and re-encoded as RGB data with FlateDecode.
    /// Alpha channels are blended with a white background.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(data);
        let mut reader = ImageReader::new(cursor);
        reader.set_format(ImageFormat::Png.into());
        let decoder = reader.into_decoder()?;

        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        Self::from_decoded(image, color_type)
    }

    fn from_decoded(image: DynamicImage, color_type: image::ColorType) -> Result<Self> {
        let (width, height) = (image.width(), image.height());

        let (raw_data, color_space) = match color_type {
            image::ColorType::L8 | image::ColorType::L16 => {
                let gray = image.to_luma8();
                (gray.into_raw(), "DeviceGray")
            }
            image::ColorType::La8 | image::ColorType::La16 => {
                let la = image.to_luma_alpha8();
                let mut gray_data = Vec::with_capacity((width * height) as usize);
                for pixel in la.pixels() {
                    gray_data.push(blend_on_white(pixel[0], pixel[1]));
                }
                (gray_data, "DeviceGray")
            }
            image::ColorType::Rgba8 | image::ColorType::Rgba16 | image::ColorType::Rgba32F => {
                let rgba = image.to_rgba8();
                let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
                for pixel in rgba.pixels() {
                    let alpha = pixel[3];
                    rgb_data.push(blend_on_white(pixel[0], alpha));
                    rgb_data.push(blend_on_white(pixel[1], alpha));
                    rgb_data.push(blend_on_white(pixel[2], alpha));
                }
                (rgb_data, "DeviceRGB")
            }
            _ => {
                let rgb = image.to_rgb8();
                (rgb.into_raw(), "DeviceRGB")
            }
        };

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        std::io::Write::write_all(&mut encoder, &raw_data)?;
        let data = encoder.finish()?;

        Ok(Self {
            width,
            height,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            filter: "FlateDecode".to_string(),
            data,
        })
    }

    /// Convert to lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let mut dict = Dictionary::new();

        dict.set("Type", lopdf::Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", lopdf::Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set(
            "ColorSpace",
            lopdf::Object::Name(self.color_space.as_bytes().to_vec()),
        );
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        dict.set(
            "Filter",
            lopdf::Object::Name(self.filter.as_bytes().to_vec()),
        );
        dict.set("Length", self.data.len() as i64);

        // Already compressed; keep lopdf from compressing it again
        Stream::new(dict, self.data.clone()).with_compression(false)
    }
}

fn blend_on_white(value: u8, alpha: u8) -> u8 {
    let alpha = alpha as f32 / 255.0;
    (value as f32 * alpha + 255.0 * (1.0 - alpha)) as u8
}

/// Generate operators to draw image at position
///
/// # Arguments
/// * `image_name` - Image resource name (e.g., "Im1")
/// * `x` - X coordinate in points
/// * `y` - Y coordinate in points (from bottom, PDF coordinates)
/// * `width` - Image width in points
/// * `height` - Image height in points
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb, Rgba};

    fn encode(image: DynamicImage, format: image::ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), format)
            .unwrap();
        buffer
    }

    #[test]
    fn test_generate_image_operators() {
        let ops = generate_image_operators("Im1", 0.0, 0.0, 600.0, 800.0);
        let ops_str = String::from_utf8(ops).unwrap();

        assert_eq!(ops_str, "q\n600 0 0 800 0 0 cm\n/Im1 Do\nQ\n");
    }

    #[test]
    fn test_from_png_rgb() {
        let img = ImageBuffer::from_pixel(30, 20, Rgb([10u8, 20, 30]));
        let png = encode(DynamicImage::ImageRgb8(img), image::ImageFormat::Png);

        let xobject = ImageXObject::from_png(&png).unwrap();
        assert_eq!(xobject.width, 30);
        assert_eq!(xobject.height, 20);
        assert_eq!(xobject.color_space, "DeviceRGB");
        assert_eq!(xobject.filter, "FlateDecode");
    }

    #[test]
    fn test_from_png_gray() {
        let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::new(16, 16);
        let png = encode(DynamicImage::ImageLuma8(img), image::ImageFormat::Png);

        let xobject = ImageXObject::from_png(&png).unwrap();
        assert_eq!(xobject.color_space, "DeviceGray");
    }

    #[test]
    fn test_from_png_alpha_blended_on_white() {
        let img = ImageBuffer::from_pixel(2, 2, Rgba([0u8, 0, 0, 0]));
        let png = encode(DynamicImage::ImageRgba8(img), image::ImageFormat::Png);

        let xobject = ImageXObject::from_png(&png).unwrap();
        assert_eq!(xobject.color_space, "DeviceRGB");

        let mut decoder = flate2::read::ZlibDecoder::new(&xobject.data[..]);
        let mut raw = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut raw).unwrap();
        assert_eq!(raw, vec![255u8; 12]);
    }

    #[test]
    fn test_from_jpeg_passthrough() {
        let img = ImageBuffer::from_pixel(40, 25, Rgb([200u8, 100, 50]));
        let jpeg = encode(DynamicImage::ImageRgb8(img), image::ImageFormat::Jpeg);

        let xobject = ImageXObject::from_jpeg(&jpeg).unwrap();
        assert_eq!(xobject.width, 40);
        assert_eq!(xobject.height, 25);
        assert_eq!(xobject.color_space, "DeviceRGB");
        assert_eq!(xobject.filter, "DCTDecode");
        assert_eq!(xobject.data, jpeg);
    }

    #[test]
    fn test_corrupt_data_rejected() {
        let garbage = vec![0x89, 0x50, 0x4E, 0x47, 0x00, 0x01, 0x02, 0x03];
        assert!(ImageXObject::decode(&garbage, ImageFormat::Png).is_err());
        assert!(ImageXObject::decode(&garbage, ImageFormat::Jpeg).is_err());
    }

    #[test]
    fn test_declared_format_must_match() {
        let img = ImageBuffer::from_pixel(4, 4, Rgb([1u8, 2, 3]));
        let png = encode(DynamicImage::ImageRgb8(img), image::ImageFormat::Png);

        assert!(ImageXObject::decode(&png, ImageFormat::Jpeg).is_err());
    }

    #[test]
    fn test_get_jpeg_info_too_short() {
        let data = vec![0xFF, 0xD8, 0xFF];
        assert!(get_jpeg_info(&data).is_err());
    }

    #[test]
    fn test_image_xobject_to_pdf_stream() {
        let xobject = ImageXObject {
            width: 100,
            height: 50,
            color_space: "DeviceRGB".to_string(),
            bits_per_component: 8,
            filter: "DCTDecode".to_string(),
            data: vec![1, 2, 3, 4, 5],
        };

        let stream = xobject.to_pdf_stream();
        let dict = &stream.dict;

        assert_eq!(dict.get(b"Type").unwrap().as_name().unwrap(), b"XObject");
        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Image");
        assert_eq!(dict.get(b"Width").unwrap().as_i64().unwrap(), 100);
        assert_eq!(dict.get(b"Height").unwrap().as_i64().unwrap(), 50);
        assert_eq!(
            dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"DCTDecode"
        );
        assert_eq!(stream.content, vec![1, 2, 3, 4, 5]);
    }
}
