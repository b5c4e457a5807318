//! Scanned-page rasterization using lopdf.
//!
//! Scanned permits are PDFs whose pages each carry one full-page image
//! XObject. Rasterizing such a page means decoding that image and scaling it
//! to the requested DPI using the page's MediaBox.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{Rasterizer, Result};
use crate::error::PdfError;

/// PDF points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Largest edge a rasterized page may have, in pixels.
const MAX_EDGE_PX: u32 = 12_000;

/// Rasterizer for scanned PDFs, backed by lopdf.
#[derive(Debug, Clone, Default)]
pub struct PdfRasterizer {
    max_pages: usize,
}

impl PdfRasterizer {
    /// Create a rasterizer that processes every page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of pages rasterized (0 = unlimited).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn load(&self, data: &[u8]) -> Result<Document> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        if doc.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        Ok(doc)
    }

    /// Decode the largest image drawn on a page.
    fn page_image(&self, doc: &Document, page: u32, page_id: ObjectId) -> Result<DynamicImage> {
        let resources = page_attribute(doc, page_id, b"Resources")
            .and_then(|obj| match obj {
                Object::Dictionary(dict) => Some(dict),
                _ => None,
            })
            .ok_or_else(|| PdfError::ImageExtraction(format!("page {} has no resources", page)))?;

        let mut images = Vec::new();
        if let Ok(xobjects) = resources.get(b"XObject") {
            if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                for (_name, obj_ref) in xobj_dict.iter() {
                    if let Ok((_, obj)) = doc.dereference(obj_ref) {
                        if let Some(img) = self.try_extract_image_from_object(doc, obj) {
                            images.push(img);
                        }
                    }
                }
            }
        }

        trace!("Found {} decodable images on page {}", images.len(), page);

        images
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or_else(|| {
                PdfError::ImageExtraction(format!("page {} has no scanned image", page))
            })
    }

    fn try_extract_image_from_object(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        // Only image XObjects
        let subtype = dict.get(b"Subtype").ok()?;
        if subtype.as_name().ok()? != b"Image" {
            return None;
        }

        let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
        let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;

        trace!("Found image object: {}x{}", width, height);

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) if !arr.is_empty() => arr.first().and_then(|o| o.as_name().ok()),
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    // JPEG data is decoded straight from the raw stream
                    return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                        .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    warn!(
                        "Skipping image with unsupported filter {}",
                        String::from_utf8_lossy(filter_name.unwrap_or_default())
                    );
                    return None;
                }
                _ => {}
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8) as u8;

        create_image_from_raw(&data, width, height, color_space, bits)
    }
}

impl Rasterizer for PdfRasterizer {
    fn rasterize(&self, data: &[u8], dpi: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.load(data)?;
        let pages = doc.get_pages();

        let limit = if self.max_pages == 0 { pages.len() } else { self.max_pages };
        if pages.len() > limit {
            warn!("PDF has {} pages, rasterizing the first {}", pages.len(), limit);
        }

        let mut images = Vec::with_capacity(pages.len().min(limit));

        for (&page, &page_id) in pages.iter().take(limit) {
            let image = self.page_image(&doc, page, page_id)?;
            let image = match media_box_size(&doc, page_id) {
                Some((width_pt, height_pt)) => scale_to_dpi(image, width_pt, height_pt, dpi),
                None => image,
            };

            debug!("Rasterized page {} to {}x{}", page, image.width(), image.height());
            images.push(image);
        }

        Ok(images)
    }
}

/// Look up a page attribute, following the page tree for inherited values.
fn page_attribute(doc: &Document, node_id: ObjectId, key: &[u8]) -> Option<Object> {
    let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(value) = dict.get(key) {
        if let Ok((_, resolved)) = doc.dereference(value) {
            return Some(resolved.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_attribute(doc, *parent_id, key),
        _ => None,
    }
}

/// Page size in points from the (possibly inherited) MediaBox.
fn media_box_size(doc: &Document, page_id: ObjectId) -> Option<(f32, f32)> {
    let Object::Array(values) = page_attribute(doc, page_id, b"MediaBox")? else {
        return None;
    };

    let coords: Vec<f32> = values.iter().filter_map(number).collect();
    if coords.len() != 4 {
        return None;
    }

    let width = (coords[2] - coords[0]).abs();
    let height = (coords[3] - coords[1]).abs();
    (width > 0.0 && height > 0.0).then_some((width, height))
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Pixel size of a page of `width_pt` x `height_pt` points rendered at `dpi`.
fn target_size(width_pt: f32, height_pt: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let width = (width_pt * scale).round().clamp(1.0, MAX_EDGE_PX as f32) as u32;
    let height = (height_pt * scale).round().clamp(1.0, MAX_EDGE_PX as f32) as u32;
    (width, height)
}

/// Resample a page image to the requested DPI; images already at size are returned untouched.
fn scale_to_dpi(image: DynamicImage, width_pt: f32, height_pt: f32, dpi: u32) -> DynamicImage {
    if dpi == 0 {
        return image;
    }

    let (width, height) = target_size(width_pt, height_pt, dpi);
    let (current_w, current_h) = image.dimensions();

    if current_w.abs_diff(width) <= 1 && current_h.abs_diff(height) <= 1 {
        return image;
    }

    trace!("Scaling page image {}x{} -> {}x{} ({} dpi)", current_w, current_h, width, height, dpi);
    image.resize_exact(width, height, FilterType::Triangle)
}

fn create_image_from_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: u8,
) -> Option<DynamicImage> {
    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let Some(pixels) = (width as usize).checked_mul(height as usize) else {
        trace!("Image dimensions overflow: {}x{}", width, height);
        return None;
    };
    let rgb_len = pixels.checked_mul(3)?;

    let rgba_data: Vec<u8> = match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= rgb_len => data[..rgb_len]
            .chunks_exact(3)
            .flat_map(|c| [c[0], c[1], c[2], 255])
            .collect(),
        b"DeviceGray" | b"G" if data.len() >= pixels => data[..pixels]
            .iter()
            .flat_map(|&g| [g, g, g, 255])
            .collect(),
        _ => {
            trace!(
                "Could not decode image: colorspace={}, data_len={}",
                String::from_utf8_lossy(color_space),
                data.len()
            );
            return None;
        }
    };

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba_data).map(DynamicImage::ImageRgba8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rejects_garbage() {
        let rasterizer = PdfRasterizer::new();
        assert!(matches!(rasterizer.rasterize(b"not a pdf", 300), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_target_size_letter_at_300_dpi() {
        assert_eq!(target_size(612.0, 792.0, 300), (2550, 3300));
        assert_eq!(target_size(612.0, 792.0, 72), (612, 792));
    }

    #[test]
    fn test_scale_to_dpi_resizes() {
        let image = DynamicImage::new_rgb8(100, 50);
        let scaled = scale_to_dpi(image, 72.0, 36.0, 144);
        assert_eq!(scaled.dimensions(), (144, 72));
    }

    #[test]
    fn test_scale_to_dpi_keeps_matching_size() {
        let image = DynamicImage::new_rgb8(300, 150);
        let scaled = scale_to_dpi(image, 72.0, 36.0, 300);
        assert_eq!(scaled.dimensions(), (300, 150));
    }

    #[test]
    fn test_raw_gray_image() {
        let data = vec![0u8, 128, 255, 64];
        let image = create_image_from_raw(&data, 2, 2, b"DeviceGray", 8).unwrap();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.to_rgba8().get_pixel(1, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_raw_image_too_short() {
        assert!(create_image_from_raw(&[0u8; 5], 2, 2, b"DeviceRGB", 8).is_none());
        assert!(create_image_from_raw(&[0u8; 12], 2, 2, b"DeviceRGB", 1).is_none());
    }

    #[test]
    fn test_raw_image_huge_dimensions() {
        assert!(create_image_from_raw(&[0u8; 12], u32::MAX, u32::MAX, b"DeviceRGB", 8).is_none());
        assert!(create_image_from_raw(&[0u8; 12], u32::MAX, u32::MAX, b"DeviceGray", 8).is_none());
    }
}
