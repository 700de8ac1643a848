//! Image-to-PDF packing
//!
//! Builds a fresh document with one page per uploaded image. Each image
//! is scaled to fit its page while preserving aspect ratio and drawn
//! centered. Page size comes from a preset (or from the image itself in
//! `fit` mode) and the orientation can follow each image's shape.

use std::str::FromStr;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use tracing::debug;

use crate::error::{Error, Result};
use crate::layout::Size;
use crate::pdf::overlay::embed_image;

/// Output page size for packed images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSizePreset {
    A4,
    Letter,
    Legal,
    /// Page matches each image's natural size.
    Fit,
}

impl Default for PageSizePreset {
    fn default() -> Self {
        PageSizePreset::A4
    }
}

impl FromStr for PageSizePreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "a4" => Ok(PageSizePreset::A4),
            "letter" => Ok(PageSizePreset::Letter),
            "legal" => Ok(PageSizePreset::Legal),
            "fit" => Ok(PageSizePreset::Fit),
            other => Err(Error::InvalidParameter(format!(
                "unknown page size '{other}' (expected a4, letter, legal, or fit)"
            ))),
        }
    }
}

/// Page orientation for packed images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Follow each image: landscape images get landscape pages.
    Auto,
    Portrait,
    Landscape,
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::Auto
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Orientation::Auto),
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            other => Err(Error::InvalidParameter(format!(
                "unknown orientation '{other}' (expected auto, portrait, or landscape)"
            ))),
        }
    }
}

/// Options for packing images into a PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackOptions {
    pub page_size: PageSizePreset,
    pub orientation: Orientation,
}

/// Pack the uploaded images into a PDF, one page per image, in upload
/// order.
pub fn images_to_pdf(images: &[Vec<u8>], options: &PackOptions) -> Result<Vec<u8>> {
    if images.is_empty() {
        return Err(Error::MissingInput("no images provided".to_string()));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(images.len());
    for data in images {
        let (image_id, natural) = embed_image(&mut doc, data)?;
        let page_size = page_size_for(natural, options);

        // Scale to fit the page, keep aspect ratio, center.
        let scale = if natural.width > 0.0 && natural.height > 0.0 {
            (page_size.width / natural.width).min(page_size.height / natural.height)
        } else {
            0.0
        };
        let width = natural.width * scale;
        let height = natural.height * scale;
        let x = (page_size.width - width) / 2.0;
        let y = (page_size.height - height) / 2.0;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width.into(),
                        0.into(),
                        0.into(),
                        height.into(),
                        x.into(),
                        y.into(),
                    ],
                ),
                Operation::new("Do", vec!["PpImg".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content
                .encode()
                .map_err(|e| Error::ConversionFailed(format!("page content encoding: {e}")))?,
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Dictionary(dictionary! {
                "XObject" => Object::Dictionary(dictionary! {
                    "PpImg" => Object::Reference(image_id),
                }),
            }),
            "MediaBox" => vec![
                0.into(),
                0.into(),
                page_size.width.into(),
                page_size.height.into(),
            ],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    debug!(pages = images.len(), "images packed");

    let mut output = Vec::new();
    doc.save_to(&mut output)?;
    Ok(output)
}

fn page_size_for(natural: Size, options: &PackOptions) -> Size {
    if options.page_size == PageSizePreset::Fit {
        return natural;
    }

    let base = match options.page_size {
        PageSizePreset::A4 => Size::a4(),
        PageSizePreset::Letter => Size::letter(),
        PageSizePreset::Legal => Size::legal(),
        PageSizePreset::Fit => unreachable!("handled above"),
    };

    match options.orientation {
        Orientation::Auto => {
            if natural.is_landscape() != base.is_landscape() {
                base.rotated()
            } else {
                base
            }
        }
        Orientation::Landscape if !base.is_landscape() => base.rotated(),
        Orientation::Portrait if base.is_landscape() => base.rotated(),
        _ => base,
    }
}
