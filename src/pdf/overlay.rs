//! Overlay synthesis
//!
//! An overlay is an ephemeral single-element drawing (a text run or a
//! raster image) rendered into a content stream sized for one specific
//! page. Synthesis produces only the stream bytes and the resource
//! entries the stream references; compositing them onto a page is the
//! compositor's job, so a synthesized overlay never mutates the source
//! document's pages.

use std::fmt::Write as _;
use std::io::Write as _;

use image::GenericImageView;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::layout::{Placement, Size};
use crate::pdf::font;

/// Resource names the synthesized streams refer to. Deliberately unusual
/// so they do not collide with names already present on source pages.
const FONT_NAME: &str = "PpFont";
const GSTATE_NAME: &str = "PpGS";
const IMAGE_NAME: &str = "PpImg";

/// An RGB color with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parse a `#RRGGBB` (or bare `RRGGBB`) hex color.
    pub fn parse_hex(color: &str) -> Result<Self> {
        let hex = color.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidParameter(format!(
                "'{color}' is not a #RRGGBB color"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            f64::from(u8::from_str_radix(&hex[range], 16).unwrap_or(0)) / 255.0
        };
        Ok(Rgb {
            r: channel(0..2),
            g: channel(2..4),
            b: channel(4..6),
        })
    }
}

/// The content stamped onto selected pages.
#[derive(Debug, Clone)]
pub enum Overlay {
    Text {
        text: String,
        font_size: f64,
        color: Rgb,
        /// Fill alpha in 0..=1.
        opacity: f64,
    },
    Image {
        data: Vec<u8>,
        /// Compositing alpha in 0..=1.
        opacity: f64,
    },
}

impl Overlay {
    fn opacity(&self) -> f64 {
        match self {
            Overlay::Text { opacity, .. } | Overlay::Image { opacity, .. } => *opacity,
        }
    }
}

/// A named resource a synthesized stream refers to, destined for the
/// target page's Resources dictionary.
#[derive(Debug, Clone, Copy)]
pub struct ResourceEntry {
    /// Resources sub-dictionary (`Font`, `ExtGState`, `XObject`).
    pub category: &'static str,
    /// Name the content stream uses.
    pub name: &'static str,
    pub id: ObjectId,
}

/// Document-level objects shared by every page an overlay is stamped on.
///
/// Created once per operation: the font, image XObject, and graphics
/// state are added to the output document a single time and referenced
/// from each stamped page.
#[derive(Debug)]
pub struct StampResources {
    font_id: Option<ObjectId>,
    gstate_id: Option<ObjectId>,
    image: Option<(ObjectId, Size)>,
}

impl StampResources {
    pub fn prepare(doc: &mut Document, overlay: &Overlay) -> Result<Self> {
        let gstate_id = if overlay.opacity() < 1.0 {
            Some(add_alpha_gstate(doc, overlay.opacity()))
        } else {
            None
        };

        match overlay {
            Overlay::Text { .. } => Ok(Self {
                font_id: Some(font::add_helvetica(doc)),
                gstate_id,
                image: None,
            }),
            Overlay::Image { data, .. } => {
                let (image_id, natural) = embed_image(doc, data)?;
                Ok(Self {
                    font_id: None,
                    gstate_id,
                    image: Some((image_id, natural)),
                })
            }
        }
    }

    /// Natural pixel size of the prepared image overlay, if any.
    pub fn image_size(&self) -> Option<Size> {
        self.image.map(|(_, size)| size)
    }
}

/// A rendered overlay: content stream bytes plus the resources they use.
#[derive(Debug)]
pub struct StampContent {
    pub content: Vec<u8>,
    pub resources: Vec<ResourceEntry>,
}

/// Render `overlay` at `placement` into a standalone content stream.
pub fn synthesize(
    resources: &StampResources,
    overlay: &Overlay,
    placement: &Placement,
) -> StampContent {
    let mut ops = String::new();
    let mut entries = Vec::new();

    ops.push_str("q\n");

    if let Some(gstate_id) = resources.gstate_id {
        let _ = writeln!(ops, "/{GSTATE_NAME} gs");
        entries.push(ResourceEntry {
            category: "ExtGState",
            name: GSTATE_NAME,
            id: gstate_id,
        });
    }

    if let Some(matrix) = placement.rotation_matrix() {
        let _ = writeln!(
            ops,
            "{} {} {} {} {} {} cm",
            fmt(matrix[0]),
            fmt(matrix[1]),
            fmt(matrix[2]),
            fmt(matrix[3]),
            fmt(matrix[4]),
            fmt(matrix[5])
        );
    }

    match overlay {
        Overlay::Text {
            text,
            font_size,
            color,
            ..
        } => {
            let font_id = resources.font_id.expect("text overlay has a font");
            entries.push(ResourceEntry {
                category: "Font",
                name: FONT_NAME,
                id: font_id,
            });

            let _ = writeln!(ops, "{} {} {} rg", fmt(color.r), fmt(color.g), fmt(color.b));
            ops.push_str("BT\n");
            let _ = writeln!(ops, "/{FONT_NAME} {} Tf", fmt(*font_size));
            let _ = writeln!(ops, "{} {} Td", fmt(placement.x), fmt(placement.y));
            let _ = writeln!(ops, "({}) Tj", font::escape_pdf_string(text));
            ops.push_str("ET\n");
        }
        Overlay::Image { .. } => {
            let (image_id, _) = resources.image.expect("image overlay has an XObject");
            entries.push(ResourceEntry {
                category: "XObject",
                name: IMAGE_NAME,
                id: image_id,
            });

            // Image XObjects draw into the unit square; scale and move it
            // into the placement box.
            let _ = writeln!(
                ops,
                "{} 0 0 {} {} {} cm",
                fmt(placement.width),
                fmt(placement.height),
                fmt(placement.x),
                fmt(placement.y)
            );
            let _ = writeln!(ops, "/{IMAGE_NAME} Do");
        }
    }

    ops.push_str("Q\n");

    StampContent {
        content: ops.into_bytes(),
        resources: entries,
    }
}

/// Format a coordinate with enough precision for print geometry without
/// dragging float noise into the stream.
fn fmt(v: f64) -> String {
    let rounded = (v * 10000.0).round() / 10000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

fn add_alpha_gstate(doc: &mut Document, opacity: f64) -> ObjectId {
    let mut gstate = Dictionary::new();
    gstate.set("Type", Object::Name(b"ExtGState".to_vec()));
    gstate.set("BM", Object::Name(b"Normal".to_vec()));
    gstate.set("ca", Object::Real(opacity as f32));
    gstate.set("CA", Object::Real(opacity as f32));
    doc.add_object(Object::Dictionary(gstate))
}

/// Embed an uploaded raster image as an image XObject, returning its
/// object id and natural pixel size.
///
/// JPEG uploads keep their compressed bytes (DCTDecode); anything else is
/// stored as zlib-compressed RGB with the alpha channel split into an
/// SMask when one is present.
pub(crate) fn embed_image(doc: &mut Document, data: &[u8]) -> Result<(ObjectId, Size)> {
    let format = image::guess_format(data)
        .map_err(|e| Error::InvalidParameter(format!("unrecognized watermark image: {e}")))?;
    let img = image::load_from_memory(data)
        .map_err(|e| Error::InvalidParameter(format!("watermark image could not be decoded: {e}")))?;
    let (width, height) = img.dimensions();

    let image_id = if format == image::ImageFormat::Jpeg {
        let color_space: &[u8] = match img.color() {
            image::ColorType::L8 | image::ColorType::L16 => b"DeviceGray",
            _ => b"DeviceRGB",
        };

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", Object::Integer(i64::from(width)));
        dict.set("Height", Object::Integer(i64::from(height)));
        dict.set("ColorSpace", Object::Name(color_space.to_vec()));
        dict.set("BitsPerComponent", Object::Integer(8));
        dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));

        let mut stream = Stream::new(dict, data.to_vec());
        stream.allows_compression = false;
        doc.add_object(Object::Stream(stream))
    } else {
        let rgba = img.to_rgba8();
        let pixel_count = width as usize * height as usize;
        let mut rgb_data = Vec::with_capacity(pixel_count * 3);
        let mut alpha_data = Vec::with_capacity(pixel_count);
        for pixel in rgba.pixels() {
            rgb_data.extend_from_slice(&pixel.0[..3]);
            alpha_data.push(pixel.0[3]);
        }

        let smask_id = if alpha_data.iter().any(|&a| a < 255) {
            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"XObject".to_vec()));
            dict.set("Subtype", Object::Name(b"Image".to_vec()));
            dict.set("Width", Object::Integer(i64::from(width)));
            dict.set("Height", Object::Integer(i64::from(height)));
            dict.set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
            dict.set("BitsPerComponent", Object::Integer(8));
            dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));

            let mut stream = Stream::new(dict, compress(&alpha_data)?);
            stream.allows_compression = false;
            Some(doc.add_object(Object::Stream(stream)))
        } else {
            None
        };

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", Object::Integer(i64::from(width)));
        dict.set("Height", Object::Integer(i64::from(height)));
        dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
        dict.set("BitsPerComponent", Object::Integer(8));
        dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
        if let Some(smask_id) = smask_id {
            dict.set("SMask", Object::Reference(smask_id));
        }

        let mut stream = Stream::new(dict, compress(&rgb_data)?);
        stream.allows_compression = false;
        doc.add_object(Object::Stream(stream))
    };

    Ok((image_id, Size::new(f64::from(width), f64::from(height))))
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
