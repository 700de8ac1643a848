//! Document assembly
//!
//! The three page operations (watermark, rotate, number) share one
//! control shape: walk every page in ascending order exactly once and
//! decide per page between PASSTHROUGH (leave the page untouched) and
//! TRANSFORM (merge an overlay, or bump the rotation attribute). The
//! document is transformed in place, so page count and page order are
//! preserved structurally and pass-through pages keep their exact bytes.
//!
//! The whole output is serialized without a recompression pass; flating
//! untouched streams would change pass-through pages byte-for-byte.

use std::str::FromStr;

use lopdf::{Document, Object};
use tracing::debug;

use crate::error::{Error, Result};
use crate::layout::{self, Anchor, Size};
use crate::numbering::NumberStyle;
use crate::pdf::compose::{self, ContentGuards};
use crate::pdf::font;
use crate::pdf::metadata;
use crate::pdf::overlay::{self, Overlay, Rgb, StampResources};
use crate::range::PageSelection;

/// Options for the watermark operation.
#[derive(Debug, Clone)]
pub struct WatermarkOptions {
    pub overlay: Overlay,
    pub anchor: Anchor,
    /// Rotation about the overlay center, in degrees.
    pub rotation: f64,
    /// Empty selection means every page.
    pub selection: PageSelection,
}

/// Which pages the rotate operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationScope {
    /// Rotate every page; the page range is ignored entirely.
    All,
    /// Rotate only pages named by the range.
    Specific,
}

impl FromStr for RotationScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(RotationScope::All),
            "specific" => Ok(RotationScope::Specific),
            other => Err(Error::InvalidParameter(format!(
                "unknown rotation scope '{other}' (expected all or specific)"
            ))),
        }
    }
}

/// Options for the rotate operation.
#[derive(Debug, Clone)]
pub struct RotateOptions {
    /// Degrees, must be a multiple of 90.
    pub angle: i32,
    pub scope: RotationScope,
    pub selection: PageSelection,
}

/// Options for the page-number operation.
#[derive(Debug, Clone)]
pub struct PageNumberOptions {
    pub style: NumberStyle,
    pub anchor: Anchor,
    pub font_size: f64,
    pub color: Rgb,
    /// Empty selection means every page.
    pub selection: PageSelection,
}

/// What happens to one page during the assembly walk.
enum PageAction {
    /// Leave the page untouched.
    Passthrough,
    /// Merge a synthesized overlay onto the page.
    Stamp(overlay::StampContent),
    /// Add to the page's rotation metadata, in degrees.
    RotateBy(i32),
}

/// Walk every page in ascending order exactly once, applying the action
/// the per-operation strategy picks for it. Returns the number of pages
/// transformed.
///
/// The q/Q guard streams are only added to the document once the first
/// stamp actually lands.
fn transform_pages<F>(doc: &mut Document, mut action_for: F) -> Result<usize>
where
    F: FnMut(&Document, u32, lopdf::ObjectId) -> Result<PageAction>,
{
    let pages = doc.get_pages();
    let mut guards: Option<ContentGuards> = None;
    let mut transformed = 0usize;

    for (page_num, page_id) in pages {
        match action_for(doc, page_num, page_id)? {
            PageAction::Passthrough => {}
            PageAction::Stamp(stamp) => {
                let guards = *guards.get_or_insert_with(|| ContentGuards::add_to(doc));
                compose::merge_stamp(doc, page_id, &stamp, guards)?;
                transformed += 1;
            }
            PageAction::RotateBy(angle) => {
                let existing = metadata::page_rotation(doc, page_id);
                let new_rotation = (existing + angle).rem_euclid(360);
                let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
                page_dict.set("Rotate", Object::Integer(i64::from(new_rotation)));
                transformed += 1;
            }
        }
    }

    Ok(transformed)
}

/// Stamp a text or image watermark onto the selected pages.
pub fn add_watermark(input: &[u8], options: &WatermarkOptions) -> Result<Vec<u8>> {
    let mut doc = load(input)?;
    let resources = StampResources::prepare(&mut doc, &options.overlay)?;
    let natural_image = resources.image_size();

    let stamped = transform_pages(&mut doc, |doc, page_num, page_id| {
        if !options.selection.is_empty() && !options.selection.contains(page_num) {
            return Ok(PageAction::Passthrough);
        }

        let media_box = metadata::media_box(doc, page_id)?;
        let page_size = media_box.size();

        let placement = match &options.overlay {
            Overlay::Text {
                text, font_size, ..
            } => layout::place_text(
                font::text_width(text, *font_size),
                *font_size,
                page_size,
                options.anchor,
                options.rotation,
            ),
            Overlay::Image { .. } => layout::place_image(
                natural_image.unwrap_or(Size::new(0.0, 0.0)),
                page_size,
                options.anchor,
                options.rotation,
            ),
        }
        .shifted(media_box.x, media_box.y);

        Ok(PageAction::Stamp(overlay::synthesize(
            &resources,
            &options.overlay,
            &placement,
        )))
    })?;

    debug!(stamped, "watermark applied");
    save(doc)
}

/// Adjust the /Rotate attribute of the selected pages.
///
/// Rotation is additive on top of any rotation a page already carries and
/// normalized into 0..360. No overlay is synthesized and page content is
/// never touched.
pub fn rotate_pages(input: &[u8], options: &RotateOptions) -> Result<Vec<u8>> {
    if options.angle % 90 != 0 {
        return Err(Error::InvalidParameter(format!(
            "rotation angle {} is not a multiple of 90",
            options.angle
        )));
    }

    let mut doc = load(input)?;

    // A full-turn angle leaves every page's metadata exactly as it was.
    if options.angle.rem_euclid(360) == 0 {
        return save(doc);
    }

    let rotated = transform_pages(&mut doc, |_, page_num, _| {
        let selected = match options.scope {
            RotationScope::All => true,
            RotationScope::Specific => options.selection.contains(page_num),
        };
        Ok(if selected {
            PageAction::RotateBy(options.angle)
        } else {
            PageAction::Passthrough
        })
    })?;

    debug!(rotated, angle = options.angle, "pages rotated");
    save(doc)
}

/// Draw a page-number label in the body of the selected pages.
///
/// Each page is labeled with its own 1-based index rendered in the chosen
/// style, regardless of how many pages the selection skips.
pub fn add_page_numbers(input: &[u8], options: &PageNumberOptions) -> Result<Vec<u8>> {
    let mut doc = load(input)?;

    // All labels share the same font and are fully opaque, so the
    // resources can be prepared once from a prototype overlay.
    let prototype = Overlay::Text {
        text: String::new(),
        font_size: options.font_size,
        color: options.color,
        opacity: 1.0,
    };
    let resources = StampResources::prepare(&mut doc, &prototype)?;

    let numbered = transform_pages(&mut doc, |doc, page_num, page_id| {
        if !options.selection.is_empty() && !options.selection.contains(page_num) {
            return Ok(PageAction::Passthrough);
        }

        let label = options.style.format(page_num);
        let label_overlay = Overlay::Text {
            text: label.clone(),
            font_size: options.font_size,
            color: options.color,
            opacity: 1.0,
        };

        let media_box = metadata::media_box(doc, page_id)?;
        let placement = layout::place_text(
            font::text_width(&label, options.font_size),
            options.font_size,
            media_box.size(),
            options.anchor,
            0.0,
        )
        .shifted(media_box.x, media_box.y);

        Ok(PageAction::Stamp(overlay::synthesize(
            &resources,
            &label_overlay,
            &placement,
        )))
    })?;

    debug!(numbered, "page numbers applied");
    save(doc)
}

fn load(input: &[u8]) -> Result<Document> {
    Document::load_mem(input)
        .map_err(|e| Error::ConversionFailed(format!("input is not a readable PDF: {e}")))
}

fn save(mut doc: Document) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    doc.save_to(&mut output)?;
    Ok(output)
}
