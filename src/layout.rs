//! Overlay placement calculations
//!
//! All coordinates are in PDF points (1/72 inch) with the origin at the
//! bottom-left of the page. Placement is resolved fresh for every page
//! because pages within one document may have different MediaBoxes.
//!
//! Two positioning conventions are in play and each is applied uniformly
//! to its overlay kind:
//! - images anchor their *bounding box* (a top anchor subtracts the scaled
//!   height so the image hangs below the margin line);
//! - text anchors its *baseline* (a top anchor puts the baseline at the
//!   margin line, matching how text drawing operators position glyphs).

use std::str::FromStr;

use crate::error::Error;

/// Distance kept between an overlay and the page edge for non-center anchors.
pub const EDGE_MARGIN: f64 = 50.0;

/// An image overlay is scaled to fit within this fraction of the shorter
/// page edge, preserving aspect ratio.
pub const IMAGE_MAX_PAGE_FRACTION: f64 = 0.5;

/// Width and height in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// US Letter (8.5" x 11")
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// ISO A4 (210mm x 297mm)
    pub fn a4() -> Self {
        Self::new(595.276, 841.89)
    }

    /// US Legal (8.5" x 14")
    pub fn legal() -> Self {
        Self::new(612.0, 1008.0)
    }

    /// Swap width and height.
    pub fn rotated(self) -> Self {
        Self::new(self.height, self.width)
    }

    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// Named position an overlay is anchored to.
///
/// The watermark operation historically exposes five of these and the
/// page-number operation six; the engine accepts the full superset for
/// either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    TopLeft,
    TopRight,
    TopCenter,
    BottomLeft,
    BottomRight,
    BottomCenter,
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::Center
    }
}

impl FromStr for Anchor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "center" => Ok(Anchor::Center),
            "top-left" => Ok(Anchor::TopLeft),
            "top-right" => Ok(Anchor::TopRight),
            "top-center" => Ok(Anchor::TopCenter),
            "bottom-left" => Ok(Anchor::BottomLeft),
            "bottom-right" => Ok(Anchor::BottomRight),
            "bottom-center" => Ok(Anchor::BottomCenter),
            other => Err(Error::InvalidParameter(format!(
                "unknown position '{other}'"
            ))),
        }
    }
}

/// Resolved placement for one overlay on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge (image) or text start (baseline convention), in points.
    pub x: f64,
    /// Bottom edge (image) or baseline (text), in points.
    pub y: f64,
    /// Scaled overlay width.
    pub width: f64,
    /// Scaled overlay height.
    pub height: f64,
    /// Counter-clockwise rotation about the overlay center, in degrees.
    pub rotation: f64,
}

impl Placement {
    /// Shift the placement by the MediaBox origin so drawing coordinates
    /// land inside pages whose box does not start at (0, 0).
    pub fn shifted(mut self, dx: f64, dy: f64) -> Self {
        self.x += dx;
        self.y += dy;
        self
    }

    /// Transformation matrix `[a b c d e f]` rotating the overlay about
    /// its own center, or `None` when no rotation applies.
    ///
    /// Composed as translate(center) * rotate * translate(-center), so the
    /// anchor-derived x/y stay untouched and only the drawn output turns.
    pub fn rotation_matrix(&self) -> Option<[f64; 6]> {
        if self.rotation == 0.0 {
            return None;
        }

        let theta = self.rotation.to_radians();
        let (sin, cos) = theta.sin_cos();
        let cx = self.x + self.width / 2.0;
        let cy = self.y + self.height / 2.0;

        Some([
            cos,
            sin,
            -sin,
            cos,
            cx - cx * cos + cy * sin,
            cy - cx * sin - cy * cos,
        ])
    }
}

/// Resolve the placement of an image overlay with natural pixel size
/// `natural` onto a page of size `page`.
///
/// The image is uniformly scaled to fit within half the shorter page
/// edge, then positioned by its bounding box.
pub fn place_image(natural: Size, page: Size, anchor: Anchor, rotation: f64) -> Placement {
    let max_size = IMAGE_MAX_PAGE_FRACTION * page.width.min(page.height);
    let scale = if natural.width > 0.0 && natural.height > 0.0 {
        (max_size / natural.width).min(max_size / natural.height)
    } else {
        0.0
    };
    let width = natural.width * scale;
    let height = natural.height * scale;

    let x = anchor_x(anchor, page.width, width);
    let y = match anchor {
        Anchor::Center => (page.height - height) / 2.0,
        Anchor::TopLeft | Anchor::TopRight | Anchor::TopCenter => {
            page.height - height - EDGE_MARGIN
        }
        Anchor::BottomLeft | Anchor::BottomRight | Anchor::BottomCenter => EDGE_MARGIN,
    };

    Placement {
        x,
        y,
        width,
        height,
        rotation,
    }
}

/// Resolve the placement of a text overlay whose rendered bounding box is
/// `text_width` x `font_size` points.
///
/// Text draws from its baseline, so top anchors place the baseline at the
/// margin line without subtracting the text height.
pub fn place_text(
    text_width: f64,
    font_size: f64,
    page: Size,
    anchor: Anchor,
    rotation: f64,
) -> Placement {
    let x = anchor_x(anchor, page.width, text_width);
    let y = match anchor {
        Anchor::Center => (page.height - font_size) / 2.0,
        Anchor::TopLeft | Anchor::TopRight | Anchor::TopCenter => page.height - EDGE_MARGIN,
        Anchor::BottomLeft | Anchor::BottomRight | Anchor::BottomCenter => EDGE_MARGIN,
    };

    Placement {
        x,
        y,
        width: text_width,
        height: font_size,
        rotation,
    }
}

fn anchor_x(anchor: Anchor, page_width: f64, overlay_width: f64) -> f64 {
    match anchor {
        Anchor::Center | Anchor::TopCenter | Anchor::BottomCenter => {
            (page_width - overlay_width) / 2.0
        }
        Anchor::TopLeft | Anchor::BottomLeft => EDGE_MARGIN,
        Anchor::TopRight | Anchor::BottomRight => page_width - overlay_width - EDGE_MARGIN,
    }
}
