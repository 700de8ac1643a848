//! Page-tree inspection helpers
//!
//! MediaBox and /Rotate are inheritable page attributes: they may sit on
//! the page itself or anywhere up the Pages tree. Lookups here walk the
//! Parent chain with a depth limit so malformed documents cannot recurse
//! forever.

use lopdf::{Document, Object};

use crate::error::{Error, Result};
use crate::layout::Size;

/// How far up the Pages tree an inherited attribute is searched.
const MAX_TREE_DEPTH: usize = 10;

/// A page's physical box in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MediaBox {
    /// US Letter, the fallback when a document carries no usable MediaBox.
    pub fn letter() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 612.0,
            height: 792.0,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Count pages by reading the Count field from the Pages dictionary.
/// This is more reliable than `get_pages()` for nested page trees.
pub fn count_pages(doc: &Document) -> Result<usize> {
    let catalog_ref = doc
        .trailer
        .get(b"Root")
        .map_err(|_| Error::ConversionFailed("no Root in trailer".to_string()))?;

    let catalog_id = match catalog_ref {
        Object::Reference(id) => *id,
        _ => return Err(Error::ConversionFailed("Root is not a reference".to_string())),
    };

    let catalog = doc.get_object(catalog_id)?;
    let catalog_dict = match catalog {
        Object::Dictionary(dict) => dict,
        _ => return Err(Error::ConversionFailed("Catalog is not a dictionary".to_string())),
    };

    let pages_ref = catalog_dict
        .get(b"Pages")
        .map_err(|_| Error::ConversionFailed("no Pages in catalog".to_string()))?;

    let pages_id = match pages_ref {
        Object::Reference(id) => *id,
        _ => return Err(Error::ConversionFailed("Pages is not a reference".to_string())),
    };

    let pages_obj = doc.get_object(pages_id)?;
    let pages_dict = match pages_obj {
        Object::Dictionary(dict) => dict,
        _ => return Err(Error::ConversionFailed("Pages is not a dictionary".to_string())),
    };

    let count = pages_dict
        .get(b"Count")
        .map_err(|_| Error::ConversionFailed("no Count in Pages".to_string()))?;

    match count {
        Object::Integer(n) => Ok(*n as usize),
        _ => Err(Error::ConversionFailed("Count is not an integer".to_string())),
    }
}

/// Resolve a page's MediaBox, following indirect references and walking up
/// the Pages tree when the page itself omits it. Falls back to US Letter.
pub fn media_box(doc: &Document, page_id: lopdf::ObjectId) -> Result<MediaBox> {
    let page_obj = doc.get_object(page_id)?;
    Ok(media_box_recursive(doc, page_obj, MAX_TREE_DEPTH))
}

fn media_box_recursive(doc: &Document, page_obj: &Object, depth: usize) -> MediaBox {
    if depth == 0 {
        return MediaBox::letter();
    }

    if let Object::Dictionary(dict) = page_obj {
        if let Ok(media_box_obj) = dict.get(b"MediaBox") {
            let arr = match media_box_obj {
                Object::Array(arr) => Some(arr),
                Object::Reference(ref_id) => match doc.get_object(*ref_id) {
                    Ok(Object::Array(arr)) => Some(arr),
                    _ => None,
                },
                _ => None,
            };

            if let Some(arr) = arr {
                let values: Vec<f64> = arr
                    .iter()
                    .filter_map(|o| match o {
                        Object::Integer(i) => Some(*i as f64),
                        Object::Real(r) => Some(f64::from(*r)),
                        _ => None,
                    })
                    .collect();

                if values.len() == 4 {
                    return MediaBox {
                        x: values[0],
                        y: values[1],
                        width: values[2] - values[0],
                        height: values[3] - values[1],
                    };
                }
            }
        }

        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
            if let Ok(parent) = doc.get_object(*parent_id) {
                return media_box_recursive(doc, parent, depth - 1);
            }
        }
    }

    MediaBox::letter()
}

/// Read a page's effective /Rotate value, searching the Parent chain for
/// an inherited one. Absent or malformed values count as 0.
pub fn page_rotation(doc: &Document, page_id: lopdf::ObjectId) -> i32 {
    let mut current = doc.get_object(page_id).ok();
    let mut depth = MAX_TREE_DEPTH;

    while let Some(Object::Dictionary(dict)) = current {
        if let Ok(rotate) = dict.get(b"Rotate") {
            if let Ok(value) = rotate.as_i64() {
                return value as i32;
            }
        }

        if depth == 0 {
            break;
        }
        depth -= 1;

        current = match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => doc.get_object(*parent_id).ok(),
            _ => None,
        };
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object};

    fn minimal_doc(media_box: Option<Vec<Object>>, rotate: Option<i64>) -> (Document, lopdf::ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
        };
        if let Some(mb) = media_box {
            page.set("MediaBox", Object::Array(mb));
        }
        if let Some(r) = rotate {
            page.set("Rotate", Object::Integer(r));
        }
        let page_id = doc.add_object(page);

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        (doc, page_id)
    }

    #[test]
    fn test_count_pages() {
        let (doc, _) = minimal_doc(None, None);
        assert_eq!(count_pages(&doc).unwrap(), 1);
    }

    #[test]
    fn test_media_box_from_page() {
        let mb = vec![0.into(), 0.into(), 595.into(), 842.into()];
        let (doc, page_id) = minimal_doc(Some(mb), None);
        let resolved = media_box(&doc, page_id).unwrap();
        assert_eq!(resolved.width, 595.0);
        assert_eq!(resolved.height, 842.0);
    }

    #[test]
    fn test_media_box_defaults_to_letter() {
        let (doc, page_id) = minimal_doc(None, None);
        let resolved = media_box(&doc, page_id).unwrap();
        assert_eq!(resolved.width, 612.0);
        assert_eq!(resolved.height, 792.0);
    }

    #[test]
    fn test_media_box_with_offset_origin() {
        let mb = vec![10.into(), 20.into(), 622.into(), 812.into()];
        let (doc, page_id) = minimal_doc(Some(mb), None);
        let resolved = media_box(&doc, page_id).unwrap();
        assert_eq!(resolved.x, 10.0);
        assert_eq!(resolved.y, 20.0);
        assert_eq!(resolved.width, 612.0);
        assert_eq!(resolved.height, 792.0);
    }

    #[test]
    fn test_rotation_defaults_to_zero() {
        let (doc, page_id) = minimal_doc(None, None);
        assert_eq!(page_rotation(&doc, page_id), 0);
    }

    #[test]
    fn test_rotation_read_from_page() {
        let (doc, page_id) = minimal_doc(None, Some(270));
        assert_eq!(page_rotation(&doc, page_id), 270);
    }
}
