//! Page compositing
//!
//! Merges a synthesized overlay onto an existing page: the overlay's
//! content stream is appended after the page's own content so it draws on
//! top, and the overlay's resources are unioned into the page's Resources
//! dictionary. Page dimensions, /Rotate, and every other attribute are
//! left alone.
//!
//! The original content is bracketed with shared `q`/`Q` streams first.
//! Content streams may end with unbalanced graphics-state or text
//! operators, and without the bracket a stray transform would relocate
//! the overlay.
//!
//! Merging is not idempotent: stamping a page twice stacks two overlays.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::Result;
use crate::pdf::overlay::StampContent;

/// Shared single-operator streams used to bracket original page content.
#[derive(Debug, Clone, Copy)]
pub struct ContentGuards {
    push: ObjectId,
    pop: ObjectId,
}

impl ContentGuards {
    /// Add the two guard streams to the document once; every stamped page
    /// references the same pair.
    pub fn add_to(doc: &mut Document) -> Self {
        let push = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let pop = doc.add_object(Stream::new(Dictionary::new(), b"Q\n".to_vec()));
        Self { push, pop }
    }
}

/// Merge a synthesized overlay onto `page_id`.
pub fn merge_stamp(
    doc: &mut Document,
    page_id: ObjectId,
    stamp: &StampContent,
    guards: ContentGuards,
) -> Result<()> {
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), stamp.content.clone()));

    append_overlay_content(doc, page_id, guards, overlay_id)?;
    merge_resources(doc, page_id, stamp)?;

    Ok(())
}

/// Rewrite the page's Contents so the original streams are bracketed and
/// the overlay stream comes last.
fn append_overlay_content(
    doc: &mut Document,
    page_id: ObjectId,
    guards: ContentGuards,
    overlay_id: ObjectId,
) -> Result<()> {
    let page_obj = doc.get_object_mut(page_id)?;
    let page_dict = page_obj.as_dict_mut()?;

    let existing = page_dict.get(b"Contents").ok().cloned();
    let new_contents = match existing {
        Some(Object::Reference(content_id)) => vec![
            Object::Reference(guards.push),
            Object::Reference(content_id),
            Object::Reference(guards.pop),
            Object::Reference(overlay_id),
        ],
        Some(Object::Array(content_array)) => {
            let mut contents = Vec::with_capacity(content_array.len() + 3);
            contents.push(Object::Reference(guards.push));
            contents.extend(content_array);
            contents.push(Object::Reference(guards.pop));
            contents.push(Object::Reference(overlay_id));
            contents
        }
        // No existing content: the overlay is the page.
        _ => vec![Object::Reference(overlay_id)],
    };
    page_dict.set("Contents", Object::Array(new_contents));

    Ok(())
}

/// Union the overlay's resource entries into the page's Resources,
/// preserving everything the page already references.
fn merge_resources(doc: &mut Document, page_id: ObjectId, stamp: &StampContent) -> Result<()> {
    // Resolve the Resources dictionary first (it may live behind a
    // reference shared by several pages, so the merged copy is written
    // inline on this page only).
    let mut resources = {
        let page_obj = doc.get_object(page_id)?;
        let page_dict = page_obj.as_dict()?;
        match page_dict.get(b"Resources") {
            Ok(obj) => resolve_dict(doc, obj),
            Err(_) => Dictionary::new(),
        }
    };

    for entry in &stamp.resources {
        let mut category = match resources.get(entry.category.as_bytes()) {
            Ok(obj) => resolve_dict(doc, obj),
            Err(_) => Dictionary::new(),
        };
        category.set(entry.name, Object::Reference(entry.id));
        resources.set(entry.category, Object::Dictionary(category));
    }

    let page_obj = doc.get_object_mut(page_id)?;
    let page_dict = page_obj.as_dict_mut()?;
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(())
}

/// Clone a dictionary-valued object, following one level of indirection.
fn resolve_dict(doc: &Document, obj: &Object) -> Dictionary {
    match obj {
        Object::Dictionary(dict) => dict.clone(),
        Object::Reference(ref_id) => match doc.get_object(*ref_id) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        },
        _ => Dictionary::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::overlay::ResourceEntry;
    use lopdf::dictionary;

    fn doc_with_page(resources: Option<Dictionary>) -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        if let Some(resources) = resources {
            page.set("Resources", Object::Dictionary(resources));
        }
        let page_id = doc.add_object(page);

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        (doc, page_id)
    }

    fn stamp_with(resources: Vec<ResourceEntry>) -> StampContent {
        StampContent {
            content: b"1 0 0 rg\n".to_vec(),
            resources,
        }
    }

    #[test]
    fn test_single_content_reference_becomes_guarded_array() {
        let (mut doc, page_id) = doc_with_page(None);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"0 g\n".to_vec()));
        {
            let page = doc.get_object_mut(page_id).unwrap().as_dict_mut().unwrap();
            page.set("Contents", Object::Reference(content_id));
        }

        let guards = ContentGuards::add_to(&mut doc);
        merge_stamp(&mut doc, page_id, &stamp_with(vec![]), guards).unwrap();

        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let contents = page.get(b"Contents").unwrap();
        match contents {
            Object::Array(arr) => {
                assert_eq!(arr.len(), 4);
                assert_eq!(arr[1], Object::Reference(content_id));
            }
            other => panic!("expected Contents array, got {other:?}"),
        }
    }

    #[test]
    fn test_page_without_content_gets_overlay_only() {
        let (mut doc, page_id) = doc_with_page(None);
        let guards = ContentGuards::add_to(&mut doc);
        merge_stamp(&mut doc, page_id, &stamp_with(vec![]), guards).unwrap();

        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        match page.get(b"Contents").unwrap() {
            Object::Array(arr) => assert_eq!(arr.len(), 1),
            other => panic!("expected Contents array, got {other:?}"),
        }
    }

    #[test]
    fn test_existing_resources_survive_merge() {
        let resources = dictionary! {
            "Font" => Object::Dictionary(dictionary! {
                "F1" => Object::Reference((90, 0)),
            }),
            "ProcSet" => vec![Object::Name(b"PDF".to_vec())],
        };

        let (mut doc, page_id) = doc_with_page(Some(resources));
        let guards = ContentGuards::add_to(&mut doc);
        let font_id = doc.add_object(dictionary! { "Type" => "Font" });
        let stamp = stamp_with(vec![ResourceEntry {
            category: "Font",
            name: "PpFont",
            id: font_id,
        }]);

        merge_stamp(&mut doc, page_id, &stamp, guards).unwrap();

        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.get(b"F1").is_ok(), "source font must survive");
        assert!(fonts.get(b"PpFont").is_ok(), "overlay font must be added");
        assert!(resources.get(b"ProcSet").is_ok(), "unrelated entries survive");
    }

    #[test]
    fn test_merge_preserves_page_attributes() {
        let (mut doc, page_id) = doc_with_page(None);
        {
            let page = doc.get_object_mut(page_id).unwrap().as_dict_mut().unwrap();
            page.set("Rotate", Object::Integer(90));
        }

        let guards = ContentGuards::add_to(&mut doc);
        merge_stamp(&mut doc, page_id, &stamp_with(vec![]), guards).unwrap();

        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        assert_eq!(page.get(b"Rotate").unwrap().as_i64().unwrap(), 90);
        let media_box = page.get(b"MediaBox").unwrap();
        assert!(matches!(media_box, Object::Array(arr) if arr.len() == 4));
    }
}
