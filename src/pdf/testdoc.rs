//! Synthetic PDF builders for tests

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// Build a Letter-sized PDF with one page per entry in `texts`, each page
/// drawing its text in Helvetica.
pub fn pdf_with_pages(texts: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources = dictionary! {
        "Font" => Object::Dictionary(dictionary! {
            "F1" => Object::Reference(font_id),
        }),
    };

    let mut kids = Vec::with_capacity(texts.len());
    for text in texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().expect("encode test content"),
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Dictionary(resources.clone()),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
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

    let mut output = Vec::new();
    doc.save_to(&mut output).expect("serialize test PDF");
    output
}

/// Concatenated content-stream bytes of a 1-based page.
pub fn page_content_bytes(doc: &Document, page_num: u32) -> Vec<u8> {
    let pages = doc.get_pages();
    let page_id = pages[&page_num];
    let page = doc
        .get_object(page_id)
        .and_then(|obj| obj.as_dict())
        .expect("page dictionary");

    let content_ids: Vec<lopdf::ObjectId> = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => vec![*id],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|obj| match obj {
                Object::Reference(id) => Some(*id),
                _ => None,
            })
            .collect(),
        _ => vec![],
    };

    let mut bytes = Vec::new();
    for content_id in content_ids {
        if let Ok(Object::Stream(stream)) = doc.get_object(content_id) {
            bytes.extend_from_slice(&stream.content);
        }
    }
    bytes
}
