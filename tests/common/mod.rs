#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};

/// Build an in-memory PDF with `pages` A4 pages, each labelled with its index.
pub fn sample_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let mut kids = Vec::new();
    for index in 0..pages {
        let content = format!("BT /F1 24 Tf 72 720 Td (Page {}) Tj ET", index + 1);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(pages as i64),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize sample pdf");
    bytes
}

/// `/Rotate` of every page in document order, 0 when absent.
pub fn page_rotations(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).expect("parse pdf");
    doc.get_pages()
        .values()
        .map(|page_id| {
            doc.get_dictionary(*page_id)
                .ok()
                .and_then(|page| page.get(b"Rotate").ok())
                .and_then(|rotate| rotate.as_i64().ok())
                .unwrap_or(0)
        })
        .collect()
}

/// Text content stream of every page in document order.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("parse pdf");
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = doc.get_page_content(*page_id).expect("page content");
            String::from_utf8_lossy(&content).into_owned()
        })
        .collect()
}
