//! Page-level PDF customization.
//!
//! A transform repeats the source page sequence `copies` times and optionally rotates every
//! output page a quarter turn clockwise. Output pages are fresh page objects hung directly off
//! the root page tree node, so inheritable attributes are resolved onto each page first.
//! Annotations are cloned per output page so each copy owns its own `/Annots` entries.
//! Outline entries and named destinations keep pointing at the source pages.

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed documents.
const MAX_TREE_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to parse PDF: {0}")]
    Parse(#[source] lopdf::Error),
    #[error("PDF contains no pages")]
    NoPages,
    #[error("copies must be at least 1, got {0}")]
    InvalidCopies(u32),
    #[error("malformed PDF structure: {0}")]
    Malformed(String),
    #[error("PDF object error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("failed to serialize PDF: {0}")]
    Write(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Page orientation requested for the derived document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Interpret a submitted form value. Only the exact literal `landscape` opts into rotation.
    pub fn from_form_value(value: &str) -> Self {
        if value == "landscape" {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// Clockwise rotation applied to each output page, in degrees.
    pub fn rotation_degrees(self) -> i64 {
        match self {
            Orientation::Portrait => 0,
            Orientation::Landscape => 90,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
        }
    }
}

/// Transformation parameters for a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRequest {
    pub orientation: Orientation,
    pub copies: u32,
}

impl Default for TransformRequest {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            copies: 1,
        }
    }
}

/// Result of a successful transform.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub bytes: Vec<u8>,
    pub source_pages: usize,
    pub output_pages: usize,
}

/// Build the derived document for `source`.
pub fn transform(
    source: &[u8],
    request: &TransformRequest,
) -> Result<TransformOutput, TransformError> {
    if request.copies == 0 {
        return Err(TransformError::InvalidCopies(request.copies));
    }

    let mut document = Document::load_mem(source).map_err(TransformError::Parse)?;
    let source_pages: Vec<ObjectId> = document.get_pages().into_values().collect();
    if source_pages.is_empty() {
        return Err(TransformError::NoPages);
    }

    let pages_root = pages_root_id(&document)?;
    let templates = source_pages
        .iter()
        .map(|page_id| flattened_page(&document, *page_id))
        .collect::<Result<Vec<_>, _>>()?;

    let rotation = request.orientation.rotation_degrees();
    let mut kids = Vec::with_capacity(templates.len() * request.copies as usize);
    for _ in 0..request.copies {
        for template in &templates {
            let page_id = document.new_object_id();
            let mut page = template.clone();
            page.set("Parent", Object::Reference(pages_root));
            if rotation != 0 {
                let rotated = (page_rotation(&page) + rotation).rem_euclid(360);
                page.set("Rotate", Object::Integer(rotated));
            }
            if let Ok(annots) = template.get(b"Annots") {
                let annots = clone_annotations(&mut document, annots, page_id);
                page.set("Annots", annots);
            }
            document.objects.insert(page_id, Object::Dictionary(page));
            kids.push(Object::Reference(page_id));
        }
    }

    let output_pages = kids.len();
    let root = document.get_object_mut(pages_root)?.as_dict_mut()?;
    root.set("Kids", Object::Array(kids));
    root.set("Count", Object::Integer(output_pages as i64));
    document.prune_objects();

    let mut bytes = Vec::new();
    document
        .save_to(&mut bytes)
        .map_err(|err| TransformError::Write(err.to_string()))?;

    Ok(TransformOutput {
        bytes,
        source_pages: source_pages.len(),
        output_pages,
    })
}

/// Transform the file at `source` and write the result to `destination`.
///
/// An existing file at `destination` is removed first; the last write wins.
pub fn customize_file(
    source: &Path,
    destination: &Path,
    request: &TransformRequest,
) -> Result<TransformOutput, TransformError> {
    let input = fs::read(source)?;
    let output = transform(&input, request)?;
    if destination.exists() {
        fs::remove_file(destination)?;
    }
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(destination, &output.bytes)?;
    Ok(output)
}

/// Number of pages in an encoded PDF.
pub fn page_count(bytes: &[u8]) -> Result<usize, TransformError> {
    let document = Document::load_mem(bytes).map_err(TransformError::Parse)?;
    Ok(document.get_pages().len())
}

fn pages_root_id(document: &Document) -> Result<ObjectId, TransformError> {
    document
        .catalog()?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| TransformError::Malformed("catalog has no /Pages reference".to_string()))
}

fn flattened_page(document: &Document, page_id: ObjectId) -> Result<Dictionary, TransformError> {
    let mut page = document.get_dictionary(page_id)?.clone();
    for key in INHERITABLE_KEYS {
        if page.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(document, &page, key)? {
            page.set(key, value);
        }
    }
    // Later arithmetic needs a direct integer.
    if let Ok(rotate) = page.get(b"Rotate") {
        let resolved = document
            .dereference(rotate)
            .and_then(|(_, value)| value.as_i64())
            .unwrap_or(0);
        page.set("Rotate", Object::Integer(resolved));
    }
    Ok(page)
}

fn inherited_attribute(
    document: &Document,
    page: &Dictionary,
    key: &[u8],
) -> Result<Option<Object>, TransformError> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(node_id) = parent {
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            return Err(TransformError::Malformed(
                "page tree exceeds maximum depth".to_string(),
            ));
        }
        let node = document.get_dictionary(node_id)?;
        if let Ok(value) = node.get(key) {
            return Ok(Some(value.clone()));
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    Ok(None)
}

fn page_rotation(page: &Dictionary) -> i64 {
    page.get(b"Rotate")
        .and_then(Object::as_i64)
        .unwrap_or(0)
}

/// Copy every annotation dictionary in `annots` and point its `/P` at `page_id`.
fn clone_annotations(document: &mut Document, annots: &Object, page_id: ObjectId) -> Object {
    let entries = match document.dereference(annots) {
        Ok((_, Object::Array(entries))) => entries.clone(),
        _ => return annots.clone(),
    };
    let mut cloned = Vec::with_capacity(entries.len());
    for entry in entries {
        let annotation = match &entry {
            Object::Reference(id) => document.get_dictionary(*id).ok().cloned(),
            Object::Dictionary(dict) => Some(dict.clone()),
            _ => None,
        };
        match annotation {
            Some(mut dict) => {
                dict.set("P", Object::Reference(page_id));
                cloned.push(Object::Reference(document.add_object(dict)));
            }
            None => cloned.push(entry),
        }
    }
    Object::Array(cloned)
}
