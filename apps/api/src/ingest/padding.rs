//! PDF page padding.
//!
//! The OCR collaborator tends to crop content near page edges (laid-out
//! headers and footers in particular), so every page is re-framed onto a
//! taller canvas before submission: blank band of `top` points above the
//! content, blank band of `bottom` points below it.
//!
//! The original content streams are reused byte-for-byte. The content is
//! shifted up by `bottom` points with a prepended `q ... cm` stream and an
//! appended `Q` stream, and the MediaBox top edge is raised by
//! `top + bottom`. In top-down page coordinates that places the original
//! content exactly `top` points below the new top edge.
//!
//! Unlike the extraction and structuring stages, this transform fails
//! closed: a document lopdf cannot parse aborts the pipeline.

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

/// Default blank band height, in PDF points.
pub const DEFAULT_MARGIN: f32 = 50.0;

#[derive(Debug, Error)]
pub enum PaddingError {
    #[error("Failed to process PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Page {0} has no resolvable MediaBox")]
    MediaBox(u32),

    #[error("Failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Re-frames every page of `bytes` onto a page `top + bottom` points
/// taller. Zero on a side skips that band; zero on both sides returns the
/// input unchanged (after verifying it parses).
pub fn pad_pdf(bytes: &[u8], top: f32, bottom: f32) -> Result<Vec<u8>, PaddingError> {
    let mut doc = Document::load_mem(bytes)?;

    if top == 0.0 && bottom == 0.0 {
        return Ok(bytes.to_vec());
    }

    let pages = doc.get_pages();
    for (page_no, page_id) in pages {
        let media_box =
            resolve_media_box(&doc, page_id).ok_or(PaddingError::MediaBox(page_no))?;

        if bottom > 0.0 {
            shift_content_up(&mut doc, page_id, bottom)?;
        }

        let [x0, y0, x1, y1] = media_box;
        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        page.set(
            "MediaBox",
            vec![
                Object::Real(x0 as _),
                Object::Real(y0 as _),
                Object::Real(x1 as _),
                Object::Real((y1 + top + bottom) as _),
            ],
        );
        // A CropBox sized to the original page would clip the new bands;
        // removing it makes the crop fall back to the MediaBox.
        page.remove(b"CropBox");
    }

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// Wraps the page's content streams in `q 1 0 0 1 0 <dy> cm ... Q`,
/// leaving the original stream bytes untouched.
fn shift_content_up(doc: &mut Document, page_id: ObjectId, dy: f32) -> Result<(), lopdf::Error> {
    let existing: Vec<Object> = {
        let page = doc.get_object(page_id)?.as_dict()?;
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => vec![Object::Reference(*id)],
            Ok(Object::Array(items)) => items.clone(),
            Ok(other) => vec![other.clone()],
            Err(_) => Vec::new(),
        }
    };

    let prefix = format!("q 1 0 0 1 0 {dy} cm\n").into_bytes();
    let prefix_id = doc.add_object(Stream::new(dictionary! {}, prefix));
    let suffix_id = doc.add_object(Stream::new(dictionary! {}, b"\nQ".to_vec()));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(prefix_id));
    contents.extend(existing);
    contents.push(Object::Reference(suffix_id));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Reads the page's MediaBox, following the Pages-tree Parent chain for
/// inherited boxes and dereferencing indirect values.
fn resolve_media_box(doc: &Document, page_id: ObjectId) -> Option<[f32; 4]> {
    let mut dict_id = page_id;
    loop {
        let dict = doc.get_object(dict_id).ok()?.as_dict().ok()?;
        if let Ok(obj) = dict.get(b"MediaBox") {
            let arr = resolve(doc, obj)?.as_array().ok()?;
            if arr.len() != 4 {
                return None;
            }
            let mut coords = [0f32; 4];
            for (i, item) in arr.iter().enumerate() {
                coords[i] = number(resolve(doc, item)?)?;
            }
            return Some(coords);
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => dict_id = *parent,
            _ => return None,
        }
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}
