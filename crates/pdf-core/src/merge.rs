//! Concatenation of PDF documents
//!
//! Pages are appended in input order under a single new page tree. Object
//! ids of each source are shifted past the ids already in use, so sources
//! that share a template never collide.

use crate::document::{dictionary_of, fold_inherited_attributes, pages_root_id};
use crate::{PdfDocument, PdfError, Result};
use lopdf::{Document, Object, ObjectId};

/// Merge documents into one, keeping every page in input order
///
/// An empty input yields a valid document with zero pages. A single
/// input is returned unchanged.
pub fn merge_documents(documents: &[Vec<u8>]) -> Result<Vec<u8>> {
    match documents {
        [] => return PdfDocument::empty().to_bytes(),
        [single] => return Ok(single.clone()),
        _ => {}
    }

    let mut dest = PdfDocument::empty().into_inner();
    let dest_pages_id = pages_root_id(&dest)?;
    let mut page_refs: Vec<ObjectId> = Vec::new();

    for (i, bytes) in documents.iter().enumerate() {
        let mut source = Document::load_mem(bytes)
            .map_err(|e| PdfError::OpenError(format!("document {i}: {e}")))?;

        let source_pages: Vec<ObjectId> = source.get_pages().values().copied().collect();
        for page_id in &source_pages {
            fold_inherited_attributes(&mut source, *page_id)?;
        }

        let id_offset = dest.max_id;
        for (old_id, object) in std::mem::take(&mut source.objects) {
            let new_id = (old_id.0 + id_offset, old_id.1);
            dest.objects.insert(new_id, remap_object_refs(object, id_offset));
        }
        dest.max_id = id_offset + source.max_id;

        for old_page_id in source_pages {
            let page_id = (old_page_id.0 + id_offset, old_page_id.1);
            let mut page_dict = dictionary_of(&dest, page_id)?;
            page_dict.set("Parent", Object::Reference(dest_pages_id));
            dest.objects.insert(page_id, page_dict.into());
            page_refs.push(page_id);
        }
    }

    let mut pages_dict = dictionary_of(&dest, dest_pages_id)?;
    pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
    pages_dict.set(
        "Kids",
        Object::Array(page_refs.into_iter().map(Object::Reference).collect()),
    );
    dest.objects.insert(dest_pages_id, pages_dict.into());

    // Source catalogs and page tree nodes are no longer reachable
    dest.prune_objects();
    dest.renumber_objects();
    dest.compress();

    let mut buffer = Vec::new();
    dest.save_to(&mut buffer)
        .map_err(|e| PdfError::SaveError(e.to_string()))?;

    Ok(buffer)
}

/// Recursively shift object references by `offset`
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}
