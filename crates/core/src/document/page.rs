//! Page tree traversal.

use crate::document::catalog::PDFDocument;
use crate::error::{ExtractError, Result};
use crate::model::objects::PDFObject;
use std::collections::{HashMap, HashSet};

/// One page of the document, with its content streams already decoded.
#[derive(Debug, Clone)]
pub struct PDFPage {
    /// Object id of the page node, 0 for inline dictionaries.
    pub pageid: u32,
    /// The page dictionary.
    pub attrs: HashMap<String, PDFObject>,
    /// Resource dictionary, inherited from ancestors when the page node
    /// omits it.
    pub resources: HashMap<String, PDFObject>,
    /// Decoded bytes of each content stream, in order.
    pub contents: Vec<Vec<u8>>,
}

/// Collect the document's pages in tree order.
///
/// Walks /Pages depth-first, carrying the inherited /Resources down the
/// tree. Reference cycles terminate the affected branch rather than the
/// traversal.
pub fn collect_pages(doc: &PDFDocument) -> Result<Vec<PDFPage>> {
    let catalog = doc.catalog()?;
    let root = doc.resolve_entry(&catalog, "Pages")?;
    let root_ref = catalog
        .get("Pages")
        .and_then(|o| o.as_objref().ok())
        .map(|r| r.objid);

    let mut pages = Vec::new();
    let mut visited = HashSet::new();
    walk(
        doc,
        root_ref.unwrap_or(0),
        &root,
        &HashMap::new(),
        &mut visited,
        &mut pages,
    )?;
    Ok(pages)
}

fn walk(
    doc: &PDFDocument,
    objid: u32,
    node: &PDFObject,
    inherited_resources: &HashMap<String, PDFObject>,
    visited: &mut HashSet<u32>,
    pages: &mut Vec<PDFPage>,
) -> Result<()> {
    if objid != 0 && !visited.insert(objid) {
        return Ok(());
    }
    let dict = node.as_dict()?;

    let resources = match doc.resolve_entry(dict, "Resources")? {
        PDFObject::Dict(d) => d,
        _ => inherited_resources.clone(),
    };

    let node_type = dict.get("Type").and_then(|t| t.as_name().ok());
    match node_type {
        Some("Pages") => {
            let kids = doc.resolve_entry(dict, "Kids")?;
            for kid in kids.as_array()? {
                let kid_id = kid.as_objref().map(|r| r.objid).unwrap_or(0);
                let kid_node = doc.resolve(kid)?;
                walk(doc, kid_id, &kid_node, &resources, visited, pages)?;
            }
        }
        Some("Page") => {
            let contents = load_contents(doc, dict)?;
            pages.push(PDFPage {
                pageid: objid,
                attrs: dict.clone(),
                resources,
                contents,
            });
        }
        other => {
            return Err(ExtractError::DocumentRead(format!(
                "unexpected page tree node type: {}",
                other.unwrap_or("missing")
            )));
        }
    }
    Ok(())
}

/// Decode the page's /Contents: a single stream, or an array of streams
/// meant to be concatenated.
fn load_contents(doc: &PDFDocument, page: &HashMap<String, PDFObject>) -> Result<Vec<Vec<u8>>> {
    match doc.resolve_entry(page, "Contents")? {
        PDFObject::Null => Ok(Vec::new()),
        PDFObject::Stream(s) => Ok(vec![doc.decode_stream(&s)?]),
        PDFObject::Array(arr) => arr
            .iter()
            .map(|item| {
                let obj = doc.resolve(item)?;
                doc.decode_stream(obj.as_stream()?)
            })
            .collect(),
        other => Err(ExtractError::DocumentRead(format!(
            "bad /Contents entry: {other:?}"
        ))),
    }
}
