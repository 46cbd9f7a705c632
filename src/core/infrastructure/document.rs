//! Navigation helpers over PRTG XML documents.
//!
//! PRTG answers structural queries with small XML documents. They are parsed
//! into an `xmltree` element tree and only read through these helpers.

use crate::core::domain::error::{PrtgError, PrtgResult};
use xmltree::Element;

/// Body text PRTG returns from `getobjectproperty.htm` for unknown names.
pub(crate) const PROPERTY_NOT_FOUND: &str = "(Property not found)";

/// Parses a response body into an element tree.
pub(crate) fn parse_document(body: &str) -> PrtgResult<Element> {
    Element::parse(body.as_bytes())
        .map_err(|e| PrtgError::malformed(format!("Invalid XML document: {}", e)))
}

/// Element children in document order.
pub(crate) fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| node.as_element())
}

/// Direct text content of an element, empty when it has none.
pub(crate) fn element_text(element: &Element) -> String {
    element
        .get_text()
        .map(|text| text.into_owned())
        .unwrap_or_default()
}

/// Text of the first child element named `name`.
pub(crate) fn child_text(element: &Element, name: &str) -> Option<String> {
    element.get_child(name).map(element_text)
}

/// Server id of a structural fragment.
///
/// The `<id>` child wins; the `id` attribute is the fallback. A fragment
/// carrying neither is malformed.
pub(crate) fn fragment_id(element: &Element) -> PrtgResult<String> {
    child_text(element, "id")
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .or_else(|| {
            element
                .attributes
                .get("id")
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
        })
        .ok_or_else(|| {
            PrtgError::malformed(format!("<{}> element without an id", element.name))
        })
}

/// Depth-first search for the first element named `name`, the root included.
pub(crate) fn find_first<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    if element.name == name {
        return Some(element);
    }
    child_elements(element).find_map(|child| find_first(child, name))
}

/// All descendants named `name`, in document order.
pub(crate) fn find_all<'a>(element: &'a Element, name: &str) -> Vec<&'a Element> {
    let mut found = Vec::new();
    collect(element, name, &mut found);
    found
}

fn collect<'a>(element: &'a Element, name: &str, found: &mut Vec<&'a Element>) {
    for child in child_elements(element) {
        if child.name == name {
            found.push(child);
        }
        collect(child, name, found);
    }
}

/// Text of the `<result>` element of a status or property answer.
pub(crate) fn result_text(document: &Element) -> PrtgResult<String> {
    find_first(document, "result")
        .map(element_text)
        .ok_or_else(|| PrtgError::malformed("Answer without a <result> element"))
}

/// The single object element below `sensortree/nodes`.
///
/// `root_id` only feeds the error message.
pub(crate) fn tree_root(document: &Element, root_id: &str) -> PrtgResult<Element> {
    find_first(document, "sensortree")
        .and_then(|tree| tree.get_child("nodes"))
        .and_then(|nodes| child_elements(nodes).next())
        .cloned()
        .ok_or_else(|| PrtgError::ResourceNotFound(format!("No objects at ID: {}", root_id)))
}
