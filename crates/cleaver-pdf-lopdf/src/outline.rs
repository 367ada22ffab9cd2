//! Outline (bookmark) extraction with destinations resolved to page indices.
//!
//! The tree is walked iteratively over an explicit stack with a visited-set
//! guard, so deep or cycle-damaged outlines cannot overflow or spin. Nodes
//! are emitted as a flat list of resolved root nodes: the hierarchy carries
//! no extra boundary evidence, only the destination pages do.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::trace;

use cleaver_core::OutlineNode;

use crate::resolve;

pub(crate) fn extract_outline(
    doc: &Document,
    page_index_by_id: &HashMap<ObjectId, usize>,
) -> Vec<OutlineNode> {
    let Ok(catalog) = doc.catalog() else {
        return vec![];
    };
    let Some(outlines) = catalog
        .get(b"Outlines")
        .ok()
        .and_then(|o| resolve(doc, o).as_dict().ok())
    else {
        return vec![];
    };

    let named = collect_named_destinations(doc, catalog, page_index_by_id);

    let mut nodes = Vec::new();
    let mut visited: HashSet<ObjectId> = HashSet::new();
    let mut stack: Vec<ObjectId> = Vec::new();

    if let Ok(Object::Reference(first)) = outlines.get(b"First") {
        stack.push(*first);
    }

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = doc.get_object(id).ok().and_then(|o| o.as_dict().ok()) else {
            continue;
        };

        let destination = resolve_destination(doc, node, &named, page_index_by_id);
        trace!(?id, ?destination, "outline node");
        nodes.push(OutlineNode {
            destination,
            children: vec![],
        });

        if let Ok(Object::Reference(next)) = node.get(b"Next") {
            stack.push(*next);
        }
        if let Ok(Object::Reference(first)) = node.get(b"First") {
            stack.push(*first);
        }
    }

    nodes
}

/// Resolve a bookmark's destination (a direct /Dest or a GoTo action's /D)
/// to a 0-based page index. Unresolvable destinations yield
/// `None` and are skipped by the probe.
fn resolve_destination(
    doc: &Document,
    node: &Dictionary,
    named: &HashMap<Vec<u8>, usize>,
    page_index_by_id: &HashMap<ObjectId, usize>,
) -> Option<usize> {
    let target = if let Ok(dest) = node.get(b"Dest") {
        dest
    } else {
        let action = node.get(b"A").ok().map(|a| resolve(doc, a))?;
        let action = action.as_dict().ok()?;
        match action.get(b"S") {
            Ok(Object::Name(kind)) if kind == b"GoTo" => action.get(b"D").ok()?,
            _ => return None,
        }
    };

    destination_page(doc, target, named, page_index_by_id)
}

fn destination_page(
    doc: &Document,
    destination: &Object,
    named: &HashMap<Vec<u8>, usize>,
    page_index_by_id: &HashMap<ObjectId, usize>,
) -> Option<usize> {
    match resolve(doc, destination) {
        Object::Array(parts) => match parts.first() {
            Some(Object::Reference(page_id)) => page_index_by_id.get(page_id).copied(),
            // Some producers write a 0-based page number instead of a page ref.
            Some(Object::Integer(index)) if *index >= 0 => {
                let index = *index as usize;
                (index < page_index_by_id.len()).then_some(index)
            }
            _ => None,
        },
        // Explicit destination dictionaries wrap the array in /D.
        Object::Dictionary(dict) => {
            let inner = dict.get(b"D").ok()?;
            destination_page(doc, inner, named, page_index_by_id)
        }
        Object::Name(name) => named.get(name.as_slice()).copied(),
        Object::String(name, _) => named.get(name.as_slice()).copied(),
        _ => None,
    }
}

/// Gather name -> page-index mappings from both the legacy catalog /Dests
/// dictionary and the /Names -> /Dests name tree.
fn collect_named_destinations(
    doc: &Document,
    catalog: &Dictionary,
    page_index_by_id: &HashMap<ObjectId, usize>,
) -> HashMap<Vec<u8>, usize> {
    let mut named = HashMap::new();
    let empty = HashMap::new();

    if let Some(dests) = catalog
        .get(b"Dests")
        .ok()
        .and_then(|d| resolve(doc, d).as_dict().ok())
    {
        for (name, value) in dests.iter() {
            if let Some(page) = destination_page(doc, value, &empty, page_index_by_id) {
                named.insert(name.clone(), page);
            }
        }
    }

    let tree_root = catalog
        .get(b"Names")
        .ok()
        .and_then(|n| resolve(doc, n).as_dict().ok())
        .and_then(|names| names.get(b"Dests").ok());
    if let Some(root) = tree_root {
        // Name trees nest via /Kids; walk iteratively with a depth guard.
        let mut stack = vec![root];
        let mut guard = 0;
        while let Some(node) = stack.pop() {
            guard += 1;
            if guard > 4096 {
                break;
            }
            let Some(node) = resolve(doc, node).as_dict().ok() else {
                continue;
            };
            if let Ok(Object::Array(pairs)) = node.get(b"Names").map(|n| resolve(doc, n)) {
                for pair in pairs.chunks_exact(2) {
                    let key = match &pair[0] {
                        Object::String(bytes, _) => bytes.clone(),
                        Object::Name(bytes) => bytes.clone(),
                        _ => continue,
                    };
                    if let Some(page) = destination_page(doc, &pair[1], &empty, page_index_by_id) {
                        named.insert(key, page);
                    }
                }
            }
            if let Ok(Object::Array(kids)) = node.get(b"Kids").map(|k| resolve(doc, k)) {
                for kid in kids {
                    stack.push(kid);
                }
            }
        }
    }

    named
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Minimal document skeleton: `page_count` empty pages plus a catalog.
    /// Returns the doc, the page ids, and the catalog id.
    fn skeleton(page_count: usize) -> (Document, Vec<ObjectId>, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        let mut page_ids = Vec::new();
        for _ in 0..page_count {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            });
            kids.push(Object::Reference(page_id));
            page_ids.push(page_id);
        }

        let kids_len = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => kids_len,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        (doc, page_ids, catalog_id)
    }

    fn index_map(page_ids: &[ObjectId]) -> HashMap<ObjectId, usize> {
        page_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect()
    }

    fn set_outlines(doc: &mut Document, catalog_id: ObjectId, first: ObjectId) {
        let outlines_id = doc.add_object(dictionary! {
            "Type" => "Outlines",
            "First" => first,
        });
        if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(catalog_id) {
            catalog.set("Outlines", outlines_id);
        }
    }

    #[test]
    fn no_outline_yields_empty() {
        let (doc, page_ids, _) = skeleton(3);
        assert!(extract_outline(&doc, &index_map(&page_ids)).is_empty());
    }

    #[test]
    fn direct_dest_arrays_resolve_to_pages() {
        let (mut doc, page_ids, catalog_id) = skeleton(4);

        let second = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Doc B"),
            "Dest" => vec![Object::Reference(page_ids[2]), "XYZ".into()],
        });
        let first = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Doc A"),
            "Dest" => vec![Object::Reference(page_ids[0]), "XYZ".into()],
            "Next" => second,
        });
        set_outlines(&mut doc, catalog_id, first);

        let nodes = extract_outline(&doc, &index_map(&page_ids));
        let pages: Vec<Option<usize>> = nodes.iter().map(|n| n.destination).collect();
        assert_eq!(pages, vec![Some(0), Some(2)]);
    }

    #[test]
    fn goto_actions_resolve() {
        let (mut doc, page_ids, catalog_id) = skeleton(2);

        let bookmark = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Action"),
            "A" => dictionary! {
                "S" => "GoTo",
                "D" => vec![Object::Reference(page_ids[1]), "Fit".into()],
            },
        });
        set_outlines(&mut doc, catalog_id, bookmark);

        let nodes = extract_outline(&doc, &index_map(&page_ids));
        assert_eq!(nodes[0].destination, Some(1));
    }

    #[test]
    fn named_destinations_resolve_via_the_name_tree() {
        let (mut doc, page_ids, catalog_id) = skeleton(3);

        let names_id = doc.add_object(dictionary! {
            "Dests" => dictionary! {
                "Names" => vec![
                    Object::string_literal("doc2"),
                    Object::Array(vec![Object::Reference(page_ids[1]), "Fit".into()]),
                ],
            },
        });
        let bookmark = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Named"),
            "Dest" => Object::string_literal("doc2"),
        });
        set_outlines(&mut doc, catalog_id, bookmark);
        if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(catalog_id) {
            catalog.set("Names", names_id);
        }

        let nodes = extract_outline(&doc, &index_map(&page_ids));
        assert_eq!(nodes[0].destination, Some(1));
    }

    #[test]
    fn unresolvable_destinations_become_none() {
        let (mut doc, page_ids, catalog_id) = skeleton(2);

        let bookmark = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Dangling"),
            "Dest" => Object::string_literal("no-such-name"),
        });
        set_outlines(&mut doc, catalog_id, bookmark);

        let nodes = extract_outline(&doc, &index_map(&page_ids));
        assert_eq!(nodes[0].destination, None);
    }

    #[test]
    fn sibling_cycles_terminate() {
        let (mut doc, page_ids, catalog_id) = skeleton(2);

        let a_id = doc.new_object_id();
        let b_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("B"),
            "Dest" => vec![Object::Reference(page_ids[1]), "Fit".into()],
            "Next" => a_id,
        });
        doc.objects.insert(
            a_id,
            Object::Dictionary(dictionary! {
                "Title" => Object::string_literal("A"),
                "Dest" => vec![Object::Reference(page_ids[0]), "Fit".into()],
                "Next" => b_id,
            }),
        );
        set_outlines(&mut doc, catalog_id, a_id);

        let nodes = extract_outline(&doc, &index_map(&page_ids));
        assert_eq!(nodes.len(), 2);
    }
}
