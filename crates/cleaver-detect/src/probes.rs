//! Structural probes: boundary evidence from the outline tree and from
//! page-label resets. Both are order-insensitive and return at most one
//! signal per page.

use std::collections::BTreeMap;

use cleaver_core::{BoundarySignal, OutlineNode};

/// Pages an outline bookmark resolves to.
///
/// The walk is iterative over an explicit stack so arbitrarily deep bookmark
/// trees cannot overflow the call stack. Nodes without a resolved
/// destination contribute only their children. A missing or empty outline
/// yields an empty map, never an error.
pub fn outline_probe(roots: &[OutlineNode]) -> BTreeMap<usize, BoundarySignal> {
    let mut hits = BTreeMap::new();

    let mut stack: Vec<&OutlineNode> = roots.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if let Some(page) = node.destination {
            hits.entry(page)
                .or_insert_with(BoundarySignal::outline_bookmark);
        }
        for child in node.children.iter().rev() {
            stack.push(child);
        }
    }

    hits
}

/// Pages where the label sequence resets to "1".
///
/// Page 0 never carries a reset signal: a leading "1" is the normal start of
/// a label sequence, not a reset.
pub fn page_label_probe(labels: Option<&[String]>) -> BTreeMap<usize, BoundarySignal> {
    let mut hits = BTreeMap::new();

    let Some(labels) = labels else {
        return hits;
    };

    for i in 1..labels.len() {
        if labels[i] == "1" && labels[i - 1] != "1" {
            hits.insert(i, BoundarySignal::page_label_reset(&labels[i]));
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleaver_core::SignalKind;

    fn leaf(page: usize) -> OutlineNode {
        OutlineNode {
            destination: Some(page),
            children: vec![],
        }
    }

    #[test]
    fn empty_outline_yields_no_hits() {
        assert!(outline_probe(&[]).is_empty());
    }

    #[test]
    fn nested_bookmarks_are_walked() {
        let roots = vec![
            OutlineNode {
                destination: Some(0),
                children: vec![leaf(2), leaf(4)],
            },
            leaf(9),
        ];
        let hits = outline_probe(&roots);
        assert_eq!(hits.keys().copied().collect::<Vec<_>>(), vec![0, 2, 4, 9]);
        assert!(
            hits.values()
                .all(|s| s.kind == SignalKind::OutlineBookmark && s.score == 80)
        );
    }

    #[test]
    fn unresolved_destinations_are_skipped() {
        let roots = vec![OutlineNode {
            destination: None,
            children: vec![leaf(3)],
        }];
        let hits = outline_probe(&roots);
        assert_eq!(hits.keys().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn duplicate_destinations_collapse_to_one_signal() {
        let hits = outline_probe(&[leaf(5), leaf(5)]);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn deep_tree_does_not_overflow_the_stack() {
        // A pathological 100k-deep chain; a recursive walk would blow up.
        let mut node = leaf(99_999);
        for _ in 0..100_000 {
            node = OutlineNode {
                destination: None,
                children: vec![node],
            };
        }
        let hits = outline_probe(std::slice::from_ref(&node));
        assert_eq!(hits.keys().copied().collect::<Vec<_>>(), vec![99_999]);

        // Dismantle iteratively; the default recursive drop would also
        // overflow on a chain this deep.
        let mut stack = vec![node];
        while let Some(mut n) = stack.pop() {
            stack.append(&mut n.children);
        }
    }

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_labels_yields_no_hits() {
        assert!(page_label_probe(None).is_empty());
        assert!(page_label_probe(Some(&[])).is_empty());
    }

    #[test]
    fn label_reset_marks_the_resetting_page() {
        let labels = labels(&["1", "2", "3", "1", "2", "1"]);
        let hits = page_label_probe(Some(&labels));
        assert_eq!(hits.keys().copied().collect::<Vec<_>>(), vec![3, 5]);
        assert!(
            hits.values()
                .all(|s| s.kind == SignalKind::PageLabelReset && s.score == 70)
        );
    }

    #[test]
    fn leading_one_is_not_a_reset() {
        let labels = labels(&["1", "2", "3"]);
        assert!(page_label_probe(Some(&labels)).is_empty());
    }

    #[test]
    fn roman_prefixed_sequences_reset_on_arabic_one() {
        let labels = labels(&["i", "ii", "1", "2"]);
        let hits = page_label_probe(Some(&labels));
        assert_eq!(hits.keys().copied().collect::<Vec<_>>(), vec![2]);
    }
}
