//! Flattens a selection into a deduplicated list of export targets.

use std::collections::HashSet;

use crate::host::{NodeKind, SceneNode};
use crate::names::{sanitize_name, strip_variant_suffix, DEFAULT_BASE_NAME};
use crate::target::Target;

/// Collect export targets from the selection roots, in selection order.
///
/// Variant groups expand to their direct variant children; instances are
/// named and sized from their origin but rendered through the instance.
/// A variant reachable several ways (directly, through its group, through an
/// instance) is exported once, by whichever path reaches it first.
pub fn collect<N: SceneNode>(selection: &[N]) -> Vec<Target<N>> {
    let mut collector = Collector {
        seen: HashSet::new(),
        targets: Vec::new(),
    };

    for node in selection {
        match node.kind() {
            NodeKind::VariantGroup => {
                for child in node.children() {
                    if child.kind() == NodeKind::Variant {
                        collector.add(child.clone(), child);
                    }
                }
            }
            NodeKind::Variant => collector.add(node.clone(), node.clone()),
            NodeKind::Instance => {
                let source = node.origin().unwrap_or_else(|| node.clone());
                collector.add(node.clone(), source);
            }
            _ => {}
        }
    }

    tracing::debug!(
        roots = selection.len(),
        targets = collector.targets.len(),
        "Collected export targets"
    );

    collector.targets
}

struct Collector<N: SceneNode> {
    seen: HashSet<N::Id>,
    targets: Vec<Target<N>>,
}

impl<N: SceneNode> Collector<N> {
    fn add(&mut self, node: N, source: N) {
        let key = source.id();
        if !self.seen.insert(key.clone()) {
            tracing::trace!(?key, "Skipping duplicate target");
            return;
        }

        self.targets.push(Target {
            base_name: base_name(&source),
            size: size_label(&source, &node),
            path_segments: path_segments(&node),
            key,
            node,
        });
    }
}

/// Uppercase identifier for the component a node belongs to.
pub fn base_name<N: SceneNode>(node: &N) -> String {
    let group_parent = node
        .parent()
        .filter(|parent| parent.kind() == NodeKind::VariantGroup);

    let name = match (node.kind(), group_parent) {
        (NodeKind::Variant, Some(parent)) => sanitize_name(&parent.name()),
        (NodeKind::VariantGroup, _) => sanitize_name(&node.name()),
        _ => sanitize_name(strip_variant_suffix(&node.name())),
    };

    if name.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        name
    }
}

/// Size label: a size-like variant property, a numeric variant property, or
/// the rounded width. `"0"` when none of these resolve.
pub fn size_label<N: SceneNode>(source: &N, node: &N) -> String {
    let mut candidates: Vec<N> = Vec::with_capacity(4);
    for root in [source, node] {
        for candidate in [Some(root.clone()), root.origin()].into_iter().flatten() {
            if !candidates.iter().any(|c| c.id() == candidate.id()) {
                candidates.push(candidate);
            }
        }
    }

    for candidate in candidates.iter() {
        let Some(properties) = candidate.variant_properties() else {
            continue;
        };

        let sized = properties.iter().find_map(|(name, value)| {
            if name.to_ascii_lowercase().contains("size") {
                first_digit_run(value)
            } else {
                None
            }
        });
        if let Some(size) = sized {
            return size.to_string();
        }

        let numeric = properties
            .iter()
            .map(|(_, value)| value.as_str())
            .find(|value| !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()));
        if let Some(size) = numeric {
            return size.to_string();
        }
    }

    let width = node
        .width()
        .or_else(|| node.origin().and_then(|origin| origin.width()))
        .or_else(|| source.width())
        .filter(|w| w.is_finite());

    match width {
        Some(w) => format!("{}", w.round() as i64),
        None => "0".to_string(),
    }
}

fn first_digit_run(value: &str) -> Option<&str> {
    let start = value.find(|c: char| c.is_ascii_digit())?;
    let rest = &value[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Folder segments from the nearest enclosing grouping container.
pub fn path_segments<N: SceneNode>(node: &N) -> Vec<String> {
    let mut current = Some(node.clone());

    while let Some(candidate) = current {
        match candidate.kind() {
            NodeKind::Page => break,
            NodeKind::Grouping => {
                return candidate
                    .name()
                    .split('/')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => current = candidate.parent(),
        }
    }

    Vec::new()
}
