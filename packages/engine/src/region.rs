//! Deleting and unwrapping isolated areas.

use crate::config::MissingDataPolicy;
use crate::outcome::Outcome;
use crate::splitter::IsolatedArea;
use crate::tree::{NodeId, TemplateDocument};
use tracing::debug;

pub fn delete_all<D: TemplateDocument + ?Sized>(doc: &mut D, nodes: &[NodeId]) {
    for &node in nodes {
        doc.delete(node);
    }
}

/// Where to continue once everything up to `area.end` is settled
pub fn resume_after<D: TemplateDocument + ?Sized>(doc: &D, area: &IsolatedArea) -> Option<NodeId> {
    doc.next_sibling(area.end)
}

pub fn restart_or_rescan(target: Option<NodeId>) -> Outcome {
    target.map_or(Outcome::FullRescan, Outcome::RestartAt)
}

/// Drop the markers of an area and keep its body in place
pub fn unwrap_area<D: TemplateDocument + ?Sized>(doc: &mut D, area: &IsolatedArea) -> Outcome {
    let first = area.body(doc).first().copied();
    let following = resume_after(doc, area);
    delete_all(doc, &area.markers());
    restart_or_rescan(first.or(following))
}

/// Handle an area whose controlling data is missing or empty
pub fn apply_missing_policy<D: TemplateDocument + ?Sized>(
    doc: &mut D,
    area: &IsolatedArea,
    policy: MissingDataPolicy,
    marker: &str,
) -> Outcome {
    debug!(?policy, begin = ?area.begin, "missing data");
    match policy {
        MissingDataPolicy::Keep => unwrap_area(doc, area),
        MissingDataPolicy::Delete => {
            let following = resume_after(doc, area);
            let region = area.span(doc, area.begin, area.end);
            delete_all(doc, &region);
            restart_or_rescan(following)
        }
        MissingDataPolicy::Marker => {
            let following = resume_after(doc, area);
            let text = doc.create_text(marker);
            doc.insert_before(area.begin, text);
            let region = area.span(doc, area.begin, area.end);
            delete_all(doc, &region);
            restart_or_rescan(following)
        }
    }
}
