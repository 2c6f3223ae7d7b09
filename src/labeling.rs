//! Cluster label derivation.
//!
//! Samples up to five titled members plus the distinct kinds present
//! in a cluster and asks the label generator for a short descriptive
//! label. Nothing else about the items is disclosed. A failed or blank
//! response falls back deterministically to `"{primary kind} Cluster"`,
//! so one misbehaving labeling call never aborts the batch.

use crate::content::ContentItem;
use crate::provider::LabelGenerator;

/// How many member titles are disclosed to the label generator.
const MAX_SAMPLE_TITLES: usize = 5;

/// Kind token used when no member carries kind information.
const GENERIC_KIND: &str = "Content";

/// Derive a label for a cluster of members.
///
/// Never fails: provider errors and empty responses are logged and
/// replaced by the rule-based fallback.
pub fn label_cluster(members: &[&ContentItem], generator: &dyn LabelGenerator) -> String {
    let titles: Vec<String> = members
        .iter()
        .filter(|item| !item.title.trim().is_empty())
        .take(MAX_SAMPLE_TITLES)
        .map(|item| item.title.trim().to_string())
        .collect();

    let kinds = distinct_kinds(members);

    match generator.summarize(&titles, &kinds) {
        Ok(label) if !label.trim().is_empty() => label.trim().to_string(),
        Ok(_) => {
            log::debug!("Label generator returned a blank label, using fallback");
            fallback_label(&kinds)
        }
        Err(e) => {
            log::warn!("Label generation failed, using fallback: {}", e);
            fallback_label(&kinds)
        }
    }
}

/// Distinct kind names in member iteration order.
fn distinct_kinds(members: &[&ContentItem]) -> Vec<String> {
    let mut kinds: Vec<String> = Vec::new();
    for item in members {
        let kind = item.kind.to_string();
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    kinds
}

/// `"{primary kind} Cluster"`, where the primary kind is the first
/// distinct kind observed among members.
fn fallback_label(kinds: &[String]) -> String {
    let primary = kinds.first().map(String::as_str).unwrap_or(GENERIC_KIND);
    format!("{} Cluster", primary)
}
