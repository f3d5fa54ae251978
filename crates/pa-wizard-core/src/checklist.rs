//! Document checklist reconciliation.
//!
//! The stored checklist may be stale: after a category change it can name
//! requirements the new category does not have, and miss ones it does.
//! Reconciliation reshapes it to exactly the current requirement list:
//!
//! 1. One item per requirement, in requirement order
//! 2. An existing item with a matching id is reused; a file name is kept
//!    exactly when the item is uploaded
//! 3. Otherwise a pending item is synthesized
//! 4. Items matching no requirement are dropped
//!
//! Counts are derived from the reconciled items every time and never stored.

use serde::Serialize;
use std::collections::HashMap;

use crate::types::{DocumentChecklistItem, DocumentRequirement};

/// Placeholder file name assigned when an item is marked uploaded.
///
/// Stands in for a real attach action at the document-storage boundary.
pub fn placeholder_file_name(requirement_id: &str) -> String {
    format!("{}.pdf", requirement_id)
}

/// Restore the uploaded/file-name pairing on a stored item.
fn repaired(item: &DocumentChecklistItem) -> DocumentChecklistItem {
    match (item.uploaded, &item.file_name) {
        (true, None) => {
            tracing::debug!(
                requirement_id = %item.requirement_id,
                "Uploaded item had no file name"
            );
            DocumentChecklistItem::attached(
                item.requirement_id.clone(),
                placeholder_file_name(&item.requirement_id),
            )
        }
        (false, Some(_)) => DocumentChecklistItem::pending(item.requirement_id.clone()),
        _ => item.clone(),
    }
}

/// Completion counts for a reconciled checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistMetrics {
    pub uploaded_count: usize,
    pub total_count: usize,
    pub required_count: usize,
    pub required_uploaded_count: usize,
}

impl ChecklistMetrics {
    /// Progress line in the form `N of M`.
    pub fn progress_label(&self) -> String {
        format!("{} of {}", self.uploaded_count, self.total_count)
    }

    /// Whether every required document is attached.
    pub fn required_complete(&self) -> bool {
        self.required_uploaded_count == self.required_count
    }
}

/// A checklist shaped exactly by one category's requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledChecklist {
    requirements: Vec<DocumentRequirement>,
    items: Vec<DocumentChecklistItem>,
}

impl ReconciledChecklist {
    /// Reconcile `existing` against `requirements`.
    pub fn reconcile(
        requirements: &[DocumentRequirement],
        existing: &[DocumentChecklistItem],
    ) -> Self {
        let mut by_id: HashMap<&str, &DocumentChecklistItem> = HashMap::new();
        for item in existing {
            // First occurrence wins if the stored list repeats an id
            by_id.entry(item.requirement_id.as_str()).or_insert(item);
        }

        let items: Vec<DocumentChecklistItem> = requirements
            .iter()
            .map(|req| match by_id.get(req.id.as_str()) {
                Some(item) => repaired(item),
                None => DocumentChecklistItem::pending(req.id.clone()),
            })
            .collect();

        let dropped = existing
            .iter()
            .filter(|item| !requirements.iter().any(|r| r.id == item.requirement_id))
            .count();
        if dropped > 0 {
            tracing::debug!(dropped, "Dropped checklist items with no matching requirement");
        }

        Self {
            requirements: requirements.to_vec(),
            items,
        }
    }

    /// Reconciled items, one per requirement.
    pub fn items(&self) -> &[DocumentChecklistItem] {
        &self.items
    }

    /// Requirements this checklist was shaped by.
    pub fn requirements(&self) -> &[DocumentRequirement] {
        &self.requirements
    }

    /// Requirement and item side by side, in requirement order.
    pub fn entries(&self) -> impl Iterator<Item = (&DocumentRequirement, &DocumentChecklistItem)> {
        self.requirements.iter().zip(self.items.iter())
    }

    /// Consume into the item list stored on the draft.
    pub fn into_items(self) -> Vec<DocumentChecklistItem> {
        self.items
    }

    /// Recompute completion counts.
    pub fn metrics(&self) -> ChecklistMetrics {
        let mut metrics = ChecklistMetrics {
            total_count: self.requirements.len(),
            ..Default::default()
        };

        for (req, item) in self.entries() {
            if req.required {
                metrics.required_count += 1;
            }
            if item.uploaded {
                metrics.uploaded_count += 1;
                if req.required {
                    metrics.required_uploaded_count += 1;
                }
            }
        }

        metrics
    }

    /// Flip `uploaded` on the item for `requirement_id`.
    ///
    /// Marking uploaded assigns [`placeholder_file_name`]; clearing removes
    /// the file name. Returns the new `uploaded` value, or `None` when the id
    /// is not on this checklist (nothing changes).
    pub fn toggle(&mut self, requirement_id: &str) -> Option<bool> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.requirement_id == requirement_id)?;

        *item = if item.uploaded {
            DocumentChecklistItem::pending(requirement_id)
        } else {
            DocumentChecklistItem::attached(requirement_id, placeholder_file_name(requirement_id))
        };

        tracing::debug!(requirement_id, uploaded = item.uploaded, "Toggled checklist item");
        Some(item.uploaded)
    }
}

/// Reconcile and return just the items.
pub fn reconcile(
    requirements: &[DocumentRequirement],
    existing: &[DocumentChecklistItem],
) -> Vec<DocumentChecklistItem> {
    ReconciledChecklist::reconcile(requirements, existing).into_items()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(id: &str, required: bool) -> DocumentRequirement {
        DocumentRequirement::new(id, format!("Doc {}", id), "", required)
    }

    #[test]
    fn test_empty_requirements_yield_empty_checklist() {
        let existing = vec![DocumentChecklistItem::attached("old", "old.pdf")];
        let checklist = ReconciledChecklist::reconcile(&[], &existing);

        assert!(checklist.items().is_empty());
        let metrics = checklist.metrics();
        assert_eq!(metrics.total_count, 0);
        assert_eq!(metrics.progress_label(), "0 of 0");
    }

    #[test]
    fn test_reconcile_follows_requirement_order() {
        let requirements = vec![req("a", true), req("b", false), req("c", true)];
        let existing = vec![
            DocumentChecklistItem::attached("c", "c-scan.pdf"),
            DocumentChecklistItem::pending("zzz"),
            DocumentChecklistItem::attached("a", "a.pdf"),
        ];

        let checklist = ReconciledChecklist::reconcile(&requirements, &existing);
        let ids: Vec<&str> = checklist
            .items()
            .iter()
            .map(|i| i.requirement_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        // Reused as-is, including a user-chosen file name
        assert_eq!(checklist.items()[2].file_name.as_deref(), Some("c-scan.pdf"));
        // Synthesized
        assert_eq!(checklist.items()[1], DocumentChecklistItem::pending("b"));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let requirements = vec![req("a", true), req("b", false)];
        let existing = vec![DocumentChecklistItem::attached("b", "b.pdf")];

        let once = reconcile(&requirements, &existing);
        let twice = reconcile(&requirements, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_required_only_completion() {
        let requirements = vec![req("a", true), req("b", false)];
        let existing = vec![DocumentChecklistItem::attached("a", "a.pdf")];

        let metrics = ReconciledChecklist::reconcile(&requirements, &existing).metrics();
        assert_eq!(metrics.required_uploaded_count, 1);
        assert_eq!(metrics.required_count, 1);
        assert_eq!(metrics.uploaded_count, 1);
        assert_eq!(metrics.total_count, 2);
        assert!(metrics.required_complete());
    }

    #[test]
    fn test_stale_uploads_do_not_count() {
        let requirements = vec![req("a", true)];
        let existing = vec![
            DocumentChecklistItem::attached("gone-1", "x.pdf"),
            DocumentChecklistItem::attached("gone-2", "y.pdf"),
        ];

        let metrics = ReconciledChecklist::reconcile(&requirements, &existing).metrics();
        assert_eq!(metrics.uploaded_count, 0);
        assert!(!metrics.required_complete());
    }

    #[test]
    fn test_toggle_assigns_and_clears_file_name() {
        let requirements = vec![req("a", true)];
        let mut checklist = ReconciledChecklist::reconcile(&requirements, &[]);

        assert_eq!(checklist.toggle("a"), Some(true));
        assert_eq!(checklist.items()[0].file_name.as_deref(), Some("a.pdf"));

        assert_eq!(checklist.toggle("a"), Some(false));
        assert_eq!(checklist.items()[0], DocumentChecklistItem::pending("a"));
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let requirements = vec![req("a", true)];
        let mut checklist = ReconciledChecklist::reconcile(&requirements, &[]);
        let before = checklist.clone();

        assert_eq!(checklist.toggle("missing"), None);
        assert_eq!(checklist, before);
    }

    #[test]
    fn test_reconcile_repairs_file_name_pairing() {
        let requirements = vec![req("img-order", true), req("img-notes", false)];
        let existing: Vec<DocumentChecklistItem> = serde_json::from_str(
            r#"[
                {"requirementId": "img-order", "uploaded": true},
                {"requirementId": "img-notes", "uploaded": false, "fileName": "notes.pdf"}
            ]"#,
        )
        .unwrap();

        let items = reconcile(&requirements, &existing);
        assert_eq!(items[0], DocumentChecklistItem::attached("img-order", "img-order.pdf"));
        assert_eq!(items[1], DocumentChecklistItem::pending("img-notes"));
    }

    #[test]
    fn test_duplicate_existing_ids_first_wins() {
        let requirements = vec![req("a", true)];
        let existing = vec![
            DocumentChecklistItem::attached("a", "first.pdf"),
            DocumentChecklistItem::pending("a"),
        ];
        let items = reconcile(&requirements, &existing);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].file_name.as_deref(), Some("first.pdf"));
    }
}
