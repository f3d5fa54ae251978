//! Property tests for navigation, slice isolation and checklist reconciliation.

use pa_wizard_core::checklist::reconcile;
use pa_wizard_core::{
    DocumentChecklistItem, DocumentRequirement, DraftSlice, PaType, ProviderInfo,
    ReconciledChecklist, StaticCatalog, WizardController, WizardStep,
};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum Nav {
    Next,
    Back,
}

fn nav() -> impl Strategy<Value = Nav> {
    prop_oneof![Just(Nav::Next), Just(Nav::Back)]
}

fn pa_type() -> impl Strategy<Value = PaType> {
    proptest::sample::select(PaType::ALL.to_vec())
}

/// Requirement lists with unique ids drawn from a small pool.
fn requirements() -> impl Strategy<Value = Vec<DocumentRequirement>> {
    proptest::collection::btree_map("[a-f]", any::<bool>(), 0..6).prop_map(|ids| {
        ids.into_iter()
            .map(|(id, required)| DocumentRequirement::new(id.clone(), id, "", required))
            .collect()
    })
}

/// Stored items, possibly stale, repeated or with a broken file-name
/// pairing, over an overlapping id pool.
fn stored_items() -> impl Strategy<Value = Vec<DocumentChecklistItem>> {
    proptest::collection::vec(
        ("[a-h]", any::<bool>(), proptest::option::of("[a-z]{1,8}\\.pdf")).prop_map(
            |(requirement_id, uploaded, file_name)| DocumentChecklistItem {
                requirement_id,
                uploaded,
                file_name,
            },
        ),
        0..10,
    )
}

proptest! {
    /// The step index stays within the seven steps for any navigation sequence
    #[test]
    fn navigation_stays_in_bounds(moves in proptest::collection::vec(nav(), 0..40)) {
        let mut wizard = WizardController::new();
        let mut expected: usize = 0;

        for m in moves {
            match m {
                Nav::Next => {
                    wizard.go_next();
                    expected = (expected + 1).min(WizardStep::COUNT - 1);
                }
                Nav::Back => {
                    wizard.go_back();
                    expected = expected.saturating_sub(1);
                }
            }
            prop_assert_eq!(wizard.current_step(), expected);
        }
    }

    /// Provider updates never touch any other slice
    #[test]
    fn provider_update_is_isolated(name in ".{0,20}", npi in "[0-9]{0,12}", category in pa_type()) {
        let mut wizard = WizardController::new();
        wizard.update_slice(DraftSlice::Notes("keep".to_string()));
        wizard.update_slice(DraftSlice::ServiceInfo(pa_wizard_core::ServiceInfo {
            pa_type: category,
            ..Default::default()
        }));
        let before = wizard.draft().clone();

        wizard.update_slice(DraftSlice::ProviderInfo(ProviderInfo {
            provider_name: name.clone(),
            provider_npi: npi,
            ..Default::default()
        }));

        let after = wizard.draft();
        prop_assert!(Arc::ptr_eq(&before.member_info, &after.member_info));
        prop_assert!(Arc::ptr_eq(&before.service_info, &after.service_info));
        prop_assert!(Arc::ptr_eq(&before.document_checklist, &after.document_checklist));
        prop_assert!(Arc::ptr_eq(&before.notes, &after.notes));
        prop_assert_eq!(&after.provider_info.provider_name, &name);
    }

    /// Reconciled items match the requirements one-to-one, in order
    #[test]
    fn reconcile_matches_requirement_shape(reqs in requirements(), stored in stored_items()) {
        let items = reconcile(&reqs, &stored);
        prop_assert_eq!(items.len(), reqs.len());
        for (req, item) in reqs.iter().zip(items.iter()) {
            prop_assert_eq!(&req.id, &item.requirement_id);
            prop_assert_eq!(item.uploaded, item.file_name.is_some());
        }
    }

    /// Reconciling a reconciled checklist changes nothing
    #[test]
    fn reconcile_is_idempotent(reqs in requirements(), stored in stored_items()) {
        let once = reconcile(&reqs, &stored);
        let twice = reconcile(&reqs, &once);
        prop_assert_eq!(once, twice);
    }

    /// Toggling the same id twice restores the reconciled checklist
    #[test]
    fn toggle_twice_restores(
        reqs in requirements(),
        stored in stored_items(),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!reqs.is_empty());
        let id = reqs[pick.index(reqs.len())].id.clone();

        let original = ReconciledChecklist::reconcile(&reqs, &stored);
        let mut checklist = original.clone();
        let first = checklist.toggle(&id);
        let second = checklist.toggle(&id);

        prop_assert_eq!(first.map(|u| !u), second);
        // A stored upload with a custom file name comes back as the placeholder name
        prop_assert_eq!(
            checklist.items().iter().map(|i| i.uploaded).collect::<Vec<_>>(),
            original.items().iter().map(|i| i.uploaded).collect::<Vec<_>>()
        );
    }

    /// Metric counts are mutually consistent
    #[test]
    fn metrics_are_consistent(reqs in requirements(), stored in stored_items()) {
        let metrics = ReconciledChecklist::reconcile(&reqs, &stored).metrics();
        prop_assert_eq!(metrics.total_count, reqs.len());
        prop_assert_eq!(metrics.required_count, reqs.iter().filter(|r| r.required).count());
        prop_assert!(metrics.required_uploaded_count <= metrics.required_count);
        prop_assert!(metrics.required_uploaded_count <= metrics.uploaded_count);
        prop_assert!(metrics.uploaded_count <= metrics.total_count);
    }

    /// After any category switch the draft never holds details for another category
    #[test]
    fn category_switch_keeps_details_consistent(first in pa_type(), second in pa_type()) {
        let mut wizard = WizardController::new();
        wizard.update_slice(DraftSlice::ServiceInfo(pa_wizard_core::ServiceInfo {
            pa_type: first,
            ..Default::default()
        }));
        if let Some(editor) = wizard.detail_editor() {
            wizard.apply_details(editor.details());
        }

        wizard.update_slice(DraftSlice::ServiceInfo(pa_wizard_core::ServiceInfo {
            pa_type: second,
            ..Default::default()
        }));

        prop_assert!(wizard.draft().details_consistent());
        let catalog = StaticCatalog::standard();
        let checklist = wizard.checklist(&catalog);
        prop_assert_eq!(checklist.items().len(), checklist.requirements().len());
    }
}
