//! Variant editors and category dispatch.
//!
//! An editor is opened against whatever the draft currently holds. If that
//! is nothing, or a record for another category, the editor starts from the
//! category default instead of failing. Every edit yields the entire
//! variant record, never a field delta, so the union stays fully shaped.

use std::fmt;

use crate::types::PaType;

use super::{
    DurableEquipmentDetails, HomeHealthDetails, ImagingDetails, InpatientDetails,
    OutpatientDetails, PaTypeDetails, PharmacyDetails,
};

/// A record that is one case of [`PaTypeDetails`].
pub trait VariantRecord: Clone + Default + PartialEq + fmt::Debug {
    /// Category whose tag selects this record.
    const CATEGORY: PaType;

    /// Borrow the record if `details` is this variant.
    fn from_details(details: &PaTypeDetails) -> Option<&Self>;

    /// Wrap the record back into the union.
    fn into_details(self) -> PaTypeDetails;

    /// Restore field floors after an edit.
    fn normalize(&mut self) {}
}

impl VariantRecord for InpatientDetails {
    const CATEGORY: PaType = PaType::Inpatient;

    fn from_details(details: &PaTypeDetails) -> Option<&Self> {
        match details {
            PaTypeDetails::Inpatient(d) => Some(d),
            _ => None,
        }
    }

    fn into_details(self) -> PaTypeDetails {
        PaTypeDetails::Inpatient(self)
    }

    fn normalize(&mut self) {
        self.estimated_los = self.estimated_los.max(1);
    }
}

impl VariantRecord for OutpatientDetails {
    const CATEGORY: PaType = PaType::Outpatient;

    fn from_details(details: &PaTypeDetails) -> Option<&Self> {
        match details {
            PaTypeDetails::Outpatient(d) => Some(d),
            _ => None,
        }
    }

    fn into_details(self) -> PaTypeDetails {
        PaTypeDetails::Outpatient(self)
    }
}

impl VariantRecord for PharmacyDetails {
    const CATEGORY: PaType = PaType::Pharmacy;

    fn from_details(details: &PaTypeDetails) -> Option<&Self> {
        match details {
            PaTypeDetails::Pharmacy(d) => Some(d),
            _ => None,
        }
    }

    fn into_details(self) -> PaTypeDetails {
        PaTypeDetails::Pharmacy(self)
    }

    fn normalize(&mut self) {
        self.quantity_requested = self.quantity_requested.max(1);
        self.days_supply = self.days_supply.max(1);
    }
}

impl VariantRecord for ImagingDetails {
    const CATEGORY: PaType = PaType::Imaging;

    fn from_details(details: &PaTypeDetails) -> Option<&Self> {
        match details {
            PaTypeDetails::Imaging(d) => Some(d),
            _ => None,
        }
    }

    fn into_details(self) -> PaTypeDetails {
        PaTypeDetails::Imaging(self)
    }
}

impl VariantRecord for DurableEquipmentDetails {
    const CATEGORY: PaType = PaType::DurableEquipment;

    fn from_details(details: &PaTypeDetails) -> Option<&Self> {
        match details {
            PaTypeDetails::DurableEquipment(d) => Some(d),
            _ => None,
        }
    }

    fn into_details(self) -> PaTypeDetails {
        PaTypeDetails::DurableEquipment(self)
    }

    fn normalize(&mut self) {
        self.duration_months = self.duration_months.max(1);
    }
}

impl VariantRecord for HomeHealthDetails {
    const CATEGORY: PaType = PaType::HomeHealth;

    fn from_details(details: &PaTypeDetails) -> Option<&Self> {
        match details {
            PaTypeDetails::HomeHealth(d) => Some(d),
            _ => None,
        }
    }

    fn into_details(self) -> PaTypeDetails {
        PaTypeDetails::HomeHealth(self)
    }
}

/// Editor for a single variant record.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantEditor<T: VariantRecord> {
    record: T,
}

impl<T: VariantRecord> VariantEditor<T> {
    /// Open against the draft's details, defaulting on absence or mismatch.
    ///
    /// Loaded records are normalized before they are shown.
    pub fn open(data: Option<&PaTypeDetails>) -> Self {
        let mut record = PaTypeDetails::resolve(T::CATEGORY, data)
            .as_ref()
            .and_then(T::from_details)
            .cloned()
            .unwrap_or_default();
        record.normalize();
        Self { record }
    }

    /// The record being edited.
    pub fn record(&self) -> &T {
        &self.record
    }

    /// Apply one edit and return the whole updated record.
    ///
    /// The edit runs on a copy; the editor only adopts it once normalized.
    pub fn update(&mut self, edit: impl FnOnce(&mut T)) -> PaTypeDetails {
        let mut next = self.record.clone();
        edit(&mut next);
        next.normalize();
        self.record = next.clone();
        next.into_details()
    }

    /// Like [`VariantEditor::update`], handing the result to a change callback.
    pub fn update_with(
        &mut self,
        edit: impl FnOnce(&mut T),
        on_change: impl FnOnce(PaTypeDetails),
    ) {
        on_change(self.update(edit));
    }

    /// Current record wrapped in the union.
    pub fn details(&self) -> PaTypeDetails {
        self.record.clone().into_details()
    }
}

/// The one editor selected by a draft's category.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailEditor {
    Inpatient(VariantEditor<InpatientDetails>),
    Outpatient(VariantEditor<OutpatientDetails>),
    Pharmacy(VariantEditor<PharmacyDetails>),
    Imaging(VariantEditor<ImagingDetails>),
    DurableEquipment(VariantEditor<DurableEquipmentDetails>),
    HomeHealth(VariantEditor<HomeHealthDetails>),
}

impl DetailEditor {
    /// Select the editor for `pa_type`.
    ///
    /// Returns `None` for `general`. Stale data for another category is
    /// never shown: the editor opens on defaults instead.
    pub fn for_category(pa_type: PaType, data: Option<&PaTypeDetails>) -> Option<Self> {
        let editor = match pa_type {
            PaType::General => return None,
            PaType::Inpatient => DetailEditor::Inpatient(VariantEditor::open(data)),
            PaType::Outpatient => DetailEditor::Outpatient(VariantEditor::open(data)),
            PaType::Pharmacy => DetailEditor::Pharmacy(VariantEditor::open(data)),
            PaType::Imaging => DetailEditor::Imaging(VariantEditor::open(data)),
            PaType::DurableEquipment => DetailEditor::DurableEquipment(VariantEditor::open(data)),
            PaType::HomeHealth => DetailEditor::HomeHealth(VariantEditor::open(data)),
        };
        Some(editor)
    }

    /// Category this editor serves.
    pub fn category(&self) -> PaType {
        match self {
            DetailEditor::Inpatient(_) => InpatientDetails::CATEGORY,
            DetailEditor::Outpatient(_) => OutpatientDetails::CATEGORY,
            DetailEditor::Pharmacy(_) => PharmacyDetails::CATEGORY,
            DetailEditor::Imaging(_) => ImagingDetails::CATEGORY,
            DetailEditor::DurableEquipment(_) => DurableEquipmentDetails::CATEGORY,
            DetailEditor::HomeHealth(_) => HomeHealthDetails::CATEGORY,
        }
    }

    /// Current record wrapped in the union.
    pub fn details(&self) -> PaTypeDetails {
        match self {
            DetailEditor::Inpatient(e) => e.details(),
            DetailEditor::Outpatient(e) => e.details(),
            DetailEditor::Pharmacy(e) => e.details(),
            DetailEditor::Imaging(e) => e.details(),
            DetailEditor::DurableEquipment(e) => e.details(),
            DetailEditor::HomeHealth(e) => e.details(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::{Discipline, Modality};

    #[test]
    fn test_open_without_data_uses_defaults() {
        let editor = VariantEditor::<PharmacyDetails>::open(None);
        assert_eq!(editor.record(), &PharmacyDetails::default());
    }

    #[test]
    fn test_open_with_matching_data_keeps_it() {
        let data = PaTypeDetails::Imaging(ImagingDetails {
            modality: Modality::Ct,
            body_part: "Chest".to_string(),
            ..Default::default()
        });
        let editor = VariantEditor::<ImagingDetails>::open(Some(&data));
        assert_eq!(editor.record().body_part, "Chest");
        assert_eq!(editor.record().modality, Modality::Ct);
    }

    #[test]
    fn test_update_emits_whole_record() {
        let mut editor = VariantEditor::<InpatientDetails>::open(None);
        let details = editor.update(|r| r.attending_physician = "Dr. Reyes".to_string());

        match details {
            PaTypeDetails::Inpatient(d) => {
                assert_eq!(d.attending_physician, "Dr. Reyes");
                assert_eq!(d.estimated_los, 1);
                assert!(d.facility_name.is_empty());
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_open_normalizes_loaded_record() {
        let loaded: PaTypeDetails =
            serde_json::from_str(r#"{"type": "inpatient", "estimatedLOS": 0}"#).unwrap();
        let editor = VariantEditor::<InpatientDetails>::open(Some(&loaded));
        assert_eq!(editor.record().estimated_los, 1);
    }

    #[test]
    fn test_update_restores_floor() {
        let mut editor = VariantEditor::<PharmacyDetails>::open(None);
        editor.update(|r| {
            r.days_supply = 0;
            r.quantity_requested = 30;
        });
        assert_eq!(editor.record().days_supply, 1);
        assert_eq!(editor.record().quantity_requested, 30);
    }

    #[test]
    fn test_update_with_calls_on_change_once() {
        let mut editor = VariantEditor::<HomeHealthDetails>::open(None);
        let mut seen = Vec::new();
        editor.update_with(
            |r| {
                r.toggle_discipline(Discipline::Speech);
            },
            |d| seen.push(d),
        );

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].category(), PaType::HomeHealth);
    }

    #[test]
    fn test_dispatch_category_switch_shows_defaults() {
        let stale = PaTypeDetails::Imaging(ImagingDetails {
            body_part: "Knee".to_string(),
            contrast_required: true,
            ..Default::default()
        });

        let editor = DetailEditor::for_category(PaType::Pharmacy, Some(&stale)).unwrap();
        assert_eq!(editor.category(), PaType::Pharmacy);
        assert_eq!(editor.details(), PaTypeDetails::Pharmacy(PharmacyDetails::default()));
    }

    #[test]
    fn test_dispatch_general_has_no_editor() {
        assert!(DetailEditor::for_category(PaType::General, None).is_none());
    }
}
