//! Reconciliation of a record's two assessment sources into the diagnosis
//! line shown on reports.
//!
//! A record carries symptom-based advisory text and (optionally) a slide
//! verdict. These are never merged: the advisory is free text from a language
//! model and has no vote in the diagnosis. Only the slide verdict decides the
//! reported outcome, and a record with no classified slide reports as
//! pending no matter what the advisory says.

use std::fmt;

use crate::models::enums::ImageVerdict;
use crate::models::PatientRecord;

/// Diagnosis line for the report, derived from the slide verdict alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportableDiagnosis {
    MalariaDetected,
    NoMalaria,
    Pending,
}

impl ReportableDiagnosis {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportableDiagnosis::MalariaDetected => "Malaria Detected",
            ReportableDiagnosis::NoMalaria => "No Malaria",
            ReportableDiagnosis::Pending => "Pending (Image not uploaded)",
        }
    }
}

impl fmt::Display for ReportableDiagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive the reported diagnosis for a record.
///
/// Matches on the slide verdict only. `advisory_text` is deliberately not
/// read here: it is rendered alongside the diagnosis, never folded into it.
pub fn reconcile(record: &PatientRecord) -> ReportableDiagnosis {
    match record.image_verdict {
        ImageVerdict::Positive => ReportableDiagnosis::MalariaDetected,
        ImageVerdict::Negative => ReportableDiagnosis::NoMalaria,
        ImageVerdict::Unset => ReportableDiagnosis::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::RecordState;
    use chrono::Utc;
    use uuid::Uuid;

    fn record_with(verdict: ImageVerdict, advisory: &str) -> PatientRecord {
        let now = Utc::now().naive_utc();
        PatientRecord {
            id: Uuid::new_v4(),
            name: "Asha Mwangi".to_string(),
            age: 30,
            gender: "female".to_string(),
            contact: "0700 000 001".to_string(),
            symptoms: "fever, chills".to_string(),
            advisory_text: advisory.to_string(),
            image_path: None,
            image_verdict: verdict,
            state: RecordState::AdvisoryReady,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn positive_verdict_reports_malaria_detected() {
        let record = record_with(ImageVerdict::Positive, "Rest and fluids.");
        assert_eq!(reconcile(&record), ReportableDiagnosis::MalariaDetected);
    }

    #[test]
    fn negative_verdict_reports_no_malaria() {
        let record = record_with(ImageVerdict::Negative, "Rest and fluids.");
        assert_eq!(reconcile(&record), ReportableDiagnosis::NoMalaria);
    }

    #[test]
    fn unclassified_record_is_pending_whatever_the_advisory_says() {
        let record = record_with(
            ImageVerdict::Unset,
            "**Malaria Probability:** High. Symptoms strongly suggest malaria.",
        );
        assert_eq!(reconcile(&record), ReportableDiagnosis::Pending);
    }

    #[test]
    fn advisory_text_has_no_vote_in_the_diagnosis() {
        // Negative slide wins even when the advisory leans hard the other way
        let record = record_with(
            ImageVerdict::Negative,
            "**Malaria Probability:** Very high. Seek treatment immediately.",
        );
        assert_eq!(reconcile(&record), ReportableDiagnosis::NoMalaria);
    }

    #[test]
    fn display_strings_are_exact() {
        assert_eq!(
            ReportableDiagnosis::MalariaDetected.to_string(),
            "Malaria Detected"
        );
        assert_eq!(ReportableDiagnosis::NoMalaria.to_string(), "No Malaria");
        assert_eq!(
            ReportableDiagnosis::Pending.to_string(),
            "Pending (Image not uploaded)"
        );
    }
}
