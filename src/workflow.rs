//! Screening workflow orchestrator.
//!
//! Single entry point that drives the screening pipeline:
//! intake → advisory → persist, then per upload:
//! store image → preprocess → classify → one-statement record update.
//!
//! Collaborators are trait-injected (TextGenerator, ClassifierModel) so the
//! whole flow is testable without Ollama or an ONNX model on disk.

use std::path::PathBuf;

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::enums::{ImageVerdict, RecordState};
use crate::models::{PatientIntake, PatientRecord};
use crate::pipeline::advisory::AdvisoryGenerator;
use crate::pipeline::classify::SlideClassifier;
use crate::pipeline::preprocess;
use crate::pipeline::ClassifierError;
use crate::reconcile::reconcile;
use crate::report::{self, RenderError};
use crate::storage::{self, StorageError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Caller-facing faults of the screening workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Invalid intake: {0}")]
    Validation(String),

    #[error("No patient record with id {0}")]
    NotFound(Uuid),

    #[error("Classification failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Report rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Image storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives intake, classification and reporting for patient records.
///
/// Holds its collaborators and the uploads directory for the process
/// lifetime; the database connection is passed per call.
pub struct ScreeningWorkflow {
    advisory: AdvisoryGenerator,
    classifier: SlideClassifier,
    uploads_dir: PathBuf,
}

impl ScreeningWorkflow {
    pub fn new(
        advisory: AdvisoryGenerator,
        classifier: SlideClassifier,
        uploads_dir: PathBuf,
    ) -> Self {
        Self {
            advisory,
            classifier,
            uploads_dir,
        }
    }

    /// Create a patient record from intake fields.
    ///
    /// Validation failures persist nothing. Advisory generation runs before
    /// the insert and cannot fail (it degrades to placeholder text), so the
    /// record first becomes visible already in `AdvisoryReady` — from the
    /// outside, creation is one step.
    pub fn create(
        &self,
        conn: &Connection,
        intake: &PatientIntake,
    ) -> Result<PatientRecord, WorkflowError> {
        let age = validate_intake(intake)?;

        let now = Utc::now().naive_utc();
        let mut record = PatientRecord {
            id: Uuid::new_v4(),
            name: intake.name.trim().to_string(),
            age,
            gender: intake.gender.trim().to_string(),
            contact: intake.contact.trim().to_string(),
            symptoms: intake.symptoms.trim().to_string(),
            advisory_text: String::new(),
            image_path: None,
            image_verdict: ImageVerdict::Unset,
            state: RecordState::Created,
            created_at: now,
            updated_at: now,
        };

        record.advisory_text = self.advisory.generate(&record.symptoms);
        record.state = RecordState::AdvisoryReady;

        repository::insert_patient(conn, &record)?;

        tracing::info!(record_id = %record.id, "Patient record created");
        Ok(record)
    }

    /// Store a slide image for a record and classify it.
    ///
    /// The image file is written before any record mutation; the record is
    /// only touched after classification succeeds, and then in a single
    /// UPDATE covering image path, verdict and state together. Any
    /// preprocessing or classification failure surfaces to the caller and
    /// leaves the stored record exactly as it was, prior verdict included.
    pub fn upload_and_classify(
        &self,
        conn: &Connection,
        id: &Uuid,
        image_bytes: &[u8],
    ) -> Result<PatientRecord, WorkflowError> {
        let record = repository::get_patient(conn, id)?.ok_or(WorkflowError::NotFound(*id))?;

        let saved_path = storage::save_slide_image(&self.uploads_dir, id, image_bytes)?;

        let tensor = preprocess::preprocess_slide(&saved_path)?;
        let verdict = self.classifier.classify(&tensor)?;

        // First classification enters ImageClassified; every later one is a
        // reclassification of the same record, not an error.
        let state = if record.image_verdict == ImageVerdict::Unset {
            RecordState::ImageClassified
        } else {
            RecordState::Reclassified
        };

        let path_text = saved_path.to_string_lossy().to_string();
        repository::update_slide_result(
            conn,
            id,
            &path_text,
            &verdict,
            &state,
            Utc::now().naive_utc(),
        )?;

        tracing::info!(
            record_id = %id,
            verdict = verdict.as_str(),
            state = state.as_str(),
            "Slide classified and record updated"
        );

        repository::get_patient(conn, id)?.ok_or(WorkflowError::NotFound(*id))
    }

    /// Render the diagnostic report for a record. Never mutates.
    pub fn build_report(&self, conn: &Connection, id: &Uuid) -> Result<Vec<u8>, WorkflowError> {
        let record = repository::get_patient(conn, id)?.ok_or(WorkflowError::NotFound(*id))?;

        let diagnosis = reconcile(&record);
        tracing::debug!(record_id = %id, diagnosis = %diagnosis, "Building report");

        Ok(report::render_report(&record)?)
    }

    /// All records, in insertion order.
    pub fn list(&self, conn: &Connection) -> Result<Vec<PatientRecord>, WorkflowError> {
        Ok(repository::list_patients(conn)?)
    }
}

/// Check intake fields, returning the parsed age.
fn validate_intake(intake: &PatientIntake) -> Result<u32, WorkflowError> {
    if intake.name.trim().is_empty() {
        return Err(WorkflowError::Validation("name must not be empty".into()));
    }

    let age_text = intake.age.trim();
    let age = age_text.parse::<u32>().map_err(|_| {
        WorkflowError::Validation(format!(
            "age must be a non-negative integer, got '{age_text}'"
        ))
    })?;

    if intake.gender.trim().is_empty() {
        return Err(WorkflowError::Validation("gender must not be empty".into()));
    }
    if intake.contact.trim().is_empty() {
        return Err(WorkflowError::Validation("contact must not be empty".into()));
    }

    // Symptoms may be empty: the advisory generator handles that case.
    Ok(age)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
