use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ImageVerdict, RecordState};

/// One screening episode for one patient.
///
/// `advisory_text` is written once at intake and never touched again.
/// `image_path` and `image_verdict` describe the same classification event
/// and are only ever updated together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: Uuid,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub contact: String,
    pub symptoms: String,
    pub advisory_text: String,
    pub image_path: Option<String>,
    pub image_verdict: ImageVerdict,
    pub state: RecordState,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Intake form payload as submitted by the caller. Everything arrives as
/// text; `age` is parsed and range-checked during validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientIntake {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub contact: String,
    pub symptoms: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn record_round_trips_through_json() {
        let created = NaiveDate::from_ymd_opt(2026, 8, 25)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let record = PatientRecord {
            id: Uuid::new_v4(),
            name: "Asha Mwangi".to_string(),
            age: 30,
            gender: "female".to_string(),
            contact: "0700 000 001".to_string(),
            symptoms: "fever, chills".to_string(),
            advisory_text: "Rest and fluids.".to_string(),
            image_path: Some("/data/uploads/slide.png".to_string()),
            image_verdict: ImageVerdict::Positive,
            state: RecordState::ImageClassified,
            created_at: created,
            updated_at: created,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: PatientRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, record.id);
        assert_eq!(back.image_verdict, record.image_verdict);
        assert_eq!(back.state, record.state);
        assert_eq!(back.created_at, record.created_at);
    }

    #[test]
    fn intake_deserializes_from_form_json() {
        let json = r#"{"name":"Asha","age":"30","gender":"female","contact":"0700 000 001","symptoms":"fever"}"#;
        let intake: PatientIntake = serde_json::from_str(json).unwrap();
        assert_eq!(intake.name, "Asha");
        assert_eq!(intake.age, "30");
    }
}
