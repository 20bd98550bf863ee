use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ═══════════════════════════════════════════
// Patient Record Repository
// ═══════════════════════════════════════════

pub fn insert_patient(conn: &Connection, record: &PatientRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, name, age, gender, contact, symptoms, advisory_text,
         image_path, image_verdict, state, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            record.id.to_string(),
            record.name,
            record.age,
            record.gender,
            record.contact,
            record.symptoms,
            record.advisory_text,
            record.image_path,
            record.image_verdict.as_str(),
            record.state.as_str(),
            record.created_at.format(TIMESTAMP_FORMAT).to_string(),
            record.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<PatientRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, age, gender, contact, symptoms, advisory_text,
         image_path, image_verdict, state, created_at, updated_at
         FROM patients WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok(PatientRow {
            id: row.get::<_, String>(0)?,
            name: row.get::<_, String>(1)?,
            age: row.get::<_, i64>(2)?,
            gender: row.get::<_, String>(3)?,
            contact: row.get::<_, String>(4)?,
            symptoms: row.get::<_, String>(5)?,
            advisory_text: row.get::<_, String>(6)?,
            image_path: row.get::<_, Option<String>>(7)?,
            image_verdict: row.get::<_, String>(8)?,
            state: row.get::<_, String>(9)?,
            created_at: row.get::<_, String>(10)?,
            updated_at: row.get::<_, String>(11)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All records in intake order (oldest first).
pub fn list_patients(conn: &Connection) -> Result<Vec<PatientRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, age, gender, contact, symptoms, advisory_text,
         image_path, image_verdict, state, created_at, updated_at
         FROM patients ORDER BY rowid ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(PatientRow {
            id: row.get(0)?,
            name: row.get(1)?,
            age: row.get(2)?,
            gender: row.get(3)?,
            contact: row.get(4)?,
            symptoms: row.get(5)?,
            advisory_text: row.get(6)?,
            image_path: row.get(7)?,
            image_verdict: row.get(8)?,
            state: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    })?;

    let mut records = Vec::new();
    for row in rows {
        records.push(patient_from_row(row?)?);
    }
    Ok(records)
}

/// Apply a classification outcome. Path, verdict, state and updated_at land
/// in one statement so no reader ever sees a verdict without its image (or
/// the reverse).
pub fn update_slide_result(
    conn: &Connection,
    id: &Uuid,
    image_path: &str,
    verdict: &ImageVerdict,
    state: &RecordState,
    updated_at: NaiveDateTime,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE patients SET image_path = ?2, image_verdict = ?3, state = ?4, updated_at = ?5
         WHERE id = ?1",
        params![
            id.to_string(),
            image_path,
            verdict.as_str(),
            state.as_str(),
            updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;

    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "PatientRecord".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// Internal row type for PatientRecord mapping
struct PatientRow {
    id: String,
    name: String,
    age: i64,
    gender: String,
    contact: String,
    symptoms: String,
    advisory_text: String,
    image_path: Option<String>,
    image_verdict: String,
    state: String,
    created_at: String,
    updated_at: String,
}

fn patient_from_row(row: PatientRow) -> Result<PatientRecord, DatabaseError> {
    Ok(PatientRecord {
        id: Uuid::parse_str(&row.id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name: row.name,
        // age >= 0 is a schema CHECK, so the cast cannot lose sign
        age: row.age as u32,
        gender: row.gender,
        contact: row.contact,
        symptoms: row.symptoms,
        advisory_text: row.advisory_text,
        image_path: row.image_path,
        image_verdict: ImageVerdict::from_str(&row.image_verdict)?,
        state: RecordState::from_str(&row.state)?,
        created_at: NaiveDateTime::parse_from_str(&row.created_at, TIMESTAMP_FORMAT)
            .unwrap_or_default(),
        updated_at: NaiveDateTime::parse_from_str(&row.updated_at, TIMESTAMP_FORMAT)
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn make_record(name: &str) -> PatientRecord {
        let now = chrono::Utc::now().naive_utc();
        PatientRecord {
            id: Uuid::new_v4(),
            name: name.into(),
            age: 34,
            gender: "female".into(),
            contact: "0700 000 001".into(),
            symptoms: "fever, chills, night sweats".into(),
            advisory_text: "**Likely Conditions:**\n- Malaria\n- Influenza".into(),
            image_path: None,
            image_verdict: ImageVerdict::Unset,
            state: RecordState::AdvisoryReady,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn patient_insert_and_retrieve() {
        let conn = test_db();
        let record = make_record("Asha");
        insert_patient(&conn, &record).unwrap();

        let loaded = get_patient(&conn, &record.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Asha");
        assert_eq!(loaded.age, 34);
        assert_eq!(loaded.advisory_text, record.advisory_text);
        assert_eq!(loaded.image_verdict, ImageVerdict::Unset);
        assert_eq!(loaded.state, RecordState::AdvisoryReady);
        assert!(loaded.image_path.is_none());
    }

    #[test]
    fn get_missing_patient_is_none() {
        let conn = test_db();
        let found = get_patient(&conn, &Uuid::new_v4()).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn list_preserves_intake_order() {
        let conn = test_db();
        for name in ["First", "Second", "Third"] {
            insert_patient(&conn, &make_record(name)).unwrap();
        }

        let all = list_patients(&conn).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "First");
        assert_eq!(all[1].name, "Second");
        assert_eq!(all[2].name, "Third");
    }

    #[test]
    fn slide_result_updates_path_and_verdict_together() {
        let conn = test_db();
        let record = make_record("Asha");
        insert_patient(&conn, &record).unwrap();

        let later = record.updated_at + chrono::Duration::seconds(60);
        update_slide_result(
            &conn,
            &record.id,
            "/data/uploads/slide.png",
            &ImageVerdict::Positive,
            &RecordState::ImageClassified,
            later,
        )
        .unwrap();

        let loaded = get_patient(&conn, &record.id).unwrap().unwrap();
        assert_eq!(loaded.image_path.as_deref(), Some("/data/uploads/slide.png"));
        assert_eq!(loaded.image_verdict, ImageVerdict::Positive);
        assert_eq!(loaded.state, RecordState::ImageClassified);
        // Intake fields stay untouched
        assert_eq!(loaded.advisory_text, record.advisory_text);
        assert!(loaded.updated_at > loaded.created_at);
    }

    #[test]
    fn slide_result_on_missing_record_is_not_found() {
        let conn = test_db();
        let err = update_slide_result(
            &conn,
            &Uuid::new_v4(),
            "/data/uploads/slide.png",
            &ImageVerdict::Negative,
            &RecordState::ImageClassified,
            chrono::Utc::now().naive_utc(),
        )
        .unwrap_err();

        match err {
            DatabaseError::NotFound { entity_type, .. } => assert_eq!(entity_type, "PatientRecord"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_id_rejected() {
        let conn = test_db();
        let record = make_record("Asha");
        insert_patient(&conn, &record).unwrap();
        assert!(insert_patient(&conn, &record).is_err());
    }

    #[test]
    fn timestamps_round_trip() {
        let conn = test_db();
        let mut record = make_record("Asha");
        // Sub-second precision is not stored; use a whole second to compare
        record.created_at =
            NaiveDateTime::parse_from_str("2026-02-14 09:30:00", TIMESTAMP_FORMAT).unwrap();
        record.updated_at = record.created_at;
        insert_patient(&conn, &record).unwrap();

        let loaded = get_patient(&conn, &record.id).unwrap().unwrap();
        assert_eq!(loaded.created_at, record.created_at);
        assert_eq!(loaded.updated_at, record.updated_at);
    }
}
