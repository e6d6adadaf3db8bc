use program_core::model::{CompletedDays, Enrollment, EnrollmentId, ProgramId, UserId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn id_to_i64(id: EnrollmentId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("id overflow".into()))
}

pub(crate) fn version_to_i64(version: u64) -> Result<i64, StorageError> {
    i64::try_from(version).map_err(|_| StorageError::Serialization("version overflow".into()))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn enrollment_id_from_i64(v: i64) -> Result<EnrollmentId, StorageError> {
    Ok(EnrollmentId::new(i64_to_u64("id", v)?))
}

/// `completed_days` is stored as a JSON object: `{"1": [1, 2, 3]}`.
pub(crate) fn encode_completed_days(days: &CompletedDays) -> Result<String, StorageError> {
    serde_json::to_string(days).map_err(ser)
}

pub(crate) fn decode_completed_days(raw: &str) -> Result<CompletedDays, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_enrollment_row(row: &SqliteRow) -> Result<Enrollment, StorageError> {
    let id = enrollment_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let user_id: UserId = row
        .try_get::<String, _>("user_id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let program_id = ProgramId::new(row.try_get::<String, _>("program_id").map_err(ser)?)
        .map_err(ser)?;

    let current_week_i64: i64 = row.try_get("current_week").map_err(ser)?;
    let current_week = u32::try_from(current_week_i64).map_err(|_| {
        StorageError::Serialization(format!("invalid current_week: {current_week_i64}"))
    })?;

    let completed_days =
        decode_completed_days(&row.try_get::<String, _>("completed_days").map_err(ser)?)?;
    let version = i64_to_u64("version", row.try_get::<i64, _>("version").map_err(ser)?)?;

    Enrollment::from_persisted(
        id,
        user_id,
        program_id,
        current_week,
        completed_days,
        version,
        row.try_get("enrolled_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn completed_days_json_shape() {
        let mut days = CompletedDays::new();
        days.insert(1, BTreeSet::from([1, 2, 3]));
        days.insert(2, BTreeSet::from([7]));
        let raw = encode_completed_days(&days).unwrap();
        assert_eq!(raw, r#"{"1":[1,2,3],"2":[7]}"#);
        assert_eq!(decode_completed_days(&raw).unwrap(), days);
    }

    #[test]
    fn decode_rejects_non_numeric_weeks() {
        let err = decode_completed_days(r#"{"one":[1]}"#).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn negative_ids_are_rejected() {
        assert!(enrollment_id_from_i64(-1).is_err());
        assert_eq!(enrollment_id_from_i64(5).unwrap(), EnrollmentId::new(5));
    }
}
