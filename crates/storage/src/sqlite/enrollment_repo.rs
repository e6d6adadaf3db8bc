use async_trait::async_trait;
use program_core::model::{Enrollment, EnrollmentId, ProgramId, UserId};

use super::SqliteRepository;
use super::mapping::{
    encode_completed_days, enrollment_id_from_i64, id_to_i64, map_enrollment_row, version_to_i64,
};
use crate::repository::{EnrollmentRepository, NewEnrollmentRecord, StorageError};

const SELECT_COLUMNS: &str = r"
    SELECT id, user_id, program_id, current_week, completed_days, version, enrolled_at, updated_at
    FROM enrollments
";

fn connection(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl EnrollmentRepository for SqliteRepository {
    async fn get_enrollment(
        &self,
        user_id: UserId,
        program_id: &ProgramId,
    ) -> Result<Option<Enrollment>, StorageError> {
        let sql = format!("{SELECT_COLUMNS} WHERE user_id = ?1 AND program_id = ?2");
        let row = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(program_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(connection)?;

        row.as_ref().map(map_enrollment_row).transpose()
    }

    async fn get_enrollment_by_id(
        &self,
        id: EnrollmentId,
    ) -> Result<Option<Enrollment>, StorageError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(connection)?;

        row.as_ref().map(map_enrollment_row).transpose()
    }

    async fn insert_enrollment(
        &self,
        record: NewEnrollmentRecord,
    ) -> Result<Enrollment, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO enrollments (user_id, program_id, current_week, completed_days, version, enrolled_at, updated_at)
            VALUES (?1, ?2, 1, '{}', 0, ?3, ?3)
            ",
        )
        .bind(record.user_id.to_string())
        .bind(record.program_id.as_str())
        .bind(record.enrolled_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return StorageError::Conflict;
                }
            }
            connection(e)
        })?;

        let id = enrollment_id_from_i64(res.last_insert_rowid())?;
        Ok(Enrollment::new(
            id,
            record.user_id,
            record.program_id,
            record.enrolled_at,
        ))
    }

    async fn update_enrollment(
        &self,
        expected_version: u64,
        next: &Enrollment,
    ) -> Result<Enrollment, StorageError> {
        let id = id_to_i64(next.id())?;
        let expected = version_to_i64(expected_version)?;

        let res = sqlx::query(
            r"
            UPDATE enrollments
            SET current_week = ?1,
                completed_days = ?2,
                updated_at = ?3,
                version = version + 1
            WHERE id = ?4 AND version = ?5
            ",
        )
        .bind(i64::from(next.current_week()))
        .bind(encode_completed_days(next.completed_days())?)
        .bind(next.updated_at())
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(connection)?;

        if res.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM enrollments WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(connection)?
                .is_some();
            return Err(if exists {
                StorageError::Conflict
            } else {
                StorageError::NotFound
            });
        }

        Ok(next.clone().with_version(expected_version + 1))
    }

    async fn list_enrollments(&self, user_id: UserId) -> Result<Vec<Enrollment>, StorageError> {
        let sql = format!("{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY id ASC");
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(connection)?;

        let mut enrollments = Vec::with_capacity(rows.len());
        for row in rows {
            enrollments.push(map_enrollment_row(&row)?);
        }
        Ok(enrollments)
    }
}
