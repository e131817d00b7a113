use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::doctors::models::Doctor;

/// Storage operations for doctors
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// Every doctor, ordered by name
    async fn find_all(&self) -> Result<Vec<Doctor>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Doctor>>;

    /// Store a doctor; fails with `DoctorAlreadyExists` when the name is taken
    async fn insert(&self, name: &str) -> Result<Doctor>;

    /// Remove a doctor, returning whether it existed.
    ///
    /// Fails with `DoctorHasAppointments` while appointments reference the name.
    async fn delete(&self, name: &str) -> Result<bool>;
}

/// MySQL-backed doctor storage
#[derive(Clone)]
pub struct MySqlDoctorRepository {
    pool: MySqlPool,
}

impl MySqlDoctorRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DoctorRepository for MySqlDoctorRepository {
    async fn find_all(&self) -> Result<Vec<Doctor>> {
        let doctors = sqlx::query_as::<_, Doctor>("SELECT id, name FROM doctors ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(doctors)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Doctor>> {
        let doctor = sqlx::query_as::<_, Doctor>("SELECT id, name FROM doctors WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(doctor)
    }

    async fn insert(&self, name: &str) -> Result<Doctor> {
        let result = sqlx::query("INSERT INTO doctors (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return AppError::DoctorAlreadyExists(name.to_string());
                    }
                }
                AppError::Database(e)
            })?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|_| AppError::internal("Doctor id out of range"))?;

        Ok(Doctor {
            id,
            name: name.to_string(),
        })
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM doctors WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::DoctorHasAppointments(name.to_string());
                    }
                }
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
