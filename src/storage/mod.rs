//! Storage backend selection

pub mod memory;

use std::sync::Arc;

use crate::config::{Config, DatabaseConfig, StorageBackend};
use crate::core::{AppError, Result};
use crate::modules::appointments::repositories::{
    AppointmentRepository, MySqlAppointmentRepository,
};
use crate::modules::doctors::repositories::{DoctorRepository, MySqlDoctorRepository};

pub use memory::InMemoryStore;

/// Repository handles shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub appointments: Arc<dyn AppointmentRepository>,
    pub doctors: Arc<dyn DoctorRepository>,
}

impl Repositories {
    /// Both repositories backed by one fresh in-memory store
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            appointments: store.clone(),
            doctors: store,
        }
    }

    pub fn mysql(pool: sqlx::MySqlPool) -> Self {
        Self {
            appointments: Arc::new(MySqlAppointmentRepository::new(pool.clone())),
            doctors: Arc::new(MySqlDoctorRepository::new(pool)),
        }
    }

    /// Build the repositories selected by `config`, connecting and migrating
    /// the database when needed
    pub async fn connect(config: &Config) -> Result<Self> {
        match config.storage {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::in_memory())
            }
            StorageBackend::MySql => {
                let database = config.database.as_ref().ok_or_else(|| {
                    AppError::Configuration("MySQL storage selected without database settings".to_string())
                })?;

                let pool = database.create_pool().await?;
                tracing::info!(
                    "Database pool initialized ({} connections)",
                    database.max_connections
                );

                if database.run_migrations {
                    DatabaseConfig::migrate(&pool).await?;
                    tracing::info!("Database migrations applied");
                }

                Ok(Self::mysql(pool))
            }
        }
    }
}
