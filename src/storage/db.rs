use std::time::Duration;

use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, Schema};

use crate::config::DatabaseConfig;
use crate::constants::IN_MEMORY_DATABASE_URL;
use crate::entities::{company, employee};
use crate::repositories::RepositoryManager;

/// Database handle. Cheap to clone; every clone shares the pool.
#[derive(Clone)]
pub struct Storage {
    pub(crate) conn: DatabaseConnection,
}

impl Storage {
    /// Connect using the configured URL and pool limits, then make sure the
    /// schema exists.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .sqlx_logging(config.sqlx_logging);

        let conn = Database::connect(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", config.url))?;

        let storage = Self { conn };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Private in-memory SQLite database.
    ///
    /// The pool is pinned to a single connection: every SQLite in-memory
    /// connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let mut options = ConnectOptions::new(IN_MEMORY_DATABASE_URL.to_string());
        options.max_connections(1).min_connections(1).sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .context("Failed to open in-memory database")?;

        let storage = Self { conn };
        storage.init_schema().await?;
        Ok(storage)
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Start a new unit of work on this database.
    pub fn unit_of_work(&self) -> RepositoryManager {
        RepositoryManager::new(self.conn.clone())
    }

    /// Create the tables from the entity definitions if they do not exist.
    async fn init_schema(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        // Companies first: employees reference them.
        let mut companies = schema.create_table_from_entity(company::Entity);
        companies.if_not_exists();
        self.conn
            .execute(backend.build(&companies))
            .await
            .context("Failed to create companies table")?;

        let mut employees = schema.create_table_from_entity(employee::Entity);
        employees.if_not_exists();
        self.conn
            .execute(backend.build(&employees))
            .await
            .context("Failed to create employees table")?;

        Ok(())
    }

    /// Check if the database has any companies
    pub async fn has_data(&self) -> Result<bool> {
        let count = company::Entity::find().count(&self.conn).await?;
        Ok(count > 0)
    }

    /// Clear all data from the database
    pub async fn clear_all_data(&self) -> Result<()> {
        employee::Entity::delete_many().exec(&self.conn).await?;
        company::Entity::delete_many().exec(&self.conn).await?;
        Ok(())
    }
}
