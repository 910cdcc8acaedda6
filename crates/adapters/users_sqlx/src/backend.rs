//! `SQLite` implementation of [`UserBackend`] and its factory.

use std::future::Future;

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use dashconf_app::ports::{UserBackend, UserBackendFactory};
use dashconf_domain::backend::{AuthBackend, BackendKind};
use dashconf_domain::error::DashConfError;
use dashconf_domain::resource::{DbResource, DbType, Resource, ResourceKind};

use crate::error::UserBackendError;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS dashconf_user (
    name TEXT NOT NULL PRIMARY KEY,
    active INTEGER NOT NULL DEFAULT 1,
    password_hash TEXT NOT NULL,
    ctime TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)";
const SELECT_NAMES: &str = "SELECT name FROM dashconf_user ORDER BY name";
const COUNT: &str = "SELECT COUNT(*) FROM dashconf_user";
const INSERT: &str = "INSERT INTO dashconf_user (name, active, password_hash) VALUES (?, 1, ?)";

fn hash_password(password: &str) -> Result<String, UserBackendError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(UserBackendError::PasswordHash)
}

/// Users stored in a `SQLite` database.
#[derive(Debug, Clone)]
pub struct SqliteUserBackend {
    pool: SqlitePool,
}

impl SqliteUserBackend {
    /// Open the database file of `resource`, creating it and the user table
    /// when missing.
    ///
    /// # Errors
    ///
    /// Returns [`UserBackendError::Database`] if the connection fails.
    pub async fn open(resource: &DbResource) -> Result<Self, UserBackendError> {
        let options = SqliteConnectOptions::new()
            .filename(&resource.dbname)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// Use an existing pool, ensuring the user table exists.
    ///
    /// # Errors
    ///
    /// Returns [`UserBackendError::Database`] if the table cannot be created.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, UserBackendError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

impl UserBackend for SqliteUserBackend {
    fn list_users(&self) -> impl Future<Output = Result<Vec<String>, DashConfError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<(String,)> = sqlx::query_as(SELECT_NAMES)
                .fetch_all(&pool)
                .await
                .map_err(UserBackendError::from)?;
            Ok(rows.into_iter().map(|(name,)| name).collect())
        }
    }

    fn count_users(&self) -> impl Future<Output = Result<usize, DashConfError>> + Send {
        let pool = self.pool.clone();
        async move {
            let (count,): (i64,) = sqlx::query_as(COUNT)
                .fetch_one(&pool)
                .await
                .map_err(UserBackendError::from)?;
            Ok(usize::try_from(count).unwrap_or_default())
        }
    }

    fn create_user(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), DashConfError>> + Send {
        let pool = self.pool.clone();
        let username = username.to_string();
        let hashed = hash_password(password);
        async move {
            sqlx::query(INSERT)
                .bind(&username)
                .bind(hashed?)
                .execute(&pool)
                .await
                .map_err(UserBackendError::from)?;
            tracing::info!(user = %username, "user created");
            Ok(())
        }
    }
}

/// Connects `db` backends on `SQLite` resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxUserBackendFactory;

impl SqlxUserBackendFactory {
    async fn open(
        backend: &AuthBackend,
        resource: &Resource,
    ) -> Result<SqliteUserBackend, UserBackendError> {
        match (&backend.kind, &resource.kind) {
            (BackendKind::Db { .. }, ResourceKind::Db(db)) if db.db == DbType::Sqlite => {
                SqliteUserBackend::open(db).await
            }
            (BackendKind::Db { .. }, ResourceKind::Db(db)) => {
                Err(UserBackendError::UnsupportedDriver(db.db))
            }
            (BackendKind::Db { .. }, _) => Err(UserBackendError::ResourceMismatch {
                backend: backend.name.clone(),
                resource: resource.name.clone(),
            }),
            (kind, _) => Err(UserBackendError::UnsupportedBackend(kind.type_name())),
        }
    }
}

impl UserBackendFactory for SqlxUserBackendFactory {
    type Backend = SqliteUserBackend;

    fn connect(
        &self,
        backend: &AuthBackend,
        resource: &Resource,
    ) -> impl Future<Output = Result<SqliteUserBackend, DashConfError>> + Send {
        let backend = backend.clone();
        let resource = resource.clone();
        async move { Ok(Self::open(&backend, &resource).await?) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_resource(path: &std::path::Path) -> Resource {
        Resource {
            name: "web_db".to_string(),
            kind: ResourceKind::Db(DbResource {
                db: DbType::Sqlite,
                host: None,
                port: None,
                dbname: path.display().to_string(),
                username: None,
                password: None,
            }),
        }
    }

    fn db_backend() -> AuthBackend {
        AuthBackend {
            name: "web".to_string(),
            kind: BackendKind::Db {
                resource: "web_db".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn should_create_and_list_users() {
        let dir = tempfile::tempdir().unwrap();
        let resource = sqlite_resource(&dir.path().join("users.db"));
        let users = SqlxUserBackendFactory
            .connect(&db_backend(), &resource)
            .await
            .unwrap();
        assert_eq!(users.count_users().await.unwrap(), 0);

        users.create_user("zoe", "secret").await.unwrap();
        users.create_user("adam", "secret").await.unwrap();

        assert_eq!(users.list_users().await.unwrap(), vec!["adam", "zoe"]);
        assert_eq!(users.count_users().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn should_store_argon2_hash_instead_of_password() {
        let dir = tempfile::tempdir().unwrap();
        let resource = sqlite_resource(&dir.path().join("users.db"));
        let users = SqlxUserBackendFactory
            .connect(&db_backend(), &resource)
            .await
            .unwrap();
        users.create_user("admin", "hunter2").await.unwrap();

        let (hash,): (String,) =
            sqlx::query_as("SELECT password_hash FROM dashconf_user WHERE name = 'admin'")
                .fetch_one(&users.pool)
                .await
                .unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains("hunter2"));
    }

    #[tokio::test]
    async fn should_reject_duplicate_user() {
        let dir = tempfile::tempdir().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("users.db"))
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.unwrap();
        let users = SqliteUserBackend::with_pool(pool).await.unwrap();
        users.create_user("admin", "a").await.unwrap();
        assert!(users.create_user("admin", "b").await.is_err());
    }

    #[tokio::test]
    async fn should_refuse_unsupported_drivers_and_backends() {
        let mysql = Resource {
            name: "web_db".to_string(),
            kind: ResourceKind::Db(DbResource {
                db: DbType::Mysql,
                host: Some("localhost".to_string()),
                port: None,
                dbname: "web".to_string(),
                username: Some("web".to_string()),
                password: None,
            }),
        };
        let Err(DashConfError::Storage(err)) =
            SqlxUserBackendFactory.connect(&db_backend(), &mysql).await
        else {
            panic!("expected unsupported driver");
        };
        assert_eq!(
            err.to_string(),
            "the MySQL driver is not supported for user backends"
        );

        let ldap = AuthBackend {
            name: "dir".to_string(),
            kind: BackendKind::Ldap {
                resource: "web_db".to_string(),
                user_class: "inetOrgPerson".to_string(),
                user_name_attribute: "uid".to_string(),
                base_dn: None,
            },
        };
        assert!(SqlxUserBackendFactory.connect(&ldap, &mysql).await.is_err());
    }
}
