//! Shared test utilities for mark-db unit tests.

pub(crate) mod helpers {
    use std::sync::Arc;

    use mark_core::{CapabilityRegistry, MarkDeclaration};

    use crate::MarkDb;
    use crate::service::MarkService;

    /// Open an in-memory database with the marks schema.
    pub async fn test_db() -> MarkDb {
        MarkDb::open_local(":memory:").await.unwrap()
    }

    /// Users and admins mark posts and cars; only admins may flag posts.
    pub fn test_registry() -> Arc<CapabilityRegistry> {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_marker("user")
            .register_marker("admin")
            .declare("post", MarkDeclaration::marks(["like", "favorite"]))
            .declare("post", MarkDeclaration::marks(["flag"]).by(["admin"]))
            .declare("car", MarkDeclaration::marks(["favorite", "hate"]).by(["user"]));
        registry.into_shared()
    }

    /// In-memory service over [`test_registry`].
    pub async fn test_service() -> MarkService {
        MarkService::new(test_db().await, test_registry())
    }

    /// Create a host entity table (`id TEXT PRIMARY KEY`) holding `ids`.
    pub async fn create_entity_table(db: &MarkDb, table: &str, ids: &[&str]) {
        db.conn()
            .execute(
                &format!("CREATE TABLE IF NOT EXISTS {table} (id TEXT PRIMARY KEY)"),
                (),
            )
            .await
            .unwrap();
        for id in ids {
            db.conn()
                .execute(&format!("INSERT INTO {table} (id) VALUES (?1)"), [*id])
                .await
                .unwrap();
        }
    }
}
