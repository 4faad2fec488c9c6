//! Applying and removing marks.
//!
//! Apply and remove are idempotent: re-applying an existing mark and removing
//! an absent one both succeed without touching state.

use mark_core::{EntityRef, MarkRelation};

use crate::error::MarkError;
use crate::service::MarkService;
use crate::store::{MarkFilter, RelationStore};

impl<S: RelationStore> MarkService<S> {
    /// Mark `markable` with `mark` on behalf of `marker`.
    ///
    /// Returns `true` if a row was written, `false` if it already existed.
    ///
    /// # Errors
    ///
    /// Returns `MarkError::Unauthorized` before any write if the resolver
    /// rejects the triple, or `MarkError::Storage` if the insert fails.
    pub async fn apply(&self, mark: &str, marker: &EntityRef, markable: &EntityRef) -> Result<bool, MarkError> {
        self.registry().check(marker, markable, mark)?;

        let relation = MarkRelation::new(marker, markable, mark);
        let inserted = self.store().insert_if_absent(&relation).await?;
        if inserted {
            tracing::debug!(%marker, %markable, mark, "mark applied");
        }
        Ok(inserted)
    }

    /// Apply `mark` from one marker to several markables.
    ///
    /// Each element is authorized and applied on its own, so a rejected
    /// element fails only itself. Results line up with `markables`. Use
    /// [`CapabilityRegistry::check_all`](mark_core::CapabilityRegistry::check_all)
    /// first for all-or-nothing behaviour.
    pub async fn apply_to_many(
        &self,
        mark: &str,
        marker: &EntityRef,
        markables: &[EntityRef],
    ) -> Vec<Result<bool, MarkError>> {
        let mut results = Vec::with_capacity(markables.len());
        for markable in markables {
            results.push(self.apply(mark, marker, markable).await);
        }
        results
    }

    /// Apply `mark` from several markers to one markable.
    ///
    /// Same per-element semantics as [`apply_to_many`](Self::apply_to_many).
    pub async fn apply_by_many(
        &self,
        mark: &str,
        markers: &[EntityRef],
        markable: &EntityRef,
    ) -> Vec<Result<bool, MarkError>> {
        let mut results = Vec::with_capacity(markers.len());
        for marker in markers {
            results.push(self.apply(mark, marker, markable).await);
        }
        results
    }

    /// Remove `marker`'s `mark` from `markable`. Returns the rows deleted
    /// (0 when the mark was absent).
    ///
    /// # Errors
    ///
    /// Returns `MarkError::Unauthorized` if the marker could never have
    /// applied this mark, or `MarkError::Storage` if the delete fails.
    pub async fn remove(&self, mark: &str, marker: &EntityRef, markable: &EntityRef) -> Result<u64, MarkError> {
        self.registry().check(marker, markable, mark)?;

        let filter = MarkFilter::all().marker(marker).markable(markable).mark(mark);
        let deleted = self.store().delete(&filter).await?;
        if deleted > 0 {
            tracing::debug!(%marker, %markable, mark, "mark removed");
        }
        Ok(deleted)
    }

    /// Remove `marker`'s `mark` from several markables.
    ///
    /// Every pair is authorized before anything is deleted, so a rejected
    /// element aborts the whole batch.
    ///
    /// # Errors
    ///
    /// Returns the first `MarkError::Unauthorized`, or `MarkError::Storage`.
    pub async fn remove_from_many(
        &self,
        mark: &str,
        marker: &EntityRef,
        markables: &[EntityRef],
    ) -> Result<u64, MarkError> {
        self.registry()
            .check_all(std::slice::from_ref(marker), markables, mark)?;

        let mut deleted = 0;
        for markable in markables {
            let filter = MarkFilter::all().marker(marker).markable(markable).mark(mark);
            deleted += self.store().delete(&filter).await?;
        }
        Ok(deleted)
    }

    /// Remove `mark` from one markable for several markers.
    ///
    /// Same all-or-nothing authorization as
    /// [`remove_from_many`](Self::remove_from_many).
    ///
    /// # Errors
    ///
    /// Returns the first `MarkError::Unauthorized`, or `MarkError::Storage`.
    pub async fn remove_by_many(
        &self,
        mark: &str,
        markers: &[EntityRef],
        markable: &EntityRef,
    ) -> Result<u64, MarkError> {
        self.registry()
            .check_all(markers, std::slice::from_ref(markable), mark)?;

        let mut deleted = 0;
        for marker in markers {
            let filter = MarkFilter::all().marker(marker).markable(markable).mark(mark);
            deleted += self.store().delete(&filter).await?;
        }
        Ok(deleted)
    }

    /// Remove `mark` from `markable` for every marker.
    ///
    /// # Errors
    ///
    /// Returns `UnknownMarkableType` or `UnsupportedMark` if the markable
    /// type cannot carry this mark, or `MarkError::Storage`.
    pub async fn remove_all(&self, mark: &str, markable: &EntityRef) -> Result<u64, MarkError> {
        self.registry().check_markable(&markable.entity_type, mark)?;

        let filter = MarkFilter::all().markable(markable).mark(mark);
        let deleted = self.store().delete(&filter).await?;
        tracing::debug!(%markable, mark, deleted, "mark cleared");
        Ok(deleted)
    }

    /// Whether `markable` carries `mark`, optionally from a specific marker.
    ///
    /// With `by`, the question itself is authorized: asking whether a marker
    /// applied a mark it could never apply is an error, not `false`.
    ///
    /// # Errors
    ///
    /// Returns `MarkError::Unauthorized` for a disallowed `by`, or
    /// `MarkError::Storage`.
    pub async fn is_marked(
        &self,
        markable: &EntityRef,
        mark: &str,
        by: Option<&EntityRef>,
    ) -> Result<bool, MarkError> {
        let mut filter = MarkFilter::all().markable(markable).mark(mark);
        if let Some(marker) = by {
            self.registry().check(marker, markable, mark)?;
            filter = filter.marker(marker);
        }
        Ok(self.store().exists(&filter).await?)
    }

    /// Cascade hook for hosts: call when an entity is destroyed through the
    /// normal deletion path. Returns the rows removed on both sides.
    ///
    /// # Errors
    ///
    /// Returns `MarkError::Storage` if the delete fails.
    pub async fn on_entity_destroyed(&self, entity: &EntityRef) -> Result<u64, MarkError> {
        let deleted = self.store().on_entity_destroyed(entity).await?;
        tracing::debug!(%entity, deleted, "cascaded entity destruction");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use mark_core::{CapabilityRegistry, ErrorKind, MAX_MARK_LEN, MarkDeclaration};

    use super::*;
    use crate::test_support::helpers::{test_db, test_service};

    fn user(id: &str) -> EntityRef {
        EntityRef::new("user", id)
    }

    fn admin(id: &str) -> EntityRef {
        EntityRef::new("admin", id)
    }

    fn post(id: &str) -> EntityRef {
        EntityRef::new("post", id)
    }

    #[tokio::test]
    async fn apply_twice_yields_one_row() {
        let svc = test_service().await;

        assert!(svc.apply("like", &user("1"), &post("1")).await.unwrap());
        assert!(svc.is_marked(&post("1"), "like", None).await.unwrap());
        assert!(!svc.apply("like", &user("1"), &post("1")).await.unwrap());
        assert!(svc.is_marked(&post("1"), "like", Some(&user("1"))).await.unwrap());

        assert_eq!(svc.store().count(&MarkFilter::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn remove_absent_mark_is_noop() {
        let svc = test_service().await;
        svc.apply("like", &user("2"), &post("1")).await.unwrap();

        assert_eq!(svc.remove("like", &user("1"), &post("1")).await.unwrap(), 0);
        assert_eq!(svc.store().count(&MarkFilter::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn remove_deletes_only_that_marker() {
        let svc = test_service().await;
        svc.apply("like", &user("1"), &post("1")).await.unwrap();
        svc.apply("like", &user("2"), &post("1")).await.unwrap();

        assert_eq!(svc.remove("like", &user("1"), &post("1")).await.unwrap(), 1);
        assert!(!svc.is_marked(&post("1"), "like", Some(&user("1"))).await.unwrap());
        assert!(svc.is_marked(&post("1"), "like", Some(&user("2"))).await.unwrap());
    }

    #[tokio::test]
    async fn restricted_mark_gates_marker_type() {
        let svc = test_service().await;

        let err = svc.apply("flag", &user("1"), &post("1")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MarkerNotAllowed);
        assert!(svc.apply("flag", &admin("1"), &post("1")).await.unwrap());
    }

    #[tokio::test]
    async fn rejected_apply_never_writes() {
        let svc = test_service().await;

        let err = svc
            .apply("like", &EntityRef::new("robot", "1"), &post("1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownMarkerType);

        let err = svc
            .apply("nonexistent_mark", &admin("1"), &post("1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMark);

        assert_eq!(svc.store().count(&MarkFilter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn remove_is_policy_gated() {
        let svc = test_service().await;
        svc.apply("flag", &admin("1"), &post("1")).await.unwrap();

        let err = svc.remove("flag", &user("1"), &post("1")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MarkerNotAllowed);
        assert!(svc.is_marked(&post("1"), "flag", None).await.unwrap());
    }

    #[tokio::test]
    async fn is_marked_by_disallowed_marker_is_an_error() {
        let svc = test_service().await;

        let err = svc
            .is_marked(&post("1"), "flag", Some(&user("1")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MarkerNotAllowed);
        assert!(!svc.is_marked(&post("1"), "flag", None).await.unwrap());
    }

    #[tokio::test]
    async fn apply_to_many_fails_elements_independently() {
        let svc = test_service().await;
        let targets = [post("1"), EntityRef::new("car", "1"), post("2")];

        let results = svc.apply_to_many("like", &user("1"), &targets).await;
        assert!(results[0].as_ref().is_ok_and(|inserted| *inserted));
        assert_eq!(
            results[1].as_ref().unwrap_err().kind(),
            ErrorKind::UnsupportedMark
        );
        assert!(results[2].is_ok());
        assert_eq!(svc.store().count(&MarkFilter::all()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn apply_by_many_fails_elements_independently() {
        let svc = test_service().await;
        let markers = [admin("1"), user("1"), admin("2")];

        let results = svc.apply_by_many("flag", &markers, &post("1")).await;
        assert!(results[0].is_ok());
        assert_eq!(
            results[1].as_ref().unwrap_err().kind(),
            ErrorKind::MarkerNotAllowed
        );
        assert!(results[2].is_ok());
        assert_eq!(svc.store().count(&MarkFilter::all()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn remove_from_many_is_all_or_nothing() {
        let svc = test_service().await;
        let car = EntityRef::new("car", "1");
        svc.apply("favorite", &user("1"), &post("1")).await.unwrap();
        svc.apply("favorite", &user("1"), &car).await.unwrap();

        let err = svc
            .remove_from_many("hate", &user("1"), &[car.clone(), post("1")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMark);
        assert_eq!(svc.store().count(&MarkFilter::all()).await.unwrap(), 2);

        let removed = svc
            .remove_from_many("favorite", &user("1"), &[car, post("1")])
            .await
            .unwrap();
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn remove_by_many_is_all_or_nothing() {
        let svc = test_service().await;
        svc.apply("flag", &admin("1"), &post("1")).await.unwrap();
        svc.apply("flag", &admin("2"), &post("1")).await.unwrap();
        svc.apply("flag", &admin("3"), &post("1")).await.unwrap();

        let err = svc
            .remove_by_many("flag", &[admin("1"), user("1")], &post("1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MarkerNotAllowed);
        assert_eq!(svc.store().count(&MarkFilter::all()).await.unwrap(), 3);

        let removed = svc
            .remove_by_many("flag", &[admin("1"), admin("2"), admin("9")], &post("1"))
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert!(svc.is_marked(&post("1"), "flag", Some(&admin("3"))).await.unwrap());
    }

    #[tokio::test]
    async fn overlong_mark_is_rejected_before_storage() {
        let long_mark = "m".repeat(MAX_MARK_LEN + 1);
        let mut registry = CapabilityRegistry::new();
        registry
            .register_marker("user")
            .declare("post", MarkDeclaration::marks([long_mark.as_str()]));
        let svc = MarkService::new(test_db().await, registry.into_shared());

        let err = svc.apply(&long_mark, &user("1"), &post("1")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMark);
        assert!(err.is_caller_error());
    }

    #[tokio::test]
    async fn remove_all_clears_every_marker() {
        let svc = test_service().await;
        svc.apply("like", &user("1"), &post("1")).await.unwrap();
        svc.apply("like", &admin("1"), &post("1")).await.unwrap();
        svc.apply("favorite", &user("1"), &post("1")).await.unwrap();

        assert_eq!(svc.remove_all("like", &post("1")).await.unwrap(), 2);
        assert!(!svc.is_marked(&post("1"), "like", None).await.unwrap());
        assert!(svc.is_marked(&post("1"), "favorite", None).await.unwrap());

        let err = svc.remove_all("like", &EntityRef::new("city", "1")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownMarkableType);
    }

    #[tokio::test]
    async fn on_entity_destroyed_removes_both_sides() {
        let svc = test_service().await;
        svc.apply("like", &user("1"), &post("1")).await.unwrap();
        svc.apply("like", &user("2"), &post("1")).await.unwrap();
        svc.apply("like", &user("1"), &post("2")).await.unwrap();

        assert_eq!(svc.on_entity_destroyed(&user("1")).await.unwrap(), 2);
        assert_eq!(svc.on_entity_destroyed(&post("1")).await.unwrap(), 1);
        assert_eq!(svc.store().count(&MarkFilter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_applies_produce_one_row() {
        let svc = test_service().await;
        let (marker, markable) = (user("1"), post("1"));

        let (a, b, c) = tokio::join!(
            svc.apply("like", &marker, &markable),
            svc.apply("like", &marker, &markable),
            svc.apply("like", &marker, &markable),
        );
        let inserted = [a.unwrap(), b.unwrap(), c.unwrap()]
            .into_iter()
            .filter(|inserted| *inserted)
            .count();
        assert_eq!(inserted, 1);
        assert_eq!(svc.store().count(&MarkFilter::all()).await.unwrap(), 1);
    }
}
