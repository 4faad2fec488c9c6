//! Lazy relation queries.
//!
//! Each query returns a stream that pulls one page of rows at a time from the
//! store. Dropping the stream abandons the scan; calling the query again
//! starts over.

use std::collections::HashSet;
use std::future;

use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use mark_core::EntityRef;

use crate::error::MarkError;
use crate::scan::scan;
use crate::service::MarkService;
use crate::store::{MarkFilter, RelationStore, StoredMark};

pub type EntityStream<'a> = BoxStream<'a, Result<EntityRef, MarkError>>;

impl<S: RelationStore> MarkService<S> {
    /// Every marker that applied `mark` to `markable`, in row order.
    ///
    /// No authorization check runs: the answer for a mark nobody may apply is
    /// simply empty.
    pub fn markers_of(&self, markable: &EntityRef, mark: &str) -> EntityStream<'_> {
        let filter = MarkFilter::all().markable(markable).mark(mark);
        self.stream_sides(filter, |row| row.relation.marker())
    }

    /// Markers of one type that applied `mark` to `markable`.
    ///
    /// # Errors
    ///
    /// Returns `MarkError::Unauthorized` if `marker_type` could never apply
    /// `mark` to this markable's type.
    pub fn markers_of_type(
        &self,
        markable: &EntityRef,
        mark: &str,
        marker_type: &str,
    ) -> Result<EntityStream<'_>, MarkError> {
        self.registry()
            .check_types(marker_type, &markable.entity_type, mark)?;

        let filter = MarkFilter::all()
            .markable(markable)
            .mark(mark)
            .marker_type(marker_type);
        Ok(self.stream_sides(filter, |row| row.relation.marker()))
    }

    /// Markables of `markable_type` that `marker` marked with `mark`.
    ///
    /// # Errors
    ///
    /// Returns `MarkError::Unauthorized` if the marker's type could never
    /// apply `mark` to `markable_type`.
    pub fn markables_of(
        &self,
        marker: &EntityRef,
        mark: &str,
        markable_type: &str,
    ) -> Result<EntityStream<'_>, MarkError> {
        self.registry()
            .check_types(&marker.entity_type, markable_type, mark)?;

        let filter = MarkFilter::all()
            .marker(marker)
            .mark(mark)
            .markable_type(markable_type);
        Ok(self.stream_sides(filter, |row| row.relation.markable()))
    }

    /// Distinct markables of `markable_type` carrying `mark` from anyone.
    ///
    /// # Errors
    ///
    /// Returns `MarkError::Unauthorized` if the type does not declare `mark`.
    pub fn marked_as(&self, markable_type: &str, mark: &str) -> Result<EntityStream<'_>, MarkError> {
        self.registry().check_markable(markable_type, mark)?;

        let filter = MarkFilter::all().markable_type(markable_type).mark(mark);
        let mut seen = HashSet::new();
        Ok(self
            .stream_sides(filter, |row| row.relation.markable())
            .try_filter(move |markable| future::ready(seen.insert(markable.clone())))
            .boxed())
    }

    fn stream_sides<F>(&self, filter: MarkFilter, side: F) -> EntityStream<'_>
    where
        F: Fn(StoredMark) -> EntityRef + Send + 'static,
    {
        scan(self.store(), filter, self.page_size())
            .map_ok(side)
            .map_err(MarkError::from)
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use mark_core::ErrorKind;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::helpers::test_service;

    fn user(id: &str) -> EntityRef {
        EntityRef::new("user", id)
    }

    fn post(id: &str) -> EntityRef {
        EntityRef::new("post", id)
    }

    async fn collect(stream: EntityStream<'_>) -> BTreeSet<EntityRef> {
        stream.try_collect().await.unwrap()
    }

    #[tokio::test]
    async fn markers_and_markables_are_symmetric() {
        let svc = test_service().await;
        svc.apply("like", &user("1"), &post("1")).await.unwrap();
        svc.apply("like", &user("2"), &post("1")).await.unwrap();

        let markers = collect(svc.markers_of(&post("1"), "like")).await;
        assert_eq!(markers, BTreeSet::from([user("1"), user("2")]));

        let markables = collect(svc.markables_of(&user("1"), "like", "post").unwrap()).await;
        assert_eq!(markables, BTreeSet::from([post("1")]));
    }

    #[tokio::test]
    async fn markers_of_spans_several_pages() {
        let svc = test_service().await.with_page_size(2);
        for i in 0..5 {
            svc.apply("like", &user(&i.to_string()), &post("1")).await.unwrap();
        }

        let markers: Vec<EntityRef> = svc.markers_of(&post("1"), "like").try_collect().await.unwrap();
        assert_eq!(markers.len(), 5);
        assert_eq!(markers[0], user("0"));
    }

    #[tokio::test]
    async fn markers_of_is_restartable() {
        let svc = test_service().await;
        svc.apply("like", &user("1"), &post("1")).await.unwrap();

        let first = collect(svc.markers_of(&post("1"), "like")).await;
        svc.apply("like", &user("2"), &post("1")).await.unwrap();
        let second = collect(svc.markers_of(&post("1"), "like")).await;

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn markers_of_type_filters_by_type() {
        let svc = test_service().await;
        let admin = EntityRef::new("admin", "1");
        svc.apply("like", &user("1"), &post("1")).await.unwrap();
        svc.apply("like", &admin, &post("1")).await.unwrap();

        let admins = collect(svc.markers_of_type(&post("1"), "like", "admin").unwrap()).await;
        assert_eq!(admins, BTreeSet::from([admin]));

        let err = svc.markers_of_type(&post("1"), "flag", "user").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MarkerNotAllowed);
    }

    #[tokio::test]
    async fn markables_of_rejects_unsupported_mark() {
        let svc = test_service().await;

        let err = svc.markables_of(&user("1"), "hate", "post").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMark);
    }

    #[tokio::test]
    async fn markables_of_only_returns_requested_type() {
        let svc = test_service().await;
        svc.apply("favorite", &user("1"), &post("1")).await.unwrap();
        svc.apply("favorite", &user("1"), &EntityRef::new("car", "9")).await.unwrap();

        let posts = collect(svc.markables_of(&user("1"), "favorite", "post").unwrap()).await;
        assert_eq!(posts, BTreeSet::from([post("1")]));
    }

    #[tokio::test]
    async fn marked_as_is_distinct() {
        let svc = test_service().await;
        svc.apply("like", &user("1"), &post("1")).await.unwrap();
        svc.apply("like", &user("2"), &post("1")).await.unwrap();
        svc.apply("like", &user("1"), &post("2")).await.unwrap();
        svc.apply("favorite", &user("1"), &post("3")).await.unwrap();

        let liked: Vec<EntityRef> = svc.marked_as("post", "like").unwrap().try_collect().await.unwrap();
        assert_eq!(liked, vec![post("1"), post("2")]);

        let err = svc.marked_as("city", "like").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnknownMarkableType);
    }
}
