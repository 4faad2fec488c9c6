//! Orphan reclaimer.
//!
//! Walks every relation row and deletes those whose marker or markable no
//! longer exists. Each deletion commits on its own, so a cancelled sweep
//! leaves no partial state and the next sweep simply starts over.

use std::collections::HashSet;

use futures::TryStreamExt;
use mark_core::ReclaimReport;
use tokio_util::sync::CancellationToken;

use crate::error::DatabaseError;
use crate::existence::EntityDirectory;
use crate::scan::scan;
use crate::service::MarkService;
use crate::store::{MarkFilter, RelationStore, StoredMark};

enum Verdict {
    Keep,
    Orphaned,
    Unresolvable(String),
}

impl<S: RelationStore> MarkService<S> {
    /// Run a full sweep and return the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a page read, lookup, or delete fails.
    pub async fn reclaim(&self, directory: &EntityDirectory) -> Result<u64, DatabaseError> {
        let report = self.reclaim_with(directory, &CancellationToken::new()).await?;
        Ok(report.deleted)
    }

    /// Run a sweep that stops between rows once `cancel` fires.
    ///
    /// Rows whose entity type has no lookup in `directory` are kept and
    /// counted as skipped.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a page read, lookup, or delete fails. Rows
    /// deleted before the failure stay deleted.
    pub async fn reclaim_with(
        &self,
        directory: &EntityDirectory,
        cancel: &CancellationToken,
    ) -> Result<ReclaimReport, DatabaseError> {
        tracing::info!(page_size = self.page_size(), ?directory, "reclaim started");

        let mut report = ReclaimReport::default();
        let mut unresolvable = HashSet::new();
        let mut rows = scan(self.store(), MarkFilter::all(), self.page_size());

        loop {
            if cancel.is_cancelled() {
                report.cancelled = true;
                tracing::warn!(
                    scanned = report.scanned,
                    deleted = report.deleted,
                    "reclaim cancelled"
                );
                break;
            }
            let Some(row) = rows.try_next().await? else {
                break;
            };
            report.scanned += 1;

            match judge(directory, &row).await? {
                Verdict::Keep => {}
                Verdict::Orphaned => {
                    report.deleted += self.store().delete(&MarkFilter::exact(&row.relation)).await?;
                }
                Verdict::Unresolvable(entity_type) => {
                    report.skipped += 1;
                    if unresolvable.insert(entity_type.clone()) {
                        tracing::warn!(entity_type = %entity_type, "no existence lookup, skipping rows of this type");
                    }
                }
            }

            let log_every = self.log_every();
            if log_every > 0 && report.scanned % log_every == 0 {
                tracing::info!(scanned = report.scanned, deleted = report.deleted, "reclaim progress");
            }
        }

        tracing::info!(
            scanned = report.scanned,
            deleted = report.deleted,
            skipped = report.skipped,
            "reclaim finished"
        );
        Ok(report)
    }
}

/// A row is orphaned as soon as either side is known to be gone. It is only
/// unresolvable when neither side is known gone and one side has no lookup.
async fn judge(directory: &EntityDirectory, row: &StoredMark) -> Result<Verdict, DatabaseError> {
    let marker = row.relation.marker();
    let markable = row.relation.markable();

    let marker_exists = directory.resolve(&marker).await?;
    if marker_exists == Some(false) {
        return Ok(Verdict::Orphaned);
    }
    let markable_exists = directory.resolve(&markable).await?;
    if markable_exists == Some(false) {
        return Ok(Verdict::Orphaned);
    }

    if marker_exists.is_none() {
        return Ok(Verdict::Unresolvable(marker.entity_type));
    }
    if markable_exists.is_none() {
        return Ok(Verdict::Unresolvable(markable.entity_type));
    }
    Ok(Verdict::Keep)
}
