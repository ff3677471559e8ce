//! Best-effort annotation sync with ordered, coalesced pushes.
//!
//! Every local mutation produces a full snapshot of the annotation set. The
//! queue keeps at most one push in flight per document: a snapshot queued
//! while a push is outstanding replaces any older queued one and is sent when
//! the outstanding push completes. Writes for a document therefore reach the
//! backend in order, and intermediate snapshots may be skipped.
//!
//! Failed pushes are recorded but not resent. Bookkeeping for a document is
//! dropped by [`SyncQueue::prune`] once it is idle and no longer displayed.

use std::collections::HashMap;
use std::time::Duration;

use web_time::Instant;

use crate::model::{Annotation, DocId};

/// A snapshot to send to `POST /annotate/{doc_id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushJob {
    /// Document the snapshot belongs to.
    pub doc_id: DocId,
    /// The full annotation set.
    pub annotations: Vec<Annotation>,
}

/// Push state of one document, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing pushed yet.
    Idle,
    /// A push is outstanding.
    Saving,
    /// The last push succeeded this long ago.
    Saved(Duration),
    /// The last push failed.
    Failed(String),
}

#[derive(Debug, Default)]
struct DocumentSync {
    /// Latest snapshot waiting for the in-flight push to finish.
    pending: Option<Vec<Annotation>>,
    in_flight: bool,
    last_synced: Option<Instant>,
    last_error: Option<String>,
}

/// Per-document push bookkeeping.
#[derive(Debug, Default)]
pub struct SyncQueue {
    documents: HashMap<DocId, DocumentSync>,
}

impl SyncQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot.
    ///
    /// Returns the job to send now, or `None` if a push for this document is
    /// already in flight (the snapshot then waits, replacing any older one).
    pub fn enqueue(&mut self, doc_id: DocId, annotations: Vec<Annotation>) -> Option<PushJob> {
        let entry = self.documents.entry(doc_id.clone()).or_default();
        if entry.in_flight {
            log::debug!("Push for {doc_id} in flight; queueing snapshot of {}", annotations.len());
            entry.pending = Some(annotations);
            return None;
        }
        entry.in_flight = true;
        Some(PushJob {
            doc_id,
            annotations,
        })
    }

    /// Record the outcome of the in-flight push for `doc_id`.
    ///
    /// Returns the next job if a newer snapshot was queued meanwhile.
    pub fn complete(&mut self, doc_id: &DocId, result: Result<(), String>) -> Option<PushJob> {
        let entry = self.documents.entry(doc_id.clone()).or_default();
        entry.in_flight = false;
        match result {
            Ok(()) => {
                entry.last_synced = Some(Instant::now());
                entry.last_error = None;
            }
            Err(message) => {
                log::error!("Annotation push for {doc_id} failed: {message}");
                entry.last_error = Some(message);
            }
        }

        let annotations = entry.pending.take()?;
        entry.in_flight = true;
        Some(PushJob {
            doc_id: doc_id.clone(),
            annotations,
        })
    }

    /// Check if a push for `doc_id` is outstanding.
    pub fn is_in_flight(&self, doc_id: &DocId) -> bool {
        self.documents.get(doc_id).is_some_and(|d| d.in_flight)
    }

    /// Check if a snapshot for `doc_id` is waiting behind an in-flight push.
    pub fn has_pending(&self, doc_id: &DocId) -> bool {
        self.documents.get(doc_id).is_some_and(|d| d.pending.is_some())
    }

    /// Check if nothing is in flight or waiting for any document.
    pub fn is_idle(&self) -> bool {
        self.documents
            .values()
            .all(|d| !d.in_flight && d.pending.is_none())
    }

    /// Current push state of `doc_id`.
    pub fn state(&self, doc_id: &DocId) -> SyncState {
        let Some(entry) = self.documents.get(doc_id) else {
            return SyncState::Idle;
        };
        if entry.in_flight {
            SyncState::Saving
        } else if let Some(message) = &entry.last_error {
            SyncState::Failed(message.clone())
        } else if let Some(at) = entry.last_synced {
            SyncState::Saved(at.elapsed())
        } else {
            SyncState::Idle
        }
    }

    /// Error from the most recent push for `doc_id`, if it failed.
    pub fn last_error(&self, doc_id: &DocId) -> Option<&str> {
        self.documents
            .get(doc_id)
            .and_then(|d| d.last_error.as_deref())
    }

    /// Drop bookkeeping for idle documents other than `current`.
    pub fn prune(&mut self, current: Option<&DocId>) {
        let before = self.documents.len();
        self.documents
            .retain(|id, d| d.in_flight || d.pending.is_some() || Some(id) == current);
        let dropped = before - self.documents.len();
        if dropped > 0 {
            log::trace!("Dropped sync state of {dropped} documents");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(n: usize) -> Vec<Annotation> {
        (0..n).map(|i| Annotation::new(i * 10, i * 10 + 5, "PERS")).collect()
    }

    #[test]
    fn test_initial_state() {
        let queue = SyncQueue::new();
        assert!(queue.is_idle());
        assert!(!queue.is_in_flight(&DocId::new("d")));
    }

    #[test]
    fn test_first_snapshot_is_sent_immediately() {
        let mut queue = SyncQueue::new();
        let job = queue.enqueue(DocId::new("d"), snapshot(1)).unwrap();
        assert_eq!(job.annotations.len(), 1);
        assert!(queue.is_in_flight(&DocId::new("d")));
    }

    #[test]
    fn test_snapshots_coalesce_while_in_flight() {
        let mut queue = SyncQueue::new();
        let doc = DocId::new("d");
        queue.enqueue(doc.clone(), snapshot(1)).unwrap();

        assert!(queue.enqueue(doc.clone(), snapshot(2)).is_none());
        assert!(queue.enqueue(doc.clone(), snapshot(3)).is_none());
        assert!(queue.has_pending(&doc));

        let next = queue.complete(&doc, Ok(())).unwrap();
        assert_eq!(next.annotations, snapshot(3));
        assert!(queue.is_in_flight(&doc));

        assert!(queue.complete(&doc, Ok(())).is_none());
        assert!(queue.is_idle());
        assert!(matches!(queue.state(&doc), SyncState::Saved(_)));
    }

    #[test]
    fn test_documents_are_independent() {
        let mut queue = SyncQueue::new();
        assert!(queue.enqueue(DocId::new("a"), snapshot(1)).is_some());
        assert!(queue.enqueue(DocId::new("b"), snapshot(1)).is_some());
    }

    #[test]
    fn test_failure_is_recorded_not_retried() {
        let mut queue = SyncQueue::new();
        let doc = DocId::new("d");
        queue.enqueue(doc.clone(), snapshot(1)).unwrap();

        assert!(queue.complete(&doc, Err("HTTP 500".to_string())).is_none());
        assert_eq!(queue.last_error(&doc), Some("HTTP 500"));
        assert_eq!(queue.state(&doc), SyncState::Failed("HTTP 500".to_string()));
        assert!(queue.is_idle());
    }

    #[test]
    fn test_success_clears_previous_error() {
        let mut queue = SyncQueue::new();
        let doc = DocId::new("d");
        queue.enqueue(doc.clone(), snapshot(1));
        queue.complete(&doc, Err("offline".to_string()));
        queue.enqueue(doc.clone(), snapshot(2));
        queue.complete(&doc, Ok(()));
        assert_eq!(queue.last_error(&doc), None);
    }

    #[test]
    fn test_state_follows_push() {
        let mut queue = SyncQueue::new();
        let doc = DocId::new("d");
        assert_eq!(queue.state(&doc), SyncState::Idle);
        queue.enqueue(doc.clone(), snapshot(1));
        assert_eq!(queue.state(&doc), SyncState::Saving);
        queue.complete(&doc, Ok(()));
        assert!(matches!(queue.state(&doc), SyncState::Saved(_)));
    }

    #[test]
    fn test_prune_keeps_current_and_outstanding() {
        let mut queue = SyncQueue::new();
        for i in 0..1000 {
            let doc = DocId::new(format!("doc{i}"));
            queue.enqueue(doc.clone(), snapshot(1));
            queue.complete(&doc, Ok(()));
            queue.prune(Some(&doc));
        }
        assert_eq!(queue.documents.len(), 1);

        let busy = DocId::new("busy");
        queue.enqueue(busy.clone(), snapshot(1));
        queue.prune(None);
        assert_eq!(queue.documents.len(), 1);
        assert!(queue.is_in_flight(&busy));
        assert!(!queue.is_idle());
    }
}
