//! Publication of activity entries to observers.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::db::ActivityLogRepository;
use crate::error::Result;
use crate::models::NewActivityLogEntry;

/// Receives every activity entry produced by answer evaluation.
pub trait ActivityObserver: Send + Sync {
    fn update<'a>(&'a self, entry: &'a NewActivityLogEntry) -> BoxFuture<'a, Result<()>>;
}

/// Ordered list of observers.
///
/// Observers run one after another in attachment order. The first failure is
/// returned and the remaining observers are skipped.
#[derive(Clone, Default)]
pub struct ActivityNotifier {
    observers: Vec<Arc<dyn ActivityObserver>>,
}

impl ActivityNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, observer: Arc<dyn ActivityObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub async fn notify(&self, entry: &NewActivityLogEntry) -> Result<()> {
        for observer in &self.observers {
            observer.update(entry).await?;
        }
        Ok(())
    }
}

/// Observer that appends entries to the activity log.
pub struct ActivityLogger<R: ?Sized> {
    repo: Arc<R>,
}

impl<R: ?Sized> ActivityLogger<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> ActivityObserver for ActivityLogger<R>
where
    R: ActivityLogRepository + ?Sized,
{
    fn update<'a>(&'a self, entry: &'a NewActivityLogEntry) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let stored = self.repo.append_log(entry).await?;
            tracing::debug!(
                log_id = stored.id,
                user_id = %stored.user_id,
                word_id = stored.word_id,
                is_correct = stored.is_correct,
                "activity logged"
            );
            Ok(())
        })
    }
}
