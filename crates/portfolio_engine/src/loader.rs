use std::sync::{mpsc, Arc};
use std::time::Duration;

use portfolio_core::{
    Certificate, CollectionDetails, ContentRecord, DocumentKind, LoadGeneration, LoadSource, Record,
};
use portfolio_logging::{portfolio_debug, portfolio_info, portfolio_warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheStore, SnapshotCache};
use crate::fallback::FallbackRecords;
use crate::service::{CollectionService, DocumentsService};
use crate::timeout::{race, RaceOutcome};
use crate::{FailureKind, LoadEvent, LoadOutcome, RemoteError};

/// Where the live copy of a collection comes from.
#[async_trait::async_trait]
pub trait CollectionSource<R: Send + 'static>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<R>, RemoteError>;
}

#[async_trait::async_trait]
impl<D> CollectionSource<ContentRecord<D>> for CollectionService<D>
where
    D: CollectionDetails + Serialize + DeserializeOwned,
{
    async fn fetch_all(&self) -> Result<Vec<ContentRecord<D>>, RemoteError> {
        self.list_all().await
    }
}

#[async_trait::async_trait]
impl CollectionSource<Certificate> for DocumentsService {
    async fn fetch_all(&self) -> Result<Vec<Certificate>, RemoteError> {
        let documents = self.list_by_kind(DocumentKind::Certificate).await?;
        Ok(documents.into_iter().map(Certificate::from).collect())
    }
}

pub trait LoadSink<R>: Send + Sync {
    fn emit(&self, event: LoadEvent<R>);
}

pub struct ChannelLoadSink<R> {
    tx: mpsc::Sender<LoadEvent<R>>,
}

impl<R> ChannelLoadSink<R> {
    pub fn new(tx: mpsc::Sender<LoadEvent<R>>) -> Self {
        Self { tx }
    }
}

impl<R: Send> LoadSink<R> for ChannelLoadSink<R> {
    fn emit(&self, event: LoadEvent<R>) {
        let _ = self.tx.send(event);
    }
}

/// Cache-first loader for one collection.
///
/// Every load renders something immediately (snapshot, else fallback), then
/// races the live fetch against the deadline. A live result replaces the
/// rendering and the snapshot; a failure leaves both untouched.
pub struct ContentLoader<R> {
    source: Arc<dyn CollectionSource<R>>,
    cache: SnapshotCache<R>,
    fallback: Vec<R>,
    deadline: Duration,
}

impl<R> ContentLoader<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    pub fn new(
        source: Arc<dyn CollectionSource<R>>,
        cache: Arc<dyn CacheStore>,
        deadline: Duration,
    ) -> Self
    where
        R: FallbackRecords,
    {
        Self::with_fallback(source, cache, deadline, R::fallback())
    }

    pub fn with_fallback(
        source: Arc<dyn CollectionSource<R>>,
        cache: Arc<dyn CacheStore>,
        deadline: Duration,
        fallback: Vec<R>,
    ) -> Self {
        Self {
            source,
            cache: SnapshotCache::new(cache),
            fallback,
            deadline,
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub async fn load(
        &self,
        generation: LoadGeneration,
        sink: &dyn LoadSink<R>,
        cancel: &CancellationToken,
    ) -> LoadOutcome {
        let shown = self.render_immediately(generation, sink);

        match race(self.source.fetch_all(), self.deadline, cancel).await {
            RaceOutcome::Completed(Ok(records)) => {
                let count = records.len();
                if let Err(err) = self.cache.write(&records) {
                    portfolio_warn!("Failed to cache {} snapshot: {}", R::COLLECTION, err);
                }
                sink.emit(LoadEvent::Rendered {
                    generation,
                    source: LoadSource::Live,
                    records,
                });
                portfolio_info!("Loaded {} {} records live", count, R::COLLECTION);
                LoadOutcome::Live { count }
            }
            RaceOutcome::Completed(Err(error)) => self.degrade(generation, sink, shown, error),
            RaceOutcome::TimedOut => {
                let error = RemoteError::new(
                    FailureKind::Timeout,
                    format!("no response within {:?}", self.deadline),
                );
                self.degrade(generation, sink, shown, error)
            }
            RaceOutcome::Cancelled => {
                portfolio_debug!("Load {} of {} cancelled", generation, R::COLLECTION);
                LoadOutcome::Cancelled
            }
        }
    }

    fn render_immediately(&self, generation: LoadGeneration, sink: &dyn LoadSink<R>) -> LoadSource {
        let (source, records) = match self.cache.read() {
            Some(snapshot) => (LoadSource::Cached, snapshot),
            None => (LoadSource::Fallback, self.fallback.clone()),
        };
        portfolio_debug!(
            "Rendering {} {} records from {:?}",
            records.len(),
            R::COLLECTION,
            source
        );
        sink.emit(LoadEvent::Rendered {
            generation,
            source,
            records,
        });
        source
    }

    fn degrade(
        &self,
        generation: LoadGeneration,
        sink: &dyn LoadSink<R>,
        shown: LoadSource,
        error: RemoteError,
    ) -> LoadOutcome {
        portfolio_warn!(
            "Error loading {}: {}; keeping {:?} data",
            R::COLLECTION,
            error,
            shown
        );
        sink.emit(LoadEvent::Failed {
            generation,
            error: error.clone(),
        });
        LoadOutcome::Degraded { shown, error }
    }
}
