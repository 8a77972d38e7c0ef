use std::sync::{Arc, Once};
use std::time::Duration;

use portfolio_core::{Experience, LoadSource};
use portfolio_engine::{
    fallback_experience, CollectionSource, ContentLoader, EngineHandle, LoadEvent, MemoryCache,
    RemoteError,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(portfolio_logging::initialize_for_tests);
}

struct DelayedSource {
    delay: Duration,
    records: Vec<Experience>,
}

#[async_trait::async_trait]
impl CollectionSource<Experience> for DelayedSource {
    async fn fetch_all(&self) -> Result<Vec<Experience>, RemoteError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.records.clone())
    }
}

fn engine(delay: Duration, records: Vec<Experience>) -> EngineHandle<Experience> {
    let loader = ContentLoader::new(
        Arc::new(DelayedSource { delay, records }),
        Arc::new(MemoryCache::new()),
        Duration::from_secs(5),
    );
    EngineHandle::new(loader).unwrap()
}

#[test]
fn load_reports_fallback_then_live() {
    init_logging();
    let live: Vec<Experience> = fallback_experience().into_iter().take(2).collect();
    let handle = engine(Duration::from_millis(10), live.clone());

    handle.load(1);

    let first = handle.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(
        first,
        LoadEvent::Rendered {
            generation: 1,
            source: LoadSource::Fallback,
            records: fallback_experience(),
        }
    );
    let second = handle.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(
        second,
        LoadEvent::Rendered {
            generation: 1,
            source: LoadSource::Live,
            records: live,
        }
    );
    assert_eq!(handle.try_recv(), None);
}

#[test]
fn cancel_stops_an_inflight_load() {
    init_logging();
    let handle = engine(Duration::from_millis(500), Vec::new());

    handle.load(7);
    let first = handle.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(matches!(first, LoadEvent::Rendered { generation: 7, source: LoadSource::Fallback, .. }));

    handle.cancel(7);
    assert_eq!(handle.recv_timeout(Duration::from_millis(900)), None);
}
