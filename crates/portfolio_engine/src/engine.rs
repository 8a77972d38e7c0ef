use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use portfolio_core::{LoadGeneration, Record};
use portfolio_logging::portfolio_debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::loader::{ChannelLoadSink, ContentLoader};
use crate::LoadEvent;

enum EngineCommand {
    Load { generation: LoadGeneration },
    Cancel { generation: LoadGeneration },
}

type InFlight = Arc<Mutex<HashMap<LoadGeneration, CancellationToken>>>;

/// Runs loads for one collection on a background tokio runtime.
///
/// Commands go in over a channel and load events come back over another, so
/// the view loop never blocks on IO. Dropping the handle shuts the runtime down.
pub struct EngineHandle<R> {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<LoadEvent<R>>,
}

impl<R> EngineHandle<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    pub fn new(loader: ContentLoader<R>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let loader = Arc::new(loader);

        thread::spawn(move || {
            let in_flight: InFlight = Arc::new(Mutex::new(HashMap::new()));
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Load { generation } => {
                        let token = CancellationToken::new();
                        if let Ok(mut map) = in_flight.lock() {
                            map.insert(generation, token.clone());
                        }
                        let loader = loader.clone();
                        let sink = ChannelLoadSink::new(event_tx.clone());
                        let in_flight = in_flight.clone();
                        runtime.spawn(async move {
                            let outcome = loader.load(generation, &sink, &token).await;
                            portfolio_debug!("Load {} finished: {:?}", generation, outcome);
                            if let Ok(mut map) = in_flight.lock() {
                                map.remove(&generation);
                            }
                        });
                    }
                    EngineCommand::Cancel { generation } => {
                        let token = in_flight
                            .lock()
                            .ok()
                            .and_then(|mut map| map.remove(&generation));
                        if let Some(token) = token {
                            token.cancel();
                        }
                    }
                }
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn load(&self, generation: LoadGeneration) {
        let _ = self.cmd_tx.send(EngineCommand::Load { generation });
    }

    pub fn cancel(&self, generation: LoadGeneration) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { generation });
    }

    pub fn try_recv(&self) -> Option<LoadEvent<R>> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<LoadEvent<R>> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}
