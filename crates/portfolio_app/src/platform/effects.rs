use std::io;

use portfolio_core::{Effect, Msg, Record};
use portfolio_engine::{ContentLoader, EngineHandle, LoadEvent};
use portfolio_logging::{portfolio_info, portfolio_warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Turns core effects into engine commands and engine events back into messages.
pub struct EffectRunner<R> {
    engine: EngineHandle<R>,
}

impl<R> EffectRunner<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    pub fn new(loader: ContentLoader<R>) -> io::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(loader)?,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadCollection {
                    collection,
                    generation,
                } => {
                    portfolio_info!("LoadCollection collection={} generation={}", collection, generation);
                    self.engine.load(generation);
                }
                Effect::CancelLoad { generation } => {
                    portfolio_info!("CancelLoad generation={}", generation);
                    self.engine.cancel(generation);
                }
            }
        }
    }

    /// Everything the engine has reported since the last call, as messages.
    pub fn drain(&self) -> Vec<Msg<R>> {
        std::iter::from_fn(|| self.engine.try_recv())
            .map(to_msg)
            .collect()
    }
}

fn to_msg<R>(event: LoadEvent<R>) -> Msg<R> {
    match event {
        LoadEvent::Rendered {
            generation,
            source,
            records,
        } => Msg::Rendered {
            generation,
            source,
            records,
        },
        LoadEvent::Failed { generation, error } => {
            portfolio_warn!("Load {} failed: {}", generation, error);
            Msg::LoadFailed {
                generation,
                reason: error.to_string(),
            }
        }
    }
}
