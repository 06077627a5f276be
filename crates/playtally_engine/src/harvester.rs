use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use engine_logging::{engine_debug, engine_info, engine_warn};
use playtally_core::{
    update, Effect, Harvest, HarvestState, ItemId, Msg, Outcome, DEFAULT_PAGE_SIZE,
};

use crate::checkpoint::CheckpointStore;
use crate::fetch::{PageFetcher, ProgressSink};
use crate::persist::PersistError;
use crate::HarvestEvent;

/// Delay before every request. Slow enough to stay clear of HTTP 429.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1750);

/// Returns the current time as RFC 3339.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct HarvestConfig {
    pub delay: Duration,
    pub page_size: u32,
    pub clock: Clock,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_REQUEST_DELAY,
            page_size: DEFAULT_PAGE_SIZE,
            clock: Arc::new(|| Utc::now().to_rfc3339()),
        }
    }
}

impl fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("delay", &self.delay)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("item {item_id} is already harvested (finished {finished_at})")]
    AlreadyComplete { item_id: ItemId, finished_at: String },
    #[error("checkpoint failed: {0}")]
    Persist(#[from] PersistError),
}

/// Result of a run that did not hit a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    pub state: HarvestState,
    /// `Finished` or `Aborted`; `AlreadyComplete` is reported as an error.
    pub outcome: Outcome,
    pub pages_fetched: u32,
}

/// Drives one item from its checkpointed page to completion.
///
/// Pages are fetched strictly one at a time, each preceded by the configured
/// delay, and every page is checkpointed before the next request.
pub struct Harvester<F, S> {
    fetcher: F,
    store: S,
    config: HarvestConfig,
}

impl<F: PageFetcher, S: CheckpointStore> Harvester<F, S> {
    pub fn new(fetcher: F, store: S, config: HarvestConfig) -> Self {
        Self {
            fetcher,
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Transport failures end the run with [`Outcome::Aborted`] and a
    /// resumable checkpoint; store failures are returned as errors.
    pub async fn run(
        &self,
        item_id: ItemId,
        display_name: &str,
        sink: &dyn ProgressSink,
    ) -> Result<HarvestReport, HarvestError> {
        let stored = self.store.read(item_id)?;
        let resuming = stored.as_ref().is_some_and(|s| !s.is_finished());

        let harvest = Harvest::new(item_id, display_name, self.config.page_size);
        let (mut harvest, effects) = update(
            harvest,
            Msg::Start {
                stored,
                now: self.now(),
            },
        );
        if resuming {
            let state = harvest.state();
            engine_info!(
                "Resuming item {} ({}) at page {}",
                item_id,
                state.display_name,
                state.current_page
            );
            sink.emit(HarvestEvent::Resumed {
                item_id,
                page: state.current_page,
            });
        }
        let mut queue: VecDeque<Effect> = effects.into();

        let outcome = loop {
            let Some(effect) = queue.pop_front() else {
                break Outcome::Aborted {
                    reason: "harvest stopped without an outcome".to_string(),
                };
            };

            match effect {
                Effect::FetchPage { item_id, page } => {
                    sink.emit(HarvestEvent::Requesting { item_id, page });
                    engine_debug!("Waiting {:?} before page {}", self.config.delay, page);
                    tokio::time::sleep(self.config.delay).await;

                    let msg = match self.fetcher.fetch_page(item_id, page).await {
                        Ok(result) => Msg::PageFetched {
                            page: result,
                            now: self.now(),
                        },
                        Err(err) => {
                            engine_warn!("Page {} of item {} failed: {}", page, item_id, err);
                            Msg::FetchFailed {
                                reason: err.to_string(),
                            }
                        }
                    };
                    let (next, effects) = update(harvest, msg);
                    harvest = next;
                    queue.extend(effects);
                }
                Effect::Checkpoint(state) => self.store.write(&state)?,
                Effect::Progress { page, remaining } => {
                    if remaining > 0 {
                        engine_info!("{} records remaining", remaining);
                    } else {
                        engine_info!("Finished!");
                    }
                    sink.emit(HarvestEvent::PageProcessed {
                        item_id,
                        page,
                        remaining,
                    });
                }
                Effect::Stop(outcome) => break outcome,
            }
        };

        let page = harvest.state().current_page;
        match &outcome {
            Outcome::Finished => sink.emit(HarvestEvent::Finished { item_id, page }),
            Outcome::Aborted { reason } => sink.emit(HarvestEvent::Aborted {
                item_id,
                page,
                reason: reason.clone(),
            }),
            Outcome::AlreadyComplete => {
                return Err(HarvestError::AlreadyComplete {
                    item_id,
                    finished_at: harvest.state().finished_at.clone().unwrap_or_default(),
                });
            }
        }

        let pages_fetched = harvest.pages_fetched();
        Ok(HarvestReport {
            state: harvest.into_state(),
            outcome,
            pages_fetched,
        })
    }

    fn now(&self) -> String {
        (self.config.clock)()
    }
}
