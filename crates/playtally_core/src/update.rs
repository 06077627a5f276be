use crate::{Effect, HarvestState, ItemId, Msg, Outcome, PageResult};

/// Records per page served by the remote plays endpoint.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Resuming,
    Fetching,
    Finished,
    Aborted,
    AlreadyComplete,
}

/// Harvest loop state: the working [`HarvestState`] plus the loop bookkeeping
/// that is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    state: HarvestState,
    phase: Phase,
    remaining: i64,
    page_size: u32,
    pages_fetched: u32,
}

impl Harvest {
    /// `started_at` is filled in by [`Msg::Start`], either from the stored
    /// record or from the clock.
    pub fn new(item_id: ItemId, display_name: impl Into<String>, page_size: u32) -> Self {
        Self {
            state: HarvestState::new(item_id, display_name, String::new()),
            phase: Phase::Resuming,
            // Positive so the first page is always requested.
            remaining: 1,
            page_size: page_size.max(1),
            pages_fetched: 0,
        }
    }

    pub fn state(&self) -> &HarvestState {
        &self.state
    }

    pub fn into_state(self) -> HarvestState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Pages fetched and folded during this run only.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    fn resume(&mut self, stored: Option<HarvestState>, now: String) -> Vec<Effect> {
        match stored {
            Some(stored) if stored.is_finished() => {
                self.state = stored;
                self.phase = Phase::AlreadyComplete;
                return vec![Effect::Stop(Outcome::AlreadyComplete)];
            }
            Some(stored) => {
                self.state.current_page = stored.current_page.max(1);
                self.state.histogram = stored.histogram;
                self.state.started_at = stored.started_at;
                if self.state.display_name.trim().is_empty() {
                    self.state.display_name = stored.display_name;
                }
            }
            None => {
                self.state.started_at = now;
            }
        }
        self.phase = Phase::Fetching;
        vec![self.fetch_effect()]
    }

    fn apply_page(&mut self, page: PageResult, now: String) -> Vec<Effect> {
        self.state.histogram.fold(&page.records);
        self.pages_fetched += 1;

        // `total` counts every play for the item, so subtract everything paged
        // through so far, including this page.
        let consumed_page = self.state.current_page;
        let consumed = i64::from(self.page_size) * i64::from(consumed_page);
        self.remaining = page.total_remaining - consumed;
        self.state.current_page += 1;

        let mut effects = Vec::with_capacity(3);
        if self.remaining <= 0 {
            // The increment above was a look-ahead; stay on the last page read.
            self.state.current_page -= 1;
            self.state.finished_at = Some(now);
            self.phase = Phase::Finished;
        }
        effects.push(Effect::Progress {
            page: consumed_page,
            remaining: self.remaining,
        });
        effects.push(self.checkpoint_effect());
        if self.phase == Phase::Finished {
            effects.push(Effect::Stop(Outcome::Finished));
        } else {
            effects.push(self.fetch_effect());
        }
        effects
    }

    fn abort(&mut self, reason: String) -> Vec<Effect> {
        self.remaining = -1;
        self.phase = Phase::Aborted;
        vec![
            self.checkpoint_effect(),
            Effect::Stop(Outcome::Aborted { reason }),
        ]
    }

    fn fetch_effect(&self) -> Effect {
        Effect::FetchPage {
            item_id: self.state.item_id,
            page: self.state.current_page,
        }
    }

    fn checkpoint_effect(&mut self) -> Effect {
        self.state.histogram.normalize();
        Effect::Checkpoint(self.state.clone())
    }
}

/// Pure update function: applies a message to the harvest and returns the
/// effects the runner must perform, in order.
///
/// Messages that do not fit the current phase are ignored.
pub fn update(mut harvest: Harvest, msg: Msg) -> (Harvest, Vec<Effect>) {
    let effects = match (harvest.phase, msg) {
        (Phase::Resuming, Msg::Start { stored, now }) => harvest.resume(stored, now),
        (Phase::Fetching, Msg::PageFetched { page, now }) => harvest.apply_page(page, now),
        (Phase::Fetching, Msg::FetchFailed { reason }) => harvest.abort(reason),
        _ => Vec::new(),
    };

    (harvest, effects)
}
