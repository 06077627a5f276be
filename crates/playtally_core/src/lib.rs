//! Playtally core: domain types, the aggregator and the pure harvest state machine.
mod effect;
mod histogram;
mod locate;
mod msg;
mod page;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Outcome};
pub use histogram::{fold, normalize, Histogram};
pub use locate::{display_name_from_title, item_id_from_location};
pub use msg::Msg;
pub use page::{PageResult, PlayRecord};
pub use state::{HarvestState, ItemId};
pub use update::{update, Harvest, Phase, DEFAULT_PAGE_SIZE};
pub use view_model::{HarvestView, HistogramRow};
