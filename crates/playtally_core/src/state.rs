use crate::view_model::{HarvestView, HistogramRow};
use crate::Histogram;

pub type ItemId = u64;

/// The persisted, resumable unit of work for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestState {
    pub item_id: ItemId,
    pub display_name: String,
    /// 1-based cursor into the remote page sequence.
    pub current_page: u32,
    pub histogram: Histogram,
    /// RFC 3339, set once when the harvest first starts.
    pub started_at: String,
    /// RFC 3339; present only once the last page has been consumed.
    pub finished_at: Option<String>,
}

impl HarvestState {
    pub fn new(item_id: ItemId, display_name: impl Into<String>, started_at: impl Into<String>) -> Self {
        Self {
            item_id,
            display_name: display_name.into(),
            current_page: 1,
            histogram: Histogram::new(),
            started_at: started_at.into(),
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn view(&self) -> HarvestView {
        let total_plays = self.histogram.total();
        let rows = self
            .histogram
            .to_dense()
            .into_iter()
            .zip(0u32..)
            .map(|(plays, player_count)| HistogramRow {
                player_count,
                plays,
                share_percent: if total_plays == 0 {
                    0.0
                } else {
                    plays as f64 * 100.0 / total_plays as f64
                },
            })
            .collect();

        HarvestView {
            item_id: self.item_id,
            display_name: self.display_name.clone(),
            pages: self.current_page,
            finished: self.is_finished(),
            started_at: self.started_at.clone(),
            finished_at: self.finished_at.clone(),
            total_plays,
            rows,
        }
    }
}
