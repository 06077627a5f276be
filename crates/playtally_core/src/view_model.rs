use crate::ItemId;

/// Read-only summary of a harvest, used for reports and terminal output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HarvestView {
    pub item_id: ItemId,
    pub display_name: String,
    pub pages: u32,
    pub finished: bool,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub total_plays: u64,
    pub rows: Vec<HistogramRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramRow {
    pub player_count: u32,
    pub plays: u64,
    pub share_percent: f64,
}
