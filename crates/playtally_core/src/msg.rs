#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin a run with whatever the checkpoint store holds for the item.
    Start {
        stored: Option<crate::HarvestState>,
        now: String,
    },
    /// The fetcher returned the page that was last requested.
    PageFetched { page: crate::PageResult, now: String },
    /// The fetcher failed; nothing from that page is applied.
    FetchFailed { reason: String },
}
