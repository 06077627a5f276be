#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Wait out the rate-limit delay, then request this page.
    FetchPage { item_id: crate::ItemId, page: u32 },
    /// Persist this snapshot before doing anything else.
    Checkpoint(crate::HarvestState),
    /// A page was folded in.
    Progress { page: u32, remaining: i64 },
    /// The run is over.
    Stop(Outcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every page was consumed and `finished_at` is set.
    Finished,
    /// A fetch failed; the checkpoint is left resumable.
    Aborted { reason: String },
    /// The stored record was already finished, nothing was fetched.
    AlreadyComplete,
}
