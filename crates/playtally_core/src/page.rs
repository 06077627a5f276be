/// One logged play as consumed by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayRecord {
    pub quantity: u64,
    /// Number of entries in the play's player list; 0 when none were logged.
    pub player_count: u32,
}

/// One page returned by the remote plays endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageResult {
    /// The remote `total` attribute. It counts every play for the item, so the
    /// loop subtracts what earlier pages already covered.
    pub total_remaining: i64,
    pub records: Vec<PlayRecord>,
}
