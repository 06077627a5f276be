use engine_logging::{engine_info, engine_warn};
use playtally_engine::{HarvestEvent, ProgressSink};

/// Reports harvest progress through the log facade.
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: HarvestEvent) {
        match event {
            HarvestEvent::Resumed { item_id, page } => {
                engine_info!("Item {} picks up at page {}", item_id, page);
            }
            HarvestEvent::Requesting { .. } | HarvestEvent::PageProcessed { .. } => {}
            HarvestEvent::Finished { item_id, page } => {
                engine_info!("Item {} finished after page {}", item_id, page);
            }
            HarvestEvent::Aborted {
                item_id,
                page,
                reason,
            } => {
                engine_warn!(
                    "Item {} stopped before page {} ({}); run again to resume",
                    item_id,
                    page,
                    reason
                );
            }
        }
    }
}
