use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use engine_logging::engine_info;
use playtally_core::{display_name_from_title, item_id_from_location, HarvestView, Outcome};
use playtally_engine::{
    build_report, write_report, CheckpointStore, FetchSettings, HarvestConfig, HarvestError,
    Harvester, ReqwestPageFetcher, RonCheckpointStore,
};

use crate::cli::{Cli, Command, HarvestArgs};
use crate::progress::LogProgressSink;

/// Exit code for a run that stopped early but can be resumed.
const EXIT_ABORTED: u8 = 2;
/// Exit code when the item was already fully harvested.
const EXIT_ALREADY_COMPLETE: u8 = 3;

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let store = RonCheckpointStore::new(cli.store_dir);
    match cli.command {
        Command::Harvest(args) => harvest(args, store).await,
        Command::Report { item_id, out } => {
            let state = store
                .read(item_id)?
                .ok_or_else(|| anyhow!("no checkpoint for item {item_id}"))?;
            match out {
                Some(path) => {
                    let written = write_report(&state.view(), &path)
                        .with_context(|| format!("writing report to {}", path.display()))?;
                    engine_info!("Report written to {:?}", written);
                }
                None => println!("{}", serde_json::to_string_pretty(&build_report(&state.view()))?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Reset { item_id } => {
            if store.remove(item_id)? {
                engine_info!("Removed checkpoint for item {}", item_id);
            } else {
                engine_info!("No checkpoint for item {}", item_id);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::List => {
            for item_id in store.list()? {
                if let Some(state) = store.read(item_id)? {
                    println!("{}", summary_line(&state.view()));
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn harvest(args: HarvestArgs, store: RonCheckpointStore) -> Result<ExitCode> {
    let item_id = item_id_from_location(&args.location)
        .ok_or_else(|| anyhow!("no item id found in {:?}", args.location))?;
    let display_name = args
        .name
        .or_else(|| args.title.as_deref().and_then(display_name_from_title))
        .unwrap_or_default();

    let settings = FetchSettings {
        base_url: args.base_url,
        request_timeout: Duration::from_secs(args.timeout_secs.max(1)),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestPageFetcher::new(settings).context("building http client")?;
    let config = HarvestConfig {
        delay: Duration::from_millis(args.delay_ms),
        ..HarvestConfig::default()
    };
    let harvester = Harvester::new(fetcher, store, config);

    engine_info!("Harvesting plays for item {} {:?}", item_id, display_name);
    match harvester.run(item_id, &display_name, &LogProgressSink).await {
        Ok(report) => {
            println!("{}", summary_line(&report.state.view()));
            Ok(ExitCode::from(exit_code(&report.outcome)))
        }
        Err(HarvestError::AlreadyComplete {
            item_id,
            finished_at,
        }) => {
            println!("item {item_id} already harvested at {finished_at}; use `reset` to start over");
            Ok(ExitCode::from(EXIT_ALREADY_COMPLETE))
        }
        Err(err) => Err(err.into()),
    }
}

fn exit_code(outcome: &Outcome) -> u8 {
    match outcome {
        Outcome::Finished => 0,
        Outcome::Aborted { .. } => EXIT_ABORTED,
        Outcome::AlreadyComplete => EXIT_ALREADY_COMPLETE,
    }
}

fn summary_line(view: &HarvestView) -> String {
    let counts: Vec<String> = view
        .rows
        .iter()
        .filter(|row| row.plays > 0)
        .map(|row| format!("{}p={}", row.player_count, row.plays))
        .collect();
    format!(
        "{} {:?} page={} plays={} {} [{}]",
        view.item_id,
        view.display_name,
        view.pages,
        view.total_plays,
        if view.finished { "finished" } else { "in-progress" },
        counts.join(" ")
    )
}

#[cfg(test)]
mod tests {
    use playtally_core::{HarvestState, Histogram, Outcome};

    use super::{exit_code, summary_line, EXIT_ABORTED, EXIT_ALREADY_COMPLETE};

    #[test]
    fn each_outcome_has_its_own_exit_code() {
        assert_eq!(exit_code(&Outcome::Finished), 0);
        assert_eq!(
            exit_code(&Outcome::Aborted {
                reason: "http status 429".to_string()
            }),
            EXIT_ABORTED
        );
        assert_eq!(exit_code(&Outcome::AlreadyComplete), EXIT_ALREADY_COMPLETE);
    }

    #[test]
    fn summary_skips_empty_player_counts() {
        let mut state = HarvestState::new(13, "Catan", "2024-01-01T00:00:00+00:00");
        state.histogram = Histogram::from_dense(vec![0, 0, 3, 0, 1]);
        state.current_page = 2;

        assert_eq!(
            summary_line(&state.view()),
            "13 \"Catan\" page=2 plays=4 in-progress [2p=3 4p=1]"
        );
    }
}
