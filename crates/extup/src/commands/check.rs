//! Check command

use anyhow::{Context, Result};
use camino::Utf8Path;
use extup_update::{transition_channel, StateStore, UpdateState};
use tabled::{settings::Style, Table, Tabled};

use super::common::{describe, follow_transitions, select, UpdateContext};
use crate::cli::CheckArgs;
use crate::output;

#[derive(Tabled, serde::Serialize)]
struct CheckRow {
    name: String,
    version: String,
    #[serde(skip)]
    status: String,
    #[tabled(skip)]
    state: Option<UpdateState>,
}

/// Check installed extensions for updates
///
/// Supports:
/// - Check all: `extup check`
/// - Check specific: `extup check notes weather`
/// - JSON output: `extup check --json`
pub async fn run(args: CheckArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let ctx = UpdateContext::load(config_path)?;
    let extensions = select(ctx.installed()?, &args.extensions)?;

    if extensions.is_empty() {
        output::warning("No extensions installed");
        return Ok(());
    }

    let store = StateStore::new();
    let (reporter, rx) = transition_channel(store.clone());
    let orchestrator = ctx.orchestrator(reporter)?;

    let spinner = output::spinner("Checking for updates...");
    let follower = follow_transitions(rx, spinner.clone());
    orchestrator.check_all(&extensions).await;
    drop(orchestrator);
    follower.await.context("Progress reporting task failed")?;
    spinner.finish_and_clear();

    let rows: Vec<CheckRow> = extensions
        .iter()
        .map(|ext| {
            let state = store.get(&ext.name);
            CheckRow {
                name: ext.name.clone(),
                version: ext.version.clone(),
                status: describe(state).to_string(),
                state,
            }
        })
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&rows).context("Failed to serialize to JSON")?;
        println!("{}", json);
        return Ok(());
    }

    let mut table = Table::new(&rows);
    table.with(Style::sharp());
    println!("\n{}", table);

    let count = |wanted: UpdateState| rows.iter().filter(|r| r.state == Some(wanted)).count();
    let failed = count(UpdateState::Error);
    if failed > 0 {
        output::warning(&format!(
            "{} extension(s) could not be checked (run with -v for details)",
            failed
        ));
    }

    let available = count(UpdateState::UpdateAvailable);
    if available > 0 {
        output::info(&format!(
            "{} update(s) available; run `extup update --all` to apply",
            available
        ));
    } else if failed == 0 {
        output::success("All extensions are up to date");
    }

    Ok(())
}
