//! Update command

use anyhow::{bail, Context, Result};
use camino::Utf8Path;
use extup_core::Extension;
use extup_update::{
    transition_channel, StateStore, StateTransition, UpdateInfo, UpdateOrchestrator, UpdateState,
};
use tracing::{debug, warn};

use super::common::{describe, follow_transitions, select, UpdateContext};
use crate::cli::UpdateArgs;
use crate::output;

/// Update extensions
///
/// Supports:
/// - Single: `extup update notes`
/// - Reinstall regardless of probe result: `extup update notes --force`
/// - Everything with an update available: `extup update --all`
pub async fn run(args: UpdateArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let ctx = UpdateContext::load(config_path)?;
    let names: Vec<String> = args.name.iter().cloned().collect();
    let extensions = select(ctx.installed()?, &names)?;

    if extensions.is_empty() {
        output::warning("No extensions installed");
        return Ok(());
    }

    let store = StateStore::new();
    let (reporter, rx) = transition_channel(store.clone());
    let orchestrator = ctx.orchestrator(reporter)?;

    let spinner = output::spinner("Checking for updates...");
    let follower = follow_transitions(rx, spinner.clone());

    let outcome = match &args.name {
        Some(_) => update_single(&orchestrator, &extensions[0], args.force).await,
        None => Ok(update_available(&orchestrator, &extensions).await),
    };

    drop(orchestrator);
    let transitions = follower.await.context("Progress reporting task failed")?;
    spinner.finish_and_clear();

    debug!("Observed {} state transition(s)", transitions.len());
    let results = outcome?;
    print_results(&results);

    let failed = failed_updates(&transitions);
    if !failed.is_empty() {
        for name in &failed {
            warn!("Update of {} ended in ERROR", name);
            output::error(&format!("Update of {} failed; previous version restored", name));
        }
        bail!("{} update(s) failed", failed.len());
    }

    if results.is_empty() && args.all {
        let available = extensions
            .iter()
            .filter(|e| store.get(&e.name) == Some(UpdateState::UpdateAvailable))
            .count();
        if available == 0 {
            output::success("All extensions are up to date");
        }
    }

    Ok(())
}

async fn update_single(
    orchestrator: &UpdateOrchestrator,
    extension: &Extension,
    force: bool,
) -> Result<Vec<UpdateInfo>> {
    if !force {
        orchestrator.check_all(std::slice::from_ref(extension)).await;
        let state = orchestrator.store().get(&extension.name);
        if state != Some(UpdateState::UpdateAvailable) {
            output::info(&format!("{} is {}", extension.name, describe(state)));
            return Ok(Vec::new());
        }
    }

    let info = orchestrator
        .update_one(extension)
        .await
        .with_context(|| format!("Failed to update {}", extension.name))?;
    Ok(info.into_iter().collect())
}

/// Probe, then update everything found to have an update available
async fn update_available(
    orchestrator: &UpdateOrchestrator,
    extensions: &[Extension],
) -> Vec<UpdateInfo> {
    orchestrator.check_all(extensions).await;
    orchestrator.update_all(extensions).await
}

fn print_results(results: &[UpdateInfo]) {
    if results.is_empty() {
        return;
    }

    output::header("Updated extensions");
    for info in results {
        output::kv(
            &info.name,
            &format!("{} -> {}", info.original_version, info.updated_version),
        );
    }
    println!();
    output::success(&format!("{} extension(s) updated", results.len()));
    output::info("Restart the application to load the updated extensions");
}

/// Extensions whose update ended in `ERROR`
fn failed_updates(transitions: &[StateTransition]) -> Vec<String> {
    transitions
        .iter()
        .filter(|t| t.state == UpdateState::Error && t.previous == Some(UpdateState::Updating))
        .map(|t| t.extension.clone())
        .collect()
}
