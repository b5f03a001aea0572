use super::CliError;
use super::job::load_job;
use anyhow::Context;
use bootstrap_core::checkpoint::{CheckpointStore, load_history};
use bootstrap_core::domain::BootstrapError;
use bootstrap_core::engine::{RefinementEngine, RefinementOutcome};
use bootstrap_core::plot::{default_plot_file_name, render_energy_intervals};
use bootstrap_core::region::Region;
use std::io::Write;
use std::path::Path;

pub(super) fn run_job_command(path: &Path, persist: bool) -> Result<i32, CliError> {
    let job = load_job(path).map_err(BootstrapError::from)?;
    let config = &job.run;
    let provider = job.potential.build(config.round)?;
    let key = provider.checkpoint_key();

    let mut engine = RefinementEngine::new(provider.as_ref(), config)?;
    if persist {
        let checkpoint = config.checkpoint.clone().unwrap_or_default();
        engine = engine.with_checkpoint(CheckpointStore::from_config(
            &checkpoint,
            &job.output_dir,
            &key,
        ));
    }
    let outcome = engine.run()?;

    if let Some(plot) = &config.plot {
        let plot_path = plot
            .output_path
            .clone()
            .unwrap_or_else(|| job.output_dir.join(default_plot_file_name(config.round, &key)));
        let title = format!("{} potential {key}", provider.name());
        let reference_energies = provider.reference_energies(config.round);
        render_energy_intervals(&plot_path, &title, &outcome.history, &reference_energies, plot)
            .map_err(BootstrapError::from)?;
    }

    write_outcome_summary(&outcome).context("failed to write run summary")?;
    Ok(0)
}

pub(super) fn show_history_command(path: &Path) -> Result<i32, CliError> {
    let history = load_history(path).map_err(BootstrapError::from)?;
    write_history(&mut std::io::stdout().lock(), &history)
        .context("failed to write history")?;
    Ok(0)
}

fn write_outcome_summary(outcome: &RefinementOutcome) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    if let Some(resumed) = outcome.resumed_from {
        writeln!(stdout, "Resumed from {resumed} stored rounds")?;
    }
    writeln!(stdout, "Computed {} rounds", outcome.rounds_computed)?;
    write_history(&mut stdout, &outcome.history)?;
    writeln!(stdout, "Confirmed intervals = {}", outcome.confirmed)?;
    Ok(())
}

fn write_history(writer: &mut impl Write, history: &[Region]) -> std::io::Result<()> {
    for (index, region) in history.iter().enumerate() {
        writeln!(writer, "L={}: {region}", index + 1)?;
    }
    Ok(())
}
