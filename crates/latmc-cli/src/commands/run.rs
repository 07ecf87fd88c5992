use crate::cli::RunArgs;
use crate::config::FileConfig;
use crate::error::Result;
use crate::setup;
use indicatif::{ProgressBar, ProgressStyle};
use latmc::engine::progress::{Progress, ProgressReporter};
use latmc::workflows;
use tracing::info;

pub fn execute(args: RunArgs) -> Result<()> {
    let config = FileConfig::load(&args.config)?;
    let run_config = config.run_config(args.steps, args.seed)?;
    let mut simulation = setup::build_simulation(&config)?;

    info!(
        steps = run_config.steps,
        seed = run_config.seed,
        features = ?simulation.feature_order(),
        "dispatching Monte Carlo run"
    );

    let bar = ProgressBar::new(run_config.steps);
    bar.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} steps ({eta})",
        )
        .expect("valid progress template")
        .progress_chars("#>-"),
    );

    let bar_handle = bar.clone();
    let reporter = ProgressReporter::with_callback(Box::new(move |event| match event {
        Progress::RunStart { total_steps } => bar_handle.set_length(total_steps),
        Progress::StepCompleted => bar_handle.inc(1),
        Progress::RunFinish => bar_handle.finish(),
        Progress::Message(message) => bar_handle.println(message),
    }));

    let stats = workflows::run(&mut simulation, &run_config, &reporter)?;
    drop(reporter);
    bar.finish_and_clear();

    println!(
        "Run complete: {} proposals, {} committed ({:.1}% acceptance), {} vetoed, {} rejected.",
        stats.proposed,
        stats.committed,
        100.0 * stats.acceptance_ratio(),
        stats.vetoed,
        stats.rejected,
    );
    println!(
        "Final system: {} monomers, {} bonds, age {}.",
        simulation.graph().len(),
        simulation.graph().bonds().count(),
        simulation.graph().age(),
    );
    Ok(())
}
