use crate::cli::CheckArgs;
use crate::config::FileConfig;
use crate::error::Result;
use crate::setup;
use tracing::info;

/// Builds the configured system and runs one synchronize pass, which
/// validates box dimensions, chain layout, parameter tables, and
/// multiple-occupation consistency without simulating.
pub fn execute(args: CheckArgs) -> Result<()> {
    let config = FileConfig::load(&args.config)?;
    let mut simulation = setup::build_simulation(&config)?;
    simulation.synchronize()?;

    info!("configuration validated");
    println!(
        "Configuration valid: {} monomers in {} chains, {} bonds, features: {}.",
        simulation.graph().len(),
        config.system.chains,
        simulation.graph().bonds().count(),
        simulation.feature_order().join(", "),
    );
    Ok(())
}
