use crate::engine::error::EngineError;
use crate::engine::features::ReactiveBonds;
use crate::engine::generator::{propose_connect, propose_local};
use crate::engine::moves::Move;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::simulation::{MoveOutcome, Simulation};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RunConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Parameters of one Monte Carlo run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Monte Carlo steps; each step proposes one local move per monomer.
    pub steps: u64,
    /// Seed of the deterministic random stream.
    pub seed: u64,
    /// Connect proposals drawn per step from the reactive-bond feature's
    /// open set (ignored when that feature is absent).
    pub connect_attempts_per_step: u32,
}

#[derive(Default)]
pub struct RunConfigBuilder {
    steps: Option<u64>,
    seed: Option<u64>,
    connect_attempts_per_step: Option<u32>,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(mut self, steps: u64) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn connect_attempts_per_step(mut self, attempts: u32) -> Self {
        self.connect_attempts_per_step = Some(attempts);
        self
    }

    pub fn build(self) -> Result<RunConfig, RunConfigError> {
        Ok(RunConfig {
            steps: self.steps.ok_or(RunConfigError::MissingParameter("steps"))?,
            seed: self.seed.ok_or(RunConfigError::MissingParameter("seed"))?,
            connect_attempts_per_step: self.connect_attempts_per_step.unwrap_or(0),
        })
    }
}

/// Outcome counters of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub proposed: u64,
    pub committed: u64,
    pub vetoed: u64,
    pub rejected: u64,
}

impl RunStats {
    fn record(&mut self, outcome: MoveOutcome) {
        self.proposed += 1;
        match outcome {
            MoveOutcome::Committed => self.committed += 1,
            MoveOutcome::Vetoed => self.vetoed += 1,
            MoveOutcome::Rejected => self.rejected += 1,
        }
    }

    /// Fraction of proposals that committed.
    pub fn acceptance_ratio(&self) -> f64 {
        if self.proposed == 0 {
            0.0
        } else {
            self.committed as f64 / self.proposed as f64
        }
    }
}

/// Executes a Monte Carlo run on a fully configured simulation.
///
/// Synchronizes every feature, then performs `steps` Monte Carlo steps.
/// One step proposes `graph.len()` local moves (plus the configured
/// number of connect attempts when reactive bonds are enabled) and
/// advances the graph age by one. The engine itself never touches the
/// age; this run loop owns it.
pub fn run(
    simulation: &mut Simulation,
    config: &RunConfig,
    reporter: &ProgressReporter,
) -> Result<RunStats, EngineError> {
    simulation.synchronize()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut stats = RunStats::default();

    info!(
        steps = config.steps,
        monomers = simulation.graph().len(),
        seed = config.seed,
        "starting Monte Carlo run"
    );
    reporter.report(Progress::RunStart {
        total_steps: config.steps,
    });

    for step in 0..config.steps {
        let proposals = simulation.graph().len();
        for _ in 0..proposals {
            if let Some(mut mv) = propose_local(simulation.graph(), &mut rng) {
                stats.record(simulation.try_move(&mut mv, &mut rng)?);
            }
        }

        for _ in 0..config.connect_attempts_per_step {
            let candidates: Vec<usize> = match simulation.feature::<ReactiveBonds>() {
                Some(reactive) => reactive.open_monomers().collect(),
                None => break,
            };
            if let Some(mut mv) = propose_connect(&candidates, &mut rng) {
                stats.record(simulation.try_move(&mut mv, &mut rng)?);
            }
        }

        simulation.graph_mut().set_age(step + 1);
        reporter.report(Progress::StepCompleted);
    }

    reporter.report(Progress::RunFinish);
    info!(
        proposed = stats.proposed,
        committed = stats.committed,
        vetoed = stats.vetoed,
        rejected = stats.rejected,
        "Monte Carlo run finished"
    );
    Ok(stats)
}

/// Dispatches a single externally built move, for setup updaters that
/// drive the same pipeline as the run loop.
pub fn apply_setup_move(simulation: &mut Simulation, mv: &mut Move) -> Result<bool, EngineError> {
    if !simulation.check_move(mv)? {
        return Ok(false);
    }
    simulation.apply_move(mv)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lattice::PeriodicBox;
    use crate::core::models::{Monomer, MonomerGraph};
    use crate::engine::features::ExcludedVolume;
    use nalgebra::Vector3;

    fn dimer_simulation() -> Simulation {
        let mut graph = MonomerGraph::new();
        graph.add_monomer(Monomer::new(Vector3::new(0, 0, 0)));
        graph.add_monomer(Monomer::new(Vector3::new(8, 8, 8)));
        Simulation::builder()
            .graph(graph)
            .register(ExcludedVolume::new(PeriodicBox::new(16, 16, 16).unwrap()))
            .build()
            .unwrap()
    }

    #[test]
    fn builder_requires_steps_and_seed() {
        assert_eq!(
            RunConfigBuilder::new().seed(1).build(),
            Err(RunConfigError::MissingParameter("steps"))
        );
        assert_eq!(
            RunConfigBuilder::new().steps(10).build(),
            Err(RunConfigError::MissingParameter("seed"))
        );

        let config = RunConfigBuilder::new().steps(10).seed(1).build().unwrap();
        assert_eq!(config.connect_attempts_per_step, 0);
    }

    #[test]
    fn run_accounts_for_every_proposal_and_advances_the_age() {
        let mut simulation = dimer_simulation();
        let config = RunConfigBuilder::new().steps(5).seed(42).build().unwrap();

        let stats = run(&mut simulation, &config, &ProgressReporter::new()).unwrap();

        assert_eq!(stats.proposed, 10);
        assert_eq!(
            stats.committed + stats.vetoed + stats.rejected,
            stats.proposed
        );
        assert_eq!(simulation.graph().age(), 5);
        assert!(stats.acceptance_ratio() <= 1.0);
    }

    #[test]
    fn identical_seeds_reproduce_identical_trajectories() {
        let config = RunConfigBuilder::new().steps(8).seed(7).build().unwrap();

        let mut first = dimer_simulation();
        let first_stats = run(&mut first, &config, &ProgressReporter::new()).unwrap();

        let mut second = dimer_simulation();
        let second_stats = run(&mut second, &config, &ProgressReporter::new()).unwrap();

        assert_eq!(first_stats, second_stats);
        assert_eq!(first.graph()[0].position, second.graph()[0].position);
        assert_eq!(first.graph()[1].position, second.graph()[1].position);
    }

    #[test]
    fn progress_events_bracket_the_steps() {
        use std::sync::Mutex;

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(format!("{event:?}"));
        }));

        let mut simulation = dimer_simulation();
        let config = RunConfigBuilder::new().steps(2).seed(3).build().unwrap();
        run(&mut simulation, &config, &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert_eq!(events.first().unwrap(), "RunStart { total_steps: 2 }");
        assert_eq!(events.last().unwrap(), "RunFinish");
        assert_eq!(
            events.iter().filter(|e| *e == "StepCompleted").count(),
            2
        );
    }

    #[test]
    fn composed_stack_forms_and_saturates_a_reactive_bond() {
        use crate::core::models::Attributes;
        use crate::engine::features::{BondVectorSet, ReactiveBondConfig, ReactiveBonds};
        use crate::engine::simulation::MoveOutcome;
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let geometry = PeriodicBox::new(16, 16, 16).unwrap();
        let mut graph = MonomerGraph::new();
        for position in [[0, 0, 0], [3, 0, 0]] {
            graph.add_monomer(Monomer::with_attributes(
                Vector3::from(position),
                Attributes {
                    reactive: true,
                    ..Attributes::default()
                },
            ));
        }
        let mut simulation = Simulation::builder()
            .graph(graph)
            .register(ExcludedVolume::new(geometry))
            .register(BondVectorSet::new(geometry))
            .register(ReactiveBonds::new(
                geometry,
                ReactiveBondConfig { max_connectivity: 1 },
            ))
            .build()
            .unwrap();
        simulation.synchronize().unwrap();

        let mut rng = StdRng::seed_from_u64(2);
        let mut connect = Move::connect(0, 1);
        assert_eq!(
            simulation.try_move(&mut connect, &mut rng).unwrap(),
            MoveOutcome::Committed
        );
        assert!(simulation.graph().are_connected(0, 1));

        // both ends are now saturated; a repeat proposal is vetoed
        let mut again = Move::connect(0, 1);
        assert_eq!(
            simulation.try_move(&mut again, &mut rng).unwrap(),
            MoveOutcome::Vetoed
        );
        assert_eq!(
            simulation
                .feature::<ReactiveBonds>()
                .unwrap()
                .open_monomers()
                .count(),
            0
        );
    }

    #[test]
    fn setup_moves_drive_the_same_pipeline() {
        let mut simulation = dimer_simulation();
        simulation.synchronize().unwrap();

        let mut blocked = Move::insertion(Vector3::new(0, 0, 0), Default::default());
        assert!(!apply_setup_move(&mut simulation, &mut blocked).unwrap());
        assert_eq!(simulation.graph().len(), 2);

        let mut clear = Move::insertion(Vector3::new(4, 0, 0), Default::default());
        assert!(apply_setup_move(&mut simulation, &mut clear).unwrap());
        assert_eq!(simulation.graph().len(), 3);
    }
}
