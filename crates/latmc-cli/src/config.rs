use crate::error::{CliError, Result};
use latmc::workflows::{RunConfig, RunConfigBuilder};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Top-level schema of the TOML run configuration.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(rename = "box")]
    pub simulation_box: BoxSection,
    pub run: RunSection,
    pub system: SystemSection,
    #[serde(default)]
    pub interaction: Option<InteractionSection>,
    #[serde(default)]
    pub bending: Option<BendingSection>,
    #[serde(default)]
    pub reactive: Option<ReactiveSection>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BoxSection {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunSection {
    pub steps: u64,
    pub seed: u64,
    #[serde(default)]
    pub connect_attempts_per_step: u32,
}

/// The initial system: linear chains laid out on the lattice.
#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SystemSection {
    pub chains: u32,
    pub chain_length: u32,
    /// Interaction species tag assigned to every monomer (0 = untagged).
    #[serde(default)]
    pub monomer_type: u8,
    /// Mark every monomer reactive.
    #[serde(default)]
    pub reactive: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InteractionSection {
    /// Path to a `type_a,type_b,energy` CSV table.
    #[serde(default)]
    pub energies_csv: Option<std::path::PathBuf>,
    /// Inline pair energies, merged over the CSV table.
    #[serde(default)]
    pub pairs: Vec<PairSection>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PairSection {
    pub type_a: u8,
    pub type_b: u8,
    pub energy: f64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BendingSection {
    pub angles: Vec<AngleSection>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AngleSection {
    pub first: [i32; 3],
    pub second: [i32; 3],
    pub factor: f64,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReactiveSection {
    pub max_connectivity: u32,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| CliError::FileParsing {
                path: path.to_path_buf(),
                source: e,
            })?;
        debug!(?config, "loaded run configuration");
        config.validate()?;
        Ok(config)
    }

    pub fn parse_str(content: &str) -> Result<Self> {
        let config: FileConfig = toml::from_str(content).map_err(|e| CliError::FileParsing {
            path: "<inline>".into(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.system.chains == 0 || self.system.chain_length == 0 {
            return Err(CliError::Config(
                "the system needs at least one chain of at least one monomer".into(),
            ));
        }
        if self.reactive.is_some_and(|r| r.max_connectivity == 0) {
            return Err(CliError::Config(
                "reactive.max-connectivity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The core run parameters, with optional command-line overrides.
    pub fn run_config(&self, steps: Option<u64>, seed: Option<u64>) -> Result<RunConfig> {
        Ok(RunConfigBuilder::new()
            .steps(steps.unwrap_or(self.run.steps))
            .seed(seed.unwrap_or(self.run.seed))
            .connect_attempts_per_step(self.run.connect_attempts_per_step)
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [box]
        x = 64
        y = 64
        z = 64

        [run]
        steps = 100
        seed = 7

        [system]
        chains = 4
        chain-length = 8
    "#;

    #[test]
    fn minimal_configuration_parses_with_defaults() {
        let config = FileConfig::parse_str(MINIMAL).unwrap();
        assert_eq!(config.simulation_box.x, 64);
        assert_eq!(config.run.connect_attempts_per_step, 0);
        assert_eq!(config.system.monomer_type, 0);
        assert!(!config.system.reactive);
        assert!(config.interaction.is_none());
        assert!(config.bending.is_none());
    }

    #[test]
    fn command_line_overrides_win_over_the_file() {
        let config = FileConfig::parse_str(MINIMAL).unwrap();
        let run = config.run_config(Some(5), None).unwrap();
        assert_eq!(run.steps, 5);
        assert_eq!(run.seed, 7);
    }

    #[test]
    fn full_configuration_parses_every_section() {
        let content = r#"
            [box]
            x = 32
            y = 32
            z = 32

            [run]
            steps = 10
            seed = 1
            connect-attempts-per-step = 4

            [system]
            chains = 2
            chain-length = 4
            monomer-type = 1
            reactive = true

            [interaction]
            pairs = [{ type-a = 1, type-b = 1, energy = -0.2 }]

            [bending]
            angles = [{ first = [-2, 0, 0], second = [2, 1, 0], factor = 0.8 }]

            [reactive]
            max-connectivity = 3
        "#;
        let config = FileConfig::parse_str(content).unwrap();
        assert_eq!(config.interaction.unwrap().pairs.len(), 1);
        assert_eq!(config.bending.unwrap().angles[0].factor, 0.8);
        assert_eq!(config.reactive.unwrap().max_connectivity, 3);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let content = MINIMAL.replace("seed = 7", "seed = 7\ntypo-field = 1");
        assert!(matches!(
            FileConfig::parse_str(&content),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn empty_systems_are_rejected() {
        let content = MINIMAL.replace("chains = 4", "chains = 0");
        assert!(matches!(
            FileConfig::parse_str(&content),
            Err(CliError::Config(_))
        ));
    }
}
