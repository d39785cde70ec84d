use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a JSON file with a [`SolverConfig`].
pub const CONFIG_PATH_ENV: &str = "TIMETABLE_TOOL_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Knobs for the population-based solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Per-gene probability of re-randomizing during mutation.
    pub mutation_rate: f64,
    /// Best individuals copied unchanged into each new generation.
    pub elite: usize,
    pub tournament_size: usize,
    pub seed: u64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.05,
            elite: 2,
            tournament_size: 3,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Nodes the lab backtracking may explore per option before falling back.
    pub search_budget: u64,
    /// Cap increase for the second theory pass.
    pub relaxation_step: usize,
    /// Build the three options on the rayon pool.
    pub parallel: bool,
    pub genetic: GeneticConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            search_budget: 200_000,
            relaxation_step: 1,
            parallel: true,
            genetic: GeneticConfig::default(),
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let genetic = &self.genetic;
        if !(0.0..=1.0).contains(&genetic.mutation_rate) {
            return Err(ConfigError::Invalid(format!(
                "genetic.mutation_rate must be between 0 and 1 (got {})",
                genetic.mutation_rate
            )));
        }
        if genetic.population_size < 2 {
            return Err(ConfigError::Invalid(format!(
                "genetic.population_size must be at least 2 (got {})",
                genetic.population_size
            )));
        }
        if genetic.elite > genetic.population_size {
            return Err(ConfigError::Invalid(format!(
                "genetic.elite ({}) exceeds population_size ({})",
                genetic.elite, genetic.population_size
            )));
        }
        if genetic.tournament_size == 0 {
            return Err(ConfigError::Invalid(
                "genetic.tournament_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Loads the file named by `TIMETABLE_TOOL_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_json_file(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }
}
