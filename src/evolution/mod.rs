pub mod builder;
pub mod challenge;
pub mod launcher;
pub mod options;
pub mod statistics;

pub use builder::EvolutionLauncherBuilder;
pub use challenge::Challenge;
pub use launcher::{EvolutionLauncher, RunOutcome, Termination};
pub use options::{EvolutionOptions, GrowthRateMetric, LogLevel, Tolerance};
pub use statistics::{NoiseStats, RunSummary, RunTrace};
