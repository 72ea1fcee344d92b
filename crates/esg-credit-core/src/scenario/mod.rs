pub mod engine;
pub mod registry;

pub use engine::{apply_scenario, ScenarioInput, ScenarioOutput, StressedFirm};
pub use registry::{ScenarioDefinition, ScenarioRegistry};
