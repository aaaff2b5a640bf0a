//! 核心层：错误类型、庭审编排器、从配置构建模拟

pub mod builder;
pub mod error;
pub mod orchestrator;

pub use builder::{create_llm_from_config, validate_court, SimulationBuilder};
pub use error::{CourtError, ValidationError};
pub use orchestrator::{CaseOutcome, CourtSimulation};
