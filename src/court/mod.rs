//! 庭审领域：角色、记录、台词、案例数据、断点与输出

pub mod case_log;
pub mod cases;
pub mod checkpoint;
pub mod history;
pub mod role;
pub mod rounds;
pub mod script;

pub use case_log::{CaseLogSink, InMemoryCaseLog, JsonCaseLog};
pub use cases::{load_cases, parse_cases, CaseRecord};
pub use checkpoint::{CheckpointStore, FileCheckpoint, InMemoryCheckpoint, Progress};
pub use history::{format_history, History, HistoryObserver, Turn};
pub use role::CourtRole;
pub use rounds::{FixedRounds, RandomRounds, RoundPicker};
pub use script::{Confirmation, CourtScript, RoleLabels};
