//! Agent Court - 多智能体法庭模拟
//!
//! 模块划分：
//! - **agent**: 法庭 Agent 的认知循环（计划 / 执行 / 反思）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、庭审编排器、从配置构建模拟
//! - **court**: 角色、庭审记录、台词、案例数据、断点与庭审记录输出
//! - **knowledge**: 经验 / 案例 / 法条知识库与外部法条检索
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / 智谱 / 文心 / Mock）
//! - **observability**: 日志初始化与控制台展示
//! - **parser**: 模型输出的 JSON 提取与字段规整

pub mod agent;
pub mod config;
pub mod core;
pub mod court;
pub mod knowledge;
pub mod llm;
pub mod observability;
pub mod parser;

pub use agent::Agent;
pub use core::{CaseOutcome, CourtError, CourtSimulation, SimulationBuilder};
