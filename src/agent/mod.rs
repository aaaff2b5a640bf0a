//! 法庭 Agent：一个角色的认知循环
//!
//! - **plan**: 判断需要哪些知识（经验 / 案例 / 法条），并为每类生成检索语句
//! - **execute / speak**: 拼接检索结果与庭审记录，生成一次发言
//! - **reflect**: 案例结束后总结经验与案例、按需检索法条，写回自己的知识库
//!
//! Agent 不修改庭审记录，只读取 `&[Turn]` 快照；LLM 错误原样向上传播。

mod execute;
mod plan;
pub mod prompts;
mod reflect;

use std::fmt;
use std::sync::Arc;

use crate::court::CourtRole;
use crate::knowledge::{KnowledgeStore, LawSearch, NoopLawSearch};
use crate::llm::{GenerationOptions, LlmClient, LlmError};

pub use plan::{AgentPlan, QuerySet, RetrievalPlan};
pub use reflect::{parse_yes_no, LegalReflection, Reflection, MAX_LAWS_PER_REFLECTION};

/// 每类知识检索返回的条数
pub const N_RESULTS: usize = 3;

pub struct Agent {
    id: u32,
    name: String,
    role: CourtRole,
    description: String,
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn KnowledgeStore>,
    law_search: Arc<dyn LawSearch>,
    options: GenerationOptions,
    log_think: bool,
}

impl Agent {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        role: CourtRole,
        description: impl Into<String>,
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn KnowledgeStore>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            description: description.into(),
            llm,
            store,
            law_search: Arc::new(NoopLawSearch),
            options: GenerationOptions::default(),
            log_think: false,
        }
    }

    pub fn with_law_search(mut self, law_search: Arc<dyn LawSearch>) -> Self {
        self.law_search = law_search;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// 开启后，思考过程（计划、检索语句、上下文、反思结果）以 info 级别输出
    pub fn with_log_think(mut self, log_think: bool) -> Self {
        self.log_think = log_think;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> CourtRole {
        self.role
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn store(&self) -> &Arc<dyn KnowledgeStore> {
        &self.store
    }

    /// 每个案例开始前由编排器重新分配原告 / 被告
    pub fn set_role(&mut self, role: CourtRole) {
        self.role = role;
    }

    fn instruction(&self) -> String {
        format!("You are a {}. {}\n\n", self.role, self.description)
    }

    async fn ask(&self, instruction: &str, prompt: &str) -> Result<String, LlmError> {
        self.llm.generate(Some(instruction), prompt, &self.options).await
    }

    fn think(&self, stage: &str, detail: &dyn fmt::Debug) {
        if self.log_think {
            tracing::info!(agent = %self.name, role = %self.role, "{}: {:?}", stage, detail);
        } else {
            tracing::debug!(agent = %self.name, role = %self.role, "{}: {:?}", stage, detail);
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.role)
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("namespace", &self.store.namespace())
            .finish()
    }
}
