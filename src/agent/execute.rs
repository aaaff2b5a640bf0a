//! 执行阶段：拼接上下文并生成发言

use crate::agent::prompts::{section_label, HISTORY_LABEL};
use crate::agent::{Agent, AgentPlan, N_RESULTS};
use crate::court::{format_history, Turn};
use crate::knowledge::{render_records, KnowledgeKind};
use crate::llm::LlmError;

impl Agent {
    /// plan 为 None 时只用庭审记录作上下文（如审判长的固定提问）
    pub async fn execute(
        &self,
        plan: Option<&AgentPlan>,
        history: &[Turn],
        prompt: &str,
    ) -> Result<String, LlmError> {
        let context = match plan {
            Some(plan) => self.prepare_context(plan, history),
            None => format_history(history),
        };
        self.speak(&context, prompt).await
    }

    /// 按计划检索（每类最多 N_RESULTS 条），依次拼接经验、案例、法条小节，最后附上庭审记录
    pub fn prepare_context(&self, plan: &AgentPlan, history: &[Turn]) -> String {
        let mut context = String::new();

        for (kind, query) in &plan.queries {
            let records = match kind {
                KnowledgeKind::Experience => self.store.query_experience(query, N_RESULTS),
                KnowledgeKind::Case => self.store.query_case(query, N_RESULTS),
                KnowledgeKind::Legal => self.store.query_legal(query, N_RESULTS),
            };
            context.push_str(&format!(
                "\n{}\n{}\n",
                section_label(*kind),
                render_records(*kind, &records)
            ));
        }
        if !plan.queries.is_empty() {
            self.think("retrieved context", &context);
        }

        context.push_str(&format!("\n{}\n{}\n", HISTORY_LABEL, format_history(history)));
        context
    }

    /// 一次 LLM 调用，返回内容即发言
    pub async fn speak(&self, context: &str, prompt: &str) -> Result<String, LlmError> {
        let full_prompt = format!("{}\n\n{}", context, prompt);
        self.ask(&self.instruction(), &full_prompt).await
    }
}
