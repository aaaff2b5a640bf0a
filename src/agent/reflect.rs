//! 反思阶段：案例结束后把经验、案例与所需法条写回自己的知识库
//!
//! 顺序：案情摘要 -> 法条 -> 经验 -> 案例。反思结果不进入庭审记录。

use serde::Serialize;
use uuid::Uuid;

use crate::agent::prompts::{
    case_summary_instruction, case_summary_prompt, experience_summary_prompt, need_legal_prompt,
    CASE_CONTENT_INSTRUCTION, CASE_CONTENT_PROMPT, NEED_LEGAL_INSTRUCTION,
};
use crate::agent::Agent;
use crate::core::CourtError;
use crate::court::{format_history, Turn};
use crate::knowledge::{CaseEntry, ExperienceEntry, KnowledgeKind, LawEntry};
use crate::llm::LlmError;
use crate::parser::{ensure_case_fields, ensure_experience_fields, extract_structured};

/// 单次反思最多写入的法条数
pub const MAX_LAWS_PER_REFLECTION: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegalReflection {
    pub needed_reference: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laws: Option<Vec<LawEntry>>,
}

impl LegalReflection {
    fn not_needed() -> Self {
        Self {
            needed_reference: false,
            query: None,
            laws: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reflection {
    pub legal_reflection: LegalReflection,
    pub experience_reflection: ExperienceEntry,
    pub case_reflection: CaseEntry,
}

/// 是否需要补充法条：只含 "true" 时为是；同时含 "false" 或都不含时为否
pub fn parse_yes_no(reply: &str) -> bool {
    let cleaned = reply.trim().to_lowercase();
    cleaned.contains("true") && !cleaned.contains("false")
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Agent {
    pub async fn reflect(&self, history: &[Turn]) -> Result<Reflection, CourtError> {
        let history_context = format_history(history);
        let case_content = self.summarize_case(&history_context).await?;

        let legal_reflection = self.reflect_on_legal(&history_context).await?;
        self.think("legal reflection", &legal_reflection);

        let experience_reflection = self
            .reflect_on_experience(&case_content, &history_context)
            .await?;
        self.think("experience reflection", &experience_reflection);

        let case_reflection = self.reflect_on_case(&case_content, &history_context).await?;
        self.think("case reflection", &case_reflection);

        Ok(Reflection {
            legal_reflection,
            experience_reflection,
            case_reflection,
        })
    }

    /// 三句话案情摘要
    pub async fn summarize_case(&self, history_context: &str) -> Result<String, LlmError> {
        let prompt = format!("{}\n\n{}", CASE_CONTENT_PROMPT, history_context);
        self.ask(CASE_CONTENT_INSTRUCTION, &prompt).await
    }

    pub async fn needs_legal_reference(&self, history_context: &str) -> Result<bool, LlmError> {
        let instruction = format!("{}{}", self.instruction(), NEED_LEGAL_INSTRUCTION);
        let reply = self
            .ask(&instruction, &need_legal_prompt(history_context))
            .await?;
        Ok(parse_yes_no(&reply))
    }

    async fn reflect_on_legal(&self, history_context: &str) -> Result<LegalReflection, LlmError> {
        if !self.needs_legal_reference(history_context).await? {
            return Ok(LegalReflection::not_needed());
        }

        let query = self.prepare_query(KnowledgeKind::Legal, history_context).await?;
        let found = self.law_search.search_law(&query).await;
        if found.len() > MAX_LAWS_PER_REFLECTION {
            tracing::debug!(
                agent = %self.name,
                found = found.len(),
                "Keeping the first {} laws",
                MAX_LAWS_PER_REFLECTION
            );
        }

        let laws: Vec<LawEntry> = found
            .iter()
            .take(MAX_LAWS_PER_REFLECTION)
            .map(|law| LawEntry::from_law(new_id(), law))
            .collect();
        for law in &laws {
            self.store
                .add_to_legal(&law.id, &law.content, law.metadata.to_map());
        }

        Ok(LegalReflection {
            needed_reference: true,
            query: Some(query),
            laws: Some(laws),
        })
    }

    async fn reflect_on_experience(
        &self,
        case_content: &str,
        history_context: &str,
    ) -> Result<ExperienceEntry, CourtError> {
        let reply = self
            .ask(
                &self.instruction(),
                &experience_summary_prompt(case_content, history_context),
            )
            .await?;
        let summary = ensure_experience_fields(&extract_structured(&reply))?;

        let entry = ExperienceEntry::from_summary(new_id(), summary);
        self.store
            .add_to_experience(&entry.id, &entry.content, entry.metadata.to_map());
        Ok(entry)
    }

    async fn reflect_on_case(
        &self,
        case_content: &str,
        history_context: &str,
    ) -> Result<CaseEntry, CourtError> {
        let instruction = case_summary_instruction(self.role.as_str(), &self.description);
        let reply = self
            .ask(&instruction, &case_summary_prompt(case_content, history_context))
            .await?;
        let summary = ensure_case_fields(&extract_structured(&reply))?;

        let entry = CaseEntry::from_summary(new_id(), summary);
        self.store
            .add_to_case(&entry.id, &entry.content, entry.metadata.to_map());
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::court::CourtRole;
    use crate::knowledge::{InMemoryKnowledgeStore, LawRecord, StaticLawSearch};
    use crate::llm::ScriptedLlmClient;

    #[test]
    fn test_parse_yes_no() {
        assert!(parse_yes_no("True"));
        assert!(parse_yes_no("  'true' \n"));
        assert!(!parse_yes_no("false"));
        assert!(!parse_yes_no("true or false, hard to say"));
        assert!(!parse_yes_no("maybe"));
        assert!(!parse_yes_no(""));
    }

    fn scripted(need_legal: &str) -> ScriptedLlmClient {
        ScriptedLlmClient::new("fallback")
            .on("three sentences", "A wage dispute.")
            .on("Is additional legal reference needed?", need_legal)
            .on("legal information is needed", r#"{"query": "overtime statute"}"#)
            .on(
                "experience summary",
                r#"{"context": "bg", "content": "lesson", "focus_points": ["a", "b"], "guidelines": "g"}"#,
            )
            .on(
                "case summary",
                r#"{"content": "Wage case", "case_type": "labor", "keywords": "wages", "quick_reaction_points": "p", "response_directions": "d"}"#,
            )
    }

    #[tokio::test]
    async fn test_reflect_without_legal_reference() {
        let store = Arc::new(InMemoryKnowledgeStore::new("Kim"));
        let llm = Arc::new(scripted("false"));
        let search = Arc::new(StaticLawSearch::new(vec![LawRecord::default()]));
        let agent = Agent::new(1, "Kim", CourtRole::Plaintiff, "Counsel.", llm.clone(), store.clone())
            .with_law_search(search.clone());

        let reflection = agent.reflect(&[Turn::new("Clerk", "Lee", "rules")]).await.unwrap();

        assert_eq!(reflection.legal_reflection, LegalReflection::not_needed());
        assert!(search.queries().is_empty());
        assert_eq!(reflection.experience_reflection.content, "bg");
        assert_eq!(reflection.experience_reflection.metadata.context, "lesson");
        assert_eq!(reflection.experience_reflection.metadata.focus_points, "a, b");
        assert_eq!(reflection.case_reflection.content, "Wage case");
        assert_eq!(reflection.case_reflection.metadata.case_type, "labor");

        assert_eq!(store.len(KnowledgeKind::Legal), 0);
        assert_eq!(store.len(KnowledgeKind::Experience), 1);
        assert_eq!(store.len(KnowledgeKind::Case), 1);
        // 摘要、法条判断、经验、案例
        assert_eq!(llm.call_count(), 4);

        let json = serde_json::to_value(&reflection.legal_reflection).unwrap();
        assert_eq!(json, serde_json::json!({"needed_reference": false}));
    }

    #[tokio::test]
    async fn test_malformed_experience_falls_back() {
        let store = Arc::new(InMemoryKnowledgeStore::new("Kim"));
        let llm = Arc::new(
            ScriptedLlmClient::new("fallback")
                .on("Is additional legal reference needed?", "false")
                .on("experience summary", "{\"context\": \"x\""),
        );
        let agent = Agent::new(1, "Kim", CourtRole::Plaintiff, "Counsel.", llm, store.clone());

        let (warnings, guard) = crate::observability::capture_warnings_scoped();
        let reflection = agent.reflect(&[]).await.unwrap();
        drop(guard);
        let warnings = warnings.lock().unwrap().clone();
        assert!(warnings.iter().any(|w| w.contains("Experience summary was not returned as JSON")));
        assert!(warnings.iter().any(|w| w.contains("Case summary was not returned as JSON")));

        let exp = &reflection.experience_reflection;
        assert_eq!(exp.content, "");
        assert_eq!(exp.metadata.context, "{\"context\": \"x\"");
        assert_eq!(exp.metadata.focus_points, "");
        assert_eq!(exp.metadata.guidelines, "");
        // 案例摘要也降级
        assert_eq!(reflection.case_reflection.content, "fallback");
    }

    #[tokio::test]
    async fn test_wrong_field_type_aborts() {
        let llm = Arc::new(
            ScriptedLlmClient::new("fallback")
                .on("Is additional legal reference needed?", "false")
                .on("case summary", r#"{"content": "c", "keywords": 5}"#),
        );
        let agent = Agent::new(
            1,
            "Kim",
            CourtRole::Plaintiff,
            "Counsel.",
            llm,
            Arc::new(InMemoryKnowledgeStore::new("Kim")),
        );
        let err = agent.reflect(&[]).await.unwrap_err();
        match err {
            CourtError::Validation(v) => assert_eq!(v.field, "keywords"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
