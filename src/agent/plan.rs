//! 计划阶段：决定检索哪些知识并生成检索语句

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::agent::prompts::{query_prompt, PLAN_PROMPT};
use crate::agent::Agent;
use crate::court::{format_history, Turn};
use crate::knowledge::KnowledgeKind;
use crate::llm::LlmError;
use crate::parser::{extract_structured, Extracted};

/// 本次发言需要哪些知识
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetrievalPlan {
    pub experience: bool,
    pub case: bool,
    pub legal: bool,
}

fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

impl RetrievalPlan {
    /// 从模型回复中读取三个开关；无法解析时全部为 false
    pub fn from_extracted(data: &Extracted) -> Self {
        match data.as_object() {
            Some(map) => Self {
                experience: flag(map.get("experience")),
                case: flag(map.get("case")),
                legal: flag(map.get("legal")),
            },
            None => Self::default(),
        }
    }

    pub fn wants(&self, kind: KnowledgeKind) -> bool {
        match kind {
            KnowledgeKind::Experience => self.experience,
            KnowledgeKind::Case => self.case,
            KnowledgeKind::Legal => self.legal,
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = KnowledgeKind> + '_ {
        KnowledgeKind::ALL.into_iter().filter(|k| self.wants(*k))
    }
}

/// 类别 -> 检索语句；只包含计划中为 true 的类别
pub type QuerySet = BTreeMap<KnowledgeKind, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentPlan {
    pub plans: RetrievalPlan,
    pub queries: QuerySet,
}

impl Agent {
    /// LLM 调用次数 = 1 + 计划中 true 的个数；不写知识库
    pub async fn plan(&self, history: &[Turn]) -> Result<AgentPlan, LlmError> {
        let history_context = format_history(history);

        let plans = self.decide_retrieval(&history_context).await?;
        self.think("plans", &plans);

        let mut queries = QuerySet::new();
        for kind in plans.kinds() {
            let query = self.prepare_query(kind, &history_context).await?;
            queries.insert(kind, query);
        }
        self.think("queries", &queries);

        Ok(AgentPlan { plans, queries })
    }

    async fn decide_retrieval(&self, history_context: &str) -> Result<RetrievalPlan, LlmError> {
        let prompt = format!("{}\n\n{}", PLAN_PROMPT, history_context);
        let reply = self.ask(&self.instruction(), &prompt).await?;
        Ok(RetrievalPlan::from_extracted(&extract_structured(&reply)))
    }

    /// 为某类知识生成检索语句；回复不是 JSON 时直接用原文
    pub async fn prepare_query(
        &self,
        kind: KnowledgeKind,
        history_context: &str,
    ) -> Result<String, LlmError> {
        let prompt = format!("{}\n\n{}", query_prompt(kind), history_context);
        let reply = self.ask(&self.instruction(), &prompt).await?;
        Ok(extract_structured(&reply).into_query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::court::CourtRole;
    use crate::knowledge::InMemoryKnowledgeStore;
    use crate::llm::ScriptedLlmClient;

    fn agent(llm: Arc<ScriptedLlmClient>) -> Agent {
        Agent::new(
            2,
            "Lee",
            CourtRole::Defendant,
            "Defense counsel.",
            llm,
            Arc::new(InMemoryKnowledgeStore::new("Lee")),
        )
    }

    #[test]
    fn test_plan_coercion() {
        let plan = RetrievalPlan::from_extracted(&extract_structured(
            r#"{"experience": "TRUE", "case": "no", "legal": 1}"#,
        ));
        assert_eq!(
            plan,
            RetrievalPlan {
                experience: true,
                case: false,
                legal: true
            }
        );
        let plan = RetrievalPlan::from_extracted(&extract_structured(
            r#"{"experience": 0, "case": 0.5, "legal": null}"#,
        ));
        assert_eq!(
            plan,
            RetrievalPlan {
                experience: false,
                case: true,
                legal: false
            }
        );
        assert_eq!(
            RetrievalPlan::from_extracted(&extract_structured("I think we need cases")),
            RetrievalPlan::default()
        );
    }

    #[test]
    fn test_kinds_in_order() {
        let plan = RetrievalPlan {
            experience: true,
            case: false,
            legal: true,
        };
        let kinds: Vec<_> = plan.kinds().collect();
        assert_eq!(kinds, vec![KnowledgeKind::Experience, KnowledgeKind::Legal]);
    }

    #[tokio::test]
    async fn test_all_false_makes_one_call() {
        let llm = Arc::new(ScriptedLlmClient::new("unused").push_reply(
            r#"{"experience": false, "case": false, "legal": false}"#,
        ));
        let plan = agent(llm.clone()).plan(&[]).await.unwrap();
        assert!(plan.queries.is_empty());
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_plan_defaults_to_no_retrieval() {
        let llm = Arc::new(ScriptedLlmClient::new("Sure, let me think about it."));
        let plan = agent(llm.clone()).plan(&[]).await.unwrap();
        assert_eq!(plan.plans, RetrievalPlan::default());
        assert!(plan.queries.is_empty());
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_one_query_per_true_flag() {
        let llm = Arc::new(
            ScriptedLlmClient::new("unused")
                .push_reply(r#"{"experience": false, "case": true, "legal": true}"#)
                .push_reply(r#"{"query": "wage arrears precedent"}"#)
                .push_reply("labor law overtime article"),
        );
        let history = vec![Turn::new("Presiding Judge", "Park", "State your case.")];
        let plan = agent(llm.clone()).plan(&history).await.unwrap();

        assert_eq!(plan.queries.len(), 2);
        assert_eq!(plan.queries[&KnowledgeKind::Case], "wage arrears precedent");
        assert_eq!(plan.queries[&KnowledgeKind::Legal], "labor law overtime article");
        assert_eq!(llm.call_count(), 3);

        let calls = llm.calls();
        assert!(calls[0].prompt.contains("Presiding Judge (Park):\n  State your case."));
        assert!(calls[0].instruction.starts_with("You are a defendant. Defense counsel."));
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let llm = Arc::new(
            ScriptedLlmClient::new("x").push_error(LlmError::provider("mock", Some(502), "bad gateway")),
        );
        let err = agent(llm).plan(&[]).await.unwrap_err();
        assert!(matches!(err, LlmError::Provider { status: Some(502), .. }));
    }
}
