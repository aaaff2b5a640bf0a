//! 从配置构建 LLM 客户端与庭审模拟
//!
//! 凭证校验在这里完成：缺失或仍为占位符时直接返回 Config 错误，不会跑任何案例。

use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::Agent;
use crate::config::{AppConfig, ParticipantConfig};
use crate::core::{CourtError, CourtSimulation};
use crate::court::{CourtRole, FileCheckpoint, JsonCaseLog, RandomRounds};
use crate::knowledge::{
    DeliLawSearch, InMemoryKnowledgeStore, JsonFileKnowledgeStore, KnowledgeStore, LawSearch,
};
use crate::llm::{
    create_deepseek_client, create_huggingface_client, create_zhipuai_client, LlmClient, MockLlmClient, OpenAiClient,
    RetryingLlmClient, WenxinClient,
};

const KEY_PLACEHOLDERS: [&str; 3] = ["", "put your api_key here", "your_api_key"];
const SECRET_PLACEHOLDERS: [&str; 3] = ["", "put your api_secret here", "your_api_secret"];

fn is_placeholder(value: &str, placeholders: &[&str]) -> bool {
    let trimmed = value.trim();
    placeholders.iter().any(|p| trimmed.eq_ignore_ascii_case(p))
}

/// 环境变量查找；测试中替换掉进程环境
type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// 一项凭证的来源：配置字段、对应的占位符表与回退的环境变量
struct CredentialSource<'a> {
    field: &'a str,
    configured: Option<&'a str>,
    placeholders: &'a [&'a str],
    env_key: &'a str,
}

/// 校验凭证：配置值缺失或为占位符时回退到环境变量；两者都不可用为 Config 错误
fn credential(
    provider: &str,
    source: CredentialSource<'_>,
    env: EnvLookup<'_>,
) -> Result<String, CourtError> {
    let usable = |v: &str| !is_placeholder(v, source.placeholders);
    source
        .configured
        .filter(|v| usable(*v))
        .map(str::to_string)
        .or_else(|| env(source.env_key).filter(|v| usable(v.as_str())))
        .map(|v| v.trim().to_string())
        .ok_or_else(|| {
            CourtError::Config(format!(
                "{} for provider '{}' is missing or still a placeholder (set llm.{} or {})",
                source.field, provider, source.field, source.env_key
            ))
        })
}

fn api_key<'a>(configured: Option<&'a str>, env_key: &'a str) -> CredentialSource<'a> {
    CredentialSource {
        field: "api_key",
        configured,
        placeholders: &KEY_PLACEHOLDERS,
        env_key,
    }
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s).filter(|s| !s.trim().is_empty())
}

/// 根据 [llm] 段创建客户端；除 mock 外都包一层限流重试
pub fn create_llm_from_config(cfg: &AppConfig) -> Result<Arc<dyn LlmClient>, CourtError> {
    create_llm_with_env(cfg, &|key| std::env::var(key).ok())
}

fn create_llm_with_env(
    cfg: &AppConfig,
    env: EnvLookup<'_>,
) -> Result<Arc<dyn LlmClient>, CourtError> {
    let llm = &cfg.llm;
    let provider = llm.provider.trim().to_lowercase();
    let configured_key = llm.api_key.as_deref();

    let client: Arc<dyn LlmClient> = match provider.as_str() {
        "mock" => {
            tracing::warn!("Using Mock LLM, replies are echoes");
            return Ok(Arc::new(MockLlmClient));
        }
        "openai" => {
            let key = credential(&provider, api_key(configured_key, "OPENAI_API_KEY"), env)?;
            let model = non_empty(&llm.model).unwrap_or("gpt-4o-mini");
            tracing::info!("Using OpenAI LLM ({})", model);
            Arc::new(OpenAiClient::new("openai", llm.base_url.as_deref(), model, &key))
        }
        "deepseek" => {
            let key = credential(&provider, api_key(configured_key, "DEEPSEEK_API_KEY"), env)?;
            tracing::info!("Using DeepSeek LLM ({})", llm.model);
            Arc::new(create_deepseek_client(non_empty(&llm.model), &key))
        }
        "zhipuai" => {
            let key = credential(&provider, api_key(configured_key, "ZHIPUAI_API_KEY"), env)?;
            tracing::info!("Using ZhipuAI LLM ({})", llm.model);
            Arc::new(create_zhipuai_client(non_empty(&llm.model), &key))
        }
        "huggingface" => {
            let key = credential(&provider, api_key(configured_key, "HUGGINGFACE_API_KEY"), env)?;
            tracing::info!("Using Hugging Face LLM ({})", llm.model);
            Arc::new(create_huggingface_client(non_empty(&llm.model), &key))
        }
        "wenxin" => {
            let key = credential(&provider, api_key(configured_key, "WENXIN_API_KEY"), env)?;
            let secret = credential(
                &provider,
                CredentialSource {
                    field: "api_secret",
                    configured: llm.api_secret.as_deref(),
                    placeholders: &SECRET_PLACEHOLDERS,
                    env_key: "WENXIN_SECRET_KEY",
                },
                env,
            )?;
            tracing::info!("Using Wenxin LLM ({})", llm.model);
            Arc::new(WenxinClient::new(&key, &secret, &llm.model, llm.timeout_secs)?)
        }
        other => {
            return Err(CourtError::Config(format!(
                "Unsupported LLM provider: '{}'",
                other
            )))
        }
    };

    Ok(Arc::new(RetryingLlmClient::new(client, llm.retry.clone())))
}

/// [court] 段的结构检查
pub fn validate_court(cfg: &AppConfig) -> Result<(), CourtError> {
    let court = &cfg.court;
    if court.lawyers.len() != 2 {
        return Err(CourtError::Config(format!(
            "court.lawyers must list exactly two lawyers, got {}",
            court.lawyers.len()
        )));
    }
    if court.min_debate_rounds == 0 || court.min_debate_rounds > court.max_debate_rounds {
        return Err(CourtError::Config(format!(
            "invalid debate rounds: min {} max {}",
            court.min_debate_rounds, court.max_debate_rounds
        )));
    }
    let mut names: Vec<&str> = court.lawyers.iter().map(|l| l.name.as_str()).collect();
    names.push(court.judge.name.as_str());
    names.sort_unstable();
    if names.windows(2).any(|w| w[0] == w[1]) {
        return Err(CourtError::Config(
            "participant names must be unique (they key the knowledge stores)".to_string(),
        ));
    }
    Ok(())
}

/// 庭审模拟构建器：LLM、法条检索与知识库可替换，其余取自配置
pub struct SimulationBuilder {
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
    law_search: Option<Arc<dyn LawSearch>>,
    in_memory_stores: bool,
}

impl SimulationBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            llm: None,
            law_search: None,
            in_memory_stores: false,
        }
    }

    /// 不设置时按 [llm] 段创建
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_law_search(mut self, law_search: Arc<dyn LawSearch>) -> Self {
        self.law_search = Some(law_search);
        self
    }

    /// 知识库只放内存，不落盘
    pub fn with_in_memory_stores(mut self, enable: bool) -> Self {
        self.in_memory_stores = enable;
        self
    }

    fn store_for(&self, name: &str) -> Arc<dyn KnowledgeStore> {
        if self.in_memory_stores {
            Arc::new(InMemoryKnowledgeStore::new(name))
        } else {
            Arc::new(JsonFileKnowledgeStore::open(&self.config.app.store_root, name))
        }
    }

    fn agent(
        &self,
        participant: &ParticipantConfig,
        default_role: CourtRole,
        llm: &Arc<dyn LlmClient>,
        law_search: &Arc<dyn LawSearch>,
    ) -> Agent {
        Agent::new(
            participant.id,
            participant.name.clone(),
            participant.role.unwrap_or(default_role),
            participant.description.clone(),
            llm.clone(),
            self.store_for(&participant.name),
        )
        .with_law_search(law_search.clone())
        .with_options(self.config.llm.generation.clone())
        .with_log_think(self.config.app.log_think)
    }

    pub fn build(self) -> Result<CourtSimulation, CourtError> {
        validate_court(&self.config)?;

        let llm = match &self.llm {
            Some(llm) => llm.clone(),
            None => create_llm_from_config(&self.config)?,
        };
        let law_search: Arc<dyn LawSearch> = match &self.law_search {
            Some(search) => search.clone(),
            None => {
                let section = &self.config.law_search;
                Arc::new(DeliLawSearch::new(
                    section.base_url.as_deref(),
                    section.service_key.as_deref(),
                    section.timeout_secs,
                ))
            }
        };

        let court = &self.config.court;
        let judge = self.agent(&court.judge, CourtRole::Judge, &llm, &law_search);
        let lawyers = court
            .lawyers
            .iter()
            .map(|l| self.agent(l, CourtRole::Plaintiff, &llm, &law_search))
            .collect();

        let app = &self.config.app;
        let checkpoint_path: PathBuf = app.checkpoint_path.clone();
        CourtSimulation::new(judge, lawyers, court.stenographer.clone())?
            .with_script(court.script.clone())
            .with_round_range(court.min_debate_rounds, court.max_debate_rounds)
            .map(|sim| {
                sim.with_round_picker(Box::new(RandomRounds::new()))
                    .with_checkpoint(Arc::new(FileCheckpoint::new(checkpoint_path)))
                    .with_case_log(Arc::new(JsonCaseLog::new(&app.log_dir)))
            })
    }
}
