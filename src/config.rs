//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `COURT__*` 覆盖（双下划线表示嵌套，如 `COURT__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::court::{CourtRole, CourtScript};
use crate::llm::{GenerationOptions, RetryConfig};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub court: CourtSection,
    #[serde(default)]
    pub law_search: LawSearchSection,
}

/// [app] 段：案例文件、输出目录、断点文件、知识库根目录
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// 案例数据（JSONL，每行一个案例）
    pub case_file: PathBuf,
    /// 只跑前 N 个案例；未设置时跑全部
    pub case_limit: Option<usize>,
    /// 庭审记录输出目录
    pub log_dir: PathBuf,
    /// 断点文件（{"current_case_index": n}）
    pub checkpoint_path: PathBuf,
    /// 各 Agent 知识库的根目录（按 Agent 名分子目录）
    pub store_root: PathBuf,
    /// 是否以 info 级别输出 Agent 的思考过程（计划、检索、反思）
    pub log_think: bool,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            case_file: PathBuf::from("data/sample.jsonl"),
            case_limit: None,
            log_dir: PathBuf::from("test_result"),
            checkpoint_path: PathBuf::from("progress.json"),
            store_root: PathBuf::from("knowledge"),
            log_think: false,
        }
    }
}

/// [llm] 段：后端选择、凭证、生成参数与重试策略
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai / deepseek / zhipuai / huggingface / wenxin / mock
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// 仅 wenxin 需要
    pub api_secret: Option<String>,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    #[serde(default)]
    pub generation: GenerationOptions,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "deepseek".to_string(),
            model: "deepseek-chat".to_string(),
            base_url: None,
            api_key: None,
            api_secret: None,
            timeout_secs: 60,
            generation: GenerationOptions::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// 单个参与者（法官 / 律师）的配置
#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantConfig {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// 法官默认 judge；律师的角色每个案例重新分配，这里的值只作初始值
    #[serde(default)]
    pub role: Option<CourtRole>,
}

/// 书记员：只宣读法庭纪律，不调用模型
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StenographerConfig {
    pub name: String,
    pub court_rules: String,
}

impl Default for StenographerConfig {
    fn default() -> Self {
        Self {
            name: "Clerk".to_string(),
            court_rules: "All rise. Participants shall speak only when recognized by the court, \
                          refrain from interrupting, and keep order in the courtroom."
                .to_string(),
        }
    }
}

/// [court] 段：参与者、辩论轮数区间与庭审脚本
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CourtSection {
    pub min_debate_rounds: usize,
    pub max_debate_rounds: usize,
    pub judge: ParticipantConfig,
    pub lawyers: Vec<ParticipantConfig>,
    pub stenographer: StenographerConfig,
    pub script: CourtScript,
}

impl Default for CourtSection {
    fn default() -> Self {
        Self {
            min_debate_rounds: 3,
            max_debate_rounds: 5,
            judge: ParticipantConfig {
                id: 0,
                name: "Judge".to_string(),
                description: "You preside over civil trials impartially and decide strictly on the facts and the law."
                    .to_string(),
                role: Some(CourtRole::Judge),
            },
            lawyers: vec![
                ParticipantConfig {
                    id: 1,
                    name: "Lawyer A".to_string(),
                    description: "You are an experienced litigator who argues precisely and cites the law."
                        .to_string(),
                    role: None,
                },
                ParticipantConfig {
                    id: 2,
                    name: "Lawyer B".to_string(),
                    description: "You are an experienced litigator who argues precisely and cites the law."
                        .to_string(),
                    role: None,
                },
            ],
            stenographer: StenographerConfig::default(),
            script: CourtScript::default(),
        }
    }
}

/// [law_search] 段：外部法条检索服务；未配置时回退到 DELI_BASE_URL / DELI_SERVICE_KEY
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LawSearchSection {
    pub base_url: Option<String>,
    pub service_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LawSearchSection {
    fn default() -> Self {
        Self {
            base_url: None,
            service_key: None,
            timeout_secs: 10,
        }
    }
}

/// 从 config 目录加载配置，环境变量 COURT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 COURT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        } else {
            tracing::warn!("Config file {:?} not found, ignoring", path);
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("COURT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.court.min_debate_rounds, 3);
        assert_eq!(cfg.court.max_debate_rounds, 5);
        assert_eq!(cfg.court.lawyers.len(), 2);
        assert_eq!(cfg.court.judge.role, Some(CourtRole::Judge));
        assert_eq!(cfg.app.checkpoint_path, PathBuf::from("progress.json"));
        assert_eq!(cfg.law_search.timeout_secs, 10);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("court.toml");
        std::fs::write(
            &path,
            r#"
[app]
case_limit = 62
log_think = true

[llm]
provider = "mock"

[llm.retry]
max_attempts = 5

[court]
min_debate_rounds = 2
max_debate_rounds = 2

[court.judge]
id = 10
name = "Judge Bao"
description = "fair"

[[court.lawyers]]
id = 11
name = "Alice"

[[court.lawyers]]
id = 12
name = "Bob"
"#,
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.app.case_limit, Some(62));
        assert!(cfg.app.log_think);
        assert_eq!(cfg.llm.provider, "mock");
        assert_eq!(cfg.llm.retry.max_attempts, 5);
        assert_eq!(cfg.court.min_debate_rounds, 2);
        assert_eq!(cfg.court.judge.name, "Judge Bao");
        assert_eq!(cfg.court.lawyers[1].name, "Bob");
    }
}
