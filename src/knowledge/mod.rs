//! 知识库：经验 / 案例 / 法条三类，按 Agent 名称隔离命名空间
//!
//! - **KnowledgeStore**: 检索与写入接口；查询无结果或内部失败时返回空 Vec，不报错
//! - **InMemoryKnowledgeStore**: 关键词重叠检索（jieba 分词）
//! - **JsonFileKnowledgeStore**: 内存检索 + 每次写入落盘
//! - **LawSearch**: 外部法条检索服务

pub mod entry;
pub mod file;
pub mod law;
pub mod memory;
pub mod tokenizer;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use entry::{CaseEntry, CaseMetadata, ExperienceEntry, ExperienceMetadata, LawEntry, LawMetadata};
pub use file::JsonFileKnowledgeStore;
pub use law::{parse_law_response, DeliLawSearch, LawRecord, LawSearch, NoopLawSearch, StaticLawSearch};
pub use memory::InMemoryKnowledgeStore;

/// 知识类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeKind {
    Experience,
    Case,
    Legal,
}

impl KnowledgeKind {
    pub const ALL: [KnowledgeKind; 3] = [
        KnowledgeKind::Experience,
        KnowledgeKind::Case,
        KnowledgeKind::Legal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KnowledgeKind::Experience => "experience",
            KnowledgeKind::Case => "case",
            KnowledgeKind::Legal => "legal",
        }
    }
}

impl fmt::Display for KnowledgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一条知识记录；score 仅在检索结果中有意义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub id: String,
    pub document: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing)]
    pub score: f32,
}

/// 知识库 trait（每个 Agent 一个命名空间）
pub trait KnowledgeStore: Send + Sync {
    /// 命名空间（Agent 名称）
    fn namespace(&self) -> &str;

    /// 检索最相关的 n_results 条；无匹配时返回空
    fn query(&self, kind: KnowledgeKind, query: &str, n_results: usize) -> Vec<KnowledgeRecord>;

    /// 写入一条记录；同 id 覆盖
    fn add(&self, kind: KnowledgeKind, id: &str, document: &str, metadata: BTreeMap<String, String>);

    fn query_experience(&self, query: &str, n_results: usize) -> Vec<KnowledgeRecord> {
        self.query(KnowledgeKind::Experience, query, n_results)
    }

    fn query_case(&self, query: &str, n_results: usize) -> Vec<KnowledgeRecord> {
        self.query(KnowledgeKind::Case, query, n_results)
    }

    fn query_legal(&self, query: &str, n_results: usize) -> Vec<KnowledgeRecord> {
        self.query(KnowledgeKind::Legal, query, n_results)
    }

    fn add_to_experience(&self, id: &str, document: &str, metadata: BTreeMap<String, String>) {
        self.add(KnowledgeKind::Experience, id, document, metadata)
    }

    fn add_to_case(&self, id: &str, document: &str, metadata: BTreeMap<String, String>) {
        self.add(KnowledgeKind::Case, id, document, metadata)
    }

    fn add_to_legal(&self, id: &str, document: &str, metadata: BTreeMap<String, String>) {
        self.add(KnowledgeKind::Legal, id, document, metadata)
    }
}

/// 渲染检索结果供上下文拼接：经验与案例取 metadata，法条取正文
pub fn render_records(kind: KnowledgeKind, records: &[KnowledgeRecord]) -> String {
    records
        .iter()
        .map(|r| match kind {
            KnowledgeKind::Legal => r.document.clone(),
            KnowledgeKind::Experience | KnowledgeKind::Case => {
                serde_json::to_string(&r.metadata).unwrap_or_default()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
