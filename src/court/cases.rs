//! 案例数据：JSONL，每行一个案例

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::CourtError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub plaintiff_statement: String,
    pub defendant_statement: String,
    /// 其它字段原样保留
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CaseRecord {
    pub fn new(plaintiff_statement: impl Into<String>, defendant_statement: impl Into<String>) -> Self {
        Self {
            plaintiff_statement: plaintiff_statement.into(),
            defendant_statement: defendant_statement.into(),
            extra: Map::new(),
        }
    }
}

/// 解析 JSONL 文本；空行跳过，行号从 1 开始
pub fn parse_cases(data: &str) -> Result<Vec<CaseRecord>, CourtError> {
    data.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<CaseRecord>(line).map_err(|e| CourtError::CaseData {
                line: i + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// 读取案例文件；limit 为 Some(n) 时只取前 n 个
pub fn load_cases(path: impl AsRef<Path>, limit: Option<usize>) -> Result<Vec<CaseRecord>, CourtError> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)?;
    let mut cases = parse_cases(&data)?;
    if let Some(n) = limit {
        cases.truncate(n);
    }
    tracing::info!(path = %path.display(), count = cases.len(), "Loaded cases");
    Ok(cases)
}
