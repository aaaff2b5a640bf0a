//! 法庭模拟错误类型
//!
//! - 模型输出无法解析：在 parser 内降级为字符串 / 默认字段，不会出现在这里
//! - 字段类型错误（ValidationError）：不恢复，向上传播并中止当前案例
//! - 检索失败：由 KnowledgeStore / LawSearch 内部降级为空结果
//! - LLM 调用失败：原样向上传播

use thiserror::Error;

use crate::llm::LlmError;

/// 结构化回复中某字段形状不合法（如应为字符串却是数字）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} must be a list or a string, got {found}")]
pub struct ValidationError {
    pub field: String,
    pub found: String,
}

/// 法庭模拟运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum CourtError {
    /// 凭证缺失 / 占位符、未知平台、参与者配置不完整：启动即失败
    #[error("Config error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Case data error at line {line}: {reason}")]
    CaseData { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CourtError {
    /// 是否属于启动期即可判定的配置问题
    pub fn is_config(&self) -> bool {
        matches!(self, CourtError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let err = ValidationError {
            field: "keywords".to_string(),
            found: "number".to_string(),
        };
        assert_eq!(err.to_string(), "keywords must be a list or a string, got number");

        let court: CourtError = err.into();
        assert!(matches!(court, CourtError::Validation(_)));
        assert!(!court.is_config());
    }

    #[test]
    fn test_llm_error_converts() {
        let err: CourtError = LlmError::RateLimited {
            provider: "openai".to_string(),
            retry_after_ms: 1000,
        }
        .into();
        assert!(err.to_string().contains("retry after 1000ms"));
    }
}
