//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / 文心 / Mock）实现 LlmClient::complete；
//! Agent 只通过 generate(instruction, prompt, options) 调用，失败时原样返回 LlmError，不做空串替代。

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::llm::Message;

/// 未提供 system 指令时使用的默认指令
pub const DEFAULT_INSTRUCTION: &str = "You are a helpful assistant.";

/// LLM 调用错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    /// 凭证缺失、占位符或被服务端拒绝
    #[error("Authentication failed for {provider}: {reason}")]
    Authentication { provider: String, reason: String },

    /// 非 2xx 或响应格式不符合预期
    #[error("Request to {provider} failed (status {status:?}): {message}")]
    Provider {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// 服务端限流；retry_after_ms 为服务端建议的等待时间（未知时为 0）
    #[error("Rate limited by {provider}, retry after {retry_after_ms}ms")]
    RateLimited { provider: String, retry_after_ms: u64 },
}

impl LlmError {
    pub fn provider(provider: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        LlmError::Provider {
            provider: provider.to_string(),
            status,
            message: message.into(),
        }
    }
}

/// 生成参数；未设置的字段交给后端默认值
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, LlmError>;

    /// system 指令 + user 提示 -> 生成文本
    async fn generate(
        &self,
        instruction: Option<&str>,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let messages = vec![
            Message::system(instruction.unwrap_or(DEFAULT_INSTRUCTION)),
            Message::user(prompt),
        ];
        self.complete(&messages, options).await
    }

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatRole, ScriptedLlmClient};

    #[tokio::test]
    async fn test_generate_defaults_instruction() {
        let llm = ScriptedLlmClient::new("ok");
        let out = llm
            .generate(None, "hello", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(out, "ok");

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].instruction, DEFAULT_INSTRUCTION);
        assert_eq!(calls[0].prompt, "hello");
    }

    #[tokio::test]
    async fn test_generate_builds_system_then_user() {
        let llm = ScriptedLlmClient::new("ok");
        llm.generate(Some("You are a judge."), "decide", &GenerationOptions::default())
            .await
            .unwrap();
        let calls = llm.calls();
        assert_eq!(calls[0].messages[0].role, ChatRole::System);
        assert_eq!(calls[0].messages[1].role, ChatRole::User);
    }
}
