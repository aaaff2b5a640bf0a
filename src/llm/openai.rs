//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；OpenAI、DeepSeek、智谱均走这里。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::llm::{ChatRole, GenerationOptions, LlmClient, LlmError, Message};

/// Token 使用统计（累计值）
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: Arc<AtomicU64>,
    pub completion_tokens: Arc<AtomicU64>,
    pub total_tokens: Arc<AtomicU64>,
}

impl TokenUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, prompt: u64, completion: u64) {
        self.prompt_tokens.fetch_add(prompt, Ordering::Relaxed);
        self.completion_tokens.fetch_add(completion, Ordering::Relaxed);
        self.total_tokens.fetch_add(prompt + completion, Ordering::Relaxed);
    }

    pub fn get(&self) -> (u64, u64, u64) {
        (
            self.prompt_tokens.load(Ordering::Relaxed),
            self.completion_tokens.load(Ordering::Relaxed),
            self.total_tokens.load(Ordering::Relaxed),
        )
    }
}

/// OpenAI 兼容客户端：持有 Client、model 名与平台名（用于错误信息）
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    provider: String,
    /// 累计 token 使用统计
    pub usage: TokenUsage,
}

impl OpenAiClient {
    /// api_key 由调用方校验（见 core::builder），这里不再回退环境变量或占位符
    pub fn new(provider: &str, base_url: Option<&str>, model: &str, api_key: &str) -> Self {
        let config = if let Some(url) = base_url {
            OpenAIConfig::new().with_api_base(url).with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            provider: provider.to_string(),
            usage: TokenUsage::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_openai_messages(
        &self,
        messages: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
        messages
            .iter()
            .map(|m| {
                Ok(match m.role {
                    ChatRole::System => ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessageArgs::default()
                            .content(m.content.clone())
                            .build()?,
                    ),
                    ChatRole::User => ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessageArgs::default()
                            .content(m.content.clone())
                            .build()?,
                    ),
                    ChatRole::Assistant => ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessageArgs::default()
                            .content(m.content.clone())
                            .build()?,
                    ),
                })
            })
            .collect()
    }
}

/// 将 async_openai 的错误归类为 LlmError
fn map_openai_error(provider: &str, err: OpenAIError) -> LlmError {
    match err {
        OpenAIError::ApiError(api) => classify_api_message(provider, &api.message),
        other => LlmError::provider(provider, None, other.to_string()),
    }
}

fn classify_api_message(provider: &str, message: &str) -> LlmError {
    let lower = message.to_lowercase();
    if lower.contains("rate limit") || lower.contains("rate_limit") || lower.contains("429") {
        LlmError::RateLimited {
            provider: provider.to_string(),
            retry_after_ms: 0,
        }
    } else if lower.contains("api key")
        || lower.contains("authentication")
        || lower.contains("unauthorized")
        || lower.contains("401")
    {
        LlmError::Authentication {
            provider: provider.to_string(),
            reason: message.to_string(),
        }
    } else {
        LlmError::provider(provider, None, message)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn token_usage(&self) -> (u64, u64, u64) {
        self.usage.get()
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let provider = self.provider.as_str();
        let openai_messages = self
            .to_openai_messages(messages)
            .map_err(|e| map_openai_error(provider, e))?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(openai_messages);
        if let Some(t) = options.temperature {
            args.temperature(t);
        }
        if let Some(p) = options.top_p {
            args.top_p(p);
        }
        if let Some(n) = options.max_tokens {
            args.max_completion_tokens(n);
        }
        let request = args.build().map_err(|e| map_openai_error(provider, e))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| map_openai_error(provider, e))?;

        // 提取 token 使用统计
        if let Some(usage) = &response.usage {
            self.usage
                .add(usage.prompt_tokens as u64, usage.completion_tokens as u64);
        }

        let choice = response.choices.first().ok_or_else(|| {
            LlmError::provider(provider, Some(200), "response contained no choices")
        })?;

        Ok(choice.message.content.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit() {
        let err = classify_api_message("openai", "Rate limit reached for gpt-4o");
        assert!(matches!(err, LlmError::RateLimited { retry_after_ms: 0, .. }));
    }

    #[test]
    fn test_classify_auth() {
        let err = classify_api_message("openai", "Incorrect API key provided: sk-xxx");
        assert!(matches!(err, LlmError::Authentication { .. }));
    }

    #[test]
    fn test_classify_other() {
        let err = classify_api_message("deepseek", "model overloaded");
        assert!(matches!(err, LlmError::Provider { status: None, .. }));
    }

    #[test]
    fn test_token_usage_accumulates() {
        let usage = TokenUsage::new();
        usage.add(10, 5);
        usage.add(1, 1);
        assert_eq!(usage.get(), (11, 6, 17));
    }
}
