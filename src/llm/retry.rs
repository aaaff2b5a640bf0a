//! 限流重试装饰器
//!
//! RetryingLlmClient 包装任意 LlmClient：仅对 RateLimited 重试，等待 max(服务端建议, 指数退避)；
//! 其它错误立即返回。业务层（Agent / 法庭编排）不感知重试与 sleep。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::llm::{GenerationOptions, LlmClient, LlmError, Message};

/// 重试策略
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 总尝试次数（含首次），1 表示不重试
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

impl RetryConfig {
    /// 第 attempt 次失败后的退避时间：base * 2^(attempt-1)，不超过 max_delay_ms
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(20);
        let ms = self.base_delay_ms.saturating_mul(1u64 << exp);
        Duration::from_millis(ms.min(self.max_delay_ms))
    }
}

/// 带重试的 LLM 客户端
pub struct RetryingLlmClient {
    inner: Arc<dyn LlmClient>,
    config: RetryConfig,
}

impl RetryingLlmClient {
    pub fn new(inner: Arc<dyn LlmClient>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl LlmClient for RetryingLlmClient {
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.inner.complete(messages, options).await {
                Err(LlmError::RateLimited {
                    provider,
                    retry_after_ms,
                }) if attempt < max_attempts => {
                    let delay = Duration::from_millis(retry_after_ms)
                        .max(self.config.backoff(attempt))
                        .min(Duration::from_millis(self.config.max_delay_ms.max(retry_after_ms)));
                    tracing::warn!(
                        provider = %provider,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "LLM rate limited, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn token_usage(&self) -> (u64, u64, u64) {
        self.inner.token_usage()
    }
}
