//! 百度文心（ERNIE）客户端
//!
//! 先用 api_key / api_secret 换取 access_token，再调用对应模型的 chat 端点；
//! system 指令单独放在请求体的 system 字段。429 映射为 RateLimited，交给 RetryingLlmClient 处理。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::core::CourtError;
use crate::llm::{split_system, ChatRole, GenerationOptions, LlmClient, LlmError, Message};

const PROVIDER: &str = "wenxin";
const TOKEN_URL: &str = "https://aip.baidubce.com/oauth/2.0/token";
const CHAT_BASE_URL: &str = "https://aip.baidubce.com/rpc/2.0/ai_custom/v1/wenxinworkshop/chat";

/// 配额耗尽时建议等待的时间
const QUOTA_EXHAUSTED_WAIT_MS: u64 = 60_000;

/// 模型名 -> chat 端点
pub fn endpoint_for(model: &str) -> Option<&'static str> {
    match model {
        "ERNIE-4.0-8K" => Some("completions_pro"),
        "ERNIE-Speed-128K" => Some("ernie-speed-128k"),
        "ERNIE-3.5-8K" => Some("completions"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatReply {
    error_code: Option<i64>,
    error_msg: Option<String>,
    result: Option<String>,
    is_truncated: bool,
}

/// 文心客户端
pub struct WenxinClient {
    client: Client,
    api_key: String,
    api_secret: String,
    model: String,
    endpoint: &'static str,
}

impl WenxinClient {
    pub fn new(
        api_key: &str,
        api_secret: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, CourtError> {
        let endpoint = endpoint_for(model)
            .ok_or_else(|| CourtError::Config(format!("Unsupported Wenxin model: {}", model)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            model: model.to_string(),
            endpoint,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn access_token(&self) -> Result<String, LlmError> {
        let resp = self
            .client
            .post(TOKEN_URL)
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.api_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LlmError::provider(PROVIDER, None, format!("token request failed: {}", e)))?;

        let status = resp.status();
        let reply: TokenReply = resp.json().await.map_err(|e| {
            LlmError::provider(PROVIDER, Some(status.as_u16()), format!("token reply: {}", e))
        })?;

        match reply.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(LlmError::Authentication {
                provider: PROVIDER.to_string(),
                reason: format!(
                    "{}: {}",
                    reply.error.unwrap_or_default(),
                    reply.error_description.unwrap_or_default()
                ),
            }),
        }
    }
}

/// 429 时根据剩余额度头判断建议等待时间
fn rate_limit_delay(headers: &HeaderMap) -> u64 {
    let remaining = |name: &str| -> i64 {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    };
    if remaining("X-Ratelimit-Remaining-Requests") == 0
        || remaining("X-Ratelimit-Remaining-Tokens") == 0
    {
        QUOTA_EXHAUSTED_WAIT_MS
    } else {
        0
    }
}

/// 解析 chat 回复：error_code 非 0 为错误；缺少 result 时返回空串
fn interpret_reply(reply: ChatReply) -> Result<String, LlmError> {
    if let Some(code) = reply.error_code.filter(|c| *c != 0) {
        return Err(LlmError::provider(
            PROVIDER,
            Some(200),
            format!("error {}: {}", code, reply.error_msg.unwrap_or_default()),
        ));
    }
    if reply.is_truncated {
        tracing::warn!("Wenxin output was truncated");
    }
    match reply.result {
        Some(result) => Ok(result),
        None => {
            tracing::warn!("Wenxin reply has no result field");
            Ok(String::new())
        }
    }
}

#[async_trait]
impl LlmClient for WenxinClient {
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let token = self.access_token().await?;
        let (system, rest) = split_system(messages);

        let chat: Vec<_> = rest
            .iter()
            .map(|m| {
                json!({
                    "role": if m.role == ChatRole::Assistant { "assistant" } else { "user" },
                    "content": m.content,
                })
            })
            .collect();

        let mut payload = json!({
            "messages": chat,
            "temperature": options.temperature.unwrap_or(0.8),
            "top_p": options.top_p.unwrap_or(0.8),
            "penalty_score": 1.0,
            "stream": false,
        });
        if let Some(system) = system {
            payload["system"] = json!(system);
        }
        if let Some(max) = options.max_tokens {
            payload["max_output_tokens"] = json!(max);
        }

        let url = format!("{}/{}", CHAT_BASE_URL, self.endpoint);
        let resp = self
            .client
            .post(&url)
            .query(&[("access_token", token.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::provider(PROVIDER, None, format!("request failed: {}", e)))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited {
                provider: PROVIDER.to_string(),
                retry_after_ms: rate_limit_delay(resp.headers()),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::provider(PROVIDER, Some(status.as_u16()), body));
        }

        let reply: ChatReply = resp.json().await.map_err(|e| {
            LlmError::provider(PROVIDER, Some(status.as_u16()), format!("malformed reply: {}", e))
        })?;
        tracing::debug!(model = %self.model, "Wenxin reply received");
        interpret_reply(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_endpoint_mapping() {
        assert_eq!(endpoint_for("ERNIE-4.0-8K"), Some("completions_pro"));
        assert_eq!(endpoint_for("ERNIE-Speed-128K"), Some("ernie-speed-128k"));
        assert_eq!(endpoint_for("ERNIE-3.5-8K"), Some("completions"));
        assert_eq!(endpoint_for("gpt-4"), None);
    }

    #[test]
    fn test_unknown_model_is_config_error() {
        let err = WenxinClient::new("k", "s", "ERNIE-Bot", 5).err().unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn test_rate_limit_delay() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Ratelimit-Remaining-Requests", HeaderValue::from_static("3"));
        headers.insert("X-Ratelimit-Remaining-Tokens", HeaderValue::from_static("100"));
        assert_eq!(rate_limit_delay(&headers), 0);

        headers.insert("X-Ratelimit-Remaining-Tokens", HeaderValue::from_static("0"));
        assert_eq!(rate_limit_delay(&headers), QUOTA_EXHAUSTED_WAIT_MS);

        // 缺少头时按额度耗尽处理
        assert_eq!(rate_limit_delay(&HeaderMap::new()), QUOTA_EXHAUSTED_WAIT_MS);
    }

    #[test]
    fn test_interpret_reply() {
        let ok = ChatReply {
            result: Some("judgment".to_string()),
            ..Default::default()
        };
        assert_eq!(interpret_reply(ok).unwrap(), "judgment");

        let missing = ChatReply::default();
        assert_eq!(interpret_reply(missing).unwrap(), "");

        let failed = ChatReply {
            error_code: Some(336003),
            error_msg: Some("invalid argument".to_string()),
            ..Default::default()
        };
        assert!(matches!(interpret_reply(failed), Err(LlmError::Provider { .. })));

        let zero_code = ChatReply {
            error_code: Some(0),
            result: Some("fine".to_string()),
            ..Default::default()
        };
        assert_eq!(interpret_reply(zero_code).unwrap(), "fine");
    }
}
