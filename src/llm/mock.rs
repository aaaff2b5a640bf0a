//! Mock / 脚本化 LLM 客户端（用于离线试跑与测试，无需 API）
//!
//! - MockLlmClient：回显最后一条 user 消息的开头，所有结构化解析都会走降级路径
//! - ScriptedLlmClient：按顺序返回预置回复，或按提示中的关键字匹配规则；记录每次调用

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::llm::{split_system, ChatRole, GenerationOptions, LlmClient, LlmError, Message};

/// Mock 客户端：回显 user 消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        messages: &[Message],
        _options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.trim())
            .unwrap_or("(no input)");
        let preview: String = last_user.chars().take(120).collect();
        Ok(format!("Echo from Mock: {}", preview))
    }
}

/// 一次被记录的调用
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub instruction: String,
    pub prompt: String,
    pub messages: Vec<Message>,
}

/// 脚本化客户端：队列优先，其次关键字规则，最后默认回复
#[derive(Debug)]
pub struct ScriptedLlmClient {
    queue: Mutex<VecDeque<Result<String, LlmError>>>,
    rules: Vec<(String, String)>,
    default_reply: String,
    calls: Mutex<Vec<RecordedCall>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl ScriptedLlmClient {
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            rules: Vec::new(),
            default_reply: default_reply.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 追加一条按顺序消费的回复
    pub fn push_reply(self, reply: impl Into<String>) -> Self {
        lock(&self.queue).push_back(Ok(reply.into()));
        self
    }

    /// 追加一条按顺序消费的错误
    pub fn push_error(self, err: LlmError) -> Self {
        lock(&self.queue).push_back(Err(err));
        self
    }

    /// 提示或指令中包含 needle 时返回 reply（按注册顺序匹配第一条）
    pub fn on(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into(), reply.into()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(
        &self,
        messages: &[Message],
        _options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let (system, rest) = split_system(messages);
        let instruction = system.unwrap_or_default().to_string();
        let prompt = rest
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        lock(&self.calls).push(RecordedCall {
            instruction: instruction.clone(),
            prompt: prompt.clone(),
            messages: messages.to_vec(),
        });

        if let Some(next) = lock(&self.queue).pop_front() {
            return next;
        }

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()) || instruction.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_user() {
        let out = MockLlmClient
            .generate(Some("sys"), "Hello court", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(out, "Echo from Mock: Hello court");
    }

    #[tokio::test]
    async fn test_scripted_queue_then_rules_then_default() {
        let llm = ScriptedLlmClient::new("default")
            .push_reply("first")
            .on("verdict", "guilty");
        let opts = GenerationOptions::default();

        assert_eq!(llm.generate(None, "anything", &opts).await.unwrap(), "first");
        assert_eq!(llm.generate(None, "the verdict?", &opts).await.unwrap(), "guilty");
        assert_eq!(llm.generate(None, "other", &opts).await.unwrap(), "default");
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let llm = ScriptedLlmClient::new("x").push_error(LlmError::provider("mock", Some(500), "boom"));
        let err = llm
            .generate(None, "p", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Provider { status: Some(500), .. }));
    }
}
