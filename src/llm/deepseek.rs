//! OpenAI 兼容平台预设：DeepSeek、智谱、Hugging Face
//!
//! - DeepSeek Base URL: https://api.deepseek.com，模型 deepseek-chat / deepseek-reasoner
//! - 智谱 Base URL: https://open.bigmodel.cn/api/paas/v4，模型如 glm-4
//! - Hugging Face 推理路由 Base URL: https://router.huggingface.co/v1，模型为 Hub 上的仓库名

use crate::llm::OpenAiClient;

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";
pub const DEEPSEEK_REASONER: &str = "deepseek-reasoner";

pub const ZHIPUAI_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";
pub const ZHIPUAI_DEFAULT_MODEL: &str = "glm-4";

pub const HUGGINGFACE_BASE_URL: &str = "https://router.huggingface.co/v1";
pub const HUGGINGFACE_DEFAULT_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";

/// 创建 DeepSeek 客户端；model 为空时用 deepseek-chat
pub fn create_deepseek_client(model: Option<&str>, api_key: &str) -> OpenAiClient {
    let model = model.filter(|m| !m.trim().is_empty()).unwrap_or(DEEPSEEK_CHAT);
    OpenAiClient::new("deepseek", Some(DEEPSEEK_BASE_URL), model, api_key)
}

/// 创建智谱客户端；model 为空时用 glm-4
pub fn create_zhipuai_client(model: Option<&str>, api_key: &str) -> OpenAiClient {
    let model = model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(ZHIPUAI_DEFAULT_MODEL);
    OpenAiClient::new("zhipuai", Some(ZHIPUAI_BASE_URL), model, api_key)
}

/// 创建 Hugging Face 客户端（chat-completion 路由）；model 为空时用 Llama-3.1-8B-Instruct
pub fn create_huggingface_client(model: Option<&str>, api_key: &str) -> OpenAiClient {
    let model = model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(HUGGINGFACE_DEFAULT_MODEL);
    OpenAiClient::new("huggingface", Some(HUGGINGFACE_BASE_URL), model, api_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deepseek_default_model() {
        let client = create_deepseek_client(None, "sk-test");
        assert_eq!(client.model(), DEEPSEEK_CHAT);
        let client = create_deepseek_client(Some(DEEPSEEK_REASONER), "sk-test");
        assert_eq!(client.model(), DEEPSEEK_REASONER);
    }

    #[test]
    fn test_zhipuai_blank_model_falls_back() {
        let client = create_zhipuai_client(Some("  "), "key");
        assert_eq!(client.model(), ZHIPUAI_DEFAULT_MODEL);
    }

    #[test]
    fn test_huggingface_model_selection() {
        let client = create_huggingface_client(None, "hf_token");
        assert_eq!(client.model(), HUGGINGFACE_DEFAULT_MODEL);
        let client = create_huggingface_client(Some("Qwen/Qwen2.5-7B-Instruct"), "hf_token");
        assert_eq!(client.model(), "Qwen/Qwen2.5-7B-Instruct");
    }
}
