//! LLM 层：客户端抽象与实现（OpenAI 兼容 / DeepSeek / 智谱 / 文心 / Mock）与限流重试装饰器

pub mod deepseek;
pub mod message;
pub mod mock;
pub mod openai;
pub mod retry;
pub mod traits;
pub mod wenxin;

pub use deepseek::{
    create_deepseek_client, create_huggingface_client, create_zhipuai_client, DEEPSEEK_CHAT,
    DEEPSEEK_REASONER,
};
pub use message::{split_system, ChatRole, Message};
pub use mock::{MockLlmClient, RecordedCall, ScriptedLlmClient};
pub use openai::{OpenAiClient, TokenUsage};
pub use retry::{RetryConfig, RetryingLlmClient};
pub use traits::{GenerationOptions, LlmClient, LlmError, DEFAULT_INSTRUCTION};
pub use wenxin::WenxinClient;
