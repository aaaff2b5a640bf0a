//! 外部法条检索
//!
//! search_law 永不报错：配置缺失、网络失败、非 JSON 或结构不符时都返回空 Vec 并记 warn。

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const BASE_URL_ENV: &str = "DELI_BASE_URL";
pub const SERVICE_KEY_ENV: &str = "DELI_SERVICE_KEY";

/// 检索服务返回的一条法条
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LawRecord {
    #[serde(rename = "lawsName")]
    pub laws_name: String,
    #[serde(rename = "articleTag")]
    pub article_tag: String,
    #[serde(rename = "articleContent")]
    pub article_content: String,
}

#[async_trait]
pub trait LawSearch: Send + Sync {
    async fn search_law(&self, query: &str) -> Vec<LawRecord>;
}

/// 解析服务响应：顶层为列表，或包在 data / results / items 中
pub fn parse_law_response(data: Value) -> Vec<LawRecord> {
    let data = match data {
        Value::Object(mut map) => ["data", "results", "items"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(Value::Array(items)),
                _ => None,
            })
            .unwrap_or(Value::Object(map)),
        other => other,
    };

    let Value::Array(items) = data else {
        tracing::warn!("Law search response had unexpected shape; expected a list of laws");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| {
            if !item.is_object() {
                return None;
            }
            match serde_json::from_value::<LawRecord>(item) {
                Ok(law) => Some(law),
                Err(e) => {
                    tracing::debug!("Skipping malformed law record: {}", e);
                    None
                }
            }
        })
        .collect()
}

/// 基于 HTTP GET 的法条检索服务（参数 question / serviceKey）
pub struct DeliLawSearch {
    client: Client,
    base_url: String,
    service_key: String,
}

fn resolve(configured: Option<&str>, env_key: &str) -> String {
    configured
        .map(str::to_string)
        .filter(|v| !v.trim().is_empty())
        .or_else(|| std::env::var(env_key).ok())
        .unwrap_or_default()
        .trim()
        .to_string()
}

impl DeliLawSearch {
    /// 未配置时回退环境变量 DELI_BASE_URL / DELI_SERVICE_KEY
    pub fn new(base_url: Option<&str>, service_key: Option<&str>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: resolve(base_url, BASE_URL_ENV),
            service_key: resolve(service_key, SERVICE_KEY_ENV),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.service_key.is_empty()
    }
}

#[async_trait]
impl LawSearch for DeliLawSearch {
    async fn search_law(&self, query: &str) -> Vec<LawRecord> {
        if !self.is_configured() {
            let mut missing = Vec::new();
            if self.base_url.is_empty() {
                missing.push("base URL");
            }
            if self.service_key.is_empty() {
                missing.push("service key");
            }
            tracing::warn!(
                "Skipping law search request because {} missing",
                missing.join(" and ")
            );
            return Vec::new();
        }

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("question", query), ("serviceKey", self.service_key.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status());
        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Law search request failed: {}", e);
                return Vec::new();
            }
        };

        match resp.json::<Value>().await {
            Ok(data) => {
                let laws = parse_law_response(data);
                tracing::debug!(query, count = laws.len(), "Law search returned");
                laws
            }
            Err(e) => {
                tracing::warn!("Law search response was not valid JSON: {}", e);
                Vec::new()
            }
        }
    }
}

/// 未配置检索服务时使用
#[derive(Debug, Default)]
pub struct NoopLawSearch;

#[async_trait]
impl LawSearch for NoopLawSearch {
    async fn search_law(&self, _query: &str) -> Vec<LawRecord> {
        Vec::new()
    }
}

/// 固定结果，记录收到的查询（测试用）
#[derive(Debug, Default)]
pub struct StaticLawSearch {
    laws: Vec<LawRecord>,
    queries: Mutex<Vec<String>>,
}

impl StaticLawSearch {
    pub fn new(laws: Vec<LawRecord>) -> Self {
        Self {
            laws,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }
}

#[async_trait]
impl LawSearch for StaticLawSearch {
    async fn search_law(&self, query: &str) -> Vec<LawRecord> {
        match self.queries.lock() {
            Ok(mut q) => q.push(query.to_string()),
            Err(e) => e.into_inner().push(query.to_string()),
        }
        self.laws.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_top_level_list() {
        let laws = parse_law_response(json!([
            {"lawsName": "Labor Law", "articleTag": "Art. 43", "articleContent": "text"}
        ]));
        assert_eq!(laws.len(), 1);
        assert_eq!(laws[0].laws_name, "Labor Law");
    }

    #[test]
    fn test_parse_wrapped_and_partial() {
        let laws = parse_law_response(json!({
            "code": 0,
            "results": [{"lawsName": "Civil Code"}, "junk", 3]
        }));
        assert_eq!(laws.len(), 1);
        assert_eq!(laws[0].article_tag, "");
    }

    #[test]
    fn test_parse_unexpected_shape() {
        assert!(parse_law_response(json!({"message": "quota"})).is_empty());
        assert!(parse_law_response(json!("oops")).is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_returns_empty() {
        let search = DeliLawSearch {
            client: Client::new(),
            base_url: String::new(),
            service_key: String::new(),
        };
        assert!(!search.is_configured());
        assert!(search.search_law("overtime").await.is_empty());
    }

    #[tokio::test]
    async fn test_static_records_queries() {
        let search = StaticLawSearch::new(vec![LawRecord::default()]);
        assert_eq!(search.search_law("q1").await.len(), 1);
        assert_eq!(search.queries(), vec!["q1".to_string()]);
    }
}
