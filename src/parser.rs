//! 模型输出解析：从自由文本中提取 JSON 对象，并把反思摘要规整成固定字段
//!
//! extract_structured 永不失败：找不到 `{...}` 或解析失败时退回去掉首尾空白的原文。
//! ensure_experience_fields / ensure_case_fields 保证输出恰好包含所需字段且均为字符串；
//! 字段缺失时补空串，为列表时以 ", " 拼接，为 null 或其它非字符串类型时返回 ValidationError。

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::ValidationError;

/// 解析结果：JSON 值或退回的原文
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Json(Value),
    Text(String),
}

impl Extracted {
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Extracted::Json(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// 当作检索语句使用：优先取 `query` 字段，否则整体转成字符串
    pub fn into_query(self) -> String {
        match self {
            Extracted::Json(Value::Object(map)) => match map.get("query") {
                Some(Value::String(q)) => q.trim().to_string(),
                Some(other) => other.to_string(),
                None => Value::Object(map).to_string(),
            },
            Extracted::Json(other) => other.to_string(),
            Extracted::Text(text) => text,
        }
    }

    /// 降级记录中使用的文本：空值为空串
    fn fallback_text(&self) -> String {
        match self {
            Extracted::Text(text) => text.clone(),
            Extracted::Json(Value::Null) => String::new(),
            Extracted::Json(Value::Array(items)) if items.is_empty() => String::new(),
            Extracted::Json(Value::String(s)) => s.clone(),
            Extracted::Json(other) => other.to_string(),
        }
    }
}

fn is_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{1F}' | '\u{7F}')
}

/// 从模型输出中提取结构化结果
///
/// 取第一个 `{` 到最后一个 `}` 之间的片段（可跨行、可嵌套），去掉其中的 ASCII 控制字符后解析；
/// 重复键以后出现的为准。
pub fn extract_structured(text: &str) -> Extracted {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            let cleaned: String = text[start..=end].chars().filter(|c| !is_control(*c)).collect();
            match serde_json::from_str::<Value>(&cleaned) {
                Ok(value) => return Extracted::Json(value),
                Err(e) => tracing::debug!("Model output is not valid JSON ({}), using raw text", e),
            }
        }
    }
    Extracted::Text(text.trim().to_string())
}

/// 单个字段规整：列表以 ", " 拼接；缺失为空串；null 与其它非字符串类型报错
fn normalize_field(map: &Map<String, Value>, field: &str) -> Result<String, ValidationError> {
    match map.get(field) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")),
        Some(other) => Err(ValidationError {
            field: field.to_string(),
            found: json_type_name(other).to_string(),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 经验摘要（反思生成）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceSummary {
    pub context: String,
    pub content: String,
    pub focus_points: String,
    pub guidelines: String,
}

impl ExperienceSummary {
    pub fn to_extracted(&self) -> Extracted {
        Extracted::Json(json!({
            "context": self.context,
            "content": self.content,
            "focus_points": self.focus_points,
            "guidelines": self.guidelines,
        }))
    }
}

/// 案例摘要（反思生成）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub content: String,
    pub case_type: String,
    pub keywords: String,
    pub quick_reaction_points: String,
    pub response_directions: String,
}

impl CaseSummary {
    pub fn to_extracted(&self) -> Extracted {
        Extracted::Json(json!({
            "content": self.content,
            "case_type": self.case_type,
            "keywords": self.keywords,
            "quick_reaction_points": self.quick_reaction_points,
            "response_directions": self.response_directions,
        }))
    }
}

/// 规整经验摘要；非对象输入降级为仅 content 有值的记录
pub fn ensure_experience_fields(data: &Extracted) -> Result<ExperienceSummary, ValidationError> {
    let Some(map) = data.as_object() else {
        tracing::warn!(
            "Experience summary was not returned as JSON. Falling back to a minimal structure."
        );
        return Ok(ExperienceSummary {
            content: data.fallback_text(),
            ..Default::default()
        });
    };

    Ok(ExperienceSummary {
        context: normalize_field(map, "context")?,
        content: normalize_field(map, "content")?,
        focus_points: normalize_field(map, "focus_points")?,
        guidelines: normalize_field(map, "guidelines")?,
    })
}

/// 规整案例摘要；非对象输入降级为仅 content 有值的记录
pub fn ensure_case_fields(data: &Extracted) -> Result<CaseSummary, ValidationError> {
    let Some(map) = data.as_object() else {
        tracing::warn!("Case summary was not returned as JSON. Falling back to a minimal structure.");
        return Ok(CaseSummary {
            content: data.fallback_text(),
            ..Default::default()
        });
    };

    Ok(CaseSummary {
        content: normalize_field(map, "content")?,
        case_type: normalize_field(map, "case_type")?,
        keywords: normalize_field(map, "keywords")?,
        quick_reaction_points: normalize_field(map, "quick_reaction_points")?,
        response_directions: normalize_field(map, "response_directions")?,
    })
}
