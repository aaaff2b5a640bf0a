//! 反思阶段写入知识库的三类条目

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::knowledge::LawRecord;
use crate::parser::{CaseSummary, ExperienceSummary};

/// 经验条目 metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceMetadata {
    pub context: String,
    #[serde(rename = "focusPoints")]
    pub focus_points: String,
    pub guidelines: String,
}

impl ExperienceMetadata {
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("context".to_string(), self.context.clone()),
            ("focusPoints".to_string(), self.focus_points.clone()),
            ("guidelines".to_string(), self.guidelines.clone()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: String,
    pub content: String,
    pub metadata: ExperienceMetadata,
}

impl ExperienceEntry {
    /// 摘要的 context 作为正文存储，摘要的 content 存入 metadata.context
    pub fn from_summary(id: String, summary: ExperienceSummary) -> Self {
        Self {
            id,
            content: summary.context,
            metadata: ExperienceMetadata {
                context: summary.content,
                focus_points: summary.focus_points,
                guidelines: summary.guidelines,
            },
        }
    }
}

/// 案例条目 metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMetadata {
    #[serde(rename = "caseType")]
    pub case_type: String,
    pub keywords: String,
    pub quick_reaction_points: String,
    pub response_directions: String,
}

impl CaseMetadata {
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("caseType".to_string(), self.case_type.clone()),
            ("keywords".to_string(), self.keywords.clone()),
            (
                "quick_reaction_points".to_string(),
                self.quick_reaction_points.clone(),
            ),
            (
                "response_directions".to_string(),
                self.response_directions.clone(),
            ),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseEntry {
    pub id: String,
    pub content: String,
    pub metadata: CaseMetadata,
}

impl CaseEntry {
    pub fn from_summary(id: String, summary: CaseSummary) -> Self {
        Self {
            id,
            content: summary.content,
            metadata: CaseMetadata {
                case_type: summary.case_type,
                keywords: summary.keywords,
                quick_reaction_points: summary.quick_reaction_points,
                response_directions: summary.response_directions,
            },
        }
    }
}

/// 法条条目 metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawMetadata {
    #[serde(rename = "lawName")]
    pub law_name: String,
    #[serde(rename = "articleTag")]
    pub article_tag: String,
}

impl LawMetadata {
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("lawName".to_string(), self.law_name.clone()),
            ("articleTag".to_string(), self.article_tag.clone()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawEntry {
    pub id: String,
    pub content: String,
    pub metadata: LawMetadata,
}

impl LawEntry {
    /// 正文为 "法律名 条号 条文"
    pub fn from_law(id: String, law: &LawRecord) -> Self {
        Self {
            id,
            content: format!(
                "{} {} {}",
                law.laws_name, law.article_tag, law.article_content
            ),
            metadata: LawMetadata {
                law_name: law.laws_name.clone(),
                article_tag: law.article_tag.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_fields_swapped() {
        let entry = ExperienceEntry::from_summary(
            "e1".to_string(),
            ExperienceSummary {
                context: "background".to_string(),
                content: "lessons".to_string(),
                focus_points: "a, b".to_string(),
                guidelines: "g".to_string(),
            },
        );
        assert_eq!(entry.content, "background");
        assert_eq!(entry.metadata.context, "lessons");
        assert_eq!(entry.metadata.to_map()["focusPoints"], "a, b");
    }

    #[test]
    fn test_case_content_passes_through() {
        let entry = CaseEntry::from_summary(
            "c1".to_string(),
            CaseSummary {
                content: "wage case".to_string(),
                case_type: "labor".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(entry.content, "wage case");
        let map = entry.metadata.to_map();
        assert_eq!(map["caseType"], "labor");
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_law_entry_content() {
        let law = LawRecord {
            laws_name: "Labor Law".to_string(),
            article_tag: "Article 43".to_string(),
            article_content: "Overtime must be paid.".to_string(),
        };
        let entry = LawEntry::from_law("l1".to_string(), &law);
        assert_eq!(entry.content, "Labor Law Article 43 Overtime must be paid.");
        assert_eq!(entry.metadata.to_map()["lawName"], "Labor Law");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["metadata"]["articleTag"], "Article 43");
    }
}
