//! 检索分词
//!
//! 含中日韩字符时用 jieba 搜索引擎模式切分，否则按空白与标点切分；统一小写。

use std::collections::HashSet;
use std::sync::OnceLock;

use jieba_rs::Jieba;

static JIEBA: OnceLock<Jieba> = OnceLock::new();

fn jieba() -> &'static Jieba {
    JIEBA.get_or_init(Jieba::new)
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' |
        '\u{3400}'..='\u{4DBF}' |
        '\u{F900}'..='\u{FAFF}' |
        '\u{3040}'..='\u{30FF}' |
        '\u{AC00}'..='\u{D7AF}'   // 韩文音节
    )
}

pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// 有意义的词：长度大于 1，或单个 CJK 字
fn keep(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (None, _) => false,
        (Some(c), None) => is_cjk(c),
        _ => token.chars().any(|c| c.is_alphanumeric()),
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if contains_cjk(text) {
        jieba()
            .cut_for_search(text, true)
            .into_iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| keep(s))
            .collect()
    } else {
        text.split(|c: char| c.is_whitespace() || (c.is_ascii_punctuation() && c != '-'))
            .map(|s| s.to_lowercase())
            .filter(|s| keep(s))
            .collect()
    }
}

pub fn tokenize_to_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// 重叠分数：交集大小
pub fn overlap_score(query: &HashSet<String>, doc: &HashSet<String>) -> usize {
    query.intersection(doc).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_split_on_punctuation() {
        let tokens = tokenize("Labor dispute: unpaid wages, overtime!");
        assert_eq!(tokens, vec!["labor", "dispute", "unpaid", "wages", "overtime"]);
    }

    #[test]
    fn test_chinese_uses_jieba() {
        let tokens = tokenize_to_set("劳动合同纠纷");
        assert!(tokens.contains("劳动"));
        assert!(tokens.contains("纠纷"));
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_overlap() {
        let a = tokenize_to_set("contract breach damages");
        let b = tokenize_to_set("breach of contract");
        assert_eq!(overlap_score(&a, &b), 2);
    }
}
