//! 内存知识库：按词重叠检索（无真实向量）

use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use crate::knowledge::tokenizer::{overlap_score, tokenize_to_set};
use crate::knowledge::{KnowledgeKind, KnowledgeRecord, KnowledgeStore};

struct Indexed {
    record: KnowledgeRecord,
    tokens: HashSet<String>,
}

impl Indexed {
    fn new(record: KnowledgeRecord) -> Self {
        let mut text = record.document.clone();
        for value in record.metadata.values() {
            text.push(' ');
            text.push_str(value);
        }
        Self {
            tokens: tokenize_to_set(&text),
            record,
        }
    }
}

pub struct InMemoryKnowledgeStore {
    namespace: String,
    entries: RwLock<BTreeMap<KnowledgeKind, Vec<Indexed>>>,
}

impl InMemoryKnowledgeStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// 批量载入（用于从文件恢复），同 id 覆盖
    pub fn load(&self, kind: KnowledgeKind, records: Vec<KnowledgeRecord>) {
        for record in records {
            self.upsert(kind, record);
        }
    }

    /// 某类别全部记录（按写入顺序）
    pub fn snapshot(&self, kind: KnowledgeKind) -> Vec<KnowledgeRecord> {
        match self.entries.read() {
            Ok(entries) => entries
                .get(&kind)
                .map(|v| v.iter().map(|e| e.record.clone()).collect())
                .unwrap_or_default(),
            Err(_) => {
                tracing::warn!(namespace = %self.namespace, "Knowledge store lock poisoned");
                Vec::new()
            }
        }
    }

    pub fn len(&self, kind: KnowledgeKind) -> usize {
        self.entries
            .read()
            .map(|e| e.get(&kind).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn upsert(&self, kind: KnowledgeKind, record: KnowledgeRecord) {
        let Ok(mut entries) = self.entries.write() else {
            tracing::warn!(namespace = %self.namespace, "Knowledge store lock poisoned, dropping write");
            return;
        };
        let bucket = entries.entry(kind).or_default();
        let indexed = Indexed::new(record);
        match bucket.iter_mut().find(|e| e.record.id == indexed.record.id) {
            Some(slot) => *slot = indexed,
            None => bucket.push(indexed),
        }
    }
}

impl KnowledgeStore for InMemoryKnowledgeStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn query(&self, kind: KnowledgeKind, query: &str, n_results: usize) -> Vec<KnowledgeRecord> {
        let query_tokens = tokenize_to_set(query);
        if query_tokens.is_empty() || n_results == 0 {
            return Vec::new();
        }
        let Ok(entries) = self.entries.read() else {
            tracing::warn!(namespace = %self.namespace, "Knowledge store lock poisoned");
            return Vec::new();
        };
        let Some(bucket) = entries.get(&kind) else {
            return Vec::new();
        };

        let mut scored: Vec<(usize, &Indexed)> = bucket
            .iter()
            .map(|e| (overlap_score(&query_tokens, &e.tokens), e))
            .filter(|(s, _)| *s > 0)
            .collect();
        // 稳定排序：同分按写入顺序
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let total = query_tokens.len() as f32;
        scored
            .into_iter()
            .take(n_results)
            .map(|(s, e)| KnowledgeRecord {
                score: s as f32 / total,
                ..e.record.clone()
            })
            .collect()
    }

    fn add(&self, kind: KnowledgeKind, id: &str, document: &str, metadata: BTreeMap<String, String>) {
        self.upsert(
            kind,
            KnowledgeRecord {
                id: id.to_string(),
                document: document.to_string(),
                metadata,
                score: 0.0,
            },
        );
        tracing::debug!(namespace = %self.namespace, %kind, id, "Knowledge entry stored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_namespace_returns_empty() {
        let store = InMemoryKnowledgeStore::new("judge");
        assert!(store.query_experience("labor dispute", 3).is_empty());
        assert!(store.query_legal("", 3).is_empty());
    }

    #[test]
    fn test_query_ranks_by_overlap() {
        let store = InMemoryKnowledgeStore::new("lawyer");
        store.add_to_case("a", "contract signed late", BTreeMap::new());
        store.add_to_case("b", "labor dispute over unpaid overtime", BTreeMap::new());
        store.add_to_case("c", "labor contract", meta(&[("keywords", "dispute")]));

        let hits = store.query_case("labor dispute", 3);
        let ids: Vec<_> = hits.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(hits[0].score, 1.0);
    }

    #[test]
    fn test_n_results_limits() {
        let store = InMemoryKnowledgeStore::new("lawyer");
        for i in 0..5 {
            store.add_to_legal(&format!("l{}", i), "overtime wages article", BTreeMap::new());
        }
        let hits = store.query_legal("overtime", 3);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, "l0");
    }

    #[test]
    fn test_kinds_are_isolated() {
        let store = InMemoryKnowledgeStore::new("lawyer");
        store.add_to_experience("e", "overtime lesson", BTreeMap::new());
        assert!(store.query_case("overtime", 3).is_empty());
        assert_eq!(store.len(KnowledgeKind::Experience), 1);
    }

    #[test]
    fn test_same_id_overwrites() {
        let store = InMemoryKnowledgeStore::new("lawyer");
        store.add_to_case("x", "first", BTreeMap::new());
        store.add_to_case("x", "second", BTreeMap::new());
        let all = store.snapshot(KnowledgeKind::Case);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].document, "second");
    }
}
