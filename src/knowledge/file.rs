//! 文件知识库：`<root>/<namespace>/{experience,case,legal}.json`
//!
//! 打开时载入已有文件（缺失或损坏则从空开始），每次写入后整类别落盘。
//! 落盘失败只记 warn，内存中的数据保留。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::knowledge::{InMemoryKnowledgeStore, KnowledgeKind, KnowledgeRecord, KnowledgeStore};

pub struct JsonFileKnowledgeStore {
    dir: PathBuf,
    inner: InMemoryKnowledgeStore,
}

/// 命名空间转目录名：去掉路径分隔符
fn dir_name(namespace: &str) -> String {
    let cleaned: String = namespace
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "default".to_string()
    } else {
        cleaned
    }
}

impl JsonFileKnowledgeStore {
    pub fn open(root: impl AsRef<Path>, namespace: &str) -> Self {
        let dir = root.as_ref().join(dir_name(namespace));
        let inner = InMemoryKnowledgeStore::new(namespace);

        for kind in KnowledgeKind::ALL {
            let path = dir.join(format!("{}.json", kind));
            if !path.exists() {
                continue;
            }
            let loaded = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|data| {
                    serde_json::from_str::<Vec<KnowledgeRecord>>(&data).map_err(|e| e.to_string())
                });
            match loaded {
                Ok(records) => {
                    tracing::debug!(namespace, %kind, count = records.len(), "Knowledge loaded");
                    inner.load(kind, records);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Ignoring unreadable knowledge file: {}", e)
                }
            }
        }

        Self { dir, inner }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn persist(&self, kind: KnowledgeKind) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let records = self.inner.snapshot(kind);
        let data = serde_json::to_string_pretty(&records)?;
        std::fs::write(self.dir.join(format!("{}.json", kind)), data)
    }
}

impl KnowledgeStore for JsonFileKnowledgeStore {
    fn namespace(&self) -> &str {
        self.inner.namespace()
    }

    fn query(&self, kind: KnowledgeKind, query: &str, n_results: usize) -> Vec<KnowledgeRecord> {
        self.inner.query(kind, query, n_results)
    }

    fn add(&self, kind: KnowledgeKind, id: &str, document: &str, metadata: BTreeMap<String, String>) {
        self.inner.add(kind, id, document, metadata);
        if let Err(e) = self.persist(kind) {
            tracing::warn!(dir = %self.dir.display(), %kind, "Failed to persist knowledge: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_through_and_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let store = JsonFileKnowledgeStore::open(tmp.path(), "Lawyer Kim");
            store.add_to_legal(
                "l1",
                "Labor Law Article 43 overtime",
                BTreeMap::from([("lawName".to_string(), "Labor Law".to_string())]),
            );
        }
        assert!(tmp.path().join("Lawyer Kim").join("legal.json").exists());

        let reopened = JsonFileKnowledgeStore::open(tmp.path(), "Lawyer Kim");
        let hits = reopened.query_legal("overtime", 3);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata["lawName"], "Labor Law");
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("judge");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("case.json"), "{not json").unwrap();

        let store = JsonFileKnowledgeStore::open(tmp.path(), "judge");
        assert!(store.query_case("anything here", 3).is_empty());
    }

    #[test]
    fn test_namespace_sanitized() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileKnowledgeStore::open(tmp.path(), "../escape");
        assert_eq!(store.dir(), tmp.path().join(".._escape"));
        assert_eq!(store.namespace(), "../escape");
    }
}
