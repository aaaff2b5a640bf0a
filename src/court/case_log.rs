//! 案例庭审记录输出：每个案例一个 JSON 文件 `[{role, name, content}, ...]`

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::core::CourtError;
use crate::court::Turn;

pub trait CaseLogSink: Send + Sync {
    fn write(&self, case_index: usize, turns: &[Turn]) -> Result<(), CourtError>;
}

/// 写入 `<dir>/court_session_case_<i+1>.json`
#[derive(Debug, Clone)]
pub struct JsonCaseLog {
    dir: PathBuf,
}

impl JsonCaseLog {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, case_index: usize) -> PathBuf {
        self.dir
            .join(format!("court_session_case_{}.json", case_index + 1))
    }
}

impl CaseLogSink for JsonCaseLog {
    fn write(&self, case_index: usize, turns: &[Turn]) -> Result<(), CourtError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(case_index);
        std::fs::write(&path, serde_json::to_string_pretty(turns)?)?;
        tracing::info!(path = %path.display(), turns = turns.len(), "Court session log saved");
        Ok(())
    }
}

/// 内存记录（测试用）
#[derive(Debug, Default)]
pub struct InMemoryCaseLog {
    logs: Mutex<Vec<(usize, Vec<Turn>)>>,
}

impl InMemoryCaseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logs(&self) -> Vec<(usize, Vec<Turn>)> {
        self.logs
            .lock()
            .map(|l| l.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn case_indices(&self) -> Vec<usize> {
        self.logs().into_iter().map(|(i, _)| i).collect()
    }
}

impl CaseLogSink for InMemoryCaseLog {
    fn write(&self, case_index: usize, turns: &[Turn]) -> Result<(), CourtError> {
        let entry = (case_index, turns.to_vec());
        match self.logs.lock() {
            Ok(mut l) => l.push(entry),
            Err(e) => e.into_inner().push(entry),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_case_log_writes_pretty_utf8() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = JsonCaseLog::new(tmp.path().join("logs"));
        let turns = vec![Turn::new("审判长", "Park", "现在开庭。")];
        sink.write(0, &turns).unwrap();

        let path = tmp.path().join("logs").join("court_session_case_1.json");
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("现在开庭。"));
        let back: Vec<Turn> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, turns);
    }

    #[test]
    fn test_in_memory_case_log() {
        let sink = InMemoryCaseLog::new();
        sink.write(3, &[]).unwrap();
        assert_eq!(sink.case_indices(), vec![3]);
    }
}
