//! 断点：记录下一个要运行的案例下标
//!
//! 每个案例完成后写入；重启时从该下标继续，未完成的案例整体重跑。

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::core::CourtError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current_case_index: usize,
}

pub trait CheckpointStore: Send + Sync {
    /// 无断点时返回 None
    fn load(&self) -> Result<Option<Progress>, CourtError>;

    fn save(&self, progress: Progress) -> Result<(), CourtError>;
}

/// JSON 文件断点，如 progress.json
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    path: PathBuf,
}

impl FileCheckpoint {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CheckpointStore for FileCheckpoint {
    fn load(&self) -> Result<Option<Progress>, CourtError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn save(&self, progress: Progress) -> Result<(), CourtError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string(&progress)?)?;
        Ok(())
    }
}

/// 内存断点（测试用），保留每次保存的记录
#[derive(Debug, Default)]
pub struct InMemoryCheckpoint {
    current: Mutex<Option<Progress>>,
    saved: Mutex<Vec<Progress>>,
}

impl InMemoryCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(index: usize) -> Self {
        Self {
            current: Mutex::new(Some(Progress {
                current_case_index: index,
            })),
            saved: Mutex::new(Vec::new()),
        }
    }

    pub fn saved(&self) -> Vec<Progress> {
        self.saved
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }
}

impl CheckpointStore for InMemoryCheckpoint {
    fn load(&self) -> Result<Option<Progress>, CourtError> {
        Ok(self.current.lock().map(|c| *c).unwrap_or_else(|e| *e.into_inner()))
    }

    fn save(&self, progress: Progress) -> Result<(), CourtError> {
        match self.current.lock() {
            Ok(mut c) => *c = Some(progress),
            Err(e) => *e.into_inner() = Some(progress),
        }
        match self.saved.lock() {
            Ok(mut s) => s.push(progress),
            Err(e) => e.into_inner().push(progress),
        }
        Ok(())
    }
}
