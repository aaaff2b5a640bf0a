//! 庭审记录：只追加的发言序列
//!
//! History 由 CourtSimulation 独占；Agent 只拿到 `&[Turn]` 快照。
//! 展示（控制台面板、日志）通过 HistoryObserver 挂载，不写在状态转移里。

use serde::{Deserialize, Serialize};

use crate::court::CourtRole;

/// 一条发言：role 为展示用的角色标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    pub name: String,
    pub content: String,
}

impl Turn {
    pub fn new(role: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            name: name.into(),
            content: content.into(),
        }
    }
}

/// 每次追加发言后回调
pub trait HistoryObserver: Send + Sync {
    fn on_turn(&self, index: usize, speaker: CourtRole, turn: &Turn);
}

#[derive(Debug, Clone, Default)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加并返回下标
    pub fn push(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}

/// 渲染为上下文文本：`角色 (名字):` 加缩进内容，条目间空行分隔
pub fn format_history(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("{} ({}):\n  {}", t.role, t.name, t.content.replace('\n', "\n  ")))
        .collect::<Vec<_>>()
        .join("\n\n")
}
