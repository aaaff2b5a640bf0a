//! 法庭角色

use std::fmt;

use serde::{Deserialize, Serialize};

/// 庭审中的发言角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourtRole {
    Clerk,
    Judge,
    Plaintiff,
    Defendant,
}

impl CourtRole {
    /// 用于 Agent 指令的英文角色名
    pub fn as_str(&self) -> &'static str {
        match self {
            CourtRole::Clerk => "clerk",
            CourtRole::Judge => "judge",
            CourtRole::Plaintiff => "plaintiff",
            CourtRole::Defendant => "defendant",
        }
    }
}

impl fmt::Display for CourtRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
