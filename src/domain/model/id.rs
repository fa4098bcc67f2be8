use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::DomainError;

/// サーバーが採番する不透明なBook ID。
/// JSON上の表現（文字列 or 非負整数）をそのまま保持し、送り返すときも同じ形にする。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookId {
    Number(u64),
    Text(String),
}

impl BookId {
    /// 文字列からIDを作る。数字のみなら数値IDとして扱う。
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::EmptyBookId);
        }
        Ok(match s.parse::<u64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(s.to_string()),
        })
    }

    /// 表示用の短縮ID（先頭8文字）
    pub fn short(&self) -> String {
        self.to_string().chars().take(8).collect()
    }
}

impl From<u64> for BookId {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for BookId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}
