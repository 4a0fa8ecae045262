//! 設備路徑模型

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::machine::MachineId;

/// 路徑標記：未分組的單一設備，或代表整個群組
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathToken {
    /// `machine:<id>`
    Machine(MachineId),
    /// `group:<name>`
    Group(String),
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Machine(id) => write!(f, "machine:{}", id),
            PathToken::Group(name) => write!(f, "group:{}", name),
        }
    }
}

/// 標準化設備路徑
///
/// 標記按字串形式排序且不重複，相同設備集合必定得到相同的路徑。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EquipmentPath {
    tokens: Vec<PathToken>,
}

impl EquipmentPath {
    /// 路徑鍵的分隔符
    pub const SEPARATOR: &'static str = "|";

    /// 由標記建立路徑（排序並去重）
    pub fn from_tokens(tokens: impl IntoIterator<Item = PathToken>) -> Self {
        let mut keyed: Vec<(String, PathToken)> = tokens
            .into_iter()
            .map(|token| (token.to_string(), token))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.dedup_by(|a, b| a.0 == b.0);

        Self {
            tokens: keyed.into_iter().map(|(_, token)| token).collect(),
        }
    }

    /// 路徑標記
    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    /// 可排序、可雜湊的路徑鍵
    pub fn key(&self) -> String {
        self.tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(Self::SEPARATOR)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

impl fmt::Display for EquipmentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
