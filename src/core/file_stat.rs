//! 单侧文件状态（由外部文件列举产生，这里只读取）

use crate::core::acl::AclData;
use crate::error::StrategyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 操作类型，决定时间比较的方向
///
/// 反序列化经过 [`FromStr`]，未知值报告可选的操作类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OperationKind {
    /// 本地 -> 远程
    Upload,
    /// 远程 -> 本地
    Download,
    /// 远程 -> 远程
    Copy,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Upload => write!(f, "upload"),
            OperationKind::Download => write!(f, "download"),
            OperationKind::Copy => write!(f, "copy"),
        }
    }
}

impl FromStr for OperationKind {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(OperationKind::Upload),
            "download" => Ok(OperationKind::Download),
            "copy" => Ok(OperationKind::Copy),
            other => Err(StrategyError::InvalidOperation(other.to_string())),
        }
    }
}

impl TryFrom<String> for OperationKind {
    type Error = StrategyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 文件状态
///
/// 一侧不存在的文件用 `None` 表示，不会出现字段为空的记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStat {
    /// 源路径
    pub src_path: String,
    /// 目标路径
    pub dest_path: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub operation: OperationKind,
    /// 仅在请求同步 ACL 时存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<AclData>,
}

impl FileStat {
    pub fn new(
        src_path: impl Into<String>,
        dest_path: impl Into<String>,
        size: u64,
        last_modified: DateTime<Utc>,
        operation: OperationKind,
    ) -> Self {
        Self {
            src_path: src_path.into(),
            dest_path: dest_path.into(),
            size,
            last_modified,
            operation,
            acl: None,
        }
    }

    pub fn with_acl(mut self, acl: AclData) -> Self {
        self.acl = Some(acl);
        self
    }
}
