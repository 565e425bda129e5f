//! ACL 数据结构
//!
//! 字段名与对象存储 GetObjectAcl 响应一致（`Owner` / `Grants` / `Grantee` / `Permission`），
//! 可以直接反序列化响应 JSON。

use serde::{Deserialize, Serialize};

/// 对象 ACL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AclData {
    pub owner: Owner,
    #[serde(default)]
    pub grants: Vec<Grant>,
}

/// 对象所有者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Owner {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// 授权条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Grant {
    pub grantee: Grantee,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

/// 被授权者，用户以 ID 标识，组以 URI 标识
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Grantee {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub grantee_type: Option<String>,
    #[serde(rename = "URI", default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl AclData {
    pub fn new(owner_id: impl Into<String>, grants: Vec<Grant>) -> Self {
        Self {
            owner: Owner {
                id: owner_id.into(),
                display_name: None,
            },
            grants,
        }
    }
}

impl Grant {
    /// 授予某个用户（按 canonical ID）的权限
    pub fn user(id: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            grantee: Grantee {
                id: Some(id.into()),
                grantee_type: Some("CanonicalUser".to_string()),
                ..Default::default()
            },
            permission: Some(permission.into()),
        }
    }

    /// 授予某个组（按 URI）的权限
    pub fn group(uri: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            grantee: Grantee {
                grantee_type: Some("Group".to_string()),
                uri: Some(uri.into()),
                ..Default::default()
            },
            permission: Some(permission.into()),
        }
    }

    /// 权限名，缺失时视为空字符串
    pub fn permission_name(&self) -> &str {
        self.permission.as_deref().unwrap_or("")
    }
}

/// 把授权列表拆分为所有者授权和其他授权，保持原有顺序
pub fn separate_owner_grants<'a>(
    grants: &'a [Grant],
    owner_id: &str,
) -> (Vec<&'a Grant>, Vec<&'a Grant>) {
    grants
        .iter()
        .partition(|grant| grant.grantee.id.as_deref() == Some(owner_id))
}
