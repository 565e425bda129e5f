//! 策略参数描述与参数表

use serde::Serialize;
use std::borrow::Cow;

/// 参数动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgAction {
    /// 出现即为 true
    StoreTrue,
}

/// 策略对应的命令行参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentSpec {
    /// 参数名，例如 `size-only`
    pub name: &'static str,
    pub action: ArgAction,
    pub help_text: &'static str,
    /// 解析后在参数映射中的键，未指定时由 `name` 推导
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest: Option<&'static str>,
}

impl ArgumentSpec {
    pub const fn store_true(name: &'static str, help_text: &'static str) -> Self {
        Self {
            name,
            action: ArgAction::StoreTrue,
            help_text,
            dest: None,
        }
    }

    pub const fn with_dest(mut self, dest: &'static str) -> Self {
        self.dest = Some(dest);
        self
    }

    /// 解析后的参数键：优先 `dest`，否则把 `name` 中的 `-` 换成 `_`
    pub fn param_key(&self) -> Cow<'static, str> {
        match self.dest {
            Some(dest) => Cow::Borrowed(dest),
            None => Cow::Owned(self.name.replace('-', "_")),
        }
    }
}

/// 参数表，由外部命令构建，策略只负责往里追加
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArgumentTable {
    args: Vec<ArgumentSpec>,
}

impl ArgumentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arg: ArgumentSpec) {
        self.args.push(arg);
    }

    pub fn get(&self, name: &str) -> Option<&ArgumentSpec> {
        self.args.iter().find(|arg| arg.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.args.iter()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}
