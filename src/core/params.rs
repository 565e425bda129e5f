//! 解析后的命令行参数

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// 参数映射，值的真假按 JSON 语义判断
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CliParams(HashMap<String, Value>);

impl CliParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 键存在且值为真
    pub fn is_set(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(is_truthy)
    }
}

impl FromIterator<(String, Value)> for CliParams {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        let params = CliParams::new()
            .with("on", true)
            .with("off", false)
            .with("zero", 0)
            .with("count", 3)
            .with("empty", "")
            .with("name", "x")
            .with("null", Value::Null);

        assert!(params.is_set("on"));
        assert!(params.is_set("count"));
        assert!(params.is_set("name"));
        assert!(!params.is_set("off"));
        assert!(!params.is_set("zero"));
        assert!(!params.is_set("empty"));
        assert!(!params.is_set("null"));
        assert!(!params.is_set("absent"));
    }

    #[test]
    fn test_deserialize_map() {
        let params: CliParams = serde_json::from_value(json!({"delete": true, "size_only": false})).unwrap();
        assert!(params.is_set("delete"));
        assert!(!params.is_set("size_only"));
    }
}
