//! 精确的部分更新值
//!
//! 区分"设置为某值"、"置空"和"不修改"三种情况，用于模板的局部合并更新。

use serde::{Deserialize, Deserializer, Serialize};

/// Represents a precise update operation for PATCH semantics
///
/// - `Set(T)`: 设置为指定值
/// - `Unset`: 置空（仅对可空字段有意义）
/// - `NoChange`: 不修改
///
/// 反序列化时字段缺失对应 `NoChange`（需配合 `#[serde(default)]`），
/// `null` 对应 `Unset`。
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum UpdateValue<T> {
    Set(T),
    Unset,
    #[default]
    NoChange,
}

impl<T> UpdateValue<T> {
    pub fn is_no_change(&self) -> bool {
        matches!(self, UpdateValue::NoChange)
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, UpdateValue::Unset)
    }

    /// Apply this update to an existing value
    pub fn apply_to(self, existing: Option<T>) -> Option<T> {
        match self {
            UpdateValue::Set(value) => Some(value),
            UpdateValue::Unset => None,
            UpdateValue::NoChange => existing,
        }
    }
}

impl<T> From<Option<T>> for UpdateValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => UpdateValue::Set(v),
            None => UpdateValue::Unset,
        }
    }
}

impl<'de, T> Deserialize<'de> for UpdateValue<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(UpdateValue::from)
    }
}
