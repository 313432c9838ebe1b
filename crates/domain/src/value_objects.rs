use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 实例写入与模板指针更新之间的投递语义
///
/// 两种模式都先写实例再更新指针；`ExactlyOnce` 额外按 (模板ID, 发生时间) 去重。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    #[default]
    AtLeastOnce,
    ExactlyOnce,
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::AtLeastOnce => write!(f, "at_least_once"),
            DeliveryMode::ExactlyOnce => write!(f, "exactly_once"),
        }
    }
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "at_least_once" => Ok(DeliveryMode::AtLeastOnce),
            "exactly_once" => Ok(DeliveryMode::ExactlyOnce),
            _ => Err(format!(
                "Invalid delivery mode: {s}. Valid modes: at_least_once, exactly_once"
            )),
        }
    }
}
