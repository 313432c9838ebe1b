// 配置验证

use crate::ConfigResult;

pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}
