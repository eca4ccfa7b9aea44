//! 脊柱模块
//!
//! 提供EPUB阅读顺序的结构定义。

/// 脊柱项信息
#[derive(Debug, Clone)]
pub struct SpineItem {
    /// 引用的清单项ID
    pub idref: String,
    /// 是否参与线性阅读
    pub linear: bool,
}

impl SpineItem {
    /// 创建新的脊柱项(默认线性)
    pub fn new(idref: String) -> Self {
        Self {
            idref,
            linear: true,
        }
    }

    /// 检查是否参与线性阅读
    pub fn is_linear(&self) -> bool {
        self.linear
    }
}
