//! 元数据模块
//!
//! 提供包文档元数据的结构定义和常用字段的访问方法。

/// 单条元数据
#[derive(Debug, Clone)]
pub struct MetadataEntry {
    /// 元素名(去掉命名空间前缀的本地名称，如title、creator)
    pub name: String,
    /// 文本内容
    pub value: String,
}

/// 包文档的元数据
///
/// 条目按文档中的出现顺序保存。同名条目可以出现多次，
/// 命名访问方法返回第一个匹配的值。
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    entries: Vec<MetadataEntry>,
}

impl Metadata {
    /// 创建空的元数据
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 追加一条元数据
    pub fn push(&mut self, name: String, value: String) {
        self.entries.push(MetadataEntry { name, value });
    }

    /// 获取全部条目(文档顺序)
    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn first(&self, name: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.clone())
    }

    /// 书名
    pub fn title(&self) -> Option<String> {
        self.first("title")
    }

    /// 作者
    pub fn creator(&self) -> Option<String> {
        self.first("creator")
    }

    /// 语言
    pub fn language(&self) -> Option<String> {
        self.first("language")
    }

    /// 标识符(如ISBN)
    pub fn identifier(&self) -> Option<String> {
        self.first("identifier")
    }

    /// 出版社
    pub fn publisher(&self) -> Option<String> {
        self.first("publisher")
    }

    /// 出版日期
    pub fn date(&self) -> Option<String> {
        self.first("date")
    }

    /// 简介
    pub fn description(&self) -> Option<String> {
        self.first("description")
    }
}
