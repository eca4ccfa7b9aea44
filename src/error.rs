use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// EPUB处理过程中的错误类型
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("文件不是有效的EPUB格式: {0}")]
    InvalidEpub(String),

    #[error("XML解析错误: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("找不到rootfile: {0}")]
    MissingRootFile(String),

    #[error("找不到目录文档(NCX或导航文档)")]
    MissingToc,

    #[error("找不到锚点: {0}")]
    AnchorNotFound(String),

    #[error("内容为空")]
    EmptyContent,

    #[error("章节索引越界: {index}, 共{total}章")]
    ChapterIndexOutOfRange { index: usize, total: usize },

    #[error("压缩包中找不到条目: {0}")]
    EntryNotFound(String),

    #[error("配置文件错误: {0}")]
    ConfigError(String),
}
