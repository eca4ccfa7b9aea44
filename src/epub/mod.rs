//! EPUB文档模型模块
//!
//! 负责打开压缩包、解析容器与包文档、构建章节目录，
//! 汇总为可供渲染层使用的书籍模型。

pub mod archive;
pub mod book;
pub mod container;
pub mod opf;
pub mod toc;

// 重新导出压缩包访问
pub use archive::Archive;

// 重新导出容器相关
pub use container::{Container, RootFile};

// 重新导出书籍模型
pub use book::Epub;

// 重新导出OPF相关
pub use opf::{ManifestItem, Metadata, MetadataEntry, Opf, SpineItem};

// 重新导出目录相关
pub use toc::{NavPoint, Toc, TocNode, VirtualContentRange};
