//! 目录处理模块
//!
//! 解析NCX与EPUB3导航文档，并将大纲与脊柱合并为规范章节列表。

pub mod builder;
pub mod nav;
pub mod ncx;

pub use builder::{Toc, TocNode, VirtualContentRange};
pub use nav::parse_nav_doc;
pub use ncx::{parse_ncx, NavPoint};
