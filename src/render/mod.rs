//! 渲染模块
//!
//! 把章节HTML变成终端可显示的文本: 锚点截取、DOM渲染、
//! 代码高亮与宽度排版。

pub mod anchor;
pub mod format;
pub mod highlight;
pub mod html;

// 重新导出锚点截取
pub use anchor::extract_between_anchors;

// 重新导出渲染结果类型
pub use html::{ContentLine, LineRole, RenderedDocument, render_document};

// 重新导出排版与高亮
pub use format::format_lines;
pub use highlight::{highlight_code, visible_length};
