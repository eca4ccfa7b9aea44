pub mod epub;
pub mod error;
pub mod reader;
pub mod render;

// === 核心API重新导出 ===

/// EPUB书籍模型（主要接口）
pub use epub::Epub;

/// 错误处理
pub use error::{EpubError, Result};

// === 阅读层 ===

/// 阅读会话与章节内容
pub use reader::{ChapterContent, ReadingSession};

/// 内容缓存
pub use reader::ContentCache;

/// 阅读状态持久化
pub use reader::{BookState, JumpList, ReadingPosition, ReadingState};

// === 渲染组件 ===

/// HTML渲染
pub use render::{ContentLine, LineRole, RenderedDocument, render_document};

/// 终端排版
pub use render::format_lines;

/// 代码高亮
pub use render::{highlight_code, visible_length};

/// 锚点截取
pub use render::extract_between_anchors;

// === 底层组件（高级用法） ===

/// 容器组件
pub use epub::{Container, RootFile};

/// OPF组件
pub use epub::{ManifestItem, Metadata, MetadataEntry, Opf, SpineItem};

/// 目录组件
pub use epub::{NavPoint, Toc, TocNode, VirtualContentRange};

// === 库信息 ===

/// PageForge库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// PageForge库的描述
pub const DESCRIPTION: &str = "一个将EPUB文件渲染为终端文本的Rust库";

// === 便捷函数 ===

/// 快速打开EPUB文件
///
/// 这是 `Epub::open` 的便捷包装函数。
///
/// # 参数
/// * `path` - EPUB文件路径
///
/// # 返回值
/// * `Result<Epub>` - 书籍模型
///
/// # 示例
///
/// ```rust,no_run
/// let book = pageforge::open("book.epub")?;
/// println!("章节数: {}", book.chapter_count());
/// # Ok::<(), pageforge::EpubError>(())
/// ```
pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Epub> {
    Epub::open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        println!("PageForge version: {}", VERSION);
    }

    #[test]
    fn test_description() {
        assert!(!DESCRIPTION.is_empty());
        println!("Description: {}", DESCRIPTION);
    }
}
