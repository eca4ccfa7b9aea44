//! 阅读会话模块
//!
//! 把书籍模型、缓存和渲染管线串起来。读取章节时触发后台
//! 线程预读下一章，虚拟章节按锚点区间截取后单独渲染。

use std::sync::Arc;
use std::thread;

use crate::epub::Epub;
use crate::error::Result;
use crate::reader::cache::ContentCache;
use crate::render::{extract_between_anchors, format_lines, render_document};

/// 一次章节读取的结果
#[derive(Debug, Clone)]
pub struct ChapterContent {
    /// 排版后的行
    pub lines: Vec<String>,
    /// 行拼接成的文本
    pub text: String,
    /// 图片引用列表
    pub images: Vec<String>,
}

/// 阅读会话
///
/// 书籍模型与缓存都放在Arc里，读取章节时克隆引用交给
/// 后台预读线程。
pub struct ReadingSession {
    book: Arc<Epub>,
    cache: Arc<ContentCache>,
}

impl ReadingSession {
    /// 基于已打开的书籍创建会话
    pub fn new(book: Epub) -> ReadingSession {
        ReadingSession {
            book: Arc::new(book),
            cache: Arc::new(ContentCache::new()),
        }
    }

    /// 书籍模型
    pub fn book(&self) -> &Epub {
        &self.book
    }

    /// 读取并排版一个章节
    ///
    /// 命中缓存时直接返回，同时触发下一章的后台预读。
    ///
    /// # 参数
    ///
    /// * `index` - 章节序号(从0开始)
    /// * `width` - 排版宽度(0表示不换行)
    ///
    /// # 返回值
    ///
    /// 成功时返回排版后的章节内容，序号越界时返回错误
    pub fn read_chapter(&self, index: usize, width: usize) -> Result<ChapterContent> {
        let path = self.book.chapter_path(index)?.to_string();

        let document = self.cache.get_or_parse(&self.book, &path)?;
        let lines = self.cache.get_or_format(&self.book, &path, width)?;

        self.spawn_preload(index, width);

        Ok(ChapterContent {
            lines: lines.as_ref().clone(),
            text: lines.join("\n"),
            images: document.images.clone(),
        })
    }

    /// 读取并排版一个虚拟章节
    ///
    /// 虚拟章节与物理章节共享文件，渲染和排版结果不进按
    /// 路径键的缓存，只有原始内容被复用。锚点截取失败时
    /// 退化为渲染整个物理文件。
    pub fn read_virtual_chapter(&self, index: usize, width: usize) -> Result<ChapterContent> {
        let range = self.book.get_virtual_range(index)?.clone();
        let raw = self.cache.get_or_load(&self.book, &range.file_path)?;

        let extracted =
            match extract_between_anchors(&raw, &range.start_fragment, &range.end_fragment) {
                Ok(extracted) => extracted,
                Err(e) => {
                    log::warn!("锚点截取失败, 渲染整个文件: {}", e);
                    raw.as_ref().clone()
                }
            };

        let document = render_document(&extracted);
        let lines = format_lines(&document.lines, width);

        if lines.iter().all(|line| line.trim().is_empty()) {
            // 排版结果为空时退回截取出的原始内容
            let fallback: Vec<String> = extracted.lines().map(|line| line.to_string()).collect();
            return Ok(ChapterContent {
                lines: fallback,
                text: extracted,
                images: document.images,
            });
        }

        let text = lines.join("\n");
        Ok(ChapterContent {
            lines,
            text,
            images: document.images,
        })
    }

    /// 清空会话持有的缓存
    pub fn clear_cache(&self) {
        self.cache.clear_all();
    }

    fn spawn_preload(&self, index: usize, width: usize) {
        let book = Arc::clone(&self.book);
        let cache = Arc::clone(&self.cache);

        // 即发即弃，预读失败只记录日志
        thread::spawn(move || {
            preload_next(&book, &cache, index, width);
        });
    }
}

/// 预读下一章与第一个虚拟章节
///
/// 下一章走完整的读取、解析、排版管线；虚拟章节只预读
/// 物理文件的原始内容。已缓存的内容不再预读。
pub(crate) fn preload_next(book: &Epub, cache: &ContentCache, index: usize, width: usize) {
    let next = index + 1;
    if next < book.chapter_count() {
        if let Ok(path) = book.chapter_path(next) {
            let path = path.to_string();
            if !cache.has_raw(&path) {
                if let Err(e) = cache.get_or_format(book, &path, width) {
                    log::debug!("预读章节{}失败: {}", next, e);
                }
            }
        }
    }

    if book.virtual_count() > 0 {
        if let Ok(range) = book.get_virtual_range(0) {
            let file_path = range.file_path.clone();
            if !cache.has_raw(&file_path) {
                if let Err(e) = cache.get_or_load(book, &file_path) {
                    log::debug!("预读虚拟章节失败: {}", e);
                }
            }
        }
    }
}
