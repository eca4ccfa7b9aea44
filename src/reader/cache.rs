//! 内容缓存模块
//!
//! 三个独立的键值存储: 原始HTML按路径、渲染结果按路径、
//! 排版结果按(路径, 宽度)。均由互斥锁保护，后台预读线程与
//! 前台读取共享同一实例。无淘汰策略，条目保留到进程结束
//! 或显式清空。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::epub::Epub;
use crate::error::Result;
use crate::render::{RenderedDocument, format_lines, render_document};

/// 分级内容缓存
#[derive(Default)]
pub struct ContentCache {
    raw: Mutex<HashMap<String, Arc<String>>>,
    parsed: Mutex<HashMap<String, Arc<RenderedDocument>>>,
    formatted: Mutex<HashMap<(String, usize), Arc<Vec<String>>>>,
}

impl ContentCache {
    pub fn new() -> ContentCache {
        ContentCache::default()
    }

    /// 取原始HTML，缺失时从压缩包读取并写入缓存
    pub fn get_or_load(&self, book: &Epub, path: &str) -> Result<Arc<String>> {
        if let Some(content) = self.raw_store().get(path) {
            return Ok(Arc::clone(content));
        }

        // 读压缩包时不持有缓存锁
        let content = Arc::new(book.read_file(path)?);
        self.raw_store()
            .insert(path.to_string(), Arc::clone(&content));
        Ok(content)
    }

    /// 取渲染结果，缺失时解析并写入缓存
    pub fn get_or_parse(&self, book: &Epub, path: &str) -> Result<Arc<RenderedDocument>> {
        if let Some(document) = self.parsed_store().get(path) {
            return Ok(Arc::clone(document));
        }

        let raw = self.get_or_load(book, path)?;
        let document = Arc::new(render_document(&raw));
        self.parsed_store()
            .insert(path.to_string(), Arc::clone(&document));
        Ok(document)
    }

    /// 取排版结果，缺失时排版并写入缓存
    pub fn get_or_format(&self, book: &Epub, path: &str, width: usize) -> Result<Arc<Vec<String>>> {
        let key = (path.to_string(), width);
        if let Some(lines) = self.formatted_store().get(&key) {
            return Ok(Arc::clone(lines));
        }

        let document = self.get_or_parse(book, path)?;
        let lines = Arc::new(format_lines(&document.lines, width));
        self.formatted_store().insert(key, Arc::clone(&lines));
        Ok(lines)
    }

    /// 原始内容是否已缓存
    pub fn has_raw(&self, path: &str) -> bool {
        self.raw_store().contains_key(path)
    }

    /// 清空全部缓存
    ///
    /// 按固定顺序同时持有三把锁再清空，清空期间的其他访问
    /// 会阻塞到完成。
    pub fn clear_all(&self) {
        let mut raw = self.raw_store();
        let mut parsed = self.parsed_store();
        let mut formatted = self.formatted_store();
        raw.clear();
        parsed.clear();
        formatted.clear();
    }

    fn raw_store(&self) -> MutexGuard<'_, HashMap<String, Arc<String>>> {
        self.raw
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn parsed_store(&self) -> MutexGuard<'_, HashMap<String, Arc<RenderedDocument>>> {
        self.parsed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn formatted_store(&self) -> MutexGuard<'_, HashMap<(String, usize), Arc<Vec<String>>>> {
        self.formatted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EpubError;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    fn create_cache_book(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("cache.epub");
        let file = File::create(&path).unwrap();
        let mut zip = ZipWriter::new(file);

        let entries: [(&str, &str); 4] = [
            ("mimetype", "application/epub+zip"),
            (
                "META-INF/container.xml",
                r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#,
            ),
            (
                "OEBPS/content.opf",
                r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0">
    <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
        <dc:title>缓存测试</dc:title>
    </metadata>
    <manifest>
        <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>
    </manifest>
    <spine>
        <itemref idref="ch1"/>
    </spine>
</package>"#,
            ),
            (
                "OEBPS/ch1.xhtml",
                "<html><body><p>缓存的正文内容</p></body></html>",
            ),
        ];

        for (name, content) in entries {
            zip.start_file(name, FileOptions::<()>::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }

        zip.finish().unwrap();
        path
    }

    #[test]
    fn test_raw_cache_hit_returns_same_allocation() {
        let dir = TempDir::new().unwrap();
        let book = Epub::open(create_cache_book(&dir)).unwrap();
        let cache = ContentCache::new();

        let first = cache.get_or_load(&book, "OEBPS/ch1.xhtml").unwrap();
        let second = cache.get_or_load(&book, "OEBPS/ch1.xhtml").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.has_raw("OEBPS/ch1.xhtml"));
    }

    #[test]
    fn test_parse_and_format_chain() {
        let dir = TempDir::new().unwrap();
        let book = Epub::open(create_cache_book(&dir)).unwrap();
        let cache = ContentCache::new();

        let document = cache.get_or_parse(&book, "OEBPS/ch1.xhtml").unwrap();
        assert_eq!(document.lines[0].text, "缓存的正文内容");

        let lines = cache.get_or_format(&book, "OEBPS/ch1.xhtml", 40).unwrap();
        assert!(lines.iter().any(|line| line.contains("缓存的正文内容")));

        // 解析结果由排版复用
        let again = cache.get_or_parse(&book, "OEBPS/ch1.xhtml").unwrap();
        assert!(Arc::ptr_eq(&document, &again));
    }

    #[test]
    fn test_formatted_entries_keyed_by_width() {
        let dir = TempDir::new().unwrap();
        let book = Epub::open(create_cache_book(&dir)).unwrap();
        let cache = ContentCache::new();

        let narrow = cache.get_or_format(&book, "OEBPS/ch1.xhtml", 10).unwrap();
        let wide = cache.get_or_format(&book, "OEBPS/ch1.xhtml", 80).unwrap();
        assert!(!Arc::ptr_eq(&narrow, &wide));

        let narrow_again = cache.get_or_format(&book, "OEBPS/ch1.xhtml", 10).unwrap();
        assert!(Arc::ptr_eq(&narrow, &narrow_again));
    }

    #[test]
    fn test_clear_all_drops_entries() {
        let dir = TempDir::new().unwrap();
        let book = Epub::open(create_cache_book(&dir)).unwrap();
        let cache = ContentCache::new();

        let before = cache.get_or_load(&book, "OEBPS/ch1.xhtml").unwrap();
        cache.clear_all();

        assert!(!cache.has_raw("OEBPS/ch1.xhtml"));
        let after = cache.get_or_load(&book, "OEBPS/ch1.xhtml").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_missing_file_error_propagates() {
        let dir = TempDir::new().unwrap();
        let book = Epub::open(create_cache_book(&dir)).unwrap();
        let cache = ContentCache::new();

        let result = cache.get_or_load(&book, "OEBPS/none.xhtml");
        assert!(matches!(result, Err(EpubError::EntryNotFound(_))));
        assert!(!cache.has_raw("OEBPS/none.xhtml"));
    }
}
