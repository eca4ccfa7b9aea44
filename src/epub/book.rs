//! 书籍模型模块
//!
//! 打开EPUB文件并整合容器、包文档和目录三层解析结果。
//! 模型本身不可变，压缩包通过互斥锁串行访问，可以安全地
//! 用Arc在线程间共享。

use std::path::Path;
use std::sync::Mutex;

use crate::epub::archive::Archive;
use crate::epub::container::{self, Container};
use crate::epub::opf::{Metadata, Opf};
use crate::epub::toc::builder::resolve_path;
use crate::epub::toc::{NavPoint, Toc, TocNode, VirtualContentRange, parse_nav_doc, parse_ncx};
use crate::error::{EpubError, Result};

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// EPUB书籍模型
pub struct Epub {
    archive: Mutex<Archive>,
    root_dir: String,
    package: Opf,
    toc: Toc,
}

impl Epub {
    /// 打开EPUB文件并构建书籍模型
    ///
    /// 容器或包文档缺失、无法解析时直接失败；目录文档的问题
    /// 只记录警告并退化，保证能打开的书一定能翻页。
    ///
    /// # 参数
    /// * `path` - epub文件的路径
    ///
    /// # 返回值
    /// * `Result<Epub>` - 成功返回书籍模型，失败返回错误
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Epub> {
        let mut archive = Archive::open(path)?;

        let container_xml = archive.read_to_string(CONTAINER_PATH).map_err(|e| match e {
            EpubError::EntryNotFound(_) => {
                EpubError::InvalidEpub("缺少META-INF/container.xml".to_string())
            }
            other => other,
        })?;
        let container = Container::parse_xml(&container_xml)?;

        let entry_names = archive.entry_names();
        let rootfile_path =
            container::resolve_rootfile_path(container.rootfile_path(), &entry_names);
        let root_dir = container::root_directory(&rootfile_path);

        let opf_xml = archive.read_to_string(&rootfile_path).map_err(|e| match e {
            EpubError::EntryNotFound(name) => EpubError::MissingRootFile(name),
            other => other,
        })?;
        let package = Opf::parse_xml(&opf_xml)?;

        let outline = Self::load_outline(&mut archive, &package, &root_dir);
        let toc = Toc::build(&outline, &package.spine, &package.manifest, &root_dir);

        Ok(Epub {
            archive: Mutex::new(archive),
            root_dir,
            package,
            toc,
        })
    }

    /// 加载目录文档大纲
    ///
    /// NCX优先于EPUB3导航文档。目录缺失、读取失败或解析失败时
    /// 返回空大纲，由构建阶段合成仅含影子节点的平铺目录。
    fn load_outline(archive: &mut Archive, package: &Opf, root_dir: &str) -> Vec<NavPoint> {
        let item = match package.toc_item() {
            Some(item) => item,
            None => {
                log::warn!("{}, 退化为仅脊柱的平铺目录", EpubError::MissingToc);
                return Vec::new();
            }
        };

        let toc_path = resolve_path(&item.href, root_dir);
        let content = match archive.read_to_string(&toc_path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("读取目录文档失败: {}", e);
                return Vec::new();
            }
        };

        let outline = if item.is_ncx() {
            match parse_ncx(&content) {
                Ok(points) => points,
                Err(e) => {
                    log::warn!("解析NCX失败: {}", e);
                    Vec::new()
                }
            }
        } else {
            parse_nav_doc(&content)
        };

        if outline.is_empty() {
            log::warn!("目录文档没有可用条目: {}", toc_path);
        }

        outline
    }

    /// 章节总数(恒等于脊柱长度)
    pub fn chapter_count(&self) -> usize {
        self.toc.nodes.len()
    }

    /// 虚拟章节总数
    pub fn virtual_count(&self) -> usize {
        self.toc.virtuals.len()
    }

    /// 获取章节的原始内容
    ///
    /// # 参数
    /// * `index` - 章节序号(从0开始)
    ///
    /// # 返回值
    /// * `Result<String>` - 章节文件的原始文本
    pub fn get_chapter_content(&self, index: usize) -> Result<String> {
        let path = self.node(index)?.path.clone();
        if path.is_empty() {
            return Err(EpubError::EmptyContent);
        }
        self.read_file(&path)
    }

    /// 获取章节标题
    pub fn get_chapter_title(&self, index: usize) -> Result<String> {
        Ok(self.node(index)?.title.clone())
    }

    /// 获取章节文件在压缩包里的路径
    pub fn chapter_path(&self, index: usize) -> Result<&str> {
        Ok(&self.node(index)?.path)
    }

    /// 根据节点ID查找章节序号
    pub fn chapter_index(&self, id: &str) -> Option<usize> {
        self.toc.chapter_index(id)
    }

    /// 目录节点列表
    pub fn toc_nodes(&self) -> &[TocNode] {
        &self.toc.nodes
    }

    /// 虚拟章节范围列表
    pub fn virtuals(&self) -> &[VirtualContentRange] {
        &self.toc.virtuals
    }

    /// 获取指定的虚拟章节范围
    pub fn get_virtual_range(&self, index: usize) -> Result<&VirtualContentRange> {
        self.toc
            .virtuals
            .get(index)
            .ok_or(EpubError::ChapterIndexOutOfRange {
                index,
                total: self.toc.virtuals.len(),
            })
    }

    /// 获取虚拟章节标题
    pub fn get_virtual_title(&self, index: usize) -> Option<&str> {
        self.toc.virtual_titles.get(index).map(|s| s.as_str())
    }

    /// 书籍元数据
    pub fn metadata(&self) -> &Metadata {
        &self.package.metadata
    }

    /// 包文档
    pub fn package(&self) -> &Opf {
        &self.package
    }

    /// 包根目录
    pub fn root_dir(&self) -> &str {
        &self.root_dir
    }

    /// 读取压缩包中指定文件的文本内容
    ///
    /// 互斥锁保证并发调用时对压缩包的访问串行化。
    pub fn read_file(&self, path: &str) -> Result<String> {
        let mut archive = self
            .archive
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        archive.read_to_string(path)
    }

    fn node(&self, index: usize) -> Result<&TocNode> {
        self.toc
            .nodes
            .get(index)
            .ok_or(EpubError::ChapterIndexOutOfRange {
                index,
                total: self.toc.nodes.len(),
            })
    }
}
