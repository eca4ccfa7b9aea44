//! 目录构建模块
//!
//! 将目录文档解析出的大纲与脊柱顺序合并，产出规范的章节节点列表。
//! 脊柱中没有对应目录条目的文件合成为影子节点；带锚点的目录条目
//! 额外产出虚拟章节范围。

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::epub::opf::{ManifestItem, SpineItem};
use crate::epub::toc::ncx::NavPoint;

/// 目录节点
///
/// 规范章节列表中的一项，与脊柱条目一一对应。
#[derive(Debug, Clone)]
pub struct TocNode {
    /// 进程内唯一ID
    pub id: String,
    /// 父节点ID(空串表示顶层)
    pub parent_id: String,
    /// 标题(影子节点为清单项ID)
    pub title: String,
    /// 内容文件在压缩包内的完整路径
    pub path: String,
    /// 锚点(无则为空串)
    pub fragment: String,
    /// 层级(0为顶层)
    pub level: usize,
    /// 是否有子节点
    pub is_directory: bool,
    /// 是否为影子节点(不来自目录文档)
    pub is_shadow: bool,
}

/// 虚拟章节范围
///
/// 标识一个物理文件内由锚点分隔的子区间。同一文件的相邻区间
/// 按文档顺序排列且不重叠。
#[derive(Debug, Clone)]
pub struct VirtualContentRange {
    /// 物理文件在压缩包内的完整路径
    pub file_path: String,
    /// 起始锚点
    pub start_fragment: String,
    /// 结束锚点(空串表示到文件末尾)
    pub end_fragment: String,
}

/// 目录构建结果
#[derive(Debug, Clone, Default)]
pub struct Toc {
    /// 章节节点列表(与脊柱等长)
    pub nodes: Vec<TocNode>,
    /// 虚拟章节范围(文档顺序)
    pub virtuals: Vec<VirtualContentRange>,
    /// 虚拟章节标题(与virtuals并行)
    pub virtual_titles: Vec<String>,
}

/// 大纲平铺后的中间条目
struct FlatEntry {
    title: String,
    path: String,
    fragment: String,
    level: usize,
    parent: Option<usize>,
    has_children: bool,
}

impl Toc {
    /// 合并大纲与脊柱，构建规范章节列表
    ///
    /// # 参数
    /// * `outline` - 目录文档解析出的大纲(可为空，此时全部合成影子节点)
    /// * `spine` - 脊柱条目
    /// * `manifest` - 清单映射
    /// * `root_dir` - 包根目录(含结尾斜杠，顶层为空串)
    ///
    /// # 返回值
    /// * `Toc` - 构建结果，节点数恒等于脊柱长度
    pub fn build(
        outline: &[NavPoint],
        spine: &[SpineItem],
        manifest: &HashMap<String, ManifestItem>,
        root_dir: &str,
    ) -> Toc {
        let mut flat = Vec::new();
        flatten_outline(outline, 0, None, root_dir, &mut flat);

        let mut nodes = Vec::with_capacity(spine.len());
        let mut node_flat: Vec<Option<usize>> = Vec::with_capacity(spine.len());
        let mut flat_to_node: HashMap<usize, usize> = HashMap::new();

        for (index, spine_item) in spine.iter().enumerate() {
            let id = format!("toc-{}", index);
            let path = manifest
                .get(&spine_item.idref)
                .map(|item| resolve_path(&item.href, root_dir))
                .unwrap_or_default();

            let matched = if path.is_empty() {
                None
            } else {
                flat.iter().position(|entry| entry.path == path)
            };

            match matched {
                Some(flat_index) => {
                    let entry = &flat[flat_index];
                    flat_to_node.entry(flat_index).or_insert(index);
                    node_flat.push(Some(flat_index));
                    nodes.push(TocNode {
                        id,
                        parent_id: String::new(),
                        title: entry.title.clone(),
                        path,
                        fragment: entry.fragment.clone(),
                        level: entry.level,
                        is_directory: entry.has_children,
                        is_shadow: false,
                    });
                }
                None => {
                    node_flat.push(None);
                    nodes.push(TocNode {
                        id,
                        parent_id: String::new(),
                        title: spine_item.idref.clone(),
                        path,
                        fragment: String::new(),
                        level: 0,
                        is_directory: false,
                        is_shadow: true,
                    });
                }
            }
        }

        // 父节点回填: 沿大纲祖先链找最近一个落入列表的节点。
        // 目录条目指向的文件不一定都在脊柱中，跳过未物化的祖先
        // 保证parent_id总是指向列表内的节点。
        for node_index in 0..nodes.len() {
            let flat_index = match node_flat[node_index] {
                Some(fi) => fi,
                None => continue,
            };

            let mut ancestor = flat[flat_index].parent;
            while let Some(parent_flat) = ancestor {
                if let Some(&parent_node) = flat_to_node.get(&parent_flat) {
                    let parent_id = nodes[parent_node].id.clone();
                    nodes[node_index].parent_id = parent_id;
                    break;
                }
                ancestor = flat[parent_flat].parent;
            }
        }

        // 虚拟章节范围: 带锚点的大纲条目按文档顺序收集
        let content_paths: Vec<String> = nodes.iter().map(|node| node.path.clone()).collect();
        let mut virtuals = Vec::new();
        let mut virtual_titles = Vec::new();

        for entry in flat.iter().filter(|entry| !entry.fragment.is_empty()) {
            let located = match locate_content(&content_paths, &entry.path) {
                Some(index) => content_paths[index].clone(),
                None => continue,
            };

            virtuals.push(VirtualContentRange {
                file_path: located,
                start_fragment: entry.fragment.clone(),
                end_fragment: String::new(),
            });
            virtual_titles.push(entry.title.clone());
        }

        // 同一文件内相邻区间的结束锚点取下一区间的起始锚点
        for i in 0..virtuals.len() {
            if i + 1 < virtuals.len() && virtuals[i + 1].file_path == virtuals[i].file_path {
                let next_start = virtuals[i + 1].start_fragment.clone();
                virtuals[i].end_fragment = next_start;
            }
        }

        Toc {
            nodes,
            virtuals,
            virtual_titles,
        }
    }

    /// 根据节点ID查找章节序号
    pub fn chapter_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }
}

/// 深度优先平铺大纲，记录层级与父条目序号
fn flatten_outline(
    points: &[NavPoint],
    level: usize,
    parent: Option<usize>,
    root_dir: &str,
    out: &mut Vec<FlatEntry>,
) {
    for point in points {
        let (path, fragment) = split_src(&point.src, root_dir);
        let index = out.len();
        out.push(FlatEntry {
            title: point.title.clone(),
            path,
            fragment,
            level,
            parent,
            has_children: !point.children.is_empty(),
        });
        flatten_outline(&point.children, level + 1, Some(index), root_dir, out);
    }
}

/// 拆分目录条目地址为(完整路径, 锚点)
///
/// 地址先做百分号解码，再在第一个#处拆分，路径部分以根目录为基准解析。
fn split_src(src: &str, root_dir: &str) -> (String, String) {
    let decoded = percent_decode_str(src).decode_utf8_lossy().to_string();

    let (path_part, fragment) = match decoded.split_once('#') {
        Some((path, fragment)) => (path, fragment),
        None => (decoded.as_str(), ""),
    };

    (resolve_path(path_part, root_dir), fragment.to_string())
}

/// 以根目录为基准解析相对路径
pub(crate) fn resolve_path(href: &str, root_dir: &str) -> String {
    let decoded = percent_decode_str(href).decode_utf8_lossy().to_string();
    let trimmed = decoded.trim_start_matches("./");
    format!("{}{}", root_dir, trimmed)
}

/// 在内容列表中定位目标文件
///
/// 先做精确后缀匹配，失败后按文件名互相包含做模糊匹配。
fn locate_content(contents: &[String], file_path: &str) -> Option<usize> {
    if let Some(index) = contents
        .iter()
        .position(|content| content == file_path || content.ends_with(file_path))
    {
        return Some(index);
    }

    let base = base_name(file_path);
    if base.is_empty() {
        return None;
    }

    contents.iter().position(|content| {
        let content_base = base_name(content);
        !content_base.is_empty() && (content_base.contains(base) || base.contains(content_base))
    })
}

fn base_name(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(base) => base,
        None => path,
    }
}
