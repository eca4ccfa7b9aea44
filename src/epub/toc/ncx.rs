//! NCX解析模块
//!
//! 提供NCX（Navigation Control file for XML）目录文档的解析功能。
//! navMap中的navPoint可以任意嵌套，解析结果保持文档顺序。

use crate::error::{EpubError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// NCX导航点
///
/// 一个导航点对应目录中的一个条目，子导航点构成嵌套目录。
#[derive(Debug, Clone)]
pub struct NavPoint {
    /// 导航标签文本
    pub title: String,
    /// 目标地址(可带#锚点)
    pub src: String,
    /// 子导航点
    pub children: Vec<NavPoint>,
}

impl NavPoint {
    /// 创建新的导航点
    pub fn new(title: String, src: String) -> Self {
        Self {
            title,
            src,
            children: Vec::new(),
        }
    }

    /// 添加子导航点
    pub fn add_child(&mut self, child: NavPoint) {
        self.children.push(child);
    }
}

/// 解析NCX文档的navMap
///
/// # 参数
/// * `xml_content` - NCX文档的XML内容
///
/// # 返回值
/// * `Result<Vec<NavPoint>>` - 顶层导航点列表(嵌套结构)
pub fn parse_ncx(xml_content: &str) -> Result<Vec<NavPoint>> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);
    reader.config_mut().expand_empty_elements = true;

    let mut roots = Vec::new();
    let mut buf = Vec::new();
    let mut text_content = String::new();
    let mut in_nav_map = false;
    let mut in_nav_label = false;

    // 嵌套navPoint的解析栈: 遇到新navPoint时当前节点入栈，
    // 结束时出栈挂接为子节点
    let mut nav_point_stack: Vec<NavPoint> = Vec::new();
    let mut current_nav_point: Option<NavPoint> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"navMap" => {
                    in_nav_map = true;
                }
                b"navPoint" if in_nav_map => {
                    if let Some(nav_point) = current_nav_point.take() {
                        nav_point_stack.push(nav_point);
                    }
                    current_nav_point = Some(NavPoint::new(String::new(), String::new()));
                }
                b"navLabel" if in_nav_map => {
                    in_nav_label = true;
                }
                b"text" if in_nav_label => {
                    text_content.clear();
                }
                b"content" if in_nav_map => {
                    let src = parse_content_src(e)?;
                    if let Some(ref mut nav_point) = current_nav_point {
                        nav_point.src = src;
                    }
                }
                _ => {}
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"navMap" => {
                    in_nav_map = false;
                }
                b"text" if in_nav_label => {
                    if let Some(ref mut nav_point) = current_nav_point {
                        nav_point.title = text_content.trim().to_string();
                    }
                }
                b"navLabel" => {
                    in_nav_label = false;
                }
                b"navPoint" if in_nav_map => {
                    if let Some(nav_point) = current_nav_point.take() {
                        if let Some(mut parent) = nav_point_stack.pop() {
                            parent.add_child(nav_point);
                            current_nav_point = Some(parent);
                        } else {
                            roots.push(nav_point);
                        }
                    }
                }
                _ => {}
            },
            Event::Text(e) => {
                text_content.push_str(&e.unescape()?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(roots)
}

/// 解析content元素的src属性
fn parse_content_src(e: &quick_xml::events::BytesStart) -> Result<String> {
    for attr_result in e.attributes() {
        let attr =
            attr_result.map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
        if attr.key.local_name().as_ref() == b"src" {
            return Ok(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_ncx() {
        let ncx_xml = r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
<head>
<meta name="dtb:uid" content="test-uid"/>
</head>
<docTitle><text>测试书籍</text></docTitle>
<navMap>
<navPoint id="np1" playOrder="1">
<navLabel><text>第一章</text></navLabel>
<content src="chapter1.xhtml"/>
</navPoint>
<navPoint id="np2" playOrder="2">
<navLabel><text>第二章</text></navLabel>
<content src="chapter2.xhtml"/>
</navPoint>
</navMap>
</ncx>"#;

        let roots = parse_ncx(ncx_xml).unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].title, "第一章");
        assert_eq!(roots[0].src, "chapter1.xhtml");
        assert!(roots[0].children.is_empty());
        assert_eq!(roots[1].title, "第二章");
    }

    #[test]
    fn test_parse_nested_ncx() {
        let ncx_xml = r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
<navMap>
<navPoint id="np1">
<navLabel><text>第一部</text></navLabel>
<content src="part1.xhtml"/>
<navPoint id="np2">
<navLabel><text>第一章</text></navLabel>
<content src="chapter1.xhtml"/>
<navPoint id="np3">
<navLabel><text>第一节</text></navLabel>
<content src="chapter1.xhtml#section1"/>
</navPoint>
</navPoint>
</navPoint>
</navMap>
</ncx>"#;

        let roots = parse_ncx(ncx_xml).unwrap();
        assert_eq!(roots.len(), 1);

        let part = &roots[0];
        assert_eq!(part.title, "第一部");
        assert_eq!(part.children.len(), 1);

        let chapter = &part.children[0];
        assert_eq!(chapter.title, "第一章");
        assert_eq!(chapter.children.len(), 1);

        let section = &chapter.children[0];
        assert_eq!(section.title, "第一节");
        assert_eq!(section.src, "chapter1.xhtml#section1");
        assert!(section.children.is_empty());
    }

    #[test]
    fn test_doc_title_does_not_leak_into_nav_points() {
        let ncx_xml = r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
<docTitle><text>书名不应出现</text></docTitle>
<navMap>
<navPoint id="np1">
<navLabel><text>章节标题</text></navLabel>
<content src="chapter1.xhtml"/>
</navPoint>
</navMap>
</ncx>"#;

        let roots = parse_ncx(ncx_xml).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].title, "章节标题");
    }

    #[test]
    fn test_parse_empty_nav_map() {
        let ncx_xml = r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
<navMap></navMap>
</ncx>"#;

        let roots = parse_ncx(ncx_xml).unwrap();
        assert!(roots.is_empty());
    }
}
