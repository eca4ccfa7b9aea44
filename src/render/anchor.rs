//! 锚点定位模块
//!
//! 从章节文件中截取两个锚点之间的片段，供虚拟章节使用。
//! 先在原始文本上做快速扫描，属性写法不规范时再退回DOM查找。

use scraper::{ElementRef, Html};

use crate::error::{EpubError, Result};

/// 截取起止锚点之间的内容
///
/// 起始锚点所在的标签包含在结果中，结束锚点所在的标签不包含。
/// 结束锚点为空或找不到时截取到文件末尾。
///
/// # 参数
/// * `content` - 章节文件的原始内容
/// * `start` - 起始锚点
/// * `end` - 结束锚点(空串表示到文件末尾)
///
/// # 返回值
/// * `Result<String>` - 截取出的HTML片段
pub fn extract_between_anchors(content: &str, start: &str, end: &str) -> Result<String> {
    if content.trim().is_empty() {
        return Err(EpubError::EmptyContent);
    }
    if start.is_empty() {
        return Err(EpubError::AnchorNotFound(start.to_string()));
    }

    if let Some(extracted) = scan_extract(content, start, end) {
        return Ok(extracted);
    }

    dom_extract(content, start, end)
}

/// 在原始文本中查找锚点属性的位置
///
/// 依次尝试双引号和单引号的id与name写法，返回最靠前的匹配。
fn find_anchor(content: &str, fragment: &str) -> Option<usize> {
    let patterns = [
        format!("id=\"{}\"", fragment),
        format!("id='{}'", fragment),
        format!("name=\"{}\"", fragment),
        format!("name='{}'", fragment),
    ];

    patterns
        .iter()
        .filter_map(|pattern| content.find(pattern.as_str()))
        .min()
}

/// 快速路径: 直接在原始文本上截取
///
/// 从起始锚点所在标签的`<`截到结束锚点所在标签的`<`之前。
/// 找不到锚点或截取结果只有空白时返回None，交给DOM路径。
fn scan_extract(content: &str, start: &str, end: &str) -> Option<String> {
    let anchor_pos = find_anchor(content, start)?;
    let start_tag = content[..anchor_pos].rfind('<')?;
    let tag_close = anchor_pos + content[anchor_pos..].find('>')? + 1;

    let end_pos = if end.is_empty() {
        content.len()
    } else {
        match find_anchor(&content[tag_close..], end) {
            Some(offset) => match content[tag_close..tag_close + offset].rfind('<') {
                Some(lt) => tag_close + lt,
                None => content.len(),
            },
            None => content.len(),
        }
    };

    let slice = &content[start_tag..end_pos];
    if slice.trim().is_empty() {
        return None;
    }

    Some(slice.to_string())
}

struct Capture<'a> {
    start: &'a str,
    end: &'a str,
    capturing: bool,
    done: bool,
    parts: Vec<String>,
}

/// DOM路径: 解析后按文档顺序查找锚点元素
///
/// 命中起始锚点后整块采集后续元素，遇到携带结束锚点的元素停止。
fn dom_extract(content: &str, start: &str, end: &str) -> Result<String> {
    let document = Html::parse_document(content);
    let mut capture = Capture {
        start,
        end,
        capturing: false,
        done: false,
        parts: Vec::new(),
    };

    walk(document.root_element(), &mut capture);

    if !capture.capturing {
        return Err(EpubError::AnchorNotFound(start.to_string()));
    }

    let extracted = capture.parts.join("\n");
    if extracted.trim().is_empty() {
        return Err(EpubError::EmptyContent);
    }

    Ok(extracted)
}

fn walk(element: ElementRef, capture: &mut Capture) {
    for node in element.children() {
        if capture.done {
            return;
        }

        match node.value() {
            scraper::node::Node::Element(_) => {
                let child = match ElementRef::wrap(node) {
                    Some(child) => child,
                    None => continue,
                };
                let anchor = child
                    .value()
                    .attr("id")
                    .or_else(|| child.value().attr("name"));

                if capture.capturing {
                    if !capture.end.is_empty() && anchor == Some(capture.end) {
                        capture.done = true;
                        return;
                    }
                    // 整棵子树一并采集，不再下钻
                    capture.parts.push(child.html());
                } else if anchor == Some(capture.start) {
                    capture.capturing = true;
                    capture.parts.push(child.html());
                } else {
                    walk(child, capture);
                }
            }
            scraper::node::Node::Text(text) => {
                if capture.capturing {
                    capture.parts.push(text.to_string());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAPTER: &str = r#"<html><body>
<h2 id="a">第一节</h2>
<p>第一节正文</p>
<h2 id="b">第二节</h2>
<p>第二节正文</p>
</body></html>"#;

    #[test]
    fn test_extract_between_two_anchors() {
        let extracted = extract_between_anchors(CHAPTER, "a", "b").unwrap();

        assert!(extracted.contains("第一节"));
        assert!(extracted.contains("第一节正文"));
        assert!(!extracted.contains("第二节正文"));
    }

    #[test]
    fn test_extract_to_end_of_file() {
        let extracted = extract_between_anchors(CHAPTER, "b", "").unwrap();

        assert!(extracted.contains("第二节"));
        assert!(extracted.contains("第二节正文"));
        assert!(!extracted.contains("第一节正文"));
    }

    #[test]
    fn test_range_with_end_is_prefix_of_open_range() {
        // 带结束锚点的截取是开区间截取的前缀
        let bounded = extract_between_anchors(CHAPTER, "a", "b").unwrap();
        let open = extract_between_anchors(CHAPTER, "a", "").unwrap();

        assert!(open.starts_with(&bounded));
        assert!(open.len() > bounded.len());
    }

    #[test]
    fn test_missing_end_anchor_extends_to_end() {
        let extracted = extract_between_anchors(CHAPTER, "a", "nothing").unwrap();

        assert!(extracted.contains("第一节正文"));
        assert!(extracted.contains("第二节正文"));
    }

    #[test]
    fn test_single_quote_and_name_attribute() {
        let content = r#"<body><a name='x'></a><p>锚点后内容</p><a name='y'></a><p>之外</p></body>"#;
        let extracted = extract_between_anchors(content, "x", "y").unwrap();

        assert!(extracted.contains("锚点后内容"));
        assert!(!extracted.contains("之外"));
    }

    #[test]
    fn test_anchor_not_found() {
        let result = extract_between_anchors(CHAPTER, "zzz", "");

        match result {
            Err(EpubError::AnchorNotFound(name)) => assert_eq!(name, "zzz"),
            other => panic!("期望AnchorNotFound, 得到: {:?}", other),
        }
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(
            extract_between_anchors("", "a", ""),
            Err(EpubError::EmptyContent)
        ));
        assert!(matches!(
            extract_between_anchors("  \n  ", "a", ""),
            Err(EpubError::EmptyContent)
        ));
    }

    #[test]
    fn test_empty_start_anchor() {
        assert!(matches!(
            extract_between_anchors(CHAPTER, "", ""),
            Err(EpubError::AnchorNotFound(_))
        ));
    }

    #[test]
    fn test_dom_fallback_for_spaced_attribute() {
        // 属性等号两侧带空格，快速扫描匹配不上，退回DOM查找
        let content = r#"<html><body><div id = "a"><p>目标内容</p></div><div id = "b"><p>区间外</p></div></body></html>"#;
        let extracted = extract_between_anchors(content, "a", "b").unwrap();

        assert!(extracted.contains("目标内容"));
        assert!(!extracted.contains("区间外"));
    }
}
