//! EPUB3导航文档解析模块
//!
//! 导航文档是HTML格式的目录。这里只读取第一个nav元素下的
//! 锚点平铺列表，不展开嵌套列表层级(NCX路径支持完整嵌套)。

use scraper::{Html, Selector};

use crate::epub::toc::ncx::NavPoint;

/// 解析EPUB3导航文档
///
/// # 参数
/// * `html_content` - 导航文档的HTML内容
///
/// # 返回值
/// * `Vec<NavPoint>` - 平铺的顶层导航点列表，找不到nav元素时为空
pub fn parse_nav_doc(html_content: &str) -> Vec<NavPoint> {
    let document = Html::parse_document(html_content);
    let nav_selector = Selector::parse("nav").unwrap();
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let mut entries = Vec::new();

    if let Some(nav) = document.select(&nav_selector).next() {
        for anchor in nav.select(&anchor_selector) {
            let href = anchor.value().attr("href").unwrap_or("").to_string();
            if href.is_empty() {
                continue;
            }

            let title = anchor
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");

            entries.push(NavPoint::new(title, href));
        }
    }

    entries
}
