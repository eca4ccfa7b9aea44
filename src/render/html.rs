//! HTML渲染模块
//!
//! 以标签驱动的访问器遍历DOM，产出带角色标注的文本行序列
//! 和图片引用列表。格式上下文按嵌套层级入栈，子元素继承
//! 父级的全部标志。

use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html};

/// 文本行的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// 普通正文
    Plain,
    /// 标题
    Heading,
    /// 缩进引文
    Indented,
    /// 列表项
    Bullet,
    /// 预格式化文本
    Preformatted,
    /// 代码
    Code,
}

/// 带角色标注的一行文本
#[derive(Debug, Clone, PartialEq)]
pub struct ContentLine {
    pub text: String,
    pub role: LineRole,
}

/// 渲染结果
///
/// 行序列与图片引用列表。行内的`[IMG:n]`占位符以从0开始的
/// 序号对应images中的路径。
#[derive(Debug, Clone, Default)]
pub struct RenderedDocument {
    pub lines: Vec<ContentLine>,
    pub images: Vec<String>,
}

impl RenderedDocument {
    /// 所有行拼接成的纯文本
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 渲染HTML文档
///
/// # 参数
/// * `html` - 章节文件的原始内容
///
/// # 返回值
/// * `RenderedDocument` - 行序列与图片引用列表
pub fn render_document(html: &str) -> RenderedDocument {
    let document = Html::parse_document(html);
    let mut renderer = Renderer::new();
    renderer.render_element(document.root_element());
    renderer.finish()
}

/// 某一嵌套层级生效的格式上下文
#[derive(Debug, Clone, Copy, Default)]
struct Context {
    heading: bool,
    indented: bool,
    preformatted: bool,
    bullet: bool,
    code: bool,
    hidden: bool,
}

struct Renderer {
    lines: Vec<ContentLine>,
    images: Vec<String>,
    current: String,
    current_flags: Context,
    stack: Vec<Context>,
}

impl Renderer {
    fn new() -> Renderer {
        Renderer {
            lines: Vec::new(),
            images: Vec::new(),
            current: String::new(),
            current_flags: Context::default(),
            stack: vec![Context::default()],
        }
    }

    fn context(&self) -> Context {
        self.stack.last().copied().unwrap_or_default()
    }

    fn render_element(&mut self, element: ElementRef) {
        let tag = element.value().name();

        match tag {
            "img" | "image" => {
                self.append_image(element);
                return;
            }
            "br" => {
                self.break_line();
                return;
            }
            _ => {}
        }

        let mut ctx = self.context();
        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => ctx.heading = true,
            "q" | "dt" | "dd" | "blockquote" => ctx.indented = true,
            // pre块一律按代码处理
            "pre" => {
                ctx.preformatted = true;
                ctx.code = true;
            }
            "li" => ctx.bullet = true,
            "script" | "style" | "head" => ctx.hidden = true,
            "sup" => self.append_marker("^{"),
            "sub" => self.append_marker("_{"),
            _ => {}
        }
        self.stack.push(ctx);

        for node in element.children() {
            match node.value() {
                scraper::node::Node::Text(text) => self.append_text(text),
                scraper::node::Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(node) {
                        self.render_element(child);
                    }
                }
                _ => {}
            }
        }

        self.stack.pop();
        self.exit_tag(tag);
    }

    fn exit_tag(&mut self, tag: &str) {
        match tag {
            // 标题后空两行，段落后空一行
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush();
                self.blank();
                self.blank();
            }
            "p" | "div" => {
                self.flush();
                self.blank();
            }
            "q" | "dt" | "dd" | "blockquote" | "pre" | "li" => {
                self.flush();
                if self.last_line_nonempty() {
                    self.blank();
                }
            }
            "sup" | "sub" => self.append_marker("}"),
            _ => {}
        }
    }

    fn append_text(&mut self, text: &str) {
        let ctx = self.context();
        if ctx.hidden {
            return;
        }

        let chunk = if ctx.preformatted {
            text.to_string()
        } else {
            collapse_whitespace(text)
        };

        let chunk = if self.current.is_empty() {
            chunk.trim_start().to_string()
        } else {
            chunk
        };

        if chunk.is_empty() {
            return;
        }

        self.current.push_str(&chunk);
        self.merge_flags(ctx);
    }

    fn append_marker(&mut self, marker: &str) {
        let ctx = self.context();
        if ctx.hidden {
            return;
        }
        self.current.push_str(marker);
        self.merge_flags(ctx);
    }

    fn append_image(&mut self, element: ElementRef) {
        let ctx = self.context();
        if ctx.hidden {
            return;
        }

        let src = match element
            .value()
            .attr("src")
            .or_else(|| element.value().attr("href"))
        {
            Some(src) if !src.is_empty() => src,
            _ => return,
        };

        let decoded = percent_decode_str(src).decode_utf8_lossy().to_string();
        let index = self.images.len();

        let placeholder = match element.value().attr("alt") {
            Some(alt) if !alt.trim().is_empty() => format!("[IMG:{} - {}]", index, alt.trim()),
            _ => format!("[IMG:{}]", index),
        };

        self.current.push_str(&placeholder);
        self.merge_flags(ctx);
        self.images.push(decoded);
    }

    fn break_line(&mut self) {
        if self.current.is_empty() {
            self.blank();
        } else {
            self.flush();
        }
    }

    fn merge_flags(&mut self, ctx: Context) {
        self.current_flags.heading |= ctx.heading;
        self.current_flags.indented |= ctx.indented;
        self.current_flags.preformatted |= ctx.preformatted;
        self.current_flags.bullet |= ctx.bullet;
        self.current_flags.code |= ctx.code;
    }

    /// 结束当前行
    ///
    /// 行为空时什么都不做。角色按优先级取:
    /// 标题 > 列表 > 缩进 > 预格式化(代码)。
    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }

        let flags = self.current_flags;
        let mut text = std::mem::take(&mut self.current);
        self.current_flags = Context::default();

        if !flags.preformatted {
            text.truncate(text.trim_end().len());
            if text.is_empty() {
                return;
            }
        }

        let role = if flags.heading {
            LineRole::Heading
        } else if flags.bullet {
            LineRole::Bullet
        } else if flags.indented {
            LineRole::Indented
        } else if flags.preformatted && flags.code {
            LineRole::Code
        } else if flags.preformatted {
            LineRole::Preformatted
        } else {
            LineRole::Plain
        };

        self.lines.push(ContentLine { text, role });
    }

    fn blank(&mut self) {
        self.lines.push(ContentLine {
            text: String::new(),
            role: LineRole::Plain,
        });
    }

    fn last_line_nonempty(&self) -> bool {
        self.lines
            .last()
            .map(|line| !line.text.is_empty())
            .unwrap_or(false)
    }

    fn finish(mut self) -> RenderedDocument {
        self.flush();
        while self
            .lines
            .last()
            .map(|line| line.text.is_empty())
            .unwrap_or(false)
        {
            self.lines.pop();
        }

        RenderedDocument {
            lines: self.lines,
            images: self.images,
        }
    }
}

/// 把连续空白压成单个空格，保留首尾边界上的空格
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(ch);
            in_space = false;
        }
    }

    out
}
