//! 排版模块
//!
//! 按角色把文本行排版到目标宽度: 标题居中、引文和列表缩进、
//! 代码先着色再折行。宽度与长度一律按字节计。

use crate::render::highlight::{highlight_code, visible_length};
use crate::render::html::{ContentLine, LineRole};

/// 把行序列排版到目标宽度
///
/// 宽度为0时原样返回。非空行排版后跟一个空行作为分隔，
/// 输入中的空行不再额外产出，因此对已排版的窄文本重复
/// 调用会得到相同结果。
///
/// # 参数
/// * `lines` - 渲染产出的行序列
/// * `width` - 目标宽度(字节)
///
/// # 返回值
/// * `Vec<String>` - 排版后的行
pub fn format_lines(lines: &[ContentLine], width: usize) -> Vec<String> {
    if width == 0 {
        return lines.iter().map(|line| line.text.clone()).collect();
    }

    let mut formatted = Vec::new();

    for line in lines {
        if line.text.is_empty() {
            continue;
        }

        match line.role {
            LineRole::Heading => {
                let padding = (width / 2).saturating_sub(line.text.len() / 2);
                formatted.push(format!("{}{}", " ".repeat(padding), line.text));
            }
            LineRole::Indented => {
                for wrapped in wrap_words(&line.text, width.saturating_sub(3)) {
                    formatted.push(format!("   {}", wrapped));
                }
            }
            LineRole::Bullet => {
                formatted.extend(format_bullet(&line.text, width.saturating_sub(3)));
            }
            LineRole::Preformatted => {
                // 预格式化行内嵌的换行是硬换行
                for sub in line.text.split('\n') {
                    for wrapped in wrap_words(sub, width.saturating_sub(6)) {
                        formatted.push(format!("   {}", wrapped));
                    }
                }
            }
            LineRole::Code => {
                for sub in line.text.split('\n') {
                    let highlighted = highlight_code(sub);
                    for wrapped in wrap_code_words(&highlighted, width.saturating_sub(6)) {
                        formatted.push(format!("   {}", wrapped));
                    }
                }
            }
            LineRole::Plain => {
                formatted.extend(wrap_words(&line.text, width));
            }
        }

        formatted.push(String::new());
    }

    formatted
}

/// 贪心按词折行
///
/// 当前行长度加词长加一个空格不超过限制时继续累积，
/// 超出时另起一行。超长的词不截断，整词溢出。
fn wrap_words(text: &str, limit: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 <= limit {
            if current.is_empty() {
                current = word.to_string();
            } else {
                current.push(' ');
                current.push_str(word);
            }
        } else {
            result.push(current);
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        result.push(current);
    }

    result
}

/// 列表项折行
///
/// 首行前缀" - "，续行前缀"   "，前缀计入宽度限制。
fn format_bullet(text: &str, limit: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();

    for (i, word) in text.split_whitespace().enumerate() {
        if i == 0 {
            current = format!(" - {}", word);
        } else if current.len() + word.len() + 1 <= limit {
            current.push(' ');
            current.push_str(word);
        } else {
            result.push(current);
            current = format!("   {}", word);
        }
    }

    if !current.is_empty() {
        result.push(current);
    }

    result
}

/// 代码行折行，长度按去除颜色标记后的可见字节数比较
fn wrap_code_words(text: &str, limit: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if visible_length(&current) + visible_length(word) + 1 <= limit {
            if current.is_empty() {
                current = word.to_string();
            } else {
                current.push(' ');
                current.push_str(word);
            }
        } else {
            result.push(current);
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        result.push(current);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> ContentLine {
        ContentLine {
            text: text.to_string(),
            role: LineRole::Plain,
        }
    }

    fn line(text: &str, role: LineRole) -> ContentLine {
        ContentLine {
            text: text.to_string(),
            role,
        }
    }

    #[test]
    fn test_width_zero_returns_unchanged() {
        let lines = vec![plain("第一段"), plain(""), plain("第二段")];
        let formatted = format_lines(&lines, 0);

        assert_eq!(formatted, vec!["第一段", "", "第二段"]);
    }

    #[test]
    fn test_heading_centered_by_half_width() {
        // 20列宽度下11字节的标题左侧补5个空格
        let lines = vec![line("Chapter One", LineRole::Heading)];
        let formatted = format_lines(&lines, 20);

        assert_eq!(formatted[0], "     Chapter One");
        assert_eq!(formatted[1], "");
    }

    #[test]
    fn test_heading_wider_than_width_gets_no_padding() {
        let lines = vec![line("A Very Long Chapter Title", LineRole::Heading)];
        let formatted = format_lines(&lines, 10);

        assert_eq!(formatted[0], "A Very Long Chapter Title");
    }

    #[test]
    fn test_plain_greedy_wrap() {
        let lines = vec![plain("aaa bbb ccc ddd")];
        let formatted = format_lines(&lines, 7);

        assert_eq!(formatted, vec!["aaa bbb", "ccc ddd", ""]);
    }

    #[test]
    fn test_format_is_idempotent_for_narrow_text() {
        let lines = vec![plain("短句甲"), plain(""), plain("短句乙")];
        let once = format_lines(&lines, 40);

        let as_input: Vec<ContentLine> = once.iter().map(|text| plain(text)).collect();
        let twice = format_lines(&as_input, 40);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_indented_prefix_and_margin() {
        let lines = vec![line("引文 内容", LineRole::Indented)];
        let formatted = format_lines(&lines, 30);

        assert_eq!(formatted[0], "   引文 内容");
        assert_eq!(formatted[1], "");
    }

    #[test]
    fn test_bullet_first_line_and_continuations() {
        let lines = vec![line("one two three four five", LineRole::Bullet)];
        let formatted = format_lines(&lines, 13);

        assert_eq!(
            formatted,
            vec![" - one two", "   three", "   four", "   five", ""]
        );
    }

    #[test]
    fn test_preformatted_embedded_newlines_are_hard_breaks() {
        let lines = vec![line("alpha beta\ngamma", LineRole::Preformatted)];
        let formatted = format_lines(&lines, 20);

        assert_eq!(formatted, vec!["   alpha beta", "   gamma", ""]);
    }

    #[test]
    fn test_code_highlighted_then_wrapped() {
        let lines = vec![line("let x = 42", LineRole::Code)];
        let formatted = format_lines(&lines, 40);

        assert!(formatted[0].starts_with("   "));
        assert!(formatted[0].contains("[#00FFFF]let[-]"));
        assert!(formatted[0].contains("[#FF8800]42[-]"));
    }

    #[test]
    fn test_code_wrap_measures_visible_length() {
        // 两个6位数字带颜色标记后原始长度远超限制，
        // 但可见长度合格，各占一行
        let lines = vec![line("999999 888888", LineRole::Code)];
        let formatted = format_lines(&lines, 14);

        assert_eq!(formatted.len(), 3);
        assert!(formatted[0].contains("[#FF8800]999999[-]"));
        assert!(formatted[1].contains("[#FF8800]888888[-]"));
        assert_eq!(formatted[2], "");
    }

    #[test]
    fn test_empty_input_lines_are_dropped() {
        let lines = vec![plain("甲"), plain(""), plain(""), plain("乙")];
        let formatted = format_lines(&lines, 40);

        assert_eq!(formatted, vec!["甲", "", "乙", ""]);
    }

    #[test]
    fn test_overlong_word_overflows_without_split() {
        let lines = vec![plain("超级无敌长的一个词")];
        let formatted = format_lines(&lines, 5);

        // 整词溢出，折行前产出一个空行
        assert_eq!(formatted[0], "");
        assert_eq!(formatted[1], "超级无敌长的一个词");
    }
}
