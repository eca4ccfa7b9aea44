//! 代码高亮模块
//!
//! 对标注为代码的行做统一的词法着色。单趟正则切分出字符串、
//! 注释、数字、标识符等记号，再按关键字表分类包裹颜色标记。
//! 不区分语言，所有代码块走同一套分类器。

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

const COLOR_STRING: &str = "#FFFF00";
const COLOR_COMMENT: &str = "#00FF00";
const COLOR_NUMBER: &str = "#FF8800";
const COLOR_SQL: &str = "#FF00AA";
const COLOR_DATA_TYPE: &str = "#00FFFF";
const COLOR_CONTROL_FLOW: &str = "#FF00FF";
const COLOR_KEYWORD: &str = "#0088FF";

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"("[^"]*")|('[^']*')|(`[^`]*`)|(//.*)|(#.*)|(--.*)|([0-9.]+)|([a-zA-Z_][a-zA-Z0-9_]*)|(\S)|\s+"#,
    )
    .unwrap()
});

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").unwrap());

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

static DATA_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "int", "float", "double", "char", "string", "bool", "boolean", "byte", "long", "short",
        "void", "var", "let", "const", "auto", "static", "final", "unsigned", "signed", "uint",
        "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64", "float32",
        "float64", "object", "array", "map", "set", "list", "vector", "dict", "tuple", "struct",
        "class", "interface", "enum", "union", "type",
    ]
    .into_iter()
    .collect()
});

static CONTROL_FLOW: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "if", "else", "elif", "switch", "case", "default", "for", "while", "do", "foreach", "in",
        "of", "break", "continue", "return", "yield", "goto", "try", "catch", "except", "finally",
        "throw", "throws", "raise",
    ]
    .into_iter()
    .collect()
});

static OTHER_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "function", "func", "def", "fn", "method", "import", "include", "require", "from",
        "export", "package", "namespace", "module", "using", "extends", "implements", "override",
        "virtual", "abstract", "public", "private", "protected", "internal", "async", "await",
        "new", "delete", "this", "self", "super", "base", "null", "nil", "None", "true", "false",
        "True", "False", "and", "or", "not", "instanceof", "typeof", "sizeof", "lambda",
    ]
    .into_iter()
    .collect()
});

static SQL_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // 命令
        "SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "ALTER", "DROP", "TRUNCATE", "GRANT",
        "REVOKE", "COMMIT", "ROLLBACK", "SAVEPOINT", "SET",
        // 子句
        "FROM", "WHERE", "GROUP", "HAVING", "ORDER", "BY", "LIMIT", "OFFSET", "JOIN", "INNER",
        "OUTER", "LEFT", "RIGHT", "FULL", "ON", "AS", "UNION", "ALL", "INTO", "VALUES",
        "DISTINCT", "CASE", "WHEN", "THEN", "ELSE", "END", "WITH", "RECURSIVE",
        // 函数
        "COUNT", "SUM", "AVG", "MIN", "MAX", "COALESCE", "NULLIF", "CAST", "CONVERT",
        "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "EXTRACT", "SUBSTRING", "CONCAT",
        "TRIM", "UPPER", "LOWER", "LENGTH", "ROUND",
        // 数据类型
        "INT", "INTEGER", "SMALLINT", "BIGINT", "DECIMAL", "NUMERIC", "FLOAT", "REAL", "DOUBLE",
        "PRECISION", "CHAR", "VARCHAR", "TEXT", "DATE", "TIME", "TIMESTAMP", "BOOLEAN", "BLOB",
        "CLOB", "BINARY",
        // 约束
        "PRIMARY", "KEY", "FOREIGN", "UNIQUE", "NOT", "NULL", "CHECK", "DEFAULT",
        "AUTO_INCREMENT", "IDENTITY", "REFERENCES", "CASCADE", "RESTRICT", "NO", "ACTION",
        // 运算符
        "AND", "OR", "IN", "BETWEEN", "LIKE", "IS", "EXISTS", "ANY", "SOME", "INTERSECT",
        "EXCEPT", "MINUS",
        // 事务控制
        "BEGIN", "TRANSACTION", "ISOLATION", "LEVEL", "READ", "WRITE", "UNCOMMITTED", "COMMITTED",
        "REPEATABLE", "SERIALIZABLE",
        // 数据库对象
        "TABLE", "VIEW", "INDEX", "SEQUENCE", "TRIGGER", "PROCEDURE", "FUNCTION", "SCHEMA",
        "DATABASE", "COLUMN", "CONSTRAINT",
        // 其他
        "IF", "WHILE", "LOOP", "FOR", "RETURN", "DECLARE", "EXCEPTION", "RAISE", "HANDLER",
        "CONDITION", "SIGNAL", "RESIGNAL", "CALL", "EXECUTE", "PREPARE", "DEALLOCATE", "ELSEIF",
    ]
    .into_iter()
    .collect()
});

/// 对一行代码做词法着色
///
/// # 参数
/// * `line` - 原始代码行
///
/// # 返回值
/// * `String` - 插入颜色标记后的行，空白原样保留
pub fn highlight_code(line: &str) -> String {
    let mut out = String::with_capacity(line.len());

    for token in TOKEN_RE.find_iter(line) {
        out.push_str(&colorize_token(token.as_str()));
    }

    out
}

/// 去除颜色标记后的可见长度(字节)
pub fn visible_length(text: &str) -> usize {
    MARKUP_RE.replace_all(text, "").len()
}

fn colorize_token(token: &str) -> String {
    if is_quoted(token) {
        return wrap(COLOR_STRING, token);
    }

    if token.starts_with("//") || token.starts_with('#') || token.starts_with("--") {
        return wrap(COLOR_COMMENT, token);
    }

    if NUMBER_RE.is_match(token) {
        return wrap(COLOR_NUMBER, token);
    }

    // SQL关键字不区分大小写，先于普通关键字判断
    let upper = token.to_ascii_uppercase();
    if SQL_KEYWORDS.contains(upper.as_str()) {
        return wrap(COLOR_SQL, token);
    }

    if DATA_TYPES.contains(token) {
        return wrap(COLOR_DATA_TYPE, token);
    }

    if CONTROL_FLOW.contains(token) {
        return wrap(COLOR_CONTROL_FLOW, token);
    }

    if OTHER_KEYWORDS.contains(token) {
        return wrap(COLOR_KEYWORD, token);
    }

    token.to_string()
}

fn is_quoted(token: &str) -> bool {
    if token.len() < 2 {
        return false;
    }

    let bytes = token.as_bytes();
    let first = bytes[0];
    (first == b'"' || first == b'\'' || first == b'`') && bytes[bytes.len() - 1] == first
}

fn wrap(color: &str, token: &str) -> String {
    format!("[{}]{}[-]", color, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_comment_get_distinct_colors() {
        let highlighted = highlight_code("\"hello\" // note 42");

        assert!(highlighted.contains("[#FFFF00]\"hello\"[-]"));
        assert!(highlighted.contains("[#00FF00]// note 42[-]"));
        // 记号之间的空格原样保留
        assert!(highlighted.contains("[-] [#00FF00]"));
    }

    #[test]
    fn test_number_token_colored() {
        let highlighted = highlight_code("x = 42");
        assert!(highlighted.contains("[#FF8800]42[-]"));

        let decimal = highlight_code("pi = 3.14");
        assert!(decimal.contains("[#FF8800]3.14[-]"));
    }

    #[test]
    fn test_sql_keywords_case_insensitive() {
        assert!(highlight_code("SELECT * FROM t").contains("[#FF00AA]SELECT[-]"));
        assert!(highlight_code("select * from t").contains("[#FF00AA]select[-]"));
    }

    #[test]
    fn test_sql_set_checked_before_data_types() {
        // int同时在SQL表和数据类型表中，SQL表优先
        let highlighted = highlight_code("int x");
        assert!(highlighted.contains("[#FF00AA]int[-]"));
    }

    #[test]
    fn test_data_type_and_control_flow_and_keyword() {
        assert!(highlight_code("struct Foo").contains("[#00FFFF]struct[-]"));
        assert!(highlight_code("elif x").contains("[#FF00FF]elif[-]"));
        assert!(highlight_code("async foo").contains("[#0088FF]async[-]"));
    }

    #[test]
    fn test_unknown_tokens_pass_through() {
        assert_eq!(highlight_code("foo bar"), "foo bar");
    }

    #[test]
    fn test_backtick_and_single_quote_strings() {
        assert!(highlight_code("`tpl`").contains("[#FFFF00]`tpl`[-]"));
        assert!(highlight_code("'c'").contains("[#FFFF00]'c'[-]"));
    }

    #[test]
    fn test_hash_comment_runs_to_end_of_line() {
        let highlighted = highlight_code("x # 说明 42");
        assert!(highlighted.contains("[#00FF00]# 说明 42[-]"));
    }

    #[test]
    fn test_visible_length_strips_markup() {
        assert_eq!(visible_length("[#FFFF00]\"hello\"[-]"), 7);
        assert_eq!(visible_length("plain"), 5);
        assert_eq!(visible_length(""), 0);
    }
}
