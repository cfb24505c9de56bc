//! SQL 辅助函数

use sea_orm::sea_query::LikeExpr;

/// 转义 LIKE 通配符，转义字符为反斜杠
pub fn escape_like_pattern(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// 构造 `%input%` 子串匹配，显式声明 ESCAPE（SQLite 没有默认转义字符）
pub fn contains_pattern(input: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like_pattern(input))).escape('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_percent_and_underscore() {
        assert_eq!(escape_like_pattern("100%"), "100\\%");
        assert_eq!(escape_like_pattern("user_name"), "user\\_name");
    }

    #[test]
    fn test_escape_backslash_first() {
        assert_eq!(escape_like_pattern("a\\_b"), "a\\\\\\_b");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_like_pattern("alice"), "alice");
    }
}
