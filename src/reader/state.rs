//! 阅读状态模块
//!
//! 按书籍路径记录最后阅读位置和跳转标记，以YAML文件持久化。
//! 渲染管线不读写状态，由调用方在会话开始时读入、结束时写回。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EpubError, Result};

/// 一个阅读位置
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingPosition {
    /// 章节序号
    pub chapter_index: usize,
    /// 记录时的排版宽度
    pub width: usize,
    /// 章节内的滚动行号
    pub row: usize,
    /// 章节内的阅读进度(0.0到1.0)
    pub percent: f64,
}

/// 跳转标记表，按键位到阅读位置
pub type JumpList = HashMap<char, ReadingPosition>;

/// 单本书的阅读状态
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookState {
    /// 最后阅读位置
    pub position: ReadingPosition,
    /// 是否为最近读过的书
    #[serde(default)]
    pub last_read: bool,
    /// 跳转标记
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub jumps: JumpList,
}

impl BookState {
    /// 在指定键位记录跳转标记
    pub fn mark(&mut self, slot: char, position: ReadingPosition) {
        self.jumps.insert(slot, position);
    }

    /// 取出指定键位的跳转标记
    pub fn jump(&self, slot: char) -> Option<ReadingPosition> {
        self.jumps.get(&slot).copied()
    }
}

/// 全部书籍的阅读状态
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadingState {
    /// 书籍路径到各自状态的映射
    #[serde(default)]
    pub books: HashMap<String, BookState>,
}

impl ReadingState {
    /// 从YAML文件加载阅读状态
    ///
    /// 文件不存在时静默返回空状态，文件损坏时记录警告后
    /// 返回空状态，不中断阅读。
    ///
    /// # 参数
    /// * `path` - 状态文件的路径
    pub fn load<P: AsRef<Path>>(path: P) -> ReadingState {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return ReadingState::default(),
        };

        match serde_yml::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("状态文件格式错误, 使用空状态: {}", e);
                ReadingState::default()
            }
        }
    }

    /// 保存阅读状态到YAML文件
    ///
    /// # 参数
    /// * `path` - 状态文件的路径
    ///
    /// # 返回值
    /// * `Result<()>` - 序列化或写入失败时返回错误
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yml::to_string(self)
            .map_err(|e| EpubError::ConfigError(format!("序列化状态失败: {}", e)))?;

        if let Some(dir) = path.as_ref().parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .map_err(|e| EpubError::ConfigError(format!("创建状态目录失败: {}", e)))?;
            }
        }

        fs::write(path, yaml).map_err(|e| EpubError::ConfigError(format!("写入状态文件失败: {}", e)))
    }

    /// 查询一本书的状态
    pub fn get(&self, book: &str) -> Option<&BookState> {
        self.books.get(book)
    }

    /// 查询一本书的可变状态，不存在时创建默认状态
    pub fn get_mut(&mut self, book: &str) -> &mut BookState {
        self.books.entry(book.to_string()).or_default()
    }

    /// 更新一本书的最后阅读位置并标记为最近读过
    ///
    /// 其他书的最近读过标记会被清除，保证全局只有一本。
    pub fn set_position(&mut self, book: &str, position: ReadingPosition) {
        for state in self.books.values_mut() {
            state.last_read = false;
        }

        let entry = self.books.entry(book.to_string()).or_default();
        entry.position = position;
        entry.last_read = true;
    }

    /// 最近读过的书及其状态
    pub fn last_read(&self) -> Option<(&str, &BookState)> {
        self.books
            .iter()
            .find(|(_, state)| state.last_read)
            .map(|(book, state)| (book.as_str(), state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn position(chapter_index: usize, row: usize) -> ReadingPosition {
        ReadingPosition {
            chapter_index,
            width: 80,
            row,
            percent: 0.5,
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.yml");

        let mut state = ReadingState::default();
        state.set_position("/books/测试.epub", position(3, 12));
        state.save(&path).unwrap();

        let loaded = ReadingState::load(&path);
        let book = loaded.get("/books/测试.epub").unwrap();
        assert_eq!(book.position.chapter_index, 3);
        assert_eq!(book.position.row, 12);
        assert!(book.last_read);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let state = ReadingState::load(dir.path().join("none.yml"));
        assert!(state.books.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.yml");
        std::fs::write(&path, "books: [这不是映射").unwrap();

        let state = ReadingState::load(&path);
        assert!(state.books.is_empty());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/state.yml");

        ReadingState::default().save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_last_read_is_exclusive() {
        let mut state = ReadingState::default();
        state.set_position("甲.epub", position(1, 0));
        state.set_position("乙.epub", position(2, 0));

        let (book, _) = state.last_read().unwrap();
        assert_eq!(book, "乙.epub");
        assert!(!state.get("甲.epub").unwrap().last_read);
    }

    #[test]
    fn test_mark_and_jump() {
        let mut state = ReadingState::default();
        let book = state.get_mut("甲.epub");
        book.mark('1', position(5, 40));

        assert_eq!(book.jump('1').unwrap().chapter_index, 5);
        assert_eq!(book.jump('1').unwrap().row, 40);
        assert!(book.jump('2').is_none());
    }

    #[test]
    fn test_jump_marks_survive_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.yml");

        let mut state = ReadingState::default();
        state.get_mut("甲.epub").mark('9', position(7, 0));
        state.save(&path).unwrap();

        let loaded = ReadingState::load(&path);
        let mark = loaded.get("甲.epub").unwrap().jump('9').unwrap();
        assert_eq!(mark.chapter_index, 7);
    }
}
