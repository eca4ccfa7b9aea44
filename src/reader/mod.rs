//! 阅读层模块
//!
//! 在书籍模型之上提供带缓存的阅读会话、后台预读和
//! 持久化的阅读状态。

pub mod cache;
pub mod session;
pub mod state;

// 内容缓存
pub use cache::ContentCache;

// 阅读会话
pub use session::{ChapterContent, ReadingSession};

// 阅读状态
pub use state::{BookState, JumpList, ReadingPosition, ReadingState};
