use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use crate::error::{EpubError, Result};

const EPUB_MIMETYPE: &str = "application/epub+zip";

/// EPUB压缩包的访问句柄
///
/// 持有打开的zip文件，按条目名读取内容。句柄在drop时释放。
pub struct Archive {
    archive: ZipArchive<File>,
}

impl Archive {
    /// 打开EPUB压缩包
    ///
    /// # 参数
    /// * `path` - epub文件的路径
    ///
    /// # 返回值
    /// * `Result<Archive>` - 成功返回压缩包句柄，失败返回错误
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Archive> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;

        let mut archive = Archive { archive };
        archive.check_mimetype();

        Ok(archive)
    }

    /// 检查mimetype条目
    ///
    /// 缺失或内容不符只记录警告，不影响打开。很多打包工具
    /// 生成的EPUB这里并不规范。
    fn check_mimetype(&mut self) {
        match self.archive.by_name("mimetype") {
            Ok(mut file) => {
                let mut content = String::new();
                if file.read_to_string(&mut content).is_err() {
                    log::warn!("mimetype条目无法读取");
                    return;
                }

                let content = content.trim();
                if content != EPUB_MIMETYPE {
                    log::warn!("mimetype不正确: 期望{}, 找到{}", EPUB_MIMETYPE, content);
                }
            }
            Err(_) => log::warn!("缺少mimetype条目"),
        }
    }

    /// 读取指定条目的文本内容
    ///
    /// # 参数
    /// * `name` - 条目名
    ///
    /// # 返回值
    /// * `Result<String>` - 条目内容，条目不存在时返回EntryNotFound
    pub fn read_to_string(&mut self, name: &str) -> Result<String> {
        let mut file = self
            .archive
            .by_name(name)
            .map_err(|e| Self::map_entry_error(name, e))?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(content)
    }

    /// 读取指定条目的二进制内容
    pub fn read_bytes(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(name)
            .map_err(|e| Self::map_entry_error(name, e))?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// 列出压缩包中的所有条目名
    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(|n| n.to_string()).collect()
    }

    /// 检查条目是否存在
    pub fn has_entry(&self, name: &str) -> bool {
        self.archive.file_names().any(|n| n == name)
    }

    fn map_entry_error(name: &str, err: zip::result::ZipError) -> EpubError {
        match err {
            zip::result::ZipError::FileNotFound => EpubError::EntryNotFound(name.to_string()),
            other => EpubError::Zip(other),
        }
    }
}
