use crate::error::{EpubError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// container.xml中的rootfile信息
#[derive(Debug, Clone)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: String,
}

/// container.xml的解析结果
#[derive(Debug, Clone)]
pub struct Container {
    pub rootfiles: Vec<RootFile>,
}

impl Container {
    /// 解析container.xml内容
    ///
    /// # 参数
    /// * `xml_content` - container.xml的文件内容
    ///
    /// # 返回值
    /// * `Result<Container>` - 解析后的Container信息
    pub fn parse_xml(xml_content: &str) -> Result<Container> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut rootfiles = Vec::new();
        let mut buf = Vec::new();
        let mut in_rootfiles = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let local_name = e.local_name();
                    match local_name.as_ref() {
                        b"rootfiles" => {
                            in_rootfiles = true;
                        }
                        b"rootfile" if in_rootfiles => {
                            let mut full_path = String::new();
                            let mut media_type = String::new();

                            for attr_result in e.attributes() {
                                let attr = attr_result.map_err(|e| {
                                    EpubError::XmlError(quick_xml::Error::InvalidAttr(e))
                                })?;
                                match attr.key.local_name().as_ref() {
                                    b"full-path" => {
                                        full_path =
                                            String::from_utf8_lossy(&attr.value).to_string();
                                    }
                                    b"media-type" => {
                                        media_type =
                                            String::from_utf8_lossy(&attr.value).to_string();
                                    }
                                    _ => {}
                                }
                            }

                            if !full_path.is_empty() {
                                rootfiles.push(RootFile {
                                    full_path,
                                    media_type,
                                });
                            }
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    if e.local_name().as_ref() == b"rootfiles" {
                        in_rootfiles = false;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if rootfiles.is_empty() {
            return Err(EpubError::MissingRootFile(
                "container.xml中没有声明rootfile条目".to_string(),
            ));
        }

        Ok(Container { rootfiles })
    }

    /// 获取包文档路径
    ///
    /// 第一个声明的rootfile生效。
    pub fn rootfile_path(&self) -> &str {
        &self.rootfiles[0].full_path
    }
}

/// 修正rootfile路径
///
/// 一些打包工具声明的rootfile路径与实际存放位置不一致:
/// 压缩包存在顶层OEBPS目录、声明的路径却不在其中。
/// 此时若OEBPS下存在同名文件，以实际位置为准。
pub fn resolve_rootfile_path(declared: &str, entry_names: &[String]) -> String {
    if declared.starts_with("OEBPS/") {
        return declared.to_string();
    }

    if !entry_names.iter().any(|n| n.starts_with("OEBPS/")) {
        return declared.to_string();
    }

    let base = match declared.rsplit('/').next() {
        Some(b) => b,
        None => declared,
    };

    for name in entry_names {
        if name.starts_with("OEBPS/") && name.rsplit('/').next() == Some(base) {
            return name.clone();
        }
    }

    declared.to_string()
}

/// 由包文档路径推导根目录
///
/// 所有相对引用都以此目录为基准解析。包文档位于顶层时返回空串。
pub fn root_directory(rootfile_path: &str) -> String {
    match rootfile_path.rsplit_once('/') {
        Some((dir, _)) => format!("{}/", dir),
        None => String::new(),
    }
}
