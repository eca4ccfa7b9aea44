//! 包文档解析模块
//!
//! 提供OPF(Open Packaging Format)包文档的XML解析和目录文档定位。

use crate::epub::opf::{manifest::ManifestItem, metadata::Metadata, spine::SpineItem};
use crate::error::{EpubError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashMap;

/// 包文档解析结果
#[derive(Debug, Clone)]
pub struct Opf {
    /// EPUB版本
    pub version: String,
    /// 元数据
    pub metadata: Metadata,
    /// 清单(ID到清单项的映射)
    pub manifest: HashMap<String, ManifestItem>,
    /// 脊柱(阅读顺序)
    pub spine: Vec<SpineItem>,
}

impl Opf {
    /// 解析包文档内容
    ///
    /// # 参数
    /// * `xml_content` - 包文档的XML内容
    ///
    /// # 返回值
    /// * `Result<Opf>` - 解析后的包文档信息
    pub fn parse_xml(xml_content: &str) -> Result<Opf> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut version = String::new();
        let mut metadata = Metadata::new();
        let mut manifest = HashMap::new();
        let mut spine = Vec::new();

        let mut buf = Vec::new();
        let mut current_section = String::new();
        let mut text_content = String::new();
        let mut pending_property = String::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    match local_name.as_ref() {
                        "package" => {
                            version = Self::parse_package_version(e)?;
                        }
                        "metadata" => {
                            current_section = "metadata".to_string();
                        }
                        "manifest" => {
                            current_section = "manifest".to_string();
                        }
                        "spine" => {
                            current_section = "spine".to_string();
                        }
                        "item" if current_section == "manifest" => {
                            Self::parse_manifest_item(e, &mut manifest)?;
                        }
                        "itemref" if current_section == "spine" => {
                            Self::parse_spine_item(e, &mut spine)?;
                        }
                        "meta" if current_section == "metadata" => {
                            pending_property = Self::parse_meta_tag(e, &mut metadata)?;
                            text_content.clear();
                        }
                        _ if current_section == "metadata" => {
                            text_content.clear();
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    match local_name.as_ref() {
                        "metadata" | "manifest" | "spine" => {
                            current_section.clear();
                        }
                        "meta" if current_section == "metadata" => {
                            // EPUB3的property形式: <meta property="...">值</meta>
                            let value = text_content.trim();
                            if !pending_property.is_empty() && !value.is_empty() {
                                metadata.push(pending_property.clone(), value.to_string());
                            }
                            pending_property.clear();
                        }
                        _ if current_section == "metadata" => {
                            let value = text_content.trim();
                            if !value.is_empty() {
                                metadata.push(local_name.to_string(), value.to_string());
                            }
                        }
                        _ => {}
                    }
                }
                Event::Text(e) => {
                    text_content.push_str(&e.unescape()?);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Opf {
            version,
            metadata,
            manifest,
            spine,
        })
    }

    /// 解析package元素的version属性
    fn parse_package_version(e: &quick_xml::events::BytesStart) -> Result<String> {
        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            if attr.key.local_name().as_ref() == b"version" {
                return Ok(String::from_utf8_lossy(&attr.value).to_string());
            }
        }
        Ok(String::new())
    }

    /// 解析meta标签
    ///
    /// name/content形式直接入表；property形式返回属性名，
    /// 等待结束标签时取文本内容。
    fn parse_meta_tag(
        e: &quick_xml::events::BytesStart,
        metadata: &mut Metadata,
    ) -> Result<String> {
        let mut name = String::new();
        let mut content = String::new();
        let mut property = String::new();

        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            match attr.key.local_name().as_ref() {
                b"name" => {
                    name = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"content" => {
                    content = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"property" => {
                    property = String::from_utf8_lossy(&attr.value).to_string();
                }
                _ => {}
            }
        }

        if !name.is_empty() && !content.is_empty() {
            metadata.push(name, content);
        }

        Ok(property)
    }

    /// 解析清单项
    fn parse_manifest_item(
        e: &quick_xml::events::BytesStart,
        manifest: &mut HashMap<String, ManifestItem>,
    ) -> Result<()> {
        let mut item = ManifestItem {
            id: String::new(),
            href: String::new(),
            media_type: String::new(),
            properties: None,
        };

        for attr_result in e.attributes() {
            let attr =
                attr_result.map_err(|e| EpubError::XmlError(quick_xml::Error::InvalidAttr(e)))?;
            match attr.key.local_name().as_ref() {
                b"id" => {
                    item.id = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"href" => {
                    item.href = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"media-type" => {
                    item.media_type = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"properties" => {
                    item.properties = Some(String::from_utf8_lossy(&attr.value).to_string());
                }
                _ => {}
            }
        }

        if !item.id.is_empty() && !item.href.is_empty() {
            manifest.insert(item.id.clone(), item);
        }

        Ok(())
    }

    /// 解析脊柱项
    fn parse_spine_item(
        e: &quick_xml::events::BytesStart,
        spine: &mut Vec<SpineItem>,
    ) -> Result<()> {
        let mut spine_item = SpineItem {
            idref: String::new(),
            linear: true,
        };

        for attr_result in e.attributes() {
            let attr =
                attr_result.map_err(|e| EpubError::XmlError(quick_xml::Error::InvalidAttr(e)))?;
            match attr.key.local_name().as_ref() {
                b"idref" => {
                    spine_item.idref = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"linear" => {
                    let linear_value = String::from_utf8_lossy(&attr.value);
                    spine_item.linear = linear_value != "no";
                }
                _ => {}
            }
        }

        if !spine_item.idref.is_empty() {
            spine.push(spine_item);
        }

        Ok(())
    }

    /// 定位目录文档对应的清单项
    ///
    /// 选择规则: 先找NCX媒体类型的清单项；没有时，3.0版本下
    /// 再找properties包含nav的清单项。两者并存时NCX优先。
    pub fn toc_item(&self) -> Option<&ManifestItem> {
        if let Some(item) = self.manifest.values().find(|item| item.is_ncx()) {
            return Some(item);
        }

        if self.version == "3.0" {
            if let Some(item) = self.manifest.values().find(|item| item.is_nav()) {
                return Some(item);
            }
        }

        None
    }

    /// 根据ID获取清单项
    pub fn get_manifest_item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.get(id)
    }
}
