//! OPF（Open Packaging Format）包文档解析模块
//!
//! 此模块提供EPUB包文档的解析功能，包括元数据、清单、脊柱信息的提取
//! 和目录文档的定位。

mod manifest;
mod metadata;
mod parser;
mod spine;

pub use manifest::{ManifestItem, NCX_MEDIA_TYPE};
pub use metadata::{Metadata, MetadataEntry};
pub use parser::Opf;
pub use spine::SpineItem;
