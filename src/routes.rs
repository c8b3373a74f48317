//! Named pages of the storage section and path generation
//!
//! Partitionable devices are addressed by collection and index
//! (`/storage/drives/0/...`), partitions and logical volumes by their mount
//! path passed as `:id`.

use crate::api::config::Collection;
use crate::model::{Model, Partitionable};
use crate::utils::error::{Result, StorageError};

pub const ROOT: &str = "/storage";
pub const TARGET_DEVICE: &str = "/storage/target-device";
pub const BOOT_DEVICE: &str = "/storage/boot-device";
pub const ENCRYPTION: &str = "/storage/encryption";
pub const SPACE_POLICY: &str = "/storage/:collection/:index/space-policy";
pub const FORMAT_DEVICE: &str = "/storage/:collection/:index/format";
pub const ADD_PARTITION: &str = "/storage/:collection/:index/partitions/add";
pub const EDIT_PARTITION: &str = "/storage/:collection/:index/partitions/:id/edit";
pub const ADD_VOLUME_GROUP: &str = "/storage/volume-groups/add";
pub const EDIT_VOLUME_GROUP: &str = "/storage/volume-groups/:index/edit";
pub const ADD_LOGICAL_VOLUME: &str = "/storage/volume-groups/:index/logical-volumes/add";
pub const EDIT_LOGICAL_VOLUME: &str = "/storage/volume-groups/:index/logical-volumes/:id/edit";
pub const ISCSI: &str = "/storage/iscsi";
pub const ZFCP: &str = "/storage/zfcp";
pub const DASD: &str = "/storage/dasd";

/// Values for the `:collection`, `:index` and `:id` placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    pub collection: Option<Collection>,
    pub index: Option<usize>,
    pub id: Option<String>,
}

impl RouteParams {
    /// Parameters addressing a drive or MD RAID
    pub fn device(collection: Collection, index: usize) -> Self {
        Self {
            collection: Some(collection),
            index: Some(index),
            id: None,
        }
    }

    pub fn volume_group(index: usize) -> Self {
        Self {
            index: Some(index),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Device the parameters point to, `None` if the index is stale
    pub fn resolve<'m, 'a>(&self, model: &'m Model<'a>) -> Option<&'m Partitionable<'a>> {
        model.collection(self.collection?).get(self.index?)
    }
}

impl From<&Partitionable<'_>> for RouteParams {
    fn from(device: &Partitionable<'_>) -> Self {
        Self::device(device.list, device.list_index)
    }
}

/// Fill the placeholders of `template`, percent-encoding the values
pub fn generate_path(template: &str, params: &RouteParams) -> Result<String> {
    let segments = template
        .split('/')
        .map(|segment| {
            let Some(name) = segment.strip_prefix(':') else {
                return Ok(segment.to_string());
            };
            let value = match name {
                "collection" => params.collection.map(|c| c.to_string()),
                "index" => params.index.map(|i| i.to_string()),
                "id" => params.id.clone(),
                _ => None,
            };
            value
                .map(|v| encode_component(&v))
                .ok_or_else(|| StorageError::InvalidRoute(format!("missing :{} for {}", name, template)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(segments.join("/"))
}

fn encode_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
