//! Human readable descriptions of sizes, devices and drives

pub mod device;
pub mod drive;
pub mod size;

pub use device::{
    base_name, boot_label, content_description, device_label, filesystem_label, filesystem_labels,
    filesystem_type, type_description,
};
pub use size::{format_size, parse_size, size_description, UNLIMITED};
