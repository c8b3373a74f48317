//! Texts summarizing what will happen to a configured drive or RAID

use crate::api::config::{self, SpacePolicy};
use crate::model::Partitionable;
use crate::utils::text::{format_list, formatted_path};

/// A space policy as offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpacePolicyEntry {
    pub id: SpacePolicy,
    pub label: &'static str,
}

pub const SPACE_POLICIES: [SpacePolicyEntry; 4] = [
    SpacePolicyEntry {
        id: SpacePolicy::Delete,
        label: "Delete current content",
    },
    SpacePolicyEntry {
        id: SpacePolicy::Resize,
        label: "Shrink existing partitions",
    },
    SpacePolicyEntry {
        id: SpacePolicy::Keep,
        label: "Use available space",
    },
    SpacePolicyEntry {
        id: SpacePolicy::Custom,
        label: "Custom",
    },
];

pub fn space_policy_entry(policy: SpacePolicy) -> &'static SpacePolicyEntry {
    // SPACE_POLICIES holds every variant
    SPACE_POLICIES
        .iter()
        .find(|p| p.id == policy)
        .unwrap_or(&SPACE_POLICIES[0])
}

fn delete_text(partitions: &[&config::Partition]) -> Option<&'static str> {
    let mandatory = partitions.iter().filter(|p| p.delete).count();
    let on_demand = partitions.iter().filter(|p| p.delete_if_needed).count();

    match (mandatory, on_demand) {
        (0, 0) => None,
        (1, 0) => Some("A partition will be deleted"),
        (1, _) => Some("At least one partition will be deleted"),
        (m, _) if m > 1 => Some("Several partitions will be deleted"),
        (_, 1) => Some("A partition may be deleted"),
        _ => Some("Some partitions may be deleted"),
    }
}

fn resize_text(partitions: &[&config::Partition]) -> Option<&'static str> {
    let count = partitions.iter().filter(|p| p.resize_if_needed).count();
    match count {
        0 => None,
        1 => Some("A partition may be shrunk"),
        _ => Some("Some partitions may be shrunk"),
    }
}

fn policy_summary(drive: &Partitionable) -> Option<&'static str> {
    match drive.space_policy()? {
        SpacePolicy::Delete if drive.is_reusing_partitions => {
            Some("All content not configured to be mounted will be deleted")
        }
        SpacePolicy::Delete => Some("All content will be deleted"),
        SpacePolicy::Resize
            if drive.is_reusing_partitions
                && !drive.is_boot
                && !drive.is_target_device
                && !drive.is_adding_partitions =>
        {
            Some("Reused partitions will not be shrunk")
        }
        SpacePolicy::Resize => Some("Some existing partitions may be shrunk"),
        SpacePolicy::Keep => Some("Current partitions will be kept"),
        SpacePolicy::Custom => None,
    }
}

/// One line summary of what happens to the current content
pub fn content_actions_summary(drive: &Partitionable) -> String {
    if let Some(summary) = policy_summary(drive) {
        return summary.to_string();
    }

    let existing: Vec<&config::Partition> = drive
        .config
        .partitions
        .iter()
        .filter(|p| !p.is_new())
        .collect();

    match (delete_text(&existing), resize_text(&existing)) {
        (Some(delete), Some(resize)) => format!("{} - {}", delete, resize),
        (Some(text), None) | (None, Some(text)) => text.to_string(),
        (None, None) => "Current partitions will be kept".to_string(),
    }
}

/// Longer explanation of a space policy for the given drive
///
/// `policy` defaults to the drive's own policy; menus pass the entry under
/// the pointer to preview it.
pub fn content_actions_description(drive: &Partitionable, policy: Option<SpacePolicy>) -> &'static str {
    let needs_space = drive.is_boot || drive.is_target_device || drive.is_adding_partitions;

    match policy.or(drive.space_policy()) {
        Some(SpacePolicy::Delete) if drive.is_reusing_partitions => {
            "Partitions that are not reused will be removed and that data will be lost."
        }
        Some(SpacePolicy::Delete) => {
            "Any existing partition will be removed and all data in the disk will be lost."
        }
        Some(SpacePolicy::Resize) if drive.is_reusing_partitions && needs_space => {
            "Partitions that are not reused will be resized as needed."
        }
        Some(SpacePolicy::Resize) if drive.is_reusing_partitions => {
            "Partitions that are not reused would be resized if needed."
        }
        Some(SpacePolicy::Resize) => {
            "The data is kept, but the current partitions will be resized as needed."
        }
        Some(SpacePolicy::Keep) if drive.is_reusing_partitions && needs_space => {
            "Only reused partitions and space not assigned to any partition will be used."
        }
        Some(SpacePolicy::Keep) if drive.is_reusing_partitions => {
            "Only reused partitions will be used."
        }
        Some(SpacePolicy::Keep) => {
            "The data is kept. Only the space not assigned to any partition will be used."
        }
        Some(SpacePolicy::Custom) | None => "Select what to do with each partition.",
    }
}

/// What the configuration will create or reuse on the drive
pub fn content_description(drive: &config::Drive) -> String {
    if drive.has_filesystem() {
        return match &drive.mount_path {
            Some(path) => format!("The whole device will be used for {}", formatted_path(path)),
            None => "A file system will be used for the whole device".to_string(),
        };
    }

    let paths = |partitions: &[&config::Partition]| -> Vec<String> {
        partitions
            .iter()
            .filter_map(|p| p.mount_path.as_deref())
            .map(formatted_path)
            .collect()
    };

    let new: Vec<&config::Partition> = drive.partitions.iter().filter(|p| p.is_new()).collect();
    let reused: Vec<&config::Partition> = drive
        .partitions
        .iter()
        .filter(|p| !p.is_new() && p.mount_path.is_some())
        .collect();

    match (new.is_empty(), reused.is_empty()) {
        (true, true) => "No additional partitions will be created".to_string(),
        (true, false) => {
            let paths = paths(&reused);
            let lead = if paths.len() == 1 {
                "An existing partition will be used for"
            } else {
                "Existing partitions will be used for"
            };
            format!("{} {}", lead, format_list(&paths))
        }
        (false, true) => {
            let paths = paths(&new);
            let lead = if paths.len() == 1 {
                "A new partition will be created for"
            } else {
                "New partitions will be created for"
            };
            format!("{} {}", lead, format_list(&paths))
        }
        (false, false) => {
            let all: Vec<&config::Partition> = new.into_iter().chain(reused).collect();
            format!(
                "Partitions will be used and created for {}",
                format_list(&paths(&all))
            )
        }
    }
}
