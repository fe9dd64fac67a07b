//! Bill of materials derived from the current project.

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{DeviceCategory, Project};

/// Text shown in place of an empty bill of materials.
pub const EMPTY_BOM_LABEL: &str = "Chưa có thiết bị";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BomLine {
    pub category: DeviceCategory,
    pub count: usize,
}

/// Device counts per category, in the order each category first appears.
pub fn compute_bom(project: &Project) -> Vec<BomLine> {
    let mut counts: IndexMap<DeviceCategory, usize> = IndexMap::new();
    for device in &project.devices {
        *counts.entry(device.category).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(category, count)| BomLine { category, count })
        .collect()
}
