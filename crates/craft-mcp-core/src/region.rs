//! Region compression for block-scan results
//!
//! Raw scans list every non-air block individually, which overwhelms the
//! automation client for large areas. This module groups same-type blocks
//! into maximal 6-connected components and reports each multi-block
//! component as its axis-aligned bounding box. The box is a deliberate
//! over-approximation: it is not verified to be solid.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// One voxel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The six face-adjacent neighbors
    fn neighbors(self) -> [VoxelPos; 6] {
        [
            VoxelPos::new(self.x, self.y + 1, self.z),
            VoxelPos::new(self.x, self.y - 1, self.z),
            VoxelPos::new(self.x + 1, self.y, self.z),
            VoxelPos::new(self.x - 1, self.y, self.z),
            VoxelPos::new(self.x, self.y, self.z + 1),
            VoxelPos::new(self.x, self.y, self.z - 1),
        ]
    }
}

/// Axis-aligned bounding box of one connected component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub start: VoxelPos,
    pub end: VoxelPos,
}

impl Region {
    /// Bounding box of a non-empty set of positions
    fn bounding(positions: &HashSet<VoxelPos>) -> Self {
        let mut iter = positions.iter();
        let first = *iter.next().expect("component is never empty");
        let (mut start, mut end) = (first, first);
        for pos in iter {
            start.x = start.x.min(pos.x);
            start.y = start.y.min(pos.y);
            start.z = start.z.min(pos.z);
            end.x = end.x.max(pos.x);
            end.y = end.y.max(pos.y);
            end.z = end.z.max(pos.z);
        }
        Self { start, end }
    }

    pub fn contains(&self, pos: VoxelPos) -> bool {
        (self.start.x..=self.end.x).contains(&pos.x)
            && (self.start.y..=self.end.y).contains(&pos.y)
            && (self.start.z..=self.end.z).contains(&pos.z)
    }
}

/// One scanned block as reported by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledBlock {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    #[serde(rename = "type")]
    pub block_type: String,
}

/// Compressed summary for one block type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeSummary {
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub single_blocks: Vec<VoxelPos>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<Region>,
}

/// Compressed scan result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedScan {
    pub blocks: Vec<BlockTypeSummary>,
}

/// Compress a scan into per-type single blocks and bounding-box regions.
///
/// Components are maximal under face adjacency within each type; listing
/// order is unspecified.
pub fn compress_blocks(blocks: &[LabeledBlock]) -> CompressedScan {
    let mut by_type: HashMap<&str, HashSet<VoxelPos>> = HashMap::new();
    for block in blocks {
        by_type
            .entry(block.block_type.as_str())
            .or_default()
            .insert(VoxelPos::new(block.x, block.y, block.z));
    }

    let mut summaries = Vec::with_capacity(by_type.len());
    for (block_type, positions) in by_type {
        let mut visited: HashSet<VoxelPos> = HashSet::new();
        let mut single_blocks = Vec::new();
        let mut regions = Vec::new();

        for &pos in &positions {
            if visited.contains(&pos) {
                continue;
            }
            let component = flood_fill(pos, &positions, &mut visited);
            if component.len() == 1 {
                single_blocks.push(pos);
            } else {
                regions.push(Region::bounding(&component));
            }
        }

        summaries.push(BlockTypeSummary {
            block_type: block_type.to_string(),
            single_blocks,
            regions,
        });
    }

    CompressedScan { blocks: summaries }
}

/// Breadth-first flood fill over the 6-connected neighborhood
fn flood_fill(
    start: VoxelPos,
    positions: &HashSet<VoxelPos>,
    visited: &mut HashSet<VoxelPos>,
) -> HashSet<VoxelPos> {
    let mut component = HashSet::new();
    let mut queue = VecDeque::new();

    queue.push_back(start);
    visited.insert(start);

    while let Some(current) = queue.pop_front() {
        component.insert(current);
        for neighbor in current.neighbors() {
            if positions.contains(&neighbor) && visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    component
}
