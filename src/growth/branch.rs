//! Placed branches and their addresses

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{TemplateId, MAX_SOCKETS};
use crate::math::Pose;
use crate::world::EntityId;

/// Index of a branch in its plant, in insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchId(pub u32);

impl BranchId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One placed branch segment.
#[derive(Clone, Debug)]
pub struct Branch {
    pub template: TemplateId,
    /// Root is 0, every child is one deeper than its parent
    pub depth: u32,
    pub parent: Option<BranchId>,
    /// Socket of the parent this branch grew from
    pub socket: Option<u8>,
    /// Child per socket, slot index = socket index
    pub children: [Option<BranchId>; MAX_SOCKETS],
    /// Pose relative to the parent (the plant for the root)
    pub local: Pose,
    pub world: Pose,
    pub entity: EntityId,
    pub mesh_variant: Option<String>,
}

impl Branch {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn child(&self, socket: usize) -> Option<BranchId> {
        self.children.get(socket).copied().flatten()
    }

    pub fn child_count(&self) -> usize {
        self.children.iter().filter(|c| c.is_some()).count()
    }
}

/// Socket indices from the root down to a branch. The root's path is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchPath(pub Vec<u8>);

impl BranchPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, socket: u8) -> Self {
        let mut path = self.0.clone();
        path.push(socket);
        Self(path)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for BranchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "root");
        }
        for (i, socket) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{socket}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let root = BranchPath::root();
        assert_eq!(root.to_string(), "root");
        let leaf = root.child(2).child(0).child(3);
        assert_eq!(leaf.to_string(), "2.0.3");
        assert_eq!(leaf.depth(), 3);
    }

    #[test]
    fn test_child_slots() {
        let mut branch = Branch {
            template: TemplateId(0),
            depth: 0,
            parent: None,
            socket: None,
            children: [None; MAX_SOCKETS],
            local: Pose::IDENTITY,
            world: Pose::IDENTITY,
            entity: EntityId(1),
            mesh_variant: None,
        };
        assert!(branch.is_root());
        branch.children[2] = Some(BranchId(4));
        assert_eq!(branch.child(2), Some(BranchId(4)));
        assert_eq!(branch.child(7), None);
        assert_eq!(branch.child_count(), 1);
    }
}
