//! Legality of drag-and-drop moves within the folder hierarchy.
//!
//! Checked before any call reaches the store, which has no rollback.

use thiserror::Error;

use crate::fs::path::VaultPath;
use crate::fs::store::ParentLookup;

/// Something that can be dragged: a folder or a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub path: VaultPath,
    pub is_folder: bool,
}

impl NodeRef {
    pub fn folder(path: VaultPath) -> Self {
        Self {
            path,
            is_folder: true,
        }
    }

    pub fn file(path: VaultPath) -> Self {
        Self {
            path,
            is_folder: false,
        }
    }
}

/// Why a move was refused, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("cannot move a folder into itself")]
    SelfMove,
    #[error("cannot move a folder into one of its subfolders")]
    IntoDescendant,
    #[error("already in that folder")]
    NoOp,
}

/// Decide whether `item` may be moved into `destination`.
///
/// The destination's ancestry is walked through `lookup`; the walk stops at
/// the root, which relies on the store's graph being acyclic.
pub fn can_move<L: ParentLookup + ?Sized>(
    lookup: &L,
    item: &NodeRef,
    destination: &VaultPath,
) -> Result<(), MoveRejection> {
    if item.is_folder {
        if destination == &item.path {
            return Err(MoveRejection::SelfMove);
        }
        let mut cursor = lookup.parent_of(destination);
        while let Some(ancestor) = cursor {
            if ancestor == item.path {
                return Err(MoveRejection::IntoDescendant);
            }
            cursor = lookup.parent_of(&ancestor);
        }
    }
    if lookup.parent_of(&item.path).as_ref() == Some(destination) {
        return Err(MoveRejection::NoOp);
    }
    Ok(())
}
