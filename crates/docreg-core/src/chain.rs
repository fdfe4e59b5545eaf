//! Version chains: hash-to-hash "supersedes" links and their resolution.
//!
//! Every hash has at most one outgoing edge, so walking a chain never needs
//! tie-breaking. Links can still form cycles or very long chains, so every
//! walk is bounded by a visited set and a hop limit.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ChainError;
use crate::types::ContentHash;

/// Default maximum number of edges followed during resolution.
pub const DEFAULT_MAX_HOPS: usize = 1024;

/// Version status of a single hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VersionStatus {
    /// No outgoing edge. Terminal.
    Unlinked,
    /// Superseded by `successor`.
    Linked { successor: ContentHash },
}

impl VersionStatus {
    pub fn from_successor(successor: Option<ContentHash>) -> Self {
        match successor {
            Some(successor) => VersionStatus::Linked { successor },
            None => VersionStatus::Unlinked,
        }
    }

    pub fn successor(&self) -> Option<ContentHash> {
        match self {
            VersionStatus::Linked { successor } => Some(*successor),
            VersionStatus::Unlinked => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, VersionStatus::Unlinked)
    }
}

/// Follow successors from `start` until a hash with no outgoing edge.
///
/// `successor` looks up the outgoing edge of a hash. At most `max_hops`
/// edges are followed.
///
/// # Errors
/// - `CycleDetected` if a hash is reached twice.
/// - `TooLong` if the chain has more than `max_hops` edges.
/// - `Lookup` if `successor` fails.
pub fn resolve_latest<E>(
    start: ContentHash,
    max_hops: usize,
    successor: impl FnMut(&ContentHash) -> Result<Option<ContentHash>, E>,
) -> Result<ContentHash, ChainError<E>> {
    walk(start, max_hops, successor, |_| {})
}

/// Like [`resolve_latest`], but returns every hash on the way, `start` first
/// and the latest version last.
pub fn version_path<E>(
    start: ContentHash,
    max_hops: usize,
    successor: impl FnMut(&ContentHash) -> Result<Option<ContentHash>, E>,
) -> Result<Vec<ContentHash>, ChainError<E>> {
    let mut path = Vec::new();
    walk(start, max_hops, successor, |h| path.push(h))?;
    Ok(path)
}

fn walk<E>(
    start: ContentHash,
    max_hops: usize,
    mut successor: impl FnMut(&ContentHash) -> Result<Option<ContentHash>, E>,
    mut visit: impl FnMut(ContentHash),
) -> Result<ContentHash, ChainError<E>> {
    let mut visited = HashSet::new();
    visited.insert(start);
    visit(start);

    let mut current = start;
    let mut hops = 0usize;

    while let Some(next) = successor(&current).map_err(ChainError::Lookup)? {
        if !visited.insert(next) {
            return Err(ChainError::CycleDetected { start, at: next });
        }
        hops += 1;
        if hops > max_hops {
            return Err(ChainError::TooLong {
                start,
                limit: max_hops,
            });
        }
        visit(next);
        current = next;
    }

    Ok(current)
}
