// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Function execution targets

use std::fmt;

/// Topology scope a remote function runs against.
///
/// Each variant carries the name it resolves by; the provider turns a target
/// into a concrete set of members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Every member of the distributed system
    AllMembers,
    /// Members hosting the named region
    Region(String),
    /// One server reached through the named connection pool
    ServerPool(String),
    /// The default cache server
    ServerCache,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::AllMembers => write!(f, "all-members"),
            Target::Region(name) => write!(f, "region:{name}"),
            Target::ServerPool(name) => write!(f, "pool:{name}"),
            Target::ServerCache => write!(f, "server-cache"),
        }
    }
}
