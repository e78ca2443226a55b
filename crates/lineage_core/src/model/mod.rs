//! Definition data model.
//!
//! # Responsibility
//! - Define identities and configuration shapes shared by extension code.
//!
//! # Invariants
//! - Every definition is identified by a unique `DefinitionId`.
//! - Option trees are plain data; no behavior lives here.

pub mod identity;
pub mod options;
