//! Definition extension.
//!
//! This module builds derived definitions from a base definition and a
//! partial configuration, and defines the collaborator contracts the build
//! depends on (options merging, name validation, reactive evaluation).

pub mod accessors;
pub mod cache;
pub mod capability;
pub mod kernel;
pub mod merge;
pub mod naming;
