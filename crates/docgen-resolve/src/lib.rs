//! Identifier resolution for docgen.
//!
//! Maps the raw source paths recorded in the export to `(project, module)`
//! identifiers, then builds the name-location table and the per-module
//! partition of declarations that every later stage reads from.
//!
//! # Example
//!
//! ```
//! use std::path::PathBuf;
//! use docgen_resolve::{ProjectRoot, RootResolver};
//!
//! let resolver = RootResolver::from_roots(vec![ProjectRoot {
//!     path: PathBuf::from("/deps/mathlib/src"),
//!     project: "mathlib".to_owned(),
//! }]);
//! let id = resolver.resolve("/deps/mathlib/src/algebra/group.lean")?;
//! assert_eq!(id.url(), "algebra/group.html");
//! # Ok::<(), docgen_resolve::ResolveError>(())
//! ```

mod corpus;
mod error;
mod identifier;
mod resolver;

pub use corpus::{Corpus, NameTable, SELF_PROJECT};
pub use error::ResolveError;
pub use identifier::Identifier;
pub use resolver::{CORE_PROJECT, ProjectRoot, RootResolver, UNKNOWN_PROJECT, project_name_for_root};
