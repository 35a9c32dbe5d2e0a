//! Request handlers for library operations.
//!
//! Handlers take the shared library lock, run one engine call and log the
//! outcome. Mutations hold the write lock for the whole call so that no
//! reader sees a half-applied change.

mod books;
mod lending;
mod members;
mod reservations;

pub use books::*;
pub use lending::*;
pub use members::*;
pub use reservations::*;

use stacks_engine::Library;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The library shared across all requests.
pub type SharedLibrary = Arc<RwLock<Library>>;
