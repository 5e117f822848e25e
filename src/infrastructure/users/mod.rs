//! User directory implementations.
//!
//! Provides [`InMemoryUserDirectory`], which assigns ids to usernames the first
//! time an upstream proxy presents them.

mod in_memory;

pub use in_memory::InMemoryUserDirectory;
