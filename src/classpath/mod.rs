//! # Class path assembly for a target process.
//!
//! - [`ProcessDetails`] looks up a process's reported system properties.
//! - [`NullProcessDetails`] is the empty fallback used when no provider is wired.
//! - [`ClassPathBuilder`] turns those properties plus user entries into one
//!   path-separator-joined string.
//!
//! ## Composition
//! ```text
//! system_properties(pid)
//!   ├─ user.dir        = /home/u
//!   └─ java.class.path = a:b
//!          │
//!          ▼
//!   initial: /home/u/a:/home/u/b ──► + user entries ──► /home/u/a:/home/u/b:/opt/x.jar
//! ```

mod builder;
mod provider;

pub use builder::{ClassPathBuilder, CLASS_PATH_PROPERTY, PATH_SEPARATOR, USER_DIR_PROPERTY};
pub use provider::{NullProcessDetails, ProcessDetails};
