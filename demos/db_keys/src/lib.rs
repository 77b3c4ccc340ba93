//! Database configuration keys.
//!
//! [`keys::Db`] lists the keys; the build script generates
//! [`keys::DbConfig`], [`keys::DbConfigBean`], and
//! [`keys::DbPropertyFileConfigurationResolver`] next to it.

pub mod keys;
