//! The `Db` key space and its generated companions.

use confkey_macros::{ConfigurationKey, configuration_methods};

/// Keys understood by the database layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ConfigurationKey)]
#[configuration(producers_for_primitives)]
#[property_file_resolver(properties_path = "/etc/db_keys/db.properties", system_property_name = "*_PROPERTIES")]
#[pass_annotations(must_use)]
pub enum Db {
    /// Connection URL.
    Url,
    /// Maximum number of pooled connections.
    #[configuration(default_key)]
    PoolSize,
    /// Statement timeout in seconds.
    Timeout,
    /// Selects no key.
    #[configuration(null_value)]
    Unset,
}

#[configuration_methods]
impl Db {
    /// Predicate applied to values of this key.
    #[configuration(validator)]
    #[must_use]
    pub const fn validator(&self) -> fn(&str) -> bool {
        match self {
            Self::PoolSize | Self::Timeout => is_count,
            Self::Url | Self::Unset => is_present,
        }
    }

    /// Property name of this key.
    #[configuration(key_string)]
    #[must_use]
    pub const fn property(&self) -> &'static str {
        match self {
            Self::Url => "db.url",
            Self::PoolSize => "db.pool_size",
            Self::Timeout => "db.timeout",
            Self::Unset => "",
        }
    }
}

fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn is_count(value: &str) -> bool {
    value.trim().parse::<u32>().is_ok()
}

include!(concat!(env!("OUT_DIR"), "/keys/db_config.rs"));
include!(concat!(env!("OUT_DIR"), "/keys/db_config_bean.rs"));
include!(concat!(env!("OUT_DIR"), "/keys/db_property_file_configuration_resolver.rs"));
