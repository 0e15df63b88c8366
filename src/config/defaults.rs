use std::collections::BTreeMap;

use serde_yaml::Mapping;

/// The host-supplied defaults of a [`VersionedConfig`](super::VersionedConfig).
///
/// Both maps are keyed by dotted path. A value that is itself a mapping
/// describes a whole section: it is materialized as that section and replaces
/// whatever the file held there. Any other value is a fallback that never
/// overwrites a value the user has set.
///
/// ## Example
///
/// ```
/// use std::collections::BTreeMap;
/// use serde_yaml::{Mapping, Value};
/// use vconf::DefaultConfig;
///
/// struct ServerDefaults;
///
/// impl DefaultConfig for ServerDefaults {
///     fn defaults(&self) -> Mapping {
///         let mut limits = Mapping::new();
///         limits.insert("connections".into(), 64.into());
///
///         let mut map = Mapping::new();
///         map.insert("server.host".into(), "0.0.0.0".into());
///         map.insert("limits".into(), Value::Mapping(limits));
///         map
///     }
///
///     fn default_comments(&self) -> BTreeMap<String, Vec<String>> {
///         BTreeMap::from([("server.host".to_string(), vec!["Bind address".to_string()])])
///     }
/// }
/// ```
pub trait DefaultConfig {
    /// Default values, applied in iteration order.
    fn defaults(&self) -> Mapping;

    /// Comment lines to place above each path.
    fn default_comments(&self) -> BTreeMap<String, Vec<String>>;
}
