use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};
use tracing_subscriber::EnvFilter;
use vconf::{ConfigAccess, DefaultConfig, VersionedConfig};

struct AppDefaults {
    motd: &'static str,
}

impl DefaultConfig for AppDefaults {
    fn defaults(&self) -> Mapping {
        let mut limits = Mapping::new();
        limits.insert("players".into(), 20.into());
        limits.insert("view-distance".into(), 10.into());

        let mut map = Mapping::new();
        map.insert("motd".into(), self.motd.into());
        map.insert("limits".into(), Value::Mapping(limits));
        map
    }

    fn default_comments(&self) -> BTreeMap<String, Vec<String>> {
        BTreeMap::from([
            ("motd".to_string(), vec!["Shown to players on join".to_string()]),
            ("limits".to_string(), vec!["Server capacity".to_string()]),
        ])
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "vconf=debug".into()))
        .init();

    let dir = std::env::temp_dir().join("vconf-demo");
    let file = dir.join("server.yml");
    let _ = std::fs::remove_file(&file);

    // First run: the file is created from the 1.0 defaults.
    let mut config = VersionedConfig::new("1.0", &file, AppDefaults { motd: "Welcome" })?;
    config.initialize();
    config.set("motd", "Welcome to my server");
    config.save();

    // A newer release ships different defaults; the edited motd survives.
    let mut upgraded = VersionedConfig::new("1.1", &file, AppDefaults { motd: "Hello" })?;
    upgraded.initialize();

    println!("motd: {}", upgraded.get_string_or("motd", "<unset>"));
    println!("players: {}", upgraded.get_int_or("limits.players", 0));
    println!("---\n{}", std::fs::read_to_string(&file)?);

    Ok(())
}
