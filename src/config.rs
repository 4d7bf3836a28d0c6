use crate::gen::GenerationConfig;
use std::fs;
use std::path::PathBuf;

pub mod range_types;

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|mut path| {
            path.push("hamlet");
            fs::create_dir_all(&path).ok()?;
            path.push("config.toml");
            Some(path)
        })
        .flatten()
}

pub fn load_config() -> GenerationConfig {
    if let Some(config_path) = get_config_path() {
        if let Ok(contents) = fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<GenerationConfig>(&contents) {
                return config;
            }
        }
    }
    GenerationConfig::default()
}

pub fn save_config(config: &GenerationConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(config_path) = get_config_path() {
        let contents = toml::to_string_pretty(config)?;
        fs::write(config_path, contents)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_toml_round_trip() {
        let config = GenerationConfig {
            seed: 99,
            size_tiles: 48,
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: GenerationConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.seed, 99);
        assert_eq!(parsed.size_tiles, 48);
        assert_eq!(parsed.tile_size, config.tile_size);
    }
}
