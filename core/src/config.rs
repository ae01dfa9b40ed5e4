use failure::Error;

use log::debug;

use serde_derive::Deserialize;

use std::fs::File;
use std::io::Read;

use crate::midi::MAX_EVENT_SIZE;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Audio {
  pub sample_rate: u32,
  pub frames: u16,
}

impl Default for Audio {
  fn default() -> Audio {
    Audio {
      sample_rate: 44100,
      frames: 512,
    }
  }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PoolWithItemCapacity {
  pub pool_capacity: usize,
  pub item_capacity: usize,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Midi {
  pub buffer_pool: PoolWithItemCapacity,
  pub max_event_size: usize,
}

impl Default for Midi {
  fn default() -> Midi {
    Midi {
      buffer_pool: PoolWithItemCapacity {
        pool_capacity: 16,
        item_capacity: 4096,
      },
      max_event_size: MAX_EVENT_SIZE,
    }
  }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
  pub audio: Audio,
  pub midi: Midi,
}

impl Config {
  pub fn from_file<'a, T>(path: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let path_str = path.into();
    debug!("Reading configuration from {}", path_str);
    let mut content = String::new();
    let mut file = File::open(path_str)?;
    file.read_to_string(&mut content)?;
    Config::from_str(content.as_str())
  }

  pub fn from_str<'a, T>(content: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let config: Config = toml::from_str(content.into())?;
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_for_an_empty_file() {
    let config = Config::from_str("").unwrap();
    assert_eq!(config.audio.sample_rate, 44100);
    assert_eq!(config.audio.frames, 512);
    assert_eq!(config.midi.max_event_size, MAX_EVENT_SIZE);
    assert_eq!(config.midi.buffer_pool.pool_capacity, 16);
  }

  #[test]
  fn values_override_defaults() {
    let config = Config::from_str(
      r#"
      [audio]
      frames = 128

      [midi]
      max_event_size = 256

      [midi.buffer_pool]
      pool_capacity = 4
      item_capacity = 1024
      "#,
    )
    .unwrap();

    assert_eq!(config.audio.sample_rate, 44100);
    assert_eq!(config.audio.frames, 128);
    assert_eq!(config.midi.max_event_size, 256);
    assert_eq!(
      config.midi.buffer_pool,
      PoolWithItemCapacity {
        pool_capacity: 4,
        item_capacity: 1024
      }
    );
  }

  #[test]
  fn invalid_content() {
    assert!(Config::from_str("[audio]\nframes = \"many\"").is_err());
  }

  #[test]
  fn missing_file() {
    assert!(Config::from_file("does-not-exist.toml").is_err());
  }
}
