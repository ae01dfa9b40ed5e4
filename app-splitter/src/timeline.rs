use failure::Error;

use log::{debug, warn};

use serde_derive::Deserialize;

use std::fs::File;
use std::io::Read;

use midibuf_core::config::Midi as MidiConfig;
use midibuf_core::midi::{MidiBuffer, SamplePosition};

#[derive(Deserialize, Debug, Clone)]
pub struct TimelineEvent {
  pub sample: SamplePosition,
  pub data: Vec<u8>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Timeline {
  #[serde(default)]
  pub events: Vec<TimelineEvent>,
}

impl Timeline {
  pub fn from_file<'a, T>(path: T) -> Result<Timeline, Error>
  where
    T: Into<&'a str>,
  {
    let mut content = String::new();
    let mut file = File::open(path.into())?;
    file.read_to_string(&mut content)?;
    Timeline::from_str(content.as_str())
  }

  pub fn from_str<'a, T>(content: T) -> Result<Timeline, Error>
  where
    T: Into<&'a str>,
  {
    let timeline: Timeline = toml::from_str(content.into())?;
    Ok(timeline)
  }

  /// Builds a buffer with all the valid events of the timeline.
  pub fn to_buffer(&self, config: &MidiConfig) -> MidiBuffer {
    let mut buffer = MidiBuffer::from_config(config);
    for event in self.events.iter() {
      match buffer.try_add_raw_event(&event.data, event.sample) {
        Ok(size) if size < event.data.len() => debug!(
          "Event at {} uses {} of its {} bytes",
          event.sample,
          size,
          event.data.len()
        ),
        Ok(_) => {}
        Err(err) => warn!("Ignoring event at {} {:?}: {}", event.sample, event.data, err),
      }
    }
    buffer
  }
}
