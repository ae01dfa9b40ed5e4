use failure::{Error, Fail};

use log::{debug, info};

use midibuf_core::config::Config;
use midibuf_core::midi::{Encoder, Message, MidiBuffer};

mod splitter;
use crate::splitter::{millis_at, BlockSplitter};

mod timeline;
use crate::timeline::Timeline;

const MIDIBUF_CONFIG: &str = "MIDIBUF_CONFIG";
const DEFAULT_MIDIBUF_CONFIG: &str = "midibuf.toml";

const MIDIBUF_LOG_CONFIG: &str = "MIDIBUF_LOG_CONFIG";
const DEFAULT_MIDIBUF_LOG_CONFIG: &str = "log4rs.yaml";

const MIDIBUF_TIMELINE: &str = "MIDIBUF_TIMELINE";
const DEFAULT_MIDIBUF_TIMELINE: &str = "timeline.toml";

#[derive(Debug, Fail)]
enum MainError {
  #[fail(display = "Failed to init logging: {}", cause)]
  LoggingInit { cause: String },
}

fn main() -> Result<(), Error> {
  init_logging()?;

  let config = init_config()?;

  let timeline = init_timeline(&config)?;

  let mut splitter = BlockSplitter::new(&config.audio, &config.midi);

  info!(
    "Splitting {} events into blocks of {} frames ...",
    timeline.num_events(),
    splitter.frames()
  );

  let sample_rate = config.audio.sample_rate;
  splitter.split(&timeline, |start, block| {
    log_block(start, millis_at(sample_rate, start), block)
  });

  Ok(())
}

fn env_or_default(name: &str, default: &str) -> String {
  std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn init_logging() -> Result<(), Error> {
  let log_config_path = env_or_default(MIDIBUF_LOG_CONFIG, DEFAULT_MIDIBUF_LOG_CONFIG);

  log4rs::init_file(log_config_path.as_str(), Default::default()).map_err(|err| {
    MainError::LoggingInit {
      cause: err.to_string(),
    }
  })?;

  Ok(())
}

fn init_config() -> Result<Config, Error> {
  let config_path = env_or_default(MIDIBUF_CONFIG, DEFAULT_MIDIBUF_CONFIG);

  info!("Loading configuration from {} ...", config_path);
  let config = Config::from_file(config_path.as_str())?;
  debug!("{:#?}", config);

  Ok(config)
}

fn init_timeline(config: &Config) -> Result<MidiBuffer, Error> {
  let timeline_path = env_or_default(MIDIBUF_TIMELINE, DEFAULT_MIDIBUF_TIMELINE);

  info!("Loading timeline from {} ...", timeline_path);
  let timeline = Timeline::from_file(timeline_path.as_str())?;

  Ok(timeline.to_buffer(&config.midi))
}

fn log_block(start: i32, millis: f64, block: &MidiBuffer) {
  if block.is_empty() {
    debug!("[{} / {:.3} ms] no events", start, millis);
    return;
  }

  info!(
    "[{} / {:.3} ms] {} events from {} to {}",
    start,
    millis,
    block.num_events(),
    block.first_event_time(),
    block.last_event_time()
  );

  let mut reader = block.iter();
  while let Some((message, sample_position)) = reader.next_message() {
    debug!("  +{:<5} {}", sample_position, describe(&message));
  }
}

fn describe(message: &Message) -> String {
  if message.is_sysex() {
    return format!("SysEx ({} bytes)", Encoder::data_size(message));
  }

  match message.channel() {
    Some(channel) => format!("ch {:>2} {:?}", channel + 1, message),
    None => format!("{:?}", message),
  }
}
