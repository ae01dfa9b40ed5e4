use midibuf_core::config::{Audio as AudioConfig, Midi as MidiConfig};
use midibuf_core::midi::{new_buffer_pool, MidiBuffer, SamplePosition};
use midibuf_core::pool::Pool;

/// Time in milliseconds of a sample position.
pub fn millis_at(sample_rate: u32, sample_position: SamplePosition) -> f64 {
  f64::from(sample_position) * 1000.0 / f64::from(sample_rate.max(1))
}

/// Cuts a timeline into consecutive processing blocks of a fixed number of frames.
///
/// Every block is handed over as a buffer whose sample positions are relative
/// to the start of the block.
pub struct BlockSplitter {
  frames: i32,
  pool: Pool<MidiBuffer>,
}

impl BlockSplitter {
  pub fn new(audio: &AudioConfig, midi: &MidiConfig) -> BlockSplitter {
    BlockSplitter {
      frames: i32::from(audio.frames.max(1)),
      pool: new_buffer_pool(midi),
    }
  }

  pub fn frames(&self) -> i32 {
    self.frames
  }

  /// Calls `process` with the start of every block between the first and the last
  /// event of the timeline, and the events that fall into it.
  ///
  /// Blocks are aligned to multiples of the number of frames, except the first one
  /// when that multiple is below the lowest sample position.
  pub fn split<F>(&mut self, timeline: &MidiBuffer, mut process: F)
  where
    F: FnMut(SamplePosition, &MidiBuffer),
  {
    if timeline.is_empty() {
      return;
    }

    let first = timeline.first_event_time();
    let last = timeline.last_event_time();
    let mut start = first
      .checked_sub(first.rem_euclid(self.frames))
      .unwrap_or_else(i32::min_value);

    while start <= last {
      let mut block = self.pool.get_or_alloc();
      match start.checked_neg() {
        Some(delta) => block.add_events(timeline, start, self.frames, delta),
        None => Self::copy_relative(timeline, start, self.frames, &mut block),
      }
      process(start, &block);
      self.pool.release(block);

      start = match start.checked_add(self.frames) {
        Some(next) => next,
        None => break,
      };
    }
  }

  /// Copies the events in `[start, start + frames)` moved to be relative to `start`,
  /// for blocks whose start can not be negated.
  fn copy_relative(timeline: &MidiBuffer, start: SamplePosition, frames: i32, block: &mut MidiBuffer) {
    let end = i64::from(start) + i64::from(frames);
    let mut reader = timeline.iter();
    reader.set_next_sample_position(start);
    for event in reader.take_while(|event| i64::from(event.sample_position) < end) {
      let offset = i64::from(event.sample_position) - i64::from(start);
      block.add_raw_event(event.data, offset as SamplePosition);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use midibuf_core::midi::Message;

  fn audio(frames: u16) -> AudioConfig {
    AudioConfig {
      sample_rate: 48000,
      frames,
    }
  }

  fn timeline(positions: &[SamplePosition]) -> MidiBuffer {
    let mut buffer = MidiBuffer::new();
    for position in positions {
      buffer.add_event(&Message::TimingClock, *position);
    }
    buffer
  }

  fn split(frames: u16, positions: &[SamplePosition]) -> Vec<(SamplePosition, Vec<SamplePosition>)> {
    let mut splitter = BlockSplitter::new(&audio(frames), &MidiConfig::default());
    let mut blocks = Vec::new();
    splitter.split(&timeline(positions), |start, block| {
      blocks.push((start, block.iter().map(|event| event.sample_position).collect()))
    });
    blocks
  }

  #[test]
  fn empty_timeline_has_no_blocks() {
    assert!(split(64, &[]).is_empty());
  }

  #[test]
  fn positions_are_relative_to_the_block() {
    assert_eq!(
      split(64, &[0, 10, 64, 130, 130]),
      vec![(0, vec![0, 10]), (64, vec![0]), (128, vec![2, 2])]
    );
  }

  #[test]
  fn starts_at_the_block_of_the_first_event() {
    assert_eq!(
      split(100, &[250, 420]),
      vec![(200, vec![50]), (300, vec![]), (400, vec![20])]
    );
  }

  #[test]
  fn timeline_at_the_lowest_position() {
    let min = i32::min_value();
    assert_eq!(
      split(64, &[min, min + 1, min + 70]),
      vec![(min, vec![0, 1]), (min + 64, vec![6])]
    );
  }

  #[test]
  fn first_block_is_clamped_to_the_lowest_position() {
    let min = i32::min_value();
    assert_eq!(
      split(100, &[min, min + 150]),
      vec![(min, vec![0]), (min + 100, vec![50])]
    );
  }

  #[test]
  fn timeline_at_the_highest_position() {
    let max = i32::max_value();
    assert_eq!(
      split(64, &[max]),
      vec![(max - max.rem_euclid(64), vec![max.rem_euclid(64)])]
    );
  }

  #[test]
  fn blocks_are_recycled() {
    let mut config = MidiConfig::default();
    config.buffer_pool.pool_capacity = 1;
    let mut splitter = BlockSplitter::new(&audio(16), &config);
    let mut count = 0;
    splitter.split(&timeline(&[0, 16, 32, 48]), |_, block| {
      assert_eq!(block.num_events(), 1);
      count += 1;
    });
    assert_eq!(count, 4);
    assert_eq!(splitter.pool.len(), 1);
  }

  #[test]
  fn zero_frames_is_one_frame() {
    let splitter = BlockSplitter::new(&audio(0), &MidiConfig::default());
    assert_eq!(splitter.frames(), 1);
  }

  #[test]
  fn millis_use_the_sample_rate() {
    assert_eq!(millis_at(48000, 0), 0.0);
    assert_eq!(millis_at(48000, 48000), 1000.0);
    assert_eq!(millis_at(48000, -24), -0.5);
    assert_eq!(millis_at(0, 3), 3000.0);
  }
}
