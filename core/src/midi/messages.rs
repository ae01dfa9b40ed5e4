use super::types::{U14, U3, U4, U7};

/// A MIDI 1.0 message, without any timing information.
///
/// Where a message is placed in time is decided by its container,
/// see [`MidiBuffer`](crate::midi::MidiBuffer).
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Message {
  NoteOff {
    channel: U4,
    key: U7,
    velocity: U7,
  },
  NoteOn {
    channel: U4,
    key: U7,
    velocity: U7,
  },
  PolyphonicKeyPressure {
    channel: U4,
    key: U7,
    value: U7,
  },
  ControlChange {
    channel: U4,
    controller: U7,
    value: U7,
  },
  ProgramChange {
    channel: U4,
    value: U7,
  },
  ChannelPressure {
    channel: U4,
    value: U7,
  },
  PitchBend {
    channel: U4,
    value: U14,
  },

  AllSoundOff {
    channel: U4,
  },
  ResetAllControllers {
    channel: U4,
  },
  LocalControlOff {
    channel: U4,
  },
  LocalControlOn {
    channel: U4,
  },
  AllNotesOff {
    channel: U4,
  },
  OmniModeOff {
    channel: U4,
  },
  OmniModeOn {
    channel: U4,
  },
  MonoModeOn {
    channel: U4,
    num_channels: U7,
  },
  PolyModeOn {
    channel: U4,
  },

  SysEx {
    data: Vec<U7>,
  },
  MTCQuarterFrame {
    msg_type: U3,
    value: U4,
  },
  SongPositionPointer {
    beats: U14,
  },
  SongSelect {
    song: U7,
  },
  TuneRequest,

  TimingClock,
  Start,
  Continue,
  Stop,
  ActiveSensing,
  SystemReset,

  /// Bytes that could not be interpreted as any of the above.
  Unknown(Vec<u8>),
}

impl Message {
  pub fn channel(&self) -> Option<U4> {
    match self {
      Message::NoteOff { channel, .. }
      | Message::NoteOn { channel, .. }
      | Message::PolyphonicKeyPressure { channel, .. }
      | Message::ControlChange { channel, .. }
      | Message::ProgramChange { channel, .. }
      | Message::ChannelPressure { channel, .. }
      | Message::PitchBend { channel, .. }
      | Message::AllSoundOff { channel }
      | Message::ResetAllControllers { channel }
      | Message::LocalControlOff { channel }
      | Message::LocalControlOn { channel }
      | Message::AllNotesOff { channel }
      | Message::OmniModeOff { channel }
      | Message::OmniModeOn { channel }
      | Message::MonoModeOn { channel, .. }
      | Message::PolyModeOn { channel } => Some(*channel),
      _ => None,
    }
  }

  pub fn is_sysex(&self) -> bool {
    match self {
      Message::SysEx { .. } => true,
      _ => false,
    }
  }
}
