pub mod buffer;
pub mod decoder;
pub mod encoder;
pub mod messages;
pub mod reader;
pub mod record;
pub mod types;

pub use buffer::{new_buffer_pool, MidiBuffer};
pub use decoder::{Decoder, EventError, MAX_EVENT_SIZE};
pub use encoder::Encoder;
pub use messages::Message;
pub use reader::{Event, Reader};
pub use record::SamplePosition;
