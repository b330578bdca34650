pub mod bank;
pub mod channel_buffer;

pub use bank::ChannelBank;
pub use channel_buffer::ChannelBuffer;
