pub mod channel;
pub mod dirty;
pub mod frame;
pub mod record;
pub mod table;
pub mod token;

pub use channel::ChannelName;
pub use dirty::DirtySet;
pub use frame::{AxisRange, ChannelSnapshot, Frame, StreamLayout};
pub use record::{encode_record, RecordBuilder, FIELD_SEPARATOR};
pub use table::{ChannelSpec, ChannelTable, FIELD_POSITIONS};
pub use token::{Token, MISSING_MARKER};
