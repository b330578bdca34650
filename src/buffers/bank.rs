use super::ChannelBuffer;
use crate::core::{ChannelName, ChannelSnapshot, ChannelTable};
use crate::error::BufferError;

/// One window per channel of a table, addressed by channel index.
#[derive(Debug, Clone)]
pub struct ChannelBank {
    names: Vec<ChannelName>,
    buffers: Vec<ChannelBuffer>,
    window_len: usize,
}

impl ChannelBank {
    pub fn new(table: &ChannelTable, window_len: usize) -> Result<Self, BufferError> {
        let buffers = table
            .names()
            .iter()
            .map(|_| ChannelBuffer::new(window_len))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            names: table.names().to_vec(),
            buffers,
            window_len,
        })
    }

    pub fn buffer(&self, index: usize) -> Option<&ChannelBuffer> {
        self.buffers.get(index)
    }

    pub fn buffer_mut(&mut self, index: usize) -> Option<&mut ChannelBuffer> {
        self.buffers.get_mut(index)
    }

    pub fn get(&self, name: &str) -> Option<&ChannelBuffer> {
        self.names
            .iter()
            .position(|n| n.as_str() == name)
            .map(|idx| &self.buffers[idx])
    }

    pub fn snapshot(&self, index: usize) -> Option<ChannelSnapshot> {
        let buffer = self.buffers.get(index)?;
        Some(ChannelSnapshot {
            name: self.names[index].clone(),
            samples: buffer.snapshot(),
        })
    }

    pub fn names(&self) -> &[ChannelName] {
        &self.names
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
