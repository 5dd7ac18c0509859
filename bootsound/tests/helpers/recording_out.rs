//! Recording audio output for playback tests
//!
//! Records every port call (and a copy of each submitted block) into a
//! shared log so tests can inspect it after the worker thread has finished.

use bootsound::audio::{AudioOut, PortId, PortParams};
use bootsound::error::{PortError, PortOp};
use std::sync::{Arc, Mutex};

/// One call made against the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortCall {
    Open(PortParams),
    Output(Vec<u8>),
    Flush,
    Release,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingOut {
    calls: Arc<Mutex<Vec<PortCall>>>,
    fail_open_after: Option<usize>,
    next_id: u32,
}

impl RecordingOut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the open after `opens` successful ones
    pub fn failing_open_after(opens: usize) -> Self {
        Self {
            fail_open_after: Some(opens),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<PortCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Block lengths (in frames) of every opened port
    pub fn opened_lengths(&self) -> Vec<u32> {
        self.calls()
            .iter()
            .filter_map(|c| match c {
                PortCall::Open(p) => Some(p.sample_len),
                _ => None,
            })
            .collect()
    }

    /// All submitted block bytes, concatenated
    pub fn submitted_bytes(&self) -> Vec<u8> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PortCall::Output(bytes) => Some(bytes),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

impl AudioOut for RecordingOut {
    fn open_port(&mut self, params: PortParams) -> Result<PortId, PortError> {
        if self.fail_open_after == Some(self.next_id as usize) {
            return Err(PortError::new(PortOp::Open, "injected open failure"));
        }
        self.calls.lock().unwrap().push(PortCall::Open(params));
        self.next_id += 1;
        Ok(PortId(self.next_id))
    }

    fn output(&mut self, _port: PortId, block: Option<&[u8]>) -> Result<(), PortError> {
        let call = match block {
            Some(bytes) => PortCall::Output(bytes.to_vec()),
            None => PortCall::Flush,
        };
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    fn release_port(&mut self, _port: PortId) -> Result<(), PortError> {
        self.calls.lock().unwrap().push(PortCall::Release);
        Ok(())
    }
}
