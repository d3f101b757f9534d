// Copyright 2022, The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio::time::{timeout, Duration};

use crate::error::{Error, Result};
use crate::params::app_config_params::Protocol;
use crate::params::fira_app_config_params::UwbAddress;
use crate::params::tlv_buffer::TlvBuffer;
use crate::transport::event::{SessionHandle, TransportEvent};
use crate::transport::ranging_transport::{AttributionSource, Controlee, RangingTransport};

/// The mock implementation of RangingTransport for testing.
///
/// The mock is driven by a queue of expected calls. Each mocked method pops the front entry,
/// verifies the arguments against it, emits the entry's events through the injected event
/// sender, and returns the entry's result.
#[derive(Clone)]
pub struct MockRangingTransport {
    expected_calls: Arc<Mutex<VecDeque<ExpectedCall>>>,
    expect_call_consumed: Arc<Notify>,
    event_sender: mpsc::UnboundedSender<TransportEvent>,
}

impl MockRangingTransport {
    /// Create the mock. The `event_sender` is the sink the mocked calls emit their events into.
    pub fn new(event_sender: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self {
            expected_calls: Default::default(),
            expect_call_consumed: Default::default(),
            event_sender,
        }
    }

    pub fn expect_chip_ids(&mut self, out: Result<Vec<String>>) {
        self.push_expected_call(ExpectedCall::ChipIds { out });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn expect_open_ranging(
        &mut self,
        expected_attribution: AttributionSource,
        expected_handle: SessionHandle,
        expected_protocol: Protocol,
        expected_config: TlvBuffer,
        expected_chip_id: String,
        events: Vec<TransportEvent>,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::OpenRanging {
            expected_attribution,
            expected_handle,
            expected_protocol,
            expected_config,
            expected_chip_id,
            events,
            out,
        });
    }

    pub fn expect_start_ranging(
        &mut self,
        expected_handle: SessionHandle,
        events: Vec<TransportEvent>,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::StartRanging { expected_handle, events, out });
    }

    pub fn expect_stop_ranging(
        &mut self,
        expected_handle: SessionHandle,
        events: Vec<TransportEvent>,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::StopRanging { expected_handle, events, out });
    }

    pub fn expect_reconfigure_ranging(
        &mut self,
        expected_handle: SessionHandle,
        expected_config: TlvBuffer,
        events: Vec<TransportEvent>,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::ReconfigureRanging {
            expected_handle,
            expected_config,
            events,
            out,
        });
    }

    pub fn expect_add_controlee(
        &mut self,
        expected_handle: SessionHandle,
        expected_controlees: Vec<Controlee>,
        events: Vec<TransportEvent>,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::AddControlee {
            expected_handle,
            expected_controlees,
            events,
            out,
        });
    }

    pub fn expect_remove_controlee(
        &mut self,
        expected_handle: SessionHandle,
        expected_controlees: Vec<Controlee>,
        events: Vec<TransportEvent>,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::RemoveControlee {
            expected_handle,
            expected_controlees,
            events,
            out,
        });
    }

    pub fn expect_pause_ranging(
        &mut self,
        expected_handle: SessionHandle,
        events: Vec<TransportEvent>,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::PauseRanging { expected_handle, events, out });
    }

    pub fn expect_resume_ranging(
        &mut self,
        expected_handle: SessionHandle,
        events: Vec<TransportEvent>,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::ResumeRanging { expected_handle, events, out });
    }

    pub fn expect_send_data(
        &mut self,
        expected_handle: SessionHandle,
        expected_remote: UwbAddress,
        expected_sequence_number: u16,
        expected_data: Vec<u8>,
        events: Vec<TransportEvent>,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::SendData {
            expected_handle,
            expected_remote,
            expected_sequence_number,
            expected_data,
            events,
            out,
        });
    }

    pub fn expect_close_ranging(
        &mut self,
        expected_handle: SessionHandle,
        events: Vec<TransportEvent>,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::CloseRanging { expected_handle, events, out });
    }

    pub fn expect_caps_info(&mut self, expected_chip_id: String, out: Result<TlvBuffer>) {
        self.push_expected_call(ExpectedCall::CapsInfo { expected_chip_id, out });
    }

    /// Wait until all of the expected calls are consumed. Return false if it times out.
    pub async fn wait_expected_calls_done(&mut self) -> bool {
        while !self.expected_calls.lock().unwrap().is_empty() {
            if timeout(Duration::from_secs(1), self.expect_call_consumed.notified()).await.is_err()
            {
                return false;
            }
        }
        true
    }

    fn push_expected_call(&mut self, call: ExpectedCall) {
        self.expected_calls.lock().unwrap().push_back(call);
    }

    fn consume_call(&self, events: Vec<TransportEvent>) {
        self.expect_call_consumed.notify_one();
        for event in events.into_iter() {
            let _ = self.event_sender.send(event);
        }
    }
}

#[async_trait]
impl RangingTransport for MockRangingTransport {
    async fn chip_ids(&self) -> Result<Vec<String>> {
        let mut expected_calls = self.expected_calls.lock().unwrap();
        match expected_calls.pop_front() {
            Some(ExpectedCall::ChipIds { out }) => {
                self.consume_call(vec![]);
                out
            }
            Some(call) => {
                expected_calls.push_front(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn open_ranging(
        &self,
        attribution: AttributionSource,
        handle: SessionHandle,
        protocol: Protocol,
        config: TlvBuffer,
        chip_id: String,
    ) -> Result<()> {
        let mut expected_calls = self.expected_calls.lock().unwrap();
        match expected_calls.pop_front() {
            Some(ExpectedCall::OpenRanging {
                expected_attribution,
                expected_handle,
                expected_protocol,
                expected_config,
                expected_chip_id,
                events,
                out,
            }) if expected_attribution == attribution
                && expected_handle == handle
                && expected_protocol == protocol
                && expected_config == config
                && expected_chip_id == chip_id =>
            {
                self.consume_call(events);
                out
            }
            Some(call) => {
                expected_calls.push_front(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn start_ranging(&self, handle: SessionHandle) -> Result<()> {
        let mut expected_calls = self.expected_calls.lock().unwrap();
        match expected_calls.pop_front() {
            Some(ExpectedCall::StartRanging { expected_handle, events, out })
                if expected_handle == handle =>
            {
                self.consume_call(events);
                out
            }
            Some(call) => {
                expected_calls.push_front(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn stop_ranging(&self, handle: SessionHandle) -> Result<()> {
        let mut expected_calls = self.expected_calls.lock().unwrap();
        match expected_calls.pop_front() {
            Some(ExpectedCall::StopRanging { expected_handle, events, out })
                if expected_handle == handle =>
            {
                self.consume_call(events);
                out
            }
            Some(call) => {
                expected_calls.push_front(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn reconfigure_ranging(&self, handle: SessionHandle, config: TlvBuffer) -> Result<()> {
        let mut expected_calls = self.expected_calls.lock().unwrap();
        match expected_calls.pop_front() {
            Some(ExpectedCall::ReconfigureRanging {
                expected_handle,
                expected_config,
                events,
                out,
            }) if expected_handle == handle && expected_config == config => {
                self.consume_call(events);
                out
            }
            Some(call) => {
                expected_calls.push_front(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn add_controlee(
        &self,
        handle: SessionHandle,
        controlees: Vec<Controlee>,
    ) -> Result<()> {
        let mut expected_calls = self.expected_calls.lock().unwrap();
        match expected_calls.pop_front() {
            Some(ExpectedCall::AddControlee {
                expected_handle,
                expected_controlees,
                events,
                out,
            }) if expected_handle == handle && expected_controlees == controlees => {
                self.consume_call(events);
                out
            }
            Some(call) => {
                expected_calls.push_front(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn remove_controlee(
        &self,
        handle: SessionHandle,
        controlees: Vec<Controlee>,
    ) -> Result<()> {
        let mut expected_calls = self.expected_calls.lock().unwrap();
        match expected_calls.pop_front() {
            Some(ExpectedCall::RemoveControlee {
                expected_handle,
                expected_controlees,
                events,
                out,
            }) if expected_handle == handle && expected_controlees == controlees => {
                self.consume_call(events);
                out
            }
            Some(call) => {
                expected_calls.push_front(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn pause_ranging(&self, handle: SessionHandle) -> Result<()> {
        let mut expected_calls = self.expected_calls.lock().unwrap();
        match expected_calls.pop_front() {
            Some(ExpectedCall::PauseRanging { expected_handle, events, out })
                if expected_handle == handle =>
            {
                self.consume_call(events);
                out
            }
            Some(call) => {
                expected_calls.push_front(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn resume_ranging(&self, handle: SessionHandle) -> Result<()> {
        let mut expected_calls = self.expected_calls.lock().unwrap();
        match expected_calls.pop_front() {
            Some(ExpectedCall::ResumeRanging { expected_handle, events, out })
                if expected_handle == handle =>
            {
                self.consume_call(events);
                out
            }
            Some(call) => {
                expected_calls.push_front(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn send_data(
        &self,
        handle: SessionHandle,
        remote: UwbAddress,
        sequence_number: u16,
        data: Vec<u8>,
    ) -> Result<()> {
        let mut expected_calls = self.expected_calls.lock().unwrap();
        match expected_calls.pop_front() {
            Some(ExpectedCall::SendData {
                expected_handle,
                expected_remote,
                expected_sequence_number,
                expected_data,
                events,
                out,
            }) if expected_handle == handle
                && expected_remote == remote
                && expected_sequence_number == sequence_number
                && expected_data == data =>
            {
                self.consume_call(events);
                out
            }
            Some(call) => {
                expected_calls.push_front(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn close_ranging(&self, handle: SessionHandle) -> Result<()> {
        let mut expected_calls = self.expected_calls.lock().unwrap();
        match expected_calls.pop_front() {
            Some(ExpectedCall::CloseRanging { expected_handle, events, out })
                if expected_handle == handle =>
            {
                self.consume_call(events);
                out
            }
            Some(call) => {
                expected_calls.push_front(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn caps_info(&self, chip_id: String) -> Result<TlvBuffer> {
        let mut expected_calls = self.expected_calls.lock().unwrap();
        match expected_calls.pop_front() {
            Some(ExpectedCall::CapsInfo { expected_chip_id, out })
                if expected_chip_id == chip_id =>
            {
                self.consume_call(vec![]);
                out
            }
            Some(call) => {
                expected_calls.push_front(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }
}

enum ExpectedCall {
    ChipIds {
        out: Result<Vec<String>>,
    },
    OpenRanging {
        expected_attribution: AttributionSource,
        expected_handle: SessionHandle,
        expected_protocol: Protocol,
        expected_config: TlvBuffer,
        expected_chip_id: String,
        events: Vec<TransportEvent>,
        out: Result<()>,
    },
    StartRanging {
        expected_handle: SessionHandle,
        events: Vec<TransportEvent>,
        out: Result<()>,
    },
    StopRanging {
        expected_handle: SessionHandle,
        events: Vec<TransportEvent>,
        out: Result<()>,
    },
    ReconfigureRanging {
        expected_handle: SessionHandle,
        expected_config: TlvBuffer,
        events: Vec<TransportEvent>,
        out: Result<()>,
    },
    AddControlee {
        expected_handle: SessionHandle,
        expected_controlees: Vec<Controlee>,
        events: Vec<TransportEvent>,
        out: Result<()>,
    },
    RemoveControlee {
        expected_handle: SessionHandle,
        expected_controlees: Vec<Controlee>,
        events: Vec<TransportEvent>,
        out: Result<()>,
    },
    PauseRanging {
        expected_handle: SessionHandle,
        events: Vec<TransportEvent>,
        out: Result<()>,
    },
    ResumeRanging {
        expected_handle: SessionHandle,
        events: Vec<TransportEvent>,
        out: Result<()>,
    },
    SendData {
        expected_handle: SessionHandle,
        expected_remote: UwbAddress,
        expected_sequence_number: u16,
        expected_data: Vec<u8>,
        events: Vec<TransportEvent>,
        out: Result<()>,
    },
    CloseRanging {
        expected_handle: SessionHandle,
        events: Vec<TransportEvent>,
        out: Result<()>,
    },
    CapsInfo {
        expected_chip_id: String,
        out: Result<TlvBuffer>,
    },
}
