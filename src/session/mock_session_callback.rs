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

use tokio::sync::Notify;
use tokio::time::{timeout, Duration};

use crate::params::fira_app_config_params::UwbAddress;
use crate::session::ranging_session::RangingSessionCallback;
use crate::transport::event::{RangingChangeReason, SessionHandle};

#[derive(Clone, Default)]
pub(crate) struct MockRangingSessionCallback {
    expected_calls: Arc<Mutex<VecDeque<ExpectedCall>>>,
    expect_call_consumed: Arc<Notify>,
    call_count: Arc<Mutex<usize>>,
}

impl MockRangingSessionCallback {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn expect_on_opened(&mut self, handle: SessionHandle) {
        self.push_expected_call(ExpectedCall::Opened { handle });
    }

    pub fn expect_on_open_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        self.push_expected_call(ExpectedCall::OpenFailed { handle, reason, detail });
    }

    pub fn expect_on_started(&mut self, handle: SessionHandle) {
        self.push_expected_call(ExpectedCall::Started { handle });
    }

    pub fn expect_on_start_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        self.push_expected_call(ExpectedCall::StartFailed { handle, reason, detail });
    }

    pub fn expect_on_reconfigured(&mut self, handle: SessionHandle) {
        self.push_expected_call(ExpectedCall::Reconfigured { handle });
    }

    pub fn expect_on_reconfigure_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        self.push_expected_call(ExpectedCall::ReconfigureFailed { handle, reason, detail });
    }

    pub fn expect_on_controlee_added(&mut self, handle: SessionHandle) {
        self.push_expected_call(ExpectedCall::ControleeAdded { handle });
    }

    pub fn expect_on_controlee_add_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        self.push_expected_call(ExpectedCall::ControleeAddFailed { handle, reason, detail });
    }

    pub fn expect_on_controlee_removed(&mut self, handle: SessionHandle) {
        self.push_expected_call(ExpectedCall::ControleeRemoved { handle });
    }

    pub fn expect_on_controlee_remove_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        self.push_expected_call(ExpectedCall::ControleeRemoveFailed { handle, reason, detail });
    }

    pub fn expect_on_paused(&mut self, handle: SessionHandle) {
        self.push_expected_call(ExpectedCall::Paused { handle });
    }

    pub fn expect_on_pause_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        self.push_expected_call(ExpectedCall::PauseFailed { handle, reason, detail });
    }

    pub fn expect_on_resumed(&mut self, handle: SessionHandle) {
        self.push_expected_call(ExpectedCall::Resumed { handle });
    }

    pub fn expect_on_resume_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        self.push_expected_call(ExpectedCall::ResumeFailed { handle, reason, detail });
    }

    pub fn expect_on_stopped(&mut self, handle: SessionHandle, reason: RangingChangeReason) {
        self.push_expected_call(ExpectedCall::Stopped { handle, reason });
    }

    pub fn expect_on_stop_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        self.push_expected_call(ExpectedCall::StopFailed { handle, reason, detail });
    }

    pub fn expect_on_closed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        self.push_expected_call(ExpectedCall::Closed { handle, reason, detail });
    }

    pub fn expect_on_data_sent(&mut self, handle: SessionHandle, remote: UwbAddress) {
        self.push_expected_call(ExpectedCall::DataSent { handle, remote });
    }

    pub fn expect_on_data_send_failed(
        &mut self,
        handle: SessionHandle,
        remote: UwbAddress,
        reason: RangingChangeReason,
    ) {
        self.push_expected_call(ExpectedCall::DataSendFailed { handle, remote, reason });
    }

    pub fn expect_on_data_received(
        &mut self,
        handle: SessionHandle,
        remote: UwbAddress,
        data: Vec<u8>,
    ) {
        self.push_expected_call(ExpectedCall::DataReceived { handle, remote, data });
    }

    pub fn expect_on_service_discovered(&mut self, handle: SessionHandle) {
        self.push_expected_call(ExpectedCall::ServiceDiscovered { handle });
    }

    pub fn expect_on_service_connected(&mut self, handle: SessionHandle) {
        self.push_expected_call(ExpectedCall::ServiceConnected { handle });
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

    /// The number of the callback invocations so far, expected or not.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn push_expected_call(&mut self, call: ExpectedCall) {
        self.expected_calls.lock().unwrap().push_back(call);
    }

    fn pop_expected_call(&mut self) -> ExpectedCall {
        *self.call_count.lock().unwrap() += 1;
        let call = self.expected_calls.lock().unwrap().pop_front().unwrap();
        self.expect_call_consumed.notify_one();
        call
    }
}

impl RangingSessionCallback for MockRangingSessionCallback {
    fn on_opened(&mut self, handle: SessionHandle) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::Opened { handle });
    }

    fn on_open_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::OpenFailed { handle, reason, detail });
    }

    fn on_started(&mut self, handle: SessionHandle) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::Started { handle });
    }

    fn on_start_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::StartFailed { handle, reason, detail });
    }

    fn on_reconfigured(&mut self, handle: SessionHandle) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::Reconfigured { handle });
    }

    fn on_reconfigure_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        assert_eq!(
            self.pop_expected_call(),
            ExpectedCall::ReconfigureFailed { handle, reason, detail }
        );
    }

    fn on_controlee_added(&mut self, handle: SessionHandle) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::ControleeAdded { handle });
    }

    fn on_controlee_add_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        assert_eq!(
            self.pop_expected_call(),
            ExpectedCall::ControleeAddFailed { handle, reason, detail }
        );
    }

    fn on_controlee_removed(&mut self, handle: SessionHandle) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::ControleeRemoved { handle });
    }

    fn on_controlee_remove_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        assert_eq!(
            self.pop_expected_call(),
            ExpectedCall::ControleeRemoveFailed { handle, reason, detail }
        );
    }

    fn on_paused(&mut self, handle: SessionHandle) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::Paused { handle });
    }

    fn on_pause_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::PauseFailed { handle, reason, detail });
    }

    fn on_resumed(&mut self, handle: SessionHandle) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::Resumed { handle });
    }

    fn on_resume_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::ResumeFailed { handle, reason, detail });
    }

    fn on_stopped(&mut self, handle: SessionHandle, reason: RangingChangeReason) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::Stopped { handle, reason });
    }

    fn on_stop_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    ) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::StopFailed { handle, reason, detail });
    }

    fn on_closed(&mut self, handle: SessionHandle, reason: RangingChangeReason, detail: Vec<u8>) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::Closed { handle, reason, detail });
    }

    fn on_data_sent(&mut self, handle: SessionHandle, remote: UwbAddress) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::DataSent { handle, remote });
    }

    fn on_data_send_failed(
        &mut self,
        handle: SessionHandle,
        remote: UwbAddress,
        reason: RangingChangeReason,
    ) {
        assert_eq!(
            self.pop_expected_call(),
            ExpectedCall::DataSendFailed { handle, remote, reason }
        );
    }

    fn on_data_received(&mut self, handle: SessionHandle, remote: UwbAddress, data: Vec<u8>) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::DataReceived { handle, remote, data });
    }

    fn on_service_discovered(&mut self, handle: SessionHandle) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::ServiceDiscovered { handle });
    }

    fn on_service_connected(&mut self, handle: SessionHandle) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::ServiceConnected { handle });
    }
}

#[derive(PartialEq, Debug)]
pub(crate) enum ExpectedCall {
    Opened { handle: SessionHandle },
    OpenFailed { handle: SessionHandle, reason: RangingChangeReason, detail: Vec<u8> },
    Started { handle: SessionHandle },
    StartFailed { handle: SessionHandle, reason: RangingChangeReason, detail: Vec<u8> },
    Reconfigured { handle: SessionHandle },
    ReconfigureFailed { handle: SessionHandle, reason: RangingChangeReason, detail: Vec<u8> },
    ControleeAdded { handle: SessionHandle },
    ControleeAddFailed { handle: SessionHandle, reason: RangingChangeReason, detail: Vec<u8> },
    ControleeRemoved { handle: SessionHandle },
    ControleeRemoveFailed { handle: SessionHandle, reason: RangingChangeReason, detail: Vec<u8> },
    Paused { handle: SessionHandle },
    PauseFailed { handle: SessionHandle, reason: RangingChangeReason, detail: Vec<u8> },
    Resumed { handle: SessionHandle },
    ResumeFailed { handle: SessionHandle, reason: RangingChangeReason, detail: Vec<u8> },
    Stopped { handle: SessionHandle, reason: RangingChangeReason },
    StopFailed { handle: SessionHandle, reason: RangingChangeReason, detail: Vec<u8> },
    Closed { handle: SessionHandle, reason: RangingChangeReason, detail: Vec<u8> },
    DataSent { handle: SessionHandle, remote: UwbAddress },
    DataSendFailed { handle: SessionHandle, remote: UwbAddress, reason: RangingChangeReason },
    DataReceived { handle: SessionHandle, remote: UwbAddress, data: Vec<u8> },
    ServiceDiscovered { handle: SessionHandle },
    ServiceConnected { handle: SessionHandle },
}
