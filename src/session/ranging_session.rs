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

//! This module provides the per-session state machine and the callback of a ranging session.

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::params::app_config_params::Protocol;
use crate::params::fira_app_config_params::UwbAddress;
use crate::transport::event::{RangingChangeReason, SessionEvent, SessionHandle};

/// The state of a ranging session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The session is created but the radio has not confirmed it yet.
    Init,
    /// The session is configured and ready to start the ranging rounds.
    Idle,
    /// The ranging rounds of the session are running.
    Active,
    /// The session is closed. It never leaves this state.
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            SessionState::Init => "INIT",
            SessionState::Idle => "IDLE",
            SessionState::Active => "ACTIVE",
            SessionState::Closed => "CLOSED",
        };
        write!(f, "{}", state)
    }
}

/// The callback of a ranging session, used to notify the session's owner of the session events.
///
/// All of the methods are invoked on the executor the owner provided at
/// [open_session](crate::session::session_manager::RangingManager::open_session), never inline
/// on the event dispatch path.
pub trait RangingSessionCallback: 'static + Send {
    /// Notify the session has been opened.
    fn on_opened(&mut self, handle: SessionHandle);
    /// Notify the open command has failed. The session is closed afterwards.
    fn on_open_failed(&mut self, handle: SessionHandle, reason: RangingChangeReason, detail: Vec<u8>);
    /// Notify the ranging rounds have started.
    fn on_started(&mut self, handle: SessionHandle);
    /// Notify the start command has failed.
    fn on_start_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    );
    /// Notify the reconfiguration has been applied.
    fn on_reconfigured(&mut self, handle: SessionHandle);
    /// Notify the reconfigure command has failed.
    fn on_reconfigure_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    );
    /// Notify the controlees have been added to the multicast list.
    fn on_controlee_added(&mut self, handle: SessionHandle);
    /// Notify the add controlee command has failed.
    fn on_controlee_add_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    );
    /// Notify the controlees have been removed from the multicast list.
    fn on_controlee_removed(&mut self, handle: SessionHandle);
    /// Notify the remove controlee command has failed.
    fn on_controlee_remove_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    );
    /// Notify the session has been paused.
    fn on_paused(&mut self, handle: SessionHandle);
    /// Notify the pause command has failed.
    fn on_pause_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    );
    /// Notify the session has been resumed.
    fn on_resumed(&mut self, handle: SessionHandle);
    /// Notify the resume command has failed.
    fn on_resume_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    );
    /// Notify the ranging rounds have stopped.
    fn on_stopped(&mut self, handle: SessionHandle, reason: RangingChangeReason);
    /// Notify the stop command has failed.
    fn on_stop_failed(
        &mut self,
        handle: SessionHandle,
        reason: RangingChangeReason,
        detail: Vec<u8>,
    );
    /// Notify the session has been closed.
    fn on_closed(&mut self, handle: SessionHandle, reason: RangingChangeReason, detail: Vec<u8>);
    /// Notify the data has been sent to the remote device.
    fn on_data_sent(&mut self, handle: SessionHandle, remote: UwbAddress);
    /// Notify the data could not be sent to the remote device.
    fn on_data_send_failed(
        &mut self,
        handle: SessionHandle,
        remote: UwbAddress,
        reason: RangingChangeReason,
    );
    /// Notify the data has been received from the remote device.
    fn on_data_received(&mut self, handle: SessionHandle, remote: UwbAddress, data: Vec<u8>);
    /// Notify the service discovery has completed on the session.
    fn on_service_discovered(&mut self, handle: SessionHandle);
    /// Notify the service connection has been established on the session.
    fn on_service_connected(&mut self, handle: SessionHandle);
}

/// A placeholder implementation for RangingSessionCallback that do nothing.
pub struct NopRangingSessionCallback {}

impl RangingSessionCallback for NopRangingSessionCallback {
    fn on_opened(&mut self, _handle: SessionHandle) {}
    fn on_open_failed(
        &mut self,
        _handle: SessionHandle,
        _reason: RangingChangeReason,
        _detail: Vec<u8>,
    ) {
    }
    fn on_started(&mut self, _handle: SessionHandle) {}
    fn on_start_failed(
        &mut self,
        _handle: SessionHandle,
        _reason: RangingChangeReason,
        _detail: Vec<u8>,
    ) {
    }
    fn on_reconfigured(&mut self, _handle: SessionHandle) {}
    fn on_reconfigure_failed(
        &mut self,
        _handle: SessionHandle,
        _reason: RangingChangeReason,
        _detail: Vec<u8>,
    ) {
    }
    fn on_controlee_added(&mut self, _handle: SessionHandle) {}
    fn on_controlee_add_failed(
        &mut self,
        _handle: SessionHandle,
        _reason: RangingChangeReason,
        _detail: Vec<u8>,
    ) {
    }
    fn on_controlee_removed(&mut self, _handle: SessionHandle) {}
    fn on_controlee_remove_failed(
        &mut self,
        _handle: SessionHandle,
        _reason: RangingChangeReason,
        _detail: Vec<u8>,
    ) {
    }
    fn on_paused(&mut self, _handle: SessionHandle) {}
    fn on_pause_failed(
        &mut self,
        _handle: SessionHandle,
        _reason: RangingChangeReason,
        _detail: Vec<u8>,
    ) {
    }
    fn on_resumed(&mut self, _handle: SessionHandle) {}
    fn on_resume_failed(
        &mut self,
        _handle: SessionHandle,
        _reason: RangingChangeReason,
        _detail: Vec<u8>,
    ) {
    }
    fn on_stopped(&mut self, _handle: SessionHandle, _reason: RangingChangeReason) {}
    fn on_stop_failed(
        &mut self,
        _handle: SessionHandle,
        _reason: RangingChangeReason,
        _detail: Vec<u8>,
    ) {
    }
    fn on_closed(
        &mut self,
        _handle: SessionHandle,
        _reason: RangingChangeReason,
        _detail: Vec<u8>,
    ) {
    }
    fn on_data_sent(&mut self, _handle: SessionHandle, _remote: UwbAddress) {}
    fn on_data_send_failed(
        &mut self,
        _handle: SessionHandle,
        _remote: UwbAddress,
        _reason: RangingChangeReason,
    ) {
    }
    fn on_data_received(&mut self, _handle: SessionHandle, _remote: UwbAddress, _data: Vec<u8>) {}
    fn on_service_discovered(&mut self, _handle: SessionHandle) {}
    fn on_service_connected(&mut self, _handle: SessionHandle) {}
}

/// The record of an open session, tracked by the RangingManager actor.
///
/// The record validates every incoming event against its state machine and forwards the accepted
/// ones into the per-session event channel. The callback driver at the other end of the channel
/// performs the actual callback invocation.
pub(crate) struct UwbSession {
    handle: SessionHandle,
    protocol: Protocol,
    state: SessionState,
    event_sender: mpsc::UnboundedSender<SessionEvent>,
}

impl UwbSession {
    pub fn new(
        handle: SessionHandle,
        protocol: Protocol,
        event_sender: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self { handle, protocol, state: SessionState::Init, event_sender }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Run the event against the state machine.
    ///
    /// An accepted event updates the state and is forwarded to the callback driver. A rejected
    /// event is dropped without a callback.
    pub fn handle_event(&mut self, event: SessionEvent) {
        let new_state = match (&event, self.state) {
            (SessionEvent::Opened, SessionState::Init) => Some(SessionState::Idle),
            (SessionEvent::OpenFailed { .. }, SessionState::Init) => Some(SessionState::Closed),
            (SessionEvent::Started, SessionState::Idle) => Some(SessionState::Active),
            (SessionEvent::StartFailed { .. }, SessionState::Idle) => Some(SessionState::Idle),
            (SessionEvent::Stopped { .. }, SessionState::Active) => Some(SessionState::Idle),
            (SessionEvent::StopFailed { .. }, SessionState::Active) => Some(SessionState::Active),
            // Closed is accepted from every state.
            (SessionEvent::Closed { .. }, _) => Some(SessionState::Closed),
            (
                SessionEvent::Reconfigured
                | SessionEvent::ReconfigureFailed { .. }
                | SessionEvent::ControleeAdded
                | SessionEvent::ControleeAddFailed { .. }
                | SessionEvent::ControleeRemoved
                | SessionEvent::ControleeRemoveFailed { .. }
                | SessionEvent::Paused
                | SessionEvent::PauseFailed { .. }
                | SessionEvent::Resumed
                | SessionEvent::ResumeFailed { .. }
                | SessionEvent::DataSent { .. }
                | SessionEvent::DataSendFailed { .. }
                | SessionEvent::DataReceived { .. }
                | SessionEvent::ServiceDiscovered
                | SessionEvent::ServiceConnected,
                SessionState::Idle | SessionState::Active,
            ) => Some(self.state),
            _ => None,
        };

        match new_state {
            Some(state) => {
                self.state = state;
                let _ = self.event_sender.send(event);
            }
            None => {
                warn!(
                    "Session {} in the state {} drops the event {:?}",
                    self.handle, self.state, event
                );
            }
        }
    }
}

/// Spawn the task that drives the session callback on the given executor.
///
/// The task ends when every sender of the event channel is dropped.
pub(crate) fn spawn_callback_driver(
    executor: tokio::runtime::Handle,
    mut callback: Box<dyn RangingSessionCallback>,
    handle: SessionHandle,
    mut event_receiver: mpsc::UnboundedReceiver<SessionEvent>,
) {
    executor.spawn(async move {
        while let Some(event) = event_receiver.recv().await {
            match event {
                SessionEvent::Opened => callback.on_opened(handle),
                SessionEvent::OpenFailed { reason, detail } => {
                    callback.on_open_failed(handle, reason, detail)
                }
                SessionEvent::Started => callback.on_started(handle),
                SessionEvent::StartFailed { reason, detail } => {
                    callback.on_start_failed(handle, reason, detail)
                }
                SessionEvent::Reconfigured => callback.on_reconfigured(handle),
                SessionEvent::ReconfigureFailed { reason, detail } => {
                    callback.on_reconfigure_failed(handle, reason, detail)
                }
                SessionEvent::ControleeAdded => callback.on_controlee_added(handle),
                SessionEvent::ControleeAddFailed { reason, detail } => {
                    callback.on_controlee_add_failed(handle, reason, detail)
                }
                SessionEvent::ControleeRemoved => callback.on_controlee_removed(handle),
                SessionEvent::ControleeRemoveFailed { reason, detail } => {
                    callback.on_controlee_remove_failed(handle, reason, detail)
                }
                SessionEvent::Paused => callback.on_paused(handle),
                SessionEvent::PauseFailed { reason, detail } => {
                    callback.on_pause_failed(handle, reason, detail)
                }
                SessionEvent::Resumed => callback.on_resumed(handle),
                SessionEvent::ResumeFailed { reason, detail } => {
                    callback.on_resume_failed(handle, reason, detail)
                }
                SessionEvent::Stopped { reason } => callback.on_stopped(handle, reason),
                SessionEvent::StopFailed { reason, detail } => {
                    callback.on_stop_failed(handle, reason, detail)
                }
                SessionEvent::Closed { reason, detail } => {
                    callback.on_closed(handle, reason, detail)
                }
                SessionEvent::DataSent { remote } => callback.on_data_sent(handle, remote),
                SessionEvent::DataSendFailed { remote, reason } => {
                    callback.on_data_send_failed(handle, remote, reason)
                }
                SessionEvent::DataReceived { remote, data } => {
                    callback.on_data_received(handle, remote, data)
                }
                SessionEvent::ServiceDiscovered => callback.on_service_discovered(handle),
                SessionEvent::ServiceConnected => callback.on_service_connected(handle),
            }
        }
        debug!("The callback driver of the session {} is about to drop.", handle);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::session::mock_session_callback::MockRangingSessionCallback;
    use crate::utils::init_test_logging;

    fn setup_session() -> (UwbSession, mpsc::UnboundedReceiver<SessionEvent>) {
        init_test_logging();

        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        (UwbSession::new(SessionHandle::new(1), Protocol::Fira, event_sender), event_receiver)
    }

    fn closed_event() -> SessionEvent {
        SessionEvent::Closed { reason: RangingChangeReason::LocalRequest, detail: vec![] }
    }

    #[test]
    fn test_init_state_accepts_only_open_events() {
        let (mut session, mut event_receiver) = setup_session();

        session.handle_event(SessionEvent::Started);
        session.handle_event(SessionEvent::Reconfigured);
        session.handle_event(SessionEvent::Stopped { reason: RangingChangeReason::Unknown });
        assert_eq!(session.state(), SessionState::Init);
        assert!(event_receiver.try_recv().is_err());

        session.handle_event(SessionEvent::Opened);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(event_receiver.try_recv().unwrap(), SessionEvent::Opened);
    }

    #[test]
    fn test_open_failed_closes_the_session() {
        let (mut session, mut event_receiver) = setup_session();

        session.handle_event(SessionEvent::OpenFailed {
            reason: RangingChangeReason::BadParameters,
            detail: vec![0x01],
        });
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(
            event_receiver.try_recv().unwrap(),
            SessionEvent::OpenFailed {
                reason: RangingChangeReason::BadParameters,
                detail: vec![0x01],
            }
        );
    }

    #[test]
    fn test_lifecycle_transitions() {
        let (mut session, mut event_receiver) = setup_session();

        session.handle_event(SessionEvent::Opened);
        assert_eq!(session.state(), SessionState::Idle);
        session.handle_event(SessionEvent::Started);
        assert_eq!(session.state(), SessionState::Active);
        session.handle_event(SessionEvent::Stopped { reason: RangingChangeReason::LocalRequest });
        assert_eq!(session.state(), SessionState::Idle);
        session.handle_event(SessionEvent::Started);
        assert_eq!(session.state(), SessionState::Active);
        session.handle_event(closed_event());
        assert_eq!(session.state(), SessionState::Closed);

        let mut forwarded_count = 0;
        while event_receiver.try_recv().is_ok() {
            forwarded_count += 1;
        }
        assert_eq!(forwarded_count, 5);
    }

    #[test]
    fn test_failed_events_keep_the_state() {
        let (mut session, mut event_receiver) = setup_session();

        session.handle_event(SessionEvent::Opened);
        session.handle_event(SessionEvent::StartFailed {
            reason: RangingChangeReason::GenericError,
            detail: vec![],
        });
        assert_eq!(session.state(), SessionState::Idle);

        session.handle_event(SessionEvent::Started);
        session.handle_event(SessionEvent::StopFailed {
            reason: RangingChangeReason::GenericError,
            detail: vec![],
        });
        assert_eq!(session.state(), SessionState::Active);

        let mut forwarded_count = 0;
        while event_receiver.try_recv().is_ok() {
            forwarded_count += 1;
        }
        assert_eq!(forwarded_count, 4);
    }

    #[test]
    fn test_pass_through_events_keep_the_state() {
        let (mut session, mut event_receiver) = setup_session();

        session.handle_event(SessionEvent::Opened);
        session.handle_event(SessionEvent::Reconfigured);
        session.handle_event(SessionEvent::ControleeAdded);
        assert_eq!(session.state(), SessionState::Idle);

        session.handle_event(SessionEvent::Started);
        session.handle_event(SessionEvent::Paused);
        session.handle_event(SessionEvent::Resumed);
        session.handle_event(SessionEvent::DataReceived {
            remote: UwbAddress::Short([1, 2]),
            data: vec![0x0A, 0x0B],
        });
        assert_eq!(session.state(), SessionState::Active);

        let mut forwarded_count = 0;
        while event_receiver.try_recv().is_ok() {
            forwarded_count += 1;
        }
        assert_eq!(forwarded_count, 7);
    }

    #[test]
    fn test_closed_state_drops_every_event_except_closed() {
        let (mut session, mut event_receiver) = setup_session();

        session.handle_event(SessionEvent::Opened);
        session.handle_event(closed_event());
        assert_eq!(event_receiver.try_recv().unwrap(), SessionEvent::Opened);
        assert_eq!(event_receiver.try_recv().unwrap(), closed_event());

        session.handle_event(SessionEvent::Opened);
        session.handle_event(SessionEvent::Started);
        session.handle_event(SessionEvent::Reconfigured);
        session.handle_event(SessionEvent::DataReceived {
            remote: UwbAddress::Short([1, 2]),
            data: vec![],
        });
        assert_eq!(session.state(), SessionState::Closed);
        assert!(event_receiver.try_recv().is_err());

        // Closed is still accepted and forwarded once per delivery.
        session.handle_event(closed_event());
        assert_eq!(event_receiver.try_recv().unwrap(), closed_event());
    }

    #[tokio::test]
    async fn test_callback_driver_dispatches_on_the_executor() {
        init_test_logging();

        let handle = SessionHandle::new(7);
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let mut callback = MockRangingSessionCallback::new();
        callback.expect_on_opened(handle);
        callback.expect_on_stopped(handle, RangingChangeReason::RemoteRequest);
        callback.expect_on_data_received(handle, UwbAddress::Short([1, 2]), vec![0x0A]);

        spawn_callback_driver(
            tokio::runtime::Handle::current(),
            Box::new(callback.clone()),
            handle,
            event_receiver,
        );

        event_sender.send(SessionEvent::Opened).unwrap();
        event_sender
            .send(SessionEvent::Stopped { reason: RangingChangeReason::RemoteRequest })
            .unwrap();
        event_sender
            .send(SessionEvent::DataReceived { remote: UwbAddress::Short([1, 2]), data: vec![0x0A] })
            .unwrap();
        assert!(callback.wait_expected_calls_done().await);
        assert_eq!(callback.call_count(), 3);
    }
}
