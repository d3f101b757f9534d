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

use std::collections::BTreeMap;

use log::{debug, error, warn};
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::params::app_config_params::{AppConfigParams, ReconfigureParams};
use crate::params::fira_app_config_params::UwbAddress;
use crate::params::generic_spec_params::GenericSpecificationParams;
use crate::params::tlv_buffer::TlvMap;
use crate::session::ranging_session::{
    spawn_callback_driver, RangingSessionCallback, SessionState, UwbSession,
};
use crate::transport::event::{RangingChangeReason, SessionEvent, SessionHandle, TransportEvent};
use crate::transport::ranging_transport::{AttributionSource, Controlee, RangingTransport};

/// The RangingManager organizes the state machine of the open ranging sessions, sends the
/// session-related commands to the transport, and dispatches the transport events to the
/// sessions.
/// Using the actor model, RangingManager delegates the requests to RangingManagerActor.
pub struct RangingManager {
    cmd_sender: mpsc::UnboundedSender<(ManagerCommand, ResponseSender)>,
}

impl RangingManager {
    /// Create the manager on top of the transport.
    ///
    /// `event_receiver` is the receiving end of the channel the transport implementation emits
    /// its [TransportEvent]s into.
    pub fn new<T: RangingTransport>(
        transport: T,
        event_receiver: mpsc::UnboundedReceiver<TransportEvent>,
    ) -> Self {
        let (cmd_sender, cmd_receiver) = mpsc::unbounded_channel();
        let mut actor = RangingManagerActor::new(cmd_receiver, transport, event_receiver);
        tokio::spawn(async move { actor.run().await });

        Self { cmd_sender }
    }

    /// Open a new ranging session on the chip `chip_id`, or on the first chip of the transport
    /// when `chip_id` is `None`.
    ///
    /// The session events are delivered through the `callback`, invoked on the `executor`. The
    /// method returns once the transport accepts the open command; the session is IDLE only
    /// after the callback reports `on_opened()`.
    pub async fn open_session<C: RangingSessionCallback>(
        &mut self,
        attribution: AttributionSource,
        params: AppConfigParams,
        executor: tokio::runtime::Handle,
        callback: C,
        chip_id: Option<String>,
    ) -> Result<RangingSession> {
        match self
            .send_cmd(ManagerCommand::OpenSession {
                attribution,
                params,
                executor,
                callback: Box::new(callback),
                chip_id,
            })
            .await?
        {
            Response::Session { handle, event_sender } => {
                Ok(RangingSession { handle, cmd_sender: self.cmd_sender.clone(), event_sender })
            }
            _ => panic!("open_session() should return Session"),
        }
    }

    /// Query the capabilities of the chip `chip_id`, or of the first chip of the transport when
    /// `chip_id` is `None`.
    pub async fn specification_params(
        &mut self,
        chip_id: Option<String>,
    ) -> Result<GenericSpecificationParams> {
        match self.send_cmd(ManagerCommand::SpecificationParams { chip_id }).await? {
            Response::SpecificationParams(params) => Ok(params),
            _ => panic!("specification_params() should return SpecificationParams"),
        }
    }

    async fn send_cmd(&self, cmd: ManagerCommand) -> Result<Response> {
        let (result_sender, result_receiver) = oneshot::channel();
        self.cmd_sender.send((cmd, result_sender)).map_err(|_| {
            error!("Failed to send the command: the RangingManager actor is dropped");
            Error::Unknown
        })?;
        result_receiver.await.unwrap_or(Err(Error::Unknown))
    }
}

/// The client's handle of an open ranging session.
///
/// The methods are proxied to the RangingManager actor. Dropping the struct does not close the
/// session; call [close](Self::close) to release it.
pub struct RangingSession {
    handle: SessionHandle,
    cmd_sender: mpsc::UnboundedSender<(ManagerCommand, ResponseSender)>,
    event_sender: mpsc::UnboundedSender<SessionEvent>,
}

impl RangingSession {
    /// The handle that identifies the session.
    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    /// Start the ranging rounds of the session.
    pub async fn start(&mut self) -> Result<()> {
        self.send_null_cmd(ManagerCommand::StartRanging { handle: self.handle }).await
    }

    /// Stop the ranging rounds, keeping the session open.
    pub async fn stop(&mut self) -> Result<()> {
        self.send_null_cmd(ManagerCommand::StopRanging { handle: self.handle }).await
    }

    /// Apply the reconfiguration to the session.
    pub async fn reconfigure(&mut self, params: ReconfigureParams) -> Result<()> {
        self.send_null_cmd(ManagerCommand::Reconfigure { handle: self.handle, params }).await
    }

    /// Add the controlees to the multicast list of the session.
    pub async fn add_controlee(&mut self, controlees: Vec<Controlee>) -> Result<()> {
        self.send_null_cmd(ManagerCommand::AddControlee { handle: self.handle, controlees }).await
    }

    /// Remove the controlees from the multicast list of the session.
    pub async fn remove_controlee(&mut self, controlees: Vec<Controlee>) -> Result<()> {
        self.send_null_cmd(ManagerCommand::RemoveControlee { handle: self.handle, controlees })
            .await
    }

    /// Pause the ranging of the session.
    pub async fn pause(&mut self) -> Result<()> {
        self.send_null_cmd(ManagerCommand::PauseRanging { handle: self.handle }).await
    }

    /// Resume the paused ranging of the session.
    pub async fn resume(&mut self) -> Result<()> {
        self.send_null_cmd(ManagerCommand::ResumeRanging { handle: self.handle }).await
    }

    /// Send the application data to the remote device over the session.
    pub async fn send_data(
        &mut self,
        remote: UwbAddress,
        sequence_number: u16,
        data: Vec<u8>,
    ) -> Result<()> {
        self.send_null_cmd(ManagerCommand::SendData {
            handle: self.handle,
            remote,
            sequence_number,
            data,
        })
        .await
    }

    /// The current state of the session. A session the manager no longer tracks reports
    /// [SessionState::Closed].
    pub async fn state(&mut self) -> Result<SessionState> {
        match self.send_cmd(ManagerCommand::GetState { handle: self.handle }).await? {
            Response::State(state) => Ok(state),
            _ => panic!("state() should return State"),
        }
    }

    /// Close the session and release its resources.
    ///
    /// Closing an already closed session skips the transport and reports one more local Closed
    /// callback instead.
    pub async fn close(&mut self) -> Result<()> {
        match self.send_cmd(ManagerCommand::CloseSession { handle: self.handle }).await {
            Ok(Response::Null) => Ok(()),
            Ok(_) => panic!("close() should return Null"),
            Err(Error::WrongState(SessionState::Closed)) => {
                // Already closed: deliver one more local Closed callback.
                let _ = self.event_sender.send(SessionEvent::Closed {
                    reason: RangingChangeReason::LocalRequest,
                    detail: Vec::new(),
                });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn send_null_cmd(&self, cmd: ManagerCommand) -> Result<()> {
        match self.send_cmd(cmd).await? {
            Response::Null => Ok(()),
            _ => panic!("The command should return Null"),
        }
    }

    async fn send_cmd(&self, cmd: ManagerCommand) -> Result<Response> {
        let (result_sender, result_receiver) = oneshot::channel();
        self.cmd_sender.send((cmd, result_sender)).map_err(|_| {
            error!("Failed to send the command: the RangingManager actor is dropped");
            Error::Unknown
        })?;
        result_receiver.await.unwrap_or(Err(Error::Unknown))
    }
}

struct RangingManagerActor<T: RangingTransport> {
    cmd_receiver: mpsc::UnboundedReceiver<(ManagerCommand, ResponseSender)>,
    transport: T,
    event_receiver: mpsc::UnboundedReceiver<TransportEvent>,
    chip_ids: Vec<String>,
    handle_serial: u32,
    active_sessions: BTreeMap<SessionHandle, UwbSession>,
}

impl<T: RangingTransport> RangingManagerActor<T> {
    fn new(
        cmd_receiver: mpsc::UnboundedReceiver<(ManagerCommand, ResponseSender)>,
        transport: T,
        event_receiver: mpsc::UnboundedReceiver<TransportEvent>,
    ) -> Self {
        Self {
            cmd_receiver,
            transport,
            event_receiver,
            chip_ids: Vec::new(),
            handle_serial: 1,
            active_sessions: BTreeMap::new(),
        }
    }

    async fn run(&mut self) {
        match self.transport.chip_ids().await {
            Ok(chip_ids) => self.chip_ids = chip_ids,
            Err(e) => error!("Failed to list the chips of the transport: {:?}", e),
        }

        loop {
            tokio::select! {
                cmd = self.cmd_receiver.recv() => {
                    match cmd {
                        None => {
                            debug!("RangingManager is about to drop.");
                            break;
                        }
                        Some((cmd, result_sender)) => {
                            let result = self.handle_cmd(cmd).await;
                            let _ = result_sender.send(result);
                        }
                    }
                }

                Some(event) = self.event_receiver.recv() => {
                    self.handle_transport_event(event);
                }
            }
        }
    }

    async fn handle_cmd(&mut self, cmd: ManagerCommand) -> Result<Response> {
        match cmd {
            ManagerCommand::OpenSession { attribution, params, executor, callback, chip_id } => {
                self.open_session(attribution, params, executor, callback, chip_id).await
            }
            ManagerCommand::StartRanging { handle } => {
                self.check_state(handle, &[SessionState::Idle])?;
                self.transport.start_ranging(handle).await?;
                Ok(Response::Null)
            }
            ManagerCommand::StopRanging { handle } => {
                self.check_state(handle, &[SessionState::Active])?;
                self.transport.stop_ranging(handle).await?;
                Ok(Response::Null)
            }
            ManagerCommand::Reconfigure { handle, params } => {
                let protocol = self
                    .check_state(handle, &[SessionState::Idle, SessionState::Active])?
                    .protocol();
                if params.protocol() != protocol {
                    error!(
                        "The reconfigure params don't match the protocol of the session {}",
                        handle
                    );
                    return Err(Error::BadParameters);
                }
                self.transport.reconfigure_ranging(handle, params.encode()).await?;
                Ok(Response::Null)
            }
            ManagerCommand::AddControlee { handle, controlees } => {
                self.check_state(handle, &[SessionState::Idle, SessionState::Active])?;
                self.transport.add_controlee(handle, controlees).await?;
                Ok(Response::Null)
            }
            ManagerCommand::RemoveControlee { handle, controlees } => {
                self.check_state(handle, &[SessionState::Idle, SessionState::Active])?;
                self.transport.remove_controlee(handle, controlees).await?;
                Ok(Response::Null)
            }
            ManagerCommand::PauseRanging { handle } => {
                self.check_state(handle, &[SessionState::Active])?;
                self.transport.pause_ranging(handle).await?;
                Ok(Response::Null)
            }
            ManagerCommand::ResumeRanging { handle } => {
                self.check_state(handle, &[SessionState::Active])?;
                self.transport.resume_ranging(handle).await?;
                Ok(Response::Null)
            }
            ManagerCommand::SendData { handle, remote, sequence_number, data } => {
                self.check_state(handle, &[SessionState::Active])?;
                self.transport.send_data(handle, remote, sequence_number, data).await?;
                Ok(Response::Null)
            }
            ManagerCommand::CloseSession { handle } => {
                self.check_state(
                    handle,
                    &[SessionState::Init, SessionState::Idle, SessionState::Active],
                )?;
                self.transport.close_ranging(handle).await?;
                Ok(Response::Null)
            }
            ManagerCommand::GetState { handle } => {
                let state = self
                    .active_sessions
                    .get(&handle)
                    .map_or(SessionState::Closed, |session| session.state());
                Ok(Response::State(state))
            }
            ManagerCommand::SpecificationParams { chip_id } => {
                let chip_id = self.resolve_chip_id(chip_id)?;
                let caps = self.transport.caps_info(chip_id).await?;
                let map = TlvMap::parse(caps.bytes(), caps.record_count())?;
                Ok(Response::SpecificationParams(GenericSpecificationParams::decode(&map)?))
            }
        }
    }

    async fn open_session(
        &mut self,
        attribution: AttributionSource,
        params: AppConfigParams,
        executor: tokio::runtime::Handle,
        callback: Box<dyn RangingSessionCallback>,
        chip_id: Option<String>,
    ) -> Result<Response> {
        let chip_id = self.resolve_chip_id(chip_id)?;
        let handle = self.allocate_handle();
        let protocol = params.protocol();

        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        spawn_callback_driver(executor, callback, handle, event_receiver);

        // The record is stored before the transport call, so the events racing the reply still
        // find it. A failed open removes it again before the error is reported.
        self.active_sessions
            .insert(handle, UwbSession::new(handle, protocol, event_sender.clone()));

        match self
            .transport
            .open_ranging(attribution, handle, protocol, params.encode(), chip_id)
            .await
        {
            Ok(()) => Ok(Response::Session { handle, event_sender }),
            Err(e) => {
                error!("Failed to open the session {}: {:?}", handle, e);
                self.active_sessions.remove(&handle);
                Err(e)
            }
        }
    }

    fn resolve_chip_id(&self, chip_id: Option<String>) -> Result<String> {
        match chip_id {
            Some(chip_id) => {
                if self.chip_ids.contains(&chip_id) {
                    Ok(chip_id)
                } else {
                    error!("The chip {} is not known by the transport", chip_id);
                    Err(Error::BadParameters)
                }
            }
            None => self.chip_ids.first().cloned().ok_or_else(|| {
                error!("The transport reports no chip");
                Error::BadParameters
            }),
        }
    }

    // The serial number only grows. A handle is never reused, even after its session is closed.
    fn allocate_handle(&mut self) -> SessionHandle {
        let handle = SessionHandle::new(self.handle_serial);
        self.handle_serial += 1;
        handle
    }

    fn check_state(&self, handle: SessionHandle, allowed: &[SessionState]) -> Result<&UwbSession> {
        match self.active_sessions.get(&handle) {
            Some(session) if allowed.contains(&session.state()) => Ok(session),
            Some(session) => Err(Error::WrongState(session.state())),
            None => Err(Error::WrongState(SessionState::Closed)),
        }
    }

    fn handle_transport_event(&mut self, event: TransportEvent) {
        let TransportEvent { handle, event } = event;
        let session = match self.active_sessions.get_mut(&handle) {
            Some(session) => session,
            None => {
                warn!("Received an event of the unknown session {}: {:?}", handle, event);
                return;
            }
        };

        session.handle_event(event);
        if session.state() == SessionState::Closed {
            debug!("Session {} is closed and removed", handle);
            self.active_sessions.remove(&handle);
        }
    }
}

enum ManagerCommand {
    OpenSession {
        attribution: AttributionSource,
        params: AppConfigParams,
        executor: tokio::runtime::Handle,
        callback: Box<dyn RangingSessionCallback>,
        chip_id: Option<String>,
    },
    StartRanging {
        handle: SessionHandle,
    },
    StopRanging {
        handle: SessionHandle,
    },
    Reconfigure {
        handle: SessionHandle,
        params: ReconfigureParams,
    },
    AddControlee {
        handle: SessionHandle,
        controlees: Vec<Controlee>,
    },
    RemoveControlee {
        handle: SessionHandle,
        controlees: Vec<Controlee>,
    },
    PauseRanging {
        handle: SessionHandle,
    },
    ResumeRanging {
        handle: SessionHandle,
    },
    SendData {
        handle: SessionHandle,
        remote: UwbAddress,
        sequence_number: u16,
        data: Vec<u8>,
    },
    CloseSession {
        handle: SessionHandle,
    },
    GetState {
        handle: SessionHandle,
    },
    SpecificationParams {
        chip_id: Option<String>,
    },
}

enum Response {
    Null,
    Session { handle: SessionHandle, event_sender: mpsc::UnboundedSender<SessionEvent> },
    State(SessionState),
    SpecificationParams(GenericSpecificationParams),
}
type ResponseSender = oneshot::Sender<Result<Response>>;
