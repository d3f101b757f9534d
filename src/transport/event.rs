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

//! This module defines the events that the ranging transport delivers back to this library.

use crate::params::fira_app_config_params::UwbAddress;

/// The handle of a ranging session.
///
/// The handle is allocated by the RangingManager and never reused within its lifetime. Every
/// transport event carries the handle of the session it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionHandle(u32);

impl SessionHandle {
    pub(crate) fn new(value: u32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionHandle({})", self.0)
    }
}

/// The reason of an asynchronous session change.
///
/// The reason is attached to the failure and teardown events. It is reported to the session
/// callback, never raised as an error.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangingChangeReason {
    Unknown,
    LocalRequest,
    RemoteRequest,
    BadParameters,
    GenericError,
    MaxSessionsReached,
    SystemPolicy,
    ProtocolSpecific,
    MaxRetryReached,
    ServiceDiscoveryFailure,
    ServiceConnectionFailure,
    SeNotSupported,
    SeInteractionFailure,
}

/// An asynchronous event of a single ranging session.
///
/// The failure and teardown events carry a [RangingChangeReason] and an opaque protocol-specific
/// detail payload.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Opened,
    OpenFailed { reason: RangingChangeReason, detail: Vec<u8> },
    Started,
    StartFailed { reason: RangingChangeReason, detail: Vec<u8> },
    Reconfigured,
    ReconfigureFailed { reason: RangingChangeReason, detail: Vec<u8> },
    ControleeAdded,
    ControleeAddFailed { reason: RangingChangeReason, detail: Vec<u8> },
    ControleeRemoved,
    ControleeRemoveFailed { reason: RangingChangeReason, detail: Vec<u8> },
    Paused,
    PauseFailed { reason: RangingChangeReason, detail: Vec<u8> },
    Resumed,
    ResumeFailed { reason: RangingChangeReason, detail: Vec<u8> },
    Stopped { reason: RangingChangeReason },
    StopFailed { reason: RangingChangeReason, detail: Vec<u8> },
    Closed { reason: RangingChangeReason, detail: Vec<u8> },
    DataSent { remote: UwbAddress },
    DataSendFailed { remote: UwbAddress, reason: RangingChangeReason },
    DataReceived { remote: UwbAddress, data: Vec<u8> },
    ServiceDiscovered,
    ServiceConnected,
}

/// A session event tagged with the handle of the originating session.
///
/// The transport sends every event of every session into one sink; the RangingManager dispatches
/// them on the handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    /// The handle of the session the event belongs to.
    pub handle: SessionHandle,
    /// The event itself.
    pub event: SessionEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_handle_display() {
        assert_eq!(SessionHandle::new(7).to_string(), "SessionHandle(7)");
    }
}
