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

//! This module provides the interface between this library and the radio transport below it.

pub mod event;
pub mod ranging_transport;

#[cfg(any(test, feature = "mock-utils"))]
pub mod mock_ranging_transport;

// Re-export the public elements.
pub use event::{RangingChangeReason, SessionEvent, SessionHandle, TransportEvent};
pub use ranging_transport::{AttributionSource, Controlee, NopRangingTransport, RangingTransport};
