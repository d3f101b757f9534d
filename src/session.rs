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

//! This module provides the management of the ranging sessions of this library.

pub mod ranging_session;
pub mod session_manager;

#[cfg(test)]
pub(crate) mod mock_session_callback;

// Re-export the public elements.
pub use ranging_session::{NopRangingSessionCallback, RangingSessionCallback, SessionState};
pub use session_manager::{RangingManager, RangingSession};
