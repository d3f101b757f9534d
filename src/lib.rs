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

//! uwb_ranging is the protocol-aware control layer of an UWB ranging stack.
//!
//! The library is organized into three layers:
//! - `params`: the parameters of the FiRa and CCC protocols, and the TLV codec that converts
//!   them to and from the wire format consumed by the radio below.
//! - `session`: the `RangingManager` that opens ranging sessions, tracks their states, and
//!   dispatches the radio's events to the clients' callbacks.
//! - `transport`: the `RangingTransport` trait that the platform implements to connect this
//!   library to the actual radio.

pub mod error;
pub mod params;
pub mod session;
pub mod transport;

mod utils;
