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

//! This module defines the RangingTransport trait, used for the radio transport below this
//! library.

use async_trait::async_trait;

use crate::error::Result;
use crate::params::app_config_params::Protocol;
use crate::params::fira_app_config_params::UwbAddress;
use crate::params::tlv_buffer::{TlvBuffer, TlvBufferBuilder};
use crate::transport::event::SessionHandle;

/// The identity of the caller a session is opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionSource {
    /// The uid of the caller.
    pub uid: u32,
    /// The package name of the caller.
    pub package_name: String,
}

/// A controlee entry of a controlee update command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controlee {
    /// The short MAC address of the controlee.
    pub short_address: [u8; 2],
    /// The sub-session id assigned to the controlee.
    pub sub_session_id: u32,
}

/// The trait for the radio transport below this library. The client of this library should
/// implement this trait and inject it into the library.
///
/// The transport reports the asynchronous completion of the commands as
/// [TransportEvent](crate::transport::event::TransportEvent)s through the event sink its owner
/// wires up at construction; the methods themselves only cover the synchronous part of each
/// command.
#[async_trait]
pub trait RangingTransport: 'static + Send + Sync {
    /// List the identifiers of the UWB chips the transport can reach.
    async fn chip_ids(&self) -> Result<Vec<String>>;

    /// Open a ranging session on the chip `chip_id` with the encoded session config.
    async fn open_ranging(
        &self,
        attribution: AttributionSource,
        handle: SessionHandle,
        protocol: Protocol,
        config: TlvBuffer,
        chip_id: String,
    ) -> Result<()>;

    /// Start the ranging rounds of the session.
    async fn start_ranging(&self, handle: SessionHandle) -> Result<()>;

    /// Stop the ranging rounds of the session, keeping it open.
    async fn stop_ranging(&self, handle: SessionHandle) -> Result<()>;

    /// Apply the encoded reconfiguration to the session.
    async fn reconfigure_ranging(&self, handle: SessionHandle, config: TlvBuffer) -> Result<()>;

    /// Add the controlees to the multicast list of the session.
    async fn add_controlee(
        &self,
        handle: SessionHandle,
        controlees: Vec<Controlee>,
    ) -> Result<()>;

    /// Remove the controlees from the multicast list of the session.
    async fn remove_controlee(
        &self,
        handle: SessionHandle,
        controlees: Vec<Controlee>,
    ) -> Result<()>;

    /// Pause the session.
    async fn pause_ranging(&self, handle: SessionHandle) -> Result<()>;

    /// Resume the paused session.
    async fn resume_ranging(&self, handle: SessionHandle) -> Result<()>;

    /// Send the application data to the remote device over the session.
    async fn send_data(
        &self,
        handle: SessionHandle,
        remote: UwbAddress,
        sequence_number: u16,
        data: Vec<u8>,
    ) -> Result<()>;

    /// Close the session and release its resources.
    async fn close_ranging(&self, handle: SessionHandle) -> Result<()>;

    /// Query the capability TLV stream of the chip `chip_id`.
    async fn caps_info(&self, chip_id: String) -> Result<TlvBuffer>;
}

/// A placeholder implementation for RangingTransport that do nothing.
pub struct NopRangingTransport {}

#[async_trait]
impl RangingTransport for NopRangingTransport {
    async fn chip_ids(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
    async fn open_ranging(
        &self,
        _attribution: AttributionSource,
        _handle: SessionHandle,
        _protocol: Protocol,
        _config: TlvBuffer,
        _chip_id: String,
    ) -> Result<()> {
        Ok(())
    }
    async fn start_ranging(&self, _handle: SessionHandle) -> Result<()> {
        Ok(())
    }
    async fn stop_ranging(&self, _handle: SessionHandle) -> Result<()> {
        Ok(())
    }
    async fn reconfigure_ranging(&self, _handle: SessionHandle, _config: TlvBuffer) -> Result<()> {
        Ok(())
    }
    async fn add_controlee(
        &self,
        _handle: SessionHandle,
        _controlees: Vec<Controlee>,
    ) -> Result<()> {
        Ok(())
    }
    async fn remove_controlee(
        &self,
        _handle: SessionHandle,
        _controlees: Vec<Controlee>,
    ) -> Result<()> {
        Ok(())
    }
    async fn pause_ranging(&self, _handle: SessionHandle) -> Result<()> {
        Ok(())
    }
    async fn resume_ranging(&self, _handle: SessionHandle) -> Result<()> {
        Ok(())
    }
    async fn send_data(
        &self,
        _handle: SessionHandle,
        _remote: UwbAddress,
        _sequence_number: u16,
        _data: Vec<u8>,
    ) -> Result<()> {
        Ok(())
    }
    async fn close_ranging(&self, _handle: SessionHandle) -> Result<()> {
        Ok(())
    }
    async fn caps_info(&self, _chip_id: String) -> Result<TlvBuffer> {
        Ok(TlvBufferBuilder::new().build())
    }
}
