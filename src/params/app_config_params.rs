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

#![allow(missing_docs)]

use log::error;

use crate::error::{Error, Result};
use crate::params::ccc_app_config_params::CccOpenRangingParams;
use crate::params::ccc_spec_params::CccSpecificationParams;
use crate::params::fira_app_config_params::{FiraOpenSessionParams, FiraReconfigureParams};
use crate::params::fira_spec_params::FiraSpecificationParams;
use crate::params::generic_spec_params::GenericSpecificationParams;
use crate::params::tlv_buffer::{TlvBuffer, TlvMap};

const FIRA_PROTOCOL_NAME: &str = "fira";
const CCC_PROTOCOL_NAME: &str = "ccc";
const GENERIC_PROTOCOL_NAME: &str = "generic";

/// The ranging protocol of a session.
///
/// Each protocol registers a name; the params of a session are dispatched on the protocol they
/// belong to, never on their runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Fira,
    Ccc,
    Generic,
}

impl Protocol {
    /// The registered name of the protocol.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fira => FIRA_PROTOCOL_NAME,
            Self::Ccc => CCC_PROTOCOL_NAME,
            Self::Generic => GENERIC_PROTOCOL_NAME,
        }
    }

    /// Look up a protocol by its registered name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            FIRA_PROTOCOL_NAME => Some(Self::Fira),
            CCC_PROTOCOL_NAME => Some(Self::Ccc),
            GENERIC_PROTOCOL_NAME => Some(Self::Generic),
            _ => None,
        }
    }
}

/// The application configuration parameters of a ranging session.
///
/// A session is opened with one of these. The variant decides the encoder that generates the
/// TLV stream handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppConfigParams {
    Fira(FiraOpenSessionParams),
    Ccc(CccOpenRangingParams),
}

impl AppConfigParams {
    /// The protocol the params belong to.
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Fira(_) => Protocol::Fira,
            Self::Ccc(_) => Protocol::Ccc,
        }
    }

    /// Generate the TLV stream from the params.
    pub fn encode(&self) -> TlvBuffer {
        match self {
            Self::Fira(params) => params.encode(),
            Self::Ccc(params) => params.encode(),
        }
    }

    /// Rebuild the params of the given protocol from a decoded TLV stream.
    pub fn decode(protocol: Protocol, map: &TlvMap) -> Result<Self> {
        match protocol {
            Protocol::Fira => FiraOpenSessionParams::decode(map),
            Protocol::Ccc => CccOpenRangingParams::decode(map),
            Protocol::Generic => {
                error!("The generic protocol does not define session config params");
                Err(Error::BadParameters)
            }
        }
    }
}

/// The parameters that reconfigure an opened session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconfigureParams {
    Fira(FiraReconfigureParams),
}

impl ReconfigureParams {
    /// The protocol the params belong to.
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Fira(_) => Protocol::Fira,
        }
    }

    /// Generate the TLV stream from the params.
    pub fn encode(&self) -> TlvBuffer {
        match self {
            Self::Fira(params) => params.encode(),
        }
    }

    /// Rebuild the params of the given protocol from a decoded TLV stream.
    pub fn decode(protocol: Protocol, map: &TlvMap) -> Result<Self> {
        match protocol {
            Protocol::Fira => FiraReconfigureParams::decode(map),
            _ => {
                error!("The {} protocol does not define reconfigure params", protocol.name());
                Err(Error::BadParameters)
            }
        }
    }
}

/// The capabilities of the UWB subsystem, as reported for one protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecificationParams {
    Fira(FiraSpecificationParams),
    Ccc(CccSpecificationParams),
    Generic(GenericSpecificationParams),
}

impl SpecificationParams {
    /// The protocol the params belong to.
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Fira(_) => Protocol::Fira,
            Self::Ccc(_) => Protocol::Ccc,
            Self::Generic(_) => Protocol::Generic,
        }
    }

    /// Rebuild the capabilities of the given protocol from a decoded TLV stream.
    pub fn decode(protocol: Protocol, map: &TlvMap) -> Result<Self> {
        match protocol {
            Protocol::Fira => FiraSpecificationParams::decode(map).map(Self::Fira),
            Protocol::Ccc => CccSpecificationParams::decode(map).map(Self::Ccc),
            Protocol::Generic => GenericSpecificationParams::decode(map).map(Self::Generic),
        }
    }
}

/// The assigned TLV tags of the application config parameters.
/// Ref: FiRa Consortium UWB Command Interface Generic Technical Specification Version 1.1.0,
/// with the CCC tags in the vendor-specific range.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppConfigTlvType {
    DeviceType = 0x00,
    RangingRoundUsage = 0x01,
    StsConfig = 0x02,
    MultiNodeMode = 0x03,
    ChannelNumber = 0x04,
    NoOfControlee = 0x05,
    DeviceMacAddress = 0x06,
    DstMacAddress = 0x07,
    SlotDuration = 0x08,
    RangingDuration = 0x09,
    MacFcsType = 0x0B,
    RangingRoundControl = 0x0C,
    AoaResultReq = 0x0D,
    RngDataNtf = 0x0E,
    RngDataNtfProximityNear = 0x0F,
    RngDataNtfProximityFar = 0x10,
    DeviceRole = 0x11,
    RframeConfig = 0x12,
    PreambleCodeIndex = 0x14,
    SfdId = 0x15,
    PsduDataRate = 0x16,
    PreambleDuration = 0x17,
    RangingTimeStruct = 0x1A,
    SlotsPerRr = 0x1B,
    PrfMode = 0x1F,
    ScheduledMode = 0x22,
    KeyRotation = 0x23,
    KeyRotationRate = 0x24,
    SessionPriority = 0x25,
    MacAddressMode = 0x26,
    VendorId = 0x27,
    StaticStsIv = 0x28,
    NumberOfStsSegments = 0x29,
    MaxRrRetry = 0x2A,
    HoppingMode = 0x2C,
    BlockStrideLength = 0x2D,
    ResultReportConfig = 0x2E,
    InBandTerminationAttemptCount = 0x2F,
    SubSessionId = 0x30,
    CccRangingProtocolVer = 0xA3,
    CccUwbConfigId = 0xA4,
    CccPulseshapeCombo = 0xA5,
    CccUrskTtl = 0xA6,
}

/// The assigned TLV tags of the capability parameters.
/// Ref: FiRa Consortium UWB Command Interface Generic Technical Specification Version 1.1.0,
/// with the CCC tags in the vendor-specific range.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapTlvType {
    SupportedFiraPhyVersionRange = 0x00,
    SupportedFiraMacVersionRange = 0x01,
    SupportedDeviceRoles = 0x02,
    SupportedRangingMethod = 0x03,
    SupportedStsConfig = 0x04,
    SupportedMultiNodeModes = 0x05,
    SupportedRangingTimeStruct = 0x06,
    SupportedScheduledMode = 0x07,
    SupportedHoppingMode = 0x08,
    SupportedBlockStriding = 0x09,
    SupportedUwbInitiationTime = 0x0A,
    SupportedChannels = 0x0B,
    SupportedRframeConfig = 0x0C,
    SupportedCcConstraintLength = 0x0D,
    SupportedBprfParameterSets = 0x0E,
    SupportedHprfParameterSets = 0x0F,
    SupportedAoa = 0x10,
    SupportedExtendedMacAddress = 0x11,
    CccSupportedChapsPerSlot = 0xA0,
    CccSupportedSyncCodes = 0xA1,
    CccSupportedHoppingConfigModesAndSequences = 0xA2,
    CccSupportedChannels = 0xA3,
    CccSupportedVersions = 0xA4,
    CccSupportedUwbConfigs = 0xA5,
    CccSupportedPulseShapeCombos = 0xA6,
    CccSupportedRanMultiplier = 0xA7,
    SupportedPowerStats = 0xC0,
}
