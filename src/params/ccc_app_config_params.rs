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

use std::convert::TryFrom;

use log::error;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::cast::FromPrimitive;

use crate::error::{Error, Result};
use crate::params::app_config_params::{AppConfigParams, AppConfigTlvType};
use crate::params::fira_app_config_params::{
    DeviceRole, DeviceType, KeyRotation, MultiNodeMode, RangeDataNtfConfig, StsConfig,
};
use crate::params::tlv_buffer::{TlvBuffer, TlvBufferBuilder, TlvMap};
use crate::params::utils::{get_enum_field, validate};
use crate::utils::{builder_field, getter_field};

const CHAP_IN_RSTU: u16 = 400; // 1 Chap = 400 RSTU.
const MINIMUM_BLOCK_DURATION_MS: u32 = 96;

// The constant config values for CCC. They are written to the TLV stream but skipped when one
// is decoded.
const CCC_DEVICE_TYPE: DeviceType = DeviceType::Controlee;
const CCC_STS_CONFIG: StsConfig = StsConfig::Dynamic;
const CCC_MULTI_NODE_MODE: MultiNodeMode = MultiNodeMode::OneToMany;
const CCC_RANGE_DATA_NTF_CONFIG: RangeDataNtfConfig = RangeDataNtfConfig::Disable;
const CCC_DEVICE_ROLE: DeviceRole = DeviceRole::Initiator;
const CCC_KEY_ROTATION: KeyRotation = KeyRotation::Enable;
const CCC_URSK_TTL: u16 = 0x2D0;

const DEFAULT_PROTOCOL_VERSION: CccProtocolVersion = CccProtocolVersion { major: 1, minor: 0 };

/// The CCC ranging session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CccOpenRangingParams {
    protocol_version: CccProtocolVersion,
    uwb_config: CccUwbConfig,
    pulse_shape_combo: CccPulseShapeCombo,
    ran_multiplier: u32,
    channel_number: CccUwbChannel,
    chaps_per_slot: ChapsPerSlot,
    num_responder_nodes: u8,
    slots_per_rr: u8,
    sync_code_index: u8,
    hopping_mode: CccHoppingMode,
}

#[allow(missing_docs)]
impl CccOpenRangingParams {
    // Generate the getter methods for all the fields.
    getter_field!(protocol_version, CccProtocolVersion);
    getter_field!(uwb_config, CccUwbConfig);
    getter_field!(pulse_shape_combo, CccPulseShapeCombo);
    getter_field!(ran_multiplier, u32);
    getter_field!(channel_number, CccUwbChannel);
    getter_field!(chaps_per_slot, ChapsPerSlot);
    getter_field!(num_responder_nodes, u8);
    getter_field!(slots_per_rr, u8);
    getter_field!(sync_code_index, u8);
    getter_field!(hopping_mode, CccHoppingMode);

    /// Generate the TLV stream for the whole parameter set.
    ///
    /// `SlotDuration` is the number of chaps converted to RSTU, and `RangingDuration` is the
    /// RAN multiplier converted to milliseconds.
    pub fn encode(&self) -> TlvBuffer {
        debug_assert!(self.is_valid().is_some());

        let mut builder = TlvBufferBuilder::new();
        builder
            .put_u8(AppConfigTlvType::DeviceType as u8, CCC_DEVICE_TYPE as u8)
            .put_u8(AppConfigTlvType::StsConfig as u8, CCC_STS_CONFIG as u8)
            .put_u8(AppConfigTlvType::MultiNodeMode as u8, CCC_MULTI_NODE_MODE as u8)
            .put_u8(AppConfigTlvType::ChannelNumber as u8, self.channel_number as u8)
            .put_u8(AppConfigTlvType::NoOfControlee as u8, self.num_responder_nodes)
            .put_u16(
                AppConfigTlvType::SlotDuration as u8,
                (self.chaps_per_slot as u16) * CHAP_IN_RSTU,
            )
            .put_u32(
                AppConfigTlvType::RangingDuration as u8,
                self.ran_multiplier * MINIMUM_BLOCK_DURATION_MS,
            )
            .put_u8(AppConfigTlvType::RngDataNtf as u8, CCC_RANGE_DATA_NTF_CONFIG as u8)
            .put_u8(AppConfigTlvType::DeviceRole as u8, CCC_DEVICE_ROLE as u8)
            .put_u8(AppConfigTlvType::PreambleCodeIndex as u8, self.sync_code_index)
            .put_u8(AppConfigTlvType::SlotsPerRr as u8, self.slots_per_rr)
            .put_u8(AppConfigTlvType::KeyRotation as u8, CCC_KEY_ROTATION as u8)
            .put_u8(AppConfigTlvType::HoppingMode as u8, self.hopping_mode as u8)
            .put_bytes(
                AppConfigTlvType::CccRangingProtocolVer as u8,
                &Vec::from(self.protocol_version.clone()),
            )
            .put_u16(AppConfigTlvType::CccUwbConfigId as u8, self.uwb_config as u16)
            .put_bytes(
                AppConfigTlvType::CccPulseshapeCombo as u8,
                &Vec::from(self.pulse_shape_combo.clone()),
            )
            .put_u16(AppConfigTlvType::CccUrskTtl as u8, CCC_URSK_TTL);
        builder.build()
    }

    /// Rebuild the typed parameters from a decoded TLV stream.
    ///
    /// The computed fields are divided back to their configured form; a duration that is not a
    /// multiple of its quantum is rejected. The constant tags are not read back.
    pub fn decode(map: &TlvMap) -> Result<AppConfigParams> {
        let slot_duration_rstu = map.get_u16(AppConfigTlvType::SlotDuration as u8)?;
        if slot_duration_rstu % CHAP_IN_RSTU != 0 {
            error!(
                "SlotDuration {} is not a multiple of {} RSTU",
                slot_duration_rstu, CHAP_IN_RSTU
            );
            return Err(Error::BadParameters);
        }
        let chaps = slot_duration_rstu / CHAP_IN_RSTU;
        let chaps_per_slot = ChapsPerSlot::from_u16(chaps).ok_or_else(|| {
            error!("Unsupported number of chaps per slot: {}", chaps);
            Error::BadParameters
        })?;

        let ranging_duration_ms = map.get_u32(AppConfigTlvType::RangingDuration as u8)?;
        if ranging_duration_ms % MINIMUM_BLOCK_DURATION_MS != 0 {
            error!(
                "RangingDuration {} is not a multiple of the {} ms block",
                ranging_duration_ms, MINIMUM_BLOCK_DURATION_MS
            );
            return Err(Error::BadParameters);
        }

        let uwb_config_value = map.get_u16(AppConfigTlvType::CccUwbConfigId as u8)?;
        let uwb_config = CccUwbConfig::from_u16(uwb_config_value).ok_or_else(|| {
            error!("Unrecognized CccUwbConfigId {:#06x}", uwb_config_value);
            Error::BadParameters
        })?;

        let mut builder = CccOpenRangingParamsBuilder::new();
        builder
            .protocol_version(CccProtocolVersion::try_from(
                map.get_bytes(AppConfigTlvType::CccRangingProtocolVer as u8)?,
            )?)
            .uwb_config(uwb_config)
            .pulse_shape_combo(CccPulseShapeCombo::try_from(
                map.get_bytes(AppConfigTlvType::CccPulseshapeCombo as u8)?,
            )?)
            .ran_multiplier(ranging_duration_ms / MINIMUM_BLOCK_DURATION_MS)
            .channel_number(get_enum_field(map, AppConfigTlvType::ChannelNumber as u8)?)
            .chaps_per_slot(chaps_per_slot)
            .num_responder_nodes(map.get_u8(AppConfigTlvType::NoOfControlee as u8)?)
            .slots_per_rr(map.get_u8(AppConfigTlvType::SlotsPerRr as u8)?)
            .sync_code_index(map.get_u8(AppConfigTlvType::PreambleCodeIndex as u8)?)
            .hopping_mode(get_enum_field(map, AppConfigTlvType::HoppingMode as u8)?);

        builder.build().ok_or_else(|| {
            error!("The decoded CCC session config failed validation");
            Error::BadParameters
        })
    }

    fn is_valid(&self) -> Option<()> {
        validate(
            (1..=32).contains(&self.sync_code_index),
            "sync_code_index should be between 1 to 32",
        )?;

        self.ran_multiplier.checked_mul(MINIMUM_BLOCK_DURATION_MS).or_else(|| {
            error!("ran_multiplier * MINIMUM_BLOCK_DURATION_MS overflows");
            None
        })?;

        Some(())
    }
}

pub struct CccOpenRangingParamsBuilder {
    protocol_version: CccProtocolVersion,
    uwb_config: Option<CccUwbConfig>,
    pulse_shape_combo: Option<CccPulseShapeCombo>,
    ran_multiplier: Option<u32>,
    channel_number: Option<CccUwbChannel>,
    chaps_per_slot: Option<ChapsPerSlot>,
    num_responder_nodes: Option<u8>,
    slots_per_rr: Option<u8>,
    sync_code_index: Option<u8>,
    hopping_mode: Option<CccHoppingMode>,
}

#[allow(clippy::new_without_default)]
impl CccOpenRangingParamsBuilder {
    pub fn new() -> Self {
        Self {
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            uwb_config: None,
            pulse_shape_combo: None,
            ran_multiplier: None,
            channel_number: None,
            chaps_per_slot: None,
            num_responder_nodes: None,
            slots_per_rr: None,
            sync_code_index: None,
            hopping_mode: None,
        }
    }

    pub fn build(&self) -> Option<AppConfigParams> {
        let params = CccOpenRangingParams {
            protocol_version: self.protocol_version.clone(),
            uwb_config: self.uwb_config?,
            pulse_shape_combo: self.pulse_shape_combo.clone()?,
            ran_multiplier: self.ran_multiplier?,
            channel_number: self.channel_number?,
            chaps_per_slot: self.chaps_per_slot?,
            num_responder_nodes: self.num_responder_nodes?,
            slots_per_rr: self.slots_per_rr?,
            sync_code_index: self.sync_code_index?,
            hopping_mode: self.hopping_mode?,
        };
        params.is_valid()?;
        Some(AppConfigParams::Ccc(params))
    }

    pub fn from_params(params: &AppConfigParams) -> Option<Self> {
        match params {
            AppConfigParams::Ccc(params) => Some(Self {
                protocol_version: params.protocol_version.clone(),
                uwb_config: Some(params.uwb_config),
                pulse_shape_combo: Some(params.pulse_shape_combo.clone()),
                ran_multiplier: Some(params.ran_multiplier),
                channel_number: Some(params.channel_number),
                chaps_per_slot: Some(params.chaps_per_slot),
                num_responder_nodes: Some(params.num_responder_nodes),
                slots_per_rr: Some(params.slots_per_rr),
                sync_code_index: Some(params.sync_code_index),
                hopping_mode: Some(params.hopping_mode),
            }),
            _ => None,
        }
    }

    // Generate the setter methods for all the fields.
    builder_field!(protocol_version, CccProtocolVersion);
    builder_field!(uwb_config, CccUwbConfig, Some);
    builder_field!(pulse_shape_combo, CccPulseShapeCombo, Some);
    builder_field!(ran_multiplier, u32, Some);
    builder_field!(channel_number, CccUwbChannel, Some);
    builder_field!(chaps_per_slot, ChapsPerSlot, Some);
    builder_field!(num_responder_nodes, u8, Some);
    builder_field!(slots_per_rr, u8, Some);
    builder_field!(sync_code_index, u8, Some);
    builder_field!(hopping_mode, CccHoppingMode, Some);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CccProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl From<CccProtocolVersion> for Vec<u8> {
    fn from(item: CccProtocolVersion) -> Self {
        vec![item.major, item.minor]
    }
}

impl TryFrom<&[u8]> for CccProtocolVersion {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self> {
        match value {
            [major, minor] => Ok(Self { major: *major, minor: *minor }),
            _ => {
                error!("CccRangingProtocolVer is not a 2-byte value");
                Err(Error::BadParameters)
            }
        }
    }
}

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum CccUwbConfig {
    Config0 = 0,
    Config1 = 1,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CccPulseShapeCombo {
    pub initiator_tx: PulseShape,
    pub responder_tx: PulseShape,
}

// The initiator pulse shape lives in the upper nibble, the responder one in the lower nibble.
const PULSE_SHAPE_COMBO_OFFSET: u8 = 4;

impl From<CccPulseShapeCombo> for Vec<u8> {
    fn from(item: CccPulseShapeCombo) -> Self {
        vec![((item.initiator_tx as u8) << PULSE_SHAPE_COMBO_OFFSET) | (item.responder_tx as u8)]
    }
}

impl TryFrom<&[u8]> for CccPulseShapeCombo {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self> {
        let combo = match value {
            [combo] => *combo,
            _ => {
                error!("CccPulseshapeCombo is not a 1-byte value");
                return Err(Error::BadParameters);
            }
        };

        let initiator_tx = PulseShape::from_u8(combo >> PULSE_SHAPE_COMBO_OFFSET).ok_or_else(|| {
            error!("Unrecognized initiator pulse shape in {:#04x}", combo);
            Error::BadParameters
        })?;
        let responder_tx = PulseShape::from_u8(combo & 0x0F).ok_or_else(|| {
            error!("Unrecognized responder pulse shape in {:#04x}", combo);
            Error::BadParameters
        })?;
        Ok(Self { initiator_tx, responder_tx })
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum PulseShape {
    SymmetricalRootRaisedCosine = 0x0,
    PrecursorFree = 0x1,
    PrecursorFreeSpecial = 0x2,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum CccUwbChannel {
    Channel5 = 5,
    Channel9 = 9,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum HoppingConfigMode {
    None = 0,
    Continuous = 1,
    Adaptive = 2,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum HoppingSequence {
    Default = 0,
    Aes = 1,
}

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum ChapsPerSlot {
    Value3 = 3,
    Value4 = 4,
    Value6 = 6,
    Value8 = 8,
    Value9 = 9,
    Value12 = 12,
    Value24 = 24,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum CccHoppingMode {
    Disable = 0,
    AdaptiveDefault = 2,
    ContinuousDefault = 3,
    AdaptiveAes = 4,
    ContinuousAes = 5,
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::utils::init_test_logging;

    fn default_builder() -> CccOpenRangingParamsBuilder {
        let mut builder = CccOpenRangingParamsBuilder::new();
        builder
            .protocol_version(CccProtocolVersion { major: 2, minor: 1 })
            .uwb_config(CccUwbConfig::Config0)
            .pulse_shape_combo(CccPulseShapeCombo {
                initiator_tx: PulseShape::PrecursorFree,
                responder_tx: PulseShape::PrecursorFreeSpecial,
            })
            .ran_multiplier(4)
            .channel_number(CccUwbChannel::Channel9)
            .chaps_per_slot(ChapsPerSlot::Value6)
            .num_responder_nodes(1)
            .slots_per_rr(3)
            .sync_code_index(12)
            .hopping_mode(CccHoppingMode::ContinuousAes);
        builder
    }

    #[test]
    fn test_ok() {
        init_test_logging();

        let params = default_builder().build().unwrap();
        let buffer = params.encode();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();

        // Verify the computed and the combined records of the generated TLV stream.
        assert_eq!(map.get_u16(AppConfigTlvType::SlotDuration as u8).unwrap(), 6 * 400);
        // A RAN multiplier of 4 encodes as a 384 ms ranging duration.
        assert_eq!(map.get_u32(AppConfigTlvType::RangingDuration as u8).unwrap(), 384);
        assert_eq!(map.get_bytes(AppConfigTlvType::CccPulseshapeCombo as u8).unwrap(), &[0x12]);
        assert_eq!(map.get_bytes(AppConfigTlvType::CccRangingProtocolVer as u8).unwrap(), &[2, 1]);
        // The constant records are present as well.
        assert_eq!(
            map.get_u8(AppConfigTlvType::DeviceType as u8).unwrap(),
            CCC_DEVICE_TYPE as u8
        );
        assert_eq!(map.get_u16(AppConfigTlvType::CccUrskTtl as u8).unwrap(), CCC_URSK_TTL);

        // The decoded params equal the original ones.
        let decoded_params = CccOpenRangingParams::decode(&map).unwrap();
        assert_eq!(decoded_params, params);

        // Update a value through from_params.
        let updated_params = CccOpenRangingParamsBuilder::from_params(&params)
            .unwrap()
            .ran_multiplier(8)
            .build()
            .unwrap();
        match &updated_params {
            AppConfigParams::Ccc(params) => assert_eq!(params.ran_multiplier(), &8),
            _ => panic!("Not a Ccc params"),
        }
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(CccOpenRangingParamsBuilder::new().build().is_none());
        assert!(default_builder().build().is_some());
    }

    #[test]
    fn test_invalid_params() {
        init_test_logging();

        // sync_code_index out of range.
        let mut builder = default_builder();
        builder.sync_code_index(0);
        assert!(builder.build().is_none());
        let mut builder = default_builder();
        builder.sync_code_index(33);
        assert!(builder.build().is_none());

        // The ranging duration overflows.
        let mut builder = default_builder();
        builder.ran_multiplier(u32::MAX);
        assert!(builder.build().is_none());
    }

    #[test]
    fn test_decode_rejects_non_multiple_durations() {
        init_test_logging();

        let params = default_builder().build().unwrap();
        let buffer = params.encode();

        // Records 0 to 4 are 1-byte TLVs; SlotDuration and RangingDuration follow at offset 15.
        let bytes = buffer.bytes().to_vec();
        assert_eq!(&bytes[15..17], &[AppConfigTlvType::SlotDuration as u8, 0x02]);
        assert_eq!(&bytes[19..21], &[AppConfigTlvType::RangingDuration as u8, 0x04]);

        // A slot duration that is not a multiple of one chap.
        let mut tampered = bytes.clone();
        tampered[17] = tampered[17].wrapping_add(1);
        let map = TlvMap::parse(&tampered, buffer.record_count()).unwrap();
        assert_eq!(CccOpenRangingParams::decode(&map), Err(Error::BadParameters));

        // A ranging duration that is not a multiple of the minimum block duration.
        let mut tampered = bytes;
        tampered[21] = tampered[21].wrapping_add(1);
        let map = TlvMap::parse(&tampered, buffer.record_count()).unwrap();
        assert_eq!(CccOpenRangingParams::decode(&map), Err(Error::BadParameters));
    }

    #[test]
    fn test_pulse_shape_combo_byte() {
        let combo = CccPulseShapeCombo {
            initiator_tx: PulseShape::SymmetricalRootRaisedCosine,
            responder_tx: PulseShape::PrecursorFree,
        };
        let bytes: Vec<u8> = combo.clone().into();
        assert_eq!(bytes, vec![0x01]);
        assert_eq!(CccPulseShapeCombo::try_from(bytes.as_slice()).unwrap(), combo);

        // An unassigned pulse shape in either nibble is rejected.
        assert!(CccPulseShapeCombo::try_from([0x51_u8].as_slice()).is_err());
        assert!(CccPulseShapeCombo::try_from([0x05_u8].as_slice()).is_err());
    }
}
