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
use num_traits::cast::FromPrimitive;

use crate::error::{Error, Result};
use crate::params::app_config_params::CapTlvType;
use crate::params::ccc_app_config_params::{
    CccProtocolVersion, CccPulseShapeCombo, CccUwbChannel, CccUwbConfig, ChapsPerSlot,
    HoppingConfigMode, HoppingSequence,
};
use crate::params::tlv_buffer::TlvMap;
use crate::params::utils::flags_from_bits;

const SUPPORTED_CHAPS_PER_SLOT_BITS: &[(u8, ChapsPerSlot)] = &[
    (0, ChapsPerSlot::Value3),
    (1, ChapsPerSlot::Value4),
    (2, ChapsPerSlot::Value6),
    (3, ChapsPerSlot::Value8),
    (4, ChapsPerSlot::Value9),
    (5, ChapsPerSlot::Value12),
    (6, ChapsPerSlot::Value24),
];
const SUPPORTED_CHANNELS_BITS: &[(u8, CccUwbChannel)] =
    &[(0, CccUwbChannel::Channel5), (1, CccUwbChannel::Channel9)];
// One tag reports the hopping support, with the config modes in the low bits and the sequences
// above them.
const SUPPORTED_HOPPING_CONFIG_MODES_BITS: &[(u8, HoppingConfigMode)] = &[
    (0, HoppingConfigMode::None),
    (1, HoppingConfigMode::Continuous),
    (2, HoppingConfigMode::Adaptive),
];
const SUPPORTED_HOPPING_SEQUENCES_BITS: &[(u8, HoppingSequence)] =
    &[(3, HoppingSequence::Aes), (4, HoppingSequence::Default)];

/// The CCC capabilities of the UWB subsystem.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CccSpecificationParams {
    pub supported_versions: Vec<CccProtocolVersion>,
    pub supported_uwb_configs: Vec<CccUwbConfig>,
    pub supported_pulse_shape_combos: Vec<CccPulseShapeCombo>,
    pub max_ran_multiplier: u32,
    pub supported_chaps_per_slot: Vec<ChapsPerSlot>,
    pub supported_sync_codes: Vec<u8>,
    pub supported_channels: Vec<CccUwbChannel>,
    pub supported_hopping_config_modes: Vec<HoppingConfigMode>,
    pub supported_hopping_sequences: Vec<HoppingSequence>,
}

impl CccSpecificationParams {
    /// Rebuild the capabilities from a decoded TLV stream.
    ///
    /// Every tag is optional. A missing list decodes to an empty set and a missing multiplier
    /// to 0.
    pub fn decode(map: &TlvMap) -> Result<Self> {
        let supported_versions =
            match map.get_optional_bytes(CapTlvType::CccSupportedVersions as u8) {
                Some(bytes) => versions_from_bytes(bytes)?,
                None => Vec::new(),
            };
        let supported_uwb_configs =
            match map.get_optional_bytes(CapTlvType::CccSupportedUwbConfigs as u8) {
                Some(bytes) => uwb_configs_from_bytes(bytes)?,
                None => Vec::new(),
            };
        let supported_pulse_shape_combos =
            match map.get_optional_bytes(CapTlvType::CccSupportedPulseShapeCombos as u8) {
                Some(bytes) => pulse_shape_combos_from_bytes(bytes)?,
                None => Vec::new(),
            };
        let hopping_bits = map
            .get_optional_u8(CapTlvType::CccSupportedHoppingConfigModesAndSequences as u8)?
            .map_or(0, u64::from);

        Ok(Self {
            supported_versions,
            supported_uwb_configs,
            supported_pulse_shape_combos,
            max_ran_multiplier: map
                .get_optional_u32(CapTlvType::CccSupportedRanMultiplier as u8)?
                .unwrap_or(0),
            supported_chaps_per_slot: flags_from_bits(
                map.get_optional_u8(CapTlvType::CccSupportedChapsPerSlot as u8)?
                    .map_or(0, u64::from),
                SUPPORTED_CHAPS_PER_SLOT_BITS,
            ),
            supported_sync_codes: sync_codes_from_bits(
                map.get_optional_u32(CapTlvType::CccSupportedSyncCodes as u8)?.unwrap_or(0),
            ),
            supported_channels: flags_from_bits(
                map.get_optional_u8(CapTlvType::CccSupportedChannels as u8)?.map_or(0, u64::from),
                SUPPORTED_CHANNELS_BITS,
            ),
            supported_hopping_config_modes: flags_from_bits(
                hopping_bits,
                SUPPORTED_HOPPING_CONFIG_MODES_BITS,
            ),
            supported_hopping_sequences: flags_from_bits(
                hopping_bits,
                SUPPORTED_HOPPING_SEQUENCES_BITS,
            ),
        })
    }
}

fn versions_from_bytes(bytes: &[u8]) -> Result<Vec<CccProtocolVersion>> {
    if bytes.len() % 2 != 0 {
        error!("CccSupportedVersions is not a list of 2-byte values");
        return Err(Error::BadParameters);
    }
    bytes.chunks_exact(2).map(CccProtocolVersion::try_from).collect()
}

fn uwb_configs_from_bytes(bytes: &[u8]) -> Result<Vec<CccUwbConfig>> {
    if bytes.len() % 2 != 0 {
        error!("CccSupportedUwbConfigs is not a list of 2-byte values");
        return Err(Error::BadParameters);
    }
    bytes
        .chunks_exact(2)
        .map(|chunk| {
            let value = u16::from_le_bytes([chunk[0], chunk[1]]);
            CccUwbConfig::from_u16(value).ok_or_else(|| {
                error!("Unrecognized CCC UWB config {:#06x}", value);
                Error::BadParameters
            })
        })
        .collect()
}

fn pulse_shape_combos_from_bytes(bytes: &[u8]) -> Result<Vec<CccPulseShapeCombo>> {
    bytes.chunks_exact(1).map(CccPulseShapeCombo::try_from).collect()
}

// Bit i of the sync code bitmask reports the support of the code index i + 1.
fn sync_codes_from_bits(value: u32) -> Vec<u8> {
    (0..32).filter(|i| value & (1u32 << i) != 0).map(|i| i as u8 + 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::params::ccc_app_config_params::PulseShape;
    use crate::params::tlv_buffer::TlvBufferBuilder;
    use crate::utils::init_test_logging;

    #[test]
    fn test_decode_ok() {
        init_test_logging();

        let buffer = TlvBufferBuilder::new()
            .put_u8(CapTlvType::CccSupportedChapsPerSlot as u8, 0b0100101)
            .put_u32(CapTlvType::CccSupportedSyncCodes as u8, 0x0000_0009)
            .put_u8(CapTlvType::CccSupportedHoppingConfigModesAndSequences as u8, 0b11010)
            .put_u8(CapTlvType::CccSupportedChannels as u8, 0b11)
            .put_bytes(CapTlvType::CccSupportedVersions as u8, &[1, 0, 2, 0])
            .put_bytes(CapTlvType::CccSupportedUwbConfigs as u8, &[0, 0, 1, 0])
            .put_bytes(CapTlvType::CccSupportedPulseShapeCombos as u8, &[0x10, 0x01])
            .put_u32(CapTlvType::CccSupportedRanMultiplier as u8, 24)
            .build();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        let params = CccSpecificationParams::decode(&map).unwrap();

        assert_eq!(
            params,
            CccSpecificationParams {
                supported_versions: vec![
                    CccProtocolVersion { major: 1, minor: 0 },
                    CccProtocolVersion { major: 2, minor: 0 },
                ],
                supported_uwb_configs: vec![CccUwbConfig::Config0, CccUwbConfig::Config1],
                supported_pulse_shape_combos: vec![
                    CccPulseShapeCombo {
                        initiator_tx: PulseShape::PrecursorFree,
                        responder_tx: PulseShape::SymmetricalRootRaisedCosine,
                    },
                    CccPulseShapeCombo {
                        initiator_tx: PulseShape::SymmetricalRootRaisedCosine,
                        responder_tx: PulseShape::PrecursorFree,
                    },
                ],
                max_ran_multiplier: 24,
                supported_chaps_per_slot: vec![
                    ChapsPerSlot::Value3,
                    ChapsPerSlot::Value6,
                    ChapsPerSlot::Value12
                ],
                supported_sync_codes: vec![1, 4],
                supported_channels: vec![CccUwbChannel::Channel5, CccUwbChannel::Channel9],
                supported_hopping_config_modes: vec![HoppingConfigMode::Continuous],
                supported_hopping_sequences: vec![
                    HoppingSequence::Aes,
                    HoppingSequence::Default
                ],
            }
        );
    }

    #[test]
    fn test_decode_empty_map_defaults() {
        let buffer = TlvBufferBuilder::new().build();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        assert_eq!(
            CccSpecificationParams::decode(&map).unwrap(),
            CccSpecificationParams::default()
        );
    }

    #[test]
    fn test_sync_codes_first_and_last() {
        let buffer = TlvBufferBuilder::new()
            .put_u32(CapTlvType::CccSupportedSyncCodes as u8, 0x8000_0001)
            .build();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        let params = CccSpecificationParams::decode(&map).unwrap();
        assert_eq!(params.supported_sync_codes, vec![1, 32]);
    }

    #[test]
    fn test_decode_malformed_lists_fail() {
        init_test_logging();

        // An odd number of version bytes.
        let buffer = TlvBufferBuilder::new()
            .put_bytes(CapTlvType::CccSupportedVersions as u8, &[1, 0, 2])
            .build();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        assert_eq!(CccSpecificationParams::decode(&map), Err(Error::BadParameters));

        // An unassigned UWB config id.
        let buffer = TlvBufferBuilder::new()
            .put_bytes(CapTlvType::CccSupportedUwbConfigs as u8, &[7, 0])
            .build();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        assert_eq!(CccSpecificationParams::decode(&map), Err(Error::BadParameters));

        // An unassigned pulse shape in a combo.
        let buffer = TlvBufferBuilder::new()
            .put_bytes(CapTlvType::CccSupportedPulseShapeCombos as u8, &[0x55])
            .build();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        assert_eq!(CccSpecificationParams::decode(&map), Err(Error::BadParameters));
    }
}
