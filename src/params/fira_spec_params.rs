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

//! This module defines the FiRa capabilities reported by the UWB subsystem, decoded from the
//! capability TLV stream.

use log::error;

use crate::error::{Error, Result};
use crate::params::app_config_params::CapTlvType;
use crate::params::fira_app_config_params::{
    DeviceRole, MultiNodeMode, RangingRoundUsage, RframeConfig, StsConfig, UwbChannel,
};
use crate::params::tlv_buffer::TlvMap;
use crate::params::utils::flags_from_bits;

// The flag carried by each bit of the capability bitmasks. The bits that map to nothing are
// reserved and ignored.
const SUPPORTED_CHANNELS_BITS: &[(u8, UwbChannel)] = &[
    (0, UwbChannel::Channel5),
    (1, UwbChannel::Channel6),
    (2, UwbChannel::Channel8),
    (3, UwbChannel::Channel9),
    (4, UwbChannel::Channel10),
    (5, UwbChannel::Channel12),
    (6, UwbChannel::Channel13),
    (7, UwbChannel::Channel14),
];
const SUPPORTED_DEVICE_ROLES_BITS: &[(u8, DeviceRole)] =
    &[(0, DeviceRole::Responder), (1, DeviceRole::Initiator)];
const SUPPORTED_STS_CONFIGS_BITS: &[(u8, StsConfig)] = &[
    (0, StsConfig::Static),
    (1, StsConfig::Dynamic),
    (2, StsConfig::DynamicForControleeIndividualKey),
];
const SUPPORTED_MULTI_NODE_MODES_BITS: &[(u8, MultiNodeMode)] = &[
    (0, MultiNodeMode::Unicast),
    (1, MultiNodeMode::OneToMany),
    (2, MultiNodeMode::ManyToMany),
];
// Bit 0 is one-way ranging, which is not a ranging round usage.
const SUPPORTED_RANGING_ROUND_USAGES_BITS: &[(u8, RangingRoundUsage)] = &[
    (1, RangingRoundUsage::SsTwr),
    (2, RangingRoundUsage::DsTwr),
    (3, RangingRoundUsage::SsTwrNon),
    (4, RangingRoundUsage::DsTwrNon),
];
// Bit 2 is SP2, which is not usable for ranging.
const SUPPORTED_RFRAME_CONFIGS_BITS: &[(u8, RframeConfig)] =
    &[(0, RframeConfig::SP0), (1, RframeConfig::SP1), (3, RframeConfig::SP3)];
const SUPPORTED_AOA_BITS: &[(u8, AoaCapability)] = &[
    (0, AoaCapability::Azimuth90),
    (1, AoaCapability::Azimuth180),
    (2, AoaCapability::Elevation),
    (3, AoaCapability::Fom),
];

/// The FiRa version number, in the form of major.minor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FiraProtocolVersion {
    /// The major version number.
    pub major: u8,
    /// The minor version number.
    pub minor: u8,
}

/// The AoA measurement capability.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AoaCapability {
    /// Azimuth between -90 and 90 degree.
    Azimuth90,
    /// Azimuth between -180 and 180 degree.
    Azimuth180,
    Elevation,
    /// Figure of merit of the AoA measurements.
    Fom,
}

/// The FiRa capabilities of the UWB subsystem.
///
/// The version ranges are mandatory; every other tag is optional and decodes to an empty set or
/// `false` when absent.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiraSpecificationParams {
    pub min_phy_version: FiraProtocolVersion,
    pub max_phy_version: FiraProtocolVersion,
    pub min_mac_version: FiraProtocolVersion,
    pub max_mac_version: FiraProtocolVersion,
    pub supported_channels: Vec<UwbChannel>,
    pub supported_device_roles: Vec<DeviceRole>,
    pub supported_sts_configs: Vec<StsConfig>,
    pub supported_multi_node_modes: Vec<MultiNodeMode>,
    pub supported_ranging_round_usages: Vec<RangingRoundUsage>,
    pub supported_rframe_configs: Vec<RframeConfig>,
    pub supported_aoa_capabilities: Vec<AoaCapability>,
    pub has_block_striding_support: bool,
    pub has_extended_mac_address_support: bool,
}

impl FiraSpecificationParams {
    /// Rebuild the capabilities from a decoded TLV stream.
    pub fn decode(map: &TlvMap) -> Result<Self> {
        let (min_phy_version, max_phy_version) = version_range_from_bytes(
            map.get_bytes(CapTlvType::SupportedFiraPhyVersionRange as u8)?,
        )?;
        let (min_mac_version, max_mac_version) = version_range_from_bytes(
            map.get_bytes(CapTlvType::SupportedFiraMacVersionRange as u8)?,
        )?;

        Ok(Self {
            min_phy_version,
            max_phy_version,
            min_mac_version,
            max_mac_version,
            supported_channels: flags_from_bits(
                optional_bitmask(map, CapTlvType::SupportedChannels)?,
                SUPPORTED_CHANNELS_BITS,
            ),
            supported_device_roles: flags_from_bits(
                optional_bitmask(map, CapTlvType::SupportedDeviceRoles)?,
                SUPPORTED_DEVICE_ROLES_BITS,
            ),
            supported_sts_configs: flags_from_bits(
                optional_bitmask(map, CapTlvType::SupportedStsConfig)?,
                SUPPORTED_STS_CONFIGS_BITS,
            ),
            supported_multi_node_modes: flags_from_bits(
                optional_bitmask(map, CapTlvType::SupportedMultiNodeModes)?,
                SUPPORTED_MULTI_NODE_MODES_BITS,
            ),
            supported_ranging_round_usages: flags_from_bits(
                optional_bitmask(map, CapTlvType::SupportedRangingMethod)?,
                SUPPORTED_RANGING_ROUND_USAGES_BITS,
            ),
            supported_rframe_configs: flags_from_bits(
                optional_bitmask(map, CapTlvType::SupportedRframeConfig)?,
                SUPPORTED_RFRAME_CONFIGS_BITS,
            ),
            supported_aoa_capabilities: flags_from_bits(
                optional_bitmask(map, CapTlvType::SupportedAoa)?,
                SUPPORTED_AOA_BITS,
            ),
            has_block_striding_support: optional_flag(map, CapTlvType::SupportedBlockStriding)?,
            has_extended_mac_address_support: optional_flag(
                map,
                CapTlvType::SupportedExtendedMacAddress,
            )?,
        })
    }
}

fn version_range_from_bytes(
    bytes: &[u8],
) -> Result<(FiraProtocolVersion, FiraProtocolVersion)> {
    match bytes {
        [min_major, min_minor, max_major, max_minor] => Ok((
            FiraProtocolVersion { major: *min_major, minor: *min_minor },
            FiraProtocolVersion { major: *max_major, minor: *max_minor },
        )),
        _ => {
            error!("The version range is not a 4-byte value");
            Err(Error::BadParameters)
        }
    }
}

fn optional_bitmask(map: &TlvMap, tag: CapTlvType) -> Result<u64> {
    Ok(map.get_optional_u8(tag as u8)?.map_or(0, u64::from))
}

fn optional_flag(map: &TlvMap, tag: CapTlvType) -> Result<bool> {
    Ok(map.get_optional_u8(tag as u8)?.map_or(false, |value| value != 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::params::tlv_buffer::TlvBufferBuilder;
    use crate::utils::init_test_logging;

    const PHY_VERSION_RANGE: [u8; 4] = [1, 1, 2, 0];
    const MAC_VERSION_RANGE: [u8; 4] = [1, 1, 1, 3];

    fn version_builder() -> TlvBufferBuilder {
        let mut builder = TlvBufferBuilder::new();
        builder
            .put_bytes(CapTlvType::SupportedFiraPhyVersionRange as u8, &PHY_VERSION_RANGE)
            .put_bytes(CapTlvType::SupportedFiraMacVersionRange as u8, &MAC_VERSION_RANGE);
        builder
    }

    #[test]
    fn test_decode_ok() {
        init_test_logging();

        let buffer = version_builder()
            .put_u8(CapTlvType::SupportedChannels as u8, 0b0000_1010)
            .put_u8(CapTlvType::SupportedDeviceRoles as u8, 0b0000_0011)
            .put_u8(CapTlvType::SupportedStsConfig as u8, 0b0000_0011)
            .put_u8(CapTlvType::SupportedMultiNodeModes as u8, 0b0000_0100)
            .put_u8(CapTlvType::SupportedRangingMethod as u8, 0b0000_0110)
            .put_u8(CapTlvType::SupportedRframeConfig as u8, 0b0000_1011)
            .put_u8(CapTlvType::SupportedAoa as u8, 0b0000_0101)
            .put_u8(CapTlvType::SupportedBlockStriding as u8, 1)
            .build();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        let params = FiraSpecificationParams::decode(&map).unwrap();

        assert_eq!(
            params,
            FiraSpecificationParams {
                min_phy_version: FiraProtocolVersion { major: 1, minor: 1 },
                max_phy_version: FiraProtocolVersion { major: 2, minor: 0 },
                min_mac_version: FiraProtocolVersion { major: 1, minor: 1 },
                max_mac_version: FiraProtocolVersion { major: 1, minor: 3 },
                supported_channels: vec![UwbChannel::Channel6, UwbChannel::Channel9],
                supported_device_roles: vec![DeviceRole::Responder, DeviceRole::Initiator],
                supported_sts_configs: vec![StsConfig::Static, StsConfig::Dynamic],
                supported_multi_node_modes: vec![MultiNodeMode::ManyToMany],
                supported_ranging_round_usages: vec![
                    RangingRoundUsage::SsTwr,
                    RangingRoundUsage::DsTwr
                ],
                supported_rframe_configs: vec![
                    RframeConfig::SP0,
                    RframeConfig::SP1,
                    RframeConfig::SP3
                ],
                supported_aoa_capabilities: vec![
                    AoaCapability::Azimuth90,
                    AoaCapability::Elevation
                ],
                has_block_striding_support: true,
                has_extended_mac_address_support: false,
            }
        );
    }

    #[test]
    fn test_decode_ignores_reserved_bits() {
        let buffer = version_builder()
            .put_u8(CapTlvType::SupportedChannels as u8, 0xFF)
            // Only the SP2 bit, which maps to nothing.
            .put_u8(CapTlvType::SupportedRframeConfig as u8, 0b0000_0100)
            .put_u8(CapTlvType::SupportedAoa as u8, 0xF0)
            .build();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        let params = FiraSpecificationParams::decode(&map).unwrap();

        assert_eq!(params.supported_channels.len(), 8);
        assert_eq!(params.supported_rframe_configs, vec![]);
        assert_eq!(params.supported_aoa_capabilities, vec![]);
    }

    #[test]
    fn test_decode_missing_optional_tags() {
        let buffer = version_builder().build();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        let params = FiraSpecificationParams::decode(&map).unwrap();

        assert_eq!(params.supported_channels, vec![]);
        assert_eq!(params.supported_device_roles, vec![]);
        assert!(!params.has_block_striding_support);
        assert!(!params.has_extended_mac_address_support);
    }

    #[test]
    fn test_decode_missing_version_range_fails() {
        init_test_logging();

        let buffer = TlvBufferBuilder::new()
            .put_bytes(CapTlvType::SupportedFiraPhyVersionRange as u8, &PHY_VERSION_RANGE)
            .build();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        assert_eq!(FiraSpecificationParams::decode(&map), Err(Error::BadParameters));
    }

    #[test]
    fn test_decode_malformed_version_range_fails() {
        init_test_logging();

        let buffer = TlvBufferBuilder::new()
            .put_bytes(CapTlvType::SupportedFiraPhyVersionRange as u8, &[1, 1, 2])
            .put_bytes(CapTlvType::SupportedFiraMacVersionRange as u8, &MAC_VERSION_RANGE)
            .build();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        assert_eq!(FiraSpecificationParams::decode(&map), Err(Error::BadParameters));
    }
}
