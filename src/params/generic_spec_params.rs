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

//! This module defines the combined capabilities reported by the UWB subsystem, covering all
//! the supported protocols.

use crate::error::Result;
use crate::params::app_config_params::CapTlvType;
use crate::params::ccc_spec_params::CccSpecificationParams;
use crate::params::fira_spec_params::FiraSpecificationParams;
use crate::params::tlv_buffer::TlvMap;

/// The capabilities of the UWB subsystem across every supported protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericSpecificationParams {
    /// The FiRa capabilities.
    pub fira: FiraSpecificationParams,
    /// The CCC capabilities.
    pub ccc: CccSpecificationParams,
    /// Whether the subsystem reports its power statistics.
    pub has_power_stats_support: bool,
}

impl GenericSpecificationParams {
    /// Rebuild the combined capabilities from a decoded TLV stream.
    ///
    /// The protocol-specific tags live in disjoint ranges, so one stream carries them all.
    pub fn decode(map: &TlvMap) -> Result<Self> {
        Ok(Self {
            fira: FiraSpecificationParams::decode(map)?,
            ccc: CccSpecificationParams::decode(map)?,
            has_power_stats_support: map
                .get_optional_u8(CapTlvType::SupportedPowerStats as u8)?
                .map_or(false, |value| value != 0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::params::ccc_app_config_params::CccUwbChannel;
    use crate::params::fira_app_config_params::UwbChannel;
    use crate::params::tlv_buffer::TlvBufferBuilder;
    use crate::utils::init_test_logging;

    fn generate_buffer(power_stats: Option<u8>) -> crate::params::tlv_buffer::TlvBuffer {
        let mut builder = TlvBufferBuilder::new();
        builder
            .put_bytes(CapTlvType::SupportedFiraPhyVersionRange as u8, &[1, 1, 1, 1])
            .put_bytes(CapTlvType::SupportedFiraMacVersionRange as u8, &[1, 1, 1, 1])
            .put_u8(CapTlvType::SupportedChannels as u8, 0b0000_1000)
            .put_u8(CapTlvType::CccSupportedChannels as u8, 0b10);
        if let Some(value) = power_stats {
            builder.put_u8(CapTlvType::SupportedPowerStats as u8, value);
        }
        builder.build()
    }

    #[test]
    fn test_decode_composes_all_protocols() {
        init_test_logging();

        let buffer = generate_buffer(Some(1));
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        let params = GenericSpecificationParams::decode(&map).unwrap();

        assert_eq!(params.fira.supported_channels, vec![UwbChannel::Channel9]);
        assert_eq!(params.ccc.supported_channels, vec![CccUwbChannel::Channel9]);
        assert!(params.has_power_stats_support);
    }

    #[test]
    fn test_decode_missing_power_stats_defaults_to_false() {
        let buffer = generate_buffer(None);
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        let params = GenericSpecificationParams::decode(&map).unwrap();
        assert!(!params.has_power_stats_support);
    }
}
