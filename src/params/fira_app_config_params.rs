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

//! This module defines the application config parameters for a FiRa ranging session, and the
//! conversion between them and the TLV stream consumed by the transport.

use std::convert::{TryFrom, TryInto};

use log::{error, warn};
use num_derive::{FromPrimitive, ToPrimitive};
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::params::app_config_params::{AppConfigParams, AppConfigTlvType, ReconfigureParams};
use crate::params::tlv_buffer::{TlvBuffer, TlvBufferBuilder, TlvMap};
use crate::params::utils::{get_enum_field, get_optional_enum_field, validate};
use crate::utils::{builder_field, getter_field};

const SHORT_ADDRESS_LEN: usize = 2;
const EXTENDED_ADDRESS_LEN: usize = 8;

// The default value of each parameters.
const DEFAULT_RANGING_ROUND_USAGE: RangingRoundUsage = RangingRoundUsage::DsTwr;
const DEFAULT_STS_CONFIG: StsConfig = StsConfig::Static;
const DEFAULT_CHANNEL_NUMBER: UwbChannel = UwbChannel::Channel9;
const DEFAULT_SLOT_DURATION_RSTU: u16 = 2400;
const DEFAULT_RANGING_DURATION_MS: u32 = 200;
const DEFAULT_MAC_FCS_TYPE: MacFcsType = MacFcsType::Crc16;
const DEFAULT_RANGING_ROUND_CONTROL: RangingRoundControl = RangingRoundControl {
    ranging_result_report_message: true,
    measurement_report_message: false,
};
const DEFAULT_AOA_RESULT_REQUEST: AoaResultRequest = AoaResultRequest::ReqAoaResults;
const DEFAULT_RANGE_DATA_NTF_CONFIG: RangeDataNtfConfig = RangeDataNtfConfig::Enable;
const DEFAULT_RANGE_DATA_NTF_PROXIMITY_NEAR_CM: u16 = 0;
const DEFAULT_RANGE_DATA_NTF_PROXIMITY_FAR_CM: u16 = 20000;
const DEFAULT_RFRAME_CONFIG: RframeConfig = RframeConfig::SP3;
const DEFAULT_PREAMBLE_CODE_INDEX: u8 = 10;
const DEFAULT_SFD_ID: u8 = 2;
const DEFAULT_PSDU_DATA_RATE: PsduDataRate = PsduDataRate::Rate6m81;
const DEFAULT_PREAMBLE_DURATION: PreambleDuration = PreambleDuration::T64Symbols;
const DEFAULT_RANGING_TIME_STRUCT: RangingTimeStruct = RangingTimeStruct::BlockBasedScheduling;
const DEFAULT_SLOTS_PER_RR: u8 = 25;
const DEFAULT_PRF_MODE: PrfMode = PrfMode::Bprf;
const DEFAULT_SCHEDULED_MODE: ScheduledMode = ScheduledMode::TimeScheduledRanging;
const DEFAULT_KEY_ROTATION: KeyRotation = KeyRotation::Disable;
const DEFAULT_KEY_ROTATION_RATE: u8 = 0;
const DEFAULT_SESSION_PRIORITY: u8 = 50;
const DEFAULT_MAC_ADDRESS_MODE: MacAddressMode = MacAddressMode::MacAddress2Bytes;
const DEFAULT_NUMBER_OF_STS_SEGMENTS: u8 = 1;
const DEFAULT_MAX_RR_RETRY: u16 = 0;
const DEFAULT_HOPPING_MODE: HoppingMode = HoppingMode::Disable;
const DEFAULT_BLOCK_STRIDE_LENGTH: u8 = 0;
const DEFAULT_RESULT_REPORT_CONFIG: ResultReportConfig =
    ResultReportConfig { tof: true, aoa_azimuth: false, aoa_elevation: false, aoa_fom: false };
const DEFAULT_IN_BAND_TERMINATION_ATTEMPT_COUNT: u8 = 1;
const DEFAULT_SUB_SESSION_ID: u32 = 0;

/// The FiRa ranging session configuration.
/// Ref: FiRa Consortium UWB Command Interface Generic Technical Specification Version 1.1.0.
#[derive(Clone, PartialEq, Eq)]
pub struct FiraOpenSessionParams {
    device_type: DeviceType,
    ranging_round_usage: RangingRoundUsage,
    sts_config: StsConfig,
    multi_node_mode: MultiNodeMode,
    channel_number: UwbChannel,
    device_mac_address: UwbAddress,
    dst_mac_address: Vec<UwbAddress>,
    slot_duration_rstu: u16,
    ranging_duration_ms: u32,
    mac_fcs_type: MacFcsType,
    ranging_round_control: RangingRoundControl,
    aoa_result_request: AoaResultRequest,
    range_data_ntf_config: RangeDataNtfConfig,
    range_data_ntf_proximity_near_cm: u16,
    range_data_ntf_proximity_far_cm: u16,
    device_role: DeviceRole,
    rframe_config: RframeConfig,
    preamble_code_index: u8,
    sfd_id: u8,
    psdu_data_rate: PsduDataRate,
    preamble_duration: PreambleDuration,
    ranging_time_struct: RangingTimeStruct,
    slots_per_rr: u8,
    prf_mode: PrfMode,
    scheduled_mode: ScheduledMode,
    key_rotation: KeyRotation,
    key_rotation_rate: u8,
    session_priority: u8,
    mac_address_mode: MacAddressMode,
    vendor_id: [u8; 2],
    static_sts_iv: [u8; 6],
    number_of_sts_segments: u8,
    max_rr_retry: u16,
    hopping_mode: HoppingMode,
    block_stride_length: u8,
    result_report_config: ResultReportConfig,
    in_band_termination_attempt_count: u8,
    sub_session_id: u32,
}

/// Explicitly implement Debug trait to prevent logging PII data.
impl std::fmt::Debug for FiraOpenSessionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static REDACTED_STR: &str = "redacted";

        f.debug_struct("FiraOpenSessionParams")
            .field("device_type", &self.device_type)
            .field("ranging_round_usage", &self.ranging_round_usage)
            .field("sts_config", &self.sts_config)
            .field("multi_node_mode", &self.multi_node_mode)
            .field("channel_number", &self.channel_number)
            .field("device_mac_address", &self.device_mac_address)
            .field("dst_mac_address", &self.dst_mac_address)
            .field("slot_duration_rstu", &self.slot_duration_rstu)
            .field("ranging_duration_ms", &self.ranging_duration_ms)
            .field("mac_fcs_type", &self.mac_fcs_type)
            .field("ranging_round_control", &self.ranging_round_control)
            .field("aoa_result_request", &self.aoa_result_request)
            .field("range_data_ntf_config", &self.range_data_ntf_config)
            .field("range_data_ntf_proximity_near_cm", &self.range_data_ntf_proximity_near_cm)
            .field("range_data_ntf_proximity_far_cm", &self.range_data_ntf_proximity_far_cm)
            .field("device_role", &self.device_role)
            .field("rframe_config", &self.rframe_config)
            .field("preamble_code_index", &self.preamble_code_index)
            .field("sfd_id", &self.sfd_id)
            .field("psdu_data_rate", &self.psdu_data_rate)
            .field("preamble_duration", &self.preamble_duration)
            .field("ranging_time_struct", &self.ranging_time_struct)
            .field("slots_per_rr", &self.slots_per_rr)
            .field("prf_mode", &self.prf_mode)
            .field("scheduled_mode", &self.scheduled_mode)
            .field("key_rotation", &self.key_rotation)
            .field("key_rotation_rate", &self.key_rotation_rate)
            .field("session_priority", &self.session_priority)
            .field("mac_address_mode", &self.mac_address_mode)
            .field("vendor_id", &REDACTED_STR) // vendor_id field is PII.
            .field("static_sts_iv", &REDACTED_STR) // static_sts_iv field is PII.
            .field("number_of_sts_segments", &self.number_of_sts_segments)
            .field("max_rr_retry", &self.max_rr_retry)
            .field("hopping_mode", &self.hopping_mode)
            .field("block_stride_length", &self.block_stride_length)
            .field("result_report_config", &self.result_report_config)
            .field("in_band_termination_attempt_count", &self.in_band_termination_attempt_count)
            .field("sub_session_id", &self.sub_session_id)
            .finish()
    }
}

impl Drop for FiraOpenSessionParams {
    fn drop(&mut self) {
        self.vendor_id.zeroize();
        self.static_sts_iv.zeroize();
        self.sub_session_id.zeroize();
    }
}

#[allow(missing_docs)]
impl FiraOpenSessionParams {
    // Generate the getter methods for all the fields.
    getter_field!(device_type, DeviceType);
    getter_field!(ranging_round_usage, RangingRoundUsage);
    getter_field!(sts_config, StsConfig);
    getter_field!(multi_node_mode, MultiNodeMode);
    getter_field!(channel_number, UwbChannel);
    getter_field!(device_mac_address, UwbAddress);
    getter_field!(dst_mac_address, Vec<UwbAddress>);
    getter_field!(slot_duration_rstu, u16);
    getter_field!(ranging_duration_ms, u32);
    getter_field!(mac_fcs_type, MacFcsType);
    getter_field!(ranging_round_control, RangingRoundControl);
    getter_field!(aoa_result_request, AoaResultRequest);
    getter_field!(range_data_ntf_config, RangeDataNtfConfig);
    getter_field!(range_data_ntf_proximity_near_cm, u16);
    getter_field!(range_data_ntf_proximity_far_cm, u16);
    getter_field!(device_role, DeviceRole);
    getter_field!(rframe_config, RframeConfig);
    getter_field!(preamble_code_index, u8);
    getter_field!(sfd_id, u8);
    getter_field!(psdu_data_rate, PsduDataRate);
    getter_field!(preamble_duration, PreambleDuration);
    getter_field!(ranging_time_struct, RangingTimeStruct);
    getter_field!(slots_per_rr, u8);
    getter_field!(prf_mode, PrfMode);
    getter_field!(scheduled_mode, ScheduledMode);
    getter_field!(key_rotation, KeyRotation);
    getter_field!(key_rotation_rate, u8);
    getter_field!(session_priority, u8);
    getter_field!(mac_address_mode, MacAddressMode);
    getter_field!(vendor_id, [u8; 2]);
    getter_field!(static_sts_iv, [u8; 6]);
    getter_field!(number_of_sts_segments, u8);
    getter_field!(max_rr_retry, u16);
    getter_field!(hopping_mode, HoppingMode);
    getter_field!(block_stride_length, u8);
    getter_field!(result_report_config, ResultReportConfig);
    getter_field!(in_band_termination_attempt_count, u8);
    getter_field!(sub_session_id, u32);

    /// validate if the params are valid.
    fn is_valid(&self) -> Option<()> {
        if self.device_type == DeviceType::Controlee {
            if self.ranging_round_control.ranging_result_report_message {
                warn!("The RRRM bit is ignored by a controlee");
            }
            if self.ranging_round_control.measurement_report_message {
                warn!("The MRM bit is ignored by a controlee");
            }
            if self.hopping_mode != HoppingMode::Disable {
                warn!("hopping_mode is ignored by a controlee");
            }
            if self.block_stride_length != 0 {
                warn!("block_stride_length is ignored by a controlee");
            }
        }
        if self.ranging_time_struct != RangingTimeStruct::BlockBasedScheduling
            && self.block_stride_length != 0
        {
            warn!(
                "block_stride_length is ignored when ranging_time_struct not BlockBasedScheduling"
            );
        }

        validate(
            (1..=8).contains(&self.dst_mac_address.len()),
            "The length of dst_mac_address should be between 1 to 8",
        )?;
        validate(
            (0..=15).contains(&self.key_rotation_rate),
            "key_rotation_rate should be between 0 to 15",
        )?;
        validate(
            (1..=100).contains(&self.session_priority),
            "session_priority should be between 1 to 100",
        )?;
        validate(
            (1..=10).contains(&self.in_band_termination_attempt_count),
            "in_band_termination_attempt_count should be between 1 to 10",
        )?;

        match self.mac_address_mode {
            MacAddressMode::MacAddress2Bytes | MacAddressMode::MacAddress8Bytes2BytesHeader => {
                validate(
                    matches!(self.device_mac_address, UwbAddress::Short(_)),
                    "device_mac_address should be short address",
                )?;
                validate(
                    self.dst_mac_address.iter().all(|addr| matches!(addr, UwbAddress::Short(_))),
                    "dst_mac_address should be short address",
                )?;
            }
            MacAddressMode::MacAddress8Bytes => {
                validate(
                    matches!(self.device_mac_address, UwbAddress::Extended(_)),
                    "device_mac_address should be extended address",
                )?;
                validate(
                    self.dst_mac_address.iter().all(|addr| matches!(addr, UwbAddress::Extended(_))),
                    "dst_mac_address should be extended address",
                )?;
            }
        }

        match self.prf_mode {
            PrfMode::Bprf => {
                validate(
                    (9..=12).contains(&self.preamble_code_index),
                    "preamble_code_index should be between 9 to 12 when BPRF",
                )?;
                validate([0, 2].contains(&self.sfd_id), "sfd_id should be 0 or 2 when BPRF")?;
                validate(
                    self.preamble_duration == PreambleDuration::T64Symbols,
                    "preamble_duration should be 64 symbols when BPRF",
                )?;
            }
            _ => {
                validate(
                    (25..=32).contains(&self.preamble_code_index),
                    "preamble_code_index should be between 25 to 32 when HPRF",
                )?;
                validate(
                    (1..=4).contains(&self.sfd_id),
                    "sfd_id should be between 1 to 4 when HPRF",
                )?;
            }
        }

        match self.rframe_config {
            RframeConfig::SP0 => {
                validate(
                    self.number_of_sts_segments == 0,
                    "number_of_sts_segments should be 0 when SP0",
                )?;
            }
            RframeConfig::SP1 | RframeConfig::SP3 => match self.prf_mode {
                PrfMode::Bprf => {
                    validate(
                        self.number_of_sts_segments == 1,
                        "number_of_sts_segments should be 1 when SP1/SP3 and BPRF",
                    )?;
                }
                _ => {
                    validate(
                        [1, 2, 3, 4].contains(&self.number_of_sts_segments),
                        "number_of_sts_segments should be between 1 to 4 when SP1/SP3 and HPRF",
                    )?;
                }
            },
        }

        Some(())
    }

    /// Generate the TLV stream for the whole parameter set.
    ///
    /// The device and destination addresses and the vendor id are written byte-reversed;
    /// `NoOfControlee` is derived from the destination address list.
    pub fn encode(&self) -> TlvBuffer {
        debug_assert!(self.is_valid().is_some());

        let device_mac_address: Vec<u8> = self.device_mac_address.clone().into();
        let dst_mac_address = addresses_to_reversed_bytes(&self.dst_mac_address);

        let mut builder = TlvBufferBuilder::new();
        builder
            .put_u8(AppConfigTlvType::DeviceType as u8, self.device_type as u8)
            .put_u8(AppConfigTlvType::RangingRoundUsage as u8, self.ranging_round_usage as u8)
            .put_u8(AppConfigTlvType::StsConfig as u8, self.sts_config as u8)
            .put_u8(AppConfigTlvType::MultiNodeMode as u8, self.multi_node_mode as u8)
            .put_u8(AppConfigTlvType::ChannelNumber as u8, self.channel_number as u8)
            .put_u8(AppConfigTlvType::NoOfControlee as u8, self.dst_mac_address.len() as u8)
            .put_bytes_reversed(AppConfigTlvType::DeviceMacAddress as u8, &device_mac_address)
            .put_bytes(AppConfigTlvType::DstMacAddress as u8, &dst_mac_address)
            .put_u16(AppConfigTlvType::SlotDuration as u8, self.slot_duration_rstu)
            .put_u32(AppConfigTlvType::RangingDuration as u8, self.ranging_duration_ms)
            .put_u8(AppConfigTlvType::MacFcsType as u8, self.mac_fcs_type as u8)
            .put_u8(AppConfigTlvType::RangingRoundControl as u8, self.ranging_round_control.as_u8())
            .put_u8(AppConfigTlvType::AoaResultReq as u8, self.aoa_result_request as u8)
            .put_u8(AppConfigTlvType::RngDataNtf as u8, self.range_data_ntf_config as u8)
            .put_u16(
                AppConfigTlvType::RngDataNtfProximityNear as u8,
                self.range_data_ntf_proximity_near_cm,
            )
            .put_u16(
                AppConfigTlvType::RngDataNtfProximityFar as u8,
                self.range_data_ntf_proximity_far_cm,
            )
            .put_u8(AppConfigTlvType::DeviceRole as u8, self.device_role as u8)
            .put_u8(AppConfigTlvType::RframeConfig as u8, self.rframe_config as u8)
            .put_u8(AppConfigTlvType::PreambleCodeIndex as u8, self.preamble_code_index)
            .put_u8(AppConfigTlvType::SfdId as u8, self.sfd_id)
            .put_u8(AppConfigTlvType::PsduDataRate as u8, self.psdu_data_rate as u8)
            .put_u8(AppConfigTlvType::PreambleDuration as u8, self.preamble_duration as u8)
            .put_u8(AppConfigTlvType::RangingTimeStruct as u8, self.ranging_time_struct as u8)
            .put_u8(AppConfigTlvType::SlotsPerRr as u8, self.slots_per_rr)
            .put_u8(AppConfigTlvType::PrfMode as u8, self.prf_mode as u8)
            .put_u8(AppConfigTlvType::ScheduledMode as u8, self.scheduled_mode as u8)
            .put_u8(AppConfigTlvType::KeyRotation as u8, self.key_rotation as u8)
            .put_u8(AppConfigTlvType::KeyRotationRate as u8, self.key_rotation_rate)
            .put_u8(AppConfigTlvType::SessionPriority as u8, self.session_priority)
            .put_u8(AppConfigTlvType::MacAddressMode as u8, self.mac_address_mode as u8)
            .put_bytes_reversed(AppConfigTlvType::VendorId as u8, &self.vendor_id)
            .put_bytes(AppConfigTlvType::StaticStsIv as u8, &self.static_sts_iv)
            .put_u8(AppConfigTlvType::NumberOfStsSegments as u8, self.number_of_sts_segments)
            .put_u16(AppConfigTlvType::MaxRrRetry as u8, self.max_rr_retry)
            .put_u8(AppConfigTlvType::HoppingMode as u8, self.hopping_mode as u8)
            .put_u8(AppConfigTlvType::BlockStrideLength as u8, self.block_stride_length)
            .put_u8(AppConfigTlvType::ResultReportConfig as u8, self.result_report_config.as_u8())
            .put_u8(
                AppConfigTlvType::InBandTerminationAttemptCount as u8,
                self.in_band_termination_attempt_count,
            )
            .put_u32(AppConfigTlvType::SubSessionId as u8, self.sub_session_id);
        builder.build()
    }

    /// Rebuild the typed parameters from a decoded TLV stream.
    ///
    /// `MacAddressMode` is read first because it decides the width of the address fields. The
    /// decoded params go through the same validation as the builder.
    pub fn decode(map: &TlvMap) -> Result<AppConfigParams> {
        let mac_address_mode: MacAddressMode =
            get_enum_field(map, AppConfigTlvType::MacAddressMode as u8)?;
        let address_len = match mac_address_mode {
            MacAddressMode::MacAddress8Bytes => EXTENDED_ADDRESS_LEN,
            _ => SHORT_ADDRESS_LEN,
        };

        let device_mac_address = address_from_bytes(
            map.get_bytes_reversed(AppConfigTlvType::DeviceMacAddress as u8)?,
            address_len,
        )?;
        let dst_mac_address = addresses_from_reversed_bytes(
            map.get_bytes(AppConfigTlvType::DstMacAddress as u8)?,
            address_len,
        )?;
        let no_of_controlee = map.get_u8(AppConfigTlvType::NoOfControlee as u8)?;
        if no_of_controlee as usize != dst_mac_address.len() {
            error!(
                "NoOfControlee {} does not match the {} decoded dst addresses",
                no_of_controlee,
                dst_mac_address.len()
            );
            return Err(Error::BadParameters);
        }

        let vendor_id = map.get_bytes_reversed(AppConfigTlvType::VendorId as u8)?;
        let vendor_id: [u8; 2] = vendor_id.try_into().map_err(|_| {
            error!("VendorId is not a 2-byte value");
            Error::BadParameters
        })?;
        let static_sts_iv: [u8; 6] =
            map.get_bytes(AppConfigTlvType::StaticStsIv as u8)?.try_into().map_err(|_| {
                error!("StaticStsIv is not a 6-byte value");
                Error::BadParameters
            })?;

        let mut builder = FiraOpenSessionParamsBuilder::new();
        builder
            .device_type(get_enum_field(map, AppConfigTlvType::DeviceType as u8)?)
            .ranging_round_usage(get_enum_field(map, AppConfigTlvType::RangingRoundUsage as u8)?)
            .sts_config(get_enum_field(map, AppConfigTlvType::StsConfig as u8)?)
            .multi_node_mode(get_enum_field(map, AppConfigTlvType::MultiNodeMode as u8)?)
            .channel_number(get_enum_field(map, AppConfigTlvType::ChannelNumber as u8)?)
            .device_mac_address(device_mac_address)
            .dst_mac_address(dst_mac_address)
            .slot_duration_rstu(map.get_u16(AppConfigTlvType::SlotDuration as u8)?)
            .ranging_duration_ms(map.get_u32(AppConfigTlvType::RangingDuration as u8)?)
            .mac_fcs_type(get_enum_field(map, AppConfigTlvType::MacFcsType as u8)?)
            .ranging_round_control(RangingRoundControl::from_u8(
                map.get_u8(AppConfigTlvType::RangingRoundControl as u8)?,
            ))
            .aoa_result_request(get_enum_field(map, AppConfigTlvType::AoaResultReq as u8)?)
            .range_data_ntf_config(get_enum_field(map, AppConfigTlvType::RngDataNtf as u8)?)
            .range_data_ntf_proximity_near_cm(
                map.get_u16(AppConfigTlvType::RngDataNtfProximityNear as u8)?,
            )
            .range_data_ntf_proximity_far_cm(
                map.get_u16(AppConfigTlvType::RngDataNtfProximityFar as u8)?,
            )
            .device_role(get_enum_field(map, AppConfigTlvType::DeviceRole as u8)?)
            .rframe_config(get_enum_field(map, AppConfigTlvType::RframeConfig as u8)?)
            .preamble_code_index(map.get_u8(AppConfigTlvType::PreambleCodeIndex as u8)?)
            .sfd_id(map.get_u8(AppConfigTlvType::SfdId as u8)?)
            .psdu_data_rate(get_enum_field(map, AppConfigTlvType::PsduDataRate as u8)?)
            .preamble_duration(get_enum_field(map, AppConfigTlvType::PreambleDuration as u8)?)
            .ranging_time_struct(get_enum_field(map, AppConfigTlvType::RangingTimeStruct as u8)?)
            .slots_per_rr(map.get_u8(AppConfigTlvType::SlotsPerRr as u8)?)
            .prf_mode(get_enum_field(map, AppConfigTlvType::PrfMode as u8)?)
            .scheduled_mode(get_enum_field(map, AppConfigTlvType::ScheduledMode as u8)?)
            .key_rotation(get_enum_field(map, AppConfigTlvType::KeyRotation as u8)?)
            .key_rotation_rate(map.get_u8(AppConfigTlvType::KeyRotationRate as u8)?)
            .session_priority(map.get_u8(AppConfigTlvType::SessionPriority as u8)?)
            .mac_address_mode(mac_address_mode)
            .vendor_id(vendor_id)
            .static_sts_iv(static_sts_iv)
            .number_of_sts_segments(map.get_u8(AppConfigTlvType::NumberOfStsSegments as u8)?)
            .max_rr_retry(map.get_u16(AppConfigTlvType::MaxRrRetry as u8)?)
            .hopping_mode(get_enum_field(map, AppConfigTlvType::HoppingMode as u8)?)
            .block_stride_length(map.get_u8(AppConfigTlvType::BlockStrideLength as u8)?)
            .result_report_config(ResultReportConfig::from_u8(
                map.get_u8(AppConfigTlvType::ResultReportConfig as u8)?,
            ))
            .in_band_termination_attempt_count(
                map.get_u8(AppConfigTlvType::InBandTerminationAttemptCount as u8)?,
            )
            .sub_session_id(map.get_u32(AppConfigTlvType::SubSessionId as u8)?);

        builder.build().ok_or_else(|| {
            error!("The decoded FiRa session config failed validation");
            Error::BadParameters
        })
    }
}

/// The builder pattern for the FiraOpenSessionParams.
pub struct FiraOpenSessionParamsBuilder {
    device_type: Option<DeviceType>,
    ranging_round_usage: RangingRoundUsage,
    sts_config: StsConfig,
    multi_node_mode: Option<MultiNodeMode>,
    channel_number: UwbChannel,
    device_mac_address: Option<UwbAddress>,
    dst_mac_address: Vec<UwbAddress>,
    slot_duration_rstu: u16,
    ranging_duration_ms: u32,
    mac_fcs_type: MacFcsType,
    ranging_round_control: RangingRoundControl,
    aoa_result_request: AoaResultRequest,
    range_data_ntf_config: RangeDataNtfConfig,
    range_data_ntf_proximity_near_cm: u16,
    range_data_ntf_proximity_far_cm: u16,
    device_role: Option<DeviceRole>,
    rframe_config: RframeConfig,
    preamble_code_index: u8,
    sfd_id: u8,
    psdu_data_rate: PsduDataRate,
    preamble_duration: PreambleDuration,
    ranging_time_struct: RangingTimeStruct,
    slots_per_rr: u8,
    prf_mode: PrfMode,
    scheduled_mode: ScheduledMode,
    key_rotation: KeyRotation,
    key_rotation_rate: u8,
    session_priority: u8,
    mac_address_mode: MacAddressMode,
    vendor_id: Option<[u8; 2]>,
    static_sts_iv: Option<[u8; 6]>,
    number_of_sts_segments: u8,
    max_rr_retry: u16,
    hopping_mode: HoppingMode,
    block_stride_length: u8,
    result_report_config: ResultReportConfig,
    in_band_termination_attempt_count: u8,
    sub_session_id: u32,
}

#[allow(clippy::new_without_default)]
#[allow(missing_docs)]
impl FiraOpenSessionParamsBuilder {
    /// Fill the default value of each field if exists, otherwise put None.
    pub fn new() -> Self {
        Self {
            device_type: None,
            ranging_round_usage: DEFAULT_RANGING_ROUND_USAGE,
            sts_config: DEFAULT_STS_CONFIG,
            multi_node_mode: None,
            channel_number: DEFAULT_CHANNEL_NUMBER,
            device_mac_address: None,
            dst_mac_address: vec![],
            slot_duration_rstu: DEFAULT_SLOT_DURATION_RSTU,
            ranging_duration_ms: DEFAULT_RANGING_DURATION_MS,
            mac_fcs_type: DEFAULT_MAC_FCS_TYPE,
            ranging_round_control: DEFAULT_RANGING_ROUND_CONTROL,
            aoa_result_request: DEFAULT_AOA_RESULT_REQUEST,
            range_data_ntf_config: DEFAULT_RANGE_DATA_NTF_CONFIG,
            range_data_ntf_proximity_near_cm: DEFAULT_RANGE_DATA_NTF_PROXIMITY_NEAR_CM,
            range_data_ntf_proximity_far_cm: DEFAULT_RANGE_DATA_NTF_PROXIMITY_FAR_CM,
            device_role: None,
            rframe_config: DEFAULT_RFRAME_CONFIG,
            preamble_code_index: DEFAULT_PREAMBLE_CODE_INDEX,
            sfd_id: DEFAULT_SFD_ID,
            psdu_data_rate: DEFAULT_PSDU_DATA_RATE,
            preamble_duration: DEFAULT_PREAMBLE_DURATION,
            ranging_time_struct: DEFAULT_RANGING_TIME_STRUCT,
            slots_per_rr: DEFAULT_SLOTS_PER_RR,
            prf_mode: DEFAULT_PRF_MODE,
            scheduled_mode: DEFAULT_SCHEDULED_MODE,
            key_rotation: DEFAULT_KEY_ROTATION,
            key_rotation_rate: DEFAULT_KEY_ROTATION_RATE,
            session_priority: DEFAULT_SESSION_PRIORITY,
            mac_address_mode: DEFAULT_MAC_ADDRESS_MODE,
            vendor_id: None,
            static_sts_iv: None,
            number_of_sts_segments: DEFAULT_NUMBER_OF_STS_SEGMENTS,
            max_rr_retry: DEFAULT_MAX_RR_RETRY,
            hopping_mode: DEFAULT_HOPPING_MODE,
            block_stride_length: DEFAULT_BLOCK_STRIDE_LENGTH,
            result_report_config: DEFAULT_RESULT_REPORT_CONFIG,
            in_band_termination_attempt_count: DEFAULT_IN_BAND_TERMINATION_ATTEMPT_COUNT,
            sub_session_id: DEFAULT_SUB_SESSION_ID,
        }
    }

    pub fn from_params(params: &AppConfigParams) -> Option<Self> {
        match params {
            AppConfigParams::Fira(params) => Some(Self {
                device_type: Some(params.device_type),
                ranging_round_usage: params.ranging_round_usage,
                sts_config: params.sts_config,
                multi_node_mode: Some(params.multi_node_mode),
                channel_number: params.channel_number,
                device_mac_address: Some(params.device_mac_address.clone()),
                dst_mac_address: params.dst_mac_address.clone(),
                slot_duration_rstu: params.slot_duration_rstu,
                ranging_duration_ms: params.ranging_duration_ms,
                mac_fcs_type: params.mac_fcs_type,
                ranging_round_control: params.ranging_round_control.clone(),
                aoa_result_request: params.aoa_result_request,
                range_data_ntf_config: params.range_data_ntf_config,
                range_data_ntf_proximity_near_cm: params.range_data_ntf_proximity_near_cm,
                range_data_ntf_proximity_far_cm: params.range_data_ntf_proximity_far_cm,
                device_role: Some(params.device_role),
                rframe_config: params.rframe_config,
                preamble_code_index: params.preamble_code_index,
                sfd_id: params.sfd_id,
                psdu_data_rate: params.psdu_data_rate,
                preamble_duration: params.preamble_duration,
                ranging_time_struct: params.ranging_time_struct,
                slots_per_rr: params.slots_per_rr,
                prf_mode: params.prf_mode,
                scheduled_mode: params.scheduled_mode,
                key_rotation: params.key_rotation,
                key_rotation_rate: params.key_rotation_rate,
                session_priority: params.session_priority,
                mac_address_mode: params.mac_address_mode,
                vendor_id: Some(params.vendor_id),
                static_sts_iv: Some(params.static_sts_iv),
                number_of_sts_segments: params.number_of_sts_segments,
                max_rr_retry: params.max_rr_retry,
                hopping_mode: params.hopping_mode,
                block_stride_length: params.block_stride_length,
                result_report_config: params.result_report_config.clone(),
                in_band_termination_attempt_count: params.in_band_termination_attempt_count,
                sub_session_id: params.sub_session_id,
            }),
            _ => None,
        }
    }

    pub fn build(&self) -> Option<AppConfigParams> {
        let params = FiraOpenSessionParams {
            device_type: self.device_type?,
            ranging_round_usage: self.ranging_round_usage,
            sts_config: self.sts_config,
            multi_node_mode: self.multi_node_mode?,
            channel_number: self.channel_number,
            device_mac_address: self.device_mac_address.clone()?,
            dst_mac_address: self.dst_mac_address.clone(),
            slot_duration_rstu: self.slot_duration_rstu,
            ranging_duration_ms: self.ranging_duration_ms,
            mac_fcs_type: self.mac_fcs_type,
            ranging_round_control: self.ranging_round_control.clone(),
            aoa_result_request: self.aoa_result_request,
            range_data_ntf_config: self.range_data_ntf_config,
            range_data_ntf_proximity_near_cm: self.range_data_ntf_proximity_near_cm,
            range_data_ntf_proximity_far_cm: self.range_data_ntf_proximity_far_cm,
            device_role: self.device_role?,
            rframe_config: self.rframe_config,
            preamble_code_index: self.preamble_code_index,
            sfd_id: self.sfd_id,
            psdu_data_rate: self.psdu_data_rate,
            preamble_duration: self.preamble_duration,
            ranging_time_struct: self.ranging_time_struct,
            slots_per_rr: self.slots_per_rr,
            prf_mode: self.prf_mode,
            scheduled_mode: self.scheduled_mode,
            key_rotation: self.key_rotation,
            key_rotation_rate: self.key_rotation_rate,
            session_priority: self.session_priority,
            mac_address_mode: self.mac_address_mode,
            vendor_id: self.vendor_id?,
            static_sts_iv: self.static_sts_iv?,
            number_of_sts_segments: self.number_of_sts_segments,
            max_rr_retry: self.max_rr_retry,
            hopping_mode: self.hopping_mode,
            block_stride_length: self.block_stride_length,
            result_report_config: self.result_report_config.clone(),
            in_band_termination_attempt_count: self.in_band_termination_attempt_count,
            sub_session_id: self.sub_session_id,
        };

        params.is_valid()?;
        Some(AppConfigParams::Fira(params))
    }

    // Generate the setter methods for all the fields.
    builder_field!(device_type, DeviceType, Some);
    builder_field!(ranging_round_usage, RangingRoundUsage);
    builder_field!(sts_config, StsConfig);
    builder_field!(multi_node_mode, MultiNodeMode, Some);
    builder_field!(channel_number, UwbChannel);
    builder_field!(device_mac_address, UwbAddress, Some);
    builder_field!(dst_mac_address, Vec<UwbAddress>);
    builder_field!(slot_duration_rstu, u16);
    builder_field!(ranging_duration_ms, u32);
    builder_field!(mac_fcs_type, MacFcsType);
    builder_field!(ranging_round_control, RangingRoundControl);
    builder_field!(aoa_result_request, AoaResultRequest);
    builder_field!(range_data_ntf_config, RangeDataNtfConfig);
    builder_field!(range_data_ntf_proximity_near_cm, u16);
    builder_field!(range_data_ntf_proximity_far_cm, u16);
    builder_field!(device_role, DeviceRole, Some);
    builder_field!(rframe_config, RframeConfig);
    builder_field!(preamble_code_index, u8);
    builder_field!(sfd_id, u8);
    builder_field!(psdu_data_rate, PsduDataRate);
    builder_field!(preamble_duration, PreambleDuration);
    builder_field!(ranging_time_struct, RangingTimeStruct);
    builder_field!(slots_per_rr, u8);
    builder_field!(prf_mode, PrfMode);
    builder_field!(scheduled_mode, ScheduledMode);
    builder_field!(key_rotation, KeyRotation);
    builder_field!(key_rotation_rate, u8);
    builder_field!(session_priority, u8);
    builder_field!(mac_address_mode, MacAddressMode);
    builder_field!(vendor_id, [u8; 2], Some);
    builder_field!(static_sts_iv, [u8; 6], Some);
    builder_field!(number_of_sts_segments, u8);
    builder_field!(max_rr_retry, u16);
    builder_field!(hopping_mode, HoppingMode);
    builder_field!(block_stride_length, u8);
    builder_field!(result_report_config, ResultReportConfig);
    builder_field!(in_band_termination_attempt_count, u8);
    builder_field!(sub_session_id, u32);
}

/// The subset of FiRa parameters that may be changed after the session is opened.
///
/// Every field is optional; only the fields that are set appear in the TLV stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FiraReconfigureParams {
    /// The number of blocks to stride, if changed.
    pub block_stride_length: Option<u8>,
    /// The range data notification config, if changed.
    pub range_data_ntf_config: Option<RangeDataNtfConfig>,
    /// The lower bound of the proximity range, if changed.
    pub range_data_ntf_proximity_near_cm: Option<u16>,
    /// The upper bound of the proximity range, if changed.
    pub range_data_ntf_proximity_far_cm: Option<u16>,
}

impl FiraReconfigureParams {
    /// Generate the TLV stream for the fields that are set.
    pub fn encode(&self) -> TlvBuffer {
        let mut builder = TlvBufferBuilder::new();
        if let Some(value) = self.block_stride_length {
            builder.put_u8(AppConfigTlvType::BlockStrideLength as u8, value);
        }
        if let Some(value) = self.range_data_ntf_config {
            builder.put_u8(AppConfigTlvType::RngDataNtf as u8, value as u8);
        }
        if let Some(value) = self.range_data_ntf_proximity_near_cm {
            builder.put_u16(AppConfigTlvType::RngDataNtfProximityNear as u8, value);
        }
        if let Some(value) = self.range_data_ntf_proximity_far_cm {
            builder.put_u16(AppConfigTlvType::RngDataNtfProximityFar as u8, value);
        }
        builder.build()
    }

    /// Rebuild the typed parameters from a decoded TLV stream; every tag is optional.
    pub fn decode(map: &TlvMap) -> Result<ReconfigureParams> {
        Ok(ReconfigureParams::Fira(Self {
            block_stride_length: map.get_optional_u8(AppConfigTlvType::BlockStrideLength as u8)?,
            range_data_ntf_config: get_optional_enum_field(
                map,
                AppConfigTlvType::RngDataNtf as u8,
            )?,
            range_data_ntf_proximity_near_cm: map
                .get_optional_u16(AppConfigTlvType::RngDataNtfProximityNear as u8)?,
            range_data_ntf_proximity_far_cm: map
                .get_optional_u16(AppConfigTlvType::RngDataNtfProximityFar as u8)?,
        }))
    }
}

/// The device type.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum DeviceType {
    /// Controlee
    Controlee = 0,
    /// Controller
    Controller = 1,
}

/// The mode of ranging round usage.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum RangingRoundUsage {
    /// SS-TWR with Deferred Mode
    SsTwr = 1,
    /// DS-TWR with Deferred Mode (default)
    DsTwr = 2,
    /// SS-TWR with Non-deferred Mode
    SsTwrNon = 3,
    /// DS-TWR with Non-deferred Mode
    DsTwrNon = 4,
}

/// This parameter indicates how the system shall generate the STS.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum StsConfig {
    /// Static STS (default)
    Static = 0,
    /// Dynamic STS
    Dynamic = 1,
    /// Dynamic STS for Responder specific Sub-session Key
    DynamicForControleeIndividualKey = 2,
}

/// The mode of multi node.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum MultiNodeMode {
    /// Single device to Single device (Unicast)
    Unicast = 0,
    /// One to Many
    OneToMany = 1,
    /// Many to Many
    ManyToMany = 2,
}

/// The UWB channel number. (default = 9)
#[allow(missing_docs)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum UwbChannel {
    Channel5 = 5,
    Channel6 = 6,
    Channel8 = 8,
    Channel9 = 9,
    Channel10 = 10,
    Channel12 = 12,
    Channel13 = 13,
    Channel14 = 14,
}

/// The UWB address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UwbAddress {
    /// The short MAC address (2 bytes)
    Short([u8; 2]),
    /// The extended MAC address (8 bytes)
    Extended([u8; 8]),
}

impl From<UwbAddress> for Vec<u8> {
    fn from(item: UwbAddress) -> Self {
        match item {
            UwbAddress::Short(addr) => addr.to_vec(),
            UwbAddress::Extended(addr) => addr.to_vec(),
        }
    }
}

impl TryFrom<Vec<u8>> for UwbAddress {
    type Error = &'static str;
    fn try_from(value: Vec<u8>) -> std::result::Result<Self, Self::Error> {
        match value.len() {
            2 => Ok(UwbAddress::Short(value.try_into().unwrap())),
            8 => Ok(UwbAddress::Extended(value.try_into().unwrap())),
            _ => Err("Invalid address length"),
        }
    }
}

fn addresses_to_reversed_bytes(addresses: &[UwbAddress]) -> Vec<u8> {
    // Each address is reversed individually; the list order is preserved.
    addresses
        .iter()
        .flat_map(|address| {
            let mut bytes: Vec<u8> = address.clone().into();
            bytes.reverse();
            bytes
        })
        .collect()
}

fn addresses_from_reversed_bytes(bytes: &[u8], address_len: usize) -> Result<Vec<UwbAddress>> {
    if bytes.len() % address_len != 0 {
        error!("DstMacAddress stores {} bytes, not a multiple of {}", bytes.len(), address_len);
        return Err(Error::BadParameters);
    }
    bytes
        .chunks_exact(address_len)
        .map(|chunk| {
            let mut address = chunk.to_vec();
            address.reverse();
            UwbAddress::try_from(address).map_err(|_| Error::BadParameters)
        })
        .collect()
}

fn address_from_bytes(bytes: Vec<u8>, address_len: usize) -> Result<UwbAddress> {
    if bytes.len() != address_len {
        error!("Expected a {}-byte address, got {} bytes", address_len, bytes.len());
        return Err(Error::BadParameters);
    }
    UwbAddress::try_from(bytes).map_err(|_| Error::BadParameters)
}

/// CRC type in MAC footer.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum MacFcsType {
    /// CRC 16 (default)
    Crc16 = 0,
    /// CRC 32
    Crc32 = 1,
}

/// The messages included in a ranging round.
///
/// The control message bit of the encoded byte is always set: a Controller always sends a
/// separate Control Message and a Controlee always expects one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangingRoundControl {
    /// Ranging Result Report Message (RRRM)
    ///
    /// If set to true (default), a Controller shall schedule an RRRM in the Ranging Device
    /// Management List (RDML). This field shall be ignored by a Controlee.
    pub ranging_result_report_message: bool,
    /// Measurement Report Message (MRM)
    ///
    /// If set to false (default), the controller shall schedule the MRM to be sent from the
    /// initiator to the responder(s); if set to true, from the responder(s) to the initiator.
    /// This field shall be ignored by a Controlee.
    pub measurement_report_message: bool,
}

impl RangingRoundControl {
    const RANGING_RESULT_REPORT_MESSAGE_BIT_OFFSET: u8 = 0;
    const CONTROL_MESSAGE_BIT_OFFSET: u8 = 1;
    const MEASUREMENT_REPORT_MESSAGE_BIT_OFFSET: u8 = 7;

    fn as_u8(&self) -> u8 {
        // The control message bit is not configurable.
        let mut value = 1_u8 << Self::CONTROL_MESSAGE_BIT_OFFSET;
        if self.ranging_result_report_message {
            value |= 1 << Self::RANGING_RESULT_REPORT_MESSAGE_BIT_OFFSET;
        }
        if self.measurement_report_message {
            value |= 1 << Self::MEASUREMENT_REPORT_MESSAGE_BIT_OFFSET;
        }
        value
    }

    fn from_u8(value: u8) -> Self {
        Self {
            ranging_result_report_message: (value
                & (1 << Self::RANGING_RESULT_REPORT_MESSAGE_BIT_OFFSET))
                != 0,
            measurement_report_message: (value
                & (1 << Self::MEASUREMENT_REPORT_MESSAGE_BIT_OFFSET))
                != 0,
        }
    }
}

/// This parameter is used to configure AOA results in the range data notification.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum AoaResultRequest {
    /// Disable AOA
    NoAoaReport = 0,
    /// Enable AOA (default)
    ReqAoaResults = 1,
    /// Enable only AOA Azimuth
    ReqAoaResultsAzimuthOnly = 2,
    /// Enable only AOA Elevation
    ReqAoaResultsElevationOnly = 3,
    /// Enable AOA interleaved
    ReqAoaResultsInterleaved = 0xF0,
}

/// This config is used to enable/disable the range data notification.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum RangeDataNtfConfig {
    /// Disable range data notification
    Disable = 0,
    /// Enable range data notification (default)
    Enable = 1,
    /// Enable range data notification while in proximity range
    EnableProximity = 2,
}

/// The device role.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum DeviceRole {
    /// Responder of the session
    Responder = 0,
    /// Initiator of the session
    Initiator = 1,
}

/// Rframe config.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum RframeConfig {
    /// SP0
    SP0 = 0,
    /// SP1
    SP1 = 1,
    /// SP3 (default)
    SP3 = 3,
}

/// This value configures the data rate.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum PsduDataRate {
    /// 6.81 Mbps (default)
    Rate6m81 = 0,
    /// 7.80 Mbps
    Rate7m80 = 1,
    /// 27.2 Mbps
    Rate27m2 = 2,
    /// 31.2 Mbps
    Rate31m2 = 3,
    /// 850Kbps
    Rate850k = 4,
}

/// Preamble duration is same as Preamble Symbol Repetitions (PSR).
///
/// Two configurations are possible. BPRF uses only 64 symbols. HPRF can use both.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum PreambleDuration {
    /// 32 symbols
    T32Symbols = 0,
    /// 64 symbols (default)
    T64Symbols = 1,
}

/// The type of ranging time scheduling.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum RangingTimeStruct {
    /// Interval Based Scheduling
    IntervalBasedScheduling = 0,
    /// Block Based Scheduling (default)
    BlockBasedScheduling = 1,
}

/// This parameter is used to configure the mean PRF.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum PrfMode {
    /// 62.4 MHz PRF. BPRF mode (default)
    Bprf = 0,
    /// 124.8 MHz PRF. HPRF mode
    HprfWith124_8MHz = 1,
    /// 249.6 MHz PRF. HPRF mode with data rate 27.2 and 31.2 Mbps
    HprfWith249_6MHz = 2,
}

/// This parameter is used to set the Multinode Ranging Type.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum ScheduledMode {
    /// Time scheduled ranging (default)
    TimeScheduledRanging = 1,
}

/// This configuration is used to enable/disable the key rotation feature during Dynamic STS
/// ranging.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum KeyRotation {
    /// Disable (default)
    Disable = 0,
    /// Enable
    Enable = 1,
}

/// MAC Addressing mode to be used in UWBS.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum MacAddressMode {
    /// MAC address is 2 bytes and 2 bytes to be used in MAC header (default)
    MacAddress2Bytes = 0,
    /// MAC address is 8 bytes and 2 bytes to be used in MAC header
    MacAddress8Bytes2BytesHeader = 1,
    /// MAC address is 8 bytes and 8 bytes to be used in MAC header
    MacAddress8Bytes = 2,
}

/// This parameter is used to enable/disable the hopping.
///
/// Note: This config is applicable only for controller and ignored in case of controlee.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum HoppingMode {
    /// Hopping Disable (default)
    Disable = 0,
    /// FiRa Hopping Enable
    FiraHoppingEnable = 1,
}

/// This config is used to enable/disable the result reports to be included in the RRRM.
///
/// The ToF Report, AoA Azimuth Report and AoA Elevation Report parameters from the FiRa UWB MAC
/// are negotiated OOB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultReportConfig {
    /// TOF report (false: Disable, true: Enable)
    pub tof: bool,
    /// AOA azimuth report (false: Disable, true: Enable)
    pub aoa_azimuth: bool,
    /// AOA elevation report (false: Disable, true: Enable)
    pub aoa_elevation: bool,
    /// AOA FOM report (false: Disable, true: Enable)
    pub aoa_fom: bool,
}

impl ResultReportConfig {
    const TOF_BIT_OFFSET: u8 = 0;
    const AOA_AZIMUTH_BIT_OFFSET: u8 = 1;
    const AOA_ELEVATION_BIT_OFFSET: u8 = 2;
    const AOA_FOM_BIT_OFFSET: u8 = 3;

    fn as_u8(&self) -> u8 {
        let mut value = 0_u8;
        if self.tof {
            value |= 1 << Self::TOF_BIT_OFFSET;
        }
        if self.aoa_azimuth {
            value |= 1 << Self::AOA_AZIMUTH_BIT_OFFSET;
        }
        if self.aoa_elevation {
            value |= 1 << Self::AOA_ELEVATION_BIT_OFFSET;
        }
        if self.aoa_fom {
            value |= 1 << Self::AOA_FOM_BIT_OFFSET;
        }

        value
    }

    fn from_u8(value: u8) -> Self {
        Self {
            tof: (value & (1 << Self::TOF_BIT_OFFSET)) != 0,
            aoa_azimuth: (value & (1 << Self::AOA_AZIMUTH_BIT_OFFSET)) != 0,
            aoa_elevation: (value & (1 << Self::AOA_ELEVATION_BIT_OFFSET)) != 0,
            aoa_fom: (value & (1 << Self::AOA_FOM_BIT_OFFSET)) != 0,
        }
    }
}
