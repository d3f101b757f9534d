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

use log::error;
use num_traits::cast::FromPrimitive;

use crate::error::{Error, Result};
use crate::params::tlv_buffer::TlvMap;

pub fn validate(value: bool, err_msg: &str) -> Option<()> {
    match value {
        true => Some(()),
        false => {
            error!("{}", err_msg);
            None
        }
    }
}

/// Read the 1-byte field at |tag| and convert it to its enum type.
pub fn get_enum_field<T: FromPrimitive>(map: &TlvMap, tag: u8) -> Result<T> {
    let value = map.get_u8(tag)?;
    T::from_u8(value).ok_or_else(|| {
        error!("Unrecognized value {:#04x} for the tag {:#04x}", value, tag);
        Error::BadParameters
    })
}

/// Like `get_enum_field`, but an absent tag yields `Ok(None)`.
pub fn get_optional_enum_field<T: FromPrimitive>(map: &TlvMap, tag: u8) -> Result<Option<T>> {
    match map.get_optional_u8(tag)? {
        Some(value) => match T::from_u8(value) {
            Some(field) => Ok(Some(field)),
            None => {
                error!("Unrecognized value {:#04x} for the tag {:#04x}", value, tag);
                Err(Error::BadParameters)
            }
        },
        None => Ok(None),
    }
}

/// Collect the flags of `mapping` whose bit is set in `value`, in the order of the mapping.
/// The bits that appear in no mapping entry are ignored.
pub fn flags_from_bits<T: Copy>(value: u64, mapping: &[(u8, T)]) -> Vec<T> {
    mapping.iter().filter(|(bit, _)| value & (1u64 << bit) != 0).map(|(_, flag)| *flag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use num_derive::FromPrimitive;

    use crate::params::tlv_buffer::TlvBufferBuilder;

    #[test]
    fn test_validate() {
        assert_eq!(validate(true, "should not be logged"), Some(()));
        assert_eq!(validate(false, "invalid parameter"), None);
    }

    #[test]
    fn test_get_enum_field() {
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
        enum Color {
            Red = 1,
        }

        let buffer = TlvBufferBuilder::new().put_u8(0x01, 1).put_u8(0x02, 7).build();
        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        assert_eq!(get_enum_field::<Color>(&map, 0x01).unwrap(), Color::Red);
        // 7 is not a valid Color.
        assert!(get_enum_field::<Color>(&map, 0x02).is_err());
        // An absent tag is an error for the required variant only.
        assert!(get_enum_field::<Color>(&map, 0x03).is_err());
        assert_eq!(get_optional_enum_field::<Color>(&map, 0x03).unwrap(), None);
        assert_eq!(get_optional_enum_field::<Color>(&map, 0x01).unwrap(), Some(Color::Red));
    }

    #[test]
    fn test_flags_from_bits() {
        const MAPPING: &[(u8, char)] = &[(0, 'a'), (2, 'b'), (7, 'c')];

        assert_eq!(flags_from_bits(0, MAPPING), vec![]);
        assert_eq!(flags_from_bits(0b0000_0101, MAPPING), vec!['a', 'b']);
        // The bits outside the mapping do not contribute.
        assert_eq!(flags_from_bits(0b1000_0010, MAPPING), vec!['c']);
        assert_eq!(flags_from_bits(u64::MAX, MAPPING), vec!['a', 'b', 'c']);
    }
}
