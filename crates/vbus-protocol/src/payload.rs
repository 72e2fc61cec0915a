//! Payload field table and decoder.
//!
//! Payload bytes map to named sensor fields through a fixed table of
//! inclusive byte ranges. Multi-byte fields are little-endian.
//!
//! ```text
//! 0-1 temp1 | 2-3 temp2 | 4-5 temp3 | 6-7 temp4 | 8 pump1 | 9 pump2
//! 10 relais | 11 errors | 12-13 time | 14 scheme | 15 flags
//! 16-17 r1time | 18-19 r2time | 20-25 reserved | 26-27 version
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named field in the sensor payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadField {
    Temp1,
    Temp2,
    Temp3,
    Temp4,
    Pump1,
    Pump2,
    Relais,
    Errors,
    Time,
    Scheme,
    Flags,
    R1Time,
    R2Time,
    Version,
}

impl PayloadField {
    /// Every field, in payload order.
    pub const ALL: [PayloadField; 14] = [
        PayloadField::Temp1,
        PayloadField::Temp2,
        PayloadField::Temp3,
        PayloadField::Temp4,
        PayloadField::Pump1,
        PayloadField::Pump2,
        PayloadField::Relais,
        PayloadField::Errors,
        PayloadField::Time,
        PayloadField::Scheme,
        PayloadField::Flags,
        PayloadField::R1Time,
        PayloadField::R2Time,
        PayloadField::Version,
    ];

    /// The field's name as used on the wire and in config.
    pub fn name(self) -> &'static str {
        match self {
            PayloadField::Temp1 => "temp1",
            PayloadField::Temp2 => "temp2",
            PayloadField::Temp3 => "temp3",
            PayloadField::Temp4 => "temp4",
            PayloadField::Pump1 => "pump1",
            PayloadField::Pump2 => "pump2",
            PayloadField::Relais => "relais",
            PayloadField::Errors => "errors",
            PayloadField::Time => "time",
            PayloadField::Scheme => "scheme",
            PayloadField::Flags => "flags",
            PayloadField::R1Time => "r1time",
            PayloadField::R2Time => "r2time",
            PayloadField::Version => "version",
        }
    }

    /// Inclusive byte range `(first, last)` within the payload.
    pub fn range(self) -> (usize, usize) {
        match self {
            PayloadField::Temp1 => (0, 1),
            PayloadField::Temp2 => (2, 3),
            PayloadField::Temp3 => (4, 5),
            PayloadField::Temp4 => (6, 7),
            PayloadField::Pump1 => (8, 8),
            PayloadField::Pump2 => (9, 9),
            PayloadField::Relais => (10, 10),
            PayloadField::Errors => (11, 11),
            PayloadField::Time => (12, 13),
            PayloadField::Scheme => (14, 14),
            PayloadField::Flags => (15, 15),
            PayloadField::R1Time => (16, 17),
            PayloadField::R2Time => (18, 19),
            PayloadField::Version => (26, 27),
        }
    }

    /// Width of the field in bytes.
    pub fn width(self) -> usize {
        let (first, last) = self.range();
        last - first + 1
    }

    /// Read this field from `payload`, or `None` if the payload is too short.
    pub fn extract(self, payload: &[u8]) -> Option<u16> {
        let (first, last) = self.range();
        let bytes = payload.get(first..=last)?;
        Some(
            bytes
                .iter()
                .enumerate()
                .fold(0u16, |acc, (i, &b)| acc | (b as u16) << (8 * i)),
        )
    }
}

impl fmt::Display for PayloadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PayloadField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PayloadField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown payload field: {}", s))
    }
}

/// Sensor values decoded from one validated frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Reading {
    values: BTreeMap<PayloadField, u16>,
}

impl Reading {
    /// Decode every table field present in `payload`.
    ///
    /// Fields whose range lies beyond the end of the payload are left out.
    pub fn decode(payload: &[u8]) -> Reading {
        let values = PayloadField::ALL
            .into_iter()
            .filter_map(|field| field.extract(payload).map(|value| (field, value)))
            .collect();
        Reading { values }
    }

    /// Get a field value.
    pub fn get(&self, field: PayloadField) -> Option<u16> {
        self.values.get(&field).copied()
    }

    /// Get a field value by its table name.
    pub fn get_by_name(&self, name: &str) -> Option<u16> {
        name.parse().ok().and_then(|field| self.get(field))
    }

    /// Iterate over the decoded fields in payload order.
    pub fn iter(&self) -> impl Iterator<Item = (PayloadField, u16)> + '_ {
        self.values.iter().map(|(&field, &value)| (field, value))
    }

    /// Number of decoded fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field could be decoded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values keyed by field name.
    pub fn to_named_map(&self) -> BTreeMap<&'static str, u16> {
        self.iter().map(|(field, value)| (field.name(), value)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> Vec<u8> {
        let mut payload = vec![0u8; 30];
        payload[0..2].copy_from_slice(&215u16.to_le_bytes());
        payload[2..4].copy_from_slice(&0x0123u16.to_le_bytes());
        payload[4..6].copy_from_slice(&0x7F01u16.to_le_bytes());
        payload[6..8].copy_from_slice(&8888u16.to_le_bytes());
        payload[8] = 100;
        payload[9] = 0;
        payload[10] = 0x03;
        payload[11] = 0x10;
        payload[12..14].copy_from_slice(&(13 * 60 + 37u16).to_le_bytes());
        payload[14] = 4;
        payload[15] = 0x21;
        payload[16..18].copy_from_slice(&1234u16.to_le_bytes());
        payload[18..20].copy_from_slice(&5678u16.to_le_bytes());
        payload[20..26].copy_from_slice(&[0xEE; 6]);
        payload[26..28].copy_from_slice(&0x0203u16.to_le_bytes());
        payload
    }

    #[test]
    fn test_table_ranges() {
        let mut covered = [false; 28];
        for field in PayloadField::ALL {
            let (first, last) = field.range();
            assert!(field.width() == 1 || field.width() == 2);
            for slot in &mut covered[first..=last] {
                assert!(!*slot, "{} overlaps another field", field);
                *slot = true;
            }
        }
        // 20..=25 are reserved
        assert!(covered[20..26].iter().all(|c| !c));
        assert_eq!(covered.iter().filter(|c| **c).count(), 22);
    }

    #[test]
    fn test_decode_full_payload() {
        let reading = Reading::decode(&full_payload());
        assert_eq!(reading.len(), 14);
        assert_eq!(reading.get(PayloadField::Temp1), Some(215));
        assert_eq!(reading.get(PayloadField::Temp2), Some(0x0123));
        assert_eq!(reading.get(PayloadField::Temp3), Some(0x7F01));
        assert_eq!(reading.get(PayloadField::Temp4), Some(8888));
        assert_eq!(reading.get(PayloadField::Pump1), Some(100));
        assert_eq!(reading.get(PayloadField::Pump2), Some(0));
        assert_eq!(reading.get(PayloadField::Relais), Some(3));
        assert_eq!(reading.get(PayloadField::Errors), Some(0x10));
        assert_eq!(reading.get(PayloadField::Time), Some(13 * 60 + 37));
        assert_eq!(reading.get(PayloadField::Scheme), Some(4));
        assert_eq!(reading.get(PayloadField::Flags), Some(0x21));
        assert_eq!(reading.get(PayloadField::R1Time), Some(1234));
        assert_eq!(reading.get(PayloadField::R2Time), Some(5678));
        assert_eq!(reading.get(PayloadField::Version), Some(0x0203));
    }

    #[test]
    fn test_short_payload_omits_fields() {
        let payload = full_payload();
        let reading = Reading::decode(&payload[..24]);
        assert_eq!(reading.get(PayloadField::R2Time), Some(5678));
        assert_eq!(reading.get(PayloadField::Version), None);
        assert_eq!(reading.len(), 13);

        let reading = Reading::decode(&payload[..1]);
        assert!(reading.is_empty());
    }

    #[test]
    fn test_frame_round_trip() {
        let payload = full_payload();
        let wire = crate::Frame::new([0x10, 0x00, 0x11, 0x7E], payload.clone())
            .unwrap()
            .encode();
        let frame = crate::FrameValidator::validate(&wire[1..]).expect("valid frame");
        assert_eq!(Reading::decode(frame.payload()), Reading::decode(&payload));
        assert_eq!(Reading::decode(frame.payload()).get(PayloadField::Temp4), Some(8888));
    }

    #[test]
    fn test_lookup_by_name() {
        let reading = Reading::decode(&full_payload());
        assert_eq!(reading.get_by_name("r1time"), Some(1234));
        assert_eq!(reading.get_by_name("version"), Some(0x0203));
        assert_eq!(reading.get_by_name("bogus"), None);

        let named = reading.to_named_map();
        assert_eq!(named.get("temp1"), Some(&215));
        assert_eq!(named.len(), 14);
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in PayloadField::ALL {
            assert_eq!(field.name().parse::<PayloadField>(), Ok(field));
        }
        assert!("temp5".parse::<PayloadField>().is_err());
    }
}
