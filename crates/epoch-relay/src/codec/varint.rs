//! Bitcoin-style compact size integers: values below `0xfd` are a single byte, larger values
//! are a marker byte followed by a little-endian u16, u32 or u64.
use super::take;
use crate::{RelayError, RelayResult};
use byteorder::{ByteOrder, LittleEndian};

/// Reads a compact size from the front of `input`, advancing it. Non-minimal encodings are
/// rejected so that every length has exactly one representation.
pub fn read(input: &mut &[u8]) -> RelayResult<u64> {
    let marker = take(input, 1, "compact size")?[0];
    let (value, min) = match marker {
        0xfd => (LittleEndian::read_u16(take(input, 2, "compact size")?) as u64, 0xfd),
        0xfe => (LittleEndian::read_u32(take(input, 4, "compact size")?) as u64, 0x1_0000),
        0xff => (LittleEndian::read_u64(take(input, 8, "compact size")?), 0x1_0000_0000),
        small => return Ok(small as u64),
    };
    if value < min {
        return Err(RelayError::MalformedPayload(format!(
            "non-minimal compact size for {}",
            value
        )));
    }
    Ok(value)
}

pub fn write(value: u64, out: &mut Vec<u8>) {
    if value < 0xfd {
        out.push(value as u8);
    } else if value <= u16::MAX as u64 {
        out.push(0xfd);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= u32::MAX as u64 {
        out.push(0xfe);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&value.to_le_bytes());
    }
}
