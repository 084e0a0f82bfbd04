//! LEB128 variable-length integer codec.
//!
//! Five integer shapes are used by the binary format: vu32, vs32, vs33,
//! vu64, vs64. Readers accept non-minimal encodings (e.g. `80 00` for 0) up
//! to a 70-bit shift guard; anything that fails to terminate by then, or
//! whose decoded magnitude exceeds the declared width, is a
//! [`DecodeError::LebOverflow`]. Writers always emit minimal form and
//! produce at least one byte.
//!
//! The vs33 shape exists solely for block-type immediates: negative values
//! encode built-in value types or void, nonnegative values carry a type
//! index in the full u32 range, so the result is handed back as an `i64`.

use crate::cursor::Reader;
use crate::error::DecodeError;

/// Shift guard: a terminator must appear before 70 accumulated value bits.
const MAX_SHIFT: u32 = 70;

fn read_unsigned(reader: &mut Reader, width: &'static str, max: u128) -> Result<u128, DecodeError> {
    let mut result: u128 = 0;
    let mut shift: u32 = 0;
    loop {
        if shift >= MAX_SHIFT {
            return Err(DecodeError::LebOverflow(width));
        }
        let byte = reader.read_u8()?;
        result |= u128::from(byte & 0x7f) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            break;
        }
    }
    if result > max {
        return Err(DecodeError::LebOverflow(width));
    }
    Ok(result)
}

fn read_signed(
    reader: &mut Reader,
    width: &'static str,
    min: i128,
    max: i128,
) -> Result<i128, DecodeError> {
    let mut result: i128 = 0;
    let mut shift: u32 = 0;
    loop {
        if shift >= MAX_SHIFT {
            return Err(DecodeError::LebOverflow(width));
        }
        let byte = reader.read_u8()?;
        result |= i128::from(byte & 0x7f) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            // bit 6 of the final byte carries the sign
            if byte & 0x40 != 0 {
                result |= -1i128 << shift;
            }
            break;
        }
    }
    if result < min || result > max {
        return Err(DecodeError::LebOverflow(width));
    }
    Ok(result)
}

/// Reads an unsigned 32-bit LEB128 value.
pub fn read_vu32(reader: &mut Reader) -> Result<u32, DecodeError> {
    Ok(read_unsigned(reader, "u32", u32::MAX as u128)? as u32)
}

/// Reads an unsigned 64-bit LEB128 value.
pub fn read_vu64(reader: &mut Reader) -> Result<u64, DecodeError> {
    Ok(read_unsigned(reader, "u64", u64::MAX as u128)? as u64)
}

/// Reads a signed 32-bit LEB128 value.
pub fn read_vs32(reader: &mut Reader) -> Result<i32, DecodeError> {
    Ok(read_signed(reader, "i32", i32::MIN as i128, i32::MAX as i128)? as i32)
}

/// Reads a signed 33-bit LEB128 value (block types).
pub fn read_vs33(reader: &mut Reader) -> Result<i64, DecodeError> {
    Ok(read_signed(reader, "i33", -(1i128 << 32), (1i128 << 32) - 1)? as i64)
}

/// Reads a signed 64-bit LEB128 value.
pub fn read_vs64(reader: &mut Reader) -> Result<i64, DecodeError> {
    Ok(read_signed(reader, "i64", i64::MIN as i128, i64::MAX as i128)? as i64)
}

/// Appends the minimal unsigned LEB128 encoding of `value` to `buf`.
pub fn write_vu64(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        byte |= 0x80;
        buf.push(byte);
    }
}

/// Appends the minimal unsigned LEB128 encoding of `value` to `buf`.
pub fn write_vu32(buf: &mut Vec<u8>, value: u32) {
    write_vu64(buf, value as u64);
}

/// Appends the minimal signed LEB128 encoding of `value` to `buf`.
pub fn write_vs64(buf: &mut Vec<u8>, mut value: i64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0) {
            buf.push(byte);
            break;
        }
        byte |= 0x80;
        buf.push(byte);
    }
}

/// Appends the minimal signed LEB128 encoding of `value` to `buf`.
pub fn write_vs32(buf: &mut Vec<u8>, value: i32) {
    write_vs64(buf, value as i64);
}

/// Appends the minimal signed LEB128 encoding of a 33-bit value to `buf`.
///
/// Emission is value-driven, so the byte sequence is identical to the vs64
/// encoding of the same value.
pub fn write_vs33(buf: &mut Vec<u8>, value: i64) {
    write_vs64(buf, value);
}

/// Byte length [`write_vu64`] will produce for `value`.
pub fn size_vu64(mut value: u64) -> usize {
    let mut n = 1;
    value >>= 7;
    while value != 0 {
        n += 1;
        value >>= 7;
    }
    n
}

/// Byte length [`write_vu32`] will produce for `value`.
pub fn size_vu32(value: u32) -> usize {
    size_vu64(value as u64)
}

/// Byte length [`write_vs64`] will produce for `value`.
pub fn size_vs64(mut value: i64) -> usize {
    let mut n = 0;
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        n += 1;
        if (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0) {
            return n;
        }
    }
}

/// Byte length [`write_vs32`] will produce for `value`.
pub fn size_vs32(value: i32) -> usize {
    size_vs64(value as i64)
}

/// Byte length [`write_vs33`] will produce for `value`.
pub fn size_vs33(value: i64) -> usize {
    size_vs64(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_vu32(v: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vu32(&mut buf, v);
        buf
    }

    fn encode_vu64(v: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vu64(&mut buf, v);
        buf
    }

    fn encode_vs32(v: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vs32(&mut buf, v);
        buf
    }

    fn encode_vs64(v: i64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vs64(&mut buf, v);
        buf
    }

    fn decode_vu32(bytes: &[u8]) -> Result<u32, DecodeError> {
        read_vu32(&mut Reader::new(bytes))
    }

    fn decode_vs32(bytes: &[u8]) -> Result<i32, DecodeError> {
        read_vs32(&mut Reader::new(bytes))
    }

    fn decode_vs33(bytes: &[u8]) -> Result<i64, DecodeError> {
        read_vs33(&mut Reader::new(bytes))
    }

    // -- Unsigned boundaries --

    #[test]
    fn test_write_vu32_boundaries() {
        assert_eq!(encode_vu32(0), vec![0x00]);
        assert_eq!(encode_vu32(127), vec![0x7f]);
        assert_eq!(encode_vu32(128), vec![0x80, 0x01]);
        assert_eq!(encode_vu32(16384), vec![0x80, 0x80, 0x01]);
        assert_eq!(encode_vu32(624485), vec![0b11100101, 0b10001110, 0b00100110]);
        assert_eq!(encode_vu32(u32::MAX), vec![0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(encode_vu32(0x80000000), vec![0x80, 0x80, 0x80, 0x80, 0x08]);
    }

    #[test]
    fn test_read_vu32_boundaries() {
        assert_eq!(decode_vu32(&[0x00]).unwrap(), 0);
        assert_eq!(decode_vu32(&[0x7f]).unwrap(), 127);
        assert_eq!(decode_vu32(&[0x80, 0x01]).unwrap(), 128);
        assert_eq!(decode_vu32(&[0x80, 0x80, 0x01]).unwrap(), 16384);
        assert_eq!(decode_vu32(&[0xff, 0xff, 0xff, 0xff, 0x0f]).unwrap(), u32::MAX);
    }

    #[test]
    fn test_read_vu32_non_minimal() {
        // padded encodings are accepted below the shift guard
        assert_eq!(decode_vu32(&[0x80, 0x00]).unwrap(), 0);
        assert_eq!(decode_vu32(&[0xff, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00]).unwrap(), 127);
    }

    #[test]
    fn test_read_vu32_overflow() {
        // 2^32 does not fit
        assert_eq!(decode_vu32(&[0x80, 0x80, 0x80, 0x80, 0x10]), Err(DecodeError::LebOverflow("u32")));
        // never terminates within 70 shift bits
        assert_eq!(
            decode_vu32(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00]),
            Err(DecodeError::LebOverflow("u32"))
        );
        // truncated input
        assert_eq!(decode_vu32(&[0x80]), Err(DecodeError::UnexpectedEnd));
    }

    #[test]
    fn test_write_vu64_boundaries() {
        assert_eq!(encode_vu64(0), vec![0x00]);
        assert_eq!(encode_vu64(u64::MAX), vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]);
    }

    // -- Signed boundaries --

    #[test]
    fn test_write_vs32_boundaries() {
        assert_eq!(encode_vs32(0), vec![0x00]);
        assert_eq!(encode_vs32(63), vec![0x3f]);
        assert_eq!(encode_vs32(64), vec![0xc0, 0x00]);
        assert_eq!(encode_vs32(-1), vec![0x7f]);
        assert_eq!(encode_vs32(-128), vec![0x80, 0x7f]);
        assert_eq!(encode_vs32(-624485), vec![0b10011011, 0b11110001, 0b01011001]);
        assert_eq!(encode_vs32(i32::MIN), vec![0x80, 0x80, 0x80, 0x80, 0x78]);
    }

    #[test]
    fn test_read_vs32_boundaries() {
        assert_eq!(decode_vs32(&[0x3f]).unwrap(), 63);
        assert_eq!(decode_vs32(&[0xc0, 0x00]).unwrap(), 64);
        assert_eq!(decode_vs32(&[0x7f]).unwrap(), -1);
        assert_eq!(decode_vs32(&[0x80, 0x7f]).unwrap(), -128);
        assert_eq!(decode_vs32(&[0x80, 0x80, 0x80, 0x80, 0x78]).unwrap(), i32::MIN);
    }

    #[test]
    fn test_read_vs32_overflow() {
        // 2^31 is out of range for i32
        assert_eq!(
            decode_vs32(&[0x80, 0x80, 0x80, 0x80, 0x08]),
            Err(DecodeError::LebOverflow("i32"))
        );
    }

    #[test]
    fn test_write_vs64_boundaries() {
        assert_eq!(encode_vs64(i64::MIN), vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x7f]);
        assert_eq!(encode_vs64(i64::MAX), vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00]);
    }

    // -- vs33 --

    #[test]
    fn test_vs33_range() {
        // the full signed 33-bit range round-trips
        for v in [0i64, -1, -64, 0x40, (1 << 32) - 1, -(1 << 32)] {
            let mut buf = Vec::new();
            write_vs33(&mut buf, v);
            assert_eq!(decode_vs33(&buf).unwrap(), v, "value {v}");
        }
        // 2^32 is out of range
        let mut buf = Vec::new();
        write_vs64(&mut buf, 1 << 32);
        assert_eq!(decode_vs33(&buf), Err(DecodeError::LebOverflow("i33")));
    }

    #[test]
    fn test_vs33_nonneg_matches_vu32_values() {
        // type-index block types are nonnegative and cover the u32 range
        let mut buf = Vec::new();
        write_vs33(&mut buf, u32::MAX as i64);
        assert_eq!(decode_vs33(&buf).unwrap(), u32::MAX as i64);
    }

    // -- size agreement and random sweeps --

    #[test]
    fn test_size_agrees_with_write_vu32() {
        use rand::Rng;

        let mut values = vec![0, 1, 127, 128, 16383, 16384, u32::MAX];
        for i in 0..31 {
            values.push(1u32 << i);
        }
        let mut rng = rand::rng();
        for _ in 0..1000 {
            values.push(rng.random::<u32>());
        }
        for v in values {
            assert_eq!(size_vu32(v), encode_vu32(v).len(), "value {v}");
        }
    }

    #[test]
    fn test_size_agrees_with_write_vs64() {
        use rand::Rng;

        let mut values = vec![0, 1, -1, 63, 64, -64, -65, i64::MAX, i64::MIN];
        for i in 0..63 {
            values.push(1i64 << i);
            values.push(-(1i64 << i));
        }
        let mut rng = rand::rng();
        for _ in 0..1000 {
            values.push(rng.random::<i64>());
        }
        for v in values {
            assert_eq!(size_vs64(v), encode_vs64(v).len(), "value {v}");
        }
    }

    #[test]
    fn test_rt_vu32() {
        use rand::Rng;

        let mut rng = rand::rng();
        for _ in 0..1000 {
            let v = rng.random::<u32>();
            assert_eq!(decode_vu32(&encode_vu32(v)).unwrap(), v);
        }
    }

    #[test]
    fn test_rt_vu64() {
        use rand::Rng;

        let mut rng = rand::rng();
        for _ in 0..1000 {
            let v = rng.random::<u64>();
            let encoded = encode_vu64(v);
            let mut reader = Reader::new(&encoded);
            assert_eq!(read_vu64(&mut reader).unwrap(), v);
        }
    }

    #[test]
    fn test_rt_vs32() {
        use rand::Rng;

        let mut rng = rand::rng();
        for _ in 0..1000 {
            let v = rng.random::<i32>();
            assert_eq!(decode_vs32(&encode_vs32(v)).unwrap(), v);
        }
    }

    #[test]
    fn test_rt_vs64() {
        use rand::Rng;

        let mut rng = rand::rng();
        for _ in 0..1000 {
            let v = rng.random::<i64>();
            let encoded = encode_vs64(v);
            let mut reader = Reader::new(&encoded);
            assert_eq!(read_vs64(&mut reader).unwrap(), v);
        }
    }
}
