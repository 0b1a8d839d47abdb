/*
 * exifkit - bytes.rs
 *
 * Copyright (C) 2026 Exifkit contributors
 *
 * This library is free software: you can redistribute it and/or
 * modify it under the terms of the GNU Lesser General Public License
 * as published by the Free Software Foundation, either version 3 of
 * the License, or (at your option) any later version.
 *
 * This library is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * Lesser General Public License for more details.
 *
 * You should have received a copy of the GNU Lesser General Public
 * License along with this library.  If not, see
 * <http://www.gnu.org/licenses/>.
 */

//! The byte codec: fixed width scalars in either byte order.
//!
//! Bounds are the caller's problem. Every reader here expects the
//! slice to hold at least the width of the value, like the
//! `byteorder` primitives it wraps.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::container::Endian;
use crate::value::{Rational, SRational};

pub(crate) fn get_u16(buf: &[u8], endian: Endian) -> u16 {
    match endian {
        Endian::Little => LittleEndian::read_u16(buf),
        Endian::Big => BigEndian::read_u16(buf),
        Endian::Unset => unreachable!("endian unset"),
    }
}

pub(crate) fn get_i16(buf: &[u8], endian: Endian) -> i16 {
    match endian {
        Endian::Little => LittleEndian::read_i16(buf),
        Endian::Big => BigEndian::read_i16(buf),
        Endian::Unset => unreachable!("endian unset"),
    }
}

pub(crate) fn get_u32(buf: &[u8], endian: Endian) -> u32 {
    match endian {
        Endian::Little => LittleEndian::read_u32(buf),
        Endian::Big => BigEndian::read_u32(buf),
        Endian::Unset => unreachable!("endian unset"),
    }
}

pub(crate) fn get_i32(buf: &[u8], endian: Endian) -> i32 {
    match endian {
        Endian::Little => LittleEndian::read_i32(buf),
        Endian::Big => BigEndian::read_i32(buf),
        Endian::Unset => unreachable!("endian unset"),
    }
}

pub(crate) fn get_f32(buf: &[u8], endian: Endian) -> f32 {
    match endian {
        Endian::Little => LittleEndian::read_f32(buf),
        Endian::Big => BigEndian::read_f32(buf),
        Endian::Unset => unreachable!("endian unset"),
    }
}

pub(crate) fn get_f64(buf: &[u8], endian: Endian) -> f64 {
    match endian {
        Endian::Little => LittleEndian::read_f64(buf),
        Endian::Big => BigEndian::read_f64(buf),
        Endian::Unset => unreachable!("endian unset"),
    }
}

/// An unsigned rational is two `u32`, numerator first.
pub(crate) fn get_urational(buf: &[u8], endian: Endian) -> Rational {
    Rational {
        num: get_u32(buf, endian),
        den: get_u32(&buf[4..], endian),
    }
}

pub(crate) fn get_rational(buf: &[u8], endian: Endian) -> SRational {
    SRational {
        num: get_i32(buf, endian),
        den: get_i32(&buf[4..], endian),
    }
}

/// Append `v` to `out`. Return the number of bytes written.
pub(crate) fn put_u16(out: &mut Vec<u8>, v: u16, endian: Endian) -> usize {
    let mut buf = [0_u8; 2];
    match endian {
        Endian::Little => LittleEndian::write_u16(&mut buf, v),
        Endian::Big => BigEndian::write_u16(&mut buf, v),
        Endian::Unset => unreachable!("endian unset"),
    }
    out.extend_from_slice(&buf);
    2
}

pub(crate) fn put_i16(out: &mut Vec<u8>, v: i16, endian: Endian) -> usize {
    put_u16(out, v as u16, endian)
}

pub(crate) fn put_u32(out: &mut Vec<u8>, v: u32, endian: Endian) -> usize {
    let mut buf = [0_u8; 4];
    match endian {
        Endian::Little => LittleEndian::write_u32(&mut buf, v),
        Endian::Big => BigEndian::write_u32(&mut buf, v),
        Endian::Unset => unreachable!("endian unset"),
    }
    out.extend_from_slice(&buf);
    4
}

pub(crate) fn put_i32(out: &mut Vec<u8>, v: i32, endian: Endian) -> usize {
    put_u32(out, v as u32, endian)
}

pub(crate) fn put_f32(out: &mut Vec<u8>, v: f32, endian: Endian) -> usize {
    let mut buf = [0_u8; 4];
    match endian {
        Endian::Little => LittleEndian::write_f32(&mut buf, v),
        Endian::Big => BigEndian::write_f32(&mut buf, v),
        Endian::Unset => unreachable!("endian unset"),
    }
    out.extend_from_slice(&buf);
    4
}

pub(crate) fn put_f64(out: &mut Vec<u8>, v: f64, endian: Endian) -> usize {
    let mut buf = [0_u8; 8];
    match endian {
        Endian::Little => LittleEndian::write_f64(&mut buf, v),
        Endian::Big => BigEndian::write_f64(&mut buf, v),
        Endian::Unset => unreachable!("endian unset"),
    }
    out.extend_from_slice(&buf);
    8
}

pub(crate) fn put_urational(out: &mut Vec<u8>, v: Rational, endian: Endian) -> usize {
    put_u32(out, v.num, endian) + put_u32(out, v.den, endian)
}

pub(crate) fn put_rational(out: &mut Vec<u8>, v: SRational, endian: Endian) -> usize {
    put_i32(out, v.num, endian) + put_i32(out, v.den, endian)
}

/// Patch a `u32` previously written at `pos`.
pub(crate) fn patch_u32(out: &mut [u8], pos: usize, v: u32, endian: Endian) {
    let buf = &mut out[pos..pos + 4];
    match endian {
        Endian::Little => LittleEndian::write_u32(buf, v),
        Endian::Big => BigEndian::write_u32(buf, v),
        Endian::Unset => unreachable!("endian unset"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::container::Endian;

    #[test]
    fn test_get() {
        let buf = [0x12_u8, 0x34, 0x56, 0x78];
        assert_eq!(get_u16(&buf, Endian::Little), 0x3412);
        assert_eq!(get_u16(&buf, Endian::Big), 0x1234);
        assert_eq!(get_u32(&buf, Endian::Little), 0x78563412);
        assert_eq!(get_u32(&buf, Endian::Big), 0x12345678);
        assert_eq!(get_i16(&[0xff, 0xff], Endian::Big), -1);
        assert_eq!(get_i32(&[0xff, 0xff, 0xff, 0xfe], Endian::Big), -2);
    }

    #[test]
    fn test_put_roundtrip() {
        let mut out = Vec::new();
        assert_eq!(put_u16(&mut out, 0x1234, Endian::Big), 2);
        assert_eq!(put_u32(&mut out, 0xdeadbeef, Endian::Little), 4);
        assert_eq!(out, vec![0x12, 0x34, 0xef, 0xbe, 0xad, 0xde]);
        assert_eq!(get_u16(&out, Endian::Big), 0x1234);
        assert_eq!(get_u32(&out[2..], Endian::Little), 0xdeadbeef);
    }

    #[test]
    fn test_rational() {
        let mut out = Vec::new();
        put_urational(
            &mut out,
            Rational { num: 1, den: 125 },
            Endian::Little,
        );
        let r = get_urational(&out, Endian::Little);
        assert_eq!(r.num, 1);
        assert_eq!(r.den, 125);

        let mut out = Vec::new();
        put_rational(&mut out, SRational { num: -1, den: 3 }, Endian::Big);
        let r = get_rational(&out, Endian::Big);
        assert_eq!(r.num, -1);
        assert_eq!(r.den, 3);
    }

    #[test]
    fn test_patch() {
        let mut out = vec![0_u8; 8];
        patch_u32(&mut out, 4, 0x0a0b0c0d, Endian::Big);
        assert_eq!(&out[4..], &[0x0a, 0x0b, 0x0c, 0x0d]);
    }
}
