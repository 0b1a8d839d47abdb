// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * exifkit - value.rs
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

//! Typed tag values.
//!
//! A [`Value`] owns the element bytes of one IFD entry, in the byte
//! order they were parsed with, plus the optional data area for
//! entries whose value is an offset to a side buffer.

use std::convert::TryFrom;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::bytes;
use crate::container::Endian;
use crate::utils;
use crate::{Error, Result};

/// Type of a tag value. The numeric values are the TIFF type codes.
#[repr(u16)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
pub enum TagType {
    Byte = 1,
    Ascii = 2,
    Short = 3,
    Long = 4,
    Rational = 5,
    SByte = 6,
    Undefined = 7,
    SShort = 8,
    SLong = 9,
    SRational = 10,
    Float = 11,
    Double = 12,
    /// Synthetic type for charset tagged text. Never on the wire.
    Comment = 0x8000,
}

impl TagType {
    /// Decode an on-wire type code.
    pub fn from_wire(code: u16) -> Result<TagType> {
        match TagType::try_from(code) {
            Ok(TagType::Comment) | Err(_) => Err(Error::UnknownType(code)),
            Ok(t) => Ok(t),
        }
    }
}

impl From<TagType> for &'static str {
    fn from(t: TagType) -> &'static str {
        use TagType::*;
        match t {
            Byte => "Byte",
            Ascii => "Ascii",
            Short => "Short",
            Long => "Long",
            Rational => "Rational",
            SByte => "SByte",
            Undefined => "Undefined",
            SShort => "SShort",
            SLong => "SLong",
            SRational => "SRational",
            Float => "Float",
            Double => "Double",
            Comment => "Comment",
        }
    }
}

/// Return the size of a single element for the tag type.
pub fn unit_size(tag_type: TagType) -> usize {
    use TagType::*;

    match tag_type {
        Byte | SByte | Ascii | Undefined | Comment => 1,
        Short | SShort => 2,
        Long | SLong | Float => 4,
        Rational | SRational | Double => 8,
    }
}

/// Unsigned rational number (fraction)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Signed rational number (fraction)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SRational {
    pub num: i32,
    pub den: i32,
}

impl std::fmt::Display for SRational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Charset of a comment value, as tagged by the 8 byte marker that
/// leads the text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CharsetId {
    Ascii,
    Jis,
    Unicode,
    /// Marker is eight NULs.
    Unspecified,
}

impl CharsetId {
    pub(crate) fn marker(self) -> &'static [u8; 8] {
        match self {
            Self::Ascii => b"ASCII\0\0\0",
            Self::Jis => b"JIS\0\0\0\0\0",
            Self::Unicode => b"UNICODE\0",
            Self::Unspecified => b"\0\0\0\0\0\0\0\0",
        }
    }

    pub(crate) fn from_marker(buf: &[u8]) -> Option<CharsetId> {
        match buf.get(0..8)? {
            b"ASCII\0\0\0" => Some(Self::Ascii),
            b"JIS\0\0\0\0\0" => Some(Self::Jis),
            b"UNICODE\0" => Some(Self::Unicode),
            b"\0\0\0\0\0\0\0\0" => Some(Self::Unspecified),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<CharsetId> {
        match name {
            "Ascii" => Some(Self::Ascii),
            "Jis" => Some(Self::Jis),
            "Unicode" => Some(Self::Unicode),
            "Undefined" => Some(Self::Unspecified),
            _ => None,
        }
    }
}

/// A typed tag value. Element bytes are kept in `endian` order; a
/// clone is a plain buffer copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    type_: TagType,
    count: u32,
    data: Vec<u8>,
    endian: Endian,
    /// Side buffer for entries whose on-wire value is an offset to it.
    data_area: Option<Vec<u8>>,
}

impl Value {
    /// Parse `count = buf.len() / unit_size` elements of `type_`.
    pub fn from_bytes(type_: TagType, buf: &[u8], endian: Endian) -> Value {
        let unit = unit_size(type_);
        let count = (buf.len() / unit) as u32;
        Value {
            type_,
            count,
            data: buf[..count as usize * unit].to_vec(),
            endian,
            data_area: None,
        }
    }

    /// Build a value from its text form.
    ///
    /// `Ascii` and `Comment` take the text as is; numeric types parse
    /// whitespace separated tokens, rationals as `num/den`.
    pub fn from_string(type_: TagType, text: &str) -> Result<Value> {
        use TagType::*;

        // Values built from text are stored little endian.
        let endian = Endian::Little;
        let mut data = Vec::new();
        let count;
        match type_ {
            Ascii => {
                data.extend_from_slice(text.as_bytes());
                data.push(0);
                count = data.len() as u32;
            }
            Comment => return Ok(Value::new_comment(text)),
            Undefined | Byte => {
                for tok in text.split_whitespace() {
                    let v = tok
                        .parse::<u8>()
                        .map_err(|_| Error::ValueParse(tok.to_string()))?;
                    data.push(v);
                }
                count = data.len() as u32;
            }
            SByte => {
                for tok in text.split_whitespace() {
                    let v = tok
                        .parse::<i8>()
                        .map_err(|_| Error::ValueParse(tok.to_string()))?;
                    data.push(v as u8);
                }
                count = data.len() as u32;
            }
            Short => {
                let mut n = 0;
                for tok in text.split_whitespace() {
                    let v = tok
                        .parse::<u16>()
                        .map_err(|_| Error::ValueParse(tok.to_string()))?;
                    bytes::put_u16(&mut data, v, endian);
                    n += 1;
                }
                count = n;
            }
            SShort => {
                let mut n = 0;
                for tok in text.split_whitespace() {
                    let v = tok
                        .parse::<i16>()
                        .map_err(|_| Error::ValueParse(tok.to_string()))?;
                    bytes::put_i16(&mut data, v, endian);
                    n += 1;
                }
                count = n;
            }
            Long => {
                let mut n = 0;
                for tok in text.split_whitespace() {
                    let v = tok
                        .parse::<u32>()
                        .map_err(|_| Error::ValueParse(tok.to_string()))?;
                    bytes::put_u32(&mut data, v, endian);
                    n += 1;
                }
                count = n;
            }
            SLong => {
                let mut n = 0;
                for tok in text.split_whitespace() {
                    let v = tok
                        .parse::<i32>()
                        .map_err(|_| Error::ValueParse(tok.to_string()))?;
                    bytes::put_i32(&mut data, v, endian);
                    n += 1;
                }
                count = n;
            }
            Rational => {
                let mut n = 0;
                for tok in text.split_whitespace() {
                    let r = parse_rational(tok)?;
                    bytes::put_urational(&mut data, r, endian);
                    n += 1;
                }
                count = n;
            }
            SRational => {
                let mut n = 0;
                for tok in text.split_whitespace() {
                    let r = parse_srational(tok)?;
                    bytes::put_rational(&mut data, r, endian);
                    n += 1;
                }
                count = n;
            }
            Float => {
                let mut n = 0;
                for tok in text.split_whitespace() {
                    let v = tok
                        .parse::<f32>()
                        .map_err(|_| Error::ValueParse(tok.to_string()))?;
                    bytes::put_f32(&mut data, v, endian);
                    n += 1;
                }
                count = n;
            }
            Double => {
                let mut n = 0;
                for tok in text.split_whitespace() {
                    let v = tok
                        .parse::<f64>()
                        .map_err(|_| Error::ValueParse(tok.to_string()))?;
                    bytes::put_f64(&mut data, v, endian);
                    n += 1;
                }
                count = n;
            }
        }
        Ok(Value {
            type_,
            count,
            data,
            endian,
            data_area: None,
        })
    }

    /// Build a comment value. The text may carry a `charset=Name `
    /// prefix; without one the charset marker is eight NULs.
    pub fn new_comment(text: &str) -> Value {
        let (charset, text) = match text.strip_prefix("charset=") {
            Some(rest) => {
                let (name, rest) = rest.split_once(' ').unwrap_or((rest, ""));
                match CharsetId::from_name(name) {
                    Some(id) => (id, rest),
                    None => (CharsetId::Unspecified, rest),
                }
            }
            None => (CharsetId::Unspecified, text),
        };
        let mut data = Vec::with_capacity(8 + text.len());
        data.extend_from_slice(charset.marker());
        data.extend_from_slice(text.as_bytes());
        Value {
            type_: TagType::Comment,
            count: data.len() as u32,
            data,
            endian: Endian::Little,
            data_area: None,
        }
    }

    /// Shorthand for a single `Short`.
    pub fn from_u16(v: u16) -> Value {
        let mut data = Vec::new();
        bytes::put_u16(&mut data, v, Endian::Little);
        Value {
            type_: TagType::Short,
            count: 1,
            data,
            endian: Endian::Little,
            data_area: None,
        }
    }

    /// Shorthand for a single `Long`.
    pub fn from_u32(v: u32) -> Value {
        let mut data = Vec::new();
        bytes::put_u32(&mut data, v, Endian::Little);
        Value {
            type_: TagType::Long,
            count: 1,
            data,
            endian: Endian::Little,
            data_area: None,
        }
    }

    pub fn tag_type(&self) -> TagType {
        self.type_
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Size of the element bytes. The data area is not included.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_area(&self) -> Option<&[u8]> {
        self.data_area.as_deref()
    }

    pub fn set_data_area(&mut self, buf: Vec<u8>) {
        self.data_area = Some(buf);
    }

    fn elem(&self, index: u32) -> Result<&[u8]> {
        if index >= self.count {
            return Err(Error::OutOfRange);
        }
        let unit = unit_size(self.type_);
        Ok(&self.data[unit * index as usize..unit * (index as usize + 1)])
    }

    /// Get element `index` widened to `i64`. Rationals divide.
    pub fn to_i64(&self, index: u32) -> Result<i64> {
        use TagType::*;

        let buf = self.elem(index)?;
        match self.type_ {
            Byte | Undefined => Ok(buf[0] as i64),
            SByte => Ok(buf[0] as i8 as i64),
            Short => Ok(bytes::get_u16(buf, self.endian) as i64),
            SShort => Ok(bytes::get_i16(buf, self.endian) as i64),
            Long => Ok(bytes::get_u32(buf, self.endian) as i64),
            SLong => Ok(bytes::get_i32(buf, self.endian) as i64),
            Rational => {
                let r = bytes::get_urational(buf, self.endian);
                if r.den == 0 {
                    Ok(0)
                } else {
                    Ok((r.num / r.den) as i64)
                }
            }
            SRational => {
                let r = bytes::get_rational(buf, self.endian);
                if r.den == 0 {
                    Ok(0)
                } else {
                    Ok((r.num / r.den) as i64)
                }
            }
            Float => Ok(bytes::get_f32(buf, self.endian) as i64),
            Double => Ok(bytes::get_f64(buf, self.endian) as i64),
            Ascii | Comment => Err(Error::ValueParse("not a numeric value".to_string())),
        }
    }

    /// Get element `index` as `f64`.
    pub fn to_f64(&self, index: u32) -> Result<f64> {
        use TagType::*;

        let buf = self.elem(index)?;
        match self.type_ {
            Float => Ok(bytes::get_f32(buf, self.endian) as f64),
            Double => Ok(bytes::get_f64(buf, self.endian)),
            Rational => {
                let r = bytes::get_urational(buf, self.endian);
                if r.den == 0 {
                    Ok(0.0)
                } else {
                    Ok(r.num as f64 / r.den as f64)
                }
            }
            SRational => {
                let r = bytes::get_rational(buf, self.endian);
                if r.den == 0 {
                    Ok(0.0)
                } else {
                    Ok(r.num as f64 / r.den as f64)
                }
            }
            _ => self.to_i64(index).map(|v| v as f64),
        }
    }

    /// Get element `index` as an unsigned rational. Integers become
    /// `n/1`.
    pub fn to_rational(&self, index: u32) -> Result<Rational> {
        match self.type_ {
            TagType::Rational => Ok(bytes::get_urational(self.elem(index)?, self.endian)),
            TagType::SRational => {
                let r = bytes::get_rational(self.elem(index)?, self.endian);
                Ok(Rational {
                    num: r.num as u32,
                    den: r.den as u32,
                })
            }
            _ => self.to_i64(index).map(|v| Rational {
                num: v as u32,
                den: 1,
            }),
        }
    }

    /// Sum of all elements as `i64`. 0 for string types.
    pub(crate) fn sum(&self) -> i64 {
        let mut total = 0_i64;
        for i in 0..self.count {
            total += self.to_i64(i).unwrap_or(0);
        }
        total
    }

    /// Text of element `index`.
    pub fn to_string_at(&self, index: u32) -> Result<String> {
        use TagType::*;

        match self.type_ {
            Ascii | Comment => Ok(self.text()),
            Rational => Ok(self.to_rational(index)?.to_string()),
            SRational => Ok(bytes::get_rational(self.elem(index)?, self.endian).to_string()),
            Float | Double => Ok(self.to_f64(index)?.to_string()),
            _ => Ok(self.to_i64(index)?.to_string()),
        }
    }

    /// The whole value as text. Strings come out NUL stripped,
    /// comments without their charset marker, numeric types as space
    /// separated elements.
    pub fn text(&self) -> String {
        match self.type_ {
            TagType::Ascii => utils::string_from_field(&self.data),
            TagType::Comment => {
                let body = if CharsetId::from_marker(&self.data).is_some() {
                    &self.data[8..]
                } else {
                    &self.data[..]
                };
                utils::string_from_field(body)
            }
            _ => {
                let mut out = String::new();
                for i in 0..self.count {
                    if i > 0 {
                        out.push(' ');
                    }
                    match self.to_string_at(i) {
                        Ok(s) => out.push_str(&s),
                        Err(_) => break,
                    }
                }
                out
            }
        }
    }

    /// Charset of a comment value.
    pub fn charset(&self) -> Option<CharsetId> {
        if self.type_ != TagType::Comment {
            return None;
        }
        CharsetId::from_marker(&self.data)
    }

    /// Append the wire form in `target` byte order. Returns bytes
    /// written. Comments are written as `Undefined` including the
    /// charset marker.
    pub fn write_to_bytes(&self, out: &mut Vec<u8>, target: Endian) -> usize {
        use TagType::*;

        let unit = unit_size(self.type_);
        if unit == 1 || target == self.endian {
            out.extend_from_slice(&self.data);
            return self.data.len();
        }
        let mut written = 0;
        for i in 0..self.count as usize {
            let buf = &self.data[unit * i..unit * (i + 1)];
            written += match self.type_ {
                Short => bytes::put_u16(out, bytes::get_u16(buf, self.endian), target),
                SShort => bytes::put_i16(out, bytes::get_i16(buf, self.endian), target),
                Long => bytes::put_u32(out, bytes::get_u32(buf, self.endian), target),
                SLong => bytes::put_i32(out, bytes::get_i32(buf, self.endian), target),
                Float => bytes::put_f32(out, bytes::get_f32(buf, self.endian), target),
                Double => bytes::put_f64(out, bytes::get_f64(buf, self.endian), target),
                Rational => {
                    bytes::put_urational(out, bytes::get_urational(buf, self.endian), target)
                }
                SRational => {
                    bytes::put_rational(out, bytes::get_rational(buf, self.endian), target)
                }
                _ => unreachable!("unit size 1 handled above"),
            };
        }
        written
    }

    /// The on-wire type. Comments travel as `Undefined`.
    pub(crate) fn wire_type(&self) -> TagType {
        if self.type_ == TagType::Comment {
            TagType::Undefined
        } else {
            self.type_
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

fn parse_rational(tok: &str) -> Result<Rational> {
    let (num, den) = tok
        .split_once('/')
        .ok_or_else(|| Error::ValueParse(tok.to_string()))?;
    Ok(Rational {
        num: num
            .parse()
            .map_err(|_| Error::ValueParse(tok.to_string()))?,
        den: den
            .parse()
            .map_err(|_| Error::ValueParse(tok.to_string()))?,
    })
}

fn parse_srational(tok: &str) -> Result<SRational> {
    let (num, den) = tok
        .split_once('/')
        .ok_or_else(|| Error::ValueParse(tok.to_string()))?;
    Ok(SRational {
        num: num
            .parse()
            .map_err(|_| Error::ValueParse(tok.to_string()))?,
        den: den
            .parse()
            .map_err(|_| Error::ValueParse(tok.to_string()))?,
    })
}

#[cfg(test)]
mod test {
    use super::{CharsetId, TagType, Value};
    use crate::container::Endian;
    use crate::Error;

    #[test]
    fn test_from_bytes() {
        let v = Value::from_bytes(TagType::Short, &[0, 2, 0, 4, 0, 6], Endian::Big);
        assert_eq!(v.count(), 3);
        assert_eq!(v.size(), 6);
        assert_eq!(v.to_i64(0), Ok(2));
        assert_eq!(v.to_i64(2), Ok(6));
        assert_eq!(v.to_i64(3), Err(Error::OutOfRange));

        // Trailing partial element is dropped.
        let v = Value::from_bytes(TagType::Short, &[1, 0, 2], Endian::Little);
        assert_eq!(v.count(), 1);
        assert_eq!(v.to_i64(0), Ok(1));
    }

    #[test]
    fn test_ascii() {
        let v = Value::from_bytes(TagType::Ascii, b"Canon\0", Endian::Little);
        assert_eq!(v.text(), "Canon");
        assert_eq!(v.to_string(), "Canon");
        assert!(v.to_i64(0).is_err());
    }

    #[test]
    fn test_from_string() {
        let v = Value::from_string(TagType::Long, "640 480").unwrap();
        assert_eq!(v.count(), 2);
        assert_eq!(v.to_i64(0), Ok(640));
        assert_eq!(v.to_i64(1), Ok(480));

        let v = Value::from_string(TagType::Rational, "1/125").unwrap();
        assert_eq!(v.to_f64(0), Ok(0.008));
        assert_eq!(v.to_string_at(0).unwrap(), "1/125");

        let err = Value::from_string(TagType::Short, "12 bogus");
        assert!(matches!(err, Err(Error::ValueParse(_))));
    }

    #[test]
    fn test_comment() {
        let v = Value::new_comment("charset=Ascii A comment");
        assert_eq!(v.charset(), Some(CharsetId::Ascii));
        assert_eq!(v.text(), "A comment");
        assert_eq!(&v.data()[0..8], b"ASCII\0\0\0");

        let v = Value::new_comment("plain");
        assert_eq!(v.charset(), Some(CharsetId::Unspecified));
        assert_eq!(v.text(), "plain");
        assert_eq!(v.count(), 13);
    }

    #[test]
    fn test_write_to_bytes_converts() {
        let v = Value::from_bytes(TagType::Short, &[0x12, 0x34], Endian::Big);
        let mut out = Vec::new();
        let n = v.write_to_bytes(&mut out, Endian::Little);
        assert_eq!(n, 2);
        assert_eq!(out, vec![0x34, 0x12]);

        // Same order is a plain copy.
        let mut out = Vec::new();
        v.write_to_bytes(&mut out, Endian::Big);
        assert_eq!(out, vec![0x12, 0x34]);
    }

    #[test]
    fn test_data_area() {
        let mut v = Value::from_u32(0);
        assert!(v.data_area().is_none());
        v.set_data_area(vec![0xff, 0xd8]);
        assert_eq!(v.data_area(), Some([0xff, 0xd8].as_slice()));
        // Size is independent of count.
        assert_eq!(v.size(), 4);
    }
}
