// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * exifkit - makernote.rs
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

//! Maker-note dispatch.
//!
//! The camera make selects a recognizer; the recognizer inspects the
//! maker-note payload and yields the header variant, the vendor
//! group, and the state override (byte order, offset base, first IFD
//! position) for the subtree. Offsets below a maker-note resolve
//! against that base, never against the enclosing directory's.

use lazy_static::lazy_static;

use crate::bytes;
use crate::container::Endian;
use crate::metadata::Group;
use crate::tiff::{Dir, TIFF_MAGIC};

/// Header variant of a maker-note.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MnKind {
    /// No header, the body is a bare IFD.
    Plain,
    Olympus,
    Fuji,
    Nikon2,
    Nikon3,
    Panasonic,
    Sigma,
    Sony1,
}

/// Recognized maker-note header with the subtree state override.
#[derive(Clone, Debug)]
pub(crate) struct MnHeader {
    pub kind: MnKind,
    pub group: Group,
    /// The verbatim header block. Empty for `Plain`.
    pub bytes: Vec<u8>,
    /// Byte order of the body.
    pub endian: Endian,
    /// Absolute offset base for offsets within the subtree.
    pub base: u32,
    /// Absolute position of the first directory.
    pub ifd_start: u32,
    /// Whether the directory carries a next-IFD pointer.
    pub has_next: bool,
}

/// The decoded maker-note body.
#[derive(Clone, Debug)]
pub(crate) enum Makernote {
    /// Header (possibly empty) plus a TIFF style IFD.
    Ifd { header: MnHeader, dir: Dir },
    /// Unrecognized and not plausibly an IFD. The raw bytes stay on
    /// the hosting entry.
    Opaque,
}

type MnRecognizer = fn(&[u8], u32, Endian, u32) -> Option<MnHeader>;

lazy_static! {
    /// Make prefix to recognizer. Prefix match is case sensitive:
    /// `"OLYMPUS OPTICAL CO.,LTD"` matches the `"OLYMPUS"` key.
    static ref MAKERNOTE_REGISTRY: Vec<(&'static str, MnRecognizer)> = vec![
        ("Canon", new_canon_mn as MnRecognizer),
        ("FUJIFILM", new_fuji_mn),
        ("KONICA MINOLTA", new_minolta_mn),
        ("Minolta", new_minolta_mn),
        ("NIKON", new_nikon_mn),
        ("OLYMPUS", new_olympus_mn),
        ("Panasonic", new_panasonic_mn),
        ("SIGMA", new_sigma_mn),
        ("FOVEON", new_sigma_mn),
        ("SONY", new_sony_mn),
    ];
}

/// Match `make` against the registry and recognize the header.
///
/// `mn_pos` is the absolute position of the maker-note payload,
/// `endian` and `base` the enclosing subtree's state.
pub(crate) fn detect(
    make: &str,
    payload: &[u8],
    mn_pos: u32,
    endian: Endian,
    base: u32,
) -> Option<MnHeader> {
    MAKERNOTE_REGISTRY
        .iter()
        .find(|(prefix, _)| make.starts_with(prefix))
        .and_then(|(_, recognize)| recognize(payload, mn_pos, endian, base))
}

fn plain(group: Group, mn_pos: u32, endian: Endian, base: u32) -> MnHeader {
    MnHeader {
        kind: MnKind::Plain,
        group,
        bytes: Vec::new(),
        endian,
        base,
        ifd_start: mn_pos,
        has_next: true,
    }
}

fn new_canon_mn(_payload: &[u8], mn_pos: u32, endian: Endian, base: u32) -> Option<MnHeader> {
    Some(plain(Group::Canon, mn_pos, endian, base))
}

fn new_minolta_mn(_payload: &[u8], mn_pos: u32, endian: Endian, base: u32) -> Option<MnHeader> {
    Some(plain(Group::Minolta, mn_pos, endian, base))
}

fn new_olympus_mn(payload: &[u8], mn_pos: u32, endian: Endian, base: u32) -> Option<MnHeader> {
    if payload.len() < 8 || &payload[0..6] != b"OLYMP\0" {
        return None;
    }
    Some(MnHeader {
        kind: MnKind::Olympus,
        group: Group::Olympus,
        bytes: payload[0..8].to_vec(),
        endian,
        base,
        ifd_start: mn_pos + 8,
        has_next: true,
    })
}

fn new_fuji_mn(payload: &[u8], mn_pos: u32, _endian: Endian, _base: u32) -> Option<MnHeader> {
    if payload.len() < 12 || &payload[0..8] != b"FUJIFILM" {
        return None;
    }
    // The body is always little endian and the IFD offset comes from
    // the header itself; offsets rebase to the payload start.
    let ifd_offset = bytes::get_u32(&payload[8..12], Endian::Little);
    Some(MnHeader {
        kind: MnKind::Fuji,
        group: Group::Fuji,
        bytes: payload[0..12].to_vec(),
        endian: Endian::Little,
        base: mn_pos,
        ifd_start: mn_pos + ifd_offset,
        has_next: true,
    })
}

fn new_nikon_mn(payload: &[u8], mn_pos: u32, endian: Endian, base: u32) -> Option<MnHeader> {
    // No "Nikon" signature at all is the original Nikon1 format.
    if payload.len() < 8 || &payload[0..6] != b"Nikon\0" {
        return Some(plain(Group::Nikon1, mn_pos, endian, base));
    }
    // Version 2.x with an embedded TIFF header is Nikon3. The
    // embedded header's byte order and offset are authoritative for
    // the whole subtree, with offsets based at the header.
    if payload.len() >= 18 && payload[6] == 0x02 {
        let embedded = Endian::from_marker(&payload[10..12])?;
        if bytes::get_u16(&payload[12..14], embedded) != TIFF_MAGIC {
            return None;
        }
        let ifd_offset = bytes::get_u32(&payload[14..18], embedded);
        return Some(MnHeader {
            kind: MnKind::Nikon3,
            group: Group::Nikon3,
            bytes: payload[0..18].to_vec(),
            endian: embedded,
            base: mn_pos + 10,
            ifd_start: mn_pos + 10 + ifd_offset,
            has_next: true,
        });
    }
    // "Nikon" signature without a TIFF header is Nikon2.
    Some(MnHeader {
        kind: MnKind::Nikon2,
        group: Group::Nikon2,
        bytes: payload[0..8].to_vec(),
        endian,
        base: mn_pos + 8,
        ifd_start: mn_pos + 8,
        has_next: true,
    })
}

fn new_panasonic_mn(payload: &[u8], mn_pos: u32, endian: Endian, base: u32) -> Option<MnHeader> {
    if payload.len() < 12 || &payload[0..12] != b"Panasonic\0\0\0" {
        return None;
    }
    Some(MnHeader {
        kind: MnKind::Panasonic,
        group: Group::Panasonic,
        bytes: payload[0..12].to_vec(),
        endian,
        base,
        ifd_start: mn_pos + 12,
        has_next: false,
    })
}

fn new_sigma_mn(payload: &[u8], mn_pos: u32, endian: Endian, base: u32) -> Option<MnHeader> {
    if payload.len() < 10 {
        return None;
    }
    if &payload[0..8] != b"SIGMA\0\0\0" && &payload[0..8] != b"FOVEON\0\0" {
        return None;
    }
    Some(MnHeader {
        kind: MnKind::Sigma,
        group: Group::Sigma,
        bytes: payload[0..10].to_vec(),
        endian,
        base,
        ifd_start: mn_pos + 10,
        has_next: true,
    })
}

fn new_sony_mn(payload: &[u8], mn_pos: u32, endian: Endian, base: u32) -> Option<MnHeader> {
    if payload.len() >= 12 && &payload[0..12] == b"SONY DSC \0\0\0" {
        return Some(MnHeader {
            kind: MnKind::Sony1,
            group: Group::Sony1,
            bytes: payload[0..12].to_vec(),
            endian,
            base,
            ifd_start: mn_pos + 12,
            has_next: false,
        });
    }
    // No signature: a bare IFD, which nonetheless carries a next
    // pointer.
    Some(plain(Group::Sony2, mn_pos, endian, base))
}

impl MnHeader {
    /// Emit the header block. `endian` is the byte order the
    /// maker-note body is being written in; only the Nikon3 embedded
    /// TIFF header depends on it, every other variant is verbatim.
    pub fn write(&self, out: &mut Vec<u8>, endian: Endian) {
        if self.kind == MnKind::Nikon3 {
            out.extend_from_slice(&self.bytes[0..10]);
            out.extend_from_slice(endian.marker());
            bytes::put_u16(out, TIFF_MAGIC, endian);
            // First IFD right after the embedded header.
            bytes::put_u32(out, 8, endian);
        } else {
            out.extend_from_slice(&self.bytes);
        }
    }

    /// Offset of the first directory from the maker-note start when
    /// re-encoding. The Fuji header names its own IFD offset.
    pub fn encoded_ifd_offset(&self) -> u32 {
        match self.kind {
            MnKind::Nikon3 => 18,
            MnKind::Fuji => bytes::get_u32(&self.bytes[8..12], Endian::Little),
            _ => self.bytes.len() as u32,
        }
    }

    /// Offset base for the re-encoded subtree, relative to the
    /// maker-note start. `None` inherits the enclosing base.
    pub fn encoded_base(&self) -> Option<u32> {
        match self.kind {
            MnKind::Fuji => Some(0),
            MnKind::Nikon2 => Some(8),
            MnKind::Nikon3 => Some(10),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{detect, MnKind};
    use crate::container::Endian;
    use crate::metadata::Group;

    #[test]
    fn test_detect_canon() {
        let hdr = detect("Canon", &[0; 8], 100, Endian::Little, 0).unwrap();
        assert_eq!(hdr.kind, MnKind::Plain);
        assert_eq!(hdr.group, Group::Canon);
        assert_eq!(hdr.ifd_start, 100);
        assert_eq!(hdr.base, 0);
    }

    #[test]
    fn test_detect_olympus_prefix_match() {
        let mut payload = b"OLYMP\0\x01\0".to_vec();
        payload.extend_from_slice(&[0; 8]);
        let hdr = detect(
            "OLYMPUS OPTICAL CO.,LTD",
            &payload,
            50,
            Endian::Big,
            0,
        )
        .unwrap();
        assert_eq!(hdr.kind, MnKind::Olympus);
        assert_eq!(hdr.ifd_start, 58);
        assert_eq!(hdr.endian, Endian::Big);
    }

    #[test]
    fn test_detect_fuji_forces_little_endian() {
        let mut payload = b"FUJIFILM".to_vec();
        payload.extend_from_slice(&[0x0c, 0, 0, 0]);
        payload.extend_from_slice(&[0; 8]);
        let hdr = detect("FUJIFILM", &payload, 200, Endian::Big, 0).unwrap();
        assert_eq!(hdr.kind, MnKind::Fuji);
        assert_eq!(hdr.endian, Endian::Little);
        assert_eq!(hdr.base, 200);
        assert_eq!(hdr.ifd_start, 212);
    }

    #[test]
    fn test_detect_nikon_variants() {
        // No signature: Nikon1.
        let hdr = detect("NIKON", &[0; 8], 10, Endian::Little, 0).unwrap();
        assert_eq!(hdr.group, Group::Nikon1);

        // Signature without TIFF header: Nikon2.
        let mut payload = b"Nikon\0\x01\0".to_vec();
        payload.extend_from_slice(&[0; 8]);
        let hdr = detect("NIKON", &payload, 10, Endian::Little, 0).unwrap();
        assert_eq!(hdr.kind, MnKind::Nikon2);
        assert_eq!(hdr.base, 18);

        // Embedded TIFF header: Nikon3, its byte order wins.
        let mut payload = b"Nikon\0\x02\x10\0\0".to_vec();
        payload.extend_from_slice(b"MM");
        payload.extend_from_slice(&[0x00, 0x2a, 0, 0, 0, 8]);
        payload.extend_from_slice(&[0; 8]);
        let hdr = detect("NIKON CORPORATION", &payload, 100, Endian::Little, 0).unwrap();
        assert_eq!(hdr.kind, MnKind::Nikon3);
        assert_eq!(hdr.endian, Endian::Big);
        assert_eq!(hdr.base, 110);
        assert_eq!(hdr.ifd_start, 118);
    }

    #[test]
    fn test_detect_sony_split() {
        let hdr = detect("SONY", b"SONY DSC \0\0\0    ", 10, Endian::Little, 0).unwrap();
        assert_eq!(hdr.kind, MnKind::Sony1);
        assert!(!hdr.has_next);

        let hdr = detect("SONY", &[0; 16], 10, Endian::Little, 0).unwrap();
        assert_eq!(hdr.group, Group::Sony2);
        assert!(hdr.has_next);
    }

    #[test]
    fn test_detect_unknown_make() {
        assert!(detect("NoSuchVendor", &[0; 16], 10, Endian::Little, 0).is_none());
    }

    #[test]
    fn test_nikon3_header_write() {
        let mut payload = b"Nikon\0\x02\x10\0\0".to_vec();
        payload.extend_from_slice(b"II");
        payload.extend_from_slice(&[0x2a, 0x00, 8, 0, 0, 0]);
        payload.extend_from_slice(&[0; 8]);
        let hdr = detect("NIKON", &payload, 0, Endian::Little, 0).unwrap();

        // Regenerated with the opposite byte order.
        let mut out = Vec::new();
        hdr.write(&mut out, Endian::Big);
        assert_eq!(&out[0..10], &payload[0..10]);
        assert_eq!(&out[10..12], b"MM");
        assert_eq!(&out[12..14], &[0x00, 0x2a]);
        assert_eq!(&out[14..18], &[0, 0, 0, 8]);
    }
}
