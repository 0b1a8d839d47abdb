// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * exifkit - tests/testsuite.rs
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

//! End to end scenarios over in-memory fixtures.

use exifkit::{ciff, tiff, Endian, Group, Key, MetadataSet, TagType, Value, WriteMethod};

fn w16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn w32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Little endian TIFF header pointing at IFD0 = 8.
fn tiff_header(out: &mut Vec<u8>) {
    out.extend_from_slice(b"II");
    w16(out, 0x2a);
    w32(out, 8);
}

/// 12 byte IFD entry with an inline value.
fn entry_inline(out: &mut Vec<u8>, tag: u16, type_: TagType, count: u32, value: [u8; 4]) {
    w16(out, tag);
    w16(out, type_ as u16);
    w32(out, count);
    out.extend_from_slice(&value);
}

/// 12 byte IFD entry referencing an offset.
fn entry_offset(out: &mut Vec<u8>, tag: u16, type_: TagType, count: u32, offset: u32) {
    w16(out, tag);
    w16(out, type_ as u16);
    w32(out, count);
    w32(out, offset);
}

/// One-entry little endian TIFF: ImageWidth = 640.
fn minimal_tiff() -> Vec<u8> {
    let mut blob = Vec::new();
    tiff_header(&mut blob);
    w16(&mut blob, 1);
    entry_inline(&mut blob, 0x0100, TagType::Long, 1, 640_u32.to_le_bytes());
    w32(&mut blob, 0);
    blob
}

#[test]
fn test_minimal_roundtrip() {
    let blob = minimal_tiff();
    let (set, endian) = tiff::decode(&blob).unwrap();
    assert_eq!(endian, Endian::Little);
    assert_eq!(set.len(), 1);
    let datum = set.iter().next().unwrap();
    assert_eq!(datum.key, Key::exif(Group::Image, 0x0100));
    assert_eq!(datum.value.to_i64(0), Ok(640));

    // Unmutated re-encode is byte exact.
    let (out, method) = tiff::encode(Some(&blob), &set, Endian::Little).unwrap();
    assert_eq!(method, WriteMethod::NonIntrusive);
    assert_eq!(out, blob);
}

#[test]
fn test_non_intrusive_overwrite() {
    let blob = minimal_tiff();
    let (mut set, _) = tiff::decode(&blob).unwrap();
    set.assign(Key::exif(Group::Image, 0x0100), Value::from_u32(641));

    let (out, method) = tiff::encode(Some(&blob), &set, Endian::Little).unwrap();
    assert_eq!(method, WriteMethod::NonIntrusive);
    assert_eq!(out.len(), blob.len());
    let (round, _) = tiff::decode(&out).unwrap();
    assert_eq!(
        round
            .find_key(&Key::exif(Group::Image, 0x0100))
            .unwrap()
            .value
            .to_i64(0),
        Ok(641)
    );
}

#[test]
fn test_added_record_forces_intrusive() {
    let blob = minimal_tiff();
    let (mut set, _) = tiff::decode(&blob).unwrap();
    set.insert(Key::exif(Group::Image, 0x0112), Value::from_u16(6));

    let (out, method) = tiff::encode(Some(&blob), &set, Endian::Little).unwrap();
    assert_eq!(method, WriteMethod::Intrusive);
    let (round, _) = tiff::decode(&out).unwrap();
    assert_eq!(round.len(), 2);
    assert_eq!(
        round
            .find_key(&Key::exif(Group::Image, 0x0112))
            .unwrap()
            .value
            .to_i64(0),
        Ok(6)
    );
}

/// An inline ASCII claiming five bytes does not fit the slot; the
/// slot must be taken as an offset (which points nowhere here). Four
/// bytes do fit and decode as text.
#[test]
fn test_inline_offset_boundary() {
    let mut blob = Vec::new();
    tiff_header(&mut blob);
    w16(&mut blob, 1);
    entry_inline(&mut blob, 0x010f, TagType::Ascii, 5, *b"Ca\0\0");
    w32(&mut blob, 0);
    let (set, _) = tiff::decode(&blob).unwrap();
    assert!(set.find_key(&Key::exif(Group::Image, 0x010f)).is_none());

    let mut blob = Vec::new();
    tiff_header(&mut blob);
    w16(&mut blob, 1);
    entry_inline(&mut blob, 0x010f, TagType::Ascii, 4, *b"Ca\0\0");
    w32(&mut blob, 0);
    let (set, _) = tiff::decode(&blob).unwrap();
    assert_eq!(
        set.find_key(&Key::exif(Group::Image, 0x010f))
            .unwrap()
            .value
            .text(),
        "Ca"
    );
}

/// IFD0 -> Exif sub-IFD with a dated entry.
fn tiff_with_exif_ifd() -> Vec<u8> {
    let mut blob = Vec::new();
    tiff_header(&mut blob);
    // IFD0, one entry, ends at 26.
    w16(&mut blob, 1);
    entry_offset(&mut blob, 0x8769, TagType::Long, 1, 26);
    w32(&mut blob, 0);
    // Exif IFD at 26, one entry, ends at 44.
    w16(&mut blob, 1);
    entry_offset(&mut blob, 0x9003, TagType::Ascii, 20, 44);
    w32(&mut blob, 0);
    blob.extend_from_slice(b"2020:01:02 03:04:05\0");
    blob
}

#[test]
fn test_exif_sub_ifd() {
    let blob = tiff_with_exif_ifd();
    let (set, _) = tiff::decode(&blob).unwrap();
    // The pointer entry is structural, only the dated entry shows.
    assert_eq!(set.len(), 1);
    let datum = set.find_key(&Key::exif(Group::Photo, 0x9003)).unwrap();
    assert_eq!(datum.value.text(), "2020:01:02 03:04:05");
}

#[test]
fn test_decode_encode_decode_is_stable() {
    let blob = tiff_with_exif_ifd();
    let (set, _) = tiff::decode(&blob).unwrap();

    // Through the intrusive rebuild and back.
    let (out, method) = tiff::encode(None, &set, Endian::Little).unwrap();
    assert_eq!(method, WriteMethod::Intrusive);
    let (round, _) = tiff::decode(&out).unwrap();

    assert_eq!(set.len(), round.len());
    for (a, b) in set.iter().zip(round.iter()) {
        assert_eq!(a.key, b.key);
        assert_eq!(a.value.tag_type(), b.value.tag_type());
        assert_eq!(a.value.count(), b.value.count());
        assert_eq!(a.value.data(), b.value.data());
    }
}

#[test]
fn test_byte_order_conversion() {
    let blob = tiff_with_exif_ifd();
    let (set, _) = tiff::decode(&blob).unwrap();
    let (out, _) = tiff::encode(None, &set, Endian::Big).unwrap();
    assert_eq!(&out[0..2], b"MM");
    let (round, endian) = tiff::decode(&out).unwrap();
    assert_eq!(endian, Endian::Big);
    assert_eq!(
        round
            .find_key(&Key::exif(Group::Photo, 0x9003))
            .unwrap()
            .value
            .text(),
        "2020:01:02 03:04:05"
    );
}

/// Canon maker-note with a bare IFD body; the camera settings entry
/// expands into per-field records of the synthetic group.
#[test]
fn test_canon_camera_settings_expansion() {
    let mut blob = Vec::new();
    tiff_header(&mut blob);
    // IFD0: Make + Exif pointer, ends at 38.
    w16(&mut blob, 2);
    entry_offset(&mut blob, 0x010f, TagType::Ascii, 6, 38);
    entry_offset(&mut blob, 0x8769, TagType::Long, 1, 44);
    w32(&mut blob, 0);
    blob.extend_from_slice(b"Canon\0"); // 38..44
    // Exif IFD at 44: the maker-note, body at 62, 24 bytes.
    w16(&mut blob, 1);
    entry_offset(&mut blob, 0x927c, TagType::Undefined, 24, 62);
    w32(&mut blob, 0);
    // Maker-note body: bare IFD, one camera-settings entry whose
    // payload sits at 80, offsets inherited from the TIFF start.
    w16(&mut blob, 1);
    entry_offset(&mut blob, 0x0001, TagType::Short, 3, 80);
    w32(&mut blob, 0);
    blob.extend_from_slice(&[0, 0, 2, 0, 4, 0]); // 80..86

    let (set, _) = tiff::decode(&blob).unwrap();
    for (tag, expect) in [(1_u16, 0_i64), (2, 2), (3, 4)] {
        let datum = set.find_key(&Key::exif(Group::CanonCs, tag)).unwrap();
        assert_eq!(datum.value.to_i64(0), Ok(expect), "CanonCs tag {}", tag);
    }
}

/// A Nikon3 maker-note carries its own TIFF header; its byte order
/// and offset base are authoritative inside the subtree.
#[test]
fn test_nikon3_subtree_byte_order_and_base() {
    let mut blob = Vec::new();
    tiff_header(&mut blob);
    w16(&mut blob, 2);
    entry_offset(&mut blob, 0x010f, TagType::Ascii, 6, 38);
    entry_offset(&mut blob, 0x8769, TagType::Long, 1, 44);
    w32(&mut blob, 0);
    blob.extend_from_slice(b"NIKON\0"); // 38..44
    // Exif IFD at 44: maker-note at 62, 54 bytes.
    w16(&mut blob, 1);
    entry_offset(&mut blob, 0x927c, TagType::Undefined, 54, 62);
    w32(&mut blob, 0);
    // Nikon3 header: signature, version, then an embedded big endian
    // TIFF header. The subtree base is the embedded header (72).
    blob.extend_from_slice(b"Nikon\0\x02\x10\0\0"); // 62..72
    blob.extend_from_slice(b"MM");
    blob.extend_from_slice(&[0x00, 0x2a]);
    blob.extend_from_slice(&[0, 0, 0, 8]); // first IFD at base + 8 = 80
    // The directory, big endian: one inline short, one string whose
    // offset (0x26) resolves against the base, not the file start.
    blob.extend_from_slice(&[0x00, 0x02]); // 2 entries
    blob.extend_from_slice(&[0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, 0x01, 0x02, 0, 0]);
    blob.extend_from_slice(&[0x00, 0x04, 0x00, 0x02, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x26]);
    blob.extend_from_slice(&[0, 0, 0, 0]); // next
    blob.extend_from_slice(b"quiet\0"); // 110 = base 72 + offset 0x26

    let (set, _) = tiff::decode(&blob).unwrap();
    let datum = set.find_key(&Key::exif(Group::Nikon3, 0x0002)).unwrap();
    assert_eq!(datum.value.to_i64(0), Ok(0x0102));
    let datum = set.find_key(&Key::exif(Group::Nikon3, 0x0004)).unwrap();
    assert_eq!(datum.value.text(), "quiet");
}

/// CRW preview surfacing: the decoded set carries the absolute file
/// offset and length of the embedded JPEG.
#[test]
fn test_crw_preview_offsets() {
    let jpeg = vec![0xff_u8, 0xd8, 0xff, 0xe0, 1, 2, 3, 4, 0xff, 0xd9];
    let n = jpeg.len() as u32;

    let mut blob = Vec::new();
    // Header: marker, heap start, signature, version, reserved.
    blob.extend_from_slice(b"II");
    w32(&mut blob, 0x1a);
    blob.extend_from_slice(b"HEAPCCDR");
    w32(&mut blob, 0x0001_0002);
    blob.extend_from_slice(&[0; 8]);
    // Root region: the JPEG first, then the directory, then the
    // trailer pointing at the directory.
    blob.extend_from_slice(&jpeg);
    let dir_start = n;
    w16(&mut blob, 1);
    w16(&mut blob, 0x2007);
    w32(&mut blob, n); // size
    w32(&mut blob, 0); // offset within the region
    w32(&mut blob, dir_start);

    let (set, endian) = ciff::decode(&blob).unwrap();
    assert_eq!(endian, Endian::Little);
    let offset = set
        .find_key(&Key::exif(Group::Image2, 0x0201))
        .unwrap()
        .value
        .to_i64(0)
        .unwrap();
    let length = set
        .find_key(&Key::exif(Group::Image2, 0x0202))
        .unwrap()
        .value
        .to_i64(0)
        .unwrap();
    assert_eq!(offset, 0x1a);
    assert_eq!(length, n as i64);
    assert_eq!(&blob[offset as usize..offset as usize + length as usize], jpeg.as_slice());
}

/// An oversized preview IFD gets dropped by the filter cascade; the
/// small tags survive and the output fits the APP1 segment.
#[test]
fn test_preview_cascade_drops_oversize_ifd() {
    let mut set = MetadataSet::new();
    set.insert(
        Key::exif(Group::Image, 0x010f),
        Value::from_string(TagType::Ascii, "NIKON").unwrap(),
    );
    set.insert(Key::exif(Group::Image, 0x0112), Value::from_u16(1));

    let preview = vec![0xab_u8; 70 * 1024];
    set.insert(
        Key::exif(Group::NikonPreview, 0x0202),
        Value::from_u32(preview.len() as u32),
    );
    let mut format = Value::from_u32(0);
    format.set_data_area(preview);
    set.insert(Key::exif(Group::NikonPreview, 0x0201), format);

    let (out, method) = tiff::encode(None, &set, Endian::Little).unwrap();
    assert_eq!(method, WriteMethod::Intrusive);
    assert!(out.len() <= 65527, "output is {} bytes", out.len());

    let (round, _) = tiff::decode(&out).unwrap();
    assert!(round
        .find_if(|d| d.key.group == Group::NikonPreview)
        .is_none());
    assert_eq!(
        round
            .find_key(&Key::exif(Group::Image, 0x010f))
            .unwrap()
            .value
            .text(),
        "NIKON"
    );
    assert_eq!(
        round
            .find_key(&Key::exif(Group::Image, 0x0112))
            .unwrap()
            .value
            .to_i64(0),
        Ok(1)
    );
}

/// The TIFF thumbnail facade writes a well formed IFD1.
#[test]
fn test_thumbnail_written_to_ifd1() {
    let jpeg = vec![0xff_u8, 0xd8, 0xff, 0xd9];
    let mut set = MetadataSet::new();
    set.insert(Key::exif(Group::Image, 0x0100), Value::from_u32(640));
    set.set_jpeg_thumbnail(jpeg.clone());

    let (out, _) = tiff::encode(None, &set, Endian::Little).unwrap();
    let (round, _) = tiff::decode(&out).unwrap();
    assert_eq!(round.thumbnail(), Some(jpeg.as_slice()));
    assert_eq!(
        round
            .find_key(&Key::exif(Group::Thumbnail, 0x0202))
            .unwrap()
            .value
            .to_i64(0),
        Ok(jpeg.len() as i64)
    );
}

/// Erasing a record drops the entry on re-encode.
#[test]
fn test_erase_record_drops_entry() {
    let blob = tiff_with_exif_ifd();
    let (mut set, _) = tiff::decode(&blob).unwrap();
    set.erase_group(Group::Photo);

    let (out, method) = tiff::encode(Some(&blob), &set, Endian::Little).unwrap();
    assert_eq!(method, WriteMethod::Intrusive);
    let (round, _) = tiff::decode(&out).unwrap();
    assert!(round.find_key(&Key::exif(Group::Photo, 0x9003)).is_none());
}
