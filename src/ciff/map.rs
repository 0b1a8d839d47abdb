// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * exifkit - ciff/map.rs
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

//! Conversion between CIFF records and Exif metadata.
//!
//! One static table drives both directions: each row names the CIFF
//! `(tag, directory)`, the Exif `(tag, group)` and the two converter
//! functions. A handful of records need custom converters, the rest
//! go through the basic one.

use log::{debug, warn};

use crate::bytes;
use crate::ciff::container::{write_header, write_region, Component, Container};
use crate::ciff::{self, record_tag_type};
use crate::container::Endian;
use crate::metadata::{Group, Key, MetadataSet};
use crate::tiff::tags;
use crate::utils;
use crate::value::{TagType, Value};
use crate::Result;

type DecodeFn = fn(&CrwMapping, &Component, Endian, &mut MetadataSet);
type EncodeFn = fn(&CrwMapping, &MetadataSet, Endian) -> Option<Component>;

/// One row of the conversion table.
struct CrwMapping {
    /// CIFF tag (with format bits, without storage bits).
    crw_tag: u16,
    /// CIFF directory the record lives in.
    crw_dir: u16,
    /// Data size cap; 0 takes the record's own size. Inline records
    /// always occupy the 8 slot bytes, this trims them back.
    size: u32,
    /// Exif tag to map to.
    tag: u16,
    /// Exif group to map to.
    group: Group,
    to_exif: DecodeFn,
    from_exif: EncodeFn,
}

static CRW_MAPPINGS: [CrwMapping; 14] = [
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_USER_COMMENT,
        crw_dir: ciff::CIFF_DIR_IMAGE_PROPS,
        size: 0,
        tag: tags::EXIF_TAG_USER_COMMENT,
        group: Group::Photo,
        to_exif: decode_comment,
        from_exif: encode_comment,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_USER_COMMENT,
        crw_dir: ciff::CIFF_DIR_IMAGE_DESCRIPTION,
        size: 0,
        tag: tags::EXIF_TAG_IMAGE_DESCRIPTION,
        group: Group::Image,
        to_exif: decode_basic,
        from_exif: encode_basic,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_RAW_MAKE_MODEL,
        crw_dir: ciff::CIFF_DIR_CAMERA_OBJECT,
        size: 0,
        tag: tags::EXIF_TAG_MAKE,
        group: Group::Image,
        to_exif: decode_make_model,
        from_exif: encode_make_model,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_FIRMWARE_VERSION,
        crw_dir: ciff::CIFF_DIR_CAMERA_OBJECT,
        size: 0,
        tag: tags::CANON_TAG_FIRMWARE_VERSION,
        group: Group::Canon,
        to_exif: decode_basic,
        from_exif: encode_basic,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_OWNER_NAME,
        crw_dir: ciff::CIFF_DIR_CAMERA_OBJECT,
        size: 0,
        tag: tags::CANON_TAG_OWNER_NAME,
        group: Group::Canon,
        to_exif: decode_basic,
        from_exif: encode_basic,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_IMAGE_TYPE,
        crw_dir: ciff::CIFF_DIR_IMAGE_DESCRIPTION,
        size: 0,
        tag: tags::CANON_TAG_IMAGE_TYPE,
        group: Group::Canon,
        to_exif: decode_basic,
        from_exif: encode_basic,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_SHOT_INFO,
        crw_dir: ciff::CIFF_DIR_EXIF_INFORMATION,
        size: 0,
        tag: tags::CANON_TAG_SHOT_INFO,
        group: Group::CanonSi,
        to_exif: decode_array,
        from_exif: encode_array,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_CAMERA_SETTINGS,
        crw_dir: ciff::CIFF_DIR_EXIF_INFORMATION,
        size: 0,
        tag: tags::CANON_TAG_CAMERA_SETTINGS,
        group: Group::CanonCs,
        to_exif: decode_array,
        from_exif: encode_array,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_SERIAL_NUMBER,
        crw_dir: ciff::CIFF_DIR_SHOOTING_RECORD,
        size: 4,
        tag: tags::CANON_TAG_SERIAL_NUMBER,
        group: Group::Canon,
        to_exif: decode_basic,
        from_exif: encode_basic,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_CAPTURED_TIME,
        crw_dir: ciff::CIFF_DIR_SHOOTING_RECORD,
        size: 0,
        tag: tags::EXIF_TAG_DATE_TIME_ORIGINAL,
        group: Group::Photo,
        to_exif: decode_date,
        from_exif: encode_date,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_IMAGE_INFO,
        crw_dir: ciff::CIFF_DIR_IMAGE_PROPS,
        size: 0,
        tag: tags::EXIF_TAG_PIXEL_X_DIMENSION,
        group: Group::Photo,
        to_exif: decode_image_spec,
        from_exif: encode_image_spec,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_FILE_NUMBER,
        crw_dir: ciff::CIFF_DIR_SHOOTING_RECORD,
        size: 0,
        tag: tags::CANON_TAG_FILE_NUMBER,
        group: Group::Canon,
        to_exif: decode_basic,
        from_exif: encode_basic,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_JPEG_IMAGE,
        crw_dir: ciff::CIFF_DIR_ROOT,
        size: 0,
        tag: tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT,
        group: Group::Image2,
        to_exif: decode_preview,
        from_exif: encode_none,
    },
    CrwMapping {
        crw_tag: ciff::CIFF_TAG_JPEG_THUMBNAIL,
        crw_dir: ciff::CIFF_DIR_ROOT,
        size: 0,
        tag: tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT,
        group: Group::Thumbnail,
        to_exif: decode_thumbnail,
        from_exif: encode_thumbnail,
    },
];

/// The parent chain of a CIFF directory, outermost first.
fn dir_path(dir: u16) -> &'static [u16] {
    match dir {
        ciff::CIFF_DIR_ROOT => &[],
        ciff::CIFF_DIR_IMAGE_PROPS => &[ciff::CIFF_DIR_IMAGE_PROPS],
        ciff::CIFF_DIR_IMAGE_DESCRIPTION => &[
            ciff::CIFF_DIR_IMAGE_PROPS,
            ciff::CIFF_DIR_IMAGE_DESCRIPTION,
        ],
        ciff::CIFF_DIR_CAMERA_OBJECT => {
            &[ciff::CIFF_DIR_IMAGE_PROPS, ciff::CIFF_DIR_CAMERA_OBJECT]
        }
        ciff::CIFF_DIR_EXIF_INFORMATION => {
            &[ciff::CIFF_DIR_IMAGE_PROPS, ciff::CIFF_DIR_EXIF_INFORMATION]
        }
        ciff::CIFF_DIR_SHOOTING_RECORD => &[ciff::CIFF_DIR_SHOOTING_RECORD],
        _ => &[],
    }
}

fn mapping_for(tag: u16, dir: u16) -> Option<&'static CrwMapping> {
    CRW_MAPPINGS
        .iter()
        .find(|m| m.crw_tag == tag && m.crw_dir == dir)
}

// -------------------------------------------------------------------
// CIFF -> Exif

pub(crate) fn decode(container: &Container) -> MetadataSet {
    let mut set = MetadataSet::new();
    walk(
        &container.root,
        ciff::CIFF_DIR_ROOT,
        container.endian,
        &mut set,
    );
    set
}

fn walk(components: &[Component], dir: u16, endian: Endian, set: &mut MetadataSet) {
    for comp in components {
        match comp {
            Component::Value { tag, .. } => {
                if let Some(mapping) = mapping_for(tag & ciff::TAGCODE_MASK, dir) {
                    (mapping.to_exif)(mapping, comp, endian, set);
                }
            }
            Component::Directory {
                tag,
                components: children,
            } => {
                walk(children, tag & ciff::TAGCODE_MASK, endian, set);
            }
        }
    }
}

fn component_data<'c>(mapping: &CrwMapping, comp: &'c Component) -> &'c [u8] {
    match comp {
        Component::Value { data, .. } => {
            if mapping.size > 0 && data.len() > mapping.size as usize {
                &data[..mapping.size as usize]
            } else {
                data
            }
        }
        Component::Directory { .. } => &[],
    }
}

fn decode_basic(mapping: &CrwMapping, comp: &Component, endian: Endian, set: &mut MetadataSet) {
    let data = component_data(mapping, comp);
    let value = Value::from_bytes(record_tag_type(comp.tag()), data, endian);
    set.insert(Key::exif(mapping.group, mapping.tag), value);
}

/// User comment, tagged with the ASCII charset marker.
fn decode_comment(mapping: &CrwMapping, comp: &Component, _endian: Endian, set: &mut MetadataSet) {
    let text = utils::string_from_field(component_data(mapping, comp));
    set.insert(
        Key::exif(mapping.group, mapping.tag),
        Value::new_comment(&format!("charset=Ascii {}", text)),
    );
}

/// One CIFF record, two NUL separated C strings: make then model.
fn decode_make_model(
    mapping: &CrwMapping,
    comp: &Component,
    _endian: Endian,
    set: &mut MetadataSet,
) {
    let data = component_data(mapping, comp);
    let mut parts = data.split(|b| *b == 0);
    let make = parts.next().unwrap_or(&[]);
    let model = parts.next().unwrap_or(&[]);
    for (tag, bytes) in [
        (tags::EXIF_TAG_MAKE, make),
        (tags::EXIF_TAG_MODEL, model),
    ] {
        if let Ok(value) =
            Value::from_string(TagType::Ascii, &String::from_utf8_lossy(bytes))
        {
            set.insert(Key::exif(Group::Image, tag), value);
        }
    }
}

/// Each 16 bit field of the record is a distinct tag of the
/// synthetic group, numbered from 1.
fn decode_array(mapping: &CrwMapping, comp: &Component, endian: Endian, set: &mut MetadataSet) {
    let data = component_data(mapping, comp);
    for i in 0..data.len() / 2 {
        let value = Value::from_bytes(TagType::Short, &data[i * 2..i * 2 + 2], endian);
        set.insert(Key::exif(mapping.group, (i + 1) as u16), value);
    }
}

/// 4 byte Unix time, formatted the Exif way.
fn decode_date(mapping: &CrwMapping, comp: &Component, endian: Endian, set: &mut MetadataSet) {
    let data = component_data(mapping, comp);
    if data.len() < 4 {
        return;
    }
    let t = bytes::get_u32(data, endian);
    if let Some(when) = chrono::DateTime::from_timestamp(t as i64, 0) {
        let text = when.naive_utc().format("%Y:%m:%d %H:%M:%S").to_string();
        if let Ok(value) = Value::from_string(TagType::Ascii, &text) {
            set.insert(Key::exif(mapping.group, mapping.tag), value);
        }
    }
}

/// Width/height pair out of the image info record.
fn decode_image_spec(
    mapping: &CrwMapping,
    comp: &Component,
    endian: Endian,
    set: &mut MetadataSet,
) {
    let data = component_data(mapping, comp);
    if data.len() < 8 {
        return;
    }
    let width = bytes::get_u32(data, endian);
    let height = bytes::get_u32(&data[4..], endian);
    set.insert(
        Key::exif(Group::Photo, tags::EXIF_TAG_PIXEL_X_DIMENSION),
        Value::from_u32(width),
    );
    set.insert(
        Key::exif(Group::Photo, tags::EXIF_TAG_PIXEL_Y_DIMENSION),
        Value::from_u32(height),
    );
}

/// The embedded JPEG image, surfaced as the absolute file offset and
/// length under the synthetic `Image2` group.
fn decode_preview(mapping: &CrwMapping, comp: &Component, _endian: Endian, set: &mut MetadataSet) {
    if let Component::Value {
        data, abs_offset, ..
    } = comp
    {
        if *abs_offset == 0 {
            return;
        }
        set.insert(
            Key::exif(mapping.group, tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT),
            Value::from_u32(*abs_offset),
        );
        set.insert(
            Key::exif(
                mapping.group,
                tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT_LENGTH,
            ),
            Value::from_u32(data.len() as u32),
        );
    }
}

/// The thumbnail, as the standard `Exif.Thumbnail` records with the
/// JPEG bytes in the data area.
fn decode_thumbnail(
    mapping: &CrwMapping,
    comp: &Component,
    _endian: Endian,
    set: &mut MetadataSet,
) {
    if let Component::Value {
        data, abs_offset, ..
    } = comp
    {
        set.insert(
            Key::exif(mapping.group, tags::EXIF_TAG_COMPRESSION),
            Value::from_u16(6),
        );
        set.insert(
            Key::exif(
                mapping.group,
                tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT_LENGTH,
            ),
            Value::from_u32(data.len() as u32),
        );
        let mut format = Value::from_u32(*abs_offset);
        format.set_data_area(data.clone());
        set.insert(
            Key::exif(mapping.group, tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT),
            format,
        );
    }
}

// -------------------------------------------------------------------
// Exif -> CIFF

pub(crate) fn encode(set: &MetadataSet, byte_order: Endian) -> Result<Vec<u8>> {
    let mut root: Vec<Component> = Vec::new();
    for mapping in &CRW_MAPPINGS {
        if let Some(comp) = (mapping.from_exif)(mapping, set, byte_order) {
            place(&mut root, dir_path(mapping.crw_dir), comp);
        }
    }

    let unmapped = set
        .iter()
        .filter(|d| !CRW_MAPPINGS.iter().any(|m| covers(m, &d.key)))
        .count();
    if unmapped > 0 {
        debug!("{} records have no CIFF representation", unmapped);
    }

    let mut out = Vec::new();
    write_header(&mut out, byte_order);
    let region = write_region(&root, byte_order);
    out.extend_from_slice(&region);
    Ok(out)
}

/// Does the mapping consume records of this key. The fan-out
/// converters cover more than their nominal `(group, tag)`.
fn covers(mapping: &CrwMapping, key: &Key) -> bool {
    match mapping.crw_tag {
        ciff::CIFF_TAG_RAW_MAKE_MODEL => {
            key.group == Group::Image
                && (key.tag == tags::EXIF_TAG_MAKE || key.tag == tags::EXIF_TAG_MODEL)
        }
        ciff::CIFF_TAG_IMAGE_INFO => {
            key.group == Group::Photo
                && (key.tag == tags::EXIF_TAG_PIXEL_X_DIMENSION
                    || key.tag == tags::EXIF_TAG_PIXEL_Y_DIMENSION)
        }
        ciff::CIFF_TAG_SHOT_INFO => key.group == Group::CanonSi,
        ciff::CIFF_TAG_CAMERA_SETTINGS => key.group == Group::CanonCs,
        ciff::CIFF_TAG_JPEG_THUMBNAIL => {
            key.group == Group::Thumbnail
                && matches!(
                    key.tag,
                    tags::EXIF_TAG_COMPRESSION
                        | tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT
                        | tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT_LENGTH
                )
        }
        ciff::CIFF_TAG_JPEG_IMAGE => key.group == Group::Image2,
        _ => key.group == mapping.group && key.tag == mapping.tag,
    }
}

fn place(root: &mut Vec<Component>, path: &[u16], comp: Component) {
    if path.is_empty() {
        root.push(comp);
        return;
    }
    let tag = path[0];
    let pos = match root
        .iter()
        .position(|c| matches!(c, Component::Directory { .. }) && c.tag() == tag)
    {
        Some(p) => p,
        None => {
            root.push(Component::Directory {
                tag,
                components: Vec::new(),
            });
            root.len() - 1
        }
    };
    if let Component::Directory { components, .. } = &mut root[pos] {
        place(components, &path[1..], comp);
    }
}

fn value_component(tag: u16, data: Vec<u8>) -> Component {
    Component::Value {
        tag,
        data,
        abs_offset: 0,
    }
}

fn encode_basic(mapping: &CrwMapping, set: &MetadataSet, byte_order: Endian) -> Option<Component> {
    let datum = set.find_key(&Key::exif(mapping.group, mapping.tag))?;
    let mut data = Vec::new();
    datum.value.write_to_bytes(&mut data, byte_order);
    if mapping.size > 0 {
        data.resize(mapping.size as usize, 0);
    }
    Some(value_component(mapping.crw_tag, data))
}

fn encode_comment(
    mapping: &CrwMapping,
    set: &MetadataSet,
    _byte_order: Endian,
) -> Option<Component> {
    let datum = set.find_key(&Key::exif(mapping.group, mapping.tag))?;
    let mut data = datum.value.text().into_bytes();
    data.push(0);
    Some(value_component(mapping.crw_tag, data))
}

fn encode_make_model(
    mapping: &CrwMapping,
    set: &MetadataSet,
    _byte_order: Endian,
) -> Option<Component> {
    let make = set.find_key(&Key::exif(Group::Image, tags::EXIF_TAG_MAKE))?;
    let model = set.find_key(&Key::exif(Group::Image, tags::EXIF_TAG_MODEL))?;
    let mut data = make.value.text().into_bytes();
    data.push(0);
    data.extend_from_slice(model.value.text().as_bytes());
    data.push(0);
    Some(value_component(mapping.crw_tag, data))
}

fn encode_array(mapping: &CrwMapping, set: &MetadataSet, byte_order: Endian) -> Option<Component> {
    let mut fields: Vec<(u16, i64)> = set
        .iter()
        .filter(|d| d.key.group == mapping.group && d.key.tag > 0)
        .map(|d| (d.key.tag, d.value.to_i64(0).unwrap_or(0)))
        .collect();
    if fields.is_empty() {
        return None;
    }
    fields.sort_by_key(|(tag, _)| *tag);
    let count = fields.last().map(|(tag, _)| *tag).unwrap_or(0) as usize;
    let mut values = vec![0_u16; count];
    for (tag, v) in fields {
        values[tag as usize - 1] = v as u16;
    }
    let mut data = Vec::with_capacity(count * 2);
    for v in values {
        bytes::put_u16(&mut data, v, byte_order);
    }
    Some(value_component(mapping.crw_tag, data))
}

fn encode_date(mapping: &CrwMapping, set: &MetadataSet, byte_order: Endian) -> Option<Component> {
    let datum = set.find_key(&Key::exif(mapping.group, mapping.tag))?;
    let when = chrono::NaiveDateTime::parse_from_str(&datum.value.text(), "%Y:%m:%d %H:%M:%S")
        .map_err(|err| {
            warn!("unparseable date '{}': {}", datum.value.text(), err);
            err
        })
        .ok()?;
    let mut data = Vec::with_capacity(12);
    bytes::put_u32(&mut data, when.and_utc().timestamp() as u32, byte_order);
    // Time zone and DST words, unset.
    bytes::put_u32(&mut data, 0, byte_order);
    bytes::put_u32(&mut data, 0, byte_order);
    Some(value_component(mapping.crw_tag, data))
}

fn encode_image_spec(
    mapping: &CrwMapping,
    set: &MetadataSet,
    byte_order: Endian,
) -> Option<Component> {
    let width = set.find_key(&Key::exif(Group::Photo, tags::EXIF_TAG_PIXEL_X_DIMENSION))?;
    let height = set.find_key(&Key::exif(Group::Photo, tags::EXIF_TAG_PIXEL_Y_DIMENSION))?;
    // Width, height, then aspect ratio, rotation, bit depths and the
    // colour/bw word, all left unset.
    let mut data = Vec::with_capacity(28);
    bytes::put_u32(&mut data, width.value.to_i64(0).ok()? as u32, byte_order);
    bytes::put_u32(&mut data, height.value.to_i64(0).ok()? as u32, byte_order);
    data.resize(28, 0);
    Some(value_component(mapping.crw_tag, data))
}

fn encode_thumbnail(
    mapping: &CrwMapping,
    set: &MetadataSet,
    _byte_order: Endian,
) -> Option<Component> {
    let datum = set.find_key(&Key::exif(
        Group::Thumbnail,
        tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT,
    ))?;
    let data = datum.value.data_area()?.to_vec();
    Some(value_component(mapping.crw_tag, data))
}

/// The raw preview references the original file image; it cannot be
/// regenerated from the record set.
fn encode_none(_mapping: &CrwMapping, _set: &MetadataSet, _byte_order: Endian) -> Option<Component> {
    None
}

#[cfg(test)]
mod test {
    use crate::ciff;
    use crate::container::Endian;
    use crate::metadata::{Group, Key, MetadataSet};
    use crate::tiff::tags;
    use crate::value::{TagType, Value};

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut set = MetadataSet::new();
        set.insert(
            Key::exif(Group::Image, tags::EXIF_TAG_MAKE),
            Value::from_string(TagType::Ascii, "Canon").unwrap(),
        );
        set.insert(
            Key::exif(Group::Image, tags::EXIF_TAG_MODEL),
            Value::from_string(TagType::Ascii, "Canon PowerShot G2").unwrap(),
        );
        set.insert(
            Key::exif(Group::Photo, tags::EXIF_TAG_DATE_TIME_ORIGINAL),
            Value::from_string(TagType::Ascii, "2003:06:21 14:30:15").unwrap(),
        );
        set.insert(Key::exif(Group::CanonCs, 1), Value::from_u16(0));
        set.insert(Key::exif(Group::CanonCs, 2), Value::from_u16(2));
        set.insert(Key::exif(Group::CanonCs, 3), Value::from_u16(4));
        set.insert(
            Key::exif(Group::Photo, tags::EXIF_TAG_PIXEL_X_DIMENSION),
            Value::from_u32(2272),
        );
        set.insert(
            Key::exif(Group::Photo, tags::EXIF_TAG_PIXEL_Y_DIMENSION),
            Value::from_u32(1704),
        );

        let blob = ciff::encode(&set, Endian::Little).unwrap();
        let (round, endian) = ciff::decode(&blob).unwrap();
        assert_eq!(endian, Endian::Little);

        assert_eq!(
            round
                .find_key(&Key::exif(Group::Image, tags::EXIF_TAG_MAKE))
                .unwrap()
                .value
                .text(),
            "Canon"
        );
        assert_eq!(
            round
                .find_key(&Key::exif(Group::Image, tags::EXIF_TAG_MODEL))
                .unwrap()
                .value
                .text(),
            "Canon PowerShot G2"
        );
        assert_eq!(
            round
                .find_key(&Key::exif(Group::Photo, tags::EXIF_TAG_DATE_TIME_ORIGINAL))
                .unwrap()
                .value
                .text(),
            "2003:06:21 14:30:15"
        );
        assert_eq!(
            round.find_key(&Key::exif(Group::CanonCs, 2)).unwrap().value.to_i64(0),
            Ok(2)
        );
        assert_eq!(
            round
                .find_key(&Key::exif(Group::Photo, tags::EXIF_TAG_PIXEL_X_DIMENSION))
                .unwrap()
                .value
                .to_i64(0),
            Ok(2272)
        );
    }

    #[test]
    fn test_thumbnail_roundtrip() {
        let jpeg = vec![0xff, 0xd8, 0xff, 0xe0, 0, 0, 0, 0, 0xff, 0xd9];
        let mut set = MetadataSet::new();
        set.set_jpeg_thumbnail(jpeg.clone());

        let blob = ciff::encode(&set, Endian::Little).unwrap();
        let (round, _) = ciff::decode(&blob).unwrap();
        assert_eq!(round.thumbnail(), Some(jpeg.as_slice()));
    }
}
