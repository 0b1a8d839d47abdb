// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * exifkit - metadata.rs
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

//! The flat keyed metadata records decoded out of a container tree.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::tiff::tags;
use crate::value::{TagType, Value};
use crate::{Error, Result};

/// Metadata family. The first segment of a printable key.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Family {
    Exif,
    Iptc,
    Xmp,
    Comment,
}

impl Family {
    pub fn name(self) -> &'static str {
        match self {
            Self::Exif => "Exif",
            Self::Iptc => "Iptc",
            Self::Xmp => "Xmp",
            Self::Comment => "Comment",
        }
    }
}

impl FromStr for Family {
    type Err = Error;

    fn from_str(s: &str) -> Result<Family> {
        match s {
            "Exif" => Ok(Self::Exif),
            "Iptc" => Ok(Self::Iptc),
            "Xmp" => Ok(Self::Xmp),
            "Comment" => Ok(Self::Comment),
            _ => Err(Error::ValueParse(s.to_string())),
        }
    }
}

/// The IFD or maker-note sub-IFD a record belongs to.
///
/// A group names a logical namespace, not a position: `Olympus`
/// always refers to the same vendor tag space no matter which file it
/// was found in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Group {
    Image,
    Thumbnail,
    Photo,
    GpsInfo,
    Iop,
    Canon,
    CanonCs,
    CanonSi,
    CanonCf,
    Nikon1,
    Nikon2,
    Nikon3,
    NikonPreview,
    Olympus,
    Fuji,
    Panasonic,
    Sigma,
    Sony1,
    Sony2,
    Minolta,
    Pentax,
    SubImage1,
    SubImage2,
    SubImage3,
    SubImage4,
    SubImage5,
    SubImage6,
    SubImage7,
    SubImage8,
    SubImage9,
    SubThumb1,
    PanaRaw,
    Ifd2,
    Ifd3,
    /// Synthetic group surfacing the CRW preview location.
    Image2,
    /// Opaque maker-note body.
    MakerNote,
}

impl Group {
    pub fn name(self) -> &'static str {
        use Group::*;
        match self {
            Image => "Image",
            Thumbnail => "Thumbnail",
            Photo => "Photo",
            GpsInfo => "GPSInfo",
            Iop => "Iop",
            Canon => "Canon",
            CanonCs => "CanonCs",
            CanonSi => "CanonSi",
            CanonCf => "CanonCf",
            Nikon1 => "Nikon1",
            Nikon2 => "Nikon2",
            Nikon3 => "Nikon3",
            NikonPreview => "NikonPreview",
            Olympus => "Olympus",
            Fuji => "Fujifilm",
            Panasonic => "Panasonic",
            Sigma => "Sigma",
            Sony1 => "Sony1",
            Sony2 => "Sony2",
            Minolta => "Minolta",
            Pentax => "Pentax",
            SubImage1 => "SubImage1",
            SubImage2 => "SubImage2",
            SubImage3 => "SubImage3",
            SubImage4 => "SubImage4",
            SubImage5 => "SubImage5",
            SubImage6 => "SubImage6",
            SubImage7 => "SubImage7",
            SubImage8 => "SubImage8",
            SubImage9 => "SubImage9",
            SubThumb1 => "SubThumb1",
            PanaRaw => "PanaRaw",
            Ifd2 => "IFD2",
            Ifd3 => "IFD3",
            Image2 => "Image2",
            MakerNote => "MakerNote",
        }
    }

    pub fn from_name(name: &str) -> Option<Group> {
        use Group::*;
        // The sub image groups are numbered, everything else is a
        // straight match.
        Some(match name {
            "Image" => Image,
            "Thumbnail" => Thumbnail,
            "Photo" => Photo,
            "GPSInfo" => GpsInfo,
            "Iop" => Iop,
            "Canon" => Canon,
            "CanonCs" => CanonCs,
            "CanonSi" => CanonSi,
            "CanonCf" => CanonCf,
            "Nikon1" => Nikon1,
            "Nikon2" => Nikon2,
            "Nikon3" => Nikon3,
            "NikonPreview" => NikonPreview,
            "Olympus" => Olympus,
            "Fujifilm" => Fuji,
            "Panasonic" => Panasonic,
            "Sigma" => Sigma,
            "Sony1" => Sony1,
            "Sony2" => Sony2,
            "Minolta" => Minolta,
            "Pentax" => Pentax,
            "SubImage1" => SubImage1,
            "SubImage2" => SubImage2,
            "SubImage3" => SubImage3,
            "SubImage4" => SubImage4,
            "SubImage5" => SubImage5,
            "SubImage6" => SubImage6,
            "SubImage7" => SubImage7,
            "SubImage8" => SubImage8,
            "SubImage9" => SubImage9,
            "SubThumb1" => SubThumb1,
            "PanaRaw" => PanaRaw,
            "IFD2" => Ifd2,
            "IFD3" => Ifd3,
            "Image2" => Image2,
            "MakerNote" => MakerNote,
            _ => return None,
        })
    }
}

/// Tag names for one group. The dictionary contents are the host's
/// business; the crate only ships the names its own tables refer to.
pub type TagNames = HashMap<u16, &'static str>;

static EMPTY_TAG_NAMES: Lazy<TagNames> = Lazy::new(HashMap::new);

/// Group to dictionary registry. Hosts may install richer
/// dictionaries at startup with [`register_tag_names`].
static TAG_NAME_REGISTRY: Lazy<RwLock<HashMap<Group, &'static TagNames>>> =
    Lazy::new(|| RwLock::new(tags::builtin_tag_names()));

/// Install (or replace) the tag dictionary for a group.
pub fn register_tag_names(group: Group, names: &'static TagNames) {
    TAG_NAME_REGISTRY
        .write()
        .expect("tag name registry poisoned")
        .insert(group, names);
}

fn group_names(group: Group) -> &'static TagNames {
    TAG_NAME_REGISTRY
        .read()
        .expect("tag name registry poisoned")
        .get(&group)
        .copied()
        .unwrap_or(&EMPTY_TAG_NAMES)
}

/// Printable name of `tag` within `group`, if the dictionary has one.
pub fn tag_name(group: Group, tag: u16) -> Option<&'static str> {
    group_names(group).get(&tag).copied()
}

/// Reverse lookup of a tag by its printable name.
pub fn tag_by_name(group: Group, name: &str) -> Option<u16> {
    group_names(group)
        .iter()
        .find(|(_, n)| **n == name)
        .map(|(t, _)| *t)
}

/// Key of a metadata record: `(family, group, tag)`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Key {
    pub family: Family,
    pub group: Group,
    pub tag: u16,
}

impl Key {
    pub fn new(family: Family, group: Group, tag: u16) -> Key {
        Key { family, group, tag }
    }

    /// Shorthand for an `Exif` family key.
    pub fn exif(group: Group, tag: u16) -> Key {
        Key::new(Family::Exif, group, tag)
    }

    /// Printable form of the tag segment: the dictionary name, or
    /// `0x%04x` when the dictionary has none.
    pub fn tag_label(&self) -> String {
        tag_name(self.group, self.tag)
            .map(|n| n.to_string())
            .unwrap_or_else(|| format!("0x{:04x}", self.tag))
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.family.name(),
            self.group.name(),
            self.tag_label()
        )
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Key> {
        let mut parts = s.splitn(3, '.');
        let family = parts
            .next()
            .ok_or_else(|| Error::ValueParse(s.to_string()))?
            .parse::<Family>()?;
        let group = parts
            .next()
            .and_then(Group::from_name)
            .ok_or_else(|| Error::ValueParse(s.to_string()))?;
        let tag_part = parts
            .next()
            .ok_or_else(|| Error::ValueParse(s.to_string()))?;
        let tag = if let Some(hex) = tag_part.strip_prefix("0x") {
            u16::from_str_radix(hex, 16).map_err(|_| Error::ValueParse(s.to_string()))?
        } else {
            tag_by_name(group, tag_part).ok_or_else(|| Error::ValueParse(s.to_string()))?
        };
        Ok(Key { family, group, tag })
    }
}

/// One metadata record.
#[derive(Clone, Debug)]
pub struct Metadatum {
    pub key: Key,
    pub value: Value,
    /// Position within the source directory. Stable disambiguator
    /// for duplicate tags.
    pub idx: usize,
}

impl std::fmt::Display for Metadatum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

/// Ordered, duplicate-allowing sequence of metadata records.
///
/// Iteration order is insertion order, which for a decoded set is
/// document order. Sharing a set across threads is the caller's
/// business.
#[derive(Clone, Debug, Default)]
pub struct MetadataSet {
    records: Vec<Metadatum>,
}

impl MetadataSet {
    pub fn new() -> MetadataSet {
        MetadataSet::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Metadatum> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Metadatum> {
        self.records.iter_mut()
    }

    /// Append a record. Duplicates are allowed.
    pub fn insert(&mut self, key: Key, value: Value) {
        self.records.push(Metadatum { key, value, idx: 0 });
    }

    pub(crate) fn push(&mut self, datum: Metadatum) {
        self.records.push(datum);
    }

    /// Replace the first record matching `key`, or append one.
    pub fn assign(&mut self, key: Key, value: Value) {
        match self.records.iter_mut().find(|d| d.key == key) {
            Some(d) => d.value = value,
            None => self.insert(key, value),
        }
    }

    /// First record with `key`.
    pub fn find_key(&self, key: &Key) -> Option<&Metadatum> {
        self.records.iter().find(|d| d.key == *key)
    }

    pub fn find_key_mut(&mut self, key: &Key) -> Option<&mut Metadatum> {
        self.records.iter_mut().find(|d| d.key == *key)
    }

    /// First record matching the predicate.
    pub fn find_if<P>(&self, pred: P) -> Option<&Metadatum>
    where
        P: Fn(&Metadatum) -> bool,
    {
        self.records.iter().find(|d| pred(d))
    }

    /// Remove every record matching the predicate. Returns how many
    /// were removed.
    pub fn erase_if<P>(&mut self, pred: P) -> usize
    where
        P: Fn(&Metadatum) -> bool,
    {
        let before = self.records.len();
        self.records.retain(|d| !pred(d));
        before - self.records.len()
    }

    /// Remove the first record with `key`.
    pub fn erase_key(&mut self, key: &Key) -> bool {
        if let Some(pos) = self.records.iter().position(|d| d.key == *key) {
            self.records.remove(pos);
            true
        } else {
            false
        }
    }

    /// Remove every record of `group`. Returns how many were removed.
    pub fn erase_group(&mut self, group: Group) -> usize {
        self.erase_if(|d| d.key.group == group)
    }

    /// Stable sort by full key.
    pub fn sort_by_key(&mut self) {
        self.records.sort_by(|a, b| a.key.cmp(&b.key));
    }

    /// Stable sort by tag id alone.
    pub fn sort_by_tag(&mut self) {
        self.records.sort_by(|a, b| a.key.tag.cmp(&b.key.tag));
    }

    /// The JPEG thumbnail bytes, when the set carries one.
    pub fn thumbnail(&self) -> Option<&[u8]> {
        self.find_key(&Key::exif(
            Group::Thumbnail,
            tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT,
        ))
        .and_then(|d| d.value.data_area())
    }

    /// Install `bytes` as the JPEG thumbnail, replacing any present.
    pub fn set_jpeg_thumbnail(&mut self, bytes: Vec<u8>) {
        self.assign(
            Key::exif(Group::Thumbnail, tags::EXIF_TAG_COMPRESSION),
            Value::from_u16(6),
        );
        self.assign(
            Key::exif(
                Group::Thumbnail,
                tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT_LENGTH,
            ),
            Value::from_u32(bytes.len() as u32),
        );
        let mut format = Value::from_u32(0);
        format.set_data_area(bytes);
        self.assign(
            Key::exif(Group::Thumbnail, tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT),
            format,
        );
    }

    /// Drop the whole thumbnail group.
    pub fn erase_thumbnail(&mut self) -> usize {
        self.erase_group(Group::Thumbnail)
    }
}

impl<'a> IntoIterator for &'a MetadataSet {
    type Item = &'a Metadatum;
    type IntoIter = std::slice::Iter<'a, Metadatum>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Is the value a comment record rather than a plain Exif one.
pub fn is_comment(key: &Key, value: &Value) -> bool {
    key.family == Family::Comment || value.tag_type() == TagType::Comment
}

#[cfg(test)]
mod test {
    use super::{Family, Group, Key, MetadataSet};
    use crate::value::Value;

    #[test]
    fn test_key_display_and_parse() {
        let key = Key::exif(Group::Image, 0x0100);
        assert_eq!(key.to_string(), "Exif.Image.ImageWidth");

        let parsed: Key = "Exif.Image.ImageWidth".parse().unwrap();
        assert_eq!(parsed, key);
        let parsed: Key = "Exif.Image.0x0100".parse().unwrap();
        assert_eq!(parsed, key);
        let parsed: Key = "Exif.Photo.DateTimeOriginal".parse().unwrap();
        assert_eq!(parsed, Key::exif(Group::Photo, 0x9003));

        assert!("Exif.Image".parse::<Key>().is_err());
        assert!("Bogus.Image.0x0100".parse::<Key>().is_err());
        assert!("Exif.Image.NoSuchTag".parse::<Key>().is_err());

        // Unnamed tags print as hex.
        let key = Key::exif(Group::Image, 0xdead);
        assert_eq!(key.to_string(), "Exif.Image.0xdead");
    }

    #[test]
    fn test_set_ops() {
        let mut set = MetadataSet::new();
        let key = Key::exif(Group::Image, 0x0100);
        set.insert(key, Value::from_u32(640));
        set.insert(key, Value::from_u32(641));
        assert_eq!(set.len(), 2);

        // find_key returns the first duplicate.
        assert_eq!(set.find_key(&key).unwrap().value.to_i64(0), Ok(640));

        // assign replaces the first match.
        set.assign(key, Value::from_u32(642));
        assert_eq!(set.len(), 2);
        assert_eq!(set.find_key(&key).unwrap().value.to_i64(0), Ok(642));

        let other = Key::new(Family::Exif, Group::Photo, 0x9003);
        set.assign(other, Value::from_u16(1));
        assert_eq!(set.len(), 3);

        assert_eq!(set.erase_group(Group::Image), 2);
        assert_eq!(set.len(), 1);
        assert!(set.find_key(&key).is_none());
    }

    #[test]
    fn test_sort_is_stable() {
        let mut set = MetadataSet::new();
        set.insert(Key::exif(Group::Photo, 0x9003), Value::from_u16(2));
        set.insert(Key::exif(Group::Image, 0x0100), Value::from_u32(640));
        set.insert(Key::exif(Group::Image, 0x0100), Value::from_u32(641));
        set.sort_by_key();
        let tags: Vec<i64> = set.iter().map(|d| d.value.to_i64(0).unwrap()).collect();
        assert_eq!(tags, vec![640, 641, 2]);
    }

    #[test]
    fn test_thumbnail_facade() {
        let mut set = MetadataSet::new();
        assert!(set.thumbnail().is_none());
        set.set_jpeg_thumbnail(vec![0xff, 0xd8, 0xff, 0xd9]);
        assert_eq!(set.thumbnail(), Some([0xff, 0xd8, 0xff, 0xd9].as_slice()));
        assert!(set.erase_thumbnail() >= 3);
        assert!(set.thumbnail().is_none());
    }
}
