/*
 * exifkit - tiff.rs
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

//! TIFF format (Image File Directories), the container behind Exif.

mod decoder;
mod encoder;
mod reader;
pub mod tags;
mod tree;

use crate::container::Endian;
use crate::metadata::{Group, MetadataSet};
use crate::Result;

pub use decoder::DecodeOptions;
pub use encoder::WriteMethod;
pub(crate) use tree::{ArrayElement, Dir, Entry, Node, Tree};

/// Standard TIFF magic word.
pub(crate) const TIFF_MAGIC: u16 = 0x2a;
/// Panasonic RW2 uses its own magic in an otherwise TIFF header.
pub(crate) const PANASONIC_MAGIC: u16 = 0x55;
/// Olympus ORF magics (`OR` and `SR` in the marker's order).
pub(crate) const ORF_MAGIC_OR: u16 = 0x4f52;
pub(crate) const ORF_MAGIC_SR: u16 = 0x5352;

pub(crate) fn is_known_magic(magic: u16) -> bool {
    matches!(
        magic,
        TIFF_MAGIC | PANASONIC_MAGIC | ORF_MAGIC_OR | ORF_MAGIC_SR
    )
}

/// Decode the metadata out of a TIFF blob.
///
/// Returns the flat record set and the byte order detected from the
/// header. Any hint a container wrapper may have is advisory only;
/// the header wins.
pub fn decode(blob: &[u8]) -> Result<(MetadataSet, Endian)> {
    decode_with(blob, &DecodeOptions::default())
}

/// Decode with options, e.g. a size cap on unknown tags to bound
/// memory.
pub fn decode_with(blob: &[u8], opts: &DecodeOptions) -> Result<(MetadataSet, Endian)> {
    let tree = reader::parse(blob)?;
    let endian = tree.endian;
    Ok((decoder::decode_tree_with(&tree, opts), endian))
}

/// Encode `set` into a TIFF blob in `byte_order`.
///
/// `blob` is the original image when one exists; it enables the
/// non-intrusive path and supplies the tree the records are merged
/// into. `None` builds the tree from the set alone.
pub fn encode(
    blob: Option<&[u8]>,
    set: &MetadataSet,
    byte_order: Endian,
) -> Result<(Vec<u8>, WriteMethod)> {
    encoder::encode(blob, set, byte_order)
}

/// The group a sub-IFD entry descends into, or `None` when the tag
/// is not a sub-IFD pointer in this directory.
pub(crate) fn sub_ifd_group(parent: Group, tag: u16, index: usize) -> Option<Group> {
    use Group::*;
    match (parent, tag) {
        (Image, tags::EXIF_TAG_EXIF_IFD_POINTER) => Some(Photo),
        (Image, tags::EXIF_TAG_GPS_INFO_IFD_POINTER) => Some(GpsInfo),
        (Photo, tags::EXIF_TAG_INTEROP_IFD_POINTER) => Some(Iop),
        (Image, tags::EXIF_TAG_SUB_IFDS) => Some(match index {
            0 => SubImage1,
            1 => SubImage2,
            2 => SubImage3,
            3 => SubImage4,
            4 => SubImage5,
            5 => SubImage6,
            6 => SubImage7,
            7 => SubImage8,
            8 => SubImage9,
            _ => return None,
        }),
        (Thumbnail, tags::EXIF_TAG_SUB_IFDS) => match index {
            0 => Some(SubThumb1),
            _ => None,
        },
        (Nikon3, tags::NIKON3_TAG_PREVIEW_IFD_POINTER) => Some(NikonPreview),
        _ => None,
    }
}

/// The tag that points at a group from its parent directory.
pub(crate) fn sub_ifd_tag(group: Group) -> Option<(Group, u16)> {
    use Group::*;
    Some(match group {
        Photo => (Image, tags::EXIF_TAG_EXIF_IFD_POINTER),
        GpsInfo => (Image, tags::EXIF_TAG_GPS_INFO_IFD_POINTER),
        Iop => (Photo, tags::EXIF_TAG_INTEROP_IFD_POINTER),
        NikonPreview => (Nikon3, tags::NIKON3_TAG_PREVIEW_IFD_POINTER),
        SubImage1 | SubImage2 | SubImage3 | SubImage4 | SubImage5 | SubImage6 | SubImage7
        | SubImage8 | SubImage9 => (Image, tags::EXIF_TAG_SUB_IFDS),
        SubThumb1 => (Thumbnail, tags::EXIF_TAG_SUB_IFDS),
        _ => return None,
    })
}

/// The group of the directory following this one in an IFD chain.
/// Only the main chain follows its next pointer.
pub(crate) fn next_group(group: Group) -> Option<Group> {
    use Group::*;
    match group {
        Image => Some(Thumbnail),
        Thumbnail => Some(Ifd2),
        Ifd2 => Some(Ifd3),
        _ => None,
    }
}

/// Role of an entry in a data/size pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum DataSizeRole {
    /// Value is an offset to a side buffer; the paired tag holds the
    /// byte length.
    Data { size_tag: u16 },
    /// Value is the byte length of the paired data entry.
    Size { data_tag: u16 },
}

/// Recognize data/size entry pairs. The pairs are confined to the
/// thumbnail shaped directories so a RAW main image is never pulled
/// into memory wholesale.
pub(crate) fn data_size_role(group: Group, tag: u16) -> Option<DataSizeRole> {
    use Group::*;
    match (group, tag) {
        (Thumbnail | NikonPreview, tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT) => {
            Some(DataSizeRole::Data {
                size_tag: tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT_LENGTH,
            })
        }
        (Thumbnail | NikonPreview, tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT_LENGTH) => {
            Some(DataSizeRole::Size {
                data_tag: tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT,
            })
        }
        (Thumbnail, tags::EXIF_TAG_STRIP_OFFSETS) => Some(DataSizeRole::Data {
            size_tag: tags::EXIF_TAG_STRIP_BYTE_COUNTS,
        }),
        (Thumbnail, tags::EXIF_TAG_STRIP_BYTE_COUNTS) => Some(DataSizeRole::Size {
            data_tag: tags::EXIF_TAG_STRIP_OFFSETS,
        }),
        _ => None,
    }
}
