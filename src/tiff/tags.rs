// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * exifkit - tiff/tags.rs
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

//! Exif tag constants and the built-in tag dictionaries.
//!
//! The dictionaries here only cover the tags the crate's own tables
//! refer to. Hosts install richer ones through
//! `metadata::register_tag_names`.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::metadata::{Group, TagNames};

pub const EXIF_TAG_NEW_SUBFILE_TYPE: u16 = 0x00fe;
pub const EXIF_TAG_IMAGE_WIDTH: u16 = 0x0100;
pub const EXIF_TAG_IMAGE_LENGTH: u16 = 0x0101;
pub const EXIF_TAG_BITS_PER_SAMPLE: u16 = 0x0102;
pub const EXIF_TAG_COMPRESSION: u16 = 0x0103;
pub const EXIF_TAG_PHOTOMETRIC_INTERPRETATION: u16 = 0x0106;
pub const EXIF_TAG_IMAGE_DESCRIPTION: u16 = 0x010e;
pub const EXIF_TAG_MAKE: u16 = 0x010f;
pub const EXIF_TAG_MODEL: u16 = 0x0110;
pub const EXIF_TAG_STRIP_OFFSETS: u16 = 0x0111;
pub const EXIF_TAG_ORIENTATION: u16 = 0x0112;
pub const EXIF_TAG_ROWS_PER_STRIP: u16 = 0x0116;
pub const EXIF_TAG_STRIP_BYTE_COUNTS: u16 = 0x0117;
pub const EXIF_TAG_X_RESOLUTION: u16 = 0x011a;
pub const EXIF_TAG_Y_RESOLUTION: u16 = 0x011b;
pub const EXIF_TAG_RESOLUTION_UNIT: u16 = 0x0128;
pub const EXIF_TAG_SOFTWARE: u16 = 0x0131;
pub const EXIF_TAG_DATE_TIME: u16 = 0x0132;
pub const EXIF_TAG_SUB_IFDS: u16 = 0x014a;
pub const EXIF_TAG_JPEG_INTERCHANGE_FORMAT: u16 = 0x0201;
pub const EXIF_TAG_JPEG_INTERCHANGE_FORMAT_LENGTH: u16 = 0x0202;
pub const EXIF_TAG_EXIF_IFD_POINTER: u16 = 0x8769;
pub const EXIF_TAG_GPS_INFO_IFD_POINTER: u16 = 0x8825;

pub const EXIF_TAG_EXPOSURE_TIME: u16 = 0x829a;
pub const EXIF_TAG_FNUMBER: u16 = 0x829d;
pub const EXIF_TAG_ISO_SPEED_RATINGS: u16 = 0x8827;
pub const EXIF_TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
pub const EXIF_TAG_MAKER_NOTE: u16 = 0x927c;
pub const EXIF_TAG_USER_COMMENT: u16 = 0x9286;
pub const EXIF_TAG_PIXEL_X_DIMENSION: u16 = 0xa002;
pub const EXIF_TAG_PIXEL_Y_DIMENSION: u16 = 0xa003;
pub const EXIF_TAG_INTEROP_IFD_POINTER: u16 = 0xa005;

// Canon maker-note tags.
pub const CANON_TAG_CAMERA_SETTINGS: u16 = 0x0001;
pub const CANON_TAG_SHOT_INFO: u16 = 0x0004;
pub const CANON_TAG_IMAGE_TYPE: u16 = 0x0006;
pub const CANON_TAG_FIRMWARE_VERSION: u16 = 0x0007;
pub const CANON_TAG_FILE_NUMBER: u16 = 0x0008;
pub const CANON_TAG_OWNER_NAME: u16 = 0x0009;
pub const CANON_TAG_SERIAL_NUMBER: u16 = 0x000c;
pub const CANON_TAG_CUSTOM_FUNCTIONS: u16 = 0x000f;
pub const CANON_TAG_MODEL_ID: u16 = 0x0010;

// Manufactured Canon AF tags. These are decoded out of AFInfo, they
// never travel on the wire and must never be written back.
pub const CANON_TAG_AF_INFO_SIZE: u16 = 0x2600;
pub const CANON_TAG_AF_AREA_MODE: u16 = 0x2601;
pub const CANON_TAG_AF_NUM_POINTS: u16 = 0x2602;
pub const CANON_TAG_AF_VALID_POINTS: u16 = 0x2603;
pub const CANON_TAG_AF_CANON_IMAGE_WIDTH: u16 = 0x2604;
pub const CANON_TAG_AF_CANON_IMAGE_HEIGHT: u16 = 0x2605;
pub const CANON_TAG_AF_IMAGE_WIDTH: u16 = 0x2606;
pub const CANON_TAG_AF_IMAGE_HEIGHT: u16 = 0x2607;
pub const CANON_TAG_AF_AREA_WIDTHS: u16 = 0x2608;
pub const CANON_TAG_AF_AREA_HEIGHTS: u16 = 0x2609;
pub const CANON_TAG_AF_X_POSITIONS: u16 = 0x260a;
pub const CANON_TAG_AF_Y_POSITIONS: u16 = 0x260b;
pub const CANON_TAG_AF_POINTS_IN_FOCUS: u16 = 0x260c;
pub const CANON_TAG_AF_POINTS_SELECTED: u16 = 0x260d;
pub const CANON_TAG_AF_POINTS_UNUSABLE: u16 = 0x260e;
pub const CANON_TAG_AF_FINE_ROTATION: u16 = 0x260f;

// Minolta maker-note tags.
pub const MINOLTA_TAG_THUMBNAIL: u16 = 0x0081;
pub const MINOLTA_TAG_THUMBNAIL_OFFSET: u16 = 0x0088;
pub const MINOLTA_TAG_THUMBNAIL_LENGTH: u16 = 0x0089;

// Olympus maker-note tags.
pub const OLYMPUS_TAG_THUMBNAIL: u16 = 0x0081;
pub const OLYMPUS_TAG_THUMBNAIL_OFFSET: u16 = 0x0088;
pub const OLYMPUS_TAG_THUMBNAIL_LENGTH: u16 = 0x0089;
pub const OLYMPUS_TAG_THUMBNAIL_IMAGE: u16 = 0x0100;

// Pentax maker-note tags.
pub const PENTAX_TAG_PREVIEW_RESOLUTION: u16 = 0x0003;
pub const PENTAX_TAG_PREVIEW_LENGTH: u16 = 0x0004;
pub const PENTAX_TAG_PREVIEW_OFFSET: u16 = 0x0005;

// Nikon3 maker-note tags.
pub const NIKON3_TAG_PREVIEW_IFD_POINTER: u16 = 0x0011;

lazy_static! {
    /// IFD0/IFD1 tag names. Shared by every TIFF shaped directory.
    static ref IMAGE_TAG_NAMES: TagNames = HashMap::from([
        (EXIF_TAG_NEW_SUBFILE_TYPE, "NewSubfileType"),
        (EXIF_TAG_IMAGE_WIDTH, "ImageWidth"),
        (EXIF_TAG_IMAGE_LENGTH, "ImageLength"),
        (EXIF_TAG_BITS_PER_SAMPLE, "BitsPerSample"),
        (EXIF_TAG_COMPRESSION, "Compression"),
        (EXIF_TAG_PHOTOMETRIC_INTERPRETATION, "PhotometricInterpretation"),
        (EXIF_TAG_IMAGE_DESCRIPTION, "ImageDescription"),
        (EXIF_TAG_MAKE, "Make"),
        (EXIF_TAG_MODEL, "Model"),
        (EXIF_TAG_STRIP_OFFSETS, "StripOffsets"),
        (EXIF_TAG_ORIENTATION, "Orientation"),
        (EXIF_TAG_ROWS_PER_STRIP, "RowsPerStrip"),
        (EXIF_TAG_STRIP_BYTE_COUNTS, "StripByteCounts"),
        (EXIF_TAG_X_RESOLUTION, "XResolution"),
        (EXIF_TAG_Y_RESOLUTION, "YResolution"),
        (EXIF_TAG_RESOLUTION_UNIT, "ResolutionUnit"),
        (EXIF_TAG_SOFTWARE, "Software"),
        (EXIF_TAG_DATE_TIME, "DateTime"),
        (EXIF_TAG_SUB_IFDS, "SubIFDs"),
        (EXIF_TAG_JPEG_INTERCHANGE_FORMAT, "JPEGInterchangeFormat"),
        (EXIF_TAG_JPEG_INTERCHANGE_FORMAT_LENGTH, "JPEGInterchangeFormatLength"),
        (EXIF_TAG_EXIF_IFD_POINTER, "ExifTag"),
        (EXIF_TAG_GPS_INFO_IFD_POINTER, "GPSTag"),
    ]);

    static ref PHOTO_TAG_NAMES: TagNames = HashMap::from([
        (EXIF_TAG_EXPOSURE_TIME, "ExposureTime"),
        (EXIF_TAG_FNUMBER, "FNumber"),
        (EXIF_TAG_ISO_SPEED_RATINGS, "ISOSpeedRatings"),
        (EXIF_TAG_DATE_TIME_ORIGINAL, "DateTimeOriginal"),
        (EXIF_TAG_MAKER_NOTE, "MakerNote"),
        (EXIF_TAG_USER_COMMENT, "UserComment"),
        (EXIF_TAG_PIXEL_X_DIMENSION, "PixelXDimension"),
        (EXIF_TAG_PIXEL_Y_DIMENSION, "PixelYDimension"),
        (EXIF_TAG_INTEROP_IFD_POINTER, "InteroperabilityTag"),
    ]);

    static ref GPS_TAG_NAMES: TagNames = HashMap::from([
        (0x0000, "GPSVersionID"),
        (0x0001, "GPSLatitudeRef"),
        (0x0002, "GPSLatitude"),
        (0x0003, "GPSLongitudeRef"),
        (0x0004, "GPSLongitude"),
        (0x0005, "GPSAltitudeRef"),
        (0x0006, "GPSAltitude"),
    ]);

    static ref IOP_TAG_NAMES: TagNames = HashMap::from([
        (0x0001, "InteroperabilityIndex"),
        (0x0002, "InteroperabilityVersion"),
    ]);

    static ref CANON_TAG_NAMES: TagNames = HashMap::from([
        (CANON_TAG_CAMERA_SETTINGS, "CameraSettings"),
        (CANON_TAG_SHOT_INFO, "ShotInfo"),
        (CANON_TAG_IMAGE_TYPE, "ImageType"),
        (CANON_TAG_FIRMWARE_VERSION, "FirmwareVersion"),
        (CANON_TAG_FILE_NUMBER, "FileNumber"),
        (CANON_TAG_OWNER_NAME, "OwnerName"),
        (CANON_TAG_SERIAL_NUMBER, "SerialNumber"),
        (CANON_TAG_CUSTOM_FUNCTIONS, "CustomFunctions"),
        (CANON_TAG_MODEL_ID, "ModelID"),
        (CANON_TAG_AF_INFO_SIZE, "AFInfoSize"),
        (CANON_TAG_AF_AREA_MODE, "AFAreaMode"),
        (CANON_TAG_AF_NUM_POINTS, "AFNumPoints"),
        (CANON_TAG_AF_VALID_POINTS, "AFValidPoints"),
        (CANON_TAG_AF_CANON_IMAGE_WIDTH, "AFCanonImageWidth"),
        (CANON_TAG_AF_CANON_IMAGE_HEIGHT, "AFCanonImageHeight"),
        (CANON_TAG_AF_IMAGE_WIDTH, "AFImageWidth"),
        (CANON_TAG_AF_IMAGE_HEIGHT, "AFImageHeight"),
        (CANON_TAG_AF_AREA_WIDTHS, "AFAreaWidths"),
        (CANON_TAG_AF_AREA_HEIGHTS, "AFAreaHeights"),
        (CANON_TAG_AF_X_POSITIONS, "AFXPositions"),
        (CANON_TAG_AF_Y_POSITIONS, "AFYPositions"),
        (CANON_TAG_AF_POINTS_IN_FOCUS, "AFPointsInFocus"),
        (CANON_TAG_AF_POINTS_SELECTED, "AFPointsSelected"),
        (CANON_TAG_AF_POINTS_UNUSABLE, "AFPointsUnusable"),
        (CANON_TAG_AF_FINE_ROTATION, "AFFineRotation"),
    ]);

    static ref CANON_CS_TAG_NAMES: TagNames = HashMap::from([
        (0x0001, "Macro"),
        (0x0002, "Selftimer"),
        (0x0003, "Quality"),
        (0x0004, "FlashMode"),
        (0x0005, "DriveMode"),
        (0x0007, "FocusMode"),
        (0x000a, "ImageSize"),
        (0x000b, "EasyMode"),
        (0x0010, "ISOSpeed"),
        (0x0011, "MeteringMode"),
        (0x0013, "AFPoint"),
        (0x0014, "ExposureProgram"),
        (0x0016, "LensType"),
    ]);

    static ref CANON_SI_TAG_NAMES: TagNames = HashMap::from([
        (0x0002, "ISOSpeed"),
        (0x0004, "TargetAperture"),
        (0x0005, "TargetShutterSpeed"),
        (0x0007, "WhiteBalance"),
        (0x0009, "Sequence"),
        (0x000e, "AFPointUsed"),
        (0x000f, "FlashBias"),
        (0x0013, "SubjectDistance"),
        (0x0015, "ApertureValue"),
        (0x0016, "ShutterSpeedValue"),
    ]);

    static ref CANON_CF_TAG_NAMES: TagNames = HashMap::from([
        (0x0001, "NoiseReduction"),
        (0x0002, "ShutterAeLock"),
        (0x0003, "MirrorLockup"),
        (0x0004, "ExposureLevelIncrements"),
        (0x0005, "AFAssist"),
    ]);

    static ref MINOLTA_TAG_NAMES: TagNames = HashMap::from([
        (MINOLTA_TAG_THUMBNAIL, "Thumbnail"),
        (MINOLTA_TAG_THUMBNAIL_OFFSET, "ThumbnailOffset"),
        (MINOLTA_TAG_THUMBNAIL_LENGTH, "ThumbnailLength"),
    ]);

    static ref OLYMPUS_TAG_NAMES: TagNames = HashMap::from([
        (OLYMPUS_TAG_THUMBNAIL, "Thumbnail"),
        (OLYMPUS_TAG_THUMBNAIL_OFFSET, "ThumbnailOffset"),
        (OLYMPUS_TAG_THUMBNAIL_LENGTH, "ThumbnailLength"),
        (OLYMPUS_TAG_THUMBNAIL_IMAGE, "ThumbnailImage"),
    ]);

    static ref PENTAX_TAG_NAMES: TagNames = HashMap::from([
        (PENTAX_TAG_PREVIEW_RESOLUTION, "PreviewResolution"),
        (PENTAX_TAG_PREVIEW_LENGTH, "PreviewLength"),
        (PENTAX_TAG_PREVIEW_OFFSET, "PreviewOffset"),
    ]);

    static ref NIKON3_TAG_NAMES: TagNames = HashMap::from([
        (NIKON3_TAG_PREVIEW_IFD_POINTER, "Preview"),
    ]);
}

/// The dictionaries the crate ships with.
pub(crate) fn builtin_tag_names() -> HashMap<Group, &'static TagNames> {
    HashMap::from([
        (Group::Image, &*IMAGE_TAG_NAMES),
        (Group::Thumbnail, &*IMAGE_TAG_NAMES),
        (Group::NikonPreview, &*IMAGE_TAG_NAMES),
        (Group::Ifd2, &*IMAGE_TAG_NAMES),
        (Group::Ifd3, &*IMAGE_TAG_NAMES),
        (Group::Image2, &*IMAGE_TAG_NAMES),
        (Group::SubImage1, &*IMAGE_TAG_NAMES),
        (Group::SubImage2, &*IMAGE_TAG_NAMES),
        (Group::SubImage3, &*IMAGE_TAG_NAMES),
        (Group::SubImage4, &*IMAGE_TAG_NAMES),
        (Group::SubImage5, &*IMAGE_TAG_NAMES),
        (Group::SubImage6, &*IMAGE_TAG_NAMES),
        (Group::SubImage7, &*IMAGE_TAG_NAMES),
        (Group::SubImage8, &*IMAGE_TAG_NAMES),
        (Group::SubImage9, &*IMAGE_TAG_NAMES),
        (Group::SubThumb1, &*IMAGE_TAG_NAMES),
        (Group::Photo, &*PHOTO_TAG_NAMES),
        (Group::GpsInfo, &*GPS_TAG_NAMES),
        (Group::Iop, &*IOP_TAG_NAMES),
        (Group::Canon, &*CANON_TAG_NAMES),
        (Group::CanonCs, &*CANON_CS_TAG_NAMES),
        (Group::CanonSi, &*CANON_SI_TAG_NAMES),
        (Group::CanonCf, &*CANON_CF_TAG_NAMES),
        (Group::Minolta, &*MINOLTA_TAG_NAMES),
        (Group::Olympus, &*OLYMPUS_TAG_NAMES),
        (Group::Pentax, &*PENTAX_TAG_NAMES),
        (Group::Nikon3, &*NIKON3_TAG_NAMES),
    ])
}
