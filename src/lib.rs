/*
 * exifkit - lib.rs
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

//! Embedded image metadata processing.
//!
//! The crate reads (and for the TIFF family, writes) the metadata
//! embedded in still image containers: the TIFF/Exif composite with
//! its maker-note sub-trees, and CIFF, the container of Canon CRW
//! files. Container wrappers (JPEG, RIFF, PNG and friends) locate
//! the metadata blob and hand it over; the crate parses it into a
//! flat, keyed [`MetadataSet`], and serializes a mutated set back.
//!
//! Warnings about recoverable damage go through the [`log`] crate;
//! install a logger to see them.

mod bytes;
mod canon;
pub mod ciff;
mod container;
mod makernote;
pub mod metadata;
pub mod tiff;
mod utils;
pub mod value;

pub use container::Endian;
pub use metadata::{
    register_tag_names, tag_name, Family, Group, Key, MetadataSet, Metadatum, TagNames,
};
pub use tiff::WriteMethod;
pub use value::{CharsetId, Rational, SRational, TagType, Value};

/// Standard Result for exifkit
pub type Result<T> = std::result::Result<T, Error>;

/// Standard Error for exifkit
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// Header rejected
    #[error("Bad magic")]
    BadMagic,
    /// Directory or value extends past the region
    #[error("Truncated data")]
    Truncated,
    /// A sub-IFD offset re-enters an ancestor
    #[error("Circular reference")]
    CircularReference,
    /// Type code not in the table
    #[error("Unknown type code {0}")]
    UnknownType(u16),
    /// Text could not be parsed for the declared type
    #[error("Cannot parse value: {0}")]
    ValueParse(String),
    /// Index or count exceeded bounds
    #[error("Index out of range")]
    OutOfRange,
    /// IO Error from the host
    #[error("IO Error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err.to_string())
    }
}
