/*
 * exifkit - utils.rs
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

//! Small shared helpers.

/// Text of an Exif `Ascii` value or a CIFF string record.
///
/// On the wire these fields end with a NUL, are often padded with
/// more NULs to fill a fixed slot, and sometimes arrive with no
/// terminator at all. The text runs up to the first NUL (or the whole
/// field without one); what cameras write is not always UTF-8, so
/// bad sequences are replaced rather than refused.
pub(crate) fn string_from_field(buf: &[u8]) -> String {
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

#[cfg(test)]
mod test {
    use super::string_from_field;

    #[test]
    fn test_string_from_field() {
        // An Exif Make value, NUL terminated on the wire.
        assert_eq!(string_from_field(b"Canon\0"), "Canon");
        // A CIFF record padded out to its 8 byte inline slot.
        assert_eq!(string_from_field(b"D30\0\0\0\0\0"), "D30");
        // A date field written without its terminator.
        assert_eq!(
            string_from_field(b"2003:06:21 14:30:15"),
            "2003:06:21 14:30:15"
        );
        // Only the first string of a make/model pair.
        assert_eq!(
            string_from_field(b"Canon\0Canon EOS D30\0"),
            "Canon"
        );
        assert_eq!(string_from_field(b""), "");
    }

    #[test]
    fn test_string_from_field_lossy() {
        // Owner names come in whatever the camera menu produced.
        let decoded = string_from_field(b"J\xf6rg\0");
        assert_eq!(decoded, "J\u{fffd}rg");
    }
}
