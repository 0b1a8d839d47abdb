/*
 * exifkit - canon.rs
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

//! Canon specific code: the binary array tables.
//!
//! A binary array entry is a fixed layout record whose on-wire type
//! says nothing useful (usually `Short` or `Undefined`); the table
//! fixes each field's type and byte order and gives the fields a
//! synthetic group of their own.

use crate::container::Endian;
use crate::metadata::Group;
use crate::tiff::tags;
use crate::tiff::ArrayElement;
use crate::value::{unit_size, TagType};

/// Description of one binary array entry.
#[derive(Debug)]
pub(crate) struct ArrayDef {
    /// Group the hosting entry lives in.
    pub group: Group,
    /// Tag of the hosting entry.
    pub tag: u16,
    /// Synthetic group of the virtual children.
    pub elem_group: Group,
    /// Element type, fixed by the table.
    pub elem_type: TagType,
    /// Byte order override. `None` inherits the subtree's.
    pub endian: Option<Endian>,
}

static ARRAY_DEFS: [ArrayDef; 3] = [
    ArrayDef {
        group: Group::Canon,
        tag: tags::CANON_TAG_CAMERA_SETTINGS,
        elem_group: Group::CanonCs,
        elem_type: TagType::Short,
        endian: None,
    },
    ArrayDef {
        group: Group::Canon,
        tag: tags::CANON_TAG_SHOT_INFO,
        elem_group: Group::CanonSi,
        elem_type: TagType::Short,
        endian: None,
    },
    ArrayDef {
        group: Group::Canon,
        tag: tags::CANON_TAG_CUSTOM_FUNCTIONS,
        elem_group: Group::CanonCf,
        elem_type: TagType::Short,
        endian: None,
    },
];

/// Look up the array description for `(group, tag)`.
pub(crate) fn array_def(group: Group, tag: u16) -> Option<&'static ArrayDef> {
    ARRAY_DEFS
        .iter()
        .find(|def| def.group == group && def.tag == tag)
}

/// Look up the array description hosting a synthetic element group.
pub(crate) fn array_def_for_elements(elem_group: Group) -> Option<&'static ArrayDef> {
    ARRAY_DEFS.iter().find(|def| def.elem_group == elem_group)
}

/// Expand the payload into virtual children, one per whole element.
/// Children are numbered from 1.
pub(crate) fn expand_array(
    def: &'static ArrayDef,
    payload: &[u8],
    dir_endian: Endian,
) -> Vec<ArrayElement> {
    let endian = def.endian.unwrap_or(dir_endian);
    let unit = unit_size(def.elem_type);
    let count = payload.len() / unit;
    let mut elements = Vec::with_capacity(count);
    for i in 0..count {
        elements.push(ArrayElement {
            tag: (i + 1) as u16,
            type_: def.elem_type,
            group: def.elem_group,
            endian,
            data: payload[i * unit..(i + 1) * unit].to_vec(),
        });
    }
    elements
}

#[cfg(test)]
mod test {
    use super::{array_def, expand_array};
    use crate::container::Endian;
    use crate::metadata::Group;
    use crate::value::TagType;

    #[test]
    fn test_array_def_lookup() {
        let def = array_def(Group::Canon, 0x0001).unwrap();
        assert_eq!(def.elem_group, Group::CanonCs);
        assert_eq!(def.elem_type, TagType::Short);
        assert!(array_def(Group::Canon, 0x0002).is_none());
        assert!(array_def(Group::Nikon1, 0x0001).is_none());
    }

    #[test]
    fn test_expand_array() {
        let def = array_def(Group::Canon, 0x0001).unwrap();
        let payload = [0_u8, 0, 2, 0, 4, 0];
        let elements = expand_array(def, &payload, Endian::Little);
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].tag, 1);
        assert_eq!(elements[2].tag, 3);
        assert_eq!(elements[1].data, vec![2, 0]);
        // Trailing partial element is dropped.
        let elements = expand_array(def, &payload[0..5], Endian::Little);
        assert_eq!(elements.len(), 2);
    }
}
