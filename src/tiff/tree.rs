// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * exifkit - tiff/tree.rs
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

//! The composite tree a TIFF blob parses into.
//!
//! One tagged enum selects the node kind; the reader builds the tree,
//! only the encoder mutates it, and it is dropped as a whole. A child
//! is owned by its directory, never referenced from outside the
//! parent's subtree.

use crate::container::Endian;
use crate::makernote::Makernote;
use crate::metadata::Group;
use crate::value::{TagType, Value};

/// One IFD entry as parsed off the wire.
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub tag: u16,
    pub type_: TagType,
    pub count: u32,
    /// The payload bytes, `count * unit_size` of them, in the
    /// subtree's byte order.
    pub data: Vec<u8>,
    /// Absolute position of the payload in the source blob. For an
    /// inline entry this is the value slot itself. 0 for entries
    /// built by the encoder.
    pub payload_pos: u32,
    /// Absolute position of the 12 byte entry record in the source
    /// blob. 0 for entries built by the encoder.
    pub wire_pos: u32,
}

impl Entry {
    pub fn new(tag: u16, type_: TagType, count: u32, data: Vec<u8>) -> Entry {
        Entry {
            tag,
            type_,
            count,
            data,
            payload_pos: 0,
            wire_pos: 0,
        }
    }

    /// The parsed value, in the byte order of the enclosing subtree.
    pub fn value(&self, endian: Endian) -> Value {
        Value::from_bytes(self.type_, &self.data, endian)
    }
}

/// A virtual child of a binary array entry. Type and byte order come
/// from the array table, not from the wire.
#[derive(Clone, Debug)]
pub(crate) struct ArrayElement {
    pub tag: u16,
    pub type_: TagType,
    pub group: Group,
    pub endian: Endian,
    pub data: Vec<u8>,
}

/// A node of the composite tree.
#[derive(Clone, Debug)]
pub(crate) enum Node {
    /// Generic leaf entry.
    Entry(Entry),
    /// Entry whose value is an offset to a side buffer; `data` is the
    /// resolved buffer. Tied to the size entry carrying its length.
    DataEntry {
        entry: Entry,
        size_tag: u16,
        data: Vec<u8>,
        /// Absolute position of the buffer in the source blob.
        data_pos: u32,
    },
    /// The dual of `DataEntry`.
    SizeEntry { entry: Entry, data_tag: u16 },
    /// Entry whose value is one or more offsets to nested directories.
    SubIfd { entry: Entry, dirs: Vec<Dir> },
    /// The maker-note entry with its recognized (or opaque) body.
    MakerNote { entry: Entry, note: Makernote },
    /// Fixed layout binary record expanded into virtual children.
    BinaryArray {
        entry: Entry,
        elements: Vec<ArrayElement>,
    },
}

impl Node {
    pub fn entry(&self) -> &Entry {
        match self {
            Node::Entry(e) => e,
            Node::DataEntry { entry, .. }
            | Node::SizeEntry { entry, .. }
            | Node::SubIfd { entry, .. }
            | Node::MakerNote { entry, .. }
            | Node::BinaryArray { entry, .. } => entry,
        }
    }

    pub fn entry_mut(&mut self) -> &mut Entry {
        match self {
            Node::Entry(e) => e,
            Node::DataEntry { entry, .. }
            | Node::SizeEntry { entry, .. }
            | Node::SubIfd { entry, .. }
            | Node::MakerNote { entry, .. }
            | Node::BinaryArray { entry, .. } => entry,
        }
    }

    pub fn tag(&self) -> u16 {
        self.entry().tag
    }
}

/// An Image File Directory with its entries in document order.
/// Duplicate tags are kept.
#[derive(Clone, Debug)]
pub(crate) struct Dir {
    pub group: Group,
    pub endian: Endian,
    pub nodes: Vec<Node>,
    /// The chained next directory (IFD0 -> IFD1 -> ...).
    pub next: Option<Box<Dir>>,
}

impl Dir {
    pub fn new(group: Group, endian: Endian) -> Dir {
        Dir {
            group,
            endian,
            nodes: Vec::new(),
            next: None,
        }
    }

    /// First node with `tag`. Duplicates resolve to the first, in
    /// document order.
    pub fn find(&self, tag: u16) -> Option<&Node> {
        self.nodes.iter().find(|n| n.tag() == tag)
    }

    pub fn find_mut(&mut self, tag: u16) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.tag() == tag)
    }

    /// Walk the whole chain starting here.
    pub fn chain(&self) -> ChainIter<'_> {
        ChainIter { cur: Some(self) }
    }
}

pub(crate) struct ChainIter<'a> {
    cur: Option<&'a Dir>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Dir;

    fn next(&mut self) -> Option<&'a Dir> {
        let cur = self.cur?;
        self.cur = cur.next.as_deref();
        Some(cur)
    }
}

/// A parsed TIFF blob: header plus the IFD0 chain.
#[derive(Clone, Debug)]
pub(crate) struct Tree {
    pub endian: Endian,
    pub magic: u16,
    pub ifd0: Option<Dir>,
}

impl Tree {
    pub fn new(endian: Endian) -> Tree {
        Tree {
            endian,
            magic: super::TIFF_MAGIC,
            ifd0: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Dir, Entry, Node, Tree};
    use crate::container::Endian;
    use crate::metadata::Group;
    use crate::value::TagType;

    #[test]
    fn test_entry_value() {
        let e = Entry::new(0x0100, TagType::Long, 1, vec![0x80, 2, 0, 0]);
        assert_eq!(e.value(Endian::Little).to_i64(0), Ok(640));
        let e = Entry::new(0x0100, TagType::Long, 1, vec![0, 0, 2, 0x80]);
        assert_eq!(e.value(Endian::Big).to_i64(0), Ok(0x00020080));
    }

    #[test]
    fn test_dir_find_keeps_duplicates() {
        let mut dir = Dir::new(Group::Image, Endian::Little);
        dir.nodes.push(Node::Entry(Entry::new(
            1,
            TagType::Short,
            1,
            vec![1, 0],
        )));
        dir.nodes.push(Node::Entry(Entry::new(
            1,
            TagType::Short,
            1,
            vec![2, 0],
        )));
        assert_eq!(dir.nodes.len(), 2);
        // The first one wins lookups.
        let found = dir.find(1).unwrap();
        assert_eq!(found.entry().data, vec![1, 0]);
    }

    #[test]
    fn test_dir_chain() {
        let mut ifd0 = Dir::new(Group::Image, Endian::Little);
        let mut ifd1 = Dir::new(Group::Thumbnail, Endian::Little);
        ifd1.next = Some(Box::new(Dir::new(Group::Ifd2, Endian::Little)));
        ifd0.next = Some(Box::new(ifd1));
        let mut tree = Tree::new(Endian::Little);
        tree.ifd0 = Some(ifd0);

        let groups: Vec<Group> = tree
            .ifd0
            .as_ref()
            .unwrap()
            .chain()
            .map(|d| d.group)
            .collect();
        assert_eq!(groups, vec![Group::Image, Group::Thumbnail, Group::Ifd2]);
    }
}
