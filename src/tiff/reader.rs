// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * exifkit - tiff/reader.rs
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

//! Build the composite tree out of a TIFF blob.
//!
//! Each subtree carries its own reader state: byte order and offset
//! base. Descending into a maker-note may replace both for that
//! subtree only. A failed subtree degrades to an opaque entry; only
//! a bad top level header is fatal.

use log::warn;

use crate::bytes;
use crate::canon;
use crate::container::Endian;
use crate::makernote;
use crate::makernote::Makernote;
use crate::metadata::Group;
use crate::tiff::{self, tags, Dir, Entry, Node, Tree};
use crate::value::{unit_size, TagType};
use crate::{Error, Result};

/// Per-subtree parse state. Offsets within the subtree resolve
/// against `base`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ReaderState {
    pub endian: Endian,
    pub base: u32,
}

/// How a directory's next pointer is followed.
#[derive(Clone, Copy, Debug, PartialEq)]
enum NextPolicy {
    /// IFD0 chain: Image -> Thumbnail -> IFD2 -> IFD3.
    Chain,
    /// Maker-note chains stay in their own group.
    Same,
    /// Pointer is not read (or not present).
    None,
}

struct Reader<'a> {
    blob: &'a [u8],
    /// Camera make from IFD0, needed for maker-note dispatch.
    make: Option<String>,
    /// Absolute offsets of the directories on the current descent
    /// path, to catch cyclic sub-IFD offsets. Pushed before a
    /// directory is read, popped once its subtree (next chain
    /// included) is done, so unrelated branches may legitimately
    /// share an offset.
    path: Vec<u32>,
}

/// Parse `blob` into a tree.
pub(crate) fn parse(blob: &[u8]) -> Result<Tree> {
    if blob.len() < 8 {
        return Err(Error::Truncated);
    }
    let endian = Endian::from_marker(&blob[0..2]).ok_or(Error::BadMagic)?;
    let magic = bytes::get_u16(&blob[2..], endian);
    if !tiff::is_known_magic(magic) {
        return Err(Error::BadMagic);
    }
    let first = bytes::get_u32(&blob[4..], endian);

    let mut reader = Reader {
        blob,
        make: None,
        path: Vec::new(),
    };
    let state = ReaderState { endian, base: 0 };
    let ifd0 = match reader.read_chain(first, Group::Image, state, NextPolicy::Chain) {
        Ok(dir) => Some(dir),
        Err(err) => {
            warn!("IFD0 unreadable: {}", err);
            None
        }
    };
    Ok(Tree {
        endian,
        magic,
        ifd0,
    })
}

/// A raw 12 byte entry before payload resolution.
struct RawEntry {
    tag: u16,
    type_code: u16,
    count: u32,
    /// Absolute position of the 4 byte value-or-offset slot.
    slot_pos: u32,
}

impl<'a> Reader<'a> {
    fn read_chain(
        &mut self,
        offset: u32,
        group: Group,
        state: ReaderState,
        policy: NextPolicy,
    ) -> Result<Dir> {
        let abs = state.base.checked_add(offset).ok_or(Error::Truncated)?;
        if self.path.contains(&abs) {
            return Err(Error::CircularReference);
        }
        self.path.push(abs);
        let result = match self.read_dir(offset, group, state) {
            Ok((mut dir, next_off)) => {
                if next_off != 0 {
                    let next_group = match policy {
                        NextPolicy::Chain => tiff::next_group(group),
                        NextPolicy::Same => Some(group),
                        NextPolicy::None => None,
                    };
                    if let Some(next_group) = next_group {
                        match self.read_chain(next_off, next_group, state, policy) {
                            Ok(next) => dir.next = Some(Box::new(next)),
                            Err(err) => {
                                warn!("next IFD after {:?} unreadable: {}", group, err)
                            }
                        }
                    }
                }
                Ok(dir)
            }
            Err(err) => Err(err),
        };
        self.path.pop();
        result
    }

    /// Read the directory at `base + offset`. Returns the directory
    /// and the raw next pointer.
    fn read_dir(
        &mut self,
        offset: u32,
        group: Group,
        state: ReaderState,
    ) -> Result<(Dir, u32)> {
        let abs = state
            .base
            .checked_add(offset)
            .ok_or(Error::Truncated)? as usize;
        if abs + 2 > self.blob.len() {
            return Err(Error::Truncated);
        }

        let declared = bytes::get_u16(&self.blob[abs..], state.endian) as usize;
        // A short region truncates the directory, the rest of the
        // file is still usable.
        let avail = (self.blob.len() - abs - 2) / 12;
        let truncated = declared > avail || abs + 2 + 12 * declared + 4 > self.blob.len();
        let n = if truncated {
            warn!(
                "directory at {} declares {} entries, only {} fit",
                abs, declared, avail
            );
            declared.min(avail)
        } else {
            declared
        };

        let mut raws = Vec::with_capacity(n);
        for i in 0..n {
            let pos = abs + 2 + 12 * i;
            raws.push(RawEntry {
                tag: bytes::get_u16(&self.blob[pos..], state.endian),
                type_code: bytes::get_u16(&self.blob[pos + 2..], state.endian),
                count: bytes::get_u32(&self.blob[pos + 4..], state.endian),
                slot_pos: (pos + 8) as u32,
            });
        }

        // Resolve payloads before building any node: the maker-note
        // dispatch below needs the make string from this very pass.
        let entries: Vec<Entry> = raws
            .iter()
            .filter_map(|raw| self.load_entry(raw, state))
            .collect();
        if group == Group::Image {
            if let Some(entry) = entries.iter().find(|e| e.tag == tags::EXIF_TAG_MAKE) {
                self.make = Some(entry.value(state.endian).text());
            }
        }

        let mut dir = Dir::new(group, state.endian);
        for entry in &entries {
            let node = self.build_node(entry.clone(), group, state, &entries);
            dir.nodes.push(node);
        }

        let next = if truncated {
            0
        } else {
            bytes::get_u32(&self.blob[abs + 2 + 12 * declared..], state.endian)
        };
        Ok((dir, next))
    }

    /// Resolve the payload of one raw entry. `None` skips the entry.
    fn load_entry(&self, raw: &RawEntry, state: ReaderState) -> Option<Entry> {
        let type_ = match TagType::from_wire(raw.type_code) {
            Ok(t) => t,
            Err(err) => {
                warn!("entry {:#06x}: {}", raw.tag, err);
                return None;
            }
        };
        let size = raw.count as u64 * unit_size(type_) as u64;
        if size > self.blob.len() as u64 {
            warn!(
                "entry {:#06x} payload of {} bytes exceeds the region",
                raw.tag, size
            );
            return None;
        }
        let size = size as usize;
        let slot = raw.slot_pos as usize;

        let (data, payload_pos) = if size <= 4 {
            (self.blob[slot..slot + size].to_vec(), raw.slot_pos)
        } else {
            let off = bytes::get_u32(&self.blob[slot..], state.endian);
            let abs = state.base.checked_add(off)? as usize;
            if abs + size > self.blob.len() {
                warn!(
                    "entry {:#06x} payload at {} runs past the region",
                    raw.tag, abs
                );
                return None;
            }
            (self.blob[abs..abs + size].to_vec(), abs as u32)
        };

        let mut entry = Entry::new(raw.tag, type_, raw.count, data);
        entry.payload_pos = payload_pos;
        entry.wire_pos = raw.slot_pos - 8;
        Some(entry)
    }

    /// Wrap a resolved entry into the right node variant, descending
    /// into sub-IFDs and maker-notes.
    fn build_node(
        &mut self,
        entry: Entry,
        group: Group,
        state: ReaderState,
        siblings: &[Entry],
    ) -> Node {
        // The maker-note goes through the vendor dispatch.
        if group == Group::Photo && entry.tag == tags::EXIF_TAG_MAKER_NOTE {
            let note = self.read_makernote(&entry, state);
            return Node::MakerNote { entry, note };
        }

        // Sub-IFD pointers descend, one directory per offset.
        if tiff::sub_ifd_group(group, entry.tag, 0).is_some()
            && matches!(entry.type_, TagType::Long | TagType::Undefined)
        {
            let mut dirs = Vec::new();
            // Undefined typed pointers count in bytes, not offsets.
            for idx in 0..entry.data.len() / 4 {
                let target = match tiff::sub_ifd_group(group, entry.tag, idx) {
                    Some(g) => g,
                    None => break,
                };
                let off = bytes::get_u32(&entry.data[idx * 4..], state.endian);
                match self.read_chain(off, target, state, NextPolicy::None) {
                    Ok(dir) => dirs.push(dir),
                    Err(err) => warn!("sub-IFD {:?} at {} unreadable: {}", target, off, err),
                }
            }
            if !dirs.is_empty() {
                return Node::SubIfd { entry, dirs };
            }
            return Node::Entry(entry);
        }

        // Fixed layout binary arrays expand into virtual children.
        if let Some(def) = canon::array_def(group, entry.tag) {
            let elements = canon::expand_array(def, &entry.data, state.endian);
            return Node::BinaryArray { entry, elements };
        }

        match tiff::data_size_role(group, entry.tag) {
            Some(tiff::DataSizeRole::Data { size_tag }) => {
                let (data, data_pos) = self.resolve_data_area(&entry, size_tag, state, siblings);
                Node::DataEntry {
                    entry,
                    size_tag,
                    data,
                    data_pos,
                }
            }
            Some(tiff::DataSizeRole::Size { data_tag }) => Node::SizeEntry { entry, data_tag },
            None => Node::Entry(entry),
        }
    }

    /// The side buffer of a data entry: offset from the entry value,
    /// length from the paired size entry. Returns the buffer and its
    /// absolute position.
    fn resolve_data_area(
        &self,
        entry: &Entry,
        size_tag: u16,
        state: ReaderState,
        siblings: &[Entry],
    ) -> (Vec<u8>, u32) {
        let size = siblings
            .iter()
            .find(|e| e.tag == size_tag)
            .map(|e| e.value(state.endian).sum())
            .unwrap_or(0);
        if size <= 0 {
            return (Vec::new(), 0);
        }
        let off = match entry.value(state.endian).to_i64(0) {
            Ok(v) => v as u32,
            Err(_) => return (Vec::new(), 0),
        };
        let abs = match state.base.checked_add(off) {
            Some(v) => v as usize,
            None => return (Vec::new(), 0),
        };
        let end = abs + size as usize;
        if end > self.blob.len() {
            warn!(
                "data area of {:#06x} at {}+{} runs past the region",
                entry.tag, abs, size
            );
            return (Vec::new(), 0);
        }
        (self.blob[abs..end].to_vec(), abs as u32)
    }

    /// Recognize and parse the maker-note body.
    fn read_makernote(&mut self, entry: &Entry, state: ReaderState) -> Makernote {
        let payload = &entry.data;
        let mn_pos = entry.payload_pos;
        let make = self.make.clone().unwrap_or_default();

        if let Some(header) =
            makernote::detect(&make, payload, mn_pos, state.endian, state.base)
        {
            let sub_state = ReaderState {
                endian: header.endian,
                base: header.base,
            };
            let policy = if header.has_next {
                NextPolicy::Same
            } else {
                NextPolicy::None
            };
            let offset = header.ifd_start.wrapping_sub(header.base);
            match self.read_chain(offset, header.group, sub_state, policy) {
                Ok(dir) => return Makernote::Ifd { header, dir },
                Err(err) => {
                    warn!("{:?} maker-note unreadable: {}", header.group, err);
                    return Makernote::Opaque;
                }
            }
        }

        // Unrecognized vendor: take the body as a bare IFD when it
        // looks like one, else keep the bytes opaque.
        if plausible_ifd(payload, state.endian) {
            let header = makernote::MnHeader {
                kind: makernote::MnKind::Plain,
                group: Group::MakerNote,
                bytes: Vec::new(),
                endian: state.endian,
                base: state.base,
                ifd_start: mn_pos,
                has_next: false,
            };
            let offset = mn_pos.wrapping_sub(state.base);
            if let Ok(dir) = self.read_chain(offset, Group::MakerNote, state, NextPolicy::None) {
                return Makernote::Ifd { header, dir };
            }
        }
        Makernote::Opaque
    }
}

/// Does the buffer start like an IFD: a believable entry count
/// followed by that many entries.
fn plausible_ifd(payload: &[u8], endian: Endian) -> bool {
    if payload.len() < 2 {
        return false;
    }
    let n = bytes::get_u16(payload, endian) as usize;
    n > 0 && n < 256 && 2 + 12 * n <= payload.len()
}

#[cfg(test)]
mod test {
    use super::{parse, plausible_ifd};
    use crate::bytes;
    use crate::container::Endian;
    use crate::metadata::Group;
    use crate::tiff::{Node, TIFF_MAGIC};
    use crate::value::TagType;
    use crate::Error;

    /// Little endian TIFF header with the IFD0 offset.
    fn header(ifd0: u32) -> Vec<u8> {
        let mut blob = b"II".to_vec();
        bytes::put_u16(&mut blob, TIFF_MAGIC, Endian::Little);
        bytes::put_u32(&mut blob, ifd0, Endian::Little);
        blob
    }

    #[test]
    fn test_bad_magic() {
        assert_eq!(parse(b"XXXXXXXX").unwrap_err(), Error::BadMagic);
        let mut blob = b"II".to_vec();
        bytes::put_u16(&mut blob, 0x1234, Endian::Little);
        bytes::put_u32(&mut blob, 8, Endian::Little);
        assert_eq!(parse(&blob).unwrap_err(), Error::BadMagic);
        assert_eq!(parse(b"II").unwrap_err(), Error::Truncated);
    }

    #[test]
    fn test_single_entry() {
        let mut blob = header(8);
        bytes::put_u16(&mut blob, 1, Endian::Little);
        bytes::put_u16(&mut blob, 0x0100, Endian::Little);
        bytes::put_u16(&mut blob, TagType::Long as u16, Endian::Little);
        bytes::put_u32(&mut blob, 1, Endian::Little);
        bytes::put_u32(&mut blob, 640, Endian::Little);
        bytes::put_u32(&mut blob, 0, Endian::Little);

        let tree = parse(&blob).unwrap();
        assert_eq!(tree.endian, Endian::Little);
        let ifd0 = tree.ifd0.unwrap();
        assert_eq!(ifd0.group, Group::Image);
        assert_eq!(ifd0.nodes.len(), 1);
        let entry = ifd0.nodes[0].entry();
        assert_eq!(entry.tag, 0x0100);
        assert_eq!(entry.value(Endian::Little).to_i64(0), Ok(640));
        assert!(ifd0.next.is_none());
    }

    #[test]
    fn test_out_of_line_payload() {
        let mut blob = header(8);
        bytes::put_u16(&mut blob, 1, Endian::Little);
        bytes::put_u16(&mut blob, 0x010f, Endian::Little);
        bytes::put_u16(&mut blob, TagType::Ascii as u16, Endian::Little);
        bytes::put_u32(&mut blob, 6, Endian::Little);
        bytes::put_u32(&mut blob, 26, Endian::Little); // payload offset
        bytes::put_u32(&mut blob, 0, Endian::Little); // next
        blob.extend_from_slice(b"Canon\0");

        let tree = parse(&blob).unwrap();
        let ifd0 = tree.ifd0.unwrap();
        let entry = ifd0.nodes[0].entry();
        assert_eq!(entry.payload_pos, 26);
        assert_eq!(entry.value(Endian::Little).text(), "Canon");
    }

    #[test]
    fn test_payload_out_of_range_skips_entry() {
        let mut blob = header(8);
        bytes::put_u16(&mut blob, 2, Endian::Little);
        // First entry: payload pointer way out of range.
        bytes::put_u16(&mut blob, 0x010f, Endian::Little);
        bytes::put_u16(&mut blob, TagType::Ascii as u16, Endian::Little);
        bytes::put_u32(&mut blob, 100, Endian::Little);
        bytes::put_u32(&mut blob, 0xffff, Endian::Little);
        // Second entry is fine.
        bytes::put_u16(&mut blob, 0x0112, Endian::Little);
        bytes::put_u16(&mut blob, TagType::Short as u16, Endian::Little);
        bytes::put_u32(&mut blob, 1, Endian::Little);
        bytes::put_u32(&mut blob, 6, Endian::Little);
        bytes::put_u32(&mut blob, 0, Endian::Little);

        let tree = parse(&blob).unwrap();
        let ifd0 = tree.ifd0.unwrap();
        assert_eq!(ifd0.nodes.len(), 1);
        assert_eq!(ifd0.nodes[0].tag(), 0x0112);
    }

    #[test]
    fn test_cyclic_sub_ifd() {
        // IFD0 at 8 whose Exif pointer points back at IFD0.
        let mut blob = header(8);
        bytes::put_u16(&mut blob, 1, Endian::Little);
        bytes::put_u16(&mut blob, 0x8769, Endian::Little);
        bytes::put_u16(&mut blob, TagType::Long as u16, Endian::Little);
        bytes::put_u32(&mut blob, 1, Endian::Little);
        bytes::put_u32(&mut blob, 8, Endian::Little);
        bytes::put_u32(&mut blob, 0, Endian::Little);

        // The subtree degrades, the parse itself succeeds.
        let tree = parse(&blob).unwrap();
        let ifd0 = tree.ifd0.unwrap();
        assert!(matches!(ifd0.nodes[0], Node::Entry(_)));
    }

    #[test]
    fn test_sibling_sub_ifds_may_share_an_offset() {
        // Two sub-image pointers aimed at the same directory. Only a
        // re-entered ancestor is a cycle; siblings sharing an offset
        // must both parse.
        let mut blob = header(8);
        bytes::put_u16(&mut blob, 1, Endian::Little);
        bytes::put_u16(&mut blob, 0x014a, Endian::Little);
        bytes::put_u16(&mut blob, TagType::Long as u16, Endian::Little);
        bytes::put_u32(&mut blob, 2, Endian::Little);
        bytes::put_u32(&mut blob, 26, Endian::Little); // offset array
        bytes::put_u32(&mut blob, 0, Endian::Little); // next
        bytes::put_u32(&mut blob, 34, Endian::Little); // both point at 34
        bytes::put_u32(&mut blob, 34, Endian::Little);
        // The shared directory.
        bytes::put_u16(&mut blob, 1, Endian::Little);
        bytes::put_u16(&mut blob, 0x0100, Endian::Little);
        bytes::put_u16(&mut blob, TagType::Long as u16, Endian::Little);
        bytes::put_u32(&mut blob, 1, Endian::Little);
        bytes::put_u32(&mut blob, 640, Endian::Little);
        bytes::put_u32(&mut blob, 0, Endian::Little);

        let tree = parse(&blob).unwrap();
        let ifd0 = tree.ifd0.unwrap();
        match &ifd0.nodes[0] {
            Node::SubIfd { dirs, .. } => {
                assert_eq!(dirs.len(), 2);
                assert_eq!(dirs[0].group, Group::SubImage1);
                assert_eq!(dirs[1].group, Group::SubImage2);
                for dir in dirs {
                    let entry = dir.nodes[0].entry();
                    assert_eq!(entry.value(Endian::Little).to_i64(0), Ok(640));
                }
            }
            other => panic!("expected a sub-IFD node, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_tags_kept() {
        let mut blob = header(8);
        bytes::put_u16(&mut blob, 2, Endian::Little);
        for v in [1_u32, 2] {
            bytes::put_u16(&mut blob, 0x0112, Endian::Little);
            bytes::put_u16(&mut blob, TagType::Long as u16, Endian::Little);
            bytes::put_u32(&mut blob, 1, Endian::Little);
            bytes::put_u32(&mut blob, v, Endian::Little);
        }
        bytes::put_u32(&mut blob, 0, Endian::Little);

        let tree = parse(&blob).unwrap();
        assert_eq!(tree.ifd0.unwrap().nodes.len(), 2);
    }

    #[test]
    fn test_truncated_directory() {
        let mut blob = header(8);
        // Declares 3 entries but only one fits.
        bytes::put_u16(&mut blob, 3, Endian::Little);
        bytes::put_u16(&mut blob, 0x0112, Endian::Little);
        bytes::put_u16(&mut blob, TagType::Short as u16, Endian::Little);
        bytes::put_u32(&mut blob, 1, Endian::Little);
        bytes::put_u32(&mut blob, 6, Endian::Little);

        let tree = parse(&blob).unwrap();
        let ifd0 = tree.ifd0.unwrap();
        assert_eq!(ifd0.nodes.len(), 1);
        assert!(ifd0.next.is_none());
    }

    #[test]
    fn test_plausible_ifd() {
        let mut buf = Vec::new();
        bytes::put_u16(&mut buf, 1, Endian::Little);
        buf.extend_from_slice(&[0; 12]);
        assert!(plausible_ifd(&buf, Endian::Little));
        assert!(!plausible_ifd(&buf, Endian::Big));
        assert!(!plausible_ifd(&[0, 0], Endian::Little));
    }
}
