// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * exifkit - ciff/container.rs
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

//! The CIFF container: header, heap regions, component tree.

use log::warn;

use crate::bytes;
use crate::container::Endian;
use crate::{Error, Result};

use super::{in_record, is_heap};

/// Fixed header length, which is also where the root region starts.
pub(crate) const HEADER_LEN: u32 = 0x1a;
/// Container signature at offsets 6..14.
pub(crate) const SIGNATURE: &[u8; 8] = b"HEAPCCDR";
/// Version word: 1.2.
pub(crate) const VERSION: u32 = 0x0001_0002;

/// A parsed CIFF component.
#[derive(Clone, Debug)]
pub(crate) enum Component {
    /// A value record. `abs_offset` is the absolute file position of
    /// the bytes, 0 when they were inline.
    Value {
        tag: u16,
        data: Vec<u8>,
        abs_offset: u32,
    },
    /// A heap record holding a nested region.
    Directory {
        tag: u16,
        components: Vec<Component>,
    },
}

impl Component {
    pub fn tag(&self) -> u16 {
        match self {
            Component::Value { tag, .. } => *tag,
            Component::Directory { tag, .. } => *tag,
        }
    }
}

/// The parsed container.
#[derive(Debug)]
pub(crate) struct Container {
    pub endian: Endian,
    /// Root region components.
    pub root: Vec<Component>,
}

/// Parse a CRW blob.
pub(crate) fn parse(blob: &[u8]) -> Result<Container> {
    if blob.len() < HEADER_LEN as usize {
        return Err(Error::Truncated);
    }
    let endian = Endian::from_marker(&blob[0..2]).ok_or(Error::BadMagic)?;
    if &blob[6..14] != SIGNATURE {
        return Err(Error::BadMagic);
    }
    let heap_start = bytes::get_u32(&blob[2..6], endian);
    if heap_start as usize >= blob.len() {
        return Err(Error::Truncated);
    }
    let root = read_region(
        blob,
        heap_start,
        blob.len() as u32 - heap_start,
        endian,
        0,
    )?;
    Ok(Container { endian, root })
}

/// Read the region `[pos, pos + len)`: the trailer names the
/// directory position, the directory counts its entries.
fn read_region(
    blob: &[u8],
    pos: u32,
    len: u32,
    endian: Endian,
    depth: u32,
) -> Result<Vec<Component>> {
    // Runaway nesting is a broken file, not a tree.
    if depth > 16 {
        return Err(Error::CircularReference);
    }
    if len < 4 || pos as u64 + len as u64 > blob.len() as u64 {
        return Err(Error::Truncated);
    }
    let trailer = (pos + len - 4) as usize;
    let dir_start = bytes::get_u32(&blob[trailer..], endian);
    if dir_start > len - 4 {
        return Err(Error::Truncated);
    }
    let dir_pos = (pos + dir_start) as usize;
    if dir_pos + 2 > trailer {
        return Err(Error::Truncated);
    }
    let count = bytes::get_u16(&blob[dir_pos..], endian) as usize;
    if dir_pos + 2 + 10 * count > trailer {
        return Err(Error::Truncated);
    }

    let mut components = Vec::with_capacity(count);
    for i in 0..count {
        let epos = dir_pos + 2 + 10 * i;
        let tag = bytes::get_u16(&blob[epos..], endian);
        if in_record(tag) {
            components.push(Component::Value {
                tag,
                data: blob[epos + 2..epos + 10].to_vec(),
                abs_offset: 0,
            });
            continue;
        }
        let size = bytes::get_u32(&blob[epos + 2..], endian);
        let offset = bytes::get_u32(&blob[epos + 6..], endian);
        let abs = pos as u64 + offset as u64;
        if abs + size as u64 > blob.len() as u64 {
            warn!(
                "CIFF record {:#06x} data at {}+{} runs past the file",
                tag, abs, size
            );
            continue;
        }
        if is_heap(tag) {
            match read_region(blob, abs as u32, size, endian, depth + 1) {
                Ok(children) => components.push(Component::Directory {
                    tag,
                    components: children,
                }),
                Err(err) => warn!("CIFF heap {:#06x} unreadable: {}", tag, err),
            }
        } else {
            components.push(Component::Value {
                tag,
                data: blob[abs as usize..(abs + size as u64) as usize].to_vec(),
                abs_offset: abs as u32,
            });
        }
    }
    Ok(components)
}

/// Serialize `components` into one region: data area, directory,
/// trailer. Entries go out sorted ascending by tag, ties in
/// insertion order.
pub(crate) fn write_region(components: &[Component], endian: Endian) -> Vec<u8> {
    enum Slot {
        Inline([u8; 8]),
        Ref { size: u32, offset: u32 },
    }

    let mut order: Vec<&Component> = components.iter().collect();
    order.sort_by_key(|c| c.tag() & super::TAGCODE_MASK);

    let mut region = Vec::new();
    let mut entries: Vec<(u16, Slot)> = Vec::with_capacity(order.len());
    for comp in order {
        match comp {
            Component::Value { tag, data, .. } => {
                if data.len() <= 8 && !is_heap(*tag) {
                    let mut inline = [0_u8; 8];
                    inline[..data.len()].copy_from_slice(data);
                    entries.push((*tag | super::STORAGE_IN_RECORD, Slot::Inline(inline)));
                } else {
                    let offset = region.len() as u32;
                    region.extend_from_slice(data);
                    entries.push((
                        *tag,
                        Slot::Ref {
                            size: data.len() as u32,
                            offset,
                        },
                    ));
                }
            }
            Component::Directory { tag, components } => {
                let sub = write_region(components, endian);
                let offset = region.len() as u32;
                region.extend_from_slice(&sub);
                entries.push((
                    *tag,
                    Slot::Ref {
                        size: sub.len() as u32,
                        offset,
                    },
                ));
            }
        }
    }

    let dir_start = region.len() as u32;
    bytes::put_u16(&mut region, entries.len() as u16, endian);
    for (tag, slot) in entries {
        bytes::put_u16(&mut region, tag, endian);
        match slot {
            Slot::Inline(data) => region.extend_from_slice(&data),
            Slot::Ref { size, offset } => {
                bytes::put_u32(&mut region, size, endian);
                bytes::put_u32(&mut region, offset, endian);
            }
        }
    }
    bytes::put_u32(&mut region, dir_start, endian);
    region
}

/// Emit the fixed 26 byte header.
pub(crate) fn write_header(out: &mut Vec<u8>, endian: Endian) {
    out.extend_from_slice(endian.marker());
    bytes::put_u32(out, HEADER_LEN, endian);
    out.extend_from_slice(SIGNATURE);
    bytes::put_u32(out, VERSION, endian);
    out.extend_from_slice(&[0; 8]);
}
