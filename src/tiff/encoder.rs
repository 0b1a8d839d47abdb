// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * exifkit - tiff/encoder.rs
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

//! Apply a record set back onto a tree and serialize it.
//!
//! Two phases. The non-intrusive one overwrites value bytes in place
//! in a copy of the original blob, keeping every offset; it only
//! works when nothing grew, nothing moved and nothing was added or
//! removed. The intrusive one rebuilds every directory. When the
//! intrusive result exceeds what a JPEG APP1 segment can carry, a
//! filter cascade discards records round by round, re-encoding after
//! each round, and the caller is told when even that was not enough.
//! The encoder never silently truncates.

use std::collections::HashMap;

use log::warn;

use crate::bytes;
use crate::canon;
use crate::container::Endian;
use crate::makernote::{Makernote, MnHeader, MnKind};
use crate::metadata::{tag_name, Group, Key, MetadataSet};
use crate::tiff::{self, reader, tags, Dir, Entry, Node, Tree};
use crate::value::{unit_size, TagType, Value};
use crate::Result;

/// Content ceiling of a JPEG APP1 segment.
pub(crate) const APP1_CEILING: usize = 65527;
/// A preview whose length tags sum past this many bytes arms the
/// preview cascade.
const PREVIEW_LIMIT: i64 = 32768;
/// Nameless tags above this size are dropped by the last round.
const UNKNOWN_TAG_LIMIT: usize = 4096;
/// Any tag above this size is dropped by the last round.
const ANY_TAG_LIMIT: usize = 20480;

/// Which phase produced the output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WriteMethod {
    /// Values were overwritten in place in the original blob.
    NonIntrusive,
    /// The directories were rebuilt.
    Intrusive,
    /// Rebuilt, and still larger than the APP1 ceiling after the
    /// whole filter cascade.
    IntrusiveOversize,
}

pub(crate) fn encode(
    blob: Option<&[u8]>,
    set: &MetadataSet,
    byte_order: Endian,
) -> Result<(Vec<u8>, WriteMethod)> {
    let src_tree = match blob {
        Some(b) => Some(reader::parse(b)?),
        None => None,
    };

    if let (Some(b), Some(tree)) = (blob, &src_tree) {
        if byte_order == tree.endian {
            if let Some(out) = try_non_intrusive(b, tree, set) {
                return Ok((out, WriteMethod::NonIntrusive));
            }
        }
    }

    let mut working = set.clone();
    let mut out = build(&src_tree, &working, byte_order);
    if out.len() <= APP1_CEILING {
        return Ok((out, WriteMethod::Intrusive));
    }

    // Over the ceiling: discard round by round, re-encoding after
    // each round.
    filter_ifd0_tags(&mut working);
    out = build(&src_tree, &working, byte_order);
    if out.len() <= APP1_CEILING {
        return Ok((out, WriteMethod::Intrusive));
    }

    filter_ifds(&mut working);
    out = build(&src_tree, &working, byte_order);
    if out.len() <= APP1_CEILING {
        return Ok((out, WriteMethod::Intrusive));
    }

    filter_previews(&mut working);
    out = build(&src_tree, &working, byte_order);
    if out.len() <= APP1_CEILING {
        return Ok((out, WriteMethod::Intrusive));
    }

    filter_oversize_tags(&mut working);
    out = build(&src_tree, &working, byte_order);
    if out.len() <= APP1_CEILING {
        Ok((out, WriteMethod::Intrusive))
    } else {
        warn!(
            "encoded Exif is {} bytes, over the {} byte ceiling",
            out.len(),
            APP1_CEILING
        );
        Ok((out, WriteMethod::IntrusiveOversize))
    }
}

// -------------------------------------------------------------------
// Phase 1: non-intrusive overwrite.

/// A decodable position in the tree, in document order.
enum Slot<'t> {
    Node { endian: Endian, node: &'t Node },
    Element {
        parent: &'t Entry,
        elem_pos: usize,
        elem_endian: Endian,
        elem_type: TagType,
    },
}

fn collect_slots<'t>(tree: &'t Tree) -> Vec<(Key, Slot<'t>)> {
    let mut slots = Vec::new();
    if let Some(ifd0) = &tree.ifd0 {
        for dir in ifd0.chain() {
            collect_dir_slots(dir, &mut slots);
        }
    }
    slots
}

fn collect_dir_slots<'t>(dir: &'t Dir, slots: &mut Vec<(Key, Slot<'t>)>) {
    for node in &dir.nodes {
        match node {
            Node::Entry(_) | Node::DataEntry { .. } | Node::SizeEntry { .. } => {
                slots.push((
                    Key::exif(dir.group, node.tag()),
                    Slot::Node {
                        endian: dir.endian,
                        node,
                    },
                ));
            }
            Node::SubIfd { dirs, .. } => {
                for sub in dirs {
                    for chained in sub.chain() {
                        collect_dir_slots(chained, slots);
                    }
                }
            }
            Node::MakerNote { entry: _, note } => match note {
                Makernote::Ifd { dir: mn_dir, .. } => {
                    for chained in mn_dir.chain() {
                        collect_dir_slots(chained, slots);
                    }
                }
                Makernote::Opaque => {
                    slots.push((
                        Key::exif(dir.group, node.tag()),
                        Slot::Node {
                            endian: dir.endian,
                            node,
                        },
                    ));
                }
            },
            Node::BinaryArray { entry, elements } => {
                for (pos, elem) in elements.iter().enumerate() {
                    slots.push((
                        Key::exif(elem.group, elem.tag),
                        Slot::Element {
                            parent: entry,
                            elem_pos: pos,
                            elem_endian: elem.endian,
                            elem_type: elem.type_,
                        },
                    ));
                }
            }
        }
    }
}

/// Overwrite values in place when the record set still matches the
/// tree shape exactly. `None` hands over to the intrusive phase.
fn try_non_intrusive(blob: &[u8], tree: &Tree, set: &MetadataSet) -> Option<Vec<u8>> {
    let slots = collect_slots(tree);

    // The key multisets must match: no additions, no removals.
    let mut tree_keys: Vec<Key> = slots.iter().map(|(k, _)| *k).collect();
    let mut set_keys: Vec<Key> = set.iter().map(|d| d.key).collect();
    tree_keys.sort();
    set_keys.sort();
    if tree_keys != set_keys {
        return None;
    }

    let mut out = blob.to_vec();
    let mut cursor: HashMap<Key, usize> = HashMap::new();
    for datum in set {
        let nth = {
            let c = cursor.entry(datum.key).or_insert(0);
            let n = *c;
            *c += 1;
            n
        };
        let slot = slots
            .iter()
            .filter(|(k, _)| *k == datum.key)
            .nth(nth)
            .map(|(_, s)| s)?;
        match slot {
            Slot::Node { endian, node } => {
                let entry = node.entry();
                if entry.wire_pos == 0 {
                    return None;
                }
                if datum.value.wire_type() != entry.type_ {
                    return None;
                }
                let mut new = Vec::new();
                datum.value.write_to_bytes(&mut new, *endian);
                if new.len() > entry.data.len() {
                    return None;
                }
                if let Some(area) = datum.value.data_area() {
                    match node {
                        Node::DataEntry { data, data_pos, .. } => {
                            if *data_pos == 0 || area.len() != data.len() {
                                return None;
                            }
                            let pos = *data_pos as usize;
                            out[pos..pos + area.len()].copy_from_slice(area);
                            // The offset and length stay what they
                            // were; nothing else to patch.
                            continue;
                        }
                        _ => return None,
                    }
                }
                bytes::patch_u32(
                    &mut out,
                    entry.wire_pos as usize + 4,
                    datum.value.count(),
                    *endian,
                );
                let pos = entry.payload_pos as usize;
                out[pos..pos + new.len()].copy_from_slice(&new);
            }
            Slot::Element {
                parent,
                elem_pos,
                elem_endian,
                elem_type,
            } => {
                if parent.payload_pos == 0 {
                    return None;
                }
                let unit = unit_size(*elem_type);
                let mut new = Vec::new();
                datum.value.write_to_bytes(&mut new, *elem_endian);
                if new.len() != unit {
                    return None;
                }
                let pos = parent.payload_pos as usize + elem_pos * unit;
                out[pos..pos + unit].copy_from_slice(&new);
            }
        }
    }
    Some(out)
}

// -------------------------------------------------------------------
// Phase 2: intrusive rebuild.

fn build(src_tree: &Option<Tree>, set: &MetadataSet, byte_order: Endian) -> Vec<u8> {
    let mut tree = match src_tree {
        Some(t) => t.clone(),
        None => Tree::new(byte_order),
    };
    prune_tree(&mut tree, set);
    apply_records(&mut tree, set, byte_order);
    serialize(&tree, byte_order)
}

/// Count of records per `(group, tag)`, array elements under their
/// synthetic group.
fn record_counts(set: &MetadataSet) -> HashMap<(Group, u16), usize> {
    let mut counts = HashMap::new();
    for datum in set {
        *counts
            .entry((datum.key.group, datum.key.tag))
            .or_insert(0_usize) += 1;
    }
    counts
}

/// Drop every node whose records are gone from the set. The set is
/// authoritative: what it does not carry is not written.
fn prune_tree(tree: &mut Tree, set: &MetadataSet) {
    let mut counts = record_counts(set);
    if let Some(ifd0) = tree.ifd0.as_mut() {
        prune_chain(ifd0, &mut counts);
    }
}

fn prune_chain(dir: &mut Dir, counts: &mut HashMap<(Group, u16), usize>) {
    prune_dir(dir, counts);
    if let Some(next) = dir.next.as_mut() {
        prune_chain(next, counts);
        if chain_is_empty(next) {
            dir.next = None;
        }
    }
}

fn chain_is_empty(dir: &Dir) -> bool {
    dir.chain().all(|d| d.nodes.is_empty())
}

fn prune_dir(dir: &mut Dir, counts: &mut HashMap<(Group, u16), usize>) {
    let group = dir.group;
    let mut kept = Vec::with_capacity(dir.nodes.len());
    for mut node in dir.nodes.drain(..) {
        match &mut node {
            Node::SubIfd { dirs, .. } => {
                for sub in dirs.iter_mut() {
                    prune_chain(sub, counts);
                }
                dirs.retain(|d| !chain_is_empty(d));
                if !dirs.is_empty() {
                    kept.push(node);
                }
            }
            Node::MakerNote { note, .. } => match note {
                Makernote::Ifd { dir: mn_dir, .. } => {
                    prune_chain(mn_dir, counts);
                    if !chain_is_empty(mn_dir) {
                        kept.push(node);
                    }
                }
                Makernote::Opaque => {
                    if take_count(counts, group, tags::EXIF_TAG_MAKER_NOTE) {
                        kept.push(node);
                    }
                }
            },
            Node::BinaryArray { elements, .. } => {
                elements.retain(|e| take_count(counts, e.group, e.tag));
                if !elements.is_empty() {
                    kept.push(node);
                }
            }
            _ => {
                if take_count(counts, group, node.tag()) {
                    kept.push(node);
                }
            }
        }
    }
    dir.nodes = kept;
}

fn take_count(counts: &mut HashMap<(Group, u16), usize>, group: Group, tag: u16) -> bool {
    match counts.get_mut(&(group, tag)) {
        Some(n) if *n > 0 => {
            *n -= 1;
            true
        }
        _ => false,
    }
}

/// Write every record into the tree, growing directories and the
/// group topology as needed.
fn apply_records(tree: &mut Tree, set: &MetadataSet, byte_order: Endian) {
    let mut cursor: HashMap<Key, usize> = HashMap::new();
    for datum in set {
        let nth = {
            let c = cursor.entry(datum.key).or_insert(0);
            let n = *c;
            *c += 1;
            n
        };
        if let Some(def) = canon::array_def_for_elements(datum.key.group) {
            apply_array_record(tree, def, datum.key.tag, &datum.value, byte_order);
            continue;
        }
        let dir = match ensure_dir(tree, datum.key.group, byte_order) {
            Some(dir) => dir,
            None => {
                warn!("no directory for {}, record dropped", datum.key);
                continue;
            }
        };
        let endian = dir.endian;
        let group = dir.group;
        match dir
            .nodes
            .iter_mut()
            .filter(|n| n.tag() == datum.key.tag)
            .nth(nth)
        {
            Some(node) => update_node(node, &datum.value, group, endian),
            None => dir.nodes.push(new_node(datum.key.tag, &datum.value, group, endian)),
        }
    }
}

fn entry_from_value(tag: u16, value: &Value, endian: Endian) -> Entry {
    let mut data = Vec::new();
    value.write_to_bytes(&mut data, endian);
    Entry::new(tag, value.wire_type(), value.count(), data)
}

fn update_node(node: &mut Node, value: &Value, group: Group, endian: Endian) {
    let tag = node.tag();
    let fresh = entry_from_value(tag, value, endian);
    if let Some(area) = value.data_area() {
        if let Some(tiff::DataSizeRole::Data { size_tag }) = tiff::data_size_role(group, tag) {
            *node = Node::DataEntry {
                entry: fresh,
                size_tag,
                data: area.to_vec(),
                data_pos: 0,
            };
            return;
        }
    }
    match node {
        Node::DataEntry { entry, data, .. } => {
            if let Some(area) = value.data_area() {
                *data = area.to_vec();
            }
            *entry = fresh;
        }
        Node::Entry(entry)
        | Node::SizeEntry { entry, .. }
        | Node::MakerNote { entry, .. } => *entry = fresh,
        // Structural nodes keep their shape; sub-IFD pointers are
        // regenerated from the topology.
        Node::SubIfd { .. } | Node::BinaryArray { .. } => {}
    }
}

fn new_node(tag: u16, value: &Value, group: Group, endian: Endian) -> Node {
    let entry = entry_from_value(tag, value, endian);
    match tiff::data_size_role(group, tag) {
        Some(tiff::DataSizeRole::Data { size_tag }) if value.data_area().is_some() => {
            Node::DataEntry {
                entry,
                size_tag,
                data: value.data_area().unwrap().to_vec(),
                data_pos: 0,
            }
        }
        Some(tiff::DataSizeRole::Size { data_tag }) => Node::SizeEntry { entry, data_tag },
        _ => Node::Entry(entry),
    }
}

fn apply_array_record(
    tree: &mut Tree,
    def: &'static canon::ArrayDef,
    elem_tag: u16,
    value: &Value,
    byte_order: Endian,
) {
    if elem_tag == 0 {
        warn!("array elements are numbered from 1, record dropped");
        return;
    }
    let host = match ensure_dir(tree, def.group, byte_order) {
        Some(dir) => dir,
        None => {
            warn!("no {:?} directory for the array, record dropped", def.group);
            return;
        }
    };
    let endian = def.endian.unwrap_or(host.endian);
    let pos = match host
        .nodes
        .iter()
        .position(|n| matches!(n, Node::BinaryArray { .. }) && n.tag() == def.tag)
    {
        Some(p) => p,
        None => {
            host.nodes.push(Node::BinaryArray {
                entry: Entry::new(def.tag, def.elem_type, 0, Vec::new()),
                elements: Vec::new(),
            });
            host.nodes.len() - 1
        }
    };
    if let Node::BinaryArray { elements, .. } = &mut host.nodes[pos] {
        let unit = unit_size(def.elem_type);
        // Grow with zeroed elements up to the addressed tag.
        while (elements.len() as u16) < elem_tag {
            elements.push(crate::tiff::ArrayElement {
                tag: elements.len() as u16 + 1,
                type_: def.elem_type,
                group: def.elem_group,
                endian,
                data: vec![0; unit],
            });
        }
        let mut data = Vec::new();
        value.write_to_bytes(&mut data, endian);
        data.resize(unit, 0);
        elements[elem_tag as usize - 1].data = data;
    }
}

/// Find or create the directory for `group`.
fn ensure_dir<'t>(tree: &'t mut Tree, group: Group, endian: Endian) -> Option<&'t mut Dir> {
    use Group::*;
    match group {
        Image | Thumbnail | Ifd2 | Ifd3 => {
            if tree.ifd0.is_none() {
                tree.ifd0 = Some(Dir::new(Image, endian));
            }
            chain_dir(tree.ifd0.as_mut().unwrap(), group, endian)
        }
        Photo | GpsInfo | Iop | NikonPreview | SubImage1 | SubImage2 | SubImage3 | SubImage4
        | SubImage5 | SubImage6 | SubImage7 | SubImage8 | SubImage9 | SubThumb1 => {
            let (parent, tag) = tiff::sub_ifd_tag(group)?;
            let parent_dir = ensure_dir(tree, parent, endian)?;
            Some(sub_ifd_dir(parent_dir, tag, group, endian))
        }
        Canon | Nikon1 | Nikon2 | Nikon3 | Olympus | Fuji | Panasonic | Sigma | Sony1 | Sony2
        | Minolta | Pentax | MakerNote => {
            let photo = ensure_dir(tree, Photo, endian)?;
            makernote_dir(photo, group, endian)
        }
        // These never have a place in an Exif blob.
        PanaRaw | Image2 | CanonCs | CanonSi | CanonCf => None,
    }
}

fn chain_dir<'d>(dir: &'d mut Dir, group: Group, endian: Endian) -> Option<&'d mut Dir> {
    if dir.group == group {
        return Some(dir);
    }
    if dir.next.is_none() {
        let next_group = tiff::next_group(dir.group)?;
        dir.next = Some(Box::new(Dir::new(next_group, endian)));
    }
    chain_dir(dir.next.as_mut().unwrap(), group, endian)
}

fn sub_ifd_dir<'d>(parent: &'d mut Dir, tag: u16, group: Group, endian: Endian) -> &'d mut Dir {
    let pos = match parent
        .nodes
        .iter()
        .position(|n| matches!(n, Node::SubIfd { .. }) && n.tag() == tag)
    {
        Some(p) => p,
        None => {
            parent.nodes.push(Node::SubIfd {
                entry: Entry::new(tag, TagType::Long, 1, vec![0; 4]),
                dirs: Vec::new(),
            });
            parent.nodes.len() - 1
        }
    };
    match &mut parent.nodes[pos] {
        Node::SubIfd { dirs, .. } => {
            let dpos = match dirs.iter().position(|d| d.group == group) {
                Some(d) => d,
                None => {
                    dirs.push(Dir::new(group, endian));
                    dirs.len() - 1
                }
            };
            &mut dirs[dpos]
        }
        _ => unreachable!("position matched a sub-IFD"),
    }
}

fn makernote_dir<'d>(photo: &'d mut Dir, group: Group, endian: Endian) -> Option<&'d mut Dir> {
    let pos = match photo
        .nodes
        .iter()
        .position(|n| matches!(n, Node::MakerNote { .. }))
    {
        Some(p) => p,
        None => {
            let header = MnHeader {
                kind: MnKind::Plain,
                group,
                bytes: Vec::new(),
                endian,
                base: 0,
                ifd_start: 0,
                has_next: false,
            };
            photo.nodes.push(Node::MakerNote {
                entry: Entry::new(tags::EXIF_TAG_MAKER_NOTE, TagType::Undefined, 0, Vec::new()),
                note: Makernote::Ifd {
                    header,
                    dir: Dir::new(group, endian),
                },
            });
            photo.nodes.len() - 1
        }
    };
    match &mut photo.nodes[pos] {
        Node::MakerNote { note, .. } => match note {
            Makernote::Ifd { dir, .. } => chain_find(dir, group),
            Makernote::Opaque => None,
        },
        _ => unreachable!("position matched a maker-note"),
    }
}

fn chain_find<'d>(dir: &'d mut Dir, group: Group) -> Option<&'d mut Dir> {
    if dir.group == group {
        Some(dir)
    } else {
        chain_find(dir.next.as_mut()?, group)
    }
}

// -------------------------------------------------------------------
// Serialization.

fn serialize(tree: &Tree, endian: Endian) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(endian.marker());
    bytes::put_u16(&mut out, tree.magic, endian);
    match &tree.ifd0 {
        Some(ifd0) => {
            bytes::put_u32(&mut out, 8, endian);
            write_dir(&mut out, ifd0, endian, 0);
        }
        None => {
            bytes::put_u32(&mut out, 0, endian);
        }
    }
    out
}

/// Write one directory (and its chain) at the current end of `out`.
/// Offsets inside are relative to `base`. Returns the directory's
/// offset relative to `base`.
fn write_dir(out: &mut Vec<u8>, dir: &Dir, endian: Endian, base: u32) -> u32 {
    let dir_off = out.len() as u32 - base;

    // Entries go out sorted by ascending tag, stable across
    // duplicates.
    let mut nodes: Vec<&Node> = dir.nodes.iter().collect();
    nodes.sort_by_key(|n| n.tag());

    bytes::put_u16(out, nodes.len() as u16, endian);
    let entry_area = out.len();
    for node in &nodes {
        let entry = node.entry();
        bytes::put_u16(out, entry.tag, endian);
        match node {
            Node::SubIfd { dirs, .. } => {
                bytes::put_u16(out, TagType::Long as u16, endian);
                bytes::put_u32(out, dirs.len() as u32, endian);
            }
            Node::MakerNote { .. } => {
                bytes::put_u16(out, TagType::Undefined as u16, endian);
                // Count patched once the body size is known.
                bytes::put_u32(out, 0, endian);
            }
            Node::BinaryArray { entry, elements } => {
                bytes::put_u16(out, entry.type_ as u16, endian);
                let total: usize = elements.iter().map(|e| e.data.len()).sum();
                bytes::put_u32(out, (total / unit_size(entry.type_)) as u32, endian);
            }
            _ => {
                bytes::put_u16(out, entry.type_ as u16, endian);
                bytes::put_u32(out, entry.count, endian);
            }
        }
        // Value-or-offset slot, patched below.
        out.extend_from_slice(&[0; 4]);
    }
    let next_ptr_pos = out.len();
    bytes::put_u32(out, 0, endian);

    // Payloads larger than the slot land right after the entry
    // array. Size entries get their value from the paired data
    // entry, patched after the loop so a stale inline value never
    // wins.
    let mut size_patches: Vec<(usize, TagType, u32)> = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        let slot = entry_area + 12 * i + 8;
        match node {
            Node::Entry(entry) | Node::SizeEntry { entry, .. } => {
                let pb = payload_bytes(entry, dir.endian, endian);
                place_payload(out, slot, &pb, endian, base);
            }
            Node::DataEntry { data, .. } => {
                let off = out.len() as u32 - base;
                out.extend_from_slice(data);
                bytes::patch_u32(out, slot, off, endian);
                if let Some(j) = nodes
                    .iter()
                    .position(|n| matches!(n, Node::SizeEntry { .. }) && sibling_size(node, n))
                {
                    let size_slot = entry_area + 12 * j + 8;
                    size_patches.push((size_slot, nodes[j].entry().type_, data.len() as u32));
                }
            }
            Node::BinaryArray { elements, .. } => {
                let mut pb = Vec::new();
                for elem in elements {
                    Value::from_bytes(elem.type_, &elem.data, elem.endian)
                        .write_to_bytes(&mut pb, endian);
                }
                place_payload(out, slot, &pb, endian, base);
            }
            Node::SubIfd { .. } | Node::MakerNote { .. } => {}
        }
    }
    for (slot, type_, len) in size_patches {
        match type_ {
            TagType::Short => {
                let mut tmp = Vec::new();
                bytes::put_u16(&mut tmp, len as u16, endian);
                out[slot..slot + 2].copy_from_slice(&tmp);
                out[slot + 2] = 0;
                out[slot + 3] = 0;
            }
            _ => bytes::patch_u32(out, slot, len, endian),
        }
    }

    // Children: sub-IFD directories and the maker-note body.
    for (i, node) in nodes.iter().enumerate() {
        let slot = entry_area + 12 * i + 8;
        match node {
            Node::SubIfd { dirs, .. } => {
                if dirs.len() == 1 {
                    let off = write_dir(out, &dirs[0], endian, base);
                    bytes::patch_u32(out, slot, off, endian);
                } else {
                    // The offset array itself is a payload.
                    let array_off = out.len() as u32 - base;
                    let array_pos = out.len();
                    for _ in dirs {
                        bytes::put_u32(out, 0, endian);
                    }
                    bytes::patch_u32(out, slot, array_off, endian);
                    for (k, sub) in dirs.iter().enumerate() {
                        let off = write_dir(out, sub, endian, base);
                        bytes::patch_u32(out, array_pos + 4 * k, off, endian);
                    }
                }
            }
            Node::MakerNote { note, .. } => {
                let count_pos = entry_area + 12 * i + 4;
                match note {
                    Makernote::Ifd { header, dir: mn_dir } => {
                        let mn_pos = out.len() as u32;
                        let body_endian = match header.kind {
                            MnKind::Fuji => Endian::Little,
                            _ => endian,
                        };
                        header.write(out, body_endian);
                        let ifd_off = header.encoded_ifd_offset();
                        while (out.len() as u32) < mn_pos + ifd_off {
                            out.push(0);
                        }
                        let mn_base = match header.encoded_base() {
                            Some(rel) => mn_pos + rel,
                            None => base,
                        };
                        write_dir(out, mn_dir, body_endian, mn_base);
                        let len = out.len() as u32 - mn_pos;
                        bytes::patch_u32(out, count_pos, len, endian);
                        bytes::patch_u32(out, slot, mn_pos - base, endian);
                    }
                    Makernote::Opaque => {
                        let entry = node.entry();
                        let pb = payload_bytes(entry, dir.endian, endian);
                        bytes::patch_u32(out, count_pos, pb.len() as u32, endian);
                        place_payload(out, slot, &pb, endian, base);
                    }
                }
            }
            _ => {}
        }
    }

    // The next pointer is written last.
    if let Some(next) = &dir.next {
        let off = write_dir(out, next, endian, base);
        bytes::patch_u32(out, next_ptr_pos, off, endian);
    }

    dir_off
}

/// Element bytes converted from the stored order to the target one.
fn payload_bytes(entry: &Entry, stored: Endian, target: Endian) -> Vec<u8> {
    let mut pb = Vec::new();
    Value::from_bytes(entry.type_, &entry.data, stored).write_to_bytes(&mut pb, target);
    pb
}

/// Inline when it fits the slot, else appended with the slot holding
/// the offset.
fn place_payload(out: &mut Vec<u8>, slot: usize, pb: &[u8], endian: Endian, base: u32) {
    if pb.len() <= 4 {
        out[slot..slot + pb.len()].copy_from_slice(pb);
    } else {
        let off = out.len() as u32 - base;
        out.extend_from_slice(pb);
        bytes::patch_u32(out, slot, off, endian);
    }
}

fn sibling_size(data_node: &Node, candidate: &Node) -> bool {
    match data_node {
        Node::DataEntry { size_tag, .. } => candidate.tag() == *size_tag,
        _ => false,
    }
}

// -------------------------------------------------------------------
// The filter cascade.

/// Round one: IFD0 tags JPEG does not record, and the manufactured
/// Canon AF tags that must never be written.
fn filter_ifd0_tags(set: &mut MetadataSet) {
    const IFD0_TAGS: [u16; 7] = [
        tags::EXIF_TAG_PHOTOMETRIC_INTERPRETATION,
        tags::EXIF_TAG_STRIP_OFFSETS,
        tags::EXIF_TAG_ROWS_PER_STRIP,
        tags::EXIF_TAG_STRIP_BYTE_COUNTS,
        tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT,
        tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT_LENGTH,
        tags::EXIF_TAG_SUB_IFDS,
    ];
    for tag in IFD0_TAGS {
        let key = Key::exif(Group::Image, tag);
        if set.erase_if(|d| d.key == key) > 0 {
            warn!("Exif tag {} not encoded", key);
        }
    }
    for tag in tags::CANON_TAG_AF_INFO_SIZE..=tags::CANON_TAG_AF_FINE_ROTATION {
        let key = Key::exif(Group::Canon, tag);
        if set.erase_if(|d| d.key == key) > 0 {
            warn!("Exif tag {} not encoded", key);
        }
    }
}

/// Round two: whole IFDs that do not occur in JPEGs.
fn filter_ifds(set: &mut MetadataSet) {
    const FILTERED: [Group; 13] = [
        Group::SubImage1,
        Group::SubImage2,
        Group::SubImage3,
        Group::SubImage4,
        Group::SubImage5,
        Group::SubImage6,
        Group::SubImage7,
        Group::SubImage8,
        Group::SubImage9,
        Group::SubThumb1,
        Group::PanaRaw,
        Group::Ifd2,
        Group::Ifd3,
    ];
    for group in FILTERED {
        if set.erase_group(group) > 0 {
            warn!("Exif IFD {} not encoded", group.name());
        }
    }
}

/// One step of the preview cascade.
enum Ptt {
    /// A length tag; its value sum over the limit arms the drop and
    /// removes the tag.
    Len(Group, u16),
    /// A tag removed while the drop is armed.
    Tag(Group, u16),
    /// A whole IFD removed while the drop is armed.
    Ifd(Group),
}

/// Round three: walk the preview cascade. Each run of steps belongs
/// to one preview; the first length tag over the limit arms the
/// drops that follow it.
fn filter_previews(set: &mut MetadataSet) {
    use Ptt::*;
    let steps = [
        Len(Group::Minolta, tags::MINOLTA_TAG_THUMBNAIL_LENGTH),
        Tag(Group::Minolta, tags::MINOLTA_TAG_THUMBNAIL_OFFSET),
        Len(Group::Minolta, tags::MINOLTA_TAG_THUMBNAIL),
        Len(
            Group::NikonPreview,
            tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT_LENGTH,
        ),
        Ifd(Group::NikonPreview),
        Len(Group::Olympus, tags::OLYMPUS_TAG_THUMBNAIL_LENGTH),
        Tag(Group::Olympus, tags::OLYMPUS_TAG_THUMBNAIL_OFFSET),
        Len(Group::Olympus, tags::OLYMPUS_TAG_THUMBNAIL_IMAGE),
        Len(Group::Olympus, tags::OLYMPUS_TAG_THUMBNAIL),
        Len(Group::Pentax, tags::PENTAX_TAG_PREVIEW_LENGTH),
        Tag(Group::Pentax, tags::PENTAX_TAG_PREVIEW_OFFSET),
        Tag(Group::Pentax, tags::PENTAX_TAG_PREVIEW_RESOLUTION),
        Len(Group::Thumbnail, tags::EXIF_TAG_STRIP_BYTE_COUNTS),
        Ifd(Group::Thumbnail),
        Len(
            Group::Thumbnail,
            tags::EXIF_TAG_JPEG_INTERCHANGE_FORMAT_LENGTH,
        ),
        Ifd(Group::Thumbnail),
    ];
    let mut del = false;
    for step in steps {
        match step {
            Len(group, tag) => {
                del = false;
                let key = Key::exif(group, tag);
                let over = set
                    .find_key(&key)
                    .map(|d| d.value.sum() > PREVIEW_LIMIT)
                    .unwrap_or(false);
                if over {
                    del = true;
                    warn!("Exif tag {} not encoded", key);
                    set.erase_key(&key);
                }
            }
            Tag(group, tag) => {
                if del {
                    let key = Key::exif(group, tag);
                    if set.erase_key(&key) {
                        warn!("Exif tag {} not encoded", key);
                    }
                }
            }
            Ifd(group) => {
                if del && set.erase_group(group) > 0 {
                    warn!("Exif IFD {} not encoded", group.name());
                }
            }
        }
    }
}

/// Round four: nameless tags over 4 KiB, any tag over 20 KiB. The
/// data area counts: that is what lands in the output.
fn filter_oversize_tags(set: &mut MetadataSet) {
    set.erase_if(|d| {
        let size = d.value.size() + d.value.data_area().map(|a| a.len()).unwrap_or(0);
        let unknown = tag_name(d.key.group, d.key.tag).is_none();
        if (size > UNKNOWN_TAG_LIMIT && unknown) || size > ANY_TAG_LIMIT {
            warn!("Exif tag {} not encoded", d.key);
            true
        } else {
            false
        }
    });
}
