// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * exifkit - tiff/decoder.rs
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

//! Walk the composite tree and emit the flat record set.
//!
//! The visit is depth first in document order, so the set's
//! insertion order is the document order of the blob. Sub-IFD and
//! maker-note pointer entries are structural and not emitted; the
//! encoder re-creates them from the group topology.

use crate::makernote::Makernote;
use crate::metadata::{tag_name, Key, MetadataSet, Metadatum};
use crate::tiff::{Dir, Node, Tree};
use crate::value::Value;

/// Decode options.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeOptions {
    /// Skip tags without a dictionary name whose payload exceeds
    /// this many bytes. Unset emits everything.
    pub skip_unknown_over: Option<usize>,
}

pub(crate) fn decode_tree(tree: &Tree) -> MetadataSet {
    decode_tree_with(tree, &DecodeOptions::default())
}

pub(crate) fn decode_tree_with(tree: &Tree, opts: &DecodeOptions) -> MetadataSet {
    let mut set = MetadataSet::new();
    if let Some(ifd0) = &tree.ifd0 {
        for dir in ifd0.chain() {
            decode_dir(dir, opts, &mut set);
        }
    }
    set
}

fn decode_dir(dir: &Dir, opts: &DecodeOptions, set: &mut MetadataSet) {
    for (idx, node) in dir.nodes.iter().enumerate() {
        match node {
            Node::Entry(entry) => {
                if let Some(limit) = opts.skip_unknown_over {
                    if entry.data.len() > limit && tag_name(dir.group, entry.tag).is_none() {
                        continue;
                    }
                }
                set.push(Metadatum {
                    key: Key::exif(dir.group, entry.tag),
                    value: entry.value(dir.endian),
                    idx,
                });
            }
            Node::DataEntry { entry, data, .. } => {
                let mut value = entry.value(dir.endian);
                value.set_data_area(data.clone());
                set.push(Metadatum {
                    key: Key::exif(dir.group, entry.tag),
                    value,
                    idx,
                });
            }
            Node::SizeEntry { entry, .. } => {
                set.push(Metadatum {
                    key: Key::exif(dir.group, entry.tag),
                    value: entry.value(dir.endian),
                    idx,
                });
            }
            Node::SubIfd { dirs, .. } => {
                for sub in dirs {
                    for chained in sub.chain() {
                        decode_dir(chained, opts, set);
                    }
                }
            }
            Node::MakerNote { entry, note } => match note {
                Makernote::Ifd { dir: mn_dir, .. } => {
                    for chained in mn_dir.chain() {
                        decode_dir(chained, opts, set);
                    }
                }
                Makernote::Opaque => {
                    set.push(Metadatum {
                        key: Key::exif(dir.group, entry.tag),
                        value: entry.value(dir.endian),
                        idx,
                    });
                }
            },
            Node::BinaryArray { elements, .. } => {
                for (elem_idx, elem) in elements.iter().enumerate() {
                    set.push(Metadatum {
                        key: Key::exif(elem.group, elem.tag),
                        value: Value::from_bytes(elem.type_, &elem.data, elem.endian),
                        idx: elem_idx,
                    });
                }
            }
        }
    }
}
