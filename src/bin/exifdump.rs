// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * exifkit - bin/exifdump.rs
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

use getopts::Options;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use exifkit::{ciff, tiff};

pub fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut opts = Options::new();
    opts.optflag("d", "", "Debug");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => panic!("{}", f.to_string()),
    };

    let loglevel = if matches.opt_present("d") {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    };
    SimpleLogger::new()
        .with_module_level("exifkit", loglevel)
        .init()
        .unwrap();

    for name in matches.free.iter() {
        process_file(name);
    }
}

fn type_to_string(t: exifkit::TagType) -> &'static str {
    t.into()
}

fn process_file(p: &str) {
    let blob = match std::fs::read(p) {
        Ok(blob) => blob,
        Err(err) => {
            eprintln!("{}: {}", p, err);
            return;
        }
    };

    // CRW carries its signature at offset 6, TIFF is told by its
    // header alone.
    let decoded = if blob.len() >= 14 && &blob[6..14] == b"HEAPCCDR" {
        ciff::decode(&blob)
    } else {
        tiff::decode(&blob)
    };

    match decoded {
        Ok((set, endian)) => {
            log::info!("{}: byte order {:?}, {} records", p, endian, set.len());
            for datum in &set {
                println!(
                    "{:<44} {:<10} {:>4}  {}",
                    datum.key.to_string(),
                    type_to_string(datum.value.tag_type()),
                    datum.value.count(),
                    datum.value
                );
            }
        }
        Err(err) => eprintln!("{}: {}", p, err),
    }
}
