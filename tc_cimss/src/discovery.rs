/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

//! active storm discovery from the ADT index page. The page is hand-maintained
//! HTML - we scan all anchors pointing at storm detail pages (`odt28W.html`)
//! instead of assuming any table layout, then visit each detail page for the
//! history file and satellite image links. An empty result set is a valid
//! outcome (no active storms), and per-storm detail failures only skip that
//! storm for the cycle.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use tc_store::Basin;

use crate::CimssConfig;

lazy_static! {
    // anchors to storm detail pages, capturing href, code and the anchor text
    static ref DETAIL_LINK_RE: Regex =
        Regex::new( r#"(?s)<a[^>]*href="(odt(\d{2}[A-Z])\.html)"[^>]*>(.*?)</a>"#).unwrap();

    // history file link on a detail page
    static ref HISTORY_LINK_RE: Regex =
        Regex::new( r#"href="([^"]*?(\d{2}[A-Z])-list\.txt)""#).unwrap();

    static ref TAG_RE: Regex = Regex::new( r"<[^>]*>").unwrap();
}

/// the fields a discovery cycle yields per active storm
#[derive(Debug,Clone,PartialEq)]
pub struct DiscoveredStorm {
    pub upstream_code: String,
    pub basin: Basin,
    pub display_name: Option<String>,
    pub history_url: String,
    pub satellite_image_url: Option<String>,
}

/// a storm link found on the index page, before its detail page is visited
#[derive(Debug,Clone,PartialEq)]
pub struct IndexEntry {
    pub code: String,
    pub link_text: String,
    pub detail_href: String,
}

/// scan the index page for storm detail links. Duplicate codes collapse to the
/// first occurrence.
pub fn parse_index_page (html: &str) -> Vec<IndexEntry> {
    let mut entries: Vec<IndexEntry> = Vec::new();

    for cap in DETAIL_LINK_RE.captures_iter( html) {
        let code = cap[2].to_string();
        if entries.iter().any( |e| e.code == code) { continue }

        let link_text = TAG_RE.replace_all( &cap[3], " ").trim().to_string();
        entries.push( IndexEntry { code, link_text, detail_href: cap[1].to_string() });
    }

    debug!("index page lists {} storms", entries.len());
    entries
}

/// extract history/satellite links from a storm detail page. Returns None if
/// the page carries no history file link (the storm is skipped this cycle).
pub fn parse_detail_page (html: &str, entry: &IndexEntry, config: &CimssConfig) -> Option<DiscoveredStorm> {
    let cap = HISTORY_LINK_RE.captures( html)?;
    let history_url = config.resolve( &cap[1]);
    let code = cap[2].to_string();

    if code != entry.code {
        warn!("detail page history link {} does not match storm {}", &cap[1], entry.code);
    }

    let basin = match Basin::from_code_suffix( entry.code.chars().last()?) {
        Some(b) => b,
        None => {
            warn!("no basin mapping for storm code {}", entry.code);
            return None
        }
    };

    Some( DiscoveredStorm {
        upstream_code: entry.code.clone(),
        basin,
        display_name: derive_display_name( &entry.link_text, &entry.code),
        history_url,
        satellite_image_url: find_satellite_image( html, &entry.code, config),
    })
}

fn find_satellite_image (html: &str, code: &str, config: &CimssConfig) -> Option<String> {
    // prefer an explicit GIF link, fall back to an inline image carrying the code
    let gif_re = Regex::new( &format!( r#"href="([^"]*{code}[^"]*\.GIF)""#)).ok()?;
    if let Some(cap) = gif_re.captures( html) {
        return Some( config.resolve( &cap[1]))
    }

    let img_re = Regex::new( &format!( r#"<img[^>]*src="([^"]*{code}[^"]*)""#)).ok()?;
    img_re.captures( html).map( |cap| config.resolve( &cap[1]))
}

const NAME_PREFIXES: [&str; 5] = [
    "Tropical Storm", "Hurricane", "Typhoon", "Cyclone", "Tropical Depression",
];

const NON_NAMES: [&str; 3] = ["UNNAMED", "INVEST", "TD"];

/// derive the human storm name from the index link text by stripping the storm
/// class prefix and the upstream code. Placeholder names map to None.
pub fn derive_display_name (link_text: &str, code: &str) -> Option<String> {
    let mut text = link_text.to_string();
    for prefix in NAME_PREFIXES {
        text = text.replace( prefix, "");
    }
    text = text.replace( code, "");

    let text = text.trim_matches( |c: char| c.is_whitespace() || c == '-' || c == ':').trim();
    if text.is_empty() { return None }

    let name = text.to_uppercase();
    if NON_NAMES.contains( &name.as_str()) { return None }
    Some( name)
}
