// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Text reports

use std::fmt::Write;

use crate::{AbbreviationTable, RankedProjections, Result};

/// Top `top_n` projections as `strength \t full name` lines
///
/// The header is `INPUTS:` or `OUTPUTS:`. Rank `i` of every injection site
/// is printed before rank `i + 1`, sites in matrix order. `top_n` is clamped
/// to the number of ranked entries.
///
/// # Errors
///
/// `AbbreviationNotFound` if a listed region has no full name
pub fn format_report(ranked: &RankedProjections, table: &AbbreviationTable, top_n: usize) -> Result<String> {
    let depth = top_n.min(ranked.depth());

    let site_names = ranked
        .sites
        .iter()
        .map(|site| table.names_from_abbrevs(site.regions().take(depth)))
        .collect::<Result<Vec<_>>>()?;

    let mut out = String::new();
    out.push_str(ranked.direction.label());
    out.push('\n');

    for i in 0..depth {
        for (site, names) in ranked.sites.iter().zip(&site_names) {
            if let (Some(p), Some(name)) = (site.projections.get(i), names.get(i)) {
                // Writing to a String cannot fail
                let _ = writeln!(out, "{:.2} \t {}", p.strength, name);
            }
        }
    }

    Ok(out)
}

/// Comma-separated region list, greedily wrapped at `width` columns
///
/// Words longer than `width` are broken across lines.
pub fn wrap_region_list<S: AsRef<str>>(regions: &[S], width: usize) -> String {
    let joined = regions
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");
    textwrap::fill(&joined, width)
}
