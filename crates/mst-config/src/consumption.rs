//! Unused-key lint.
//!
//! "Consumed pointers" are JSON Pointer prefixes. A leaf under any consumed
//! prefix counts as read; every other leaf is reported as unused. The
//! registry depends on the calendar source, since the alpaca block is only
//! read when that source is selected.
//!
//! Keep the registry to what the code ACTUALLY reads. Do not consume whole
//! sections speculatively.

use std::collections::BTreeSet;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collect_leaf_pointers;
use crate::settings::CalendarSourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    pub source: String,
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique)
    pub consumed_prefixes: Vec<String>,
    /// Unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

// Reads in TimerConfig::from_json.
static COMMON: &[&str] = &[
    "/exchange/name",
    "/exchange/timezone",
    "/calendar/source",
    "/calendar/query_timeout_secs",
    "/timer/tick_interval_ms",
];

// Only acted on when calendar.source = alpaca.
static ALPACA: &[&str] = &[
    "/calendar/alpaca/base_url",
    "/calendar/alpaca/keys_env/api_key",
    "/calendar/alpaca/keys_env/api_secret",
];

pub fn consumed_pointers_for_source(source: CalendarSourceKind) -> Vec<&'static str> {
    let mut out = COMMON.to_vec();
    if source == CalendarSourceKind::Alpaca {
        out.extend_from_slice(ALPACA);
    }
    out
}

/// With `Fail`, unused keys are an error; with `Warn` the report is returned
/// and the caller decides how loudly to complain.
pub fn report_unused_keys(
    source: CalendarSourceKind,
    config_json: &Value,
    policy: UnusedKeyPolicy,
) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<String> = consumed_pointers_for_source(source)
        .into_iter()
        .map(normalize_pointer)
        .collect();
    let consumed_prefixes: Vec<String> = consumed.into_iter().collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|lp| !consumed_prefixes.iter().any(|cp| is_prefix_pointer(cp, lp)))
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        source: source.as_str().to_string(),
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS (source={}): {} unused config leaf key(s) detected. \
            Remove them or update the consumed registry. First few: {}",
            report.source,
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }

    Ok(report)
}

fn normalize_pointer(p: &str) -> String {
    let mut s = p.trim().to_string();
    if s.is_empty() {
        return "/".to_string();
    }
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    while s.ends_with('/') && s.len() > 1 {
        s.pop();
    }
    s
}

/// "/a/b" consumes "/a/b" and "/a/b/c" but not "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    leaf.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('/'))
}

fn preview_list(items: &[String], n: usize) -> String {
    let take = items.iter().take(n).collect::<Vec<_>>();
    format!("{:?}", take)
}
