use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Display names for greenhouse locations
// ---------------------------------------------------------------------------

/// Verbose qualifier in raw identifiers and its on-screen replacement.
const VERBOSE_QUALIFIER: &str = "West Cool Wall";
const SHORT_QUALIFIER: &str = "West";

/// Shorten a raw location identifier for display.
pub fn shorten(raw: &str) -> String {
    raw.replace(VERBOSE_QUALIFIER, SHORT_QUALIFIER)
}

/// Two-way lookup between raw location identifiers and their display names.
///
/// Built once from the distinct raw identifiers of the loaded table. When two
/// raw identifiers would shorten to the same text, the later one keeps its raw
/// text as its display name, or its raw text plus a ` (n)` counter when that
/// is taken too. Every display name resolves to exactly one raw identifier.
#[derive(Debug, Clone, Default)]
pub struct LocationMap {
    /// (display, raw) in raw-identifier order.
    entries: Vec<(String, String)>,
    by_display: BTreeMap<String, usize>,
    by_raw: BTreeMap<String, usize>,
}

impl LocationMap {
    pub fn new<I, S>(raw_locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut raws: Vec<String> = raw_locations
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        raws.sort();
        raws.dedup();

        let mut map = LocationMap::default();

        // Identifiers that are already short claim their own names first, so a
        // verbose sibling never displaces them.
        let reserved: std::collections::BTreeSet<&str> = raws
            .iter()
            .filter(|r| shorten(r) == **r)
            .map(String::as_str)
            .collect();

        for raw in &raws {
            let taken = |name: &str| reserved.contains(name) || map.by_display.contains_key(name);
            let short = shorten(raw);
            let display = if short == *raw || !taken(short.as_str()) {
                short
            } else if !taken(raw.as_str()) {
                log::warn!("display name '{short}' is ambiguous, showing '{raw}' unshortened");
                raw.clone()
            } else {
                let numbered = (2usize..)
                    .map(|n| format!("{raw} ({n})"))
                    .find(|candidate| !taken(candidate.as_str()))
                    .unwrap_or_else(|| raw.clone());
                log::warn!("display names '{short}' and '{raw}' are both taken, showing '{numbered}'");
                numbered
            };

            let idx = map.entries.len();
            map.by_display.insert(display.clone(), idx);
            map.by_raw.insert(raw.clone(), idx);
            map.entries.push((display, raw.clone()));
        }
        map
    }

    /// Display names in raw-identifier order (the selector's option list).
    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(display, _)| display.as_str())
    }

    pub fn raw_for(&self, display: &str) -> Option<&str> {
        self.by_display
            .get(display)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn display_for(&self, raw: &str) -> Option<&str> {
        self.by_raw.get(raw).map(|&i| self.entries[i].0.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
