use serde::{Deserialize, Serialize};

/// One of the four seasons a game-day can fall in.
///
/// Species catalogs carry a modifier table per season plus an `all-season`
/// base table; the serialized names match those table keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A contiguous run of days belonging to one season. The global config holds
/// an ordered list of these; the year is their concatenation, repeated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonSpan {
    pub season: Season,
    pub length_days: u64,
}

/// The season a given day counter falls in.
///
/// Day `1` is the first day of the first span; the cycle repeats after the
/// spans are exhausted. Day `0` (a world that has never ticked) also maps to
/// the first span.
pub fn season_on_day(spans: &[SeasonSpan], day: u64) -> Season {
    assert!(!spans.is_empty(), "season table cannot be empty");
    let year_length: u64 = spans.iter().map(|s| s.length_days).sum();
    assert!(year_length > 0, "season table cannot be all zero-length");

    let mut remaining = day;
    while remaining > year_length {
        remaining -= year_length;
    }
    for span in spans {
        if remaining <= span.length_days {
            return span.season;
        }
        remaining -= span.length_days;
    }
    // remaining == 0 after the modulo walk; treat as the start of a cycle.
    spans[0].season
}
