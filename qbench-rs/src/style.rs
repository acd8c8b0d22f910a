//! Deterministic series styling.
//!
//! A [`StyleTable`] maps an implementation identity and allocation mode to a
//! [`Style`]. The table is a plain value passed into the grouper, so tests and
//! callers can substitute their own colors.

use crate::record::AllocMode;
use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Marker {
    Circle,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Style {
    pub color: Rgb,
    pub line: LineStyle,
    pub marker: Marker,
    /// Stroke width in pixels
    pub weight: u32,
}

/// Color pair for one implementation: lighter for heap, darker for pooled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub heap: Rgb,
    pub pooled: Rgb,
}

impl Palette {
    pub const fn new(heap: Rgb, pooled: Rgb) -> Self {
        Self { heap, pooled }
    }

    pub fn style(&self, mode: AllocMode) -> Style {
        match mode {
            AllocMode::Heap => Style {
                color: self.heap,
                line: LineStyle::Dashed,
                marker: Marker::Triangle,
                weight: 2,
            },
            AllocMode::Pooled => Style {
                color: self.pooled,
                line: LineStyle::Solid,
                marker: Marker::Circle,
                weight: 3,
            },
        }
    }
}

const HAZARD_POINTER: Palette = Palette::new(Rgb(158, 202, 225), Rgb(31, 119, 180));
const EBR: Palette = Palette::new(Rgb(253, 174, 107), Rgb(230, 85, 13));
const MUTEX: Palette = Palette::new(Rgb(252, 146, 114), Rgb(203, 24, 29));
const NO_RECLAMATION: Palette = Palette::new(Rgb(161, 217, 155), Rgb(35, 139, 69));

/// Used for unknown identities; none of these appear among the known entries.
const FALLBACK: [Palette; 5] = [
    Palette::new(Rgb(188, 189, 220), Rgb(117, 107, 177)),
    Palette::new(Rgb(196, 156, 148), Rgb(140, 86, 75)),
    Palette::new(Rgb(247, 182, 210), Rgb(227, 119, 194)),
    Palette::new(Rgb(219, 219, 141), Rgb(188, 189, 34)),
    Palette::new(Rgb(158, 218, 229), Rgb(23, 190, 207)),
];

/// Last resort when a table is built with an empty fallback list.
const GRAY: Palette = Palette::new(Rgb(189, 189, 189), Rgb(99, 99, 99));

#[derive(Debug, Clone)]
pub struct StyleTable {
    entries: FxHashMap<String, Palette>,
    fallback: Vec<Palette>,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::empty()
            .with_entry(&["HazardPointer", "HazardPointers", "hp"], HAZARD_POINTER)
            .with_entry(&["EBR", "EpochBasedReclamation", "epoch"], EBR)
            .with_entry(&["MutexQueue", "mutex"], MUTEX)
            .with_entry(&["NoReclamation", "none"], NO_RECLAMATION)
    }
}

impl StyleTable {
    /// A table with no known identities; everything gets a fallback palette.
    pub fn empty() -> Self {
        Self {
            entries: FxHashMap::default(),
            fallback: FALLBACK.to_vec(),
        }
    }

    /// Register a palette under one or more identity spellings.
    pub fn with_entry(mut self, names: &[&str], palette: Palette) -> Self {
        for name in names {
            self.entries.insert(normalize(name), palette);
        }
        self
    }

    pub fn with_fallback(mut self, fallback: Vec<Palette>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn is_known(&self, implementation: &str) -> bool {
        self.entries.contains_key(&normalize(implementation))
    }

    pub fn palette(&self, implementation: &str) -> Palette {
        let key = normalize(implementation);
        if let Some(palette) = self.entries.get(&key) {
            return *palette;
        }
        if self.fallback.is_empty() {
            return GRAY;
        }
        // FxHasher is unseeded, so the pick is the same on every run
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        self.fallback[(hasher.finish() % self.fallback.len() as u64) as usize]
    }

    pub fn style(&self, implementation: &str, mode: AllocMode) -> Style {
        self.palette(implementation).style(mode)
    }
}

/// Case and separators are ignored: "Hazard_Pointer" and "hazardpointer" match.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}
