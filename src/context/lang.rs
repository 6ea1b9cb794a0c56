//! Accept-Language parsing and ranking.

use std::cmp::Ordering;
use std::fmt;

/// One language range with its quality weight.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptLanguage {
    pub language: String,
    pub quality: f32,
}

/// Language preferences ranked by descending quality.
///
/// Entries with equal quality keep their original header order (the sort is
/// stable). Quality values are used as parsed and intentionally not clamped
/// to `[0, 1]`; a missing or unparsable `q` defaults to `1.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageRanking(Vec<AcceptLanguage>);

impl LanguageRanking {
    /// Parse an `Accept-Language` header value. A missing header yields an
    /// empty ranking.
    pub fn parse(header: Option<&str>) -> Self {
        let Some(header) = header.filter(|h| !h.is_empty()) else {
            return LanguageRanking::default();
        };

        let mut entries: Vec<AcceptLanguage> = header
            .split(',')
            .map(|range| {
                let range = range.trim();
                match range.split_once(";q=") {
                    Some((language, quality)) => AcceptLanguage {
                        language: language.to_string(),
                        quality: quality.parse().unwrap_or(1.0),
                    },
                    None => AcceptLanguage {
                        language: range.to_string(),
                        quality: 1.0,
                    },
                }
            })
            .collect();

        entries.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
        LanguageRanking(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AcceptLanguage> {
        self.0.iter()
    }

    /// The highest-ranked language, if any.
    pub fn preferred(&self) -> Option<&str> {
        self.0.first().map(|l| l.language.as_str())
    }
}

impl fmt::Display for LanguageRanking {
    /// Renders as `"en (1.0), fr (0.9)"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} ({:.1})", entry.language, entry.quality)?;
        }
        Ok(())
    }
}
