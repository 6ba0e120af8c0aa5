//! Patch selection for a single build job.
//!
//! A [`PatchSet`] is an ordered list of include/exclude tokens that is handed
//! to the engine as `-i <name>` / `-e <name>` pairs. Tokens are never
//! deduplicated: the engine tolerates repeats, and toggling a name flips every
//! occurrence of it at once.
//!
//! # Example
//!
//! ```rust
//! use apkpatch::patches::{Disposition, PatchSet};
//!
//! let mut patches = PatchSet::new();
//! patches.include("custom-branding");
//! patches.exclude("hide-shorts");
//!
//! assert!(patches.invert("Custom Branding"));
//! assert_eq!(patches.tokens()[0].disposition, Disposition::Exclude);
//! assert_eq!(patches.excluded_names(), ["hide-shorts"]);
//! ```

use std::fmt;

/// Engine flag for an included patch.
pub const INCLUDE_FLAG: &str = "-i";
/// Engine flag for an excluded patch.
pub const EXCLUDE_FLAG: &str = "-e";

/// Whether a patch is applied or skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    Include,
    Exclude,
}

impl Disposition {
    /// The engine flag for this disposition.
    pub fn flag(self) -> &'static str {
        match self {
            Disposition::Include => INCLUDE_FLAG,
            Disposition::Exclude => EXCLUDE_FLAG,
        }
    }

    /// The opposite disposition.
    pub fn inverted(self) -> Self {
        match self {
            Disposition::Include => Disposition::Exclude,
            Disposition::Exclude => Disposition::Include,
        }
    }
}

/// A single (disposition, name) entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchToken {
    pub disposition: Disposition,
    pub name: String,
}

impl PatchToken {
    pub fn include(name: impl Into<String>) -> Self {
        Self {
            disposition: Disposition::Include,
            name: name.into(),
        }
    }

    pub fn exclude(name: impl Into<String>) -> Self {
        Self {
            disposition: Disposition::Exclude,
            name: name.into(),
        }
    }
}

impl fmt::Display for PatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.disposition.flag(), self.name)
    }
}

/// Normalize a user-facing patch name to the engine's slug form.
///
/// `"Hide Shorts Button"` becomes `"hide-shorts-button"`.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Flatten tokens into `-i|-e <name>` argument pairs.
pub fn to_args(tokens: &[PatchToken]) -> Vec<String> {
    tokens
        .iter()
        .flat_map(|t| [t.disposition.flag().to_string(), t.name.clone()])
        .collect()
}

/// Include/exclude state of every patch for one build job.
#[derive(Debug, Clone, Default)]
pub struct PatchSet {
    tokens: Vec<PatchToken>,
    excluded: Vec<String>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an include token. Duplicates are kept.
    pub fn include(&mut self, name: impl Into<String>) {
        self.tokens.push(PatchToken::include(name));
    }

    /// Append an exclude token and record the name in the excluded history.
    pub fn exclude(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.excluded.contains(&name) {
            self.excluded.push(name.clone());
        }
        self.tokens.push(PatchToken::exclude(name));
    }

    /// Names ever explicitly excluded, in first-exclusion order.
    ///
    /// Not revised by [`invert`](Self::invert) or
    /// [`exclude_all`](Self::exclude_all).
    pub fn excluded_names(&self) -> &[String] {
        &self.excluded
    }

    /// The full ordered token sequence.
    pub fn tokens(&self) -> &[PatchToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Flip the disposition of every token named `name` (after normalization).
    ///
    /// Returns `false` without touching anything when no token matches.
    pub fn invert(&mut self, name: &str) -> bool {
        let name = normalize_name(name);
        let mut matched = false;

        for token in self.tokens.iter_mut().filter(|t| t.name == name) {
            token.disposition = token.disposition.inverted();
            matched = true;
        }

        if matched {
            tracing::debug!(patch = %name, "toggled patch disposition");
        }
        matched
    }

    /// Turn every include token into an exclude token, in place.
    pub fn exclude_all(&mut self) {
        for token in &mut self.tokens {
            token.disposition = Disposition::Exclude;
        }
    }

    /// The token sequence to send to the engine.
    ///
    /// In CI mode every include is rendered as an exclude. The set itself is
    /// left untouched, so rendering twice gives the same answer.
    pub fn rendered(&self, ci_mode: bool) -> Vec<PatchToken> {
        if !ci_mode {
            return self.tokens.clone();
        }
        self.tokens
            .iter()
            .map(|t| PatchToken::exclude(t.name.clone()))
            .collect()
    }
}
