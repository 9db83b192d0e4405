//! Canonical level labels and their short codes.
//!
//! The table is fixed. Both lookup directions are built once on first use.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Suffix marking the confirmed/extended variant of a level.
pub const CE_SUFFIX: &str = "CE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LevelLabel {
    PutDominate,
    CallDominate,
    GammaFlip,
    PutWall,
    CallWall,
    KeyDelta,
    LargeGamma,
    GammaField,
    ImpliedMoveUp,
    ImpliedMoveDown,
    ImpliedMoveUp2,
    ImpliedMoveDown2,
}

impl LevelLabel {
    pub const ALL: [LevelLabel; 12] = [
        LevelLabel::PutDominate,
        LevelLabel::CallDominate,
        LevelLabel::GammaFlip,
        LevelLabel::PutWall,
        LevelLabel::CallWall,
        LevelLabel::KeyDelta,
        LevelLabel::LargeGamma,
        LevelLabel::GammaField,
        LevelLabel::ImpliedMoveUp,
        LevelLabel::ImpliedMoveDown,
        LevelLabel::ImpliedMoveUp2,
        LevelLabel::ImpliedMoveDown2,
    ];

    pub fn long_name(self) -> &'static str {
        match self {
            LevelLabel::PutDominate => "Put Dominate",
            LevelLabel::CallDominate => "Call Dominate",
            LevelLabel::GammaFlip => "Gamma Flip",
            LevelLabel::PutWall => "Put Wall",
            LevelLabel::CallWall => "Call Wall",
            LevelLabel::KeyDelta => "Key Delta",
            LevelLabel::LargeGamma => "Large Gamma",
            LevelLabel::GammaField => "Gamma Field",
            LevelLabel::ImpliedMoveUp => "Implied Movement +\u{03c3}",
            LevelLabel::ImpliedMoveDown => "Implied Movement -\u{03c3}",
            LevelLabel::ImpliedMoveUp2 => "Implied Movement +2\u{03c3}",
            LevelLabel::ImpliedMoveDown2 => "Implied Movement -2\u{03c3}",
        }
    }

    pub fn short_code(self) -> &'static str {
        match self {
            LevelLabel::PutDominate => "PD",
            LevelLabel::CallDominate => "CD",
            LevelLabel::GammaFlip => "GF",
            LevelLabel::PutWall => "PW",
            LevelLabel::CallWall => "CW",
            LevelLabel::KeyDelta => "KD",
            LevelLabel::LargeGamma => "LG",
            LevelLabel::GammaField => "GFL",
            LevelLabel::ImpliedMoveUp => "IM+",
            LevelLabel::ImpliedMoveDown => "IM-",
            LevelLabel::ImpliedMoveUp2 => "IM2+",
            LevelLabel::ImpliedMoveDown2 => "IM2-",
        }
    }

    pub fn from_long_name(name: &str) -> Option<Self> {
        BY_LONG.get(name).copied()
    }

    pub fn from_short_code(code: &str) -> Option<Self> {
        BY_SHORT.get(code).copied()
    }
}

static BY_LONG: Lazy<HashMap<&'static str, LevelLabel>> = Lazy::new(|| {
    LevelLabel::ALL
        .iter()
        .map(|l| (l.long_name(), *l))
        .collect()
});

static BY_SHORT: Lazy<HashMap<&'static str, LevelLabel>> = Lazy::new(|| {
    LevelLabel::ALL
        .iter()
        .map(|l| (l.short_code(), *l))
        .collect()
});

/// A label plus its CE modifier, the unit both notations encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelCode {
    pub label: LevelLabel,
    pub confirmed: bool,
}

impl LevelCode {
    pub fn plain(label: LevelLabel) -> Self {
        Self {
            label,
            confirmed: false,
        }
    }

    pub fn confirmed(label: LevelLabel) -> Self {
        Self {
            label,
            confirmed: true,
        }
    }

    /// Parse a short code such as `PW` or `GFCE`.
    ///
    /// An exact table hit wins before the `CE` suffix is considered.
    pub fn parse_short(code: &str) -> Option<Self> {
        let code = code.trim();
        if let Some(label) = LevelLabel::from_short_code(code) {
            return Some(Self::plain(label));
        }
        code.strip_suffix(CE_SUFFIX)
            .and_then(LevelLabel::from_short_code)
            .map(Self::confirmed)
    }

    /// Parse a long label such as `Put Wall` or `Gamma Flip CE`.
    pub fn parse_long(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(label) = LevelLabel::from_long_name(name) {
            return Some(Self::plain(label));
        }
        name.strip_suffix(CE_SUFFIX)
            .map(str::trim_end)
            .and_then(LevelLabel::from_long_name)
            .map(Self::confirmed)
    }

    pub fn short(&self) -> String {
        if self.confirmed {
            format!("{}{CE_SUFFIX}", self.label.short_code())
        } else {
            self.label.short_code().to_string()
        }
    }

    pub fn long(&self) -> String {
        if self.confirmed {
            format!("{} {CE_SUFFIX}", self.label.long_name())
        } else {
            self.label.long_name().to_string()
        }
    }
}

impl fmt::Display for LevelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.long())
    }
}
