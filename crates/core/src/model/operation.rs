use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Arithmetic operation a problem can exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    #[serde(rename = "percent")]
    PercentOf,
}

impl OperationKind {
    /// All kinds in canonical order.
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Addition,
        OperationKind::Subtraction,
        OperationKind::Multiplication,
        OperationKind::Division,
        OperationKind::PercentOf,
    ];

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            OperationKind::Addition => "+",
            OperationKind::Subtraction => "-",
            OperationKind::Multiplication => "×",
            OperationKind::Division => "÷",
            OperationKind::PercentOf => "%",
        }
    }

    /// Storage key used in persisted settings maps.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            OperationKind::Addition => "addition",
            OperationKind::Subtraction => "subtraction",
            OperationKind::Multiplication => "multiplication",
            OperationKind::Division => "division",
            OperationKind::PercentOf => "percent",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Inclusive range of decimal digit counts for one operand, clamped to `[1, 4]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DigitRange {
    min: u8,
    max: u8,
}

impl DigitRange {
    pub const MIN_DIGITS: u8 = 1;
    pub const MAX_DIGITS: u8 = 4;

    /// Builds a range, clamping both ends to `[1, 4]`.
    ///
    /// `min > max` is kept as given; draws treat the range as unordered.
    #[must_use]
    pub fn new(min: u8, max: u8) -> Self {
        Self {
            min: min.clamp(Self::MIN_DIGITS, Self::MAX_DIGITS),
            max: max.clamp(Self::MIN_DIGITS, Self::MAX_DIGITS),
        }
    }

    #[must_use]
    pub fn single(digits: u8) -> Self {
        Self::new(digits, digits)
    }

    #[must_use]
    pub fn min(&self) -> u8 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> u8 {
        self.max
    }

    /// The range with its ends ordered, for drawing.
    #[must_use]
    pub fn ordered(&self) -> (u8, u8) {
        (self.min.min(self.max), self.min.max(self.max))
    }

    #[must_use]
    pub fn contains(&self, digits: u8) -> bool {
        let (lo, hi) = self.ordered();
        (lo..=hi).contains(&digits)
    }
}

/// Per-operation generation settings.
///
/// Percent problems draw the percentage on their own and take the base from
/// `second_operand_digits`; their `first_operand_digits` is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSettings {
    pub enabled: bool,
    pub first_operand_digits: DigitRange,
    pub second_operand_digits: DigitRange,
}

impl OperationSettings {
    /// Enabled settings using the same digit range on both sides.
    #[must_use]
    pub fn uniform(digits: u8) -> Self {
        Self {
            enabled: true,
            first_operand_digits: DigitRange::single(digits),
            second_operand_digits: DigitRange::single(digits),
        }
    }

    #[must_use]
    pub fn default_for(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Addition | OperationKind::Subtraction | OperationKind::PercentOf => {
                Self::uniform(2)
            }
            OperationKind::Multiplication | OperationKind::Division => Self::uniform(1),
        }
    }
}

/// Generation settings for every operation kind.
///
/// Kinds missing from the map use [`OperationSettings::default_for`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationConfig {
    operations: BTreeMap<OperationKind, OperationSettings>,
}

impl OperationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Config with exactly the given kinds enabled, default digit ranges.
    #[must_use]
    pub fn only(kinds: &[OperationKind]) -> Self {
        let mut config = Self::default();
        for kind in OperationKind::ALL {
            config.set_enabled(kind, kinds.contains(&kind));
        }
        config
    }

    #[must_use]
    pub fn settings_for(&self, kind: OperationKind) -> OperationSettings {
        self.operations
            .get(&kind)
            .copied()
            .unwrap_or_else(|| OperationSettings::default_for(kind))
    }

    pub fn set(&mut self, kind: OperationKind, settings: OperationSettings) {
        self.operations.insert(kind, settings);
    }

    pub fn set_enabled(&mut self, kind: OperationKind, enabled: bool) {
        let mut settings = self.settings_for(kind);
        settings.enabled = enabled;
        self.set(kind, settings);
    }

    pub fn set_digits(&mut self, kind: OperationKind, first: DigitRange, second: DigitRange) {
        let mut settings = self.settings_for(kind);
        settings.first_operand_digits = first;
        settings.second_operand_digits = second;
        self.set(kind, settings);
    }

    #[must_use]
    pub fn with_digits(mut self, kind: OperationKind, first: DigitRange, second: DigitRange) -> Self {
        self.set_digits(kind, first, second);
        self
    }

    /// Enabled kinds in canonical order (may be empty).
    #[must_use]
    pub fn enabled_kinds(&self) -> Vec<OperationKind> {
        OperationKind::ALL
            .into_iter()
            .filter(|kind| self.settings_for(*kind).enabled)
            .collect()
    }

    /// Kinds the synthesizer will actually draw from: the enabled kinds, or Addition alone.
    #[must_use]
    pub fn effective_kinds(&self) -> Vec<OperationKind> {
        let enabled = self.enabled_kinds();
        if enabled.is_empty() {
            vec![OperationKind::Addition]
        } else {
            enabled
        }
    }
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            operations: OperationKind::ALL
                .into_iter()
                .map(|kind| (kind, OperationSettings::default_for(kind)))
                .collect(),
        }
    }
}
