//! Suprasegmental (tone and stress) distance.
//!
//! Tone and stress projections are compared with a weighted edit distance
//! whose substitution costs come from a confusion table.

use crate::distance::check_cost;
use crate::distance::edit::weighted_edit;
use crate::error::ConfigError;
use crate::types::{PhoneticSequence, Stress, Tone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

/// Which suprasegmental projection to compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Tone,
    Stress,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Tone => "tone",
            Axis::Stress => "stress",
        }
    }
}

/// Class set of one suprasegmental axis.
pub trait ProsodicClass: Copy + Eq + Ord + Hash + Debug + Display + FromStr {
    const AXIS: Axis;
}

impl ProsodicClass for Tone {
    const AXIS: Axis = Axis::Tone;
}

impl ProsodicClass for Stress {
    const AXIS: Axis = Axis::Stress;
}

/// Length used to normalize the raw edit cost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Longer projection
    #[default]
    Longer,
    /// Shorter projection (at least 1)
    Shorter,
}

/// Substitution, insertion and deletion costs between classes.
///
/// Identical classes cost 0. Pairs missing from the table cost
/// `default_cost`. With `symmetric`, `(a, b)` also answers `(b, a)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfusionTable<C: ProsodicClass> {
    costs: BTreeMap<(C, C), f64>,
    pub symmetric: bool,
    pub default_cost: f64,
    pub insertion: f64,
    pub deletion: f64,
}

impl<C: ProsodicClass> Default for ConfusionTable<C> {
    fn default() -> Self {
        Self {
            costs: BTreeMap::new(),
            symmetric: true,
            default_cost: 1.0,
            insertion: 1.0,
            deletion: 1.0,
        }
    }
}

impl<C: ProsodicClass> ConfusionTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cost(mut self, a: C, b: C, cost: f64) -> Self {
        self.insert(a, b, cost);
        self
    }

    pub fn insert(&mut self, a: C, b: C, cost: f64) {
        self.costs.insert((a, b), cost);
    }

    pub fn costs(&self) -> impl Iterator<Item = (&(C, C), &f64)> {
        self.costs.iter()
    }

    pub fn substitution(&self, a: C, b: C) -> f64 {
        if a == b {
            return 0.0;
        }

        self.costs
            .get(&(a, b))
            .or_else(|| self.symmetric.then(|| self.costs.get(&(b, a))).flatten())
            .copied()
            .unwrap_or(self.default_cost)
    }

    /// Parse an `"a:b"` table key.
    pub fn parse_key(key: &str) -> Result<(C, C), ConfigError> {
        let malformed = || ConfigError::MalformedConfusionKey {
            axis: C::AXIS.name(),
            key: key.to_owned(),
        };

        let (a, b) = key.split_once(':').ok_or_else(malformed)?;
        let a = a.trim().parse::<C>().map_err(|_| malformed())?;
        let b = b.trim().parse::<C>().map_err(|_| malformed())?;

        Ok((a, b))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let axis = C::AXIS.name();

        check_cost(&format!("{axis}.default_cost"), self.default_cost)?;
        check_cost(&format!("{axis}.insertion"), self.insertion)?;
        check_cost(&format!("{axis}.deletion"), self.deletion)?;

        for ((a, b), &cost) in &self.costs {
            check_cost(&format!("{axis}.{a}:{b}"), cost)?;
        }

        Ok(())
    }
}

impl ConfusionTable<Tone> {
    /// Mandarin tone confusions commonly produced by ASR.
    pub fn mandarin() -> Self {
        use crate::types::Tone::*;

        let mut table = Self::new()
            .with_cost(First, Second, 0.6)
            .with_cost(Second, Third, 0.7)
            .with_cost(Third, Fourth, 0.6)
            .with_cost(First, Third, 0.8)
            .with_cost(First, Fourth, 0.9)
            .with_cost(Second, Fourth, 0.9);

        for tone in [First, Second, Third, Fourth] {
            table.insert(tone, Neutral, 0.5);
        }

        table
    }
}

impl ConfusionTable<Stress> {
    /// Adjacent stress levels are half as costly to confuse.
    pub fn english() -> Self {
        Self::new()
            .with_cost(Stress::Primary, Stress::Secondary, 0.5)
            .with_cost(Stress::Secondary, Stress::Unstressed, 0.5)
    }
}

/// Raw weighted edit cost between two class sequences.
pub fn suprasegmental_cost<C: ProsodicClass>(a: &[C], b: &[C], table: &ConfusionTable<C>) -> f64 {
    weighted_edit(a, b, table.insertion, table.deletion, |&x, &y| table.substitution(x, y))
}

/// Normalized weighted edit distance between two class sequences.
///
/// Two empty projections contribute nothing.
pub fn suprasegmental_distance<C: ProsodicClass>(
    a: &[C],
    b: &[C],
    table: &ConfusionTable<C>,
    normalization: Normalization,
) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }

    let norm = match normalization {
        Normalization::Longer => a.len().max(b.len()),
        Normalization::Shorter => a.len().min(b.len()).max(1),
    };

    suprasegmental_cost(a, b, table) / norm as f64
}

/// Tone and stress tables plus normalization policy.
#[derive(Clone, Debug, PartialEq)]
pub struct ProsodyConfig {
    pub tone: ConfusionTable<Tone>,
    pub stress: ConfusionTable<Stress>,
    pub normalization: Normalization,
}

impl Default for ProsodyConfig {
    fn default() -> Self {
        Self {
            tone: ConfusionTable::mandarin(),
            stress: ConfusionTable::english(),
            normalization: Normalization::Longer,
        }
    }
}

impl ProsodyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tone.validate()?;
        self.stress.validate()
    }
}

/// Distance between the `axis` projections of two sequences.
pub fn prosody_distance(
    a: &PhoneticSequence,
    b: &PhoneticSequence,
    axis: Axis,
    config: &ProsodyConfig,
) -> f64 {
    match axis {
        Axis::Tone => suprasegmental_distance(&a.tones(), &b.tones(), &config.tone, config.normalization),
        Axis::Stress => {
            suprasegmental_distance(&a.stresses(), &b.stresses(), &config.stress, config.normalization)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhoneticUnit;
    use crate::types::Tone::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn confusion_lookup_is_symmetric_by_default() {
        let table = ConfusionTable::new().with_cost(Second, Third, 0.3);

        assert!((table.substitution(Third, Second) - 0.3).abs() < EPS);
        assert!((table.substitution(First, Fourth) - 1.0).abs() < EPS);
        assert_eq!(table.substitution(Fourth, Fourth), 0.0);
    }

    #[test]
    fn ordered_table_falls_back_to_default() {
        let mut table = ConfusionTable::new().with_cost(Second, Third, 0.3);
        table.symmetric = false;
        table.default_cost = 0.9;

        assert!((table.substitution(Second, Third) - 0.3).abs() < EPS);
        assert!((table.substitution(Third, Second) - 0.9).abs() < EPS);
    }

    #[test]
    fn normalizes_by_longer_projection() {
        let table = ConfusionTable::new().with_cost(Second, Third, 0.5);

        // one cheap substitution, one insertion
        let d = suprasegmental_distance(&[Third], &[Second, Fourth], &table, Normalization::Longer);

        assert!((d - 0.75).abs() < EPS);
    }

    #[test]
    fn shorter_normalization_never_divides_by_zero() {
        let table = ConfusionTable::<Tone>::new();

        let d = suprasegmental_distance(&[], &[First, Second], &table, Normalization::Shorter);

        assert!((d - 2.0).abs() < EPS);
    }

    #[test]
    fn both_empty_contribute_nothing() {
        let table = ConfusionTable::<Stress>::english();

        assert_eq!(suprasegmental_distance(&[], &[], &table, Normalization::Longer), 0.0);
    }

    #[test]
    fn projects_tone_and_stress_independently() {
        let a = PhoneticSequence::new(vec![
            PhoneticUnit::new("m").with_stress(Stress::Primary),
            PhoneticUnit::new("a"),
        ]);
        let b = PhoneticSequence::new(vec![
            PhoneticUnit::new("m"),
            PhoneticUnit::new("ei").with_tone(Third),
        ]);
        let config = ProsodyConfig::default();

        // one tone insertion over one tone
        assert!((prosody_distance(&a, &b, Axis::Tone, &config) - 1.0).abs() < EPS);
        // one stress deletion over one stress
        assert!((prosody_distance(&a, &b, Axis::Stress, &config) - 1.0).abs() < EPS);
        assert_eq!(prosody_distance(&a, &a, Axis::Stress, &config), 0.0);
    }

    #[test]
    fn parses_table_keys() {
        assert_eq!(ConfusionTable::<Tone>::parse_key("2:3").unwrap(), (Second, Third));
        assert_eq!(
            ConfusionTable::<Stress>::parse_key("primary : secondary").unwrap(),
            (Stress::Primary, Stress::Secondary)
        );

        for bad in ["23", "2:9", ":", "2:3:4"] {
            assert!(
                matches!(
                    ConfusionTable::<Tone>::parse_key(bad),
                    Err(ConfigError::MalformedConfusionKey { axis: "tone", .. })
                ),
                "{bad}"
            );
        }
    }
}
