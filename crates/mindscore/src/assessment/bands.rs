use serde::{Deserialize, Serialize};

use super::domain::ScoreLevel;

/// One labelled score range. Bands are half-open `[min, max)` except the
/// final band of a table, which also contains `max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band<L> {
    pub min: f64,
    pub max: f64,
    pub label: L,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BandTableError {
    #[error("band table is empty")]
    Empty,
    #[error("band table must start at 0 (starts at {0})")]
    DoesNotStartAtZero(f64),
    #[error("band table must end at 100 (ends at {0})")]
    DoesNotEndAtHundred(f64),
    #[error("band {index} has min {min} not below max {max}")]
    EmptyRange { index: usize, min: f64, max: f64 },
    #[error("band {index} starts at {min} but previous band ends at {previous_max}")]
    Discontinuous {
        index: usize,
        min: f64,
        previous_max: f64,
    },
}

/// Ordered, gap-free partition of `[0, 100]` into labelled bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BandTable<L> {
    bands: Vec<Band<L>>,
}

impl<L: Clone> BandTable<L> {
    pub fn new(bands: Vec<Band<L>>) -> Result<Self, BandTableError> {
        let first = bands.first().ok_or(BandTableError::Empty)?;
        if first.min != 0.0 {
            return Err(BandTableError::DoesNotStartAtZero(first.min));
        }
        let last = &bands[bands.len() - 1];
        if last.max != 100.0 {
            return Err(BandTableError::DoesNotEndAtHundred(last.max));
        }

        for (index, band) in bands.iter().enumerate() {
            if !(band.min < band.max) {
                return Err(BandTableError::EmptyRange {
                    index,
                    min: band.min,
                    max: band.max,
                });
            }
            if index > 0 {
                let previous_max = bands[index - 1].max;
                if band.min != previous_max {
                    return Err(BandTableError::Discontinuous {
                        index,
                        min: band.min,
                        previous_max,
                    });
                }
            }
        }

        Ok(Self { bands })
    }

    /// Label for `score`, clamped into `[0, 100]`. A score sitting exactly on a
    /// boundary belongs to the upper band.
    pub fn classify(&self, score: f64) -> &L {
        let score = score.clamp(0.0, 100.0);
        let last_index = self.bands.len() - 1;
        self.bands
            .iter()
            .enumerate()
            .find(|(index, band)| {
                score >= band.min && (score < band.max || (*index == last_index && score <= band.max))
            })
            .map(|(_, band)| &band.label)
            .unwrap_or(&self.bands[0].label)
    }

    pub fn bands(&self) -> &[Band<L>] {
        &self.bands
    }
}

impl<'de, L> Deserialize<'de> for BandTable<L>
where
    L: Clone + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bands = Vec::<Band<L>>::deserialize(deserializer)?;
        BandTable::new(bands).map_err(serde::de::Error::custom)
    }
}

/// Threshold ladder: >=80 excellent, >=65 good, >=50 fair, otherwise needs improvement.
pub fn level_ladder() -> BandTable<ScoreLevel> {
    BandTable {
        bands: vec![
            band(0.0, 50.0, ScoreLevel::NeedsImprovement),
            band(50.0, 65.0, ScoreLevel::Fair),
            band(65.0, 80.0, ScoreLevel::Good),
            band(80.0, 100.0, ScoreLevel::Excellent),
        ],
    }
}

pub fn band<L>(min: f64, max: f64, label: L) -> Band<L> {
    Band { min, max, label }
}

/// Build a profile table from `(min, max, name)` triples.
pub fn profile_table(ranges: &[(f64, f64, &str)]) -> Result<BandTable<String>, BandTableError> {
    BandTable::new(
        ranges
            .iter()
            .map(|(min, max, name)| band(*min, *max, (*name).to_string()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resilience() -> BandTable<String> {
        profile_table(&[
            (0.0, 40.0, "Clay"),
            (40.0, 55.0, "Wood"),
            (55.0, 70.0, "Stone"),
            (70.0, 85.0, "Steel"),
            (85.0, 100.0, "Diamond"),
        ])
        .expect("valid table")
    }

    #[test]
    fn boundary_scores_select_the_upper_band() {
        let table = resilience();
        assert_eq!(table.classify(39.999), "Clay");
        assert_eq!(table.classify(40.0), "Wood");
        assert_eq!(table.classify(55.0), "Stone");
        assert_eq!(table.classify(70.0), "Steel");
        assert_eq!(table.classify(85.0), "Diamond");
    }

    #[test]
    fn extremes_are_covered() {
        let table = resilience();
        assert_eq!(table.classify(0.0), "Clay");
        assert_eq!(table.classify(100.0), "Diamond");
        assert_eq!(table.classify(-12.0), "Clay");
        assert_eq!(table.classify(180.0), "Diamond");
    }

    #[test]
    fn nan_falls_back_to_lowest_band() {
        assert_eq!(resilience().classify(f64::NAN), "Clay");
    }

    #[test]
    fn every_integer_score_maps_to_exactly_one_band() {
        let table = resilience();
        for score in 0..=100 {
            let score = score as f64;
            let last = table.bands().len() - 1;
            let hits: Vec<&String> = table
                .bands()
                .iter()
                .enumerate()
                .filter(|(index, band)| {
                    score >= band.min && (score < band.max || (*index == last && score <= band.max))
                })
                .map(|(_, band)| &band.label)
                .collect();
            assert_eq!(hits.len(), 1, "score {score} matched {hits:?}");
            assert_eq!(table.classify(score), hits[0], "score {score}");
        }
    }

    #[test]
    fn rejects_gaps_and_overlaps() {
        let gap = profile_table(&[(0.0, 40.0, "Low"), (45.0, 100.0, "High")]);
        assert!(matches!(gap, Err(BandTableError::Discontinuous { index: 1, .. })));

        let overlap = profile_table(&[(0.0, 60.0, "Low"), (50.0, 100.0, "High")]);
        assert!(matches!(
            overlap,
            Err(BandTableError::Discontinuous { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_partial_coverage() {
        assert_eq!(
            profile_table(&[(10.0, 100.0, "Only")]),
            Err(BandTableError::DoesNotStartAtZero(10.0))
        );
        assert_eq!(
            profile_table(&[(0.0, 90.0, "Only")]),
            Err(BandTableError::DoesNotEndAtHundred(90.0))
        );
        assert_eq!(profile_table(&[]), Err(BandTableError::Empty));
        assert!(matches!(
            profile_table(&[(0.0, 0.0, "Point"), (0.0, 100.0, "Rest")]),
            Err(BandTableError::EmptyRange { index: 0, .. })
        ));
    }

    #[test]
    fn deserialization_enforces_invariants() {
        let err = serde_json::from_str::<BandTable<String>>(
            r#"[{"min":0,"max":50,"label":"Low"},{"min":60,"max":100,"label":"High"}]"#,
        )
        .expect_err("gap rejected");
        assert!(err.to_string().contains("previous band ends at 50"));
    }

    #[test]
    fn level_ladder_thresholds() {
        let ladder = level_ladder();
        assert_eq!(*ladder.classify(80.0), ScoreLevel::Excellent);
        assert_eq!(*ladder.classify(79.9), ScoreLevel::Good);
        assert_eq!(*ladder.classify(65.0), ScoreLevel::Good);
        assert_eq!(*ladder.classify(50.0), ScoreLevel::Fair);
        assert_eq!(*ladder.classify(49.9), ScoreLevel::NeedsImprovement);
    }
}
