//! Turn history export as CSV, one row per resolved turn.

use serde::{Deserialize, Serialize};

use crate::combat::session::{CombatOutcome, CombatSession};
use crate::combat::turn::TurnResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub combat: u32,
    pub rank: String,
    pub round: u32,
    /// Unit names in slot order, `|`-separated.
    pub units: String,
    pub synergy: String,
    pub total_damage: i64,
    pub total_multiplier: i64,
    pub final_damage: i64,
    pub cumulative_damage: i64,
    pub target_damage: i64,
    pub outcome: CombatOutcome,
}

impl TurnRecord {
    /// `session` must be the state after the turn was recorded; `round` is the round that was played.
    pub fn new(session: &CombatSession, round: u32, result: &TurnResult, outcome: CombatOutcome) -> Self {
        let units = result
            .units
            .iter()
            .map(|u| u.name.as_str())
            .collect::<Vec<_>>()
            .join("|");
        Self {
            combat: session.combat_index,
            rank: session.rank.label().to_string(),
            round,
            units,
            synergy: result
                .synergy
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            total_damage: result.total_damage,
            total_multiplier: result.total_multiplier,
            final_damage: result.final_damage,
            cumulative_damage: session.total_damage,
            target_damage: session.target_damage,
            outcome,
        }
    }
}

pub fn turns_to_csv(records: &[TurnRecord]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn turns_from_csv(raw: &str) -> Result<Vec<TurnRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(raw.as_bytes());
    reader.deserialize().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(round: u32, outcome: CombatOutcome) -> TurnRecord {
        TurnRecord {
            combat: 1,
            rank: "F-".to_string(),
            round,
            units: "Épéiste|Archer".to_string(),
            synergy: "Duo".to_string(),
            total_damage: 9,
            total_multiplier: 3,
            final_damage: 27,
            cumulative_damage: 27 * i64::from(round),
            target_damage: 40,
            outcome,
        }
    }

    #[test]
    fn header_and_rows() {
        let csv = turns_to_csv(&[record(1, CombatOutcome::Ongoing), record(2, CombatOutcome::Victory)])
            .expect("csv");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("combat,rank,round,units,synergy,total_damage,total_multiplier,final_damage,cumulative_damage,target_damage,outcome")
        );
        assert_eq!(lines.next(), Some("1,F-,1,Épéiste|Archer,Duo,9,3,27,27,40,ongoing"));
        assert!(lines.next().is_some_and(|l| l.ends_with("victory")));
    }

    #[test]
    fn reads_back_what_it_writes() {
        let rows = vec![record(1, CombatOutcome::Ongoing), record(2, CombatOutcome::Defeat)];
        let csv = turns_to_csv(&rows).expect("csv");
        assert_eq!(turns_from_csv(&csv).expect("parse"), rows);
    }
}
