use crate::model::card::CardKind;

/// `count` as a percentage of `total`, or `None` when nothing was observed.
pub fn percent(count: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(100.0 * count as f64 / total as f64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityRow {
    pub card: CardKind,
    pub count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTable {
    pub denominator: u64,
    pub rows: Vec<ProbabilityRow>,
}

impl ProbabilityTable {
    pub(crate) fn build(
        denominator: u64,
        include_unplayed: bool,
        count_for: impl Fn(CardKind) -> u64,
    ) -> Self {
        let mut rows = Vec::new();
        if denominator > 0 {
            for card in CardKind::sorted_by_name() {
                let count = count_for(card);
                if count == 0 && !include_unplayed {
                    continue;
                }
                if let Some(percent) = percent(count, denominator) {
                    rows.push(ProbabilityRow {
                        card,
                        count,
                        percent,
                    });
                }
            }
        }
        Self { denominator, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, card: CardKind) -> Option<&ProbabilityRow> {
        self.rows.iter().find(|row| row.card == card)
    }

    /// Most frequently played card; ties go to the first row.
    pub fn most_likely(&self) -> Option<&ProbabilityRow> {
        self.rows.iter().fold(None, |best: Option<&ProbabilityRow>, row| match best {
            Some(current) if current.count >= row.count => Some(current),
            _ => Some(row),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ProbabilityTable, percent};
    use crate::model::card::CardKind;
    use crate::stats::StatsState;

    #[test]
    fn percent_of_zero_total_is_none() {
        assert_eq!(percent(0, 0), None);
        assert_eq!(percent(1, 4), Some(25.0));
    }

    #[test]
    fn global_table_lists_every_card_sorted_by_name() {
        let mut stats = StatsState::new();
        stats.record_play(CardKind::MagicBoost, 0);
        let table = stats.global_table();
        let names: Vec<_> = table.rows.iter().map(|row| row.card.name()).collect();
        assert_eq!(
            names,
            vec!["Cold Wall", "Deep Love", "First Love", "Iron Wall", "Magic Boost"]
        );
        assert_eq!(table.row(CardKind::MagicBoost).map(|r| r.percent), Some(100.0));
        assert_eq!(table.row(CardKind::ColdWall).map(|r| r.count), Some(0));
    }

    #[test]
    fn conditional_table_omits_unplayed_cards() {
        let mut stats = StatsState::new();
        stats.record_play(CardKind::DeepLove, 3);
        stats.record_play(CardKind::DeepLove, 3);
        stats.record_play(CardKind::IronWall, 3);
        stats.record_play(CardKind::FirstLove, 1);

        let table = stats.conditional_table(3);
        assert_eq!(table.denominator, 3);
        assert_eq!(table.rows.len(), 2);
        assert!(table.row(CardKind::FirstLove).is_none());
        assert_eq!(
            table.most_likely().map(|row| row.card),
            Some(CardKind::DeepLove)
        );
    }

    #[test]
    fn empty_table_has_no_most_likely_card() {
        let table = ProbabilityTable::build(0, true, |_| 0);
        assert!(table.is_empty());
        assert!(table.most_likely().is_none());
    }
}
