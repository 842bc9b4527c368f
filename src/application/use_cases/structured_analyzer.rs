//! Aggregators for rating-scale and fixed-choice questions.

use std::collections::BTreeMap;

use crate::domain::survey::{
    ChoiceCount, ChoiceTally, ColumnClassification, OrdinalAggregate, ResponseTable,
};

/// Mean, population standard deviation and histogram over the valid 1..5 range.
pub fn aggregate_ordinal(
    table: &ResponseTable,
    column: &ColumnClassification,
) -> Option<OrdinalAggregate> {
    let scores: Vec<f64> = table
        .column_numbers(column.column_index)
        .into_iter()
        .filter(|score| (1.0..=5.0).contains(score))
        .collect();
    aggregate_scores(&scores).map(|(mean, std_dev, value_histogram)| OrdinalAggregate {
        label: column.label().to_string(),
        source_column: column.column_index,
        column_name: column.header.clone(),
        mean,
        std_dev,
        value_histogram,
        sample_count: scores.len(),
    })
}

fn aggregate_scores(scores: &[f64]) -> Option<(f64, f64, BTreeMap<u8, usize>)> {
    if scores.is_empty() {
        return None;
    }
    let count = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / count;
    let std_dev = if scores.len() < 2 {
        0.0
    } else {
        (scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / count).sqrt()
    };

    let mut histogram = BTreeMap::new();
    for score in scores {
        *histogram.entry(score.round() as u8).or_insert(0) += 1;
    }
    Some((mean, std_dev, histogram))
}

/// Raw answer counts, most frequent first; ties keep first-seen order.
pub fn tally_choice(table: &ResponseTable, column: &ColumnClassification) -> ChoiceTally {
    let mut counts: Vec<ChoiceCount> = Vec::new();
    for value in table.column_texts(column.column_index) {
        let value = value.trim();
        match counts.iter_mut().find(|c| c.value == value) {
            Some(existing) => existing.count += 1,
            None => counts.push(ChoiceCount {
                value: value.to_string(),
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    ChoiceTally {
        label: column.label().to_string(),
        source_column: column.column_index,
        column_name: column.header.clone(),
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::survey::ColumnKind;

    fn column(kind: ColumnKind, label: &str) -> ColumnClassification {
        ColumnClassification::labeled(0, "q", kind, label.to_string())
    }

    fn table(values: &[&str]) -> ResponseTable {
        ResponseTable::from_strings(
            vec!["q".to_string()],
            values.iter().map(|v| vec![v.to_string()]).collect(),
        )
    }

    #[test]
    fn ordinal_mean_count_and_histogram() {
        let aggregate = aggregate_ordinal(
            &table(&["4", "5", "3", "4"]),
            &column(ColumnKind::OrdinalScale, "ความพอใจ"),
        )
        .unwrap();
        assert!((aggregate.mean - 4.0).abs() < 1e-9);
        assert_eq!(aggregate.sample_count, 4);
        assert_eq!(
            aggregate.value_histogram,
            BTreeMap::from([(3u8, 1usize), (4, 2), (5, 1)])
        );
        assert!((aggregate.std_dev - 0.5f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn single_score_has_zero_std_dev() {
        let aggregate =
            aggregate_ordinal(&table(&["5"]), &column(ColumnKind::OrdinalScale, "x")).unwrap();
        assert_eq!(aggregate.std_dev, 0.0);
    }

    #[test]
    fn empty_column_has_no_aggregate() {
        assert!(aggregate_ordinal(&table(&["", "-"]), &column(ColumnKind::OrdinalScale, "x")).is_none());
    }

    #[test]
    fn tally_orders_by_count_then_first_seen() {
        let tally = tally_choice(
            &table(&["Email", "OTP", "ThaiD", "OTP", "Email", "OTP"]),
            &column(ColumnKind::FixedChoice, "วิธีเข้าสู่ระบบ"),
        );
        let order: Vec<(&str, usize)> = tally
            .counts
            .iter()
            .map(|c| (c.value.as_str(), c.count))
            .collect();
        assert_eq!(order, vec![("OTP", 3), ("Email", 2), ("ThaiD", 1)]);
        assert_eq!(tally.total(), 6);
        assert_eq!(tally.count_of("ThaiD"), 1);
    }
}
