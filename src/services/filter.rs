use crate::date_utils::DateRange;
use crate::models::{LabelFilter, LabelSet, Transaction};
use crate::services::label_matcher::match_key;

/// Decides which transactions take part in an aggregation.
#[derive(Debug, Clone)]
pub struct TransactionFilter<'a> {
    range: DateRange,
    mode: &'a LabelFilter,
    labels: LabelSet,
}

impl<'a> TransactionFilter<'a> {
    pub fn new(range: DateRange, mode: &'a LabelFilter, known: &LabelSet) -> Self {
        // An exact label is matched against the known vocabulary plus itself,
        // so a more specific stored label still takes precedence and an
        // undeclared label still works as a plain substring filter.
        let labels = match mode {
            LabelFilter::ExactLabel(label) => known.with_label(label),
            _ => known.clone(),
        };
        Self {
            range,
            mode,
            labels,
        }
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn accepts(&self, txn: &Transaction) -> bool {
        if !self.range.contains(txn.timestamp()) {
            return false;
        }
        match self.mode {
            LabelFilter::Unfiltered => true,
            LabelFilter::AnyKnownLabel => match_key(txn.description_key(), &self.labels).is_some(),
            LabelFilter::ExactLabel(wanted) => {
                match_key(txn.description_key(), &self.labels) == Some(wanted)
            }
        }
    }

    pub fn apply<'t>(&self, transactions: &'t [Transaction]) -> Vec<&'t Transaction> {
        transactions.iter().filter(|t| self.accepts(t)).collect()
    }
}

/// Convenience wrapper around [`TransactionFilter`].
pub fn filter<'t>(
    transactions: &'t [Transaction],
    range: DateRange,
    mode: &LabelFilter,
    known: &LabelSet,
) -> Vec<&'t Transaction> {
    TransactionFilter::new(range, mode, known).apply(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, 0).unwrap()
    }

    fn txn(id: &str, desc: &str, ts: DateTime<Utc>) -> Transaction {
        Transaction::new(id, TransactionKind::Income, 1000, desc, ts).unwrap()
    }

    fn ids(selected: &[&Transaction]) -> Vec<String> {
        selected.iter().map(|t| t.id().to_string()).collect()
    }

    #[test]
    fn test_range_bounds_are_inclusive_to_the_millisecond() {
        let start = at(8, 0);
        let end = at(18, 0);
        let one_ms = Duration::milliseconds(1);
        let transactions = vec![
            txn("before", "x", start - one_ms),
            txn("start", "x", start),
            txn("end", "x", end),
            txn("after", "x", end + one_ms),
        ];

        let selected = filter(
            &transactions,
            DateRange::between(start, end),
            &LabelFilter::Unfiltered,
            &LabelSet::default(),
        );
        assert_eq!(ids(&selected), vec!["start", "end"]);
    }

    #[test]
    fn test_any_known_label_excludes_unlabeled_noise() {
        let labels = LabelSet::from_names(["Uber", "Etsy"]);
        let transactions = vec![
            txn("a", "Uber Income", at(9, 0)),
            txn("b", "Grocery", at(10, 0)),
            txn("c", "etsy sale", at(11, 0)),
        ];
        let selected = filter(
            &transactions,
            DateRange::between(at(0, 0), at(23, 0)),
            &LabelFilter::AnyKnownLabel,
            &labels,
        );
        assert_eq!(ids(&selected), vec!["a", "c"]);
    }

    #[test]
    fn test_exact_label_uses_matched_label() {
        let labels = LabelSet::from_names(["Uber", "Uber Eats"]);
        let transactions = vec![
            txn("ride", "Uber ride", at(9, 0)),
            txn("eats", "Uber Eats order", at(10, 0)),
        ];
        let range = DateRange::between(at(0, 0), at(23, 0));

        let uber = LabelFilter::exact("uber").unwrap();
        assert_eq!(ids(&filter(&transactions, range, &uber, &labels)), vec!["ride"]);

        let eats = LabelFilter::exact("Uber Eats").unwrap();
        assert_eq!(ids(&filter(&transactions, range, &eats, &labels)), vec!["eats"]);
    }

    #[test]
    fn test_exact_label_not_in_store_falls_back_to_substring() {
        let transactions = vec![
            txn("p", "Pokemon card sale", at(9, 0)),
            txn("q", "Groceries", at(10, 0)),
        ];
        let mode = LabelFilter::exact("pokemon").unwrap();
        let selected = filter(
            &transactions,
            DateRange::between(at(0, 0), at(23, 0)),
            &mode,
            &LabelSet::default(),
        );
        assert_eq!(ids(&selected), vec!["p"]);
    }

    #[test]
    fn test_unfiltered_with_empty_labels_keeps_everything_in_range() {
        let transactions = vec![txn("a", "", at(9, 0)), txn("b", "Anything", at(10, 0))];
        let selected = filter(
            &transactions,
            DateRange::between(at(0, 0), at(23, 0)),
            &LabelFilter::Unfiltered,
            &LabelSet::default(),
        );
        assert_eq!(selected.len(), 2);
    }
}
