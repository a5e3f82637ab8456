use crate::CanonicalTransaction;
use chrono::{NaiveDate, NaiveTime};

const SECONDS_PER_DAY: i64 = 86_400;

fn epoch_seconds(tx: &CanonicalTransaction) -> i64 {
    // Unparseable timestamps sort first and compare as epoch 0
    tx.date.parse::<i64>().unwrap_or(0)
}

/// Combine the three feeds and sort by numeric timestamp ascending.
pub fn combine_and_sort(
    transactions: Vec<CanonicalTransaction>,
    token_transfers: Vec<CanonicalTransaction>,
    internal_transactions: Vec<CanonicalTransaction>,
) -> Vec<CanonicalTransaction> {
    let mut all = transactions;
    all.extend(token_transfers);
    all.extend(internal_transactions);
    all.sort_by_key(epoch_seconds);
    all
}

/// Keep transactions within [start 00:00:00, end 23:59:59] UTC, either
/// bound optional, both inclusive.
pub fn filter_by_date_range(
    transactions: Vec<CanonicalTransaction>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<CanonicalTransaction> {
    let start_ts = start.map(|d| d.and_time(NaiveTime::MIN).and_utc().timestamp());
    let end_ts = end.map(|d| d.and_time(NaiveTime::MIN).and_utc().timestamp() + SECONDS_PER_DAY - 1);

    transactions
        .into_iter()
        .filter(|tx| {
            let ts = epoch_seconds(tx);
            start_ts.map_or(true, |s| ts >= s) && end_ts.map_or(true, |e| ts <= e)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_at(ts: &str) -> CanonicalTransaction {
        CanonicalTransaction {
            date: ts.to_string(),
            sent_amount: None,
            sent_currency: None,
            received_amount: None,
            received_currency: None,
            fee_amount: None,
            fee_currency: None,
            net_worth_amount: None,
            net_worth_currency: None,
            label: None,
            description: "transaction".to_string(),
            tx_hash: format!("0x{}", ts),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // Three distinct months in 2023: Jan 15, Feb 15, Mar 15
    const JAN: &str = "1673740800";
    const FEB: &str = "1676419200";
    const MAR: &str = "1678838400";

    #[test]
    fn test_combine_sorts_across_feeds() {
        let combined = combine_and_sort(
            vec![canonical_at(MAR)],
            vec![canonical_at(JAN)],
            vec![canonical_at(FEB)],
        );

        let dates: Vec<&str> = combined.iter().map(|tx| tx.date.as_str()).collect();
        assert_eq!(dates, vec![JAN, FEB, MAR]);
    }

    #[test]
    fn test_start_date_excludes_earlier_months() {
        let all = vec![canonical_at(JAN), canonical_at(FEB), canonical_at(MAR)];
        let filtered = filter_by_date_range(all, Some(date("2023-02-01")), None);

        let dates: Vec<&str> = filtered.iter().map(|tx| tx.date.as_str()).collect();
        assert_eq!(dates, vec![FEB, MAR]);
    }

    #[test]
    fn test_start_and_end_narrow_to_matching_subset() {
        let all = vec![canonical_at(JAN), canonical_at(FEB), canonical_at(MAR)];
        let filtered =
            filter_by_date_range(all, Some(date("2023-02-01")), Some(date("2023-02-28")));

        let dates: Vec<&str> = filtered.iter().map(|tx| tx.date.as_str()).collect();
        assert_eq!(dates, vec![FEB]);
    }

    #[test]
    fn test_boundary_timestamps_are_inclusive() {
        // 2023-02-15 00:00:00 and 23:59:59 UTC
        let midnight = canonical_at("1676419200");
        let last_second = canonical_at("1676505599");
        let filtered = filter_by_date_range(
            vec![midnight, last_second],
            Some(date("2023-02-15")),
            Some(date("2023-02-15")),
        );

        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_no_bounds_keeps_everything() {
        let all = vec![canonical_at(JAN), canonical_at(FEB)];
        let filtered = filter_by_date_range(all, None, None);
        assert_eq!(filtered.len(), 2);
    }
}
