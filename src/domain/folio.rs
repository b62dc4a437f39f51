use chrono::{DateTime, Datelike, Utc};

/// Month-scoped prefix shared by every reposition folio issued in `at`'s
/// calendar month, e.g. `JN-REQ-03-25-`.
pub fn reposition_folio_prefix(at: DateTime<Utc>) -> String {
    format!("JN-REQ-{:02}-{:02}-", at.month(), at.year() % 100)
}

/// Full reposition folio, e.g. `JN-REQ-03-25-007`. The sequence restarts
/// at 1 each month; the counter row keyed by the prefix guarantees that.
pub fn reposition_folio(at: DateTime<Utc>, seq: i32) -> String {
    format!("{}{:03}", reposition_folio_prefix(at), seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn folio_format_is_bit_exact() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
        assert_eq!(reposition_folio(at, 7), "JN-REQ-03-25-007");
        assert_eq!(reposition_folio_prefix(at), "JN-REQ-03-25-");
    }

    #[test]
    fn single_digit_fields_are_zero_padded() {
        let at = Utc.with_ymd_and_hms(2031, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(reposition_folio(at, 1), "JN-REQ-01-31-001");
    }

    proptest! {
        #[test]
        fn folio_always_extends_its_month_prefix(
            year in 2020u32..2100,
            month in 1u32..=12,
            seq in 1i32..5000,
        ) {
            let at = Utc.with_ymd_and_hms(year as i32, month, 1, 12, 0, 0).unwrap();
            let folio = reposition_folio(at, seq);
            prop_assert!(folio.starts_with(&reposition_folio_prefix(at)));
            // sequences below 1000 keep the fixed-width folio shape
            if seq < 1000 {
                prop_assert_eq!(folio.len(), "JN-REQ-MM-YY-SSS".len());
            }
        }
    }
}
