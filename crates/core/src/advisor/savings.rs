use crate::domain::transaction::Transaction;
use chrono::{DateTime, Months, Utc};

pub const WINDOW_MONTHS: u32 = 3;

/// First instant of the trailing savings window ending at `now`.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(WINDOW_MONTHS))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Average monthly (income - expense) over the window the caller already filtered to.
pub fn monthly_savings(transactions: &[Transaction]) -> f64 {
    let net: f64 = transactions.iter().map(Transaction::signed_amount).sum();
    net / f64::from(WINDOW_MONTHS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::TransactionType;
    use chrono::TimeZone;

    fn tx(amount: f64, kind: TransactionType) -> Transaction {
        Transaction {
            id: 0,
            user_id: 1,
            amount,
            kind,
            category_id: None,
            description: None,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn no_transactions_means_zero() {
        assert_eq!(monthly_savings(&[]), 0.0);
    }

    #[test]
    fn income_only_is_a_third_of_the_sum() {
        let amounts = [1200.0, 35.5, 0.0, 780.25];
        let txs: Vec<_> = amounts
            .iter()
            .map(|a| tx(*a, TransactionType::Income))
            .collect();
        let expected = amounts.iter().sum::<f64>() / 3.0;
        assert!((monthly_savings(&txs) - expected).abs() < 1e-9);
    }

    #[test]
    fn expense_only_is_negative_third_of_the_sum() {
        let amounts = [60.0, 14.99, 310.0];
        let txs: Vec<_> = amounts
            .iter()
            .map(|a| tx(*a, TransactionType::Expense))
            .collect();
        let expected = -amounts.iter().sum::<f64>() / 3.0;
        assert!((monthly_savings(&txs) - expected).abs() < 1e-9);
    }

    #[test]
    fn window_is_three_calendar_months() {
        let now = Utc.with_ymd_and_hms(2026, 5, 31, 10, 0, 0).unwrap();
        // Feb has no 31st; chrono clamps to the month's last day.
        assert_eq!(
            window_start(now),
            Utc.with_ymd_and_hms(2026, 2, 28, 10, 0, 0).unwrap()
        );
    }
}
