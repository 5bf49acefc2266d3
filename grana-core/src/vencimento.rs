//! Billing-cycle calculator: maps a purchase month to its due date.

use chrono::{Months, NaiveDate};

use crate::mes::MesReferencia;

/// Statement closing day used when a card does not declare one.
pub const DEFAULT_CLOSING_DAY: u32 = 12;

/// Closing days are clamped here so short months can never produce an
/// invalid date.
pub const MAX_CLOSING_DAY: u32 = 28;

/// Due date for purchases posted in `mes_compra`: the card's closing day,
/// one calendar month later.
///
/// The default for an absent closing day lives here and nowhere else, so the
/// realized and projected paths can never disagree.
pub fn due_date(mes_compra: MesReferencia, dia_vencimento: Option<u32>) -> NaiveDate {
    let dia = dia_vencimento
        .unwrap_or(DEFAULT_CLOSING_DAY)
        .clamp(1, MAX_CLOSING_DAY);
    NaiveDate::from_ymd_opt(mes_compra.ano(), mes_compra.mes(), dia)
        .expect("day <= 28 exists in every month")
        .checked_add_months(Months::new(1))
        .expect("due date within chrono's representable range")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mes(s: &str) -> MesReferencia {
        s.parse().unwrap()
    }

    #[test]
    fn due_lands_in_the_following_month() {
        let venc = due_date(mes("2024-04"), Some(12));
        assert_eq!(venc, NaiveDate::from_ymd_opt(2024, 5, 12).unwrap());
    }

    #[test]
    fn year_rolls_over() {
        let venc = due_date(mes("2024-12"), Some(5));
        assert_eq!(venc, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    }

    #[test]
    fn days_past_28_clamp_to_28() {
        let feb = mes("2024-02");
        assert_eq!(due_date(feb, Some(31)), due_date(feb, Some(28)));
        assert_eq!(
            due_date(feb, Some(31)),
            NaiveDate::from_ymd_opt(2024, 3, 28).unwrap()
        );
    }

    #[test]
    fn absent_day_defaults_to_12() {
        assert_eq!(
            due_date(mes("2024-04"), None),
            NaiveDate::from_ymd_opt(2024, 5, 12).unwrap()
        );
    }

    #[test]
    fn zero_day_clamps_up_to_one() {
        assert_eq!(
            due_date(mes("2024-04"), Some(0)),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
    }
}
