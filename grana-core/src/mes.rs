//! `MesReferencia`: the `YYYY-MM` year-month that keys a billing cycle.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BillingError;

/// A calendar year-month, the reference month of an invoice.
///
/// Ordering is chronological; because the display form is fixed-width
/// zero-padded (`2024-04`), it agrees with lexicographic ordering of the
/// serialized string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct MesReferencia {
    ano: i32,
    mes: u32,
}

impl MesReferencia {
    pub fn new(ano: i32, mes: u32) -> Result<Self, BillingError> {
        if !(1..=12).contains(&mes) {
            return Err(BillingError::invalid("mes", format!("{ano:04}-{mes:02}")));
        }
        Ok(Self { ano, mes })
    }

    /// The year-month a given date falls in.
    pub fn of(data: NaiveDate) -> Self {
        Self {
            ano: data.year(),
            mes: data.month(),
        }
    }

    pub fn ano(&self) -> i32 {
        self.ano
    }

    pub fn mes(&self) -> u32 {
        self.mes
    }

    /// First day of the month, as an anchor for due-date arithmetic.
    pub fn primeiro_dia(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.ano, self.mes, 1)
            .expect("month validated on construction")
    }

    /// Typed month-membership test: a closed calendar-month comparison,
    /// never a textual prefix match on the date string.
    pub fn contains(&self, data: NaiveDate) -> bool {
        data.year() == self.ano && data.month() == self.mes
    }
}

impl fmt::Display for MesReferencia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.ano, self.mes)
    }
}

impl FromStr for MesReferencia {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BillingError::invalid("mes", s);
        let (ano, mes) = s.split_once('-').ok_or_else(invalid)?;
        if ano.len() != 4 || mes.len() != 2 {
            return Err(invalid());
        }
        let ano: i32 = ano.parse().map_err(|_| invalid())?;
        let mes: u32 = mes.parse().map_err(|_| invalid())?;
        Self::new(ano, mes)
    }
}

impl TryFrom<String> for MesReferencia {
    type Error = BillingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MesReferencia> for String {
    fn from(m: MesReferencia) -> Self {
        m.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round() {
        let m: MesReferencia = "2024-04".parse().unwrap();
        assert_eq!(m.ano(), 2024);
        assert_eq!(m.mes(), 4);
        assert_eq!(m.to_string(), "2024-04");
    }

    #[test]
    fn rejects_malformed() {
        assert!("2024-13".parse::<MesReferencia>().is_err());
        assert!("2024-00".parse::<MesReferencia>().is_err());
        assert!("2024".parse::<MesReferencia>().is_err());
        assert!("2024-4".parse::<MesReferencia>().is_err());
        assert!("abcd-ef".parse::<MesReferencia>().is_err());
    }

    #[test]
    fn contains_is_a_month_range() {
        let m: MesReferencia = "2024-04".parse().unwrap();
        assert!(m.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
        assert!(m.contains(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()));
        assert!(!m.contains(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
        assert!(!m.contains(NaiveDate::from_ymd_opt(2023, 4, 15).unwrap()));
    }

    #[test]
    fn ordering_is_chronological() {
        let a: MesReferencia = "2024-09".parse().unwrap();
        let b: MesReferencia = "2024-10".parse().unwrap();
        let c: MesReferencia = "2025-01".parse().unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn serde_uses_the_string_form() {
        let m: MesReferencia = "2024-04".parse().unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"2024-04\"");
        let back: MesReferencia = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
