//! Credit card: a credit line with a limit and a statement-closing day.

use serde::{Deserialize, Serialize};

/// A registered credit card.
///
/// `limite_disponivel` is derived state: it is recomputed by every mutation
/// path (`with_limits` / `set_limits`) and is never settable on its own, so
/// at rest it always equals `limite_total - limite_usado`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cartao {
    pub id: String,
    pub nome: String,
    pub limite_total: f64,
    pub limite_usado: f64,
    pub limite_disponivel: f64,
    /// Statement closing day-of-month. When absent, the billing-cycle
    /// calculator applies its default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dia_vencimento: Option<u32>,
}

impl Cartao {
    pub fn with_limits(
        id: impl Into<String>,
        nome: impl Into<String>,
        limite_total: f64,
        limite_usado: f64,
        dia_vencimento: Option<u32>,
    ) -> Self {
        Self {
            id: id.into(),
            nome: nome.into(),
            limite_total,
            limite_usado,
            limite_disponivel: limite_total - limite_usado,
            dia_vencimento,
        }
    }

    /// Update both limit fields, keeping the derived balance consistent.
    pub fn set_limits(&mut self, limite_total: f64, limite_usado: f64) {
        self.limite_total = limite_total;
        self.limite_usado = limite_usado;
        self.limite_disponivel = limite_total - limite_usado;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_limit_is_derived_on_create() {
        let c = Cartao::with_limits("c1", "Nubank", 5000.0, 1200.0, Some(10));
        assert_eq!(c.limite_disponivel, 3800.0);
    }

    #[test]
    fn available_limit_is_derived_on_update() {
        let mut c = Cartao::with_limits("c1", "Nubank", 5000.0, 0.0, None);
        c.set_limits(6000.0, 2500.0);
        assert_eq!(c.limite_disponivel, 3500.0);
    }

    #[test]
    fn closing_day_is_optional_in_json() {
        let json = r#"{"id":"c1","nome":"Inter","limite_total":1000.0,
            "limite_usado":0.0,"limite_disponivel":1000.0}"#;
        let c: Cartao = serde_json::from_str(json).unwrap();
        assert_eq!(c.dia_vencimento, None);
    }
}
