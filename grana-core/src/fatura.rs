//! Invoice aggregate: one billing cycle of one card.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::mes::MesReferencia;

/// Invoice lifecycle status.
///
/// Persisted documents written before the status field existed default to
/// `Aberta` at the deserialization boundary.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFatura {
    #[default]
    Aberta,
    Paga,
    Futura,
}

impl StatusFatura {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFatura::Aberta => "aberta",
            StatusFatura::Paga => "paga",
            StatusFatura::Futura => "futura",
        }
    }
}

/// An invoice: realized (persisted, upserted on recompute) or projected
/// (recomputed on every read, never persisted).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fatura {
    pub id: String,
    pub cartao_id: String,
    /// Year-month of the purchases, not of the due date.
    pub mes_referencia: MesReferencia,
    pub valor_total: f64,
    pub valor_pago: f64,
    /// Always in the month following `mes_referencia`.
    pub data_vencimento: NaiveDate,
    #[serde(default)]
    pub status: StatusFatura,
    pub lancamentos_ids: Vec<String>,
    /// Creation instant of the persisted document; projections carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criado_em: Option<DateTime<Utc>>,
}

impl Fatura {
    /// Id of the realized invoice for a (card, month) pair.
    pub fn realized_id(cartao_id: &str, mes: MesReferencia) -> String {
        format!("{cartao_id}_{mes}")
    }

    /// Id of the projection for a (card, purchase month) pair.
    pub fn projected_id(cartao_id: &str, mes: MesReferencia) -> String {
        format!("{cartao_id}_{mes}_futura")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_synthesis() {
        let mes: MesReferencia = "2024-04".parse().unwrap();
        assert_eq!(Fatura::realized_id("c1", mes), "c1_2024-04");
        assert_eq!(Fatura::projected_id("c1", mes), "c1_2024-04_futura");
    }

    #[test]
    fn missing_status_defaults_to_aberta() {
        let json = r#"{
            "id": "c1_2024-04",
            "cartao_id": "c1",
            "mes_referencia": "2024-04",
            "valor_total": 150.5,
            "valor_pago": 0.0,
            "data_vencimento": "2024-05-12",
            "lancamentos_ids": ["l1", "l2"]
        }"#;
        let f: Fatura = serde_json::from_str(json).unwrap();
        assert_eq!(f.status, StatusFatura::Aberta);
        assert_eq!(f.criado_em, None);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(StatusFatura::Futura).unwrap(),
            "futura"
        );
        assert_eq!(StatusFatura::Paga.as_str(), "paga");
    }
}
