//! Ledger transactions as the billing module consumes them.
//!
//! Transactions are immutable inputs here; they are created and edited by
//! the ledger component, never by billing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `origem` tag marking a forward-dated installment created by the ledger.
pub const ORIGEM_PARCELA_FUTURA: &str = "parcela_futura";

/// Payment channel. Only credit-card transactions participate in billing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Forma {
    Credito,
    Debito,
    Pix,
    Dinheiro,
}

/// Flow direction. Only outflows participate in billing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tipo {
    Saida,
    Entrada,
}

/// A recorded transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lancamento {
    pub id: String,
    /// Calendar date of the purchase (`YYYY-MM-DD` on the wire).
    pub data: NaiveDate,
    /// Positive magnitude.
    pub valor: f64,
    pub forma: Forma,
    pub tipo: Tipo,
    pub categoria: String,
    pub descricao: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parcelas_total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parcela_atual: Option<u32>,
}

impl Lancamento {
    /// True for transactions that can land on a credit-card invoice.
    pub fn is_credit_outflow(&self) -> bool {
        self.forma == Forma::Credito && self.tipo == Tipo::Saida
    }

    /// Installment eligibility for future-invoice projection: either the
    /// explicit tag or a multi-installment count qualifies (inclusive or).
    pub fn is_installment(&self) -> bool {
        self.origem.as_deref() == Some(ORIGEM_PARCELA_FUTURA)
            || self.parcelas_total.is_some_and(|n| n > 1)
    }

    /// `current/total` label for the export's installment column, empty when
    /// the transaction carries no installment count.
    pub fn parcela_label(&self) -> String {
        match self.parcelas_total {
            Some(total) => format!("{}/{}", self.parcela_atual.unwrap_or(1), total),
            None => String::new(),
        }
    }
}
