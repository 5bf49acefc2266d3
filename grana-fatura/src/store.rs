//! Collaborator seams: the transaction ledger, the card registry, and the
//! invoice store.
//!
//! The engine only ever talks to these traits; backends share the
//! `LancamentoFilter::matches` predicate so every store filters identically.

use chrono::NaiveDate;
use grana_core::{BillingError, Cartao, Fatura, Forma, Lancamento, MesReferencia, Tipo};

/// Query filter over ledger transactions. All set fields must match.
#[derive(Debug, Clone, Default)]
pub struct LancamentoFilter {
    pub forma: Option<Forma>,
    pub tipo: Option<Tipo>,
    /// Closed calendar-month membership on `data`.
    pub mes: Option<MesReferencia>,
    /// Inclusive lower bound on `data`.
    pub data_minima: Option<NaiveDate>,
    /// When true, only installment-eligible transactions (explicit
    /// `parcela_futura` tag or `parcelas_total > 1`).
    pub parcelado: bool,
    /// Restrict to an explicit id set.
    pub ids: Option<Vec<String>>,
}

impl LancamentoFilter {
    /// Credit outflows of one purchase month: the realized-invoice selection.
    pub fn credit_outflows_in(mes: MesReferencia) -> Self {
        Self {
            forma: Some(Forma::Credito),
            tipo: Some(Tipo::Saida),
            mes: Some(mes),
            ..Self::default()
        }
    }

    /// Forward-dated installment-eligible credit outflows: the projection
    /// selection.
    pub fn future_installments(hoje: NaiveDate) -> Self {
        Self {
            forma: Some(Forma::Credito),
            tipo: Some(Tipo::Saida),
            data_minima: Some(hoje),
            parcelado: true,
            ..Self::default()
        }
    }

    /// Installment-eligible credit outflows of one month: the projected-month
    /// export selection (no lower date bound; an in-progress month still
    /// exports).
    pub fn installments_in(mes: MesReferencia) -> Self {
        Self {
            forma: Some(Forma::Credito),
            tipo: Some(Tipo::Saida),
            mes: Some(mes),
            parcelado: true,
            ..Self::default()
        }
    }

    pub fn by_ids(ids: Vec<String>) -> Self {
        Self {
            ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn matches(&self, l: &Lancamento) -> bool {
        if self.forma.is_some_and(|f| l.forma != f) {
            return false;
        }
        if self.tipo.is_some_and(|t| l.tipo != t) {
            return false;
        }
        if self.mes.is_some_and(|m| !m.contains(l.data)) {
            return false;
        }
        if self.data_minima.is_some_and(|d| l.data < d) {
            return false;
        }
        if self.parcelado && !l.is_installment() {
            return false;
        }
        if let Some(ids) = &self.ids {
            if !ids.iter().any(|id| *id == l.id) {
                return false;
            }
        }
        true
    }
}

/// Query capability over the transaction ledger. Results are unordered
/// unless the caller sorts.
pub trait LancamentoLedger {
    fn find(&self, filtro: &LancamentoFilter) -> Result<Vec<Lancamento>, BillingError>;
}

/// Lookup-by-id over the card registry.
pub trait CartaoRegistry {
    /// Fails with `NotFound` when the card does not exist.
    fn get(&self, cartao_id: &str) -> Result<Cartao, BillingError>;
}

/// Persistence for realized invoices. A (cartao_id, mes_referencia) pair is
/// unique; the upsert key is that pair, never the invoice id.
pub trait FaturaStore {
    fn find(
        &self,
        cartao_id: &str,
        mes: MesReferencia,
    ) -> Result<Option<Fatura>, BillingError>;

    /// All persisted invoices of a card, in no particular order.
    fn list_by_cartao(&self, cartao_id: &str) -> Result<Vec<Fatura>, BillingError>;

    /// Open invoices with a due date in the inclusive range `[de, ate]`.
    fn open_due_between(
        &self,
        de: NaiveDate,
        ate: NaiveDate,
    ) -> Result<Vec<Fatura>, BillingError>;

    fn insert(&self, fatura: &Fatura) -> Result<(), BillingError>;

    /// Targeted refresh of `valor_total` and `lancamentos_ids` on the
    /// matched document; every other field is left untouched. A vanished
    /// match is silently ignored (last-write-wins semantics).
    fn update_totals(
        &self,
        cartao_id: &str,
        mes: MesReferencia,
        valor_total: f64,
        lancamentos_ids: &[String],
    ) -> Result<(), BillingError>;
}
