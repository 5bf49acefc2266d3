//! In-memory store backends.
//!
//! Used as test fixtures and as an embeddable backend. Each operation takes
//! the collection mutex once; concurrent upserts on the same key resolve to
//! whichever write lands last, matching the module's accepted last-write-wins
//! semantics.

use std::sync::Mutex;

use chrono::NaiveDate;
use grana_core::{BillingError, Cartao, Fatura, Lancamento, MesReferencia, StatusFatura};

use crate::store::{CartaoRegistry, FaturaStore, LancamentoFilter, LancamentoLedger};

/// In-memory transaction ledger.
#[derive(Debug, Default)]
pub struct MemLedger {
    lancamentos: Mutex<Vec<Lancamento>>,
}

impl MemLedger {
    pub fn new(lancamentos: Vec<Lancamento>) -> Self {
        Self {
            lancamentos: Mutex::new(lancamentos),
        }
    }

    pub fn push(&self, lancamento: Lancamento) {
        self.lancamentos
            .lock()
            .expect("ledger mutex poisoned")
            .push(lancamento);
    }
}

impl LancamentoLedger for MemLedger {
    fn find(&self, filtro: &LancamentoFilter) -> Result<Vec<Lancamento>, BillingError> {
        let lancamentos = self.lancamentos.lock().expect("ledger mutex poisoned");
        Ok(lancamentos
            .iter()
            .filter(|l| filtro.matches(l))
            .cloned()
            .collect())
    }
}

/// In-memory card registry.
#[derive(Debug, Default)]
pub struct MemCartoes {
    cartoes: Mutex<Vec<Cartao>>,
}

impl MemCartoes {
    pub fn new(cartoes: Vec<Cartao>) -> Self {
        Self {
            cartoes: Mutex::new(cartoes),
        }
    }

    pub fn push(&self, cartao: Cartao) {
        self.cartoes
            .lock()
            .expect("cartoes mutex poisoned")
            .push(cartao);
    }
}

impl CartaoRegistry for MemCartoes {
    fn get(&self, cartao_id: &str) -> Result<Cartao, BillingError> {
        let cartoes = self.cartoes.lock().expect("cartoes mutex poisoned");
        cartoes
            .iter()
            .find(|c| c.id == cartao_id)
            .cloned()
            .ok_or_else(|| BillingError::not_found("cartao", cartao_id))
    }
}

/// In-memory invoice store.
#[derive(Debug, Default)]
pub struct MemFaturas {
    faturas: Mutex<Vec<Fatura>>,
}

impl MemFaturas {
    pub fn new(faturas: Vec<Fatura>) -> Self {
        Self {
            faturas: Mutex::new(faturas),
        }
    }

    /// Snapshot of everything persisted, for assertions.
    pub fn all(&self) -> Vec<Fatura> {
        self.faturas.lock().expect("faturas mutex poisoned").clone()
    }
}

impl FaturaStore for MemFaturas {
    fn find(
        &self,
        cartao_id: &str,
        mes: MesReferencia,
    ) -> Result<Option<Fatura>, BillingError> {
        let faturas = self.faturas.lock().expect("faturas mutex poisoned");
        Ok(faturas
            .iter()
            .find(|f| f.cartao_id == cartao_id && f.mes_referencia == mes)
            .cloned())
    }

    fn list_by_cartao(&self, cartao_id: &str) -> Result<Vec<Fatura>, BillingError> {
        let faturas = self.faturas.lock().expect("faturas mutex poisoned");
        Ok(faturas
            .iter()
            .filter(|f| f.cartao_id == cartao_id)
            .cloned()
            .collect())
    }

    fn open_due_between(
        &self,
        de: NaiveDate,
        ate: NaiveDate,
    ) -> Result<Vec<Fatura>, BillingError> {
        let faturas = self.faturas.lock().expect("faturas mutex poisoned");
        Ok(faturas
            .iter()
            .filter(|f| {
                f.status == StatusFatura::Aberta
                    && f.data_vencimento >= de
                    && f.data_vencimento <= ate
            })
            .cloned()
            .collect())
    }

    fn insert(&self, fatura: &Fatura) -> Result<(), BillingError> {
        let mut faturas = self.faturas.lock().expect("faturas mutex poisoned");
        faturas.push(fatura.clone());
        Ok(())
    }

    fn update_totals(
        &self,
        cartao_id: &str,
        mes: MesReferencia,
        valor_total: f64,
        lancamentos_ids: &[String],
    ) -> Result<(), BillingError> {
        let mut faturas = self.faturas.lock().expect("faturas mutex poisoned");
        if let Some(f) = faturas
            .iter_mut()
            .find(|f| f.cartao_id == cartao_id && f.mes_referencia == mes)
        {
            f.valor_total = valor_total;
            f.lancamentos_ids = lancamentos_ids.to_vec();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grana_core::{Forma, Tipo};

    #[test]
    fn registry_not_found() {
        let cartoes = MemCartoes::default();
        let err = cartoes.get("nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn update_totals_leaves_other_fields_alone() {
        let mes: MesReferencia = "2024-04".parse().unwrap();
        let fatura = Fatura {
            id: Fatura::realized_id("c1", mes),
            cartao_id: "c1".into(),
            mes_referencia: mes,
            valor_total: 10.0,
            valor_pago: 5.0,
            data_vencimento: "2024-05-12".parse().unwrap(),
            status: StatusFatura::Aberta,
            lancamentos_ids: vec!["l1".into()],
            criado_em: None,
        };
        let store = MemFaturas::new(vec![fatura]);

        store
            .update_totals("c1", mes, 99.0, &["l1".into(), "l2".into()])
            .unwrap();

        let updated = store.find("c1", mes).unwrap().unwrap();
        assert_eq!(updated.valor_total, 99.0);
        assert_eq!(updated.lancamentos_ids, vec!["l1", "l2"]);
        assert_eq!(updated.valor_pago, 5.0);
        assert_eq!(updated.id, "c1_2024-04");
    }

    #[test]
    fn ledger_filters_through_the_shared_predicate() {
        let ledger = MemLedger::default();
        ledger.push(Lancamento {
            id: "l1".into(),
            data: "2024-04-03".parse().unwrap(),
            valor: 50.0,
            forma: Forma::Credito,
            tipo: Tipo::Saida,
            categoria: "geral".into(),
            descricao: "x".into(),
            origem: None,
            parcelas_total: None,
            parcela_atual: None,
        });

        let found = ledger
            .find(&LancamentoFilter::credit_outflows_in("2024-04".parse().unwrap()))
            .unwrap();
        assert_eq!(found.len(), 1);

        let none = ledger
            .find(&LancamentoFilter::credit_outflows_in("2024-05".parse().unwrap()))
            .unwrap();
        assert!(none.is_empty());
    }
}
