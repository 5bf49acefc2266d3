//! Invoice aggregator: realized computation, future projection, merged
//! listing, and due-date alerting.

use std::collections::BTreeMap;

use chrono::{Duration, Months, NaiveDate, Utc};
use grana_core::{BillingError, Fatura, Lancamento, MesReferencia, StatusFatura, due_date};

use crate::store::{CartaoRegistry, FaturaStore, LancamentoFilter, LancamentoLedger};

/// Projection horizon used by the merged listing.
pub const DEFAULT_HORIZON_MONTHS: u32 = 6;

/// The billing engine, generic over its three collaborators.
///
/// Every operation takes `hoje` (today) explicitly; the engine never reads
/// the clock for anything beyond the `criado_em` stamp of a fresh document.
pub struct Billing<L, C, F> {
    ledger: L,
    cartoes: C,
    faturas: F,
}

impl<L, C, F> Billing<L, C, F>
where
    L: LancamentoLedger,
    C: CartaoRegistry,
    F: FaturaStore,
{
    pub fn new(ledger: L, cartoes: C, faturas: F) -> Self {
        Self {
            ledger,
            cartoes,
            faturas,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn cartoes(&self) -> &C {
        &self.cartoes
    }

    pub fn faturas(&self) -> &F {
        &self.faturas
    }

    /// Compute (or refresh) the realized invoice of a card for `mes`,
    /// defaulting to the current month.
    ///
    /// Idempotent on the aggregate value: at most one write per call, an
    /// upsert keyed on (cartao_id, mes_referencia). A refresh touches only
    /// `valor_total` and `lancamentos_ids`.
    pub fn compute_current(
        &self,
        cartao_id: &str,
        mes: Option<MesReferencia>,
        hoje: NaiveDate,
    ) -> Result<Fatura, BillingError> {
        let mes = mes.unwrap_or_else(|| MesReferencia::of(hoje));

        let lancamentos = self
            .ledger
            .find(&LancamentoFilter::credit_outflows_in(mes))?;
        let valor_total: f64 = lancamentos.iter().map(|l| l.valor).sum();
        let lancamentos_ids: Vec<String> =
            lancamentos.iter().map(|l| l.id.clone()).collect();

        if let Some(mut existente) = self.faturas.find(cartao_id, mes)? {
            tracing::debug!(%cartao_id, %mes, valor_total, "refreshing realized invoice");
            self.faturas
                .update_totals(cartao_id, mes, valor_total, &lancamentos_ids)?;
            existente.valor_total = valor_total;
            existente.lancamentos_ids = lancamentos_ids;
            return Ok(existente);
        }

        let cartao = self.cartoes.get(cartao_id)?;
        let fatura = Fatura {
            id: Fatura::realized_id(cartao_id, mes),
            cartao_id: cartao_id.to_string(),
            mes_referencia: mes,
            valor_total,
            valor_pago: 0.0,
            data_vencimento: due_date(mes, cartao.dia_vencimento),
            status: StatusFatura::Aberta,
            lancamentos_ids,
            criado_em: Some(Utc::now()),
        };
        tracing::debug!(%cartao_id, %mes, valor_total, "creating realized invoice");
        self.faturas.insert(&fatura)?;
        Ok(fatura)
    }

    /// Project future invoices from installment-bearing transactions not yet
    /// due, over `horizonte_meses` calendar months. Pure with respect to
    /// persistence.
    ///
    /// Transactions are grouped by the year-month of their own date; a whole
    /// group is discarded when its due date falls past the horizon. Results
    /// come back in ascending purchase-month order.
    pub fn project_future(
        &self,
        cartao_id: &str,
        horizonte_meses: u32,
        hoje: NaiveDate,
    ) -> Result<Vec<Fatura>, BillingError> {
        let cartao = self.cartoes.get(cartao_id)?;

        let lancamentos = self
            .ledger
            .find(&LancamentoFilter::future_installments(hoje))?;

        let mut grupos: BTreeMap<MesReferencia, Vec<Lancamento>> = BTreeMap::new();
        for l in lancamentos {
            grupos.entry(MesReferencia::of(l.data)).or_default().push(l);
        }

        let limite = hoje
            .checked_add_months(Months::new(horizonte_meses))
            .unwrap_or(NaiveDate::MAX);

        let mut futuras = Vec::new();
        for (mes, grupo) in grupos {
            let vencimento = due_date(mes, cartao.dia_vencimento);
            if vencimento > limite {
                continue;
            }
            futuras.push(Fatura {
                id: Fatura::projected_id(cartao_id, mes),
                cartao_id: cartao_id.to_string(),
                mes_referencia: mes,
                valor_total: grupo.iter().map(|l| l.valor).sum(),
                valor_pago: 0.0,
                data_vencimento: vencimento,
                status: StatusFatura::Futura,
                lancamentos_ids: grupo.iter().map(|l| l.id.clone()).collect(),
                criado_em: None,
            });
        }
        Ok(futuras)
    }

    /// All invoices of a card, persisted and (optionally) projected, merged
    /// and sorted newest purchase-month first.
    ///
    /// A `NotFound` from the projection step is absorbed so the listing
    /// degrades to persisted-only results; anything else propagates.
    pub fn list_full(
        &self,
        cartao_id: &str,
        incluir_futuras: bool,
        hoje: NaiveDate,
    ) -> Result<Vec<Fatura>, BillingError> {
        let mut faturas = self.faturas.list_by_cartao(cartao_id)?;

        if incluir_futuras {
            match self.project_future(cartao_id, DEFAULT_HORIZON_MONTHS, hoje) {
                Ok(futuras) => faturas.extend(futuras),
                Err(err) if err.is_not_found() => {
                    tracing::debug!(%cartao_id, %err, "projection skipped in merged listing");
                }
                Err(err) => return Err(err),
            }
        }

        faturas.sort_by(|a, b| b.mes_referencia.cmp(&a.mes_referencia));
        Ok(faturas)
    }

    /// Open invoices due in the inclusive window `[hoje, hoje + dias]`.
    pub fn due_within(
        &self,
        dias: i64,
        hoje: NaiveDate,
    ) -> Result<Vec<Fatura>, BillingError> {
        self.faturas
            .open_due_between(hoje, hoje + Duration::days(dias))
    }
}
