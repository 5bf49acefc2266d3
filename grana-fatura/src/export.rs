//! Invoice exporter: renders a resolved invoice and its transactions as a
//! semicolon-delimited CSV document.

use chrono::NaiveDate;
use grana_core::{BillingError, Lancamento, MesReferencia, StatusFatura, due_date};

use crate::engine::Billing;
use crate::store::{CartaoRegistry, FaturaStore, LancamentoFilter, LancamentoLedger};

/// Header block of a resolved invoice, realized or projected.
#[derive(Debug, Clone)]
pub struct ExportHeader {
    pub mes: MesReferencia,
    /// Absent when a projected-month export cannot resolve the card.
    pub data_vencimento: Option<NaiveDate>,
    pub status: StatusFatura,
    pub valor_total: f64,
}

/// A rendered invoice document plus its download filename hint.
#[derive(Debug, Clone)]
pub struct FaturaCsv {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Render the tabular document: title block, blank separator, column header,
/// then one row per transaction in ascending date order regardless of the
/// order they were supplied in.
pub fn render_csv(
    header: &ExportHeader,
    lancamentos: &[Lancamento],
) -> Result<Vec<u8>, BillingError> {
    use std::io::Write as _;

    let vencimento = header
        .data_vencimento
        .map(|d| d.to_string())
        .unwrap_or_default();

    // Title block rows carry no delimiter, so they are written directly; the
    // csv writer would render the blank separator as a quoted empty field.
    let mut out = Vec::new();
    writeln!(out, "FATURA DO CARTÃO DE CRÉDITO").map_err(BillingError::storage)?;
    writeln!(out, "Mês de Referência: {}", header.mes).map_err(BillingError::storage)?;
    writeln!(out, "Data de Vencimento: {vencimento}").map_err(BillingError::storage)?;
    writeln!(out, "Status: {}", header.status.as_str().to_uppercase())
        .map_err(BillingError::storage)?;
    writeln!(out, "Valor Total: R$ {:.2}", header.valor_total)
        .map_err(BillingError::storage)?;
    writeln!(out).map_err(BillingError::storage)?;

    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(out);
    wtr.write_record(["Data", "Descrição", "Categoria", "Valor", "Parcela"])
        .map_err(BillingError::storage)?;

    let mut ordenados: Vec<&Lancamento> = lancamentos.iter().collect();
    ordenados.sort_by_key(|l| l.data);

    for l in ordenados {
        wtr.write_record([
            l.data.to_string(),
            l.descricao.clone(),
            l.categoria.clone(),
            format!("R$ {:.2}", l.valor),
            l.parcela_label(),
        ])
        .map_err(BillingError::storage)?;
    }

    wtr.into_inner().map_err(BillingError::storage)
}

impl<L, C, F> Billing<L, C, F>
where
    L: LancamentoLedger,
    C: CartaoRegistry,
    F: FaturaStore,
{
    /// Export one month's invoice.
    ///
    /// A realized invoice exports exactly its `lancamentos_ids`; otherwise
    /// the month is treated as projected and its eligible transactions are
    /// re-derived. Fails with `NotFound` when the resolved transaction set
    /// is empty.
    pub fn export_month(
        &self,
        cartao_id: &str,
        mes: MesReferencia,
    ) -> Result<FaturaCsv, BillingError> {
        let (header, lancamentos) = match self.faturas().find(cartao_id, mes)? {
            Some(fatura) => {
                let lancamentos = self
                    .ledger()
                    .find(&LancamentoFilter::by_ids(fatura.lancamentos_ids.clone()))?;
                let header = ExportHeader {
                    mes,
                    data_vencimento: Some(fatura.data_vencimento),
                    status: fatura.status,
                    valor_total: fatura.valor_total,
                };
                (header, lancamentos)
            }
            None => {
                let lancamentos =
                    self.ledger().find(&LancamentoFilter::installments_in(mes))?;
                let valor_total = lancamentos.iter().map(|l| l.valor).sum();
                // The due date is best-effort here: a missing card leaves the
                // cell empty instead of failing the export.
                let data_vencimento = match self.cartoes().get(cartao_id) {
                    Ok(cartao) => Some(due_date(mes, cartao.dia_vencimento)),
                    Err(err) if err.is_not_found() => None,
                    Err(err) => return Err(err),
                };
                let header = ExportHeader {
                    mes,
                    data_vencimento,
                    status: StatusFatura::Futura,
                    valor_total,
                };
                (header, lancamentos)
            }
        };

        if lancamentos.is_empty() {
            return Err(BillingError::not_found(
                "fatura",
                format!("{cartao_id}/{mes}"),
            ));
        }

        Ok(FaturaCsv {
            filename: format!("fatura_{cartao_id}_{mes}.csv"),
            content: render_csv(&header, &lancamentos)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemCartoes, MemFaturas, MemLedger};
    use grana_core::{Cartao, Forma, Tipo};

    fn credito(id: &str, data: &str, valor: f64, descricao: &str) -> Lancamento {
        Lancamento {
            id: id.into(),
            data: data.parse().unwrap(),
            valor,
            forma: Forma::Credito,
            tipo: Tipo::Saida,
            categoria: "mercado".into(),
            descricao: descricao.into(),
            origem: None,
            parcelas_total: None,
            parcela_atual: None,
        }
    }

    fn lines(csv: &FaturaCsv) -> Vec<String> {
        String::from_utf8(csv.content.clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn realized_export_uses_the_persisted_ids() {
        let mes: MesReferencia = "2024-04".parse().unwrap();
        let ledger = MemLedger::new(vec![
            credito("l2", "2024-04-20", 50.50, "farmacia"),
            credito("l1", "2024-04-03", 100.0, "mercado central"),
            credito("fora", "2024-04-10", 999.0, "not on the invoice"),
        ]);
        let fatura = grana_core::Fatura {
            id: grana_core::Fatura::realized_id("c1", mes),
            cartao_id: "c1".into(),
            mes_referencia: mes,
            valor_total: 150.50,
            valor_pago: 0.0,
            data_vencimento: "2024-05-12".parse().unwrap(),
            status: StatusFatura::Aberta,
            lancamentos_ids: vec!["l1".into(), "l2".into()],
            criado_em: None,
        };
        let billing = Billing::new(
            ledger,
            MemCartoes::new(vec![Cartao::with_limits("c1", "Nubank", 5000.0, 0.0, Some(12))]),
            MemFaturas::new(vec![fatura]),
        );

        let doc = billing.export_month("c1", mes).unwrap();
        assert_eq!(doc.filename, "fatura_c1_2024-04.csv");

        let linhas = lines(&doc);
        assert_eq!(linhas[0], "FATURA DO CARTÃO DE CRÉDITO");
        assert_eq!(linhas[1], "Mês de Referência: 2024-04");
        assert_eq!(linhas[2], "Data de Vencimento: 2024-05-12");
        assert_eq!(linhas[3], "Status: ABERTA");
        assert_eq!(linhas[4], "Valor Total: R$ 150.50");
        assert_eq!(linhas[5], "");
        assert_eq!(linhas[6], "Data;Descrição;Categoria;Valor;Parcela");
        // Rows come back date-ascending even though l2 was supplied first.
        assert_eq!(linhas[7], "2024-04-03;mercado central;mercado;R$ 100.00;");
        assert_eq!(linhas[8], "2024-04-20;farmacia;mercado;R$ 50.50;");
        assert_eq!(linhas.len(), 9);
    }

    #[test]
    fn projected_export_rederives_the_month() {
        let mut p1 = credito("p1", "2024-06-10", 80.0, "notebook 2/4");
        p1.parcelas_total = Some(4);
        p1.parcela_atual = Some(2);
        let billing = Billing::new(
            MemLedger::new(vec![p1, credito("plain", "2024-06-12", 5.0, "cafe")]),
            MemCartoes::new(vec![Cartao::with_limits("c1", "Nubank", 5000.0, 0.0, Some(12))]),
            MemFaturas::default(),
        );

        let doc = billing.export_month("c1", "2024-06".parse().unwrap()).unwrap();
        let linhas = lines(&doc);
        assert_eq!(linhas[2], "Data de Vencimento: 2024-07-12");
        assert_eq!(linhas[3], "Status: FUTURA");
        assert_eq!(linhas[4], "Valor Total: R$ 80.00");
        assert_eq!(linhas[7], "2024-06-10;notebook 2/4;mercado;R$ 80.00;2/4");
        assert_eq!(linhas.len(), 8, "non-installment cafe row is excluded");
    }

    #[test]
    fn projected_export_tolerates_a_missing_card() {
        let mut p1 = credito("p1", "2024-06-10", 80.0, "notebook");
        p1.parcelas_total = Some(4);
        let billing = Billing::new(
            MemLedger::new(vec![p1]),
            MemCartoes::default(),
            MemFaturas::default(),
        );

        let doc = billing.export_month("c1", "2024-06".parse().unwrap()).unwrap();
        let linhas = lines(&doc);
        assert_eq!(linhas[2], "Data de Vencimento: ");
    }

    #[test]
    fn empty_month_is_not_found() {
        let billing = Billing::new(
            MemLedger::default(),
            MemCartoes::new(vec![Cartao::with_limits("c1", "Nubank", 5000.0, 0.0, None)]),
            MemFaturas::default(),
        );
        let err = billing
            .export_month("c1", "2024-06".parse().unwrap())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
