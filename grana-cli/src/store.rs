//! JSON-file store: one pretty-printed JSON array per collection under a
//! data directory. Every operation is a read-modify-write of the whole file;
//! concurrent writers resolve to whichever write lands last.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use grana_core::{BillingError, Cartao, Fatura, Lancamento, MesReferencia, StatusFatura};
use grana_fatura::{CartaoRegistry, FaturaStore, LancamentoFilter, LancamentoLedger};
use serde::Serialize;
use serde::de::DeserializeOwned;

const CARTOES: &str = "cartoes.json";
const LANCAMENTOS: &str = "lancamentos.json";
const FATURAS: &str = "faturas.json";

/// Data directory, `~/.grana` by default.
pub fn grana_home() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME is not set"))?;
    Ok(PathBuf::from(home).join(".grana"))
}

/// File-backed implementation of all three billing collaborators.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, BillingError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(BillingError::storage)?;
        Ok(Self { dir })
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn read_vec<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, BillingError> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path).map_err(BillingError::storage)?;
        serde_json::from_str(&raw)
            .map_err(|e| BillingError::storage(format!("{}: {e}", path.display())))
    }

    fn write_vec<T: Serialize>(&self, file: &str, items: &[T]) -> Result<(), BillingError> {
        let path = self.path(file);
        let json = serde_json::to_string_pretty(items).map_err(BillingError::storage)?;
        fs::write(&path, json)
            .map_err(|e| BillingError::storage(format!("{}: {e}", path.display())))
    }

    /// Insert or replace a card, keyed on id. The caller constructs the card
    /// through `Cartao::with_limits`/`set_limits`, so `limite_disponivel` is
    /// consistent by the time it reaches the file.
    pub fn upsert_cartao(&self, cartao: Cartao) -> Result<(), BillingError> {
        let mut cartoes: Vec<Cartao> = self.read_vec(CARTOES)?;
        match cartoes.iter_mut().find(|c| c.id == cartao.id) {
            Some(existente) => *existente = cartao,
            None => cartoes.push(cartao),
        }
        self.write_vec(CARTOES, &cartoes)
    }

    pub fn list_cartoes(&self) -> Result<Vec<Cartao>, BillingError> {
        self.read_vec(CARTOES)
    }

    pub fn add_lancamento(&self, lancamento: Lancamento) -> Result<(), BillingError> {
        let mut lancamentos: Vec<Lancamento> = self.read_vec(LANCAMENTOS)?;
        lancamentos.push(lancamento);
        self.write_vec(LANCAMENTOS, &lancamentos)
    }
}

impl LancamentoLedger for JsonStore {
    fn find(&self, filtro: &LancamentoFilter) -> Result<Vec<Lancamento>, BillingError> {
        let lancamentos: Vec<Lancamento> = self.read_vec(LANCAMENTOS)?;
        Ok(lancamentos.into_iter().filter(|l| filtro.matches(l)).collect())
    }
}

impl CartaoRegistry for JsonStore {
    fn get(&self, cartao_id: &str) -> Result<Cartao, BillingError> {
        let cartoes: Vec<Cartao> = self.read_vec(CARTOES)?;
        cartoes
            .into_iter()
            .find(|c| c.id == cartao_id)
            .ok_or_else(|| BillingError::not_found("cartao", cartao_id))
    }
}

impl FaturaStore for JsonStore {
    fn find(
        &self,
        cartao_id: &str,
        mes: MesReferencia,
    ) -> Result<Option<Fatura>, BillingError> {
        let faturas: Vec<Fatura> = self.read_vec(FATURAS)?;
        Ok(faturas
            .into_iter()
            .find(|f| f.cartao_id == cartao_id && f.mes_referencia == mes))
    }

    fn list_by_cartao(&self, cartao_id: &str) -> Result<Vec<Fatura>, BillingError> {
        let faturas: Vec<Fatura> = self.read_vec(FATURAS)?;
        Ok(faturas.into_iter().filter(|f| f.cartao_id == cartao_id).collect())
    }

    fn open_due_between(
        &self,
        de: NaiveDate,
        ate: NaiveDate,
    ) -> Result<Vec<Fatura>, BillingError> {
        let faturas: Vec<Fatura> = self.read_vec(FATURAS)?;
        Ok(faturas
            .into_iter()
            .filter(|f| {
                f.status == StatusFatura::Aberta
                    && f.data_vencimento >= de
                    && f.data_vencimento <= ate
            })
            .collect())
    }

    fn insert(&self, fatura: &Fatura) -> Result<(), BillingError> {
        let mut faturas: Vec<Fatura> = self.read_vec(FATURAS)?;
        faturas.push(fatura.clone());
        self.write_vec(FATURAS, &faturas)
    }

    fn update_totals(
        &self,
        cartao_id: &str,
        mes: MesReferencia,
        valor_total: f64,
        lancamentos_ids: &[String],
    ) -> Result<(), BillingError> {
        let mut faturas: Vec<Fatura> = self.read_vec(FATURAS)?;
        if let Some(f) = faturas
            .iter_mut()
            .find(|f| f.cartao_id == cartao_id && f.mes_referencia == mes)
        {
            f.valor_total = valor_total;
            f.lancamentos_ids = lancamentos_ids.to_vec();
            self.write_vec(FATURAS, &faturas)?;
        }
        Ok(())
    }
}
