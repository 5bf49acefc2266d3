//! grana-fatura: invoice aggregation and export for the credit-card billing
//! module. Consumes the ledger/card/invoice collaborator traits and exposes
//! the billing engine plus the CSV exporter.

pub mod engine;
pub mod export;
pub mod memory;
pub mod store;

pub use engine::{Billing, DEFAULT_HORIZON_MONTHS};
pub use export::{ExportHeader, FaturaCsv, render_csv};
pub use store::{CartaoRegistry, FaturaStore, LancamentoFilter, LancamentoLedger};
