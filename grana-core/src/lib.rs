//! grana-core: domain types and pure billing-cycle logic for the credit-card
//! billing module.

pub mod cartao;
pub mod error;
pub mod fatura;
pub mod lancamento;
pub mod mes;
pub mod vencimento;

pub use cartao::Cartao;
pub use error::BillingError;
pub use fatura::{Fatura, StatusFatura};
pub use lancamento::{Forma, Lancamento, ORIGEM_PARCELA_FUTURA, Tipo};
pub use mes::MesReferencia;
pub use vencimento::{DEFAULT_CLOSING_DAY, MAX_CLOSING_DAY, due_date};
