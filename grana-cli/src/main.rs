use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use grana_core::{Cartao, Forma, Lancamento, MesReferencia, Tipo};
use grana_fatura::{Billing, DEFAULT_HORIZON_MONTHS};

mod store;

use store::{JsonStore, grana_home};

#[derive(Parser, Debug)]
#[command(name = "grana", version, about = "Credit-card billing for the grana tracker")]
struct Cli {
    /// Data directory (default: ~/.grana)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Card registry maintenance
    Cartao {
        #[command(subcommand)]
        command: CartaoCommand,
    },

    /// Ledger entry maintenance
    Lancamento {
        #[command(subcommand)]
        command: LancamentoCommand,
    },

    /// Compute (or refresh) the realized invoice of a card for a month
    Calcular {
        cartao_id: String,

        /// Reference month YYYY-MM (default: current month)
        #[arg(long)]
        mes: Option<String>,
    },

    /// Project future invoices from pending installments
    Futuras {
        cartao_id: String,

        /// Projection horizon in months
        #[arg(long, default_value_t = DEFAULT_HORIZON_MONTHS)]
        meses: u32,
    },

    /// List all invoices of a card, persisted and projected, newest first
    Listar {
        cartao_id: String,

        /// Skip projected invoices
        #[arg(long)]
        sem_futuras: bool,
    },

    /// Open invoices due within the next N days
    Alertas {
        #[arg(long, default_value_t = 7)]
        dias: i64,
    },

    /// Export one month's invoice as semicolon-delimited CSV
    Exportar {
        cartao_id: String,

        /// Reference month YYYY-MM
        mes: String,

        /// Output path (default: the invoice's own filename in the cwd)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum CartaoCommand {
    /// Register or update a card; the available limit is recomputed here
    Add {
        id: String,

        #[arg(long)]
        nome: String,

        #[arg(long)]
        limite_total: f64,

        #[arg(long, default_value_t = 0.0)]
        limite_usado: f64,

        /// Statement closing day-of-month (default applied at billing time)
        #[arg(long)]
        dia_vencimento: Option<u32>,
    },

    /// List registered cards
    List,
}

#[derive(Subcommand, Debug)]
enum LancamentoCommand {
    /// Record a transaction in the ledger
    Add {
        /// Transaction id (default: generated)
        #[arg(long)]
        id: Option<String>,

        /// Purchase date YYYY-MM-DD
        #[arg(long)]
        data: String,

        #[arg(long)]
        valor: f64,

        /// credito | debito | pix | dinheiro
        #[arg(long, default_value = "credito")]
        forma: String,

        /// saida | entrada
        #[arg(long, default_value = "saida")]
        tipo: String,

        #[arg(long, default_value = "geral")]
        categoria: String,

        #[arg(long)]
        descricao: String,

        /// Tag, e.g. parcela_futura for forward-dated installments
        #[arg(long)]
        origem: Option<String>,

        #[arg(long)]
        parcelas_total: Option<u32>,

        #[arg(long)]
        parcela_atual: Option<u32>,
    },
}

fn parse_forma(s: &str) -> Result<Forma> {
    Ok(match s {
        "credito" => Forma::Credito,
        "debito" => Forma::Debito,
        "pix" => Forma::Pix,
        "dinheiro" => Forma::Dinheiro,
        other => bail!("unknown forma: {other}"),
    })
}

fn parse_tipo(s: &str) -> Result<Tipo> {
    Ok(match s {
        "saida" => Tipo::Saida,
        "entrada" => Tipo::Entrada,
        other => bail!("unknown tipo: {other}"),
    })
}

fn parse_mes(s: &str) -> Result<MesReferencia> {
    s.parse().with_context(|| format!("parsing month '{s}'"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let dir = match cli.data_dir {
        Some(dir) => dir,
        None => grana_home()?,
    };
    let store = JsonStore::open(&dir)
        .with_context(|| format!("opening data dir {}", dir.display()))?;
    let billing = Billing::new(store.clone(), store.clone(), store.clone());
    let hoje: NaiveDate = Local::now().date_naive();

    match cli.command {
        Command::Cartao { command } => match command {
            CartaoCommand::Add {
                id,
                nome,
                limite_total,
                limite_usado,
                dia_vencimento,
            } => {
                let cartao =
                    Cartao::with_limits(id, nome, limite_total, limite_usado, dia_vencimento);
                store.upsert_cartao(cartao.clone())?;
                println!(
                    "{} ({}) limite {:.2} usado {:.2} disponivel {:.2}",
                    cartao.id,
                    cartao.nome,
                    cartao.limite_total,
                    cartao.limite_usado,
                    cartao.limite_disponivel
                );
            }
            CartaoCommand::List => {
                for c in store.list_cartoes()? {
                    println!(
                        "{} | {} | disponivel R$ {:.2} de R$ {:.2} | vence dia {}",
                        c.id,
                        c.nome,
                        c.limite_disponivel,
                        c.limite_total,
                        c.dia_vencimento
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "-".into()),
                    );
                }
            }
        },

        Command::Lancamento { command } => match command {
            LancamentoCommand::Add {
                id,
                data,
                valor,
                forma,
                tipo,
                categoria,
                descricao,
                origem,
                parcelas_total,
                parcela_atual,
            } => {
                let lancamento = Lancamento {
                    id: id.unwrap_or_else(|| format!("l-{}", Utc::now().timestamp_millis())),
                    data: data.parse().with_context(|| format!("parsing date '{data}'"))?,
                    valor,
                    forma: parse_forma(&forma)?,
                    tipo: parse_tipo(&tipo)?,
                    categoria,
                    descricao,
                    origem,
                    parcelas_total,
                    parcela_atual,
                };
                store.add_lancamento(lancamento.clone())?;
                println!("recorded {} on {}", lancamento.id, lancamento.data);
            }
        },

        Command::Calcular { cartao_id, mes } => {
            let mes = mes.as_deref().map(parse_mes).transpose()?;
            let fatura = billing.compute_current(&cartao_id, mes, hoje)?;
            println!(
                "{} | {} | total R$ {:.2} | vence {} | {}",
                fatura.id,
                fatura.mes_referencia,
                fatura.valor_total,
                fatura.data_vencimento,
                fatura.status.as_str(),
            );
        }

        Command::Futuras { cartao_id, meses } => {
            let futuras = billing.project_future(&cartao_id, meses, hoje)?;
            if futuras.is_empty() {
                println!("no projected invoices within {meses} months");
            }
            for f in futuras {
                println!(
                    "{} | total R$ {:.2} | vence {} | {} parcelas",
                    f.mes_referencia,
                    f.valor_total,
                    f.data_vencimento,
                    f.lancamentos_ids.len(),
                );
            }
        }

        Command::Listar { cartao_id, sem_futuras } => {
            for f in billing.list_full(&cartao_id, !sem_futuras, hoje)? {
                println!(
                    "{} | {} | total R$ {:.2} | pago R$ {:.2} | vence {}",
                    f.mes_referencia,
                    f.status.as_str(),
                    f.valor_total,
                    f.valor_pago,
                    f.data_vencimento,
                );
            }
        }

        Command::Alertas { dias } => {
            let alertas = billing.due_within(dias, hoje)?;
            println!("{} invoice(s) due within {} day(s)", alertas.len(), dias);
            for f in alertas {
                println!(
                    "{} | {} | R$ {:.2} due {}",
                    f.cartao_id, f.mes_referencia, f.valor_total, f.data_vencimento,
                );
            }
        }

        Command::Exportar { cartao_id, mes, out } => {
            let mes = parse_mes(&mes)?;
            let doc = billing.export_month(&cartao_id, mes)?;
            let path = out.unwrap_or_else(|| PathBuf::from(&doc.filename));
            std::fs::write(&path, &doc.content)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("wrote {}", path.display());
        }
    }

    Ok(())
}
