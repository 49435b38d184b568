mod form;

pub use form::{run_form, Console};

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::application::{failure_message, MaloteService};
use crate::domain::{
    format_brl, format_cents, format_currency_display, format_input, on_blur, parse_cents,
    parse_display_to_amount, Cents, FormHeader, Ledger, PaymentMethod,
};
use crate::io::{export_request_json, save_receipt, Exporter, ImportOptions, Importer};
use crate::transport::{
    ClientConfig, PdfClient, PdfGateway, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS,
};

/// Malote - cashier batch receipts
#[derive(Parser)]
#[command(name = "malote")]
#[command(about = "Record a batch of service transactions and request its PDF receipt")]
#[command(version)]
pub struct Cli {
    /// Base URL of the PDF service
    #[arg(long, env = "MALOTE_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "MALOTE_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the rows of a batch come from
#[derive(Args, Debug, Clone, Default)]
pub struct RowsArgs {
    /// Row as NUMERO:VALOR:METODO (e.g. "101:1.500,00:cartao"), repeatable
    #[arg(long = "row", value_name = "NUM:VALOR:METODO")]
    pub rows: Vec<String>,

    /// CSV batch file with columns numero,valor,forma_pagamento
    #[arg(short, long, conflicts_with = "rows")]
    pub input: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show how a typed amount is masked
    Format {
        /// Raw field text (e.g. "1234567")
        #[arg(allow_hyphen_values = true)]
        raw: String,
    },

    /// Show rows and totals per payment method
    Totals {
        #[command(flatten)]
        rows: RowsArgs,
    },

    /// Send a batch to the PDF service and save the receipt
    Generate {
        /// Sender name
        #[arg(short, long)]
        sender: String,

        /// Seal number of the batch
        #[arg(long)]
        seal: String,

        /// Free-text note
        #[arg(short, long)]
        note: Option<String>,

        #[command(flatten)]
        rows: RowsArgs,

        /// Directory where the PDF is saved
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that the PDF service is reachable
    Health,

    /// Normalize a CSV batch file
    ExportRows {
        /// Input CSV file
        #[arg(short, long)]
        input: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Fill the form interactively
    Form {
        /// Directory where receipts are saved
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Clear the form after each generated receipt
        #[arg(long)]
        reset_after_submit: bool,
    },
}

impl Cli {
    fn client(&self) -> Result<PdfClient> {
        let config =
            ClientConfig::new(&self.api_url).with_timeout(Duration::from_secs(self.timeout));
        PdfClient::new(config).context("Failed to build HTTP client")
    }

    pub async fn run(self) -> Result<()> {
        match &self.command {
            Commands::Format { raw } => {
                let masked = format_input(raw);
                let blurred = on_blur(&masked);
                println!("Masked:   {}", masked);
                println!("On blur:  {}", blurred);
                println!(
                    "Currency: {}",
                    format_currency_display(parse_display_to_amount(&blurred))
                );
            }

            Commands::Totals { rows } => {
                let ledger = load_ledger(rows)?;
                let mut stdout = std::io::stdout().lock();
                write_rows(&mut stdout, &ledger)?;
            }

            Commands::Generate {
                sender,
                seal,
                note,
                rows,
                output_dir,
                dry_run,
            } => {
                let mut header = FormHeader::new(sender.as_str(), seal.as_str());
                if let Some(note) = note {
                    header = header.with_note(note.as_str());
                }
                let ledger = load_ledger(rows)?;

                let mut service = MaloteService::new(self.client()?);
                service.set_header(header);
                service.set_ledger(ledger);

                run_generate_command(&mut service, output_dir, *dry_run).await?;
            }

            Commands::Health => {
                let client = self.client()?;
                match client.health().await {
                    Ok(status) => {
                        println!("PDF service reachable at {}", client.base_url());
                        if let Some(message) = status.message {
                            println!("  {}", message);
                        }
                    }
                    Err(err) => bail!("PDF service not reachable: {}", err),
                }
            }

            Commands::ExportRows { input, output } => {
                let ledger = load_ledger(&RowsArgs {
                    rows: Vec::new(),
                    input: Some(input.clone()),
                })?;
                let exporter = Exporter::new(&ledger);
                let count = match output {
                    Some(path) => {
                        let file = std::fs::File::create(path)
                            .with_context(|| format!("Failed to create {}", path))?;
                        exporter.export_rows_csv(file)?
                    }
                    None => exporter.export_rows_csv(std::io::stdout().lock())?,
                };
                eprintln!("Exported {} rows", count);
            }

            Commands::Form {
                output_dir,
                reset_after_submit,
            } => {
                let mut service = MaloteService::new(self.client()?)
                    .with_reset_after_submit(*reset_after_submit);
                if !service.check_backend().await {
                    eprintln!(
                        "Warning: PDF service not reachable at {}",
                        service.gateway().base_url()
                    );
                }

                let stdin = std::io::stdin().lock();
                let stdout = std::io::stdout();
                let mut console = Console::new(stdin, stdout);
                run_form(&mut service, &mut console, output_dir).await?;
            }
        }

        Ok(())
    }
}

async fn run_generate_command<G: PdfGateway>(
    service: &mut MaloteService<G>,
    output_dir: &Path,
    dry_run: bool,
) -> Result<()> {
    service.validate()?;

    if dry_run {
        let request = service.build_request(&Local::now());
        export_request_json(&request, std::io::stdout().lock())?;
        return Ok(());
    }

    let receipt = match service.generate_pdf(Local::now()).await {
        Ok(receipt) => receipt,
        Err(err) => bail!(failure_message(&err)),
    };
    let path = save_receipt(output_dir, &receipt)?;
    println!("Saved receipt: {}", path.display());
    Ok(())
}

/// Build a ledger from `--row` values or a CSV batch file.
pub fn load_ledger(args: &RowsArgs) -> Result<Ledger> {
    let mut ledger = Ledger::new();

    if let Some(path) = &args.input {
        let file =
            std::fs::File::open(path).with_context(|| format!("Failed to open {}", path))?;
        let result =
            Importer::new(&mut ledger).import_rows_csv(file, ImportOptions::default())?;

        if !result.errors.is_empty() {
            for err in result.errors.iter().take(10) {
                match &err.field {
                    Some(field) => eprintln!("  Line {}, {}: {}", err.line, field, err.error),
                    None => eprintln!("  Line {}: {}", err.line, err.error),
                }
            }
            if result.errors.len() > 10 {
                eprintln!("  ... and {} more errors", result.errors.len() - 10);
            }
            bail!("{} invalid rows in {}", result.errors.len(), path);
        }
        return Ok(ledger);
    }

    for (index, spec) in args.rows.iter().enumerate() {
        let (service_number, amount_cents, method) = parse_row_spec(spec)?;
        let sequence = if index == 0 {
            1
        } else {
            ledger.add_row()?.sequence
        };
        ledger.set_service_number(sequence, service_number)?;
        ledger.set_amount(sequence, amount_cents)?;
        ledger.set_payment_method(sequence, method)?;
    }

    Ok(ledger)
}

/// Parse a `NUMERO:VALOR:METODO` row argument. Number and method may be empty.
pub fn parse_row_spec(spec: &str) -> Result<(Option<u64>, Cents, PaymentMethod)> {
    let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
    let [numero, valor, metodo] = parts.as_slice() else {
        bail!("Invalid row '{}'. Use NUMERO:VALOR:METODO", spec);
    };

    let service_number = if numero.is_empty() {
        None
    } else {
        Some(
            numero
                .parse::<u64>()
                .with_context(|| format!("Invalid service number '{}'", numero))?,
        )
    };
    let amount_cents = parse_cents(valor)
        .with_context(|| format!("Invalid amount '{}'. Use '1.500,00' or '1500'", valor))?;
    let method = PaymentMethod::from_str(metodo).with_context(|| {
        format!("Unknown payment method '{}'. Use cartao or dinheiro", metodo)
    })?;

    Ok((service_number, amount_cents, method))
}

/// Print the row table followed by the totals.
pub fn write_rows<W: Write>(out: &mut W, ledger: &Ledger) -> Result<()> {
    writeln!(
        out,
        "{:>3}  {:<10} {:>14}  {:<8}",
        "#", "NUMERO", "VALOR", "PAGAMENTO"
    )?;
    writeln!(out, "{}", "-".repeat(40))?;
    for row in ledger.rows() {
        writeln!(
            out,
            "{:>3}  {:<10} {:>14}  {:<8}",
            row.sequence,
            row.service_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            format_cents(row.amount_cents),
            row.payment_method.label(),
        )?;
    }
    writeln!(out, "{}", "-".repeat(40))?;

    let totals = ledger.totals();
    writeln!(out, "{:<12} {:>18}", "Espécie:", format_brl(totals.cash))?;
    writeln!(out, "{:<12} {:>18}", "Cartão:", format_brl(totals.card))?;
    writeln!(out, "{:<12} {:>18}", "Total:", format_brl(totals.overall))?;
    Ok(())
}
