//! Line-driven version of the batch form.
//!
//! One command per line, dispatched against the row sequence shown by
//! `show`. Confirmations and messages go through [`Console`], which is the
//! form's [`Operator`].

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::application::{MaloteService, Notice, Operator};
use crate::domain::PaymentMethod;
use crate::io::save_receipt;
use crate::transport::PdfGateway;

use super::write_rows;

const HELP: &str = "\
Commands:
  add                  add a row
  rm <row>             remove a row
  num <row> [number]   set (or clear) the service number
  val <row> <amount>   type an amount (digits are cents: 150000 -> 1.500,00)
  pay <row> <method>   cartao | dinheiro | none
  sender <name>        sender name
  seal <number>        seal number
  note [text]          note (empty to clear)
  show                 rows and totals
  clear                clear the whole form
  pdf                  generate the receipt
  help                 this text
  quit                 leave";

/// Terminal side of the form: reads commands and answers, prints messages.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt(&mut self, text: &str) -> Result<()> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Operator for Console<R, W> {
    fn confirm(&mut self, message: &str) -> bool {
        if self.prompt(&format!("{} [y/N] ", message)).is_err() {
            return false;
        }
        match self.read_line() {
            Ok(Some(answer)) => matches!(
                answer.trim().to_lowercase().as_str(),
                "y" | "yes" | "s" | "sim"
            ),
            _ => false,
        }
    }

    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::Info(message) => writeln!(self.output, "{}", message),
            Notice::Error(message) => writeln!(self.output, "Error: {}", message),
        }
        .ok();
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Run the interactive form until `quit` or end of input.
pub async fn run_form<G, R, W>(
    service: &mut MaloteService<G>,
    console: &mut Console<R, W>,
    output_dir: &Path,
) -> Result<()>
where
    G: PdfGateway,
    R: BufRead,
    W: Write,
{
    writeln!(console.output, "Malote - type 'help' for commands")?;

    loop {
        console.prompt("> ")?;
        let Some(line) = console.read_line()? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match dispatch(service, console, output_dir, line).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(err) => console.notify(Notice::Error(err.to_string())),
        }
    }

    Ok(())
}

async fn dispatch<G, R, W>(
    service: &mut MaloteService<G>,
    console: &mut Console<R, W>,
    output_dir: &Path,
    line: &str,
) -> Result<Flow>
where
    G: PdfGateway,
    R: BufRead,
    W: Write,
{
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "add" => {
            let sequence = service.add_row()?.sequence;
            console.notify(Notice::Info(format!("Added row {}", sequence)));
        }

        "rm" => {
            let sequence = parse_sequence(rest)?;
            if service.remove_row(sequence, console)?.is_some() {
                console.notify(Notice::Info(format!("Removed row {}", sequence)));
            }
        }

        "num" => {
            let (sequence, value) = split_row_arg(rest)?;
            let number = if value.is_empty() {
                None
            } else {
                Some(
                    value
                        .parse::<u64>()
                        .with_context(|| format!("Invalid service number '{}'", value))?,
                )
            };
            service.set_service_number(sequence, number)?;
        }

        "val" => {
            let (sequence, value) = split_row_arg(rest)?;
            let display = service.type_amount(sequence, value)?;
            console.notify(Notice::Info(format!("Row {}: R$ {}", sequence, display)));
        }

        "pay" => {
            let (sequence, value) = split_row_arg(rest)?;
            let method = PaymentMethod::from_str(value)
                .ok_or_else(|| anyhow!("Unknown payment method '{}'", value))?;
            service.select_payment_method(sequence, method)?;
        }

        "sender" => service.header_mut().sender_name = rest.to_string(),

        "seal" => service.header_mut().seal_number = rest.to_string(),

        "note" => {
            service.header_mut().note = if rest.is_empty() {
                None
            } else {
                Some(rest.to_string())
            };
        }

        "show" => {
            let header = service.header();
            writeln!(console.output, "Sender: {}", header.sender_name)?;
            writeln!(console.output, "Seal:   {}", header.seal_number)?;
            if let Some(note) = &header.note {
                writeln!(console.output, "Note:   {}", note)?;
            }
            write_rows(&mut console.output, service.ledger())?;
        }

        "clear" => {
            if service.clear_form(console) {
                console.notify(Notice::Info("Form cleared".to_string()));
            }
        }

        "pdf" => {
            if let Some(receipt) = service.submit(Local::now(), console).await {
                let path = save_receipt(output_dir, &receipt)?;
                console.notify(Notice::Info(format!("Saved to {}", path.display())));
            }
        }

        "help" => writeln!(console.output, "{}", HELP)?,

        "quit" | "exit" => return Ok(Flow::Quit),

        other => {
            console.notify(Notice::Error(format!(
                "Unknown command '{}' (try 'help')",
                other
            )));
        }
    }

    Ok(Flow::Continue)
}

fn parse_sequence(arg: &str) -> Result<usize> {
    arg.parse::<usize>()
        .with_context(|| format!("Invalid row number '{}'", arg))
}

/// Split "<row> <value...>" into the row sequence and the rest.
fn split_row_arg(arg: &str) -> Result<(usize, &str)> {
    let (sequence, value) = match arg.split_once(char::is_whitespace) {
        Some((sequence, value)) => (sequence, value.trim()),
        None => (arg, ""),
    };
    Ok((parse_sequence(sequence)?, value))
}
