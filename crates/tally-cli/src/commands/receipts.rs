//! Receipt workflow commands (scan, interpret, statement)
//!
//! These work on local files and never touch the database, so they are handy
//! for checking what the server would pre-fill for a given receipt.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{
    interpret, parse_transaction_history, DocumentExtractor, DocumentKind, ExtractedReceiptData,
    StatementLine, TextExtractor,
};
use tracing::debug;

/// Text of a receipt or statement file
///
/// Images and PDFs go through the extractor; anything else is read as plain text.
pub async fn read_document_text(extractor: &dyn TextExtractor, path: &Path) -> Result<String> {
    match DocumentKind::from_path(path) {
        Some(kind) => {
            debug!(path = %path.display(), ?kind, "Extracting document text");
            let text = extractor.extract_text(kind, path).await?;
            Ok(text)
        }
        None => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Plain text from a file, or stdin when the path is `-`
fn read_text_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_receipt(data: &ExtractedReceiptData, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(data)?);
        return Ok(());
    }

    match data.amount {
        Some(amount) => println!("   Amount:      {:.2}", amount),
        None => println!("   Amount:      (not found)"),
    }
    if data.description.is_empty() {
        println!("   Description: (empty)");
    } else {
        println!("   Description: {}", data.description);
    }
    println!("   Category:    {}", data.category);
    Ok(())
}

fn print_statement(lines: &[StatementLine], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(lines)?);
        return Ok(());
    }

    if lines.is_empty() {
        println!("No transactions found in statement.");
        return Ok(());
    }

    for line in lines {
        println!(
            "   {:<10}  {:>10.2}  {:<7}  {}",
            line.date, line.amount, line.transaction_type, line.description
        );
    }
    println!();
    println!("{} candidate transaction(s)", lines.len());
    Ok(())
}

pub async fn cmd_receipt_scan(file: &Path, json: bool) -> Result<()> {
    let kind = DocumentKind::from_path(file)
        .with_context(|| format!("Unsupported file type: {}", file.display()))?;

    let extractor = DocumentExtractor::from_env();
    let text = extractor
        .extract_text(kind, file)
        .await
        .context("Failed to process receipt")?;

    debug!(chars = text.len(), "Extracted receipt text");
    if !json {
        println!("🧾 {}", file.display());
    }
    print_receipt(&interpret(&text), json)
}

pub fn cmd_receipt_interpret(file: &Path, json: bool) -> Result<()> {
    let text = read_text_input(file)?;
    print_receipt(&interpret(&text), json)
}

pub async fn cmd_receipt_statement(file: &Path, json: bool) -> Result<()> {
    let extractor = DocumentExtractor::from_env();
    let text = read_document_text(&extractor, file)
        .await
        .context("Failed to parse statement")?;

    print_statement(&parse_transaction_history(&text), json)
}
