//! Order slip rendering
//!
//! A finished sale is turned into a printable slip by a `ReceiptRenderer`.
//! The default renderer lays the slip out as fixed-width plain text for a
//! receipt printer.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::parse_http_date;

use crate::config::ReceiptConfig;
use crate::error::{AppError, AppResult};

const FOOTER: &str = "This is an Order Slip. Ask for an Official Receipt at the Receipt Counter.";

/// Longest item name printed before it is cut
const ITEM_NAME_CHARS: usize = 12;

/// Finished sale as sent by the point of sale
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptTransaction {
    pub slip_no: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// `"Mon, 02 Jan 2006 15:04:05 GMT"`
    pub transaction_date: String,
    pub sub_total: Decimal,
    #[serde(default)]
    pub delivery_fee: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub total_amount: Decimal,
    pub amount_received: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    pub transaction: ReceiptTransaction,
    #[serde(alias = "transactionItems")]
    pub items: Vec<ReceiptLine>,
}

/// Turns a sale into a printable document
pub trait ReceiptRenderer: Send + Sync {
    /// MIME type of the rendered bytes
    fn content_type(&self) -> &'static str;

    fn render(&self, transaction: &ReceiptTransaction, items: &[ReceiptLine]) -> AppResult<Vec<u8>>;
}

/// Fixed-width plain text slip
#[derive(Debug, Clone)]
pub struct PlainTextReceipt {
    store_name: String,
    width: usize,
}

impl PlainTextReceipt {
    pub fn new(config: &ReceiptConfig) -> Self {
        Self {
            store_name: config.store_name.clone(),
            // narrower than this cannot hold an item line
            width: config.width.max(32),
        }
    }

    fn center(&self, text: &str) -> String {
        let len = text.chars().count();
        if len >= self.width {
            return text.to_string();
        }
        format!("{}{}", " ".repeat((self.width - len) / 2), text)
    }

    fn right(&self, text: &str) -> String {
        format!("{:>width$}", text, width = self.width)
    }

    fn columns(&self, left: &str, right: &str) -> String {
        let used = left.chars().count() + right.chars().count();
        let gap = self.width.saturating_sub(used).max(1);
        format!("{}{}{}", left, " ".repeat(gap), right)
    }

    fn rule(&self) -> String {
        "-".repeat(self.width)
    }
}

impl Default for PlainTextReceipt {
    fn default() -> Self {
        Self::new(&ReceiptConfig::default())
    }
}

fn money(amount: Decimal) -> String {
    format!("P {:.2}", amount.round_dp(2))
}

fn short_name(name: &str) -> String {
    if name.chars().count() > ITEM_NAME_CHARS {
        let cut: String = name.chars().take(ITEM_NAME_CHARS).collect();
        format!("{}...", cut)
    } else {
        name.to_string()
    }
}

/// Greedy word wrap; words longer than the width get a line of their own
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn slip_date(transaction_date: &str) -> AppResult<NaiveDateTime> {
    parse_http_date(transaction_date.trim())
        .map_err(|message| AppError::validation("transactionDate", message))
}

impl ReceiptRenderer for PlainTextReceipt {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render(&self, transaction: &ReceiptTransaction, items: &[ReceiptLine]) -> AppResult<Vec<u8>> {
        let date = slip_date(&transaction.transaction_date)?;
        let mut lines = vec![
            self.center(&self.store_name),
            String::new(),
            self.center(&format!("SLIP# {}", transaction.slip_no)),
        ];

        if let Some(customer) = transaction
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            lines.push(format!("Customer: {}", customer));
        }
        lines.push(format!("Date: {}", date.format("%B %d, %Y %I:%M %p")));
        lines.push(String::new());

        lines.push("Items:".to_string());
        lines.push(self.rule());
        for item in items {
            let left = format!("{}x {}", item.quantity.normalize(), short_name(&item.name));
            let each = format!("{} each", money(item.price));
            lines.push(self.columns(&left, &each));
            lines.push(self.right(&money(item.amount)));
        }
        lines.push(self.rule());

        lines.push(self.columns("Sub Total:", &money(transaction.sub_total)));
        if !transaction.delivery_fee.is_zero() {
            lines.push(self.columns("Delivery Fee:", &money(transaction.delivery_fee)));
        }
        if !transaction.discount.is_zero() {
            lines.push(self.columns("Discount:", &money(transaction.discount)));
        }
        lines.push(self.columns("TOTAL:", &money(transaction.total_amount)));
        lines.push(self.columns("Cash:", &money(transaction.amount_received)));
        lines.push(self.columns(
            "Change:",
            &money(transaction.amount_received - transaction.total_amount),
        ));
        lines.push(String::new());
        lines.push(self.rule());
        lines.extend(wrap(FOOTER, self.width));

        let mut document = lines.join("\n");
        document.push('\n');
        Ok(document.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("Hammer"), "Hammer");
        assert_eq!(short_name("Twelve chars"), "Twelve chars");
        assert_eq!(short_name("Galvanized Iron Sheet"), "Galvanized I...");
    }

    #[test]
    fn test_money_has_two_decimals() {
        assert_eq!(money(Decimal::new(5, 0)), "P 5.00");
        assert_eq!(money(Decimal::new(1225, 2)), "P 12.25");
        assert_eq!(money(Decimal::new(-75, 1)), "P -7.50");
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap(FOOTER, 42);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 42));
        assert_eq!(lines.join(" "), FOOTER);
    }

    #[test]
    fn test_columns_fill_width() {
        let slip = PlainTextReceipt::default();
        let line = slip.columns("TOTAL:", "P 10.00");
        assert_eq!(line.chars().count(), 42);
        assert!(line.starts_with("TOTAL:"));
        assert!(line.ends_with("P 10.00"));
    }
}
