// src/models/payment.rs
use chrono::NaiveDateTime;
use serde::Deserialize;
use sqlx::FromRow;

pub const PAYMENT_TYPES: &[&str] = &["Annual Dues", "Event Registration", "Donation", "Special Project"];

/// Smallest amount (in naira) the payment form accepts.
pub const MIN_AMOUNT: i64 = 100;

#[derive(Debug, Clone, FromRow)]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub payment_type: String,
    pub amount: i64,
    pub status: String, // "completed" | "pending"
    pub payment_date: NaiveDateTime,
    pub reference: String,
}

impl Payment {
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("completed")
    }

    pub fn status_label(&self) -> String {
        let mut chars = self.status.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn date_text(&self) -> String {
        self.payment_date.format("%d %b %Y").to_string()
    }

    /// Amount with thousands separators, e.g. `5,000`.
    pub fn amount_text(&self) -> String {
        let digits = self.amount.abs().to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        if self.amount < 0 { format!("-{out}") } else { out }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentForm {
    pub payment_type: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub payment_type: &'static str,
    pub amount: i64,
}

impl PaymentForm {
    pub fn validate(&self) -> Result<PaymentRequest, String> {
        let payment_type = PAYMENT_TYPES
            .iter()
            .copied()
            .find(|t| *t == self.payment_type.trim())
            .ok_or("Select a payment type.")?;
        let amount: i64 = self
            .amount
            .trim()
            .parse()
            .map_err(|_| "Valid amount is required.".to_string())?;
        if amount < MIN_AMOUNT {
            return Err(format!("Amount must be at least {MIN_AMOUNT}."));
        }
        Ok(PaymentRequest { payment_type, amount })
    }
}
