//! Expense record construction.
//!
//! The ledger requires the owed shares of an expense to add up exactly to
//! its cost. Settlement rows already conserve every cent of the receipt's
//! items, tax and tip, but the stored receipt total may differ from their
//! sum (service fees, manual edits), so a second remainder pass moves the
//! difference onto the last participant.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ExportConfig;
use crate::error::{SettleError, SettleResult};
use crate::models::{Cents, Receipt, SettlementRecord};

/// Formats minor units as a two-decimal string.
///
/// # Examples
///
/// ```
/// use receipt_split::ledger::format_cents;
///
/// assert_eq!(format_cents(8000), "80.00");
/// assert_eq!(format_cents(3245), "32.45");
/// assert_eq!(format_cents(5), "0.05");
/// ```
pub fn format_cents(cents: Cents) -> String {
    Decimal::new(cents, 2).to_string()
}

/// One participant's side of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseShare {
    /// The participant's ledger account id.
    pub user_id: u64,
    /// Amount the participant paid, e.g. "80.00".
    pub paid_share: String,
    /// Amount the participant owes, e.g. "32.45".
    pub owed_share: String,
}

/// An expense ready to submit to the external ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Total cost, e.g. "80.00".
    pub cost: String,
    /// Description shown in the ledger.
    pub description: String,
    /// Date of the expense.
    pub date: NaiveDate,
    /// ISO currency code.
    pub currency_code: String,
    /// Ledger group to file the expense under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
    /// One entry per participant.
    pub users: Vec<ExpenseShare>,
}

impl ExpenseRecord {
    /// Renders the record as the flat form fields the ledger's create
    /// endpoint accepts (`users__0__user_id`, `users__0__paid_share`, ...).
    pub fn to_form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("cost".to_string(), self.cost.clone()),
            ("description".to_string(), self.description.clone()),
            ("date".to_string(), self.date.format("%Y-%m-%d").to_string()),
            ("currency_code".to_string(), self.currency_code.clone()),
        ];
        if let Some(group_id) = self.group_id {
            fields.push(("group_id".to_string(), group_id.to_string()));
        }
        for (i, user) in self.users.iter().enumerate() {
            fields.push((format!("users__{}__user_id", i), user.user_id.to_string()));
            fields.push((format!("users__{}__paid_share", i), user.paid_share.clone()));
            fields.push((format!("users__{}__owed_share", i), user.owed_share.clone()));
        }
        fields
    }
}

/// Builds the ledger expense for a settled receipt.
///
/// The payer is credited the full cost as paid; every settlement member owes
/// their final amount. When the owed amounts do not add up to the cost, the
/// last settlement participant's owed amount absorbs the difference. A payer
/// without a settlement row is appended as paying the cost and owing nothing.
///
/// The cost is the receipt total, or the sum of final amounts when the
/// receipt has no total. The date is the receipt date, or `today`.
///
/// Fails when the receipt is not settled, has no payer or no settlement
/// records, or when the payer or any settlement member lacks a ledger
/// account mapping.
pub fn build_expense(
    receipt: &Receipt,
    settlements: &[SettlementRecord],
    config: &ExportConfig,
    today: NaiveDate,
) -> SettleResult<ExpenseRecord> {
    if !receipt.status.is_settled() {
        return Err(SettleError::ReceiptNotSettled {
            status: receipt.status,
        });
    }

    let payer_id = receipt.payer_id.as_deref().ok_or(SettleError::NoPayer)?;

    if settlements.is_empty() {
        return Err(SettleError::NoSettlements);
    }

    let payer = receipt.member(payer_id).ok_or_else(|| SettleError::UnknownMember {
        member_id: payer_id.to_string(),
    })?;
    let payer_user_id = payer.ledger_user_id.ok_or_else(|| SettleError::UnmappedMembers {
        names: vec![payer.name.clone()],
    })?;

    let mut unmapped = Vec::new();
    let mut user_ids = Vec::with_capacity(settlements.len());
    for s in settlements {
        match receipt.member(&s.member_id) {
            Some(member) => match member.ledger_user_id {
                Some(user_id) => user_ids.push(user_id),
                None => unmapped.push(member.name.clone()),
            },
            None => unmapped.push(s.member_id.clone()),
        }
    }
    if !unmapped.is_empty() {
        return Err(SettleError::UnmappedMembers { names: unmapped });
    }

    let owed_sum: Cents = settlements.iter().map(|s| s.final_amount).sum();
    let cost = receipt.total.unwrap_or(owed_sum);
    let rounding_diff = cost - owed_sum;
    let last = settlements.len() - 1;

    let mut users: Vec<ExpenseShare> = settlements
        .iter()
        .zip(user_ids)
        .enumerate()
        .map(|(i, (s, user_id))| {
            let owed = if i == last {
                s.final_amount + rounding_diff
            } else {
                s.final_amount
            };
            let paid = if s.member_id == payer_id { cost } else { 0 };
            ExpenseShare {
                user_id,
                paid_share: format_cents(paid),
                owed_share: format_cents(owed),
            }
        })
        .collect();

    if !settlements.iter().any(|s| s.member_id == payer_id) {
        users.push(ExpenseShare {
            user_id: payer_user_id,
            paid_share: format_cents(cost),
            owed_share: format_cents(0),
        });
    }

    let description = receipt
        .merchant_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| config.default_description.clone());

    Ok(ExpenseRecord {
        cost: format_cents(cost),
        description,
        date: receipt.receipt_date.unwrap_or(today),
        currency_code: config.currency_code.clone(),
        group_id: config.group_id,
        users,
    })
}
