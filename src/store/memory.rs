//! In-memory receipt store.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::error::{SettleError, SettleResult};
use crate::models::{
    Assignment, Member, Receipt, ReceiptLineItem, ReceiptStatus, SettlementRecord, SettlementRow,
};

use super::{LineItemUpdate, MemberUpdate, ReceiptStore, ReceiptUpdate};

#[derive(Debug)]
struct StoredReceipt {
    receipt: Receipt,
    assignments: Vec<Assignment>,
    settlements: Vec<SettlementRecord>,
}

/// A [`ReceiptStore`] held in process memory behind a single lock.
///
/// Every write takes the write lock for its whole duration, so each
/// replace-all operation is atomic with respect to readers.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    receipts: RwLock<HashMap<String, StoredReceipt>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> SettleResult<RwLockReadGuard<'_, HashMap<String, StoredReceipt>>> {
        self.receipts.read().map_err(|_| SettleError::Storage {
            message: "receipt store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> SettleResult<RwLockWriteGuard<'_, HashMap<String, StoredReceipt>>> {
        self.receipts.write().map_err(|_| SettleError::Storage {
            message: "receipt store lock poisoned".to_string(),
        })
    }
}

fn not_found(id: &str) -> SettleError {
    SettleError::ReceiptNotFound { id: id.to_string() }
}

fn item_not_found(receipt_id: &str, item_id: &str) -> SettleError {
    SettleError::LineItemNotFound {
        receipt_id: receipt_id.to_string(),
        item_id: item_id.to_string(),
    }
}

impl ReceiptStore for InMemoryStore {
    fn insert_receipt(&self, receipt: Receipt) -> SettleResult<Receipt> {
        let mut receipts = self.write()?;
        if receipts.contains_key(&receipt.id) {
            return Err(SettleError::Storage {
                message: format!("receipt '{}' already exists", receipt.id),
            });
        }
        receipts.insert(
            receipt.id.clone(),
            StoredReceipt {
                receipt: receipt.clone(),
                assignments: Vec::new(),
                settlements: Vec::new(),
            },
        );
        Ok(receipt)
    }

    fn receipt(&self, id: &str) -> SettleResult<Receipt> {
        let receipts = self.read()?;
        receipts
            .get(id)
            .map(|stored| stored.receipt.clone())
            .ok_or_else(|| not_found(id))
    }

    fn update_receipt(&self, id: &str, update: ReceiptUpdate) -> SettleResult<Receipt> {
        let mut receipts = self.write()?;
        let stored = receipts.get_mut(id).ok_or_else(|| not_found(id))?;
        update.apply_to(&mut stored.receipt);
        Ok(stored.receipt.clone())
    }

    fn update_line_item(
        &self,
        receipt_id: &str,
        item_id: &str,
        update: LineItemUpdate,
    ) -> SettleResult<ReceiptLineItem> {
        let mut receipts = self.write()?;
        let stored = receipts
            .get_mut(receipt_id)
            .ok_or_else(|| not_found(receipt_id))?;
        let item = stored
            .receipt
            .line_items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| item_not_found(receipt_id, item_id))?;
        update.apply_to(item);
        Ok(item.clone())
    }

    fn add_line_item(
        &self,
        receipt_id: &str,
        mut item: ReceiptLineItem,
    ) -> SettleResult<ReceiptLineItem> {
        let mut receipts = self.write()?;
        let stored = receipts
            .get_mut(receipt_id)
            .ok_or_else(|| not_found(receipt_id))?;
        if stored.receipt.line_item(&item.id).is_some() {
            return Err(SettleError::InvalidLineItem {
                item_id: item.id,
                message: "duplicate line item id".to_string(),
            });
        }
        item.sort_order = stored.receipt.next_sort_order();
        stored.receipt.line_items.push(item.clone());
        Ok(item)
    }

    fn delete_line_item(&self, receipt_id: &str, item_id: &str) -> SettleResult<ReceiptLineItem> {
        let mut receipts = self.write()?;
        let stored = receipts
            .get_mut(receipt_id)
            .ok_or_else(|| not_found(receipt_id))?;
        let position = stored
            .receipt
            .line_items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| item_not_found(receipt_id, item_id))?;
        Ok(stored.receipt.line_items.remove(position))
    }

    fn update_member(
        &self,
        receipt_id: &str,
        member_id: &str,
        update: MemberUpdate,
    ) -> SettleResult<Member> {
        let mut receipts = self.write()?;
        let stored = receipts
            .get_mut(receipt_id)
            .ok_or_else(|| not_found(receipt_id))?;
        let member = stored
            .receipt
            .members
            .iter_mut()
            .find(|member| member.id == member_id)
            .ok_or_else(|| SettleError::UnknownMember {
                member_id: member_id.to_string(),
            })?;
        update.apply_to(member);
        Ok(member.clone())
    }

    fn assignments(&self, receipt_id: &str) -> SettleResult<Vec<Assignment>> {
        let receipts = self.read()?;
        receipts
            .get(receipt_id)
            .map(|stored| stored.assignments.clone())
            .ok_or_else(|| not_found(receipt_id))
    }

    fn replace_assignments(
        &self,
        receipt_id: &str,
        assignments: Vec<Assignment>,
    ) -> SettleResult<Vec<Assignment>> {
        let mut receipts = self.write()?;
        let stored = receipts
            .get_mut(receipt_id)
            .ok_or_else(|| not_found(receipt_id))?;
        stored.assignments = assignments;
        stored.receipt.status = ReceiptStatus::Splitting;
        Ok(stored.assignments.clone())
    }

    fn settlements(&self, receipt_id: &str) -> SettleResult<Vec<SettlementRecord>> {
        let receipts = self.read()?;
        receipts
            .get(receipt_id)
            .map(|stored| stored.settlements.clone())
            .ok_or_else(|| not_found(receipt_id))
    }

    fn replace_settlements(
        &self,
        receipt_id: &str,
        rows: Vec<SettlementRow>,
    ) -> SettleResult<Vec<SettlementRecord>> {
        let mut receipts = self.write()?;
        let stored = receipts
            .get_mut(receipt_id)
            .ok_or_else(|| not_found(receipt_id))?;

        let created_at = Utc::now();
        stored.settlements = rows
            .into_iter()
            .map(|row| SettlementRecord::from_row(receipt_id, row, created_at))
            .collect();
        stored.receipt.status = ReceiptStatus::Settled;
        Ok(stored.settlements.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Member, Strategy};

    fn create_test_receipt(id: &str) -> Receipt {
        Receipt {
            id: id.to_string(),
            merchant_name: None,
            receipt_date: None,
            payer_id: None,
            members: vec![Member {
                id: "alice".to_string(),
                name: "Alice".to_string(),
                ledger_user_id: None,
            }],
            line_items: vec![ReceiptLineItem {
                id: "item_1".to_string(),
                name: "Soup".to_string(),
                quantity: 1,
                line_total: 900,
                is_valid: true,
                sort_order: 0,
            }],
            tax: 0,
            tip: 0,
            total: None,
            tax_strategy: Strategy::Proportional,
            tip_strategy: Strategy::Proportional,
            status: ReceiptStatus::Review,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_fetch_receipt() {
        let store = InMemoryStore::new();
        store.insert_receipt(create_test_receipt("r1")).unwrap();

        assert_eq!(store.receipt("r1").unwrap().id, "r1");
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let store = InMemoryStore::new();
        store.insert_receipt(create_test_receipt("r1")).unwrap();

        assert!(matches!(
            store.insert_receipt(create_test_receipt("r1")),
            Err(SettleError::Storage { .. })
        ));
    }

    #[test]
    fn test_missing_receipt_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.receipt("nope"),
            Err(SettleError::ReceiptNotFound { id }) if id == "nope"
        ));
    }

    #[test]
    fn test_replace_assignments_sets_splitting() {
        let store = InMemoryStore::new();
        store.insert_receipt(create_test_receipt("r1")).unwrap();

        store
            .replace_assignments("r1", vec![Assignment::new("item_1", "alice", 1, 1)])
            .unwrap();
        let replaced = store
            .replace_assignments("r1", vec![Assignment::new("item_1", "alice", 2, 2)])
            .unwrap();

        assert_eq!(replaced.len(), 1);
        assert_eq!(store.assignments("r1").unwrap()[0].share_numerator, 2);
        assert_eq!(store.receipt("r1").unwrap().status, ReceiptStatus::Splitting);
    }

    #[test]
    fn test_replace_settlements_replaces_all_and_sets_settled() {
        let store = InMemoryStore::new();
        store.insert_receipt(create_test_receipt("r1")).unwrap();

        let first = store
            .replace_settlements("r1", vec![SettlementRow::new("alice", 900, 0, 0)])
            .unwrap();
        let second = store
            .replace_settlements("r1", vec![SettlementRow::new("alice", 900, 90, 0)])
            .unwrap();

        let stored = store.settlements("r1").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].final_amount, 990);
        assert_ne!(first[0].id, second[0].id);
        assert_eq!(store.receipt("r1").unwrap().status, ReceiptStatus::Settled);
    }

    #[test]
    fn test_update_line_item_unknown_item() {
        let store = InMemoryStore::new();
        store.insert_receipt(create_test_receipt("r1")).unwrap();

        assert!(matches!(
            store.update_line_item("r1", "ghost", LineItemUpdate::default()),
            Err(SettleError::LineItemNotFound { .. })
        ));
    }

    #[test]
    fn test_add_line_item_takes_next_sort_order() {
        let store = InMemoryStore::new();
        store.insert_receipt(create_test_receipt("r1")).unwrap();
        let item = ReceiptLineItem {
            id: "item_2".to_string(),
            name: "Bread".to_string(),
            quantity: 1,
            line_total: 300,
            is_valid: true,
            sort_order: 0,
        };

        let added = store.add_line_item("r1", item.clone()).unwrap();

        assert_eq!(added.sort_order, 1);
        assert_eq!(store.receipt("r1").unwrap().line_items.len(), 2);
        assert!(matches!(
            store.add_line_item("r1", item),
            Err(SettleError::InvalidLineItem { .. })
        ));
    }

    #[test]
    fn test_delete_line_item_keeps_assignments() {
        let store = InMemoryStore::new();
        store.insert_receipt(create_test_receipt("r1")).unwrap();
        store
            .replace_assignments("r1", vec![Assignment::new("item_1", "alice", 1, 1)])
            .unwrap();

        let removed = store.delete_line_item("r1", "item_1").unwrap();

        assert_eq!(removed.line_total, 900);
        assert!(store.receipt("r1").unwrap().line_items.is_empty());
        assert_eq!(store.assignments("r1").unwrap().len(), 1);
        assert!(matches!(
            store.delete_line_item("r1", "item_1"),
            Err(SettleError::LineItemNotFound { .. })
        ));
    }

    #[test]
    fn test_update_member_maps_ledger_account() {
        let store = InMemoryStore::new();
        store.insert_receipt(create_test_receipt("r1")).unwrap();

        let member = store
            .update_member(
                "r1",
                "alice",
                MemberUpdate {
                    ledger_user_id: Some(7),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(member.ledger_user_id, Some(7));
        assert_eq!(store.receipt("r1").unwrap().members[0].ledger_user_id, Some(7));
        assert!(matches!(
            store.update_member("r1", "zed", MemberUpdate::default()),
            Err(SettleError::UnknownMember { .. })
        ));
    }

    #[test]
    fn test_update_receipt_applies_fields() {
        let store = InMemoryStore::new();
        store.insert_receipt(create_test_receipt("r1")).unwrap();

        let updated = store
            .update_receipt(
                "r1",
                ReceiptUpdate {
                    payer_id: Some("alice".to_string()),
                    tax: Some(120),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.payer_id.as_deref(), Some("alice"));
        assert_eq!(updated.tax, 120);
    }
}
