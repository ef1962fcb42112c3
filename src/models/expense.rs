//! The expense entity and its REST resource representation.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    models::{Audit, DEFAULT_IDENTITY, ResourceId, resource_id},
};

/// A single expense, possibly a child of another expense.
///
/// Deleting a parent expense cascades to its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// The server-generated id for the expense.
    pub id: ResourceId,
    /// The parent expense, for itemised bills.
    pub parent_expense_id: Option<ResourceId>,
    /// The name on the bill or receipt.
    pub billname: String,
    /// The amount spent.
    pub amount: Option<f64>,
    /// The account the expense was paid from.
    pub payment_account: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// When the purchase happened.
    pub purchased_date: OffsetDateTime,
    /// Labels for grouping and search.
    pub tags: Vec<String>,
    /// When the expense was verified against a statement.
    pub verified_date_time: Option<OffsetDateTime>,
    /// The expense category, a [ConfigType](crate::models::ConfigType) id.
    pub category_id: Option<ResourceId>,
    /// The shared audit fields.
    pub audit: Audit,
}

/// The external representation of an [Expense].
///
/// Field names follow the wire format (camelCase, ids as strings). The same
/// type is used for create and update bodies and for responses: on update,
/// only the fields that are present overwrite the stored entity.
///
/// Unknown fields in request bodies are ignored for forward compatibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseResource {
    /// The expense id. Must be absent when creating.
    #[serde(
        rename = "expenseId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "resource_id::deserialize_optional"
    )]
    pub id: Option<ResourceId>,
    /// The parent expense id.
    #[serde(
        rename = "parentExpenseId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "resource_id::deserialize_optional"
    )]
    pub parent_expense_id: Option<ResourceId>,
    /// The name on the bill. Required when creating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billname: Option<String>,
    /// The amount spent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// The account the expense was paid from.
    #[serde(rename = "paymentAccount", skip_serializing_if = "Option::is_none")]
    pub payment_account: Option<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the purchase happened. Required when creating.
    #[serde(
        rename = "purchasedDate",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub purchased_date: Option<OffsetDateTime>,
    /// Labels for grouping and search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// When the expense was verified against a statement.
    #[serde(
        rename = "verifiedDateTime",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub verified_date_time: Option<OffsetDateTime>,
    /// The expense category id.
    #[serde(
        rename = "categoryId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "resource_id::deserialize_optional"
    )]
    pub category_id: Option<ResourceId>,
    /// Who created the expense.
    #[serde(rename = "createdBy", skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Who last changed the expense.
    #[serde(rename = "updatedBy", skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    /// When the expense was created. Server-set.
    #[serde(
        rename = "createdOn",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_on: Option<OffsetDateTime>,
    /// When the expense was last changed. Server-set.
    #[serde(
        rename = "updatedOn",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_on: Option<OffsetDateTime>,
    /// Optional free text attached by the system.
    #[serde(rename = "sysNotes", skip_serializing_if = "Option::is_none")]
    pub sys_notes: Option<String>,
}

impl ExpenseResource {
    /// Build a new entity from this resource, assigning a fresh identity and
    /// audit stamp. Any id on the resource is ignored.
    ///
    /// # Errors
    /// Returns [Error::Validation] if a required field is missing.
    pub fn into_new_entity(self) -> Result<Expense, Error> {
        let billname = self
            .billname
            .ok_or_else(|| Error::Validation("billname must be provided".to_string()))?;
        let purchased_date = self
            .purchased_date
            .ok_or_else(|| Error::Validation("purchasedDate must be provided".to_string()))?;

        let identity = self.created_by.as_deref().unwrap_or(DEFAULT_IDENTITY);
        let mut audit = Audit::new(identity);
        audit.sys_notes = self.sys_notes;

        Ok(Expense {
            id: ResourceId::generate(),
            parent_expense_id: self.parent_expense_id,
            billname,
            amount: self.amount,
            payment_account: self.payment_account,
            description: self.description,
            purchased_date,
            tags: self.tags.unwrap_or_default(),
            verified_date_time: self.verified_date_time,
            category_id: self.category_id,
            audit,
        })
    }

    /// Overwrite the fields of `entity` that are present on this resource,
    /// leaving absent fields untouched. Identity and creation audit fields
    /// are never changed.
    pub fn apply_to(&self, entity: &mut Expense) {
        if let Some(parent_expense_id) = self.parent_expense_id {
            entity.parent_expense_id = Some(parent_expense_id);
        }
        if let Some(billname) = &self.billname {
            entity.billname = billname.clone();
        }
        if let Some(amount) = self.amount {
            entity.amount = Some(amount);
        }
        if let Some(payment_account) = &self.payment_account {
            entity.payment_account = Some(payment_account.clone());
        }
        if let Some(description) = &self.description {
            entity.description = Some(description.clone());
        }
        if let Some(purchased_date) = self.purchased_date {
            entity.purchased_date = purchased_date;
        }
        if let Some(tags) = &self.tags {
            entity.tags = tags.clone();
        }
        if let Some(verified_date_time) = self.verified_date_time {
            entity.verified_date_time = Some(verified_date_time);
        }
        if let Some(category_id) = self.category_id {
            entity.category_id = Some(category_id);
        }
        if let Some(sys_notes) = &self.sys_notes {
            entity.audit.sys_notes = Some(sys_notes.clone());
        }

        entity
            .audit
            .touch(self.updated_by.as_deref().unwrap_or(DEFAULT_IDENTITY));
    }
}

impl From<Expense> for ExpenseResource {
    fn from(entity: Expense) -> Self {
        Self {
            id: Some(entity.id),
            parent_expense_id: entity.parent_expense_id,
            billname: Some(entity.billname),
            amount: entity.amount,
            payment_account: entity.payment_account,
            description: entity.description,
            purchased_date: Some(entity.purchased_date),
            tags: Some(entity.tags),
            verified_date_time: entity.verified_date_time,
            category_id: entity.category_id,
            created_by: Some(entity.audit.created_by),
            updated_by: Some(entity.audit.updated_by),
            created_on: Some(entity.audit.created_on),
            updated_on: Some(entity.audit.updated_on),
            sys_notes: entity.audit.sys_notes,
        }
    }
}

#[cfg(test)]
mod expense_resource_tests {
    use time::macros::datetime;

    use crate::models::{Audit, ResourceId};

    use super::{Expense, ExpenseResource};

    fn test_entity() -> Expense {
        Expense {
            id: ResourceId::generate(),
            parent_expense_id: None,
            billname: "Groceries".to_string(),
            amount: Some(42.5),
            payment_account: Some("Chk1001".to_string()),
            description: None,
            purchased_date: datetime!(2024-03-01 12:00 UTC),
            tags: vec!["food".to_string()],
            verified_date_time: None,
            category_id: Some(ResourceId::generate()),
            audit: Audit::new("tester"),
        }
    }

    #[test]
    fn external_field_names_are_camel_case() {
        let resource = ExpenseResource::from(test_entity());

        let json = serde_json::to_value(&resource).unwrap();

        assert!(json.get("expenseId").is_some());
        assert!(json.get("paymentAccount").is_some());
        assert!(json.get("purchasedDate").is_some());
        assert!(json.get("categoryId").is_some());
        assert!(json.get("createdOn").is_some());
        assert!(json.get("id").is_none());
        assert!(json.get("payment_account").is_none());
    }

    #[test]
    fn id_is_a_string_at_the_boundary() {
        let entity = test_entity();
        let want_id = entity.id;
        let resource = ExpenseResource::from(entity);

        let json = serde_json::to_value(&resource).unwrap();

        assert_eq!(
            json.get("expenseId").and_then(|v| v.as_str()),
            Some(want_id.to_string().as_str())
        );
    }

    #[test]
    fn serde_round_trip_is_identity() {
        let resource = ExpenseResource::from(test_entity());

        let json = serde_json::to_string(&resource).unwrap();
        let round_tripped: ExpenseResource = serde_json::from_str(&json).unwrap();

        assert_eq!(resource, round_tripped);
    }

    #[test]
    fn unknown_external_fields_are_dropped() {
        let resource: ExpenseResource = serde_json::from_str(
            r#"{"billname": "Rent", "purchasedDate": "2024-03-01T12:00:00Z", "futureField": 1}"#,
        )
        .unwrap();

        assert_eq!(resource.billname.as_deref(), Some("Rent"));
    }

    #[test]
    fn into_new_entity_requires_billname() {
        let resource = ExpenseResource {
            purchased_date: Some(datetime!(2024-03-01 12:00 UTC)),
            ..Default::default()
        };

        assert!(resource.into_new_entity().is_err());
    }

    #[test]
    fn into_new_entity_requires_purchased_date() {
        let resource = ExpenseResource {
            billname: Some("Rent".to_string()),
            ..Default::default()
        };

        assert!(resource.into_new_entity().is_err());
    }

    #[test]
    fn into_new_entity_assigns_fresh_identity() {
        let submitted_id = ResourceId::generate();
        let resource = ExpenseResource {
            id: Some(submitted_id),
            billname: Some("Rent".to_string()),
            purchased_date: Some(datetime!(2024-03-01 12:00 UTC)),
            ..Default::default()
        };

        let entity = resource.into_new_entity().unwrap();

        assert_ne!(entity.id, submitted_id);
        assert!(entity.tags.is_empty());
    }

    #[test]
    fn apply_to_leaves_absent_fields_untouched() {
        let mut entity = test_entity();
        let original_amount = entity.amount;
        let original_tags = entity.tags.clone();
        let patch = ExpenseResource {
            billname: Some("Groceries (edited)".to_string()),
            ..Default::default()
        };

        patch.apply_to(&mut entity);

        assert_eq!(entity.billname, "Groceries (edited)");
        assert_eq!(entity.amount, original_amount);
        assert_eq!(entity.tags, original_tags);
        assert_eq!(entity.audit.created_by, "tester");
    }
}
