//! Member records and the member lifecycle.

use crate::{
    book::Deleted, error::Result, store::Entity, BookId, Error, Library, MemberId, Timestamp,
    TransactionId, TransactionStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Youngest age a member may have.
pub const MINIMUM_AGE: u32 = 12;

/// A library member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub name: String,
    pub age: u32,
    /// True while exactly one active transaction belongs to the member
    pub has_borrowed: bool,
}

impl Member {
    pub fn new(member_id: MemberId, name: impl Into<String>, age: u32) -> Self {
        Self {
            member_id,
            name: name.into(),
            age,
            has_borrowed: false,
        }
    }

    /// List form, which leaves out the borrowing flag.
    pub fn summary(&self) -> MemberSummary {
        MemberSummary {
            member_id: self.member_id,
            name: self.name.clone(),
            age: self.age,
        }
    }
}

impl Entity for Member {
    type Key = MemberId;

    fn key(&self) -> MemberId {
        self.member_id
    }
}

/// A member as shown in the member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub member_id: MemberId,
    pub name: String,
    pub age: u32,
}

/// Request body for creating a member.
///
/// `age` stays untyped so a non-numeric age is reported as a validation
/// failure instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMember {
    pub member_id: Option<MemberId>,
    pub name: Option<String>,
    pub age: Option<Value>,
}

impl NewMember {
    pub fn new(member_id: MemberId, name: impl Into<String>, age: u32) -> Self {
        Self {
            member_id: Some(member_id),
            name: Some(name.into()),
            age: Some(Value::from(age)),
        }
    }
}

/// Request body for updating a member. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub age: Option<Value>,
}

/// One row of a member's borrowing history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub transaction_id: TransactionId,
    pub book_id: BookId,
    /// `None` once the book has left the catalog
    pub book_title: Option<String>,
    pub borrowed_at: Timestamp,
    pub returned_at: Option<Timestamp>,
    pub status: TransactionStatus,
}

/// A member's complete borrowing history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberHistory {
    pub member_id: MemberId,
    pub member_name: String,
    pub borrowing_history: Vec<HistoryEntry>,
}

/// Check that a JSON age is a whole number no smaller than [`MINIMUM_AGE`].
pub fn validate_age(value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|age| u32::try_from(age).ok())
        .filter(|age| *age >= MINIMUM_AGE)
        .ok_or_else(|| {
            Error::Validation(format!(
                "invalid age: {value}, must be {MINIMUM_AGE} or older"
            ))
        })
}

pub(crate) fn member_not_found(member_id: MemberId) -> Error {
    Error::NotFound(format!("member with id: {member_id} was not found"))
}

impl Library {
    /// Register a new member.
    pub fn create_member(&mut self, request: NewMember) -> Result<Member> {
        let (Some(member_id), Some(name), Some(age)) = (
            request.member_id.filter(|id| *id != 0),
            request.name.filter(|n| !n.is_empty()),
            request.age.filter(|a| !a.is_null()),
        ) else {
            return Err(Error::Validation(
                "Missing required fields: member_id, name, age".to_string(),
            ));
        };
        let age = validate_age(&age)?;

        if self.store.members.contains(&member_id) {
            return Err(Error::Duplicate(format!(
                "member with id: {member_id} already exists"
            )));
        }

        let member = Member::new(member_id, name, age);
        self.store.members.insert(member.clone());
        Ok(member)
    }

    /// Look up a member.
    pub fn member(&self, member_id: MemberId) -> Result<Member> {
        self.store
            .members
            .get(&member_id)
            .cloned()
            .ok_or_else(|| member_not_found(member_id))
    }

    /// All members in id order.
    pub fn members(&self) -> Vec<MemberSummary> {
        self.store.members.values().map(Member::summary).collect()
    }

    /// Change a member's name and/or age.
    ///
    /// Every supplied field is validated before any field is written.
    pub fn update_member(&mut self, member_id: MemberId, update: MemberUpdate) -> Result<Member> {
        if !self.store.members.contains(&member_id) {
            return Err(member_not_found(member_id));
        }

        if update.name.as_deref() == Some("") {
            return Err(Error::Validation("name must not be empty".to_string()));
        }
        let age = match update.age.as_ref().filter(|a| !a.is_null()) {
            Some(value) => Some(validate_age(value)?),
            None => None,
        };

        let member = self
            .store
            .members
            .get_mut(&member_id)
            .ok_or_else(|| member_not_found(member_id))?;
        if let Some(name) = update.name {
            member.name = name;
        }
        if let Some(age) = age {
            member.age = age;
        }
        Ok(member.clone())
    }

    /// Remove a member with no active borrowing.
    pub fn delete_member(&mut self, member_id: MemberId) -> Result<Deleted> {
        let member = self
            .store
            .members
            .get(&member_id)
            .ok_or_else(|| member_not_found(member_id))?;

        if member.has_borrowed {
            return Err(Error::Conflict(format!(
                "cannot delete member with id: {member_id}, member has an active book borrowing"
            )));
        }

        self.store.members.remove(&member_id);
        Ok(Deleted {
            message: format!("member with id: {member_id} has been deleted successfully"),
        })
    }

    /// Every transaction a member has made, joined with book titles.
    pub fn member_history(&self, member_id: MemberId) -> Result<MemberHistory> {
        let member = self
            .store
            .members
            .get(&member_id)
            .ok_or_else(|| member_not_found(member_id))?;

        let borrowing_history = self
            .store
            .member_transactions(member_id)
            .map(|t| HistoryEntry {
                transaction_id: t.transaction_id,
                book_id: t.book_id,
                book_title: self.store.books.get(&t.book_id).map(|b| b.title.clone()),
                borrowed_at: t.borrowed_at,
                returned_at: t.returned_at,
                status: t.status,
            })
            .collect();

        Ok(MemberHistory {
            member_id,
            member_name: member.name.clone(),
            borrowing_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoanRequest, Policy};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn library() -> Library {
        Library::with_sample_catalog(Policy::default())
    }

    #[test]
    fn create_and_get_round_trip() {
        let mut library = library();
        let created = library.create_member(NewMember::new(1, "A", 20)).unwrap();
        assert!(!created.has_borrowed);

        let fetched = library.member(1).unwrap();
        assert_eq!(fetched, Member::new(1, "A", 20));
    }

    #[test]
    fn update_age_below_minimum_fails() {
        let mut library = library();
        library.create_member(NewMember::new(1, "A", 20)).unwrap();

        let err = library
            .update_member(
                1,
                MemberUpdate {
                    name: Some("B".into()),
                    age: Some(json!(10)),
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("12 or older"));

        // Nothing was written, not even the valid name.
        assert_eq!(library.member(1).unwrap().name, "A");
    }

    #[test]
    fn update_leaves_unspecified_fields() {
        let mut library = library();
        library.create_member(NewMember::new(1, "A", 20)).unwrap();

        let updated = library
            .update_member(
                1,
                MemberUpdate {
                    name: None,
                    age: Some(json!(33)),
                },
            )
            .unwrap();
        assert_eq!(updated.name, "A");
        assert_eq!(updated.age, 33);
    }

    #[test]
    fn update_missing_member() {
        let mut library = library();
        let err = library.update_member(5, MemberUpdate::default()).unwrap_err();
        assert_eq!(err, member_not_found(5));
    }

    #[test]
    fn age_validation() {
        assert_eq!(validate_age(&json!(12)).unwrap(), 12);
        assert!(validate_age(&json!(11)).is_err());
        assert!(validate_age(&json!(12.5)).is_err());
        assert!(validate_age(&json!(-3)).is_err());

        let err = validate_age(&json!("twenty")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid age: \"twenty\", must be 12 or older"
        );
    }

    #[test]
    fn create_requires_fields() {
        let mut library = library();
        let err = library
            .create_member(NewMember {
                member_id: Some(1),
                name: Some("A".into()),
                age: None,
            })
            .unwrap_err();
        assert_eq!(
            err,
            Error::Validation("Missing required fields: member_id, name, age".into())
        );
    }

    #[test]
    fn create_duplicate() {
        let mut library = library();
        library.create_member(NewMember::new(1, "A", 20)).unwrap();
        let err = library.create_member(NewMember::new(1, "B", 30)).unwrap_err();
        assert!(matches!(err, Error::Duplicate(_)));
    }

    #[test]
    fn list_strips_borrowing_flag() {
        let mut library = library();
        library.create_member(NewMember::new(2, "B", 40)).unwrap();
        library.create_member(NewMember::new(1, "A", 20)).unwrap();

        let list = library.members();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].member_id, 1);
        let json = serde_json::to_value(&list[0]).unwrap();
        assert!(json.get("has_borrowed").is_none());
    }

    #[test]
    fn delete_blocked_while_borrowing() {
        let mut library = library();
        library.create_member(NewMember::new(1, "A", 20)).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        library.borrow(LoanRequest::new(1, 102), now).unwrap();

        assert!(matches!(
            library.delete_member(1).unwrap_err(),
            Error::Conflict(_)
        ));

        library.return_book(LoanRequest::new(1, 102), now).unwrap();
        library.delete_member(1).unwrap();
        assert!(library.member(1).is_err());
    }

    #[test]
    fn history_survives_book_deletion() {
        let mut library = library();
        library.create_member(NewMember::new(1, "A", 20)).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        library.borrow(LoanRequest::new(1, 103), now).unwrap();
        library.return_book(LoanRequest::new(1, 103), now).unwrap();
        library.borrow(LoanRequest::new(1, 101), now).unwrap();
        library.delete_book(103).unwrap();

        let history = library.member_history(1).unwrap();
        assert_eq!(history.member_name, "A");
        assert_eq!(history.borrowing_history.len(), 2);

        let first = &history.borrowing_history[0];
        assert_eq!(first.transaction_id, 501);
        assert_eq!(first.book_title, None);
        assert_eq!(first.status, TransactionStatus::Returned);

        let second = &history.borrowing_history[1];
        assert_eq!(second.book_title.as_deref(), Some("The Great Gatsby"));
        assert_eq!(second.status, TransactionStatus::Active);
    }
}
