use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{CopyId, ReaderDetails, ReaderId};

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Reader {
    pub id: ReaderId,
    pub name: String,
    pub email: String,
    pub active_loans: Vec<CopyId>,
    pub days_blocked: i64,
    /// Start of the current blocking period
    pub date_blocked: Option<NaiveDate>,
}

impl Reader {
    pub fn new(id: ReaderId, details: ReaderDetails) -> Self {
        Self {
            id,
            name: details.name,
            email: details.email,
            active_loans: vec![],
            days_blocked: 0,
            date_blocked: None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.days_blocked > 0
    }

    pub fn has_loan(&self, copy_id: CopyId) -> bool {
        self.active_loans.contains(&copy_id)
    }

    pub(crate) fn register_loan(&mut self, copy_id: CopyId) {
        if !self.has_loan(copy_id) {
            self.active_loans.push(copy_id);
        }
    }

    /// Returns false when the copy was not among the active loans
    pub(crate) fn unregister_loan(&mut self, copy_id: CopyId) -> bool {
        let before = self.active_loans.len();
        self.active_loans.retain(|&id| id != copy_id);
        before != self.active_loans.len()
    }

    /// Adds penalty days. A reader that was not blocked yet starts the
    /// blocking period on `today`.
    pub fn add_block_days(&mut self, days: i64, today: NaiveDate) {
        if days <= 0 {
            return;
        }
        if !self.is_blocked() || self.date_blocked.is_none() {
            self.date_blocked = Some(today);
        }
        self.days_blocked += days;
    }

    /// Lifts the block once `days_blocked` days have passed since `date_blocked`.
    /// Returns true when the reader got unblocked by this call.
    pub fn refresh_block_status(&mut self, today: NaiveDate) -> bool {
        match self.date_blocked {
            Some(date_blocked) if (today - date_blocked).num_days() >= self.days_blocked => {
                self.days_blocked = 0;
                self.date_blocked = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests_reader {
    use chrono::Days;

    use super::*;

    fn reader() -> Reader {
        Reader::new(
            1,
            ReaderDetails {
                name: "Ana".to_string(),
                email: "ana@uni.edu".to_string(),
            },
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    #[test]
    fn test_loans_are_unique_and_ordered() {
        let mut reader = reader();
        reader.register_loan(4);
        reader.register_loan(2);
        reader.register_loan(4);
        assert_eq!(reader.active_loans, vec![4, 2]);

        assert!(reader.unregister_loan(4));
        assert!(!reader.unregister_loan(4));
        assert_eq!(reader.active_loans, vec![2]);
    }

    #[test]
    /// 1. Adds 10 block days - blocked since today
    /// 2. Adds 5 more days later - blocking period keeps its start
    /// 3. Refresh before 15 days passed - still blocked
    /// 4. Refresh after 15 days - unblocked
    fn test_block_accumulates_and_expires() {
        let mut reader = reader();
        reader.add_block_days(10, today());
        assert!(reader.is_blocked());
        assert_eq!(reader.date_blocked, Some(today()));

        reader.add_block_days(5, today() + Days::new(3));
        assert_eq!(reader.days_blocked, 15);
        assert_eq!(reader.date_blocked, Some(today()));

        assert!(!reader.refresh_block_status(today() + Days::new(14)));
        assert!(reader.is_blocked());

        assert!(reader.refresh_block_status(today() + Days::new(15)));
        assert_eq!(reader.days_blocked, 0);
        assert_eq!(reader.date_blocked, None);
    }

    #[test]
    fn test_zero_penalty_does_not_block() {
        let mut reader = reader();
        reader.add_block_days(0, today());
        assert!(!reader.is_blocked());
        assert_eq!(reader.date_blocked, None);
    }

    #[test]
    /// Block without a start date never expires on its own
    fn test_block_without_start_date_is_kept() {
        let mut reader = reader();
        reader.days_blocked = 2;
        assert!(!reader.refresh_block_status(today() + Days::new(100)));
        assert_eq!(reader.days_blocked, 2);
    }
}
