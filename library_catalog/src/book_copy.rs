use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{BookId, CopyId, CopyStatus, ReaderId};

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Loan {
    pub reader: ReaderId,
    pub date_loan: NaiveDate,
    pub date_expiration: NaiveDate,
}

/// Lending state of a single copy. The borrower and loan dates only exist
/// while the copy is out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CopyState {
    #[default]
    Available,
    OnLoan(Loan),
    Overdue(Loan),
}

/// One physical, lendable unit of a [`crate::api::Book`]
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct BookCopy {
    pub id: CopyId,
    pub book: BookId,
    pub state: CopyState,
}

impl BookCopy {
    pub fn new(id: CopyId, book: BookId) -> Self {
        Self {
            id,
            book,
            state: CopyState::Available,
        }
    }

    pub fn status(&self) -> CopyStatus {
        match self.state {
            CopyState::Available => CopyStatus::Available,
            CopyState::OnLoan(_) => CopyStatus::OnLoan,
            CopyState::Overdue(_) => CopyStatus::Overdue,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, CopyState::Available)
    }

    pub fn loan(&self) -> Option<&Loan> {
        match &self.state {
            CopyState::Available => None,
            CopyState::OnLoan(loan) | CopyState::Overdue(loan) => Some(loan),
        }
    }

    pub fn reader_act(&self) -> Option<ReaderId> {
        self.loan().map(|loan| loan.reader)
    }

    pub fn date_loan(&self) -> Option<NaiveDate> {
        self.loan().map(|loan| loan.date_loan)
    }

    pub fn date_expiration(&self) -> Option<NaiveDate> {
        self.loan().map(|loan| loan.date_expiration)
    }

    pub(crate) fn lend(
        &mut self,
        reader: ReaderId,
        date_loan: NaiveDate,
        date_expiration: NaiveDate,
    ) {
        self.state = CopyState::OnLoan(Loan {
            reader,
            date_loan,
            date_expiration,
        });
    }

    pub(crate) fn release(&mut self) {
        self.state = CopyState::Available;
    }

    /// Moves an on-loan copy past its expiration date to overdue and returns
    /// the number of days it is late. Already overdue copies return `None`,
    /// so each loan is charged once.
    pub fn refresh_status(&mut self, today: NaiveDate) -> Option<i64> {
        let CopyState::OnLoan(loan) = &self.state else {
            return None;
        };
        if today <= loan.date_expiration {
            return None;
        }
        let days_overdue = (today - loan.date_expiration).num_days();
        let loan = loan.clone();
        self.state = CopyState::Overdue(loan);
        Some(days_overdue)
    }
}
