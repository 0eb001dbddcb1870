use uuid::Uuid;

pub type DealerId = Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApprovalStatus {
    Approved,
    Pending,
    Rejected,
}

impl ApprovalStatus {
    pub fn can_bid(&self) -> bool {
        matches!(self, ApprovalStatus::Approved)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dealer {
    pub id:              DealerId,
    pub approval_status: ApprovalStatus,
}
