use {
    crate::{
        dealer::entities::DealerId,
        kernel::entities::{
            Amount,
            InspectionReportRef,
        },
    },
    std::sync::Arc,
    time::OffsetDateTime,
    tokio::sync::Mutex,
    uuid::Uuid,
};

pub type AuctionId = Uuid;
pub type AuctionLock = Arc<Mutex<()>>;

#[derive(Clone, Debug, PartialEq)]
pub struct CarDetails {
    pub brand:        String,
    pub model:        String,
    pub year:         i32,
    pub registration: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuctionStatus {
    Scheduled,
    Live,
    Ended,
}

impl AuctionStatus {
    /// Status only ever moves forward: Scheduled -> Live -> Ended.
    pub fn next(&self) -> Option<AuctionStatus> {
        match self {
            AuctionStatus::Scheduled => Some(AuctionStatus::Live),
            AuctionStatus::Live => Some(AuctionStatus::Ended),
            AuctionStatus::Ended => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuctionCreate {
    pub car:               CarDetails,
    pub inspection_report: InspectionReportRef,
    pub start_time:        OffsetDateTime,
    pub end_time:          OffsetDateTime,
    pub starting_bid:      Amount,
    pub reserve_price:     Amount,
    pub min_increment:     Amount,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Auction {
    pub id:                AuctionId,
    pub car:               CarDetails,
    pub inspection_report: InspectionReportRef,
    pub status:            AuctionStatus,
    pub start_time:        OffsetDateTime,
    pub end_time:          OffsetDateTime,
    pub starting_bid:      Amount,
    pub reserve_price:     Amount,
    pub min_increment:     Amount,
    pub creation_time:     OffsetDateTime,

    pub current_bid:     Amount,
    pub current_leader:  Option<DealerId>,
    pub sequence_number: u64,
}

impl Auction {
    pub fn new(create: AuctionCreate) -> Self {
        Self {
            id:                AuctionId::new_v4(),
            car:               create.car,
            inspection_report: create.inspection_report,
            status:            AuctionStatus::Scheduled,
            start_time:        create.start_time,
            end_time:          create.end_time,
            starting_bid:      create.starting_bid,
            reserve_price:     create.reserve_price,
            min_increment:     create.min_increment,
            creation_time:     OffsetDateTime::now_utc(),

            current_bid:     create.starting_bid,
            current_leader:  None,
            sequence_number: 0,
        }
    }

    /// The reserve is only met once at least one bid was accepted. The
    /// starting bid alone never meets it, even when it is numerically higher.
    pub fn reserve_met(&self) -> bool {
        self.current_leader.is_some() && self.current_bid >= self.reserve_price
    }

    pub fn minimum_acceptable_bid(&self) -> Amount {
        self.current_bid.saturating_add(self.min_increment)
    }

    /// Whether a bid arriving at the given instant can still be accepted.
    /// Status is checked alongside the closing time so that bids which arrive
    /// after the window has elapsed but before the scheduler has concluded the
    /// room are turned away.
    pub fn accepts_bids_at(&self, at: OffsetDateTime) -> bool {
        self.status == AuctionStatus::Live && at < self.end_time
    }
}


#[cfg(test)]
mod tests {
    use super::{
        test_utils::new_test_auction_create,
        *,
    };

    #[test]
    fn test_status_only_moves_forward() {
        assert_eq!(AuctionStatus::Scheduled.next(), Some(AuctionStatus::Live));
        assert_eq!(AuctionStatus::Live.next(), Some(AuctionStatus::Ended));
        assert_eq!(AuctionStatus::Ended.next(), None);
    }

    #[test]
    fn test_reserve_needs_an_accepted_bid() {
        let mut auction = Auction::new(AuctionCreate {
            starting_bid: 200_000,
            reserve_price: 180_000,
            ..new_test_auction_create()
        });
        assert!(!auction.reserve_met());

        auction.current_leader = Some(DealerId::new_v4());
        assert!(auction.reserve_met());
    }

    #[test]
    fn test_accepts_bids_only_while_live_and_open() {
        let mut auction = Auction::new(new_test_auction_create());
        let now = OffsetDateTime::now_utc();
        assert!(!auction.accepts_bids_at(now));

        auction.status = AuctionStatus::Live;
        assert!(auction.accepts_bids_at(now));
        assert!(!auction.accepts_bids_at(auction.end_time));
        assert!(!auction.accepts_bids_at(auction.end_time + time::Duration::seconds(1)));

        auction.status = AuctionStatus::Ended;
        assert!(!auction.accepts_bids_at(now));
    }
}
