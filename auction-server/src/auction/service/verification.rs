use crate::auction::entities;

/// Decides a bid against a snapshot of the room. Pure on purpose: every
/// input arrives as an argument and nothing here reads the store or the
/// clock, so the same inputs always produce the same verdict.
///
/// Checks run in a fixed order and the first failure wins: room liveness,
/// then dealer approval, then the amount.
pub fn validate_bid(
    auction: &entities::Auction,
    bid_create: &entities::BidCreate,
    dealer_approved: bool,
) -> Result<(), entities::BidRejection> {
    if !auction.accepts_bids_at(bid_create.initiation_time) {
        return Err(entities::BidRejection::AuctionNotLive);
    }
    if !dealer_approved {
        return Err(entities::BidRejection::DealerNotApproved);
    }
    if bid_create.amount < auction.minimum_acceptable_bid() {
        return Err(entities::BidRejection::BidTooLow);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            auction::entities::{
                test_utils::new_test_auction_create,
                Auction,
                AuctionStatus,
                BidCreate,
                BidRejection,
            },
            dealer::entities::DealerId,
            kernel::entities::Amount,
        },
        time::OffsetDateTime,
    };

    fn new_live_auction() -> Auction {
        let mut auction = Auction::new(new_test_auction_create());
        auction.status = AuctionStatus::Live;
        auction
    }

    fn new_bid_create(auction: &Auction, amount: Amount) -> BidCreate {
        BidCreate {
            auction_id:      auction.id,
            dealer_id:       DealerId::new_v4(),
            amount,
            initiation_time: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_first_bid_must_clear_starting_bid_plus_increment() {
        let auction = new_live_auction();
        let minimum = auction.starting_bid + auction.min_increment;

        let result = validate_bid(&auction, &new_bid_create(&auction, minimum - 1), true);
        assert_eq!(result, Err(BidRejection::BidTooLow));

        // Equal to the current bid is never enough.
        let result = validate_bid(&auction, &new_bid_create(&auction, auction.starting_bid), true);
        assert_eq!(result, Err(BidRejection::BidTooLow));

        assert!(validate_bid(&auction, &new_bid_create(&auction, minimum), true).is_ok());
    }

    #[test]
    fn test_scheduled_and_ended_rooms_reject_bids() {
        let mut auction = Auction::new(new_test_auction_create());
        let bid_create = new_bid_create(&auction, 200_000);

        assert_eq!(
            validate_bid(&auction, &bid_create, true),
            Err(BidRejection::AuctionNotLive)
        );

        auction.status = AuctionStatus::Ended;
        assert_eq!(
            validate_bid(&auction, &bid_create, true),
            Err(BidRejection::AuctionNotLive)
        );
    }

    #[test]
    fn test_bid_arriving_at_the_closing_boundary_is_rejected() {
        let auction = new_live_auction();

        // Status has not caught up with the elapsed window yet. The arrival
        // time decides, not the status.
        let mut bid_create = new_bid_create(&auction, 200_000);
        bid_create.initiation_time = auction.end_time;
        assert_eq!(
            validate_bid(&auction, &bid_create, true),
            Err(BidRejection::AuctionNotLive)
        );

        bid_create.initiation_time = auction.end_time - time::Duration::nanoseconds(1);
        assert!(validate_bid(&auction, &bid_create, true).is_ok());
    }

    #[test]
    fn test_unapproved_dealer_is_rejected() {
        let auction = new_live_auction();
        let result = validate_bid(&auction, &new_bid_create(&auction, 200_000), false);
        assert_eq!(result, Err(BidRejection::DealerNotApproved));
    }

    #[test]
    fn test_rejection_priority_first_failing_check_wins() {
        let mut auction = Auction::new(new_test_auction_create());
        let low_bid = new_bid_create(&auction, 1);

        // Not live beats both the missing approval and the low amount.
        assert_eq!(
            validate_bid(&auction, &low_bid, false),
            Err(BidRejection::AuctionNotLive)
        );

        // Live room: the missing approval beats the low amount.
        auction.status = AuctionStatus::Live;
        assert_eq!(
            validate_bid(&auction, &low_bid, false),
            Err(BidRejection::DealerNotApproved)
        );

        assert_eq!(
            validate_bid(&auction, &low_bid, true),
            Err(BidRejection::BidTooLow)
        );
    }

    #[test]
    fn test_amount_overflow_does_not_wrap() {
        let mut auction = new_live_auction();
        auction.current_bid = Amount::MAX - 1;
        auction.min_increment = 10;

        // The minimum saturates instead of wrapping, so only u64::MAX can
        // possibly qualify.
        let result = validate_bid(&auction, &new_bid_create(&auction, 5), true);
        assert_eq!(result, Err(BidRejection::BidTooLow));
        assert!(validate_bid(&auction, &new_bid_create(&auction, Amount::MAX), true).is_ok());
    }
}
