use {
    super::{
        verification::validate_bid,
        Service,
    },
    crate::{
        api::{
            ws::UpdateEvent,
            RestError,
        },
        auction::{
            entities,
            repository::ApplyBidError,
        },
    },
    dealer_auction_api_types::ws::BidAccepted,
};

/// How many times a bid may chase the room state before giving up. The store
/// asks callers to re-read and re-validate after a commit conflict; under the
/// room lock a single retry is already more than expected.
const BID_APPLY_ATTEMPTS: usize = 2;

pub struct HandleBidInput {
    pub bid_create: entities::BidCreate,
}

impl Service {
    /// Runs one bid through its room. Bids for the same auction are handled
    /// strictly in arrival order behind the room lock; bids for different
    /// auctions do not wait on each other.
    #[tracing::instrument(
        skip_all,
        fields(auction_id = %input.bid_create.auction_id, bid_id),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn handle_bid(
        &self,
        input: HandleBidInput,
    ) -> Result<entities::BidOutcome, RestError> {
        let auction_lock = self
            .repo
            .get_or_create_auction_lock(input.bid_create.auction_id)
            .await;
        let outcome = self
            .handle_bid_for_lock(&input.bid_create, auction_lock)
            .await?;
        if let entities::BidOutcome::Accepted { auction, bid } = &outcome {
            tracing::Span::current().record("bid_id", bid.id.to_string());
            if let Err(e) = self.event_sender.send(UpdateEvent::BidAccepted(BidAccepted {
                bid:             bid.clone().into(),
                new_current_bid: auction.current_bid,
                reserve_met:     auction.reserve_met(),
            })) {
                tracing::error!(error = %e, "Failed to send bid accepted event");
            }
        }
        Ok(outcome)
    }

    async fn handle_bid_for_lock(
        &self,
        bid_create: &entities::BidCreate,
        auction_lock: entities::AuctionLock,
    ) -> Result<entities::BidOutcome, RestError> {
        let _lock = auction_lock.lock().await;

        for _ in 0..BID_APPLY_ATTEMPTS {
            let auction = self
                .repo
                .get_auction(bid_create.auction_id)
                .await
                .ok_or(RestError::AuctionNotFound)?;
            let dealer_approved = self
                .dealer_service
                .is_approved(&bid_create.dealer_id)
                .await;
            if let Err(rejection) = validate_bid(&auction, bid_create, dealer_approved) {
                return Ok(entities::BidOutcome::Rejected(rejection));
            }

            match self.repo.apply_bid(bid_create, auction.current_bid).await {
                Ok(applied) => {
                    return Ok(entities::BidOutcome::Accepted {
                        auction: applied.auction,
                        bid:     applied.bid,
                    })
                }
                Err(ApplyBidError::AuctionNotFound) => return Err(RestError::AuctionNotFound),
                Err(ApplyBidError::Conflict) => continue,
            }
        }
        tracing::error!(
            auction_id = %bid_create.auction_id,
            "Bid kept conflicting with the room state"
        );
        Err(RestError::TemporarilyUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            auction::{
                entities::test_utils::new_test_auction_create,
                service::{
                    add_auction::AddAuctionInput,
                    conclude_auction::ConcludeAuctionInput,
                    get_bids::GetBidsInput,
                    start_auction::StartAuctionInput,
                },
            },
            dealer::entities::DealerId,
            kernel::entities::Amount,
        },
        futures::future::join_all,
        time::OffsetDateTime,
    };

    fn new_bid_create(
        auction: &entities::Auction,
        dealer_id: DealerId,
        amount: Amount,
    ) -> entities::BidCreate {
        entities::BidCreate {
            auction_id: auction.id,
            dealer_id,
            amount,
            initiation_time: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn test_accepted_bid_advances_room_and_reports_sequence() {
        let service = Service::new_with_test_defaults();
        let mut receiver = service.event_sender.subscribe();
        let auction = service.add_live_auction().await;
        let dealer_id = service.add_approved_dealer().await;

        let outcome = service
            .handle_bid(HandleBidInput {
                bid_create: new_bid_create(&auction, dealer_id, 151_000),
            })
            .await
            .unwrap();

        let entities::BidOutcome::Accepted { auction, bid } = outcome else {
            panic!("Expected an accepted outcome");
        };
        assert_eq!(bid.sequence_number, 1);
        assert_eq!(bid.dealer_id, dealer_id);
        assert_eq!(auction.current_bid, 151_000);
        assert_eq!(auction.current_leader, Some(dealer_id));

        // The started event from the fixture comes first.
        let started = receiver.recv().await.unwrap();
        assert!(matches!(started, UpdateEvent::AuctionStarted(_)));
        let accepted = receiver.recv().await.unwrap();
        let UpdateEvent::BidAccepted(update) = accepted else {
            panic!("Expected a bid accepted event");
        };
        assert_eq!(update.bid.sequence_number, 1);
        assert_eq!(update.new_current_bid, 151_000);
        assert!(!update.reserve_met);
    }

    #[tokio::test]
    async fn test_rejected_bid_is_an_outcome_not_an_error() {
        let service = Service::new_with_test_defaults();
        let auction = service.add_live_auction().await;
        let dealer_id = service.add_approved_dealer().await;

        let outcome = service
            .handle_bid(HandleBidInput {
                bid_create: new_bid_create(&auction, dealer_id, auction.current_bid),
            })
            .await
            .unwrap();
        assert_eq!(
            outcome,
            entities::BidOutcome::Rejected(entities::BidRejection::BidTooLow)
        );

        let outcome = service
            .handle_bid(HandleBidInput {
                bid_create: new_bid_create(&auction, DealerId::new_v4(), 151_000),
            })
            .await
            .unwrap();
        assert_eq!(
            outcome,
            entities::BidOutcome::Rejected(entities::BidRejection::DealerNotApproved)
        );
    }

    #[tokio::test]
    async fn test_unknown_auction_is_an_error() {
        let service = Service::new_with_test_defaults();
        let dealer_id = service.add_approved_dealer().await;
        let auction = entities::Auction::new(new_test_auction_create());

        let result = service
            .handle_bid(HandleBidInput {
                bid_create: new_bid_create(&auction, dealer_id, 151_000),
            })
            .await;
        assert!(matches!(result, Err(RestError::AuctionNotFound)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bids_serialize_per_room() {
        let service = Service::new_with_test_defaults();
        let auction = service.add_live_auction().await;
        let dealer_id = service.add_approved_dealer().await;

        let amounts: Vec<Amount> = (1..=50).map(|i| 150_000 + i * 1000).collect();
        let outcomes = join_all(amounts.iter().map(|amount| {
            let service = service.clone();
            let bid_create = new_bid_create(&auction, dealer_id, *amount);
            async move { service.handle_bid(HandleBidInput { bid_create }).await }
        }))
        .await;

        let accepted: Vec<_> = outcomes
            .into_iter()
            .map(|outcome| outcome.unwrap())
            .filter(|outcome| matches!(outcome, entities::BidOutcome::Accepted { .. }))
            .collect();
        assert!(!accepted.is_empty());

        // However the bids interleaved, the surviving history must be
        // strictly increasing in amount with gapless sequence numbers and
        // non-decreasing acceptance times.
        let bids = service
            .get_bids(GetBidsInput {
                auction_id: auction.id,
            })
            .await
            .unwrap();
        assert_eq!(bids.len(), accepted.len());
        for (index, bid) in bids.iter().enumerate() {
            assert_eq!(bid.sequence_number, index as u64 + 1);
        }
        for pair in bids.windows(2) {
            assert!(pair[0].amount + auction.min_increment <= pair[1].amount);
            assert!(pair[0].acceptance_time <= pair[1].acceptance_time);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_identical_simultaneous_bids_accept_exactly_one() {
        let service = Service::new_with_test_defaults();
        let auction = service.add_live_auction().await;
        let first = service.add_approved_dealer().await;
        let second = service.add_approved_dealer().await;

        let outcomes = join_all([first, second].into_iter().map(|dealer_id| {
            let service = service.clone();
            let bid_create = new_bid_create(&auction, dealer_id, 151_000);
            async move { service.handle_bid(HandleBidInput { bid_create }).await }
        }))
        .await;

        let accepted = outcomes
            .iter()
            .filter(|outcome| {
                matches!(
                    outcome,
                    Ok(entities::BidOutcome::Accepted { .. })
                )
            })
            .count();
        let rejected = outcomes
            .iter()
            .filter(|outcome| {
                matches!(
                    outcome,
                    Ok(entities::BidOutcome::Rejected(entities::BidRejection::BidTooLow))
                )
            })
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(rejected, 1);
    }

    #[tokio::test]
    async fn test_full_room_walkthrough_with_reserve_met() {
        let service = Service::new_with_test_defaults();
        let mut auction_create = new_test_auction_create();
        auction_create.starting_bid = 200_000;
        auction_create.min_increment = 1000;
        auction_create.reserve_price = 250_000;
        let auction = service
            .add_auction(AddAuctionInput { auction_create })
            .await
            .unwrap();
        service
            .start_auction(StartAuctionInput {
                auction_id: auction.id,
            })
            .await
            .unwrap();
        let dealer_id = service.add_approved_dealer().await;
        let mut receiver = service.event_sender.subscribe();

        let outcome = service
            .handle_bid(HandleBidInput {
                bid_create: new_bid_create(&auction, dealer_id, 205_000),
            })
            .await
            .unwrap();
        let entities::BidOutcome::Accepted { auction: after, .. } = outcome else {
            panic!("Expected an accepted outcome");
        };
        assert_eq!(after.current_bid, 205_000);
        assert!(!after.reserve_met());

        // Repeating the current bid is never enough.
        let outcome = service
            .handle_bid(HandleBidInput {
                bid_create: new_bid_create(&auction, dealer_id, 205_000),
            })
            .await
            .unwrap();
        assert_eq!(
            outcome,
            entities::BidOutcome::Rejected(entities::BidRejection::BidTooLow)
        );

        let outcome = service
            .handle_bid(HandleBidInput {
                bid_create: new_bid_create(&auction, dealer_id, 260_000),
            })
            .await
            .unwrap();
        let entities::BidOutcome::Accepted { auction: after, .. } = outcome else {
            panic!("Expected an accepted outcome");
        };
        assert_eq!(after.current_bid, 260_000);
        assert!(after.reserve_met());

        service
            .conclude_auction(ConcludeAuctionInput {
                auction_id: auction.id,
            })
            .await
            .unwrap();

        let first = receiver.recv().await.unwrap();
        let UpdateEvent::BidAccepted(update) = first else {
            panic!("Expected a bid accepted event");
        };
        assert_eq!(update.new_current_bid, 205_000);
        assert!(!update.reserve_met);
        let second = receiver.recv().await.unwrap();
        let UpdateEvent::BidAccepted(update) = second else {
            panic!("Expected a bid accepted event");
        };
        assert_eq!(update.new_current_bid, 260_000);
        assert!(update.reserve_met);
        let third = receiver.recv().await.unwrap();
        let UpdateEvent::AuctionEnded(ended) = third else {
            panic!("Expected an auction ended event");
        };
        assert_eq!(ended.final_bid, 260_000);
        assert_eq!(ended.winner_id, Some(dealer_id));
        assert!(ended.reserve_met);
    }

    #[tokio::test]
    async fn test_bids_after_conclusion_are_rejected_not_lost() {
        let service = Service::new_with_test_defaults();
        let auction = service.add_live_auction().await;
        let dealer_id = service.add_approved_dealer().await;

        service
            .conclude_auction(ConcludeAuctionInput {
                auction_id: auction.id,
            })
            .await
            .unwrap();

        let outcome = service
            .handle_bid(HandleBidInput {
                bid_create: new_bid_create(&auction, dealer_id, 151_000),
            })
            .await
            .unwrap();
        assert_eq!(
            outcome,
            entities::BidOutcome::Rejected(entities::BidRejection::AuctionNotLive)
        );
        let bids = service
            .get_bids(GetBidsInput {
                auction_id: auction.id,
            })
            .await
            .unwrap();
        assert!(bids.is_empty());
    }
}
