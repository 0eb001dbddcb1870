use {
    super::Service,
    crate::{
        api::{
            ws::UpdateEvent,
            RestError,
        },
        auction::{
            entities,
            repository::TransitionError,
        },
    },
    dealer_auction_api_types::ws::AuctionEnded,
};

pub struct ConcludeAuctionInput {
    pub auction_id: entities::AuctionId,
}

impl Service {
    /// Ends a live room, either because its closing time passed or because an
    /// operator cut it short. Taking the room lock first means every bid
    /// already queued for this room is resolved before the status flips;
    /// none are dropped mid flight.
    #[tracing::instrument(
        skip_all,
        fields(auction_id = %input.auction_id),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn conclude_auction(
        &self,
        input: ConcludeAuctionInput,
    ) -> Result<entities::Auction, RestError> {
        let auction_lock = self
            .repo
            .get_or_create_auction_lock(input.auction_id)
            .await;
        let result = self
            .conclude_auction_for_lock(input.auction_id, auction_lock)
            .await;
        if result.is_ok() {
            // The room is terminal now, so its lock entry can go as soon as
            // the last queued bid lets it go.
            self.repo.remove_auction_lock(&input.auction_id).await;
        }
        result
    }

    async fn conclude_auction_for_lock(
        &self,
        auction_id: entities::AuctionId,
        auction_lock: entities::AuctionLock,
    ) -> Result<entities::Auction, RestError> {
        let _lock = auction_lock.lock().await;
        let auction = self
            .repo
            .transition_status(
                auction_id,
                entities::AuctionStatus::Live,
                entities::AuctionStatus::Ended,
            )
            .await
            .map_err(|e| match e {
                TransitionError::AuctionNotFound => RestError::AuctionNotFound,
                TransitionError::Conflict => RestError::AuctionNotLive,
            })?;

        let reserve_met = auction.reserve_met();
        tracing::info!(
            auction_id = %auction.id,
            final_bid = auction.current_bid,
            reserve_met,
            "Auction concluded",
        );
        if let Err(e) = self.event_sender.send(UpdateEvent::AuctionEnded(AuctionEnded {
            auction_id:  auction.id,
            final_bid:   auction.current_bid,
            winner_id:   auction.current_leader.filter(|_| reserve_met),
            reserve_met,
        })) {
            tracing::error!(error = %e, "Failed to send auction ended event");
        }
        Ok(auction)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::service::handle_bid::HandleBidInput,
        time::OffsetDateTime,
    };

    #[tokio::test]
    async fn test_conclude_with_no_bids_has_no_winner() {
        let service = Service::new_with_test_defaults();
        let auction = service.add_live_auction().await;
        let mut receiver = service.event_sender.subscribe();

        let ended = service
            .conclude_auction(ConcludeAuctionInput {
                auction_id: auction.id,
            })
            .await
            .unwrap();
        assert_eq!(ended.status, entities::AuctionStatus::Ended);

        let event = receiver.recv().await.unwrap();
        let UpdateEvent::AuctionEnded(update) = event else {
            panic!("Expected an auction ended event");
        };
        assert_eq!(update.auction_id, auction.id);
        assert_eq!(update.final_bid, auction.starting_bid);
        assert_eq!(update.winner_id, None);
        assert!(!update.reserve_met);
    }

    #[tokio::test]
    async fn test_winner_requires_the_reserve_to_be_met() {
        let service = Service::new_with_test_defaults();
        let dealer_id = service.add_approved_dealer().await;

        // One room where the highest bid stays under the reserve, one where
        // it clears it.
        for (amount, expected_winner) in [(160_000, None), (185_000, Some(dealer_id))] {
            let auction = service.add_live_auction().await;
            let mut receiver = service.event_sender.subscribe();
            service
                .handle_bid(HandleBidInput {
                    bid_create: entities::BidCreate {
                        auction_id:      auction.id,
                        dealer_id,
                        amount,
                        initiation_time: OffsetDateTime::now_utc(),
                    },
                })
                .await
                .unwrap();
            receiver.recv().await.unwrap();

            service
                .conclude_auction(ConcludeAuctionInput {
                    auction_id: auction.id,
                })
                .await
                .unwrap();
            let event = receiver.recv().await.unwrap();
            let UpdateEvent::AuctionEnded(update) = event else {
                panic!("Expected an auction ended event");
            };
            assert_eq!(update.final_bid, amount);
            assert_eq!(update.winner_id, expected_winner);
            assert_eq!(update.reserve_met, expected_winner.is_some());
        }
    }

    #[tokio::test]
    async fn test_conclude_applies_at_most_once() {
        let service = Service::new_with_test_defaults();
        let auction = service.add_live_auction().await;

        service
            .conclude_auction(ConcludeAuctionInput {
                auction_id: auction.id,
            })
            .await
            .unwrap();
        let result = service
            .conclude_auction(ConcludeAuctionInput {
                auction_id: auction.id,
            })
            .await;
        assert!(matches!(result, Err(RestError::AuctionNotLive)));
    }

    #[tokio::test]
    async fn test_conclude_scheduled_room_is_a_conflict() {
        let service = Service::new_with_test_defaults();
        let auction = service
            .add_auction(crate::auction::service::add_auction::AddAuctionInput {
                auction_create: crate::auction::entities::test_utils::new_test_auction_create(),
            })
            .await
            .unwrap();

        let result = service
            .conclude_auction(ConcludeAuctionInput {
                auction_id: auction.id,
            })
            .await;
        assert!(matches!(result, Err(RestError::AuctionNotLive)));
    }

    #[tokio::test]
    async fn test_conclude_unknown_room() {
        let service = Service::new_with_test_defaults();
        let result = service
            .conclude_auction(ConcludeAuctionInput {
                auction_id: entities::AuctionId::new_v4(),
            })
            .await;
        assert!(matches!(result, Err(RestError::AuctionNotFound)));
    }
}
