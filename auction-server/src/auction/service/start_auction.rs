use {
    super::Service,
    crate::{
        api::ws::UpdateEvent,
        auction::{
            entities,
            repository::TransitionError,
        },
    },
};

pub struct StartAuctionInput {
    pub auction_id: entities::AuctionId,
}

impl Service {
    /// Moves a scheduled room onto the floor. Only the lifecycle worker calls
    /// this; there is no public route for starting an auction early.
    #[tracing::instrument(skip_all, fields(auction_id = %input.auction_id))]
    pub async fn start_auction(
        &self,
        input: StartAuctionInput,
    ) -> Result<entities::Auction, TransitionError> {
        let auction = self
            .repo
            .transition_status(
                input.auction_id,
                entities::AuctionStatus::Scheduled,
                entities::AuctionStatus::Live,
            )
            .await?;
        tracing::info!(auction_id = %auction.id, "Auction started");
        if let Err(e) = self
            .event_sender
            .send(UpdateEvent::AuctionStarted(auction.clone().into()))
        {
            tracing::error!(error = %e, "Failed to send auction started event");
        }
        Ok(auction)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::{
            entities::test_utils::new_test_auction_create,
            service::add_auction::AddAuctionInput,
        },
        dealer_auction_api_types::auction::AuctionStatus,
    };

    #[tokio::test]
    async fn test_start_moves_room_live_and_announces_it() {
        let service = Service::new_with_test_defaults();
        let mut receiver = service.event_sender.subscribe();
        let auction = service
            .add_auction(AddAuctionInput {
                auction_create: new_test_auction_create(),
            })
            .await
            .unwrap();

        let started = service
            .start_auction(StartAuctionInput {
                auction_id: auction.id,
            })
            .await
            .unwrap();
        assert_eq!(started.status, entities::AuctionStatus::Live);

        let event = receiver.recv().await.unwrap();
        let UpdateEvent::AuctionStarted(update) = event else {
            panic!("Expected an auction started event");
        };
        assert_eq!(update.id, auction.id);
        assert_eq!(update.status, AuctionStatus::Live);
    }

    #[tokio::test]
    async fn test_start_applies_at_most_once() {
        let service = Service::new_with_test_defaults();
        let auction = service
            .add_auction(AddAuctionInput {
                auction_create: new_test_auction_create(),
            })
            .await
            .unwrap();

        service
            .start_auction(StartAuctionInput {
                auction_id: auction.id,
            })
            .await
            .unwrap();
        let result = service
            .start_auction(StartAuctionInput {
                auction_id: auction.id,
            })
            .await;
        assert_eq!(result, Err(TransitionError::Conflict));
    }
}
