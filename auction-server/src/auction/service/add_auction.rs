use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
};

pub struct AddAuctionInput {
    pub auction_create: entities::AuctionCreate,
}

impl Service {
    #[tracing::instrument(skip_all, fields(auction_id), err(level = tracing::Level::TRACE))]
    pub async fn add_auction(
        &self,
        input: AddAuctionInput,
    ) -> Result<entities::Auction, RestError> {
        let create = input.auction_create;
        if create.start_time >= create.end_time {
            return Err(RestError::BadParameters(
                "Auction must start before it ends".to_string(),
            ));
        }
        if create.min_increment == 0 {
            return Err(RestError::BadParameters(
                "Minimum increment must be at least 1".to_string(),
            ));
        }

        let auction = self.repo.add_auction(entities::Auction::new(create)).await?;
        tracing::Span::current().record("auction_id", auction.id.to_string());
        tracing::info!(
            auction_id = %auction.id,
            start_time = %auction.start_time,
            end_time = %auction.end_time,
            "Auction scheduled",
        );
        Ok(auction)
    }
}
