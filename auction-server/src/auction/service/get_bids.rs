use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
};

pub struct GetBidsInput {
    pub auction_id: entities::AuctionId,
}

impl Service {
    #[tracing::instrument(
        skip_all,
        fields(auction_id = %input.auction_id),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn get_bids(&self, input: GetBidsInput) -> Result<Vec<entities::Bid>, RestError> {
        self.repo
            .get_bids(input.auction_id)
            .await
            .ok_or(RestError::AuctionNotFound)
    }
}
