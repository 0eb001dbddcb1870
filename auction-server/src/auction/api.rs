use {
    super::{
        entities,
        service::{
            add_auction::AddAuctionInput,
            conclude_auction::ConcludeAuctionInput,
            get_auction_by_id::GetAuctionByIdInput,
            get_bids::GetBidsInput,
            handle_bid::HandleBidInput,
        },
    },
    crate::{
        api::{
            RestError,
            WrappedRouter,
        },
        kernel::entities::InspectionReportRef,
        state::Store,
    },
    axum::{
        extract::{
            Path,
            State,
        },
        Json,
        Router,
    },
    dealer_auction_api_types::{
        auction::{
            Auction,
            AuctionCreate,
            AuctionId,
            AuctionStatus,
            Auctions,
            CarDetails,
            Route,
        },
        bid::{
            Bid,
            BidCreate,
            BidResult,
            Bids,
            RejectionReason,
        },
        ErrorBodyResponse,
    },
    std::sync::Arc,
    time::OffsetDateTime,
};

/// Schedule a new auction.
///
/// The auction is created in the scheduled state and opens for bidding on its
/// own once the start time passes. The reserve price is kept server side and
/// never appears in any response.
#[utoipa::path(post, path = "/v1/auctions",
    security(("bearerAuth" = [])),
    request_body = AuctionCreate,
    responses(
        (status = 200, description = "The scheduled auction", body = Auction),
        (status = 400, response = ErrorBodyResponse),
        (status = 401, description = "Admin authorization is required", body = ErrorBodyResponse),
    ),
)]
pub async fn post_auction(
    State(store): State<Arc<Store>>,
    Json(auction_create): Json<AuctionCreate>,
) -> Result<Json<Auction>, RestError> {
    let auction = store
        .auction_service
        .add_auction(AddAuctionInput {
            auction_create: auction_create.into(),
        })
        .await?;
    Ok(Json(auction.into()))
}

/// Fetch all auctions, whatever their status.
#[utoipa::path(get, path = "/v1/auctions", responses(
    (status = 200, description = "All known auctions", body = Auctions),
),)]
pub async fn get_auctions(State(store): State<Arc<Store>>) -> Result<Json<Auctions>, RestError> {
    let auctions = store.auction_service.get_auctions().await;
    Ok(Json(Auctions {
        items: auctions.into_iter().map(|auction| auction.into()).collect(),
    }))
}

/// Fetch the current state of a single auction.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}",
    params(("auction_id"=String, description = "Auction id to query for", example = "beedbeed-58cc-4372-a567-0e02b2c3d479")),
    responses(
        (status = 200, description = "The auction with the specified id", body = Auction),
        (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    ),
)]
pub async fn get_auction(
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<AuctionId>,
) -> Result<Json<Auction>, RestError> {
    let auction = store
        .auction_service
        .get_auction_by_id(GetAuctionByIdInput { auction_id })
        .await
        .ok_or(RestError::AuctionNotFound)?;
    Ok(Json(auction.into()))
}

/// Fetch the accepted bid history of an auction, in acceptance order.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}/bids",
    params(("auction_id"=String, description = "Auction id to query for", example = "beedbeed-58cc-4372-a567-0e02b2c3d479")),
    responses(
        (status = 200, description = "The accepted bids of the auction", body = Bids),
        (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    ),
)]
pub async fn get_auction_bids(
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<AuctionId>,
) -> Result<Json<Bids>, RestError> {
    let bids = store
        .auction_service
        .get_bids(GetBidsInput { auction_id })
        .await?;
    Ok(Json(Bids {
        items: bids.into_iter().map(|bid| bid.into()).collect(),
    }))
}

/// Place a bid on a live auction.
///
/// The bid is checked against the room state and either enters the bid
/// history or comes back with a rejection reason. A rejection is a normal
/// outcome and still returns 200.
#[utoipa::path(post, path = "/v1/auctions/{auction_id}/bids",
    request_body = BidCreate,
    params(("auction_id"=String, description = "Auction id to bid in", example = "beedbeed-58cc-4372-a567-0e02b2c3d479")),
    responses(
        (status = 200, description = "The outcome of placing the bid", body = BidResult),
        (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    ),
)]
pub async fn post_bid(
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<AuctionId>,
    Json(bid_create): Json<BidCreate>,
) -> Result<Json<BidResult>, RestError> {
    let result = process_bid(store, auction_id, bid_create, OffsetDateTime::now_utc()).await?;
    Ok(Json(result))
}

// The websocket handler calls this as well, with the receipt time taken when
// the frame arrived.
pub async fn process_bid(
    store: Arc<Store>,
    auction_id: AuctionId,
    bid_create: BidCreate,
    initiation_time: OffsetDateTime,
) -> Result<BidResult, RestError> {
    let outcome = store
        .auction_service
        .handle_bid(HandleBidInput {
            bid_create: entities::BidCreate {
                auction_id,
                dealer_id: bid_create.dealer_id,
                amount: bid_create.amount,
                initiation_time,
            },
        })
        .await?;
    Ok(outcome.into())
}

/// End a live auction right away instead of waiting for its closing time.
///
/// Bids already queued for the room are resolved before it closes.
#[utoipa::path(post, path = "/v1/auctions/{auction_id}/end",
    security(("bearerAuth" = [])),
    params(("auction_id"=String, description = "Auction id to end", example = "beedbeed-58cc-4372-a567-0e02b2c3d479")),
    responses(
        (status = 200, description = "The concluded auction", body = Auction),
        (status = 401, description = "Admin authorization is required", body = ErrorBodyResponse),
        (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
        (status = 409, description = "Auction is not live", body = ErrorBodyResponse),
    ),
)]
pub async fn post_end_auction(
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<AuctionId>,
) -> Result<Json<Auction>, RestError> {
    let auction = store
        .auction_service
        .conclude_auction(ConcludeAuctionInput { auction_id })
        .await?;
    Ok(Json(auction.into()))
}

pub fn get_routes(store: Arc<Store>) -> Router<Arc<Store>> {
    WrappedRouter::new(store)
        .route(Route::PostAuction, post_auction)
        .route(Route::GetAuctions, get_auctions)
        .route(Route::GetAuction, get_auction)
        .route(Route::GetAuctionBids, get_auction_bids)
        .route(Route::PostBid, post_bid)
        .route(Route::PostEndAuction, post_end_auction)
        .router
}

impl From<entities::CarDetails> for CarDetails {
    fn from(car: entities::CarDetails) -> Self {
        Self {
            brand:        car.brand,
            model:        car.model,
            year:         car.year,
            registration: car.registration,
        }
    }
}

impl From<CarDetails> for entities::CarDetails {
    fn from(car: CarDetails) -> Self {
        Self {
            brand:        car.brand,
            model:        car.model,
            year:         car.year,
            registration: car.registration,
        }
    }
}

impl From<entities::AuctionStatus> for AuctionStatus {
    fn from(status: entities::AuctionStatus) -> Self {
        match status {
            entities::AuctionStatus::Scheduled => AuctionStatus::Scheduled,
            entities::AuctionStatus::Live => AuctionStatus::Live,
            entities::AuctionStatus::Ended => AuctionStatus::Ended,
        }
    }
}

impl From<entities::Auction> for Auction {
    fn from(auction: entities::Auction) -> Self {
        let reserve_met = auction.reserve_met();
        Self {
            id:                auction.id,
            car:               auction.car.into(),
            inspection_report: auction.inspection_report.to_string(),
            status:            auction.status.into(),
            start_time:        auction.start_time,
            end_time:          auction.end_time,
            starting_bid:      auction.starting_bid,
            min_increment:     auction.min_increment,
            current_bid:       auction.current_bid,
            current_leader_id: auction.current_leader,
            sequence_number:   auction.sequence_number,
            reserve_met,
        }
    }
}

impl From<AuctionCreate> for entities::AuctionCreate {
    fn from(create: AuctionCreate) -> Self {
        Self {
            car:               create.car.into(),
            inspection_report: InspectionReportRef(create.inspection_report),
            start_time:        create.start_time,
            end_time:          create.end_time,
            starting_bid:      create.starting_bid,
            reserve_price:     create.reserve_price,
            min_increment:     create.min_increment,
        }
    }
}

impl From<entities::Bid> for Bid {
    fn from(bid: entities::Bid) -> Self {
        Self {
            id:              bid.id,
            auction_id:      bid.auction_id,
            dealer_id:       bid.dealer_id,
            amount:          bid.amount,
            sequence_number: bid.sequence_number,
            acceptance_time: bid.acceptance_time,
        }
    }
}

impl From<entities::BidRejection> for RejectionReason {
    fn from(rejection: entities::BidRejection) -> Self {
        match rejection {
            entities::BidRejection::AuctionNotLive => RejectionReason::AuctionNotLive,
            entities::BidRejection::DealerNotApproved => RejectionReason::DealerNotApproved,
            entities::BidRejection::BidTooLow => RejectionReason::BidTooLow,
        }
    }
}

impl From<entities::BidOutcome> for BidResult {
    fn from(outcome: entities::BidOutcome) -> Self {
        match outcome {
            entities::BidOutcome::Accepted { auction, bid } => BidResult {
                accepted:        true,
                reason:          None,
                id:              Some(bid.id),
                sequence_number: Some(bid.sequence_number),
                new_current_bid: Some(auction.current_bid),
            },
            entities::BidOutcome::Rejected(rejection) => BidResult::rejected(rejection.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            auction::entities::test_utils::new_test_auction_create,
            dealer::entities::DealerId,
        },
    };

    #[test]
    fn test_reserve_price_never_leaves_the_server() {
        let mut auction = entities::Auction::new(new_test_auction_create());
        auction.status = entities::AuctionStatus::Live;
        auction.current_bid = 185_000;
        auction.current_leader = Some(DealerId::new_v4());
        auction.sequence_number = 3;

        let api_auction: Auction = auction.clone().into();
        let serialized = serde_json::to_value(&api_auction).unwrap();

        assert!(serialized.get("reserve_price").is_none());
        assert_eq!(serialized["current_bid"], 185_000);
        assert_eq!(serialized["reserve_met"], true);
        assert_eq!(serialized["sequence_number"], 3);
        assert_eq!(serialized["status"], "live");
    }

    #[test]
    fn test_bid_outcome_maps_to_result() {
        let auction = entities::Auction::new(new_test_auction_create());
        let bid = entities::Bid {
            id:              dealer_auction_api_types::bid::BidId::new_v4(),
            auction_id:      auction.id,
            dealer_id:       DealerId::new_v4(),
            amount:          151_000,
            sequence_number: 1,
            acceptance_time: OffsetDateTime::now_utc(),
        };

        let result: BidResult = entities::BidOutcome::Accepted {
            auction,
            bid: bid.clone(),
        }
        .into();
        assert!(result.accepted);
        assert_eq!(result.id, Some(bid.id));
        assert_eq!(result.sequence_number, Some(1));
        assert_eq!(result.reason, None);

        let result: BidResult =
            entities::BidOutcome::Rejected(entities::BidRejection::BidTooLow).into();
        assert!(!result.accepted);
        assert_eq!(result.reason, Some(RejectionReason::BidTooLow));
        assert_eq!(result.id, None);
    }
}
