use {
    super::{
        RestError,
        WrappedRouter,
    },
    crate::{
        dealer::{
            entities,
            service::{
                GetDealerInput,
                SetApprovalInput,
            },
        },
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
        dealer::{
            ApprovalStatus,
            Dealer,
            DealerId,
            DealerUpdate,
            Route,
        },
        ErrorBodyResponse,
    },
    std::sync::Arc,
};

impl From<ApprovalStatus> for entities::ApprovalStatus {
    fn from(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Approved => entities::ApprovalStatus::Approved,
            ApprovalStatus::Pending => entities::ApprovalStatus::Pending,
            ApprovalStatus::Rejected => entities::ApprovalStatus::Rejected,
        }
    }
}

impl From<entities::ApprovalStatus> for ApprovalStatus {
    fn from(status: entities::ApprovalStatus) -> Self {
        match status {
            entities::ApprovalStatus::Approved => ApprovalStatus::Approved,
            entities::ApprovalStatus::Pending => ApprovalStatus::Pending,
            entities::ApprovalStatus::Rejected => ApprovalStatus::Rejected,
        }
    }
}

impl From<entities::Dealer> for Dealer {
    fn from(dealer: entities::Dealer) -> Self {
        Dealer {
            id:              dealer.id,
            approval_status: dealer.approval_status.into(),
        }
    }
}

/// Set the onboarding status of a dealer.
///
/// Creates the dealer record the first time it is seen and returns the
/// updated dealer.
#[utoipa::path(put, path = "/v1/dealers/{dealer_id}",
security(
("bearerAuth" = []),
), params(
("dealer_id" = String, Path, example = "b2d9a3e1-58cc-4372-a567-0e02b2c3d479", description = "The id of the dealer"),
), request_body = DealerUpdate, responses(
(status = 200, description = "The updated dealer", body = Dealer),
(status = 400, response = ErrorBodyResponse),
),)]
pub async fn put_dealer(
    State(store): State<Arc<Store>>,
    Path(dealer_id): Path<DealerId>,
    Json(params): Json<DealerUpdate>,
) -> Result<Json<Dealer>, RestError> {
    let dealer = store
        .dealer_service
        .set_approval(SetApprovalInput {
            dealer_id,
            approval_status: params.approval_status.into(),
        })
        .await;
    Ok(Json(dealer.into()))
}

/// Fetch a dealer and their onboarding status.
#[utoipa::path(get, path = "/v1/dealers/{dealer_id}",
security(
("bearerAuth" = []),
), params(
("dealer_id" = String, Path, example = "b2d9a3e1-58cc-4372-a567-0e02b2c3d479", description = "The id of the dealer"),
), responses(
(status = 200, description = "The dealer", body = Dealer),
(status = 404, description = "Dealer was not found", body = ErrorBodyResponse),
),)]
pub async fn get_dealer(
    State(store): State<Arc<Store>>,
    Path(dealer_id): Path<DealerId>,
) -> Result<Json<Dealer>, RestError> {
    let dealer = store
        .dealer_service
        .get_dealer(GetDealerInput { dealer_id })
        .await?;
    Ok(Json(dealer.into()))
}

pub fn get_routes(store: Arc<Store>) -> Router<Arc<Store>> {
    WrappedRouter::new(store)
        .route(Route::GetDealer, get_dealer)
        .route(Route::PutDealer, put_dealer)
        .router
}
