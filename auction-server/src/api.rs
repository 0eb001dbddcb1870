use {
    crate::{
        config::RunOptions,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::Store,
    },
    anyhow::Result,
    axum::{
        async_trait,
        extract::{
            self,
            FromRequestParts,
        },
        handler::Handler,
        http::{
            request::Parts,
            StatusCode,
        },
        middleware,
        response::{
            IntoResponse,
            Response,
        },
        routing::{
            get,
            on,
            MethodFilter,
        },
        Json,
        Router,
    },
    axum_extra::{
        headers::{
            authorization::Bearer,
            Authorization,
        },
        TypedHeader,
    },
    clap::crate_version,
    dealer_auction_api_types::{
        auction::{
            Auction,
            AuctionCreate,
            AuctionStatus,
            Auctions,
            CarDetails,
        },
        bid::{
            Bid,
            BidCreate,
            BidResult,
            Bids,
            RejectionReason,
        },
        dealer::{
            ApprovalStatus,
            Dealer,
            DealerUpdate,
        },
        ws::{
            APIResponse,
            AuctionEnded,
            BidAccepted,
            ClientMessage,
            ClientRequest,
            ServerResultMessage,
            ServerResultResponse,
            ServerUpdateResponse,
        },
        AccessLevel,
        ErrorBodyResponse,
        Routable,
        Route,
    },
    std::sync::{
        atomic::Ordering,
        Arc,
    },
    tower_http::cors::CorsLayer,
    utoipa::{
        openapi::security::{
            HttpAuthScheme,
            HttpBuilder,
            SecurityScheme,
        },
        Modify,
        OpenApi,
    },
    utoipa_redoc::{
        Redoc,
        Servable,
    },
};

async fn root() -> String {
    format!("Dealer Auction Server API {}", crate_version!())
}

pub(crate) mod dealer;
pub(crate) mod ws;

#[derive(Debug)]
pub enum RestError {
    /// The request contained invalid parameters.
    BadParameters(String),
    /// The caller is not allowed to perform an admin operation.
    Unauthorized,
    /// The auction was not found.
    AuctionNotFound,
    /// The dealer was not found.
    DealerNotFound,
    /// An auction with the same id already exists.
    DuplicateAuction,
    /// The auction is not live, so it cannot be concluded.
    AuctionNotLive,
    /// The requester IP has too many open websocket connections.
    TooManyOpenWebsocketConnections,
    /// Internal error occurred during processing the request.
    TemporarilyUnavailable,
}

impl RestError {
    pub fn to_status_and_message(&self) -> (StatusCode, String) {
        match self {
            RestError::BadParameters(msg) => {
                (StatusCode::BAD_REQUEST, format!("Bad parameters: {}", msg))
            }
            RestError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Admin authorization is required".to_string(),
            ),
            RestError::AuctionNotFound => (
                StatusCode::NOT_FOUND,
                "Auction with the specified id was not found".to_string(),
            ),
            RestError::DealerNotFound => (
                StatusCode::NOT_FOUND,
                "Dealer with the specified id was not found".to_string(),
            ),
            RestError::DuplicateAuction => (
                StatusCode::BAD_REQUEST,
                "Auction with the specified id already exists".to_string(),
            ),
            RestError::AuctionNotLive => (
                StatusCode::CONFLICT,
                "Auction is not live".to_string(),
            ),
            RestError::TooManyOpenWebsocketConnections => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many open websocket connections for this IP".to_string(),
            ),
            RestError::TemporarilyUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "This service is temporarily unavailable".to_string(),
            ),
        }
    }
}

impl std::fmt::Display for RestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_status_and_message().1)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, msg) = self.to_status_and_message();
        (status, Json(ErrorBodyResponse { error: msg })).into_response()
    }
}

pub async fn live() -> Response {
    (StatusCode::OK, "OK").into_response()
}

#[derive(Clone, Debug)]
pub enum Auth {
    Admin,
    Unauthorized,
}

#[async_trait]
impl FromRequestParts<Arc<Store>> for Auth {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<Store>,
    ) -> Result<Self, Self::Rejection> {
        match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
            Ok(TypedHeader(Authorization(bearer)))
                if bearer.token() == state.admin_api_key =>
            {
                Ok(Self::Admin)
            }
            _ => Ok(Self::Unauthorized),
        }
    }
}

async fn require_admin(auth: Auth, request: extract::Request, next: middleware::Next) -> Response {
    match auth {
        Auth::Admin => next.run(request).await,
        Auth::Unauthorized => RestError::Unauthorized.into_response(),
    }
}

pub struct WrappedRouter {
    store:      Arc<Store>,
    pub router: Router<Arc<Store>>,
}

impl WrappedRouter {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            router: Router::new(),
        }
    }

    pub fn route<H, T>(self, route: impl Routable, handler: H) -> Self
    where
        H: Handler<T, Arc<Store>>,
        T: 'static,
    {
        let properties = route.properties();
        let method_filter = MethodFilter::try_from(properties.method)
            .expect("Route method should convert to a method filter");
        let method_router = on(method_filter, handler);
        let method_router = match properties.access_level {
            AccessLevel::Admin => method_router.route_layer(middleware::from_fn_with_state(
                self.store.clone(),
                require_admin,
            )),
            AccessLevel::Public => method_router,
        };
        Self {
            store:  self.store,
            router: self.router.route(&properties.full_path, method_router),
        }
    }
}

pub async fn start_api(run_options: RunOptions, store: Arc<Store>) -> Result<()> {
    // Make sure functions included in the paths section have distinct names, otherwise some api generators will fail
    #[derive(OpenApi)]
    #[openapi(
    paths(
    crate::auction::api::post_auction,
    crate::auction::api::get_auctions,
    crate::auction::api::get_auction,
    crate::auction::api::get_auction_bids,
    crate::auction::api::post_bid,
    crate::auction::api::post_end_auction,
    dealer::get_dealer,
    dealer::put_dealer,
    ),
    components(
    schemas(
    APIResponse,
    ApprovalStatus,
    Auction,
    AuctionCreate,
    AuctionEnded,
    AuctionStatus,
    Auctions,
    Bid,
    BidAccepted,
    BidCreate,
    BidResult,
    Bids,
    CarDetails,
    ClientMessage,
    ClientRequest,
    Dealer,
    DealerUpdate,
    ErrorBodyResponse,
    RejectionReason,
    ServerResultMessage,
    ServerResultResponse,
    ServerUpdateResponse,
    ),
    responses(
    ErrorBodyResponse,
    ),
    ),
    tags(
    (name = "Dealer Auction Server", description = "The auction server runs live dealer auction rooms. \
    It validates and serializes bids, drives room lifecycles from the clock, and streams ordered \
    updates to subscribed dealers.")
    ),
    modifiers(&SecurityAddon),
    )]
    struct ApiDoc;

    struct SecurityAddon;
    impl Modify for SecurityAddon {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            if let Some(components) = openapi.components.as_mut() {
                components.add_security_scheme(
                    "bearerAuth",
                    SecurityScheme::Http(
                        HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build(),
                    ),
                );
            }
        }
    }

    let app: Router<()> = Router::new()
        .merge(Redoc::with_url(Route::Docs.as_ref().to_string(), ApiDoc::openapi()))
        .merge(crate::auction::api::get_routes(store.clone()))
        .merge(dealer::get_routes(store.clone()))
        .merge(ws::get_routes(store.clone()))
        .route(Route::Root.as_ref(), get(root))
        .route(Route::Liveness.as_ref(), get(live))
        .route(
            Route::OpenApi.as_ref(),
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(CorsLayer::permissive())
        .with_state(store);

    let listener = tokio::net::TcpListener::bind(&run_options.server.listen_addr).await?;
    tracing::info!(listen_addr = %run_options.server.listen_addr, "Starting API server...");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down API server...");
        })
        .await?;
    Ok(())
}
