use {
    serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
    utoipa::{
        ToResponse,
        ToSchema,
    },
};

pub mod auction;
pub mod bid;
pub mod dealer;
pub mod ws;

/// Monetary amounts are integral units of the platform currency.
pub type Amount = u64;

#[derive(ToResponse, ToSchema, Serialize, Deserialize)]
#[response(description = "An error occurred processing the request")]
pub struct ErrorBodyResponse {
    pub error: String,
}

#[derive(AsRefStr)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = "v1")]
    V1,
    #[strum(serialize = "auctions")]
    Auction,
    #[strum(serialize = "dealers")]
    Dealer,
    #[strum(serialize = "")]
    Root,
    #[strum(serialize = "live")]
    Liveness,
    #[strum(serialize = "docs")]
    Docs,
    #[strum(serialize = "docs/openapi.json")]
    OpenApi,
}

#[derive(PartialEq)]
pub enum AccessLevel {
    Admin,
    Public,
}

pub struct RouteProperties {
    pub access_level: AccessLevel,
    pub method:       http::Method,
    pub full_path:    String,
}

pub trait Routable: AsRef<str> + Clone {
    fn properties(&self) -> RouteProperties;
}
