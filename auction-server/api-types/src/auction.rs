use {
    crate::{
        dealer::DealerId,
        AccessLevel,
        Amount,
        Routable,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub type AuctionId = Uuid;

#[derive(Serialize, Deserialize, ToSchema, Clone, ToResponse, Debug, PartialEq)]
pub struct CarDetails {
    /// The manufacturer of the car.
    #[schema(example = "Toyota")]
    pub brand:        String,
    /// The model of the car.
    #[schema(example = "Land Cruiser")]
    pub model:        String,
    /// The model year of the car.
    #[schema(example = 2019)]
    pub year:         i32,
    /// The registration number on the plates.
    #[schema(example = "KA-04-HH-1234")]
    pub registration: String,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, ToResponse, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    /// The auction is announced but not yet open for bidding.
    Scheduled,
    /// The auction is open and accepting bids.
    Live,
    /// The auction is closed and no longer accepts bids.
    Ended,
}

/// The public view of an auction room.
///
/// The reserve price set by the seller never appears here; only the derived
/// `reserve_met` flag does.
#[derive(Serialize, Deserialize, ToSchema, Clone, ToResponse, Debug, PartialEq)]
pub struct Auction {
    /// The unique id of the auction.
    #[schema(example = "obo3ee3e-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:                AuctionId,
    /// The car on the block.
    pub car:               CarDetails,
    /// An opaque reference to the inspection report for the car.
    #[schema(example = "rpt-2024-0331")]
    pub inspection_report: String,
    /// The current status of the auction.
    pub status:            AuctionStatus,
    /// The time bidding opens.
    #[schema(example = "2024-05-23T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub start_time:        OffsetDateTime,
    /// The time bidding closes.
    #[schema(example = "2024-05-23T22:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub end_time:          OffsetDateTime,
    /// The price bidding starts at.
    #[schema(example = 150_000)]
    pub starting_bid:      Amount,
    /// The minimum amount a bid must exceed the current bid by.
    #[schema(example = 1000)]
    pub min_increment:     Amount,
    /// The highest accepted bid so far, or the starting bid if there is none.
    #[schema(example = 165_000)]
    pub current_bid:       Amount,
    /// The dealer holding the highest accepted bid, if any.
    #[schema(example = "b2d9a3e1-58cc-4372-a567-0e02b2c3d479", value_type = Option<String>)]
    pub current_leader_id: Option<DealerId>,
    /// The sequence number of the latest accepted bid, starting at 0.
    #[schema(example = 17)]
    pub sequence_number:   u64,
    /// Whether the current bid has met the seller's reserve price.
    #[schema(example = false)]
    pub reserve_met:       bool,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, ToResponse, Debug)]
pub struct AuctionCreate {
    /// The car on the block.
    pub car:               CarDetails,
    /// An opaque reference to the inspection report for the car.
    #[schema(example = "rpt-2024-0331")]
    pub inspection_report: String,
    /// The time bidding opens.
    #[schema(example = "2024-05-23T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub start_time:        OffsetDateTime,
    /// The time bidding closes.
    #[schema(example = "2024-05-23T22:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub end_time:          OffsetDateTime,
    /// The price bidding starts at.
    #[schema(example = 150_000)]
    pub starting_bid:      Amount,
    /// The seller's reserve price. Never revealed to bidders.
    #[schema(example = 180_000)]
    pub reserve_price:     Amount,
    /// The minimum amount a bid must exceed the current bid by. Must be at least 1.
    #[schema(example = 1000)]
    pub min_increment:     Amount,
}

#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone)]
pub struct Auctions {
    pub items: Vec<Auction>,
}

#[derive(AsRefStr, Clone)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = "")]
    PostAuction,
    #[strum(serialize = "")]
    GetAuctions,
    #[strum(serialize = ":auction_id")]
    GetAuction,
    #[strum(serialize = ":auction_id/bids")]
    GetAuctionBids,
    #[strum(serialize = ":auction_id/bids")]
    PostBid,
    #[strum(serialize = ":auction_id/end")]
    PostEndAuction,
}

impl Routable for Route {
    fn properties(&self) -> crate::RouteProperties {
        let full_path = format!(
            "{}{}{}",
            crate::Route::V1.as_ref(),
            crate::Route::Auction.as_ref(),
            self.as_ref()
        )
        .trim_end_matches('/')
        .to_string();
        match self {
            Route::PostAuction => crate::RouteProperties {
                access_level: AccessLevel::Admin,
                method: http::Method::POST,
                full_path,
            },
            Route::GetAuctions => crate::RouteProperties {
                access_level: AccessLevel::Public,
                method: http::Method::GET,
                full_path,
            },
            Route::GetAuction => crate::RouteProperties {
                access_level: AccessLevel::Public,
                method: http::Method::GET,
                full_path,
            },
            Route::GetAuctionBids => crate::RouteProperties {
                access_level: AccessLevel::Public,
                method: http::Method::GET,
                full_path,
            },
            Route::PostBid => crate::RouteProperties {
                access_level: AccessLevel::Public,
                method: http::Method::POST,
                full_path,
            },
            Route::PostEndAuction => crate::RouteProperties {
                access_level: AccessLevel::Admin,
                method: http::Method::POST,
                full_path,
            },
        }
    }
}
