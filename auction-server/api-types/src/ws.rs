use {
    crate::{
        auction::{
            Auction,
            AuctionId,
        },
        bid::{
            Bid,
            BidCreate,
            BidResult,
        },
        dealer::DealerId,
        Amount,
        Routable,
    },
    http::Method,
    serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
    utoipa::ToSchema,
};


#[derive(Deserialize, Clone, ToSchema, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum ClientMessage {
    #[serde(rename = "subscribe")]
    Subscribe {
        #[schema(value_type = Vec<String>)]
        auction_ids: Vec<AuctionId>,
    },
    #[serde(rename = "unsubscribe")]
    Unsubscribe {
        #[schema(value_type = Vec<String>)]
        auction_ids: Vec<AuctionId>,
    },
    #[serde(rename = "place_bid")]
    PlaceBid {
        #[schema(value_type = String)]
        auction_id: AuctionId,
        bid:        BidCreate,
    },
}

#[derive(Deserialize, Clone, ToSchema, Serialize)]
pub struct ClientRequest {
    pub id:  String,
    #[serde(flatten)]
    pub msg: ClientMessage,
}

/// A bid was accepted and the room's state advanced.
#[derive(Serialize, Clone, ToSchema, Deserialize, Debug, PartialEq)]
pub struct BidAccepted {
    pub bid:             Bid,
    /// The new highest bid of the room.
    #[schema(example = 165_000)]
    pub new_current_bid: Amount,
    /// Whether the new highest bid has met the seller's reserve price.
    #[schema(example = false)]
    pub reserve_met:     bool,
}

/// An auction closed. No further bids will be accepted.
#[derive(Serialize, Clone, ToSchema, Deserialize, Debug, PartialEq)]
pub struct AuctionEnded {
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id:  AuctionId,
    /// The highest accepted bid at close, or the starting bid if there was none.
    #[schema(example = 165_000)]
    pub final_bid:   Amount,
    /// The dealer who won the auction, if the reserve price was met.
    #[schema(example = "b2d9a3e1-58cc-4372-a567-0e02b2c3d479", value_type = Option<String>)]
    pub winner_id:   Option<DealerId>,
    /// Whether the final bid met the seller's reserve price.
    #[schema(example = false)]
    pub reserve_met: bool,
}

/// This enum is used to send an update to the client for any rooms subscribed to.
#[derive(Serialize, Clone, ToSchema, Deserialize, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ServerUpdateResponse {
    #[serde(rename = "room_snapshot")]
    RoomSnapshot { auction: Auction },
    #[serde(rename = "bid_accepted")]
    BidAccepted { update: BidAccepted },
    #[serde(rename = "auction_started")]
    AuctionStarted { auction: Auction },
    #[serde(rename = "auction_ended")]
    AuctionEnded { update: AuctionEnded },
}

#[derive(Serialize, Clone, ToSchema, Deserialize, Debug)]
#[serde(untagged)]
pub enum APIResponse {
    BidResult(BidResult),
}
#[derive(Serialize, Clone, ToSchema, Deserialize, Debug)]
#[serde(tag = "status", content = "result")]
pub enum ServerResultMessage {
    #[serde(rename = "success")]
    Success(Option<APIResponse>),
    #[serde(rename = "error")]
    Err(String),
}

/// This enum is used to send the result for a specific client request with the same id.
/// Id is only None when the client message is invalid.
#[derive(Serialize, ToSchema, Deserialize, Clone, Debug)]
pub struct ServerResultResponse {
    pub id:     Option<String>,
    #[serde(flatten)]
    pub result: ServerResultMessage,
}

#[derive(AsRefStr, Clone)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = "ws")]
    Ws,
}

impl Routable for Route {
    fn properties(&self) -> crate::RouteProperties {
        let full_path = format!("{}{}", crate::Route::V1.as_ref(), self.as_ref())
            .trim_end_matches('/')
            .to_string();
        match self {
            Route::Ws => crate::RouteProperties {
                access_level: crate::AccessLevel::Public,
                method: Method::GET,
                full_path,
            },
        }
    }
}
