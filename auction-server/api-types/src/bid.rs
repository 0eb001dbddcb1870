use {
    crate::{
        auction::AuctionId,
        dealer::DealerId,
        Amount,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub type BidId = Uuid;

/// An accepted bid in an auction room.
#[derive(Serialize, Deserialize, ToSchema, Clone, ToResponse, Debug, PartialEq)]
pub struct Bid {
    /// The unique id of the bid.
    #[schema(example = "obo3ee3e-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:              BidId,
    /// The id of the auction the bid was placed in.
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id:      AuctionId,
    /// The id of the dealer who placed the bid.
    #[schema(example = "b2d9a3e1-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub dealer_id:       DealerId,
    /// The amount of the bid.
    #[schema(example = 165_000)]
    pub amount:          Amount,
    /// The position of the bid in the auction's accepted bid history, starting at 1.
    #[schema(example = 17)]
    pub sequence_number: u64,
    /// The server time the bid was accepted at. Monotonic within an auction.
    #[schema(example = "2024-05-23T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub acceptance_time: OffsetDateTime,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, ToResponse, Debug)]
pub struct BidCreate {
    /// The id of the dealer placing the bid.
    #[schema(example = "b2d9a3e1-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub dealer_id: DealerId,
    /// The amount of the bid.
    #[schema(example = 165_000)]
    pub amount:    Amount,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, ToResponse, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The auction is not currently accepting bids.
    AuctionNotLive,
    /// The dealer is not approved to bid.
    DealerNotApproved,
    /// The amount does not beat the current bid by the minimum increment.
    BidTooLow,
}

/// The outcome of placing a bid.
///
/// A rejection is a normal outcome, not an error; the request itself
/// succeeded.
#[derive(Serialize, Deserialize, ToSchema, Clone, ToResponse, Debug, PartialEq)]
pub struct BidResult {
    /// Whether the bid was accepted.
    #[schema(example = true)]
    pub accepted:        bool,
    /// Why the bid was rejected, when it was.
    pub reason:          Option<RejectionReason>,
    /// The id assigned to the accepted bid.
    #[schema(example = "obo3ee3e-58cc-4372-a567-0e02b2c3d479", value_type = Option<String>)]
    pub id:              Option<BidId>,
    /// The sequence number assigned to the accepted bid.
    #[schema(example = 17)]
    pub sequence_number: Option<u64>,
    /// The auction's highest bid after this one was accepted.
    #[schema(example = 165_000)]
    pub new_current_bid: Option<Amount>,
}

impl BidResult {
    pub fn rejected(reason: RejectionReason) -> Self {
        Self {
            accepted:        false,
            reason:          Some(reason),
            id:              None,
            sequence_number: None,
            new_current_bid: None,
        }
    }
}

#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone)]
pub struct Bids {
    pub items: Vec<Bid>,
}
