use {
    crate::{
        AccessLevel,
        Routable,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
    utoipa::{
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub type DealerId = Uuid;

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, ToResponse, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// The dealer passed onboarding and may bid.
    Approved,
    /// The dealer is still being onboarded and may not bid yet.
    Pending,
    /// The dealer failed onboarding and may not bid.
    Rejected,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, ToResponse, Debug)]
pub struct Dealer {
    /// The unique id of the dealer.
    #[schema(example = "b2d9a3e1-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:              DealerId,
    /// The onboarding status of the dealer.
    pub approval_status: ApprovalStatus,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, ToResponse, Debug)]
pub struct DealerUpdate {
    /// The onboarding status to set for the dealer.
    pub approval_status: ApprovalStatus,
}

#[derive(AsRefStr, Clone)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = ":dealer_id")]
    GetDealer,
    #[strum(serialize = ":dealer_id")]
    PutDealer,
}

impl Routable for Route {
    fn properties(&self) -> crate::RouteProperties {
        let full_path = format!(
            "{}{}{}",
            crate::Route::V1.as_ref(),
            crate::Route::Dealer.as_ref(),
            self.as_ref()
        )
        .trim_end_matches('/')
        .to_string();
        match self {
            Route::GetDealer => crate::RouteProperties {
                access_level: AccessLevel::Admin,
                method: http::Method::GET,
                full_path,
            },
            Route::PutDealer => crate::RouteProperties {
                access_level: AccessLevel::Admin,
                method: http::Method::PUT,
                full_path,
            },
        }
    }
}
