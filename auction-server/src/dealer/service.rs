use {
    super::{
        entities::{
            ApprovalStatus,
            Dealer,
            DealerId,
        },
        repository::Repository,
    },
    crate::api::RestError,
    std::sync::Arc,
};

pub struct SetApprovalInput {
    pub dealer_id:       DealerId,
    pub approval_status: ApprovalStatus,
}

pub struct GetDealerInput {
    pub dealer_id: DealerId,
}

pub struct ServiceInner {
    repo: Arc<Repository>,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Default for Service {
    fn default() -> Self {
        Self::new()
    }
}

impl Service {
    pub fn new() -> Self {
        Self(Arc::new(ServiceInner {
            repo: Arc::new(Repository::new()),
        }))
    }

    /// Records the onboarding decision for a dealer, creating the record the
    /// first time we hear about them.
    #[tracing::instrument(skip_all, fields(dealer_id = %input.dealer_id))]
    pub async fn set_approval(&self, input: SetApprovalInput) -> Dealer {
        self.repo
            .upsert_dealer(Dealer {
                id:              input.dealer_id,
                approval_status: input.approval_status,
            })
            .await
    }

    #[tracing::instrument(
        skip_all,
        fields(dealer_id = %input.dealer_id),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn get_dealer(&self, input: GetDealerInput) -> Result<Dealer, RestError> {
        self.repo
            .get_dealer(&input.dealer_id)
            .await
            .ok_or(RestError::DealerNotFound)
    }

    /// Dealers we have never heard of are treated the same as dealers whose
    /// onboarding is pending or rejected: they cannot bid.
    pub async fn is_approved(&self, dealer_id: &DealerId) -> bool {
        self.repo
            .get_dealer(dealer_id)
            .await
            .map(|dealer| dealer.approval_status.can_bid())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_dealer_is_not_approved() {
        let service = Service::new();
        assert!(!service.is_approved(&DealerId::new_v4()).await);
    }

    #[tokio::test]
    async fn test_only_approved_dealers_can_bid() {
        let service = Service::new();
        let dealer_id = DealerId::new_v4();

        for (status, can_bid) in [
            (ApprovalStatus::Pending, false),
            (ApprovalStatus::Approved, true),
            (ApprovalStatus::Rejected, false),
        ] {
            service
                .set_approval(SetApprovalInput {
                    dealer_id,
                    approval_status: status,
                })
                .await;
            assert_eq!(service.is_approved(&dealer_id).await, can_bid);
        }
    }

    #[tokio::test]
    async fn test_get_dealer_unknown_id() {
        let service = Service::new();
        let result = service
            .get_dealer(GetDealerInput {
                dealer_id: DealerId::new_v4(),
            })
            .await;
        assert!(matches!(result, Err(RestError::DealerNotFound)));
    }
}
