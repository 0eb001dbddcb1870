use {
    super::entities::{
        Dealer,
        DealerId,
    },
    std::collections::HashMap,
    tokio::sync::RwLock,
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub dealers: RwLock<HashMap<DealerId, Dealer>>,
}

#[derive(Debug, Default)]
pub struct Repository {
    pub in_memory_store: InMemoryStore,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_dealer(&self, dealer: Dealer) -> Dealer {
        self.in_memory_store
            .dealers
            .write()
            .await
            .insert(dealer.id, dealer.clone());
        dealer
    }

    pub async fn get_dealer(&self, dealer_id: &DealerId) -> Option<Dealer> {
        self.in_memory_store
            .dealers
            .read()
            .await
            .get(dealer_id)
            .cloned()
    }
}
