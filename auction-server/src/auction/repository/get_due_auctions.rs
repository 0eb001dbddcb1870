use {
    super::Repository,
    crate::auction::entities,
    time::OffsetDateTime,
};

#[derive(Debug, Default, PartialEq)]
pub struct DueAuctions {
    pub due_to_start: Vec<entities::AuctionId>,
    pub due_to_end:   Vec<entities::AuctionId>,
}

impl Repository {
    /// Rooms whose window edge has passed but whose status has not caught up
    /// yet. Returns ids only; the caller takes each room's lock before
    /// acting on it.
    pub async fn get_due_auctions(&self, now: OffsetDateTime) -> DueAuctions {
        let auctions = self.in_memory_store.auctions.read().await;
        let mut due = DueAuctions::default();
        for entry in auctions.values() {
            match entry.auction.status {
                entities::AuctionStatus::Scheduled if entry.auction.start_time <= now => {
                    due.due_to_start.push(entry.auction.id);
                }
                entities::AuctionStatus::Live if entry.auction.end_time <= now => {
                    due.due_to_end.push(entry.auction.id);
                }
                _ => {}
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::entities::test_utils::new_test_auction_create,
        time::Duration,
    };

    #[tokio::test]
    async fn test_due_auctions_partitioned_by_status_and_edge() {
        let repo = Repository::new();
        let now = OffsetDateTime::now_utc();

        let scheduled_due = repo
            .add_auction(entities::Auction::new(entities::AuctionCreate {
                start_time: now - Duration::minutes(1),
                end_time: now + Duration::hours(1),
                ..new_test_auction_create()
            }))
            .await
            .unwrap();
        let scheduled_not_due = repo
            .add_auction(entities::Auction::new(entities::AuctionCreate {
                start_time: now + Duration::hours(1),
                end_time: now + Duration::hours(2),
                ..new_test_auction_create()
            }))
            .await
            .unwrap();

        let mut live_due = entities::Auction::new(entities::AuctionCreate {
            start_time: now - Duration::hours(2),
            end_time: now - Duration::minutes(1),
            ..new_test_auction_create()
        });
        live_due.status = entities::AuctionStatus::Live;
        let live_due = repo.add_auction(live_due).await.unwrap();

        let mut ended = entities::Auction::new(entities::AuctionCreate {
            start_time: now - Duration::hours(2),
            end_time: now - Duration::hours(1),
            ..new_test_auction_create()
        });
        ended.status = entities::AuctionStatus::Ended;
        let ended = repo.add_auction(ended).await.unwrap();

        let due = repo.get_due_auctions(now).await;
        assert_eq!(due.due_to_start, vec![scheduled_due.id]);
        assert_eq!(due.due_to_end, vec![live_due.id]);
        assert!(!due.due_to_start.contains(&scheduled_not_due.id));
        assert!(!due.due_to_end.contains(&ended.id));
    }

    #[tokio::test]
    async fn test_room_past_both_edges_starts_first() {
        let repo = Repository::new();
        let now = OffsetDateTime::now_utc();

        // The whole window elapsed while the room was still scheduled. It
        // must walk Scheduled -> Live before it can be concluded.
        let auction = repo
            .add_auction(entities::Auction::new(entities::AuctionCreate {
                start_time: now - Duration::hours(2),
                end_time: now - Duration::hours(1),
                ..new_test_auction_create()
            }))
            .await
            .unwrap();

        let due = repo.get_due_auctions(now).await;
        assert_eq!(due.due_to_start, vec![auction.id]);
        assert!(due.due_to_end.is_empty());

        repo.transition_status(
            auction.id,
            entities::AuctionStatus::Scheduled,
            entities::AuctionStatus::Live,
        )
        .await
        .unwrap();

        let due = repo.get_due_auctions(now).await;
        assert!(due.due_to_start.is_empty());
        assert_eq!(due.due_to_end, vec![auction.id]);
    }
}
