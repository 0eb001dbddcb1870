use {
    super::{
        conclude_auction::ConcludeAuctionInput,
        start_auction::StartAuctionInput,
        Service,
    },
    crate::{
        api::RestError,
        auction::repository::TransitionError,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
    },
    futures::future::join_all,
    std::sync::atomic::Ordering,
    time::OffsetDateTime,
};

impl Service {
    /// Drives room lifecycles from the clock. Every tick applies all overdue
    /// transitions, so rooms created with an opening time already in the past
    /// and ticks delayed under load are both caught up on the next pass.
    pub async fn run_lifecycle_loop(&self) -> anyhow::Result<()> {
        tracing::info!("Starting lifecycle loop...");
        let mut tick_interval = tokio::time::interval(self.config.lifecycle_tick_interval);
        let mut exit_check_interval = tokio::time::interval(EXIT_CHECK_INTERVAL);

        while !SHOULD_EXIT.load(Ordering::Acquire) {
            tokio::select! {
                _ = tick_interval.tick() => {
                    self.process_due_transitions(OffsetDateTime::now_utc()).await;
                }
                _ = exit_check_interval.tick() => {}
            }
        }
        tracing::info!("Shutting down lifecycle loop...");
        Ok(())
    }

    /// One scheduler pass at the given instant. Starts run before ends and
    /// the due set is read again in between, so a room whose whole window
    /// elapsed while it was still scheduled walks Scheduled -> Live -> Ended
    /// within a single pass instead of skipping a step.
    pub async fn process_due_transitions(&self, now: OffsetDateTime) {
        let due = self.repo.get_due_auctions(now).await;
        join_all(due.due_to_start.into_iter().map(|auction_id| {
            let service = self.clone();
            async move {
                match service.start_auction(StartAuctionInput { auction_id }).await {
                    Ok(_) => {}
                    // Someone else moved the room first; this tick has
                    // nothing left to do for it.
                    Err(TransitionError::Conflict) => {
                        tracing::debug!(auction_id = %auction_id, "Room already started");
                    }
                    Err(TransitionError::AuctionNotFound) => {
                        tracing::error!(auction_id = %auction_id, "Due room disappeared before start");
                    }
                }
            }
        }))
        .await;

        let due = self.repo.get_due_auctions(now).await;
        join_all(due.due_to_end.into_iter().map(|auction_id| {
            let service = self.clone();
            async move {
                match service
                    .conclude_auction(ConcludeAuctionInput { auction_id })
                    .await
                {
                    Ok(_) => {}
                    Err(RestError::AuctionNotLive) => {
                        tracing::debug!(auction_id = %auction_id, "Room already concluded");
                    }
                    Err(e) => {
                        tracing::error!(auction_id = %auction_id, error = ?e, "Failed to conclude due room");
                    }
                }
            }
        }))
        .await;
    }
}
