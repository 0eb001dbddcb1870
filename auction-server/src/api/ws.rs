use {
    super::{
        RestError,
        WrappedRouter,
    },
    crate::{
        auction::{
            api::process_bid,
            service::get_auction_by_id::GetAuctionByIdInput,
        },
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::Store,
    },
    anyhow::{
        anyhow,
        Result,
    },
    axum::{
        extract::{
            ws::{
                Message,
                WebSocket,
            },
            State,
            WebSocketUpgrade,
        },
        http::HeaderMap,
        response::IntoResponse,
        Router,
    },
    dealer_auction_api_types::{
        auction::{
            Auction,
            AuctionId,
            AuctionStatus,
        },
        bid::BidCreate,
        ws::{
            APIResponse,
            AuctionEnded,
            BidAccepted,
            ClientMessage,
            ClientRequest,
            Route,
            ServerResultMessage,
            ServerResultResponse,
            ServerUpdateResponse,
        },
    },
    futures::{
        stream::{
            SplitSink,
            SplitStream,
        },
        SinkExt,
        StreamExt,
    },
    std::{
        collections::{
            HashMap,
            HashSet,
        },
        future::Future,
        net::IpAddr,
        sync::{
            atomic::{
                AtomicUsize,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
    time::OffsetDateTime,
    tokio::sync::{
        broadcast,
        RwLock,
        Semaphore,
    },
    tracing::{
        instrument,
        Instrument,
    },
};

pub struct WsState {
    pub requester_ip_header_name: String,
    subscriber_counter:           AtomicUsize,
    subscriber_per_ip:            RwLock<HashMap<IpAddr, HashSet<SubscriberId>>>,
    pub broadcast_sender:         broadcast::Sender<UpdateEvent>,
    pub broadcast_receiver:       broadcast::Receiver<UpdateEvent>,
}

const MAXIMUM_SUBSCRIBERS_PER_IP: usize = 10;

impl WsState {
    pub fn new(requester_ip_header_name: String, broadcast_channel_size: usize) -> Self {
        let (broadcast_sender, broadcast_receiver) = broadcast::channel(broadcast_channel_size);
        Self {
            requester_ip_header_name,
            subscriber_counter: AtomicUsize::new(0),
            subscriber_per_ip: RwLock::new(HashMap::new()),
            broadcast_sender,
            broadcast_receiver,
        }
    }

    /// Returns a new subscriber id if the requester ip is allowed to open a
    /// new connection, None otherwise.
    pub async fn get_new_subscriber_id(&self, requester_ip: Option<IpAddr>) -> Option<SubscriberId> {
        let subscriber_id = self.subscriber_counter.fetch_add(1, Ordering::SeqCst);
        if let Some(ip) = requester_ip {
            let mut write_guard = self.subscriber_per_ip.write().await;
            let subscribers = write_guard.entry(ip).or_default();
            if subscribers.len() >= MAXIMUM_SUBSCRIBERS_PER_IP {
                return None;
            }
            subscribers.insert(subscriber_id);
        }
        Some(subscriber_id)
    }

    pub async fn remove_subscriber(&self, subscriber_id: SubscriberId, requester_ip: Option<IpAddr>) {
        if let Some(ip) = requester_ip {
            let mut write_guard = self.subscriber_per_ip.write().await;
            if let Some(subscribers) = write_guard.get_mut(&ip) {
                subscribers.remove(&subscriber_id);
                if subscribers.is_empty() {
                    write_guard.remove(&ip);
                }
            }
        }
    }
}

/// Room activity published by the auction service and fanned out to every
/// connected subscriber.
#[derive(Clone, PartialEq, Debug)]
pub enum UpdateEvent {
    BidAccepted(BidAccepted),
    AuctionStarted(Auction),
    AuctionEnded(AuctionEnded),
}

impl UpdateEvent {
    pub fn auction_id(&self) -> AuctionId {
        match self {
            UpdateEvent::BidAccepted(update) => update.bid.auction_id,
            UpdateEvent::AuctionStarted(auction) => auction.id,
            UpdateEvent::AuctionEnded(update) => update.auction_id,
        }
    }
}

impl From<UpdateEvent> for ServerUpdateResponse {
    fn from(event: UpdateEvent) -> Self {
        match event {
            UpdateEvent::BidAccepted(update) => ServerUpdateResponse::BidAccepted { update },
            UpdateEvent::AuctionStarted(auction) => ServerUpdateResponse::AuctionStarted { auction },
            UpdateEvent::AuctionEnded(update) => ServerUpdateResponse::AuctionEnded { update },
        }
    }
}

/// Tracks where a subscriber joined a room, so broadcast events that are
/// already reflected in the snapshot they received can be dropped instead of
/// being replayed out of order.
struct RoomGate {
    last_sequence: u64,
    status:        AuctionStatus,
}

impl RoomGate {
    fn new(auction: &Auction) -> Self {
        Self {
            last_sequence: auction.sequence_number,
            status:        auction.status,
        }
    }

    fn admit(&mut self, event: &UpdateEvent) -> bool {
        match event {
            UpdateEvent::BidAccepted(update) => {
                if update.bid.sequence_number <= self.last_sequence {
                    return false;
                }
                self.last_sequence = update.bid.sequence_number;
                true
            }
            UpdateEvent::AuctionStarted(auction) => {
                if self.status != AuctionStatus::Scheduled {
                    return false;
                }
                self.status = AuctionStatus::Live;
                self.last_sequence = self.last_sequence.max(auction.sequence_number);
                true
            }
            UpdateEvent::AuctionEnded(_) => {
                if self.status == AuctionStatus::Ended {
                    return false;
                }
                self.status = AuctionStatus::Ended;
                true
            }
        }
    }
}

pub type SubscriberId = usize;

const PING_INTERVAL_DURATION: Duration = Duration::from_secs(30);
const MAX_ACTIVE_REQUESTS: usize = 50;

/// Subscriber is an actor that handles a single websocket connection.
/// It listens to the store for updates and sends them to the client.
pub struct Subscriber {
    id:                  SubscriberId,
    closed:              bool,
    store:               Arc<Store>,
    notify_receiver:     broadcast::Receiver<UpdateEvent>,
    receiver:            SplitStream<WebSocket>,
    sender:              SplitSink<WebSocket, Message>,
    rooms:               HashMap<AuctionId, RoomGate>,
    ping_interval:       tokio::time::Interval,
    exit_check_interval: tokio::time::Interval,
    responded_to_ping:   bool,
    active_requests:     Arc<Semaphore>,
    response_sender:     broadcast::Sender<ServerResultResponse>,
    response_receiver:   broadcast::Receiver<ServerResultResponse>,
}

fn ok_response(id: String) -> ServerResultResponse {
    ServerResultResponse {
        id:     Some(id),
        result: ServerResultMessage::Success(None),
    }
}

impl Subscriber {
    pub fn new(
        id: SubscriberId,
        store: Arc<Store>,
        notify_receiver: broadcast::Receiver<UpdateEvent>,
        receiver: SplitStream<WebSocket>,
        sender: SplitSink<WebSocket, Message>,
    ) -> Self {
        let (response_sender, response_receiver) = broadcast::channel(100);
        Subscriber {
            id,
            closed: false,
            store,
            notify_receiver,
            receiver,
            sender,
            rooms: HashMap::new(),
            ping_interval: tokio::time::interval(PING_INTERVAL_DURATION),
            exit_check_interval: tokio::time::interval(EXIT_CHECK_INTERVAL),
            responded_to_ping: true,
            active_requests: Arc::new(Semaphore::new(MAX_ACTIVE_REQUESTS)),
            response_sender,
            response_receiver,
        }
    }

    pub async fn run(&mut self) {
        while !self.closed {
            if let Err(e) = self.handle_next().await {
                tracing::debug!(subscriber = self.id, error = ?e, "Error Handling Subscriber Message.");
                break;
            }
        }
    }

    async fn handle_next(&mut self) -> Result<()> {
        tokio::select! {
            maybe_update_event = self.notify_receiver.recv() => {
                match maybe_update_event {
                    Ok(event) => self.handle_update(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(subscriber = self.id, skipped, "Subscriber fell behind the broadcast channel, resyncing rooms...");
                        self.resync_rooms().await
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        Err(anyhow!("Update event channel is closed"))
                    }
                }
            },
            maybe_message_or_err = self.receiver.next() => {
                self.handle_client_message(
                    maybe_message_or_err.ok_or(anyhow!("Client channel is closed"))??
                ).await
            },
            response_received = self.response_receiver.recv() => {
                match response_received {
                    Ok(response) => {
                        self.sender.send(serde_json::to_string(&response)?.into()).await?;
                        Ok(())
                    }
                    Err(e) => {
                        tracing::warn!(
                            subscriber = self.id,
                            error = ?e,
                            "Error Handling Subscriber Response Message."
                        );
                        Ok(())
                    }
                }
            },
            _ = self.ping_interval.tick() => {
                if !self.responded_to_ping {
                    return Err(anyhow!("Subscriber did not respond to ping. Closing connection."));
                }
                self.responded_to_ping = false;
                self.sender.send(Message::Ping(vec![])).await?;
                Ok(())
            },
            _ = self.exit_check_interval.tick() => {
                if SHOULD_EXIT.load(Ordering::Acquire) {
                    self.sender.close().await?;
                    self.closed = true;
                    return Err(anyhow!("Application is shutting down. Closing connection."));
                }
                Ok(())
            }
        }
    }

    #[instrument(
        target = "metrics",
        fields(category = "ws_update", result = "success", name),
        skip_all
    )]
    async fn handle_update(&mut self, event: UpdateEvent) -> Result<()> {
        match &event {
            UpdateEvent::BidAccepted(_) => {
                tracing::Span::current().record("name", "bid_accepted");
            }
            UpdateEvent::AuctionStarted(_) => {
                tracing::Span::current().record("name", "auction_started");
            }
            UpdateEvent::AuctionEnded(_) => {
                tracing::Span::current().record("name", "auction_ended");
            }
        }
        let result = self.relay_update(event).await;
        if result.is_err() {
            tracing::Span::current().record("result", "error");
        }
        result
    }

    async fn relay_update(&mut self, event: UpdateEvent) -> Result<()> {
        let Some(gate) = self.rooms.get_mut(&event.auction_id()) else {
            // Irrelevant update
            return Ok(());
        };
        if !gate.admit(&event) {
            // Already covered by the snapshot this subscriber joined with.
            return Ok(());
        }
        let message = serde_json::to_string(&ServerUpdateResponse::from(event))?;
        self.sender.send(message.into()).await?;
        Ok(())
    }

    /// The broadcast queue overran this subscriber and events were dropped.
    /// Instead of leaving the joined rooms with silent gaps, every room is
    /// sent again as a fresh snapshot and relaying continues from there.
    async fn resync_rooms(&mut self) -> Result<()> {
        let auction_ids: Vec<AuctionId> = self.rooms.keys().copied().collect();
        for auction_id in auction_ids {
            match self
                .store
                .auction_service
                .get_auction_by_id(GetAuctionByIdInput { auction_id })
                .await
            {
                Some(auction) => {
                    let auction = Auction::from(auction);
                    self.rooms.insert(auction.id, RoomGate::new(&auction));
                    let message =
                        serde_json::to_string(&ServerUpdateResponse::RoomSnapshot { auction })?;
                    self.sender.send(message.into()).await?;
                }
                None => {
                    tracing::debug!(
                        subscriber = self.id,
                        auction_id = %auction_id,
                        "Joined room disappeared during resync"
                    );
                    self.rooms.remove(&auction_id);
                }
            }
        }
        Ok(())
    }

    async fn handle_subscribe(
        &mut self,
        message_id: String,
        auction_ids: Vec<AuctionId>,
    ) -> Result<()> {
        let mut snapshots = Vec::with_capacity(auction_ids.len());
        let mut not_found_auction_ids = Vec::new();
        for auction_id in &auction_ids {
            match self
                .store
                .auction_service
                .get_auction_by_id(GetAuctionByIdInput {
                    auction_id: *auction_id,
                })
                .await
            {
                Some(auction) => snapshots.push(Auction::from(auction)),
                None => not_found_auction_ids.push(*auction_id),
            }
        }

        // If there is a single auction id that is not found, we don't
        // subscribe to any of the asked correct auction ids and return an
        // error to be more explicit and clear.
        if !not_found_auction_ids.is_empty() {
            return self
                .send_result_response(ServerResultResponse {
                    id:     Some(message_id),
                    result: ServerResultMessage::Err(format!(
                        "Auction(s) with id(s) {:?} not found",
                        not_found_auction_ids
                    )),
                })
                .await;
        }

        self.send_result_response(ok_response(message_id)).await?;
        // The snapshot goes out before the gate starts admitting broadcast
        // events, so the client always sees the room state first and then
        // only events newer than it.
        for auction in snapshots {
            self.rooms.insert(auction.id, RoomGate::new(&auction));
            let message = serde_json::to_string(&ServerUpdateResponse::RoomSnapshot { auction })?;
            self.sender.send(message.into()).await?;
        }
        Ok(())
    }

    async fn handle_unsubscribe(
        &mut self,
        message_id: String,
        auction_ids: Vec<AuctionId>,
    ) -> Result<()> {
        for auction_id in &auction_ids {
            self.rooms.remove(auction_id);
        }
        self.send_result_response(ok_response(message_id)).await
    }

    async fn handle_place_bid(
        &mut self,
        message_id: String,
        auction_id: AuctionId,
        bid_create: BidCreate,
    ) {
        let store = self.store.clone();
        // The bid is timestamped when the frame is handled, not when the
        // spawned task gets around to running it.
        let initiation_time = OffsetDateTime::now_utc();
        self.spawn_deferred(async move {
            match process_bid(store, auction_id, bid_create, initiation_time).await {
                Ok(bid_result) => ServerResultResponse {
                    id:     Some(message_id),
                    result: ServerResultMessage::Success(Some(APIResponse::BidResult(bid_result))),
                },
                Err(e) => ServerResultResponse {
                    id:     Some(message_id),
                    result: ServerResultMessage::Err(e.to_status_and_message().1),
                },
            }
        })
        .await;
    }

    /// Runs the future in a separate task and sends the response to the
    /// subscriber via the response channel. The number of concurrent
    /// in-flight requests per subscriber is bounded by the semaphore.
    async fn spawn_deferred(
        &mut self,
        fut: impl Future<Output = ServerResultResponse> + Send + 'static,
    ) {
        let permit = self
            .active_requests
            .clone()
            .acquire_owned()
            .await
            .expect("Semaphore should not be closed");
        let response_sender = self.response_sender.clone();
        self.store.task_tracker.spawn(
            async move {
                let response = fut.await;
                Self::send_response(&response_sender, response);
                drop(permit);
            }
            .in_current_span(),
        );
    }

    fn send_response(
        response_sender: &broadcast::Sender<ServerResultResponse>,
        response: ServerResultResponse,
    ) {
        if matches!(response.result, ServerResultMessage::Err(_)) {
            tracing::Span::current().record("result", "error");
        }
        if let Err(e) = response_sender.send(response) {
            tracing::warn!(error = ?e, "Error sending response to subscriber");
        }
    }

    async fn send_result_response(&mut self, response: ServerResultResponse) -> Result<()> {
        if matches!(response.result, ServerResultMessage::Err(_)) {
            tracing::Span::current().record("result", "error");
        }
        self.sender
            .send(serde_json::to_string(&response)?.into())
            .await?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        fields(category = "ws_client_message", result = "success", name),
        skip_all
    )]
    async fn handle_client_message(&mut self, message: Message) -> Result<()> {
        let maybe_client_message = match message {
            Message::Close(_) => {
                // Closing the connection. We don't remove it from the subscribers
                // list, instead when the Subscriber struct is dropped the channel
                // to subscribers list will be closed and it will eventually get
                // removed.
                tracing::Span::current().record("name", "close");

                // Send the close message to gracefully shut down the connection
                // Otherwise the client might get an abnormal Websocket closure
                // error.
                if let Err(e) = self.sender.close().await {
                    tracing::Span::current().record("result", "error");
                    return Err(e.into());
                }
                self.closed = true;
                return Ok(());
            }
            Message::Text(text) => serde_json::from_str::<ClientRequest>(&text),
            Message::Binary(data) => serde_json::from_slice::<ClientRequest>(&data),
            Message::Ping(_) => {
                // Axum will send Pong automatically
                tracing::Span::current().record("name", "ping");
                return Ok(());
            }
            Message::Pong(_) => {
                tracing::Span::current().record("name", "pong");
                self.responded_to_ping = true;
                return Ok(());
            }
        };

        match maybe_client_message {
            Err(e) => {
                tracing::Span::current().record("name", "invalid");
                self.send_result_response(ServerResultResponse {
                    id:     None,
                    result: ServerResultMessage::Err(e.to_string()),
                })
                .await?;
            }
            Ok(ClientRequest { msg, id }) => match msg {
                ClientMessage::Subscribe { auction_ids } => {
                    tracing::Span::current().record("name", "subscribe");
                    self.handle_subscribe(id, auction_ids).await?;
                }
                ClientMessage::Unsubscribe { auction_ids } => {
                    tracing::Span::current().record("name", "unsubscribe");
                    self.handle_unsubscribe(id, auction_ids).await?;
                }
                ClientMessage::PlaceBid { auction_id, bid } => {
                    tracing::Span::current().record("name", "place_bid");
                    self.handle_place_bid(id, auction_id, bid).await;
                }
            },
        }

        Ok(())
    }
}

pub async fn ws_route_handler(
    ws: WebSocketUpgrade,
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let requester_ip = headers
        .get(store.ws.requester_ip_header_name.as_str())
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next()) // Only take the first ip if there are multiple
        .and_then(|value| value.parse().ok());

    if requester_ip.is_none() {
        tracing::warn!("Failed to get requester IP address");
    }

    match store.ws.get_new_subscriber_id(requester_ip).await {
        Some(subscriber_id) => ws.on_upgrade(move |socket| {
            websocket_handler(socket, store, subscriber_id, requester_ip)
        }),
        None => RestError::TooManyOpenWebsocketConnections.into_response(),
    }
}

async fn websocket_handler(
    stream: WebSocket,
    state: Arc<Store>,
    subscriber_id: SubscriberId,
    requester_ip: Option<IpAddr>,
) {
    let (sender, receiver) = stream.split();
    let notify_receiver = state.ws.broadcast_receiver.resubscribe();
    let mut subscriber = Subscriber::new(subscriber_id, state.clone(), notify_receiver, receiver, sender);
    subscriber.run().await;
    state.ws.remove_subscriber(subscriber_id, requester_ip).await;
}

pub fn get_routes(store: Arc<Store>) -> Router<Arc<Store>> {
    WrappedRouter::new(store)
        .route(Route::Ws, ws_route_handler)
        .router
}
