use crate::adapters::sse::SseDecoder;
use crate::entities::messages::Message;
use crate::entities::pages::{ListResult, RecordPage};
use crate::entities::realtime::{RealtimeConnect, RealtimeEvent};
use crate::entities::users::{AuthResponse, PasswordAuthRequest};
use crate::repositories::collections::{CollectionClient, EventCallback, SubscriptionHandle};
use crate::repositories::users::Authenticator;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::Serialize;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

const API_PREFIX: &str = "/api";
const REALTIME_PATH: &str = const_str::concat!(API_PREFIX, "/realtime");
const USERS_AUTH_PATH: &str =
    const_str::concat!(API_PREFIX, "/collections/users/auth-with-password");
const CONNECT_EVENT: &str = "PB_CONNECT";
const SORT_NEWEST_FIRST: &str = "-created";
const EXPAND_SENDER: &str = "user";
const EXPAND_DETAILS: &str = "details";
const RECONNECT_DELAY: Duration = Duration::from_secs(3);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct ListQuery<'a> {
    page: u32,
    #[serde(rename = "perPage")]
    per_page: u32,
    sort: &'a str,
    filter: &'a str,
    expand: &'a str,
}

#[derive(Serialize)]
struct ExpandQuery<'a> {
    expand: &'a str,
}

#[derive(Serialize)]
struct SubscriptionRequest<'a> {
    #[serde(rename = "clientId")]
    client_id: &'a str,
    subscriptions: [&'a str; 1],
}

/// PocketBase REST and realtime client.
pub struct PocketBaseClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl PocketBaseClient {
    /// `timeout` bounds REST calls and the realtime handshake. The event stream itself has no deadline.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            http,
            token: RwLock::new(None),
        })
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn make_url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }
}

fn authorized(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.header(AUTHORIZATION, token),
        None => request,
    }
}

/// Realtime topic for a filtered collection, e.g. `messages/*?options=...`.
pub fn realtime_topic(collection: &str, filter: &str) -> anyhow::Result<String> {
    let options = serde_json::json!({ "query": { "filter": filter } }).to_string();
    let mut url = Url::parse("http://topic/")?;
    url.query_pairs_mut().append_pair("options", &options);
    Ok(format!("{collection}/*?{}", url.query().unwrap_or_default()))
}

#[async_trait]
impl CollectionClient for PocketBaseClient {
    async fn fetch_page(
        &self,
        collection: &str,
        filter: &str,
        page: u32,
        per_page: u32,
    ) -> anyhow::Result<RecordPage<Message>> {
        let url = self.make_url(&format!("{API_PREFIX}/collections/{collection}/records"));
        let request = self.http.get(url).timeout(self.timeout).query(&ListQuery {
            page,
            per_page,
            sort: SORT_NEWEST_FIRST,
            filter,
            expand: EXPAND_SENDER,
        });
        let response = authorized(request, self.token().as_deref())
            .send()
            .await?
            .error_for_status()?;
        let list: ListResult<Message> = response.json().await?;
        trace!(
            collection,
            page = list.page,
            per_page = list.per_page,
            total_items = list.total_items,
            "Fetched records"
        );
        Ok(list.into())
    }

    async fn subscribe(
        &self,
        collection: &str,
        filter: &str,
        callback: EventCallback,
    ) -> anyhow::Result<SubscriptionHandle> {
        let channel = RealtimeChannel {
            http: self.http.clone(),
            url: self.make_url(REALTIME_PATH),
            token: self.token(),
            topic: realtime_topic(collection, filter)?,
            callback,
        };
        let (connected_tx, connected_rx) = oneshot::channel();
        let task = tokio::spawn(channel.run(connected_tx));

        match tokio::time::timeout(self.timeout, connected_rx).await {
            Ok(Ok(Ok(()))) => Ok(SubscriptionHandle::new(move || task.abort())),
            Ok(Ok(Err(e))) => {
                task.abort();
                Err(e)
            }
            Ok(Err(_)) => anyhow::bail!("realtime channel closed before connecting"),
            Err(_) => {
                task.abort();
                anyhow::bail!("timed out connecting to the realtime channel")
            }
        }
    }
}

#[async_trait]
impl Authenticator for PocketBaseClient {
    async fn auth_with_password(
        &self,
        identity: &str,
        password: &str,
    ) -> anyhow::Result<Option<AuthResponse>> {
        let response = self
            .http
            .post(self.make_url(USERS_AUTH_PATH))
            .timeout(self.timeout)
            .query(&ExpandQuery {
                expand: EXPAND_DETAILS,
            })
            .json(&PasswordAuthRequest { identity, password })
            .send()
            .await?;
        if response.status() == StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        let auth: AuthResponse = response.error_for_status()?.json().await?;
        self.set_token(Some(auth.token.clone()));
        Ok(Some(auth))
    }

    fn clear_token(&self) {
        self.set_token(None);
    }
}

/// Reconnect delays for a realtime channel. Doubles per failed attempt and
/// starts over once a stream completes the handshake.
struct Backoff {
    delay: Duration,
}

impl Backoff {
    fn new() -> Self {
        Self {
            delay: RECONNECT_DELAY,
        }
    }

    fn next(&mut self, handshake_completed: bool) -> Duration {
        if handshake_completed {
            self.delay = RECONNECT_DELAY;
        }
        let delay = self.delay;
        self.delay = (self.delay * 2).min(MAX_RECONNECT_DELAY);
        delay
    }
}

struct RealtimeChannel {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
    topic: String,
    callback: EventCallback,
}

impl RealtimeChannel {
    /// Streams until aborted. Reconnects after the first successful handshake.
    async fn run(self, connected: oneshot::Sender<anyhow::Result<()>>) {
        let mut connected = Some(connected);
        let mut backoff = Backoff::new();
        loop {
            let mut handshake_completed = false;
            let result = self.stream(&mut connected, &mut handshake_completed).await;
            if let Some(connected) = connected.take() {
                let e = result
                    .err()
                    .unwrap_or_else(|| anyhow::anyhow!("realtime stream ended before connecting"));
                let _ = connected.send(Err(e));
                return;
            }
            match result {
                Ok(()) => debug!(topic = %self.topic, "Realtime stream ended, reconnecting"),
                Err(e) => warn!(topic = %self.topic, "Realtime stream failed, reconnecting: {e:?}"),
            }
            tokio::time::sleep(backoff.next(handshake_completed)).await;
        }
    }

    async fn stream(
        &self,
        connected: &mut Option<oneshot::Sender<anyhow::Result<()>>>,
        handshake_completed: &mut bool,
    ) -> anyhow::Result<()> {
        let request = self.http.get(&self.url).header(ACCEPT, "text/event-stream");
        let response = authorized(request, self.token.as_deref())
            .send()
            .await?
            .error_for_status()?;

        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::default();
        while let Some(chunk) = body.next().await {
            for event in decoder.push(&chunk?) {
                if event.event == CONNECT_EVENT {
                    let connect: RealtimeConnect = serde_json::from_str(&event.data)?;
                    self.register(&connect.client_id).await?;
                    debug!(topic = %self.topic, client_id = %connect.client_id, "Realtime connected");
                    *handshake_completed = true;
                    if let Some(connected) = connected.take() {
                        let _ = connected.send(Ok(()));
                    }
                    continue;
                }
                if event.event != self.topic {
                    trace!(event = %event.event, "Ignoring realtime event for another topic");
                    continue;
                }
                match serde_json::from_str::<RealtimeEvent>(&event.data) {
                    Ok(payload) => (self.callback)(payload),
                    Err(e) => warn!(topic = %self.topic, "Undecodable realtime payload: {e}"),
                }
            }
        }
        Ok(())
    }

    async fn register(&self, client_id: &str) -> anyhow::Result<()> {
        let request = self.http.post(&self.url).json(&SubscriptionRequest {
            client_id,
            subscriptions: [self.topic.as_str()],
        });
        authorized(request, self.token.as_deref())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
