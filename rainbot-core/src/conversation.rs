//! Generic conversation shell: loads per-conversation state, routes the
//! turn to a start or continue path, and persists the outcome.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    model::{Request, Response},
    store::{Store, StoreError},
};

/// State plus reply produced by a handler. `state: None` asks the processor
/// to forget the conversation.
#[derive(Debug, Clone)]
pub struct Turn<S> {
    pub state: Option<S>,
    pub response: Response,
}

impl<S> Turn<S> {
    pub fn keep(state: S, response: Response) -> Self {
        Self {
            state: Some(state),
            response,
        }
    }

    pub fn reset(response: Response) -> Self {
        Self {
            state: None,
            response,
        }
    }
}

/// Domain logic plugged into a [`ConversationProcessor`].
#[async_trait]
pub trait ConversationHandler: Send + Sync {
    type State: Serialize + DeserializeOwned + Send + Sync;

    /// First message of a conversation that has no stored state.
    async fn on_start(&self, request: &Request) -> anyhow::Result<(Self::State, Response)>;

    async fn on_continue(
        &self,
        request: &Request,
        state: Self::State,
    ) -> anyhow::Result<Turn<Self::State>>;
}

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("conversation store failed: {0}")]
    Store(#[from] StoreError),

    #[error("failed to encode conversation state: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("turn handler failed: {0:#}")]
    Handler(#[source] anyhow::Error),
}

pub struct ConversationProcessor<H> {
    handler: H,
    store: Arc<dyn Store>,
    container: String,
}

impl<H: ConversationHandler> ConversationProcessor<H> {
    pub fn new(handler: H, store: Arc<dyn Store>, container: impl Into<String>) -> Self {
        Self {
            handler,
            store,
            container: container.into(),
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Run one turn. State is written only after the handler succeeds.
    ///
    /// Concurrent turns on the same conversation are not serialized; the
    /// last write wins.
    #[tracing::instrument(skip_all, fields(conversation = %request.conversation_id))]
    pub async fn handle_turn(&self, request: &Request) -> Result<Response, TurnError> {
        let key = request.conversation_id.as_str();
        let prior = self.store.get(&self.container, key).await?;

        // A record that no longer decodes is treated as absent; the start path
        // then overwrites it.
        let prior = prior.and_then(|bytes| match serde_json::from_slice::<H::State>(&bytes) {
            Ok(state) => Some(state),
            Err(err) => {
                warn!(error = %err, "discarding unreadable conversation state");
                None
            }
        });

        let turn = match prior {
            None => {
                info!("starting new conversation");
                let (state, response) = self
                    .handler
                    .on_start(request)
                    .await
                    .map_err(TurnError::Handler)?;
                Turn::keep(state, response)
            }
            Some(state) => {
                debug!("continuing conversation");
                self.handler
                    .on_continue(request, state)
                    .await
                    .map_err(|err| {
                        warn!(error = %err, "turn handler failed; state left untouched");
                        TurnError::Handler(err)
                    })?
            }
        };

        match &turn.state {
            Some(state) => {
                let bytes = serde_json::to_vec(state).map_err(TurnError::Encode)?;
                self.store.put(&self.container, key, bytes).await?;
            }
            None => {
                info!("conversation reset; deleting stored state");
                self.store.delete(&self.container, key).await?;
            }
        }

        Ok(turn.response)
    }
}
