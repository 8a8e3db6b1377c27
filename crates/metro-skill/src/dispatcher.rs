//! Request dispatcher.
//!
//! Runs one envelope through request interceptors, the first handler that
//! accepts it, and response interceptors, and produces the reply envelope.
//! Handlers are tried strictly in registration order.

use std::sync::Arc;

use tracing::{debug, error, info_span, warn, Instrument};

use metro_client::TransitQueryClient;
use metro_storage::PersistenceAdapter;

use crate::attributes::AttributesManager;
use crate::envelope::RequestEnvelope;
use crate::error::SkillError;
use crate::handler::generic_error::APOLOGY;
use crate::handler::{
    CancelAndStopHandler, ErrorHandler, FallbackHandler, GenericErrorHandler, HandlerInput,
    HelpHandler, IntentReflectorHandler, LaunchHandler, NextTrainHandler, RequestHandler,
    SessionEndedHandler, UnhandledHandler,
};
use crate::interceptor::{RequestInterceptor, ResponseInterceptor};
use crate::response::{Response, ResponseBuilder, ResponseEnvelope};
use crate::session::SessionStateManager;

pub struct Dispatcher {
    request_handlers: Vec<Box<dyn RequestHandler>>,
    error_handlers: Vec<Box<dyn ErrorHandler>>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    persistence: Option<Arc<dyn PersistenceAdapter>>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Produce the reply for one request. Never fails: every error becomes
    /// a spoken response.
    pub async fn dispatch(&self, envelope: &RequestEnvelope) -> ResponseEnvelope {
        let span = info_span!(
            "dispatch",
            request_id = envelope.request_id(),
            request_type = envelope.request_type(),
            session_id = envelope.session_id().unwrap_or_default(),
        );
        self.run(envelope).instrument(span).await
    }

    async fn run(&self, envelope: &RequestEnvelope) -> ResponseEnvelope {
        let attributes = AttributesManager::new(envelope, self.persistence.clone());
        let mut input = HandlerInput::new(envelope, attributes);

        for interceptor in &self.request_interceptors {
            if let Err(err) = interceptor.process(&mut input).await {
                // Session state was never hydrated, so nothing may be persisted.
                let response = self.handle_error(&mut input, &err);
                return ResponseEnvelope::new(input.attributes.into_session_attributes(), response);
            }
        }

        let response = match self.route(&mut input).await {
            Ok(response) => response,
            Err(err) => self.handle_error(&mut input, &err),
        };

        for interceptor in &self.response_interceptors {
            if let Err(err) = interceptor.process(&mut input, &response).await {
                error!(error = %err, "Response interceptor failed");
            }
        }

        debug!(
            ends_session = response.ends_session(),
            "Dispatch complete"
        );
        ResponseEnvelope::new(input.attributes.into_session_attributes(), response)
    }

    async fn route(&self, input: &mut HandlerInput<'_>) -> Result<Response, SkillError> {
        let handler = self
            .handler_for(input)
            .ok_or_else(|| SkillError::UnroutableRequest {
                request_type: input.envelope.request_type().to_string(),
            })?;
        debug!(handler = handler.name(), "Routing request");
        handler.handle(input).await
    }

    fn handle_error(&self, input: &mut HandlerInput<'_>, err: &SkillError) -> Response {
        error!(error = %err, detail = ?err, "Request failed");
        for handler in &self.error_handlers {
            if handler.can_handle(input, err) {
                return handler.handle(input, err);
            }
        }
        warn!("No error handler accepted the error, using built-in apology");
        ResponseBuilder::new()
            .speak(APOLOGY)
            .reprompt(APOLOGY)
            .get_response()
    }

    /// First registered handler that accepts `input`.
    pub fn handler_for(&self, input: &HandlerInput<'_>) -> Option<&dyn RequestHandler> {
        self.request_handlers
            .iter()
            .find(|h| h.can_handle(input))
            .map(|h| &**h)
    }

    /// Names of the registered request handlers, in order.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.request_handlers.iter().map(|h| h.name()).collect()
    }
}

/// Assembles a [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    request_handlers: Vec<Box<dyn RequestHandler>>,
    error_handlers: Vec<Box<dyn ErrorHandler>>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    persistence: Option<Arc<dyn PersistenceAdapter>>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_request_handler(mut self, handler: impl RequestHandler + 'static) -> Self {
        self.request_handlers.push(Box::new(handler));
        self
    }

    pub fn add_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handlers.push(Box::new(handler));
        self
    }

    pub fn add_request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    pub fn add_response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    pub fn with_persistence_adapter(mut self, adapter: Arc<dyn PersistenceAdapter>) -> Self {
        self.persistence = Some(adapter);
        self
    }

    /// Register the metro skill's full handler chain, its error handler and
    /// session persistence.
    pub fn register_defaults(self, client: Arc<dyn TransitQueryClient>) -> Self {
        let session = Arc::new(SessionStateManager::new());
        self.add_request_handler(LaunchHandler)
            .add_request_handler(NextTrainHandler::new(client))
            .add_request_handler(HelpHandler)
            .add_request_handler(CancelAndStopHandler)
            .add_request_handler(FallbackHandler)
            .add_request_handler(SessionEndedHandler)
            .add_request_handler(IntentReflectorHandler)
            .add_request_handler(UnhandledHandler)
            .add_error_handler(GenericErrorHandler)
            .add_request_interceptor(session.clone())
            .add_response_interceptor(session)
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            request_handlers: self.request_handlers,
            error_handlers: self.error_handlers,
            request_interceptors: self.request_interceptors,
            response_interceptors: self.response_interceptors,
            persistence: self.persistence,
        }
    }
}
