use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use ticket_sales_engine::traits::{
    CheckoutProvider,
    CheckoutSessionRequest,
    ProviderError,
    ProviderLineItem,
    ProviderSession,
};

/// An in-memory checkout provider that records every session request it receives.
#[derive(Debug, Clone, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<FakeProviderState>>,
}

#[derive(Debug, Default)]
struct FakeProviderState {
    requests: Vec<CheckoutSessionRequest>,
    sessions: HashMap<String, ProviderSession>,
    line_items: HashMap<String, Vec<ProviderLineItem>>,
    failure: Option<ProviderError>,
}

impl FakeProvider {
    pub fn failing(message: &str) -> Self {
        let provider = Self::default();
        provider.state.lock().unwrap().failure = Some(ProviderError::Rejected(message.to_string()));
        provider
    }

    pub fn requests(&self) -> Vec<CheckoutSessionRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn add_session(&self, session: ProviderSession) {
        self.state.lock().unwrap().sessions.insert(session.id.clone(), session);
    }

    pub fn add_line_items(&self, session_id: &str, items: Vec<ProviderLineItem>) {
        self.state.lock().unwrap().line_items.insert(session_id.to_string(), items);
    }

    fn check_failure(&self) -> Result<(), ProviderError> {
        match &self.state.lock().unwrap().failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl CheckoutProvider for FakeProvider {
    async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> Result<ProviderSession, ProviderError> {
        self.check_failure()?;
        let mut state = self.state.lock().unwrap();
        let id = format!("cs_test_{}", state.requests.len() + 1);
        let session = ProviderSession {
            id: id.clone(),
            url: Some(format!("https://checkout.test/pay/{id}")),
            customer_email: Some(request.customer_email.clone()),
            metadata: request.metadata.clone(),
            ..Default::default()
        };
        state.requests.push(request);
        state.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn fetch_checkout_session(&self, session_id: &str) -> Result<ProviderSession, ProviderError> {
        self.check_failure()?;
        let state = self.state.lock().unwrap();
        state
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected(format!("No such checkout.session: '{session_id}'")))
    }

    async fn fetch_line_items(&self, session_id: &str) -> Result<Vec<ProviderLineItem>, ProviderError> {
        self.check_failure()?;
        let state = self.state.lock().unwrap();
        Ok(state.line_items.get(session_id).cloned().unwrap_or_default())
    }
}
