use crate::extension::ExtensionError;
use crate::message::ServerResponse;

/// Connection back to the application server relay. An extension that
/// claims a request in `handle_request` answers it through this client.
pub trait RelayClient: Send {
    fn respond(&mut self, response: ServerResponse) -> Result<(), ExtensionError>;

    /// Reports a request-level failure to the relay instead of a response.
    fn error(&mut self, message: &str) -> Result<(), ExtensionError>;
}

/// Relay client that keeps everything it is sent in memory.
#[derive(Debug, Default)]
pub struct BufferedClient {
    responses: Vec<ServerResponse>,
    errors: Vec<String>,
    closed: bool,
}

impl BufferedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responses(&self) -> &[ServerResponse] {
        &self.responses
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn take_responses(&mut self) -> Vec<ServerResponse> {
        std::mem::take(&mut self.responses)
    }

    /// Further writes fail once the client is closed.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl RelayClient for BufferedClient {
    fn respond(&mut self, response: ServerResponse) -> Result<(), ExtensionError> {
        if self.closed {
            return Err(ExtensionError::client("Relay connection is closed"));
        }
        self.responses.push(response);
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<(), ExtensionError> {
        if self.closed {
            return Err(ExtensionError::client("Relay connection is closed"));
        }
        self.errors.push(message.to_string());
        Ok(())
    }
}
