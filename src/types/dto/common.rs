use poem_openapi::Object;

pub const STATUS_SUCCESS: &str = "success";

/// Response model for health check endpoint
#[derive(Object, Debug)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,

    /// Timestamp of the health check (ISO 8601 format)
    pub timestamp: String,
}

#[derive(Object, Debug)]
pub struct MessageData {
    pub message: String,
}

/// Success envelope carrying only a message
#[derive(Object, Debug)]
pub struct MessageEnvelope {
    pub status: String,
    pub data: MessageData,
}

impl MessageEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            data: MessageData {
                message: message.into(),
            },
        }
    }
}
