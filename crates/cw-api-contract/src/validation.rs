//! Validation helpers for API contract types

use crate::error::ApiContractError;
use crate::types::*;
use validator::Validate;

/// Validate a send-message request
pub fn validate_send_message_request(request: &SendMessageRequest) -> Result<(), ApiContractError> {
    request.validate()?;
    Ok(())
}

/// Validate a classification request
pub fn validate_classify_request(request: &ClassifyMessageRequest) -> Result<(), ApiContractError> {
    request.validate()?;
    Ok(())
}

/// Validate a governed-task initiation request
pub fn validate_initiate_request(request: &InitiateTaskRequest) -> Result<(), ApiContractError> {
    request.validate()?;
    Ok(())
}

/// Validate a conversation creation request
pub fn validate_create_conversation_request(
    request: &CreateConversationRequest,
) -> Result<(), ApiContractError> {
    request.validate()?;
    Ok(())
}

/// Validate URL format
pub fn validate_url(url_str: &str) -> Result<(), ApiContractError> {
    url::Url::parse(url_str)?;
    Ok(())
}
