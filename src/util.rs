use crate::Error;
use reqwest::Response;
use serde::Deserialize;

/// processes a response, returning it if it is OK,
/// decomposes it into an error if it's not ok.
pub async fn handle(resp: Response) -> crate::Result<Response> {
    if let Err(request_error) = resp.error_for_status_ref() {
        let body = resp.text().await?;
        Err(Error::Service {
            extra: error_message(&body),
            request_error,
        })
    } else {
        Ok(resp)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    // google apis: {"error": {"code": 403, "message": "...", "status": "..."}}
    Status { message: String },
    // oauth2: {"error": "invalid_grant", "error_description": "..."}
    Code(String),
}

#[derive(Deserialize)]
struct OAuthErrorBody {
    #[serde(default)]
    error_description: Option<String>,
}

/// Pulls the human readable message out of a google error body, falling back to the body itself.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: ErrorDetail::Status { message },
        }) => message,
        Ok(ErrorBody {
            error: ErrorDetail::Code(code),
        }) => match serde_json::from_str::<OAuthErrorBody>(body) {
            Ok(OAuthErrorBody {
                error_description: Some(desc),
            }) => format!("{}: {}", code, desc),
            _ => code,
        },
        Err(_) => body.trim().to_owned(),
    }
}
