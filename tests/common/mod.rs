//! A fake Cloud Billing service.
#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OLD: &str = "0000AA-BBBBBB-CCCCCC";
pub const NEW: &str = "1111DD-EEEEEE-FFFFFF";
pub const TOKEN: &str = "test-token";

pub fn record(project: &str, account: &str) -> Value {
    json!({
        "name": format!("projects/{}/billingInfo", project),
        "projectId": project,
        "billingAccountName": format!("billingAccounts/{}", account),
        "billingEnabled": true,
    })
}

pub fn list_path() -> String {
    format!("/v1/billingAccounts/{}/projects", OLD)
}

pub fn update_path(project: &str) -> String {
    format!("/v1/projects/{}/billingInfo", project)
}

/// Serves `pages` of projects attached to [`OLD`], each page expected exactly once.
pub async fn mount_pages(server: &MockServer, pages: &[&[&str]]) {
    for (i, ids) in pages.iter().enumerate() {
        let records: Vec<Value> = ids.iter().map(|id| record(id, OLD)).collect();
        let mut body = json!({ "projectBillingInfo": records });
        if i + 1 < pages.len() {
            body["nextPageToken"] = json!(format!("page-{}", i + 1));
        }
        let mock = Mock::given(method("GET")).and(path(list_path()));
        let mock = if i == 0 {
            mock.and(query_param_is_missing("pageToken"))
        } else {
            mock.and(query_param("pageToken", format!("page-{}", i)))
        };
        mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }
}

/// Accepts a move of `project` onto [`NEW`] exactly `times` times.
pub async fn mount_update(server: &MockServer, project: &str, times: u64) {
    Mock::given(method("PUT"))
        .and(path(update_path(project)))
        .and(body_partial_json(json!({
            "projectId": project,
            "billingAccountName": format!("billingAccounts/{}", NEW),
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(record(project, NEW)))
        .expect(times)
        .mount(server)
        .await;
}

/// Rejects any move of `project` with a permission error.
pub async fn mount_denied_update(server: &MockServer, project: &str) {
    Mock::given(method("PUT"))
        .and(path(update_path(project)))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The caller does not have permission",
                "status": "PERMISSION_DENIED",
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Number of update calls the server saw for `project`.
pub async fn updates_for(server: &MockServer, project: &str) -> usize {
    let update = update_path(project);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "PUT" && r.url.path() == update)
        .count()
}
