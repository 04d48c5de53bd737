use crate::{Client, Error};
use serde::{Deserialize, Serialize};

/// The link between a project and the billing account paying for it, as the Cloud Billing
/// API returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectBillingInfo {
    /// Resource name of this record, `projects/{project_id}/billingInfo`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub project_id: String,
    /// `billingAccounts/{billing_account_id}`, or empty if billing is disabled.
    pub billing_account_name: String,
    /// Output only, the API ignores it on update.
    pub billing_enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListPage {
    project_billing_info: Vec<ProjectBillingInfo>,
    next_page_token: Option<String>,
}

/// Resource name of a billing account, `billingAccounts/{id}`.
pub fn account_name(id: &str) -> String {
    format!("billingAccounts/{}", id)
}

impl Client {
    /// Lists every project attached to the billing account `account_id`, following pagination
    /// until the service reports no more pages. Records come back in service order.
    pub async fn list_projects(&self, account_id: &str) -> crate::Result<Vec<ProjectBillingInfo>> {
        let path = format!("/v1/{}/projects", account_name(account_id));
        let mut projects = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let query: Vec<(&str, &str)> = page_token
                .as_deref()
                .map(|tok| vec![("pageToken", tok)])
                .unwrap_or_default();
            let page: ListPage = self.get_query(&path, &query).await?;
            tracing::debug!(
                account = account_id,
                count = page.project_billing_info.len(),
                "fetched project page"
            );
            projects.extend(page.project_billing_info);

            match page.next_page_token.filter(|tok| !tok.is_empty()) {
                Some(next) if page_token.as_deref() == Some(next.as_str()) => {
                    return Err(Error::Msg(
                        format!("service repeated page token {:?} while listing projects", next)
                            .into(),
                    ));
                }
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(projects)
    }

    /// Re-points `project` at the billing account `account_id`.
    ///
    /// The record's `billing_account_name` is rewritten before it is sent, so on return it
    /// reflects the requested state. The service's view of the record is returned.
    pub async fn update_billing_info(
        &self,
        project: &mut ProjectBillingInfo,
        account_id: &str,
    ) -> crate::Result<ProjectBillingInfo> {
        project.billing_account_name = account_name(account_id);
        let path = format!("/v1/projects/{}/billingInfo", project.project_id);
        self.put_json(&path, &*project).await
    }
}
