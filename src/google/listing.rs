use crate::google::analytics::AnalyticsClient;
use crate::google::error::Error;
use crate::google::search_console::{SearchConsoleClient, SiteEntry};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PropertyListing {
    pub id_propriedade: String,
    pub nome_propriedade: String,
    /// Same resource name, under the key the query endpoints accept.
    pub property_id: String,
    pub tipo: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountListing {
    pub id_conta: String,
    pub nome_conta: String,
    pub propriedades: Vec<PropertyListing>,
    /// Set when the account's properties could not be listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub erro_propriedades: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteListing {
    pub url: String,
    pub nivel_permissao: Option<String>,
}

impl From<SiteEntry> for SiteListing {
    fn from(entry: SiteEntry) -> Self {
        Self {
            url: entry.site_url,
            nivel_permissao: entry.permission_level,
        }
    }
}

/// List accounts and the properties under each.
///
/// Failing to list one account's properties is recorded on that account and
/// does not stop the remaining accounts from being listed. Failing to list
/// the accounts themselves is an error.
pub async fn list_ga4_accounts(client: &AnalyticsClient) -> Result<Vec<AccountListing>, Error> {
    let accounts = client.list_accounts().await?;
    let mut listings = Vec::with_capacity(accounts.len());

    for (i, account) in accounts.into_iter().enumerate() {
        tracing::debug!(index = i + 1, account = %account.name, name = %account.display_name, "Listing properties");

        let (propriedades, erro_propriedades) = match client.list_properties(&account.name).await {
            Ok(properties) => {
                let listed = properties
                    .into_iter()
                    .map(|p| PropertyListing {
                        id_propriedade: p.name.clone(),
                        nome_propriedade: p.display_name,
                        property_id: p.name,
                        tipo: p.property_type.unwrap_or_else(|| "GA4".to_string()),
                    })
                    .collect::<Vec<_>>();
                tracing::debug!(account = %account.name, count = listed.len(), "Properties listed");
                (listed, None)
            }
            Err(e) => {
                tracing::warn!(account = %account.name, error = %e, "Failed to list properties");
                (Vec::new(), Some(e.to_string()))
            }
        };

        listings.push(AccountListing {
            id_conta: account.name,
            nome_conta: account.display_name,
            propriedades,
            erro_propriedades,
        });
    }

    tracing::info!(accounts = listings.len(), "GA4 accounts listed");
    Ok(listings)
}

/// List the Search Console sites visible to the service account.
pub async fn list_sites(client: &SearchConsoleClient) -> Result<Vec<SiteListing>, Error> {
    let sites: Vec<SiteListing> = client
        .list_sites()
        .await?
        .into_iter()
        .map(SiteListing::from)
        .collect();
    tracing::info!(sites = sites.len(), "Search Console sites listed");
    Ok(sites)
}
