//! Customer identity returned by the Customer Account API.

use serde::{Deserialize, Serialize};

/// The signed-in customer, as reported by the Customer Account API.
///
/// Identity is always fetched with the customer's own token. It is a display
/// signal only and must be re-fetched before any trust-sensitive decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerIdentity {
    /// Customer GID (e.g. `gid://shopify/Customer/123`).
    pub id: String,
    /// Name suitable for display.
    pub display_name: String,
    /// First name, if known.
    pub first_name: Option<String>,
    /// Last name, if known.
    pub last_name: Option<String>,
    /// Primary email address, if known.
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddressNode {
    email_address: Option<String>,
}

/// Wire shape of the `customer` field.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomerNode {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email_address: Option<EmailAddressNode>,
}

impl From<CustomerNode> for CustomerIdentity {
    fn from(node: CustomerNode) -> Self {
        let email = node.email_address.and_then(|e| e.email_address);
        let display_name = node
            .display_name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| {
                let full = [node.first_name.as_deref(), node.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                (!full.is_empty()).then_some(full)
            })
            .or_else(|| email.clone())
            .unwrap_or_else(|| "Customer".to_string());

        Self {
            id: node.id,
            display_name,
            first_name: node.first_name,
            last_name: node.last_name,
            email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_full_node() {
        let node: CustomerNode = serde_json::from_value(json!({
            "id": "gid://shopify/Customer/1",
            "displayName": "Ada Lovelace",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "emailAddress": {"emailAddress": "ada@example.com"}
        }))
        .unwrap();

        let identity = CustomerIdentity::from(node);
        assert_eq!(identity.display_name, "Ada Lovelace");
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_display_name_falls_back() {
        let node: CustomerNode = serde_json::from_value(json!({
            "id": "gid://shopify/Customer/2",
            "displayName": "",
            "firstName": "Grace"
        }))
        .unwrap();
        assert_eq!(CustomerIdentity::from(node).display_name, "Grace");

        let node: CustomerNode = serde_json::from_value(json!({
            "id": "gid://shopify/Customer/3",
            "emailAddress": {"emailAddress": "x@example.com"}
        }))
        .unwrap();
        assert_eq!(CustomerIdentity::from(node).display_name, "x@example.com");
    }
}
