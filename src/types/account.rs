use serde::{Deserialize, Serialize};

/// One enrolled third-party service subscription, as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Enrollment identifier.
    pub code: String,
    pub host: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Base64 JPEG.
    #[serde(default)]
    pub customer_logo: Option<String>,
}

impl Account {
    /// Row identity in the rendered list.
    pub fn key(&self) -> String {
        format!("{}:{}", self.code, self.host)
    }

    pub fn display_name(&self) -> &str {
        match self.customer_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Unknown name",
        }
    }

    pub fn logo_data_uri(&self) -> Option<String> {
        self.customer_logo
            .as_deref()
            .filter(|logo| !logo.is_empty())
            .map(|logo| format!("data:image/jpeg;base64,{logo}"))
    }
}
