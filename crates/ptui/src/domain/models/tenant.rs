use anyhow::bail;
use anyhow::Result;
use reqwest::Url;

/// A Physna environment the user can connect to, as listed in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tenant {
    pub id: String,
    pub name: Option<String>,
    pub url: String,
    pub access_token: Option<String>,
}

impl Tenant {
    pub fn new(id: &str, url: &str) -> Tenant {
        return Tenant {
            id: id.to_string(),
            url: url.to_string(),
            ..Default::default()
        };
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => return name.to_string(),
            _ => return self.id.to_string(),
        }
    }

    /// API base URL without a trailing slash, so paths can be appended.
    pub fn base_url(&self) -> String {
        return self.url.trim_end_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            bail!("tenant id must not be empty");
        }

        let url = match Url::parse(&self.url) {
            Ok(url) => url,
            Err(err) => bail!("tenant '{}' has an invalid url '{}': {err}", self.id, self.url),
        };

        if url.scheme() != "http" && url.scheme() != "https" {
            bail!(
                "tenant '{}' url must use http or https, got '{}'",
                self.id,
                url.scheme()
            );
        }

        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_prefers_name_for_display() {
        let mut tenant = Tenant::new("acme", "https://acme.physna.com/api");
        assert_eq!(tenant.display_name(), "acme");

        tenant.name = Some("ACME Corp".to_string());
        assert_eq!(tenant.display_name(), "ACME Corp");

        tenant.name = Some("  ".to_string());
        assert_eq!(tenant.display_name(), "acme");
    }

    #[test]
    fn it_trims_trailing_slash_from_base_url() {
        let tenant = Tenant::new("acme", "https://acme.physna.com/api/");
        assert_eq!(tenant.base_url(), "https://acme.physna.com/api");
    }

    #[test]
    fn it_validates() {
        assert!(Tenant::new("acme", "https://acme.physna.com/api")
            .validate()
            .is_ok());
        assert!(Tenant::new("", "https://acme.physna.com/api")
            .validate()
            .is_err());

        let err = Tenant::new("acme", "not a url").validate().unwrap_err();
        assert!(err.to_string().contains("invalid url"));

        let err = Tenant::new("acme", "ftp://acme.physna.com")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }
}
