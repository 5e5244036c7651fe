use crate::config::{ClientOptions, ConnectionProfile};

const API_URL: &str = "ZABBIX_API_URL";

pub fn get_api_url() -> Option<String> {
    std::env::var(API_URL).ok().filter(|url| !url.trim().is_empty())
}

const API_TOKEN: &str = "ZABBIX_API_TOKEN";

pub fn get_api_token() -> Option<String> {
    std::env::var(API_TOKEN).ok().filter(|token| !token.trim().is_empty())
}

const TIMEOUT_SECS: &str = "ZABBIX_TIMEOUT_SECS";

pub fn get_timeout_secs() -> Option<u64> {
    std::env::var(TIMEOUT_SECS).ok().and_then(|res| res.parse().ok())
}

const ENRICH_CONCURRENCY: &str = "ZABBIX_ENRICH_CONCURRENCY";

pub fn get_enrichment_concurrency() -> Option<usize> {
    std::env::var(ENRICH_CONCURRENCY)
        .ok()
        .and_then(|res| res.parse().ok())
}

/// Profile from `ZABBIX_API_URL` and `ZABBIX_API_TOKEN`, when both are set.
pub fn profile_from_env() -> Option<ConnectionProfile> {
    let mut profile = ConnectionProfile::new(get_api_url()?, get_api_token()?);
    profile.name = String::from("environment");
    Some(profile)
}

pub fn options_from_env() -> ClientOptions {
    ClientOptions {
        timeout_secs: get_timeout_secs(),
        enrichment_concurrency: get_enrichment_concurrency(),
    }
}
