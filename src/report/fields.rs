use serde::{Deserialize, Deserializer};

/// Namespace every GA4 property resource name lives under.
pub const PROPERTY_PREFIX: &str = "properties/";

/// Split a comma-joined field string into trimmed, non-empty names.
pub fn split_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Trim every name and drop empty entries, keeping order.
pub fn clean_fields<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Prefix a GA4 property id with `properties/` unless it already has it.
pub fn normalize_property_id(property_id: &str) -> String {
    let property_id = property_id.trim();
    if property_id.starts_with(PROPERTY_PREFIX) {
        property_id.to_string()
    } else {
        format!("{PROPERTY_PREFIX}{property_id}")
    }
}

/// Give a Search Console site URL an `https://` scheme and a trailing slash.
pub fn normalize_site_url(site_url: &str) -> String {
    let site_url = site_url.trim();
    let mut url = if site_url.starts_with("http://") || site_url.starts_with("https://") {
        site_url.to_string()
    } else {
        format!("https://{site_url}")
    };
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

/// Accept either a JSON array of names or a single comma-joined string.
///
/// Older callers send `"country,city"`; the internal representation is
/// always the ordered list.
pub fn deserialize_field_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::List(names)) => clean_fields(&names),
        Some(Raw::Joined(joined)) => split_fields(&joined),
        None => Vec::new(),
    })
}

/// Accept a resource id sent either as a JSON string or a bare number.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(id)) => id.trim().to_string(),
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Treat an explicit JSON `null` the same as an absent field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
