//! Static catalog of the booking API's operations.
//!
//! Each [`Endpoint`] pairs an HTTP method with a URL template relative to the
//! API base. Templates may contain `{name}` placeholders that are filled from
//! path parameters when the request URL is built.

use reqwest::{Method, Url};

use crate::error::ClientError;

/// One API operation: verb plus URL template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: EndpointMethod,
    pub template: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointMethod {
    Get,
    Post,
}

impl EndpointMethod {
    #[must_use]
    pub fn as_method(self) -> Method {
        match self {
            EndpointMethod::Get => Method::GET,
            EndpointMethod::Post => Method::POST,
        }
    }
}

pub const GENERATE_OTP: Endpoint = Endpoint {
    name: "GENERATE_OTP",
    method: EndpointMethod::Post,
    template: "v2/auth/generateMobileOTP",
};

pub const VALIDATE_OTP: Endpoint = Endpoint {
    name: "VALIDATE_OTP",
    method: EndpointMethod::Post,
    template: "v2/auth/validateMobileOtp",
};

pub const LIST_BENEFICIARIES: Endpoint = Endpoint {
    name: "LIST_BENEFICIARIES",
    method: EndpointMethod::Get,
    template: "v2/appointment/beneficiaries",
};

pub const LIST_STATES: Endpoint = Endpoint {
    name: "LIST_STATES",
    method: EndpointMethod::Get,
    template: "v2/admin/location/states",
};

pub const LIST_DISTRICTS: Endpoint = Endpoint {
    name: "LIST_DISTRICTS",
    method: EndpointMethod::Get,
    template: "v2/admin/location/districts/{state_id}",
};

pub const SESSIONS_BY_DISTRICT: Endpoint = Endpoint {
    name: "SESSIONS_BY_DISTRICT",
    method: EndpointMethod::Get,
    template: "v2/appointment/sessions/calendarByDistrict",
};

pub const SESSIONS_BY_DISTRICT_PUBLIC: Endpoint = Endpoint {
    name: "SESSIONS_BY_DISTRICT_PUBLIC",
    method: EndpointMethod::Get,
    template: "v2/appointment/sessions/public/calendarByDistrict",
};

/// Catalogued for completeness; nothing in this crate calls it.
pub const SCHEDULE_APPOINTMENT: Endpoint = Endpoint {
    name: "SCHEDULE_APPOINTMENT",
    method: EndpointMethod::Post,
    template: "v2/appointment/schedule",
};

impl Endpoint {
    /// Renders the template against `base`, substituting every `{name}`
    /// placeholder from `path_params`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::MissingPathParam`] if a placeholder has no value.
    /// - [`ClientError::InvalidBaseUrl`] if the joined URL does not parse.
    pub fn url(&self, base: &Url, path_params: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut path = String::with_capacity(self.template.len());
        let mut rest = self.template;
        while let Some(open) = rest.find('{') {
            path.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| ClientError::MissingPathParam {
                endpoint: self.name,
                param: after.to_owned(),
            })?;
            let key = &after[..close];
            let value = path_params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| *v)
                .ok_or_else(|| ClientError::MissingPathParam {
                    endpoint: self.name,
                    param: key.to_owned(),
                })?;
            path.push_str(value);
            rest = &after[close + 1..];
        }
        path.push_str(rest);

        base.join(&path).map_err(|e| ClientError::InvalidBaseUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Parses a base URL and normalises it to end with exactly one slash, so that
/// relative endpoint templates are appended rather than replacing the last
/// path segment.
///
/// # Errors
///
/// Returns [`ClientError::InvalidBaseUrl`] if `base_url` is not a valid URL.
pub fn normalise_base_url(base_url: &str) -> Result<Url, ClientError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}
