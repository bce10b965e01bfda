//! Pick the endpoint template that applies to an API version.

use crate::error::{SdiosError, SdiosResult};
use crate::urls::{Endpoint, EndpointTemplate};
use crate::version::ApiVersion;

/// Template of the range with the greatest upper bound.
///
/// Ties keep the earliest entry in table order.
pub fn most_current(endpoint: &Endpoint) -> Option<&EndpointTemplate> {
    endpoint
        .urls
        .iter()
        .reduce(|best, candidate| {
            if candidate.0.cmp_upper(&best.0).is_gt() {
                candidate
            } else {
                best
            }
        })
        .map(|(_, template)| template)
}

/// Resolve the template for `requested`, or the most current one when `None`.
pub fn resolve<'a>(
    endpoint: &'a Endpoint,
    requested: Option<&ApiVersion>,
) -> SdiosResult<&'a EndpointTemplate> {
    let current = most_current(endpoint)
        .ok_or_else(|| SdiosError::invalid_url("Endpoint has no URL templates"))?;

    let Some(version) = requested else {
        return Ok(current);
    };

    endpoint
        .urls
        .iter()
        .find(|(range, _)| range.contains(version))
        .map(|(_, template)| template)
        .ok_or_else(|| {
            SdiosError::invalid_url(format!(
                "URL not found for API version {version}. Most current URL is {current}"
            ))
        })
}
