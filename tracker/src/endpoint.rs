//! Outbound endpoint construction.
//!
//! Endpoints compose as `base + "/" + path + "?" + querystring`, with at
//! most one separator between base and path whatever the configured
//! tracker URL looks like. Query values are percent-encoded by the
//! serializer; callers never pre-encode.

use url::Url;

use crate::conversion::Conversion;

/// Relative path for click reports.
pub const CLICK_PATH: &str = "trk/v1";

/// Relative path for conversion reports.
pub const CONVERSION_PATH: &str = "pixel/v1";

/// Query parameter carrying the visitor identifier.
pub const VISITOR_ID_PARAM: &str = "k_user_id";

/// Query parameter whose presence on the page URL gates click reporting.
pub const CAMPAIGN_QUALIFIER: &str = "campaignid";

/// True when the page URL carries the campaign qualifier.
pub fn has_campaign_qualifier(page_url: &Url) -> bool {
    page_url
        .query_pairs()
        .any(|(key, _)| key == CAMPAIGN_QUALIFIER)
}

/// Resolve `base + "/" + path`, stripping a trailing slash off the base.
fn endpoint(tracker_url: &Url, path: &str) -> Url {
    let mut url = tracker_url.clone();
    let joined = format!("{}/{}", url.path().trim_end_matches('/'), path);
    url.set_path(&joined);
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Build the click-report URL for a pageview.
///
/// The page URL's query parameters are carried over in their original
/// order; any inbound visitor-id parameter is dropped and the resolved
/// visitor id is appended last.
pub fn click_url(tracker_url: &Url, page_url: &Url, visitor_id: &str) -> Url {
    let mut url = endpoint(tracker_url, CLICK_PATH);
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in page_url.query_pairs() {
            if key != VISITOR_ID_PARAM {
                query.append_pair(&key, &value);
            }
        }
        query.append_pair(VISITOR_ID_PARAM, visitor_id);
    }
    url
}

/// Build the conversion-report URL.
///
/// The parameter set is fixed; the promo code is appended only when the
/// payload resolved one.
pub fn conversion_url(tracker_url: &Url, token: &str, visitor_id: &str, conversion: &Conversion) -> Url {
    let mut url = endpoint(tracker_url, CONVERSION_PATH);
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("track", "1");
        query.append_pair("token", token);
        query.append_pair(VISITOR_ID_PARAM, visitor_id);
        query.append_pair("conversionType", &conversion.conversion_type);
        query.append_pair("revenue", &conversion.revenue);
        query.append_pair("currency", &conversion.currency);
        query.append_pair("orderId", &conversion.order_id);
        if let Some(promo_code) = &conversion.promo_code {
            query.append_pair("promoCode", promo_code);
        }
    }
    url
}
