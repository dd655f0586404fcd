//! Static assets served by the tracking endpoint.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// 1x1 transparent GIF returned for click and convert hits.
const TRANSPARENT_GIF_B64: &str = "R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

/// Client script embedded on advertiser landing pages.
///
/// Reads `data-offer-id` from its own tag and `wm_id`/`utm_*` from the page
/// URL. A click is reported only for `utm_source=cpasibo_pro&utm_medium=cpl`;
/// `window.cpasibo.trackConversion()` reports a conversion.
pub const PIXEL_SCRIPT: &str = r#"
(function() {
    var offerId = document.currentScript.getAttribute('data-offer-id');
    if (!offerId) return;
    
    var urlParams = new URLSearchParams(window.location.search);
    var wmId = urlParams.get('wm_id');
    var utmSource = urlParams.get('utm_source');
    var utmMedium = urlParams.get('utm_medium');
    
    if (wmId && utmSource === 'cpasibo_pro' && utmMedium === 'cpl') {
        var img = new Image();
        img.src = window.location.protocol + '//' + window.location.host + 
                  '/api/pixel?action=click&offer_id=' + offerId + 
                  '&wm_id=' + wmId + 
                  '&referrer=' + encodeURIComponent(document.referrer);
    }
    
    window.cpasibo = {
        trackConversion: function() {
            if (wmId && offerId) {
                var img = new Image();
                img.src = window.location.protocol + '//' + window.location.host + 
                          '/api/pixel?action=convert&offer_id=' + offerId + '&wm_id=' + wmId;
            }
        }
    };
})();
"#;

/// Decoded bytes of the tracking GIF.
pub fn transparent_gif() -> Result<Vec<u8>> {
    STANDARD
        .decode(TRANSPARENT_GIF_B64)
        .context("Failed to decode tracking GIF")
}

/// HTML snippet an advertiser pastes into the landing page for `offer_id`.
#[must_use]
pub fn snippet_for(script_url: &str, offer_id: i32) -> String {
    format!(r#"<script src="{script_url}" data-offer-id="{offer_id}"></script>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gif_decodes_to_a_gif89a_image() {
        let bytes = transparent_gif().unwrap();
        assert!(bytes.starts_with(b"GIF89a"));
        assert_eq!(bytes.len(), 42);
    }

    #[test]
    fn snippet_embeds_offer_id() {
        assert_eq!(
            snippet_for("https://cpasibo.pro/pixel.js", 42),
            r#"<script src="https://cpasibo.pro/pixel.js" data-offer-id="42"></script>"#
        );
    }

    #[test]
    fn script_reads_offer_id_from_its_own_tag() {
        assert!(PIXEL_SCRIPT.starts_with("\n(function() {"));
        assert!(PIXEL_SCRIPT.contains("document.currentScript.getAttribute('data-offer-id')"));
        assert!(PIXEL_SCRIPT.contains("'&referrer=' + encodeURIComponent(document.referrer)"));
        assert!(PIXEL_SCRIPT.ends_with("})();\n"));
    }

    #[test]
    fn script_only_tracks_tagged_traffic() {
        assert!(PIXEL_SCRIPT.contains("'cpasibo_pro'"));
        assert!(PIXEL_SCRIPT.contains("'cpl'"));
        assert!(PIXEL_SCRIPT.contains("trackConversion"));
        assert!(PIXEL_SCRIPT.contains("/api/pixel"));
    }
}
