//! Fixed upstream locations
//!
//! Relative links from the content API are resolved against these origins.

use url::Url;

/// Origin that entry URLs are relative to
pub const SITE_ORIGIN: &str = "https://www.rockstargames.com";

/// Origin for root-relative media sources inside article bodies
pub const MEDIA_ORIGIN: &str = "https://media-rockstargames-com.akamaized.net";

/// Public listing page; also the page the browser visits to observe a token
pub const NEWSWIRE_URL: &str = "https://www.rockstargames.com/newswire";

/// Content API endpoint
pub const GRAPH_URL: &str = "https://graph.rockstargames.com";

pub const ICON_URL: &str = "https://img.icons8.com/color/48/000000/rockstar-games.png";

pub const PUBLISHER: &str = "Rockstar Games";

/// Resolve a site-relative path (e.g. `/newswire/article/42`) to an absolute URL
pub fn resolve_site_url(path: &str) -> String {
    Url::parse(SITE_ORIGIN)
        .and_then(|base| base.join(path))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| format!("{}{}", SITE_ORIGIN, path))
}

/// Resolve an image source; only root-relative sources are rewritten
pub fn resolve_media_src(src: &str) -> String {
    if src.starts_with('/') {
        format!("{}{}", MEDIA_ORIGIN, src)
    } else {
        src.to_string()
    }
}
