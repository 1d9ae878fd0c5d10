use http_client::Request;
use sha1::{Digest, Sha1};

/// Common Chrome user agent string for all requests
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

/// Common Chrome headers for security info
const SEC_CH_UA: &str =
    "\"Not)A;Brand\";v=\"8\", \"Chromium\";v=\"138\", \"Google Chrome\";v=\"138\"";
const SEC_CH_UA_MOBILE: &str = "?0";
const SEC_CH_UA_PLATFORM: &str = "\"Linux\"";

/// Add common browser headers to a request
pub fn add_common_headers(request: &mut Request) {
    let _ = request.insert_header("User-Agent", USER_AGENT);
    let _ = request.insert_header("Accept-Language", "en-US,en;q=0.9");
    let _ = request.insert_header("DNT", "1");
    let _ = request.insert_header("Connection", "keep-alive");
    let _ = request.insert_header("sec-ch-ua", SEC_CH_UA);
    let _ = request.insert_header("sec-ch-ua-mobile", SEC_CH_UA_MOBILE);
    let _ = request.insert_header("sec-ch-ua-platform", SEC_CH_UA_PLATFORM);
}

/// Add headers for a top-level page navigation
pub fn add_page_headers(request: &mut Request) {
    add_common_headers(request);
    let _ = request.insert_header(
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    );
    let _ = request.insert_header("Upgrade-Insecure-Requests", "1");
    let _ = request.insert_header("Sec-Fetch-Dest", "document");
    let _ = request.insert_header("Sec-Fetch-Mode", "navigate");
}

/// Add headers for same-origin AJAX calls made by the page's own scripts
pub fn add_ajax_headers(request: &mut Request) {
    add_common_headers(request);
    let _ = request.insert_header("Accept", "*/*");
    let _ = request.insert_header("Sec-Fetch-Dest", "empty");
    let _ = request.insert_header("Sec-Fetch-Mode", "cors");
    let _ = request.insert_header("Sec-Fetch-Site", "same-origin");
}

/// Add caller-supplied headers, overriding anything already set
pub fn add_extra_headers(request: &mut Request, headers: &[(String, String)]) {
    for (name, value) in headers {
        let _ = request.insert_header(name.as_str(), value.as_str());
    }
}

/// Add cookies to a request if they exist
pub fn add_cookies(request: &mut Request, cookie_header: &str) {
    if !cookie_header.is_empty() {
        let _ = request.insert_header("Cookie", cookie_header);
    }
}

/// `SAPISIDHASH` authorization value for `origin` at unix time `timestamp`.
pub fn sapisid_hash(timestamp: i64, sapisid: &str, origin: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("{timestamp} {sapisid} {origin}").as_bytes());
    format!("SAPISIDHASH {timestamp}_{:x}", hasher.finalize())
}
