use chrono::{DateTime, NaiveDateTime, Utc};

const NETSCAPE_HEADER: &str = "# Netscape HTTP Cookie File";
const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// A single browser cookie as stored in a Netscape `cookies.txt` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Unix expiry time; `0` marks a session cookie.
    pub expires: i64,
    pub name: String,
    pub value: String,
    pub http_only: bool,
}

impl Cookie {
    /// Whether this cookie should be sent to `host`.
    pub fn matches_host(&self, host: &str) -> bool {
        let domain = self.domain.trim_start_matches('.');
        host == domain || host.ends_with(&format!(".{domain}"))
    }

    fn is_expired(&self, now: i64) -> bool {
        self.expires != 0 && self.expires < now
    }

    fn same_slot(&self, other: &Cookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }

    fn parse_netscape_line(line: &str) -> Option<Cookie> {
        let (line, http_only) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(stripped) => (stripped, true),
            None => (line, false),
        };
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 7 {
            return None;
        }
        Some(Cookie {
            domain: parts[0].to_string(),
            include_subdomains: parts[1].eq_ignore_ascii_case("TRUE"),
            path: parts[2].to_string(),
            secure: parts[3].eq_ignore_ascii_case("TRUE"),
            expires: parts[4].parse().ok()?,
            name: parts[5].to_string(),
            value: parts[6].to_string(),
            http_only,
        })
    }

    fn to_netscape_line(&self) -> String {
        let flag = |b: bool| if b { "TRUE" } else { "FALSE" };
        format!(
            "{}{}\t{}\t{}\t{}\t{}\t{}\t{}",
            if self.http_only { HTTP_ONLY_PREFIX } else { "" },
            self.domain,
            flag(self.include_subdomains),
            self.path,
            flag(self.secure),
            self.expires,
            self.name,
            self.value
        )
    }

    /// Parse a `Set-Cookie` header received from `host`.
    pub fn from_set_cookie(header: &str, host: &str, now: DateTime<Utc>) -> Option<Cookie> {
        let mut attributes = header.split(';').map(str::trim);
        let (name, value) = attributes.next()?.split_once('=')?;
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie {
            domain: host.to_string(),
            include_subdomains: false,
            path: "/".to_string(),
            secure: false,
            expires: 0,
            name: name.to_string(),
            value: value.to_string(),
            http_only: false,
        };
        let mut max_age = None;

        for attribute in attributes {
            let (key, val) = attribute.split_once('=').unwrap_or((attribute, ""));
            match key.to_ascii_lowercase().as_str() {
                "domain" if !val.is_empty() => {
                    let domain = val.trim_start_matches('.');
                    cookie.domain = format!(".{domain}");
                    cookie.include_subdomains = true;
                }
                "path" if !val.is_empty() => cookie.path = val.to_string(),
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                "max-age" => max_age = val.parse::<i64>().ok(),
                "expires" => {
                    if let Some(when) = parse_expires(val) {
                        cookie.expires = when;
                    }
                }
                _ => {}
            }
        }

        // Max-Age wins over Expires; a non-positive value deletes the cookie
        if let Some(seconds) = max_age {
            cookie.expires = if seconds <= 0 {
                1
            } else {
                now.timestamp() + seconds
            };
        }
        Some(cookie)
    }
}

/// Unix time of an `Expires` attribute, in RFC 2822 form or the dashed
/// `Wed, 21-Oct-2015 07:28:00 GMT` form.
fn parse_expires(value: &str) -> Option<i64> {
    if let Ok(when) = DateTime::parse_from_rfc2822(value) {
        return Some(when.timestamp());
    }
    NaiveDateTime::parse_from_str(value, "%a, %d-%b-%Y %H:%M:%S GMT")
        .ok()
        .map(|when| when.and_utc().timestamp())
}

/// Browser-compatible cookie jar owned by a client session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a Netscape `cookies.txt` document.
    ///
    /// Malformed lines are skipped, so a corrupt file degrades to whatever
    /// could be read (possibly nothing).
    pub fn from_netscape(content: &str) -> Self {
        let mut jar = CookieJar::new();
        let mut skipped = 0usize;

        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty()
                || (line.starts_with('#') && !line.starts_with(HTTP_ONLY_PREFIX))
            {
                continue;
            }
            match Cookie::parse_netscape_line(line) {
                Some(cookie) => jar.insert(cookie),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            log::debug!("Skipped {skipped} unparseable cookie lines");
        }
        jar
    }

    /// Serialize to the Netscape `cookies.txt` format.
    pub fn to_netscape(&self) -> String {
        let mut out = String::from(NETSCAPE_HEADER);
        out.push_str("\n\n");
        for cookie in &self.cookies {
            out.push_str(&cookie.to_netscape_line());
            out.push('\n');
        }
        out
    }

    /// Insert a cookie, replacing one with the same name, domain and path.
    pub fn insert(&mut self, cookie: Cookie) {
        self.cookies.retain(|existing| !existing.same_slot(&cookie));
        self.cookies.push(cookie);
    }

    /// Merge the `Set-Cookie` headers of a response from `host`.
    pub fn store_set_cookies<'a>(&mut self, headers: impl IntoIterator<Item = &'a str>, host: &str) {
        let now = Utc::now();
        let mut stored = 0usize;
        for header in headers {
            if let Some(cookie) = Cookie::from_set_cookie(header, host, now) {
                log::trace!("Storing cookie {} for {}", cookie.name, cookie.domain);
                self.insert(cookie);
                stored += 1;
            }
        }
        if stored > 0 {
            let now = now.timestamp();
            self.cookies.retain(|cookie| !cookie.is_expired(now));
            log::trace!("Stored {stored} cookies, jar now holds {}", self.cookies.len());
        }
    }

    /// `Cookie` header value for a request to `host`.
    pub fn header_for(&self, host: &str) -> String {
        let now = Utc::now().timestamp();
        self.cookies
            .iter()
            .filter(|cookie| cookie.matches_host(host) && !cookie.is_expired(now))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Value of the first cookie called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|cookie| cookie.name == name)
            .map(|cookie| cookie.value.as_str())
    }

    /// Value of the first of `names` present in the jar, in the given order.
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.get(name))
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }
}
