//! Browser-like request headers.
//!
//! Relays forward most request headers to the source site, which serves a
//! bot-check page to clients without a desktop browser signature.

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

const CHROME_VERSIONS: &[&str] = &["131.0.6778.86", "132.0.6834.83", "133.0.6943.54"];
const FIREFOX_VERSIONS: &[&str] = &["133.0", "134.0", "135.0"];

const DOCUMENT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Desktop platforms the profiles claim to run on.
#[derive(Debug, Clone, Copy)]
pub enum Platform {
    Windows,
    MacOS,
    Linux,
}

impl Platform {
    fn random() -> Self {
        let roll: f32 = rand::thread_rng().gen();
        if roll < 0.7 {
            Platform::Windows
        } else if roll < 0.9 {
            Platform::MacOS
        } else {
            Platform::Linux
        }
    }

    fn os_string(self) -> &'static str {
        match self {
            Platform::Windows => "Windows NT 10.0; Win64; x64",
            Platform::MacOS => "Macintosh; Intel Mac OS X 10_15_7",
            Platform::Linux => "X11; Linux x86_64",
        }
    }
}

/// Header set sent with every page request.
#[derive(Debug, Clone)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

/// Chrome on a random desktop platform.
#[must_use]
pub fn chrome_profile() -> BrowserProfile {
    let version = CHROME_VERSIONS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("133.0.6943.54");

    BrowserProfile {
        user_agent: format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{version} Safari/537.36",
            Platform::random().os_string()
        ),
        accept: DOCUMENT_ACCEPT.to_string(),
        accept_language: "en-US,en;q=0.5".to_string(),
    }
}

/// Firefox on a random desktop platform.
#[must_use]
pub fn firefox_profile() -> BrowserProfile {
    let version = FIREFOX_VERSIONS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("135.0");

    BrowserProfile {
        user_agent: format!(
            "Mozilla/5.0 ({}; rv:{version}) Gecko/20100101 Firefox/{version}",
            Platform::random().os_string()
        ),
        accept: DOCUMENT_ACCEPT.to_string(),
        accept_language: "en-US,en;q=0.5".to_string(),
    }
}

/// Chrome most of the time, Firefox otherwise.
#[must_use]
pub fn random_profile() -> BrowserProfile {
    let roll: f32 = rand::thread_rng().gen();
    if roll < 0.8 {
        chrome_profile()
    } else {
        firefox_profile()
    }
}

impl BrowserProfile {
    /// Convert profile to reqwest `HeaderMap`. Values that are not valid
    /// header text are left out.
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        for (name, value) in [
            (USER_AGENT, &self.user_agent),
            (ACCEPT, &self.accept),
            (ACCEPT_LANGUAGE, &self.accept_language),
        ] {
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.insert(name, value);
            }
        }

        headers
    }
}
