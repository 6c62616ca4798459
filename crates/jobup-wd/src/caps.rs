use serde_json::{Map, Value, json};

/// Headless contexts are more readily fingerprinted and blocked, so they get
/// a realistic desktop user-agent.
const HEADLESS_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36";

/// W3C capability map for a Chrome session with the stability flags the
/// portal run needs: no GPU, no notification prompts, no popup blocking.
pub fn chrome_capabilities(headless: bool) -> Map<String, Value> {
    let mut args = vec![
        "--disable-gpu".to_string(),
        "--disable-notifications".to_string(),
        "--disable-popup-blocking".to_string(),
        "--start-maximized".to_string(),
    ];
    if headless {
        args.extend([
            "--headless=new".to_string(),
            "--window-size=1920,1080".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--ignore-certificate-errors".to_string(),
            "--allow-running-insecure-content".to_string(),
            format!("--user-agent={HEADLESS_USER_AGENT}"),
        ]);
    }

    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(caps: &Map<String, Value>) -> Vec<String> {
        caps["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn visible_sessions_keep_the_default_user_agent() {
        let caps = chrome_capabilities(false);
        assert_eq!(caps["browserName"], "chrome");
        let args = args(&caps);
        assert!(args.contains(&"--disable-notifications".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
        assert!(!args.iter().any(|a| a.starts_with("--user-agent=")));
    }

    #[test]
    fn headless_sessions_are_hardened() {
        let caps = chrome_capabilities(true);
        let args = args(&caps);
        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
    }
}
