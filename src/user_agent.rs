//! Browser User-Agent pool used to rotate client identity per request.

use rand::seq::SliceRandom;

/// Browser signatures rotated across product API requests.
pub const BROWSER_USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 18_0 like Mac OS X) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/18.0 Mobile/15E148 Safari/604.1",
];

/// Picks one signature uniformly at random. No affinity between calls.
#[must_use]
pub fn random_browser_user_agent() -> &'static str {
    BROWSER_USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(BROWSER_USER_AGENTS[0])
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_random_user_agent_is_from_pool() {
        for _ in 0..50 {
            let ua = random_browser_user_agent();
            assert!(BROWSER_USER_AGENTS.contains(&ua), "unexpected UA: {ua}");
        }
    }

    #[test]
    fn test_random_user_agent_rotates() {
        // 200 draws from 3 options; the chance of seeing a single value is ~3^-199.
        let seen: HashSet<&str> = (0..200).map(|_| random_browser_user_agent()).collect();
        assert!(seen.len() > 1, "user agent never rotated");
    }

    #[test]
    fn test_pool_entries_look_like_browsers() {
        for ua in BROWSER_USER_AGENTS {
            assert!(ua.starts_with("Mozilla/5.0"), "{ua}");
            assert!(!ua.contains("  "), "line continuation left double space: {ua}");
        }
    }
}
