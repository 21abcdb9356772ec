use std::time::Duration;

/// Returns the next status polling interval based on how long the user has
/// been looking at the checkout view.
///
/// Payments usually clear within seconds of the user confirming in their
/// wallet, so polling starts fast and backs off for abandoned sessions.
pub fn poll_interval(waited: Duration) -> Duration {
    match waited {
        d if d < Duration::from_secs(30) => Duration::from_secs(2),
        d if d < Duration::from_secs(2 * 60) => Duration::from_secs(5),
        d if d < Duration::from_secs(10 * 60) => Duration::from_secs(10),
        _ => Duration::from_secs(30),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_interval_backs_off() {
        assert_eq!(poll_interval(Duration::ZERO), Duration::from_secs(2));
        assert_eq!(poll_interval(Duration::from_secs(29)), Duration::from_secs(2));
        assert_eq!(poll_interval(Duration::from_secs(30)), Duration::from_secs(5));
        assert_eq!(poll_interval(Duration::from_secs(119)), Duration::from_secs(5));
        assert_eq!(poll_interval(Duration::from_secs(120)), Duration::from_secs(10));
        assert_eq!(poll_interval(Duration::from_secs(600)), Duration::from_secs(30));
        assert_eq!(poll_interval(Duration::from_secs(86_400)), Duration::from_secs(30));
    }
}
