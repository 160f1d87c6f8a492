//! Synthetic pixel traffic for a storefront, for loading a realistic events
//! relation to report on.

use crate::config::SeedConfig;
use crate::store::Event;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use thiserror::Error;

const ACCOUNT_ID: &str = "GA4CT-1";
const HOSTNAME: &str = "https://www.example.com";

const EVENT_NAMES: &[&str] = &["page_view", "cta_click", "form_submission", "purchase"];

struct Page {
    path: &'static str,
    title: &'static str,
}

const PAGES: &[Page] = &[
    Page { path: "/", title: "Storefront | We Sell Products | Example" },
    Page { path: "/collection", title: "Product Collection | Example" },
    Page { path: "/product-a", title: "Product A | Example" },
    Page { path: "/product-b", title: "Product B | Example" },
    Page { path: "/product-c", title: "Product C | Example" },
    Page { path: "/cart", title: "Your Cart | Example" },
    Page { path: "/contact", title: "Contact Us | Example" },
    Page { path: "/checkout", title: "Checkout | Example" },
];

const PURCHASE_PAGE: Page = Page {
    path: "/order-confirmation",
    title: "Order Confirmation | Example",
};

const LEAD_FORM_PAGE: Page = Page {
    path: "/contact-thank-you",
    title: "Thank You For Contacting Us | Example",
};

struct Agent {
    user_agent: &'static str,
    screen_resolution: &'static str,
}

const AGENTS: &[Agent] = &[
    // Chrome, desktop, Windows
    Agent {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
        screen_resolution: "1920x1080",
    },
    // Chrome, Android, Pixel 7
    Agent {
        user_agent: "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Mobile Safari/537.36",
        screen_resolution: "412x915",
    },
    // Safari, iPad Pro
    Agent {
        user_agent: "Mozilla/5.0 (iPad; CPU OS 17_5_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1",
        screen_resolution: "1024x1366",
    },
    // Safari, iPhone
    Agent {
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1",
        screen_resolution: "390x844",
    },
];

/// Where a session came from: the referrer it arrives with and, for paid
/// traffic, the campaign query string on its landing page.
struct Channel {
    referrers: &'static [&'static str],
    queries: &'static [&'static str],
}

const CHANNELS: &[Channel] = &[
    // Direct
    Channel {
        referrers: &[""],
        queries: &[""],
    },
    // Organic search
    Channel {
        referrers: &[
            "https://www.google.com/",
            "https://www.bing.com/",
            "https://www.duckduckgo.com/",
        ],
        queries: &[""],
    },
    // Organic social
    Channel {
        referrers: &[
            "https://www.facebook.com/",
            "https://www.instagram.com/",
            "https://www.pinterest.com/",
            "https://www.reddit.com/",
            "https://www.youtube.com/",
        ],
        queries: &[""],
    },
    // Email
    Channel {
        referrers: &[
            "https://mail.google.com/",
            "https://outlook.live.com/",
            "https://mail.yahoo.com/",
        ],
        queries: &[""],
    },
    // Referral
    Channel {
        referrers: &[
            "https://www.referrer1.com/",
            "https://www.referrer2.com/",
            "https://www.referrer3.com/",
        ],
        queries: &[""],
    },
    // Paid search
    Channel {
        referrers: &["https://www.google.com/"],
        queries: &[
            "?utm_source=google&utm_medium=cpc&utm_campaign=PMax%20-%20All%20Products",
            "?utm_source=google&utm_medium=cpc&utm_campaign=Search%20-%20Brand",
            "?utm_source=google&utm_medium=cpc&utm_campaign=Search%20-%20Non-Brand",
        ],
    },
    // Paid social
    Channel {
        referrers: &["https://www.facebook.com/"],
        queries: &[
            "?utm_source=facebook&utm_medium=paid+social&utm_campaign=Prospecting%20-%20Video",
            "?utm_source=facebook&utm_medium=paid+social&utm_campaign=Remarketing%20-%20All%20Website%20Visitors",
        ],
    },
];

#[derive(Error, Debug, PartialEq)]
pub enum SeedError {
    #[error("At least one user is required")]
    NoUsers,

    #[error("Sessions per user and events per session must each be at least 1, got {sessions_per_user} and {events_per_session}")]
    TooFewPerUser {
        sessions_per_user: f64,
        events_per_session: f64,
    },

    #[error("Seed window is empty: {start} is not before {end}")]
    EmptyWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

struct User {
    client_id: String,
    last_session_start: DateTime<Utc>,
    agent: &'static Agent,
}

struct Session {
    session_id: String,
    start: DateTime<Utc>,
    user: usize,
}

/// Shape of the generated traffic.
#[derive(Debug, Clone, PartialEq)]
pub struct DummyData {
    users: usize,
    sessions_per_user: f64,
    events_per_session: f64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DummyData {
    pub fn new(
        users: usize,
        sessions_per_user: f64,
        events_per_session: f64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, SeedError> {
        if users == 0 {
            return Err(SeedError::NoUsers);
        }
        if !(sessions_per_user >= 1.0 && events_per_session >= 1.0) {
            return Err(SeedError::TooFewPerUser {
                sessions_per_user,
                events_per_session,
            });
        }
        if start >= end {
            return Err(SeedError::EmptyWindow { start, end });
        }

        Ok(Self {
            users,
            sessions_per_user,
            events_per_session,
            start,
            end,
        })
    }

    pub fn from_config(config: &SeedConfig) -> Result<Self, SeedError> {
        Self::new(
            config.users,
            config.sessions_per_user,
            config.events_per_session,
            config.start,
            config.end,
        )
    }

    pub fn session_count(&self) -> usize {
        ((self.users as f64 * self.sessions_per_user) as usize).max(self.users)
    }

    pub fn event_count(&self) -> usize {
        ((self.users as f64 * self.sessions_per_user * self.events_per_session) as usize)
            .max(self.session_count())
    }

    /// Generates [`DummyData::event_count`] events.
    ///
    /// The first event of every user and every session is its landing page
    /// view, emitted users first, then repeat sessions, then the remaining
    /// in-session events.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Event> {
        let mut events = Vec::with_capacity(self.event_count());
        let mut users = Vec::with_capacity(self.users);
        let mut sessions = Vec::with_capacity(self.session_count());

        for _ in 0..self.users {
            let timestamp = random_time_between(rng, self.start, self.end);
            users.push(User {
                client_id: format!("GA4CT.CID.{}", random_id(rng, timestamp)),
                last_session_start: timestamp,
                agent: pick(rng, AGENTS),
            });
            sessions.push(Session {
                session_id: format!("GA4CT.SID.{}", random_id(rng, timestamp)),
                start: timestamp,
                user: users.len() - 1,
            });
        }

        // Repeat sessions start one to 31 days after the user's latest session
        for _ in self.users..self.session_count() {
            let user = rng.gen_range(0..users.len());
            let latest = users[user].last_session_start;
            let timestamp = random_time_between(
                rng,
                latest + TimeDelta::days(1),
                latest + TimeDelta::days(31),
            );
            users[user].last_session_start = timestamp;
            sessions.push(Session {
                session_id: format!("GA4CT.SID.{}", random_id(rng, timestamp)),
                start: timestamp,
                user,
            });
        }

        for session in &sessions {
            events.push(landing_page_view(rng, session, &users[session.user]));
        }

        // In-session events stay within 30 minutes of the session start
        for _ in self.session_count()..self.event_count() {
            let session = pick(rng, &sessions);
            let user = &users[session.user];
            let timestamp = random_time_between(
                rng,
                session.start,
                session.start + TimeDelta::minutes(30),
            );
            let name = *pick(rng, EVENT_NAMES);

            let (page, value) = match name {
                "purchase" => (&PURCHASE_PAGE, (rng.gen::<f64>() * 300.0 * 100.0).trunc() / 100.0),
                "form_submission" => (&LEAD_FORM_PAGE, 0.0),
                _ => (pick(rng, PAGES), 0.0),
            };
            let referrer = pick(rng, PAGES);

            events.push(Event {
                account_id: ACCOUNT_ID.to_string(),
                client_id: user.client_id.clone(),
                session_id: session.session_id.clone(),
                name: name.to_string(),
                value,
                timestamp,
                page_location: format!("{}{}", HOSTNAME, page.path),
                page_title: page.title.to_string(),
                page_referrer: format!("{}{}", HOSTNAME, referrer.path),
                user_agent: user.agent.user_agent.to_string(),
                screen_resolution: user.agent.screen_resolution.to_string(),
            });
        }

        events
    }
}

fn landing_page_view<R: Rng + ?Sized>(rng: &mut R, session: &Session, user: &User) -> Event {
    let page = pick(rng, PAGES);
    let channel = pick(rng, CHANNELS);
    let referrer = *pick(rng, channel.referrers);
    let query = *pick(rng, channel.queries);

    Event {
        account_id: ACCOUNT_ID.to_string(),
        client_id: user.client_id.clone(),
        session_id: session.session_id.clone(),
        name: "page_view".to_string(),
        value: 0.0,
        timestamp: session.start,
        page_location: format!("{}{}{}", HOSTNAME, page.path, query),
        page_title: page.title.to_string(),
        page_referrer: referrer.to_string(),
        user_agent: user.agent.user_agent.to_string(),
        screen_resolution: user.agent.screen_resolution.to_string(),
    }
}

/// Uniform pick from a non-empty slice.
fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// Uniform instant in `[start, end)` at millisecond resolution.
fn random_time_between<R: Rng + ?Sized>(
    rng: &mut R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DateTime<Utc> {
    let span = (end - start).num_milliseconds();
    if span <= 0 {
        return start;
    }
    start + TimeDelta::milliseconds(rng.gen_range(0..span))
}

fn random_id<R: Rng + ?Sized>(rng: &mut R, timestamp: DateTime<Utc>) -> String {
    format!("{}.{}", rng.gen_range(0..=i32::MAX), timestamp.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::*;
    use std::collections::{HashMap, HashSet};

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            "2023-01-01T00:00:00Z".parse().unwrap(),
            "2023-12-31T23:59:59Z".parse().unwrap(),
        )
    }

    fn generate(users: usize, sessions_per_user: f64, events_per_session: f64) -> Vec<Event> {
        let (start, end) = window();
        DummyData::new(users, sessions_per_user, events_per_session, start, end)
            .unwrap()
            .generate(&mut StdRng::seed_from_u64(7))
    }

    #[rstest]
    #[case::defaults_scaled_down(40, 2.5, 5.5, 100, 550)]
    #[case::one_session_each(10, 1.0, 1.0, 10, 10)]
    #[case::fractional_totals(3, 1.5, 2.5, 4, 11)]
    fn test_counts(
        #[case] users: usize,
        #[case] sessions_per_user: f64,
        #[case] events_per_session: f64,
        #[case] sessions: usize,
        #[case] total: usize,
    ) {
        let events = generate(users, sessions_per_user, events_per_session);

        assert_eq!(events.len(), total);
        let clients: HashSet<_> = events.iter().map(|e| e.client_id.as_str()).collect();
        assert_eq!(clients.len(), users);
        let session_ids: HashSet<_> = events.iter().map(|e| e.session_id.as_str()).collect();
        assert_eq!(session_ids.len(), sessions);
    }

    #[test]
    fn every_session_opens_with_a_landing_page_view() {
        let events = generate(20, 2.5, 5.5);
        let sessions = 50;

        for landing in &events[..sessions] {
            assert_eq!(landing.name, "page_view");
            assert_eq!(landing.value, 0.0);
            assert!(landing.page_location.starts_with(HOSTNAME));
            assert!(!landing.page_referrer.starts_with(HOSTNAME));
        }
        let (start, end) = window();
        assert!(events[..20].iter().all(|e| e.timestamp >= start && e.timestamp < end));
    }

    #[test]
    fn repeat_sessions_follow_the_previous_one() {
        let events = generate(5, 4.0, 1.0);

        let mut by_client: HashMap<&str, Vec<DateTime<Utc>>> = HashMap::new();
        for event in &events {
            by_client
                .entry(event.client_id.as_str())
                .or_default()
                .push(event.timestamp);
        }
        for starts in by_client.values() {
            for pair in starts.windows(2) {
                assert!(pair[1] >= pair[0] + TimeDelta::days(1));
                assert!(pair[1] < pair[0] + TimeDelta::days(31));
            }
        }
    }

    #[test]
    fn in_session_events_stay_near_the_session_start() {
        let events = generate(30, 2.0, 6.0);
        let starts: HashMap<&str, DateTime<Utc>> = events[..60]
            .iter()
            .map(|e| (e.session_id.as_str(), e.timestamp))
            .collect();

        for event in &events[60..] {
            let start = starts[event.session_id.as_str()];
            assert!(event.timestamp >= start);
            assert!(event.timestamp < start + TimeDelta::minutes(30));
            assert!(event.page_referrer.starts_with(HOSTNAME));
            assert!(event.validate().is_ok());

            match event.name.as_str() {
                "purchase" => {
                    assert!(event.page_location.ends_with("/order-confirmation"));
                    assert!((0.0..300.0).contains(&event.value));
                    assert_eq!((event.value * 100.0).round() / 100.0, event.value);
                }
                "form_submission" => {
                    assert!(event.page_location.ends_with("/contact-thank-you"));
                    assert_eq!(event.value, 0.0);
                }
                _ => assert_eq!(event.value, 0.0),
            }
        }
    }

    #[test]
    fn same_seed_same_events() {
        assert_eq!(generate(8, 2.0, 3.0), generate(8, 2.0, 3.0));
    }

    #[test]
    fn rejects_unusable_shapes() {
        let (start, end) = window();
        assert_eq!(DummyData::new(0, 2.5, 5.5, start, end), Err(SeedError::NoUsers));
        assert!(matches!(
            DummyData::new(10, 0.5, 5.5, start, end),
            Err(SeedError::TooFewPerUser { .. })
        ));
        assert!(matches!(
            DummyData::new(10, 2.5, f64::NAN, start, end),
            Err(SeedError::TooFewPerUser { .. })
        ));
        assert_eq!(
            DummyData::new(10, 2.5, 5.5, end, start),
            Err(SeedError::EmptyWindow { start: end, end: start })
        );
    }
}
