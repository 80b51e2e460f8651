use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How many recent picks are avoided when the pool allows it.
pub const RECENT_CAPACITY: usize = 3;

/// Words a message shown to a child must never contain.
const DISCOURAGING_WORDS: &[&str] = &["wrong", "bad", "fail", "failed", "stupid", "dumb", "loser"];

/// Longest message accepted from any source, in words.
pub const MAX_MESSAGE_WORDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    Welcome,
    Encouragement,
    Comfort,
    Celebration,
    Milestone,
}

impl MessageCategory {
    fn pool(&self) -> &'static [&'static str] {
        match self {
            MessageCategory::Welcome => &[
                "Welcome back, superstar! Let's play!",
                "Ready for a math adventure?",
                "Hello, math explorer! Let's go!",
                "Great to see you! Let's count together!",
                "Your adventure is waiting. Let's start!",
            ],
            MessageCategory::Encouragement => &[
                "Look at you go! Amazing!",
                "You're doing incredible!",
                "Keep going, you're doing great!",
                "Your brain is getting stronger!",
                "Wow, you are so smart!",
                "That's the way! Keep it up!",
            ],
            MessageCategory::Comfort => &[
                "It's okay! You'll get the next one!",
                "Mistakes help us learn! You've got this!",
                "Take a breath and try again!",
                "Almost! Let's try another one!",
                "Every try makes you better!",
            ],
            MessageCategory::Celebration => &[
                "You did it! Fantastic work!",
                "Amazing! You're a math superstar!",
                "Incredible! Level complete!",
                "Hooray! That was awesome!",
                "Super job! Time to celebrate!",
            ],
            MessageCategory::Milestone => &[
                "You're halfway there! Keep going!",
                "Look how far you've come!",
                "Halfway done! You're unstoppable!",
                "So close now! Keep it up!",
            ],
        }
    }
}

/// Bounded record of recently shown messages. Owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageHistory {
    recent: VecDeque<String>,
}

impl MessageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.recent.iter().any(|m| m == message)
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    fn push(mut self, message: &str) -> Self {
        self.recent.push_back(message.to_string());
        while self.recent.len() > RECENT_CAPACITY {
            self.recent.pop_front();
        }
        self
    }
}

/// Pick a message for `category`, skipping recent ones when the pool is large
/// enough. Returns the message and the history with it appended.
pub fn pick_message<R: Rng + ?Sized>(
    category: MessageCategory,
    history: &MessageHistory,
    rng: &mut R,
) -> (String, MessageHistory) {
    let pool = category.pool();
    let fresh: Vec<&str> = if pool.len() > RECENT_CAPACITY {
        pool.iter()
            .copied()
            .filter(|m| !history.contains(m))
            .collect()
    } else {
        pool.to_vec()
    };
    let candidates = if fresh.is_empty() { pool.to_vec() } else { fresh };

    let picked = candidates[rng.random_range(0..candidates.len())];
    (picked.to_string(), history.clone().push(picked))
}

/// True when `message` is short enough and free of discouraging vocabulary.
pub fn is_child_friendly(message: &str) -> bool {
    let words: Vec<String> = message
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    !words.is_empty()
        && words.len() <= MAX_MESSAGE_WORDS
        && !words.iter().any(|w| DISCOURAGING_WORDS.contains(&w.as_str()))
}
