//! Token usage accounting.
//!
//! [`TokenUsage`] is a plain arithmetic value for one turn; [`UsageState`]
//! folds per-turn usage into session totals and keeps an ordered history.
//!
//! # Example
//!
//! ```rust
//! use turnstream::usage::{TokenUsage, UsageState};
//!
//! let mut state = UsageState::new(8192);
//! state.record(TokenUsage::new(120, 30));
//! state.record(TokenUsage::new(180, 45));
//! assert_eq!(state.cumulative().total_tokens(), 375);
//! assert_eq!(state.history().len(), 2);
//! ```

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Deserializer, Serialize};

/// Token counts for a single turn.
///
/// Fields are private so that `total_tokens` is the sum of the prompt and
/// completion counts by construction. Deserialization recomputes the total
/// rather than trusting the serialized value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

impl TokenUsage {
    /// Creates usage from prompt and completion counts.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    /// Creates usage from raw backend counters, treating absent counters as
    /// zero.
    pub fn from_counts(prompt: Option<u64>, completion: Option<u64>) -> Self {
        Self::new(prompt.unwrap_or(0), completion.unwrap_or(0))
    }

    /// Tokens consumed by the prompt.
    pub fn prompt_tokens(&self) -> u64 {
        self.prompt_tokens
    }

    /// Tokens produced by the completion.
    pub fn completion_tokens(&self) -> u64 {
        self.completion_tokens
    }

    /// Prompt plus completion tokens.
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// True when both counts are zero.
    pub fn is_zero(&self) -> bool {
        self.total_tokens == 0
    }
}

impl Add for TokenUsage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.prompt_tokens.saturating_add(rhs.prompt_tokens),
            self.completion_tokens.saturating_add(rhs.completion_tokens),
        )
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<'de> Deserialize<'de> for TokenUsage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            prompt_tokens: u64,
            #[serde(default)]
            completion_tokens: u64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Self::new(raw.prompt_tokens, raw.completion_tokens))
    }
}

/// Session-scoped usage accumulator.
///
/// Owned by the orchestration loop and updated exactly once per completed
/// turn. All operations are plain value arithmetic; no synchronization is
/// required for a single-owner state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageState {
    current: TokenUsage,
    cumulative: TokenUsage,
    context_limit: u64,
    history: Vec<TokenUsage>,
}

impl UsageState {
    /// Creates an empty accumulator with the given model context limit.
    pub fn new(context_limit: u64) -> Self {
        Self {
            current: TokenUsage::default(),
            cumulative: TokenUsage::default(),
            context_limit,
            history: Vec::new(),
        }
    }

    /// Folds one completed turn's usage into the session totals.
    pub fn record(&mut self, usage: TokenUsage) {
        self.current = usage;
        self.cumulative += usage;
        self.history.push(usage);
    }

    /// Usage of the most recently completed turn.
    pub fn current(&self) -> TokenUsage {
        self.current
    }

    /// Running sum over every recorded turn.
    pub fn cumulative(&self) -> TokenUsage {
        self.cumulative
    }

    /// Per-turn usage in recording order.
    pub fn history(&self) -> &[TokenUsage] {
        &self.history
    }

    /// The model's context limit this session was created with.
    pub fn context_limit(&self) -> u64 {
        self.context_limit
    }

    /// Fraction of the context window the last turn occupied, in `0.0..=1.0`.
    ///
    /// The last turn's total token count approximates the context fill, since
    /// the prompt carries the whole conversation.
    pub fn utilization(&self) -> f64 {
        if self.context_limit == 0 {
            return 0.0;
        }
        (self.current.total_tokens() as f64 / self.context_limit as f64).min(1.0)
    }

    /// True when utilization has crossed `threshold` (e.g. `0.8`).
    pub fn is_near_limit(&self, threshold: f64) -> bool {
        self.utilization() >= threshold
    }

    /// Clears all recorded usage, keeping the context limit.
    pub fn reset(&mut self) {
        self.current = TokenUsage::default();
        self.cumulative = TokenUsage::default();
        self.history.clear();
    }
}
