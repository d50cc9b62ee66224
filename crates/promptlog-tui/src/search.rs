use promptlog_types::SearchResult;
use promptlog_util::Debouncer;
use regex::RegexBuilder;
use std::time::{Duration, Instant};

/// A query that survived the quiet period and should be sent now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    pub generation: u64,
    pub keyword: String,
}

/// State of the global search overlay.
///
/// Every keystroke bumps the generation, so a response is only applied when
/// it answers the latest input.
#[derive(Debug)]
pub struct SearchOverlay {
    input: String,
    debouncer: Debouncer<String>,
    generation: u64,
    in_flight: Option<u64>,
    results: Vec<SearchResult>,
    selected: usize,
}

impl SearchOverlay {
    pub fn new(quiet: Duration) -> Self {
        Self {
            input: String::new(),
            debouncer: Debouncer::new(quiet),
            generation: 0,
            in_flight: None,
            results: Vec::new(),
            selected: 0,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_result(&self) -> Option<&SearchResult> {
        self.results.get(self.selected)
    }

    pub fn is_searching(&self) -> bool {
        self.in_flight.is_some() || self.debouncer.is_pending()
    }

    pub fn set_keyword(&mut self, text: impl Into<String>, now: Instant) {
        self.input = text.into();
        self.generation += 1;
        let keyword = self.input.trim().to_string();
        if keyword.is_empty() {
            self.debouncer.cancel();
            self.in_flight = None;
            self.results.clear();
            self.selected = 0;
            return;
        }
        self.debouncer.schedule(keyword, now);
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        let mut next = self.input.clone();
        next.push(c);
        self.set_keyword(next, now);
    }

    pub fn backspace(&mut self, now: Instant) {
        let mut next = self.input.clone();
        next.pop();
        self.set_keyword(next, now);
    }

    /// Clears input, results and any pending or in-flight query.
    pub fn reset(&mut self) {
        self.input.clear();
        self.generation += 1;
        self.debouncer.cancel();
        self.in_flight = None;
        self.results.clear();
        self.selected = 0;
    }

    pub fn poll(&mut self, now: Instant) -> Option<PendingSearch> {
        let keyword = self.debouncer.poll(now)?;
        self.in_flight = Some(self.generation);
        Some(PendingSearch {
            generation: self.generation,
            keyword,
        })
    }

    /// Time until the pending query is due, for sizing the event-loop wait.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.debouncer.remaining(now)
    }

    /// Returns false when the response belongs to superseded input.
    pub fn apply_results(&mut self, generation: u64, results: Vec<SearchResult>) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping stale search results");
            return false;
        }
        self.in_flight = None;
        self.results = results;
        self.selected = 0;
        true
    }

    pub fn apply_failure(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.in_flight = None;
        self.results.clear();
        self.selected = 0;
        true
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.results.is_empty() {
            self.selected = 0;
            return;
        }
        let len = self.results.len() as isize;
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub text: String,
    pub matched: bool,
}

/// Splits `snippet` into spans, marking every case-insensitive occurrence of
/// the literal `keyword`.
pub fn highlight(snippet: &str, keyword: &str) -> Vec<HighlightSpan> {
    let keyword = keyword.trim();
    let plain = || {
        vec![HighlightSpan {
            text: snippet.to_string(),
            matched: false,
        }]
    };
    if keyword.is_empty() || snippet.is_empty() {
        return plain();
    }
    let Ok(pattern) = RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
    else {
        return plain();
    };

    let mut spans = Vec::new();
    let mut cursor = 0;
    for m in pattern.find_iter(snippet) {
        if m.start() > cursor {
            spans.push(HighlightSpan {
                text: snippet[cursor..m.start()].to_string(),
                matched: false,
            });
        }
        spans.push(HighlightSpan {
            text: m.as_str().to_string(),
            matched: true,
        });
        cursor = m.end();
    }
    if cursor < snippet.len() {
        spans.push(HighlightSpan {
            text: snippet[cursor..].to_string(),
            matched: false,
        });
    }
    spans
}
