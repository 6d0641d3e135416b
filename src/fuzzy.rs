use std::collections::HashMap;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher as _;
use serde::{Deserialize, Serialize};

/// How a query is scored against a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Ordered subsequence match maximising runs of adjacent characters.
    #[default]
    Contiguity,
    /// Skim v2 scoring from `fuzzy-matcher`.
    Skim,
}

/// Options controlling a single match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    pub case_sensitive: bool,
    /// Accept every candidate unchanged with score `0`.
    pub skip: bool,
    pub pre: String,
    pub post: String,
    pub strategy: MatchStrategy,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            skip: false,
            pre: String::new(),
            post: String::new(),
            strategy: MatchStrategy::Contiguity,
        }
    }
}

/// A successful match of a query against one candidate string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// Candidate text with every matched character wrapped in `pre`/`post`.
    pub rendered: String,
    pub score: i64,
    /// Char indices of the matched characters, ascending.
    pub indices: Vec<usize>,
}

/// Scores candidates against queries.
///
/// Holds the skim matchers so they are built once per pipeline rather than
/// once per candidate.
pub struct Matcher {
    skim_ignore_case: SkimMatcherV2,
    skim_respect_case: SkimMatcherV2,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            skim_ignore_case: SkimMatcherV2::default().ignore_case(),
            skim_respect_case: SkimMatcherV2::default().respect_case(),
        }
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `query` against `candidate`. `None` means the candidate is excluded.
    pub fn matches(&self, query: &str, candidate: &str, opts: &MatchOptions) -> Option<FuzzyMatch> {
        if opts.skip {
            return Some(FuzzyMatch {
                rendered: candidate.to_string(),
                score: 0,
                indices: Vec::new(),
            });
        }
        match opts.strategy {
            MatchStrategy::Contiguity => fuzzy_match(query, candidate, opts),
            MatchStrategy::Skim => {
                if query.is_empty() {
                    return Some(FuzzyMatch {
                        rendered: candidate.to_string(),
                        score: 0,
                        indices: Vec::new(),
                    });
                }
                let matcher = if opts.case_sensitive {
                    &self.skim_respect_case
                } else {
                    &self.skim_ignore_case
                };
                let (score, indices) = matcher.fuzzy_indices(candidate, query)?;
                Some(FuzzyMatch {
                    rendered: render_highlighted(candidate, &indices, &opts.pre, &opts.post),
                    score,
                    indices,
                })
            }
        }
    }
}

/// Contiguity-scored subsequence match.
///
/// Every query character must appear in the candidate in order. Among all
/// placements the one with the highest [`contiguity_score`] wins; on equal
/// scores the earliest placement found is kept.
pub fn fuzzy_match(query: &str, candidate: &str, opts: &MatchOptions) -> Option<FuzzyMatch> {
    if opts.skip {
        return Some(FuzzyMatch {
            rendered: candidate.to_string(),
            score: 0,
            indices: Vec::new(),
        });
    }

    let fold = |c: char| {
        if opts.case_sensitive {
            c
        } else {
            c.to_lowercase().next().unwrap_or(c)
        }
    };
    let haystack: Vec<char> = candidate.chars().map(fold).collect();
    let pattern: Vec<char> = query.chars().map(fold).collect();

    let placement = Search::new(&haystack, &pattern).place()?;
    Some(FuzzyMatch {
        rendered: render_highlighted(candidate, &placement.indices, &opts.pre, &opts.post),
        score: placement.score,
        indices: placement.indices,
    })
}

struct Placement {
    score: i64,
    indices: Vec<usize>,
}

/// Best-placement search over `(hay_idx, pat_idx, run)` states, where `run`
/// is the length of the adjacent run ending just before `hay_idx`. The score
/// still to be earned depends on nothing else, so each state is solved once.
struct Search<'a> {
    haystack: &'a [char],
    pattern: &'a [char],
    memo: HashMap<(usize, usize, usize), Option<(i64, usize)>>,
}

impl<'a> Search<'a> {
    fn new(haystack: &'a [char], pattern: &'a [char]) -> Self {
        Self {
            haystack,
            pattern,
            memo: HashMap::new(),
        }
    }

    fn place(mut self) -> Option<Placement> {
        let mut indices = Vec::with_capacity(self.pattern.len());
        let (mut hay_idx, mut run) = (0, 0);
        for pat_idx in 0..self.pattern.len() {
            let (_, idx) = self.step(hay_idx, pat_idx, run)?;
            run = continued_run(run, idx, hay_idx);
            indices.push(idx);
            hay_idx = idx + 1;
        }
        Some(Placement {
            score: contiguity_score(&indices),
            indices,
        })
    }

    fn remaining(&mut self, hay_idx: usize, pat_idx: usize, run: usize) -> Option<i64> {
        if pat_idx == self.pattern.len() {
            return Some(0);
        }
        self.step(hay_idx, pat_idx, run).map(|(score, _)| score)
    }

    /// Best remaining score and the haystack index chosen for `pattern[pat_idx]`.
    fn step(&mut self, hay_idx: usize, pat_idx: usize, run: usize) -> Option<(i64, usize)> {
        let key = (hay_idx, pat_idx, run);
        if let Some(&known) = self.memo.get(&key) {
            return known;
        }
        let found = self.solve(hay_idx, pat_idx, run);
        self.memo.insert(key, found);
        found
    }

    fn solve(&mut self, hay_idx: usize, pat_idx: usize, run: usize) -> Option<(i64, usize)> {
        // remaining pattern cannot fit into remaining haystack
        if self.pattern.len() - pat_idx > self.haystack.len().saturating_sub(hay_idx) {
            return None;
        }

        let c = self.pattern[pat_idx];
        let mut best: Option<(i64, usize)> = None;
        let mut next = position_from(self.haystack, c, hay_idx);
        while let Some(idx) = next {
            let run_here = continued_run(run, idx, hay_idx);
            // a later placement of this character leaves even less room downstream
            let Some(rest) = self.remaining(idx + 1, pat_idx + 1, run_here) else {
                break;
            };
            let score = run_here as i64 + rest;
            // strict: the earliest placement keeps equal scores
            if best.map_or(true, |(b, _)| b < score) {
                best = Some((score, idx));
            }
            next = position_from(self.haystack, c, idx + 1);
        }
        best
    }
}

/// Run length after matching at `idx` when the previous match ended at `hay_idx - 1`.
fn continued_run(run: usize, idx: usize, hay_idx: usize) -> usize {
    if run > 0 && idx == hay_idx {
        run + 1
    } else {
        1
    }
}

fn position_from(haystack: &[char], c: char, from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&h| h == c)
        .map(|offset| from + offset)
}

/// Sum over matched characters of the length of the run of adjacent matches
/// ending at that character.
pub fn contiguity_score(indices: &[usize]) -> i64 {
    let mut score = 0;
    let mut run = 0;
    let mut prev: Option<usize> = None;
    for &idx in indices {
        run = match prev {
            Some(p) if p + 1 == idx => run + 1,
            _ => 1,
        };
        score += run;
        prev = Some(idx);
    }
    score
}

/// Wrap each char whose index appears in `indices` with `pre`/`post`.
pub fn render_highlighted(text: &str, indices: &[usize], pre: &str, post: &str) -> String {
    let mut out = String::with_capacity(text.len() + indices.len() * (pre.len() + post.len()));
    let mut marks = indices.iter().peekable();
    for (i, c) in text.chars().enumerate() {
        if marks.peek() == Some(&&i) {
            marks.next();
            out.push_str(pre);
            out.push(c);
            out.push_str(post);
        } else {
            out.push(c);
        }
    }
    out
}
