// Copyright 2025 Exprvm Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Compiled LIKE patterns
//!
//! SQL LIKE patterns are compiled once at program build time. Simple pattern
//! shapes use direct string operations instead of a regex:
//!
//! - **Exact**: `'hello'` - string equality
//! - **Prefix**: `'hello%'` - starts_with check
//! - **Suffix**: `'%hello'` - ends_with check
//! - **Contains**: `'%hello%'` - contains check
//! - **Complex**: `'h_llo%'` - compiled regex

use regex::Regex;

use crate::core::{Error, Result};

/// Compiled pattern types for fast matching
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    /// Exact match: `'hello'`
    Exact(String),
    /// Prefix match: `'hello%'`
    Prefix(String),
    /// Suffix match: `'%hello'`
    Suffix(String),
    /// Contains match: `'%hello%'`
    Contains(String),
    /// Prefix + suffix: `'hello%world'`
    PrefixSuffix(String, String),
    /// Complex pattern requiring a regex
    Regex(Regex),
    /// Match anything: `'%'`
    MatchAll,
    /// Match any single char: `'_'`
    SingleChar,
}

impl CompiledPattern {
    /// Compile a SQL LIKE pattern
    pub fn compile(pattern: &str) -> Result<CompiledPattern> {
        match pattern {
            "%" => return Ok(CompiledPattern::MatchAll),
            "_" => return Ok(CompiledPattern::SingleChar),
            _ => {}
        }

        if !pattern.contains('_') {
            let percents = pattern.matches('%').count();
            let starts = pattern.starts_with('%');
            let ends = pattern.ends_with('%');

            match (percents, starts, ends) {
                (0, _, _) => return Ok(CompiledPattern::Exact(pattern.to_string())),
                (1, false, true) => {
                    return Ok(CompiledPattern::Prefix(
                        pattern[..pattern.len() - 1].to_string(),
                    ));
                }
                (1, true, false) => {
                    return Ok(CompiledPattern::Suffix(pattern[1..].to_string()));
                }
                (2, true, true) => {
                    return Ok(CompiledPattern::Contains(
                        pattern[1..pattern.len() - 1].to_string(),
                    ));
                }
                (1, false, false) => {
                    let sep = pattern.find('%').unwrap();
                    return Ok(CompiledPattern::PrefixSuffix(
                        pattern[..sep].to_string(),
                        pattern[sep + 1..].to_string(),
                    ));
                }
                _ => {}
            }
        }

        let regex = Regex::new(&like_to_regex(pattern))
            .map_err(|e| Error::InvalidPattern(e.to_string()))?;
        Ok(CompiledPattern::Regex(regex))
    }

    /// Match the pattern against a string
    #[inline]
    pub fn matches(&self, text: &str) -> bool {
        match self {
            CompiledPattern::MatchAll => true,
            CompiledPattern::SingleChar => text.chars().count() == 1,
            CompiledPattern::Exact(s) => text == s,
            CompiledPattern::Prefix(p) => text.starts_with(p),
            CompiledPattern::Suffix(s) => text.ends_with(s),
            CompiledPattern::Contains(c) => text.contains(c),
            CompiledPattern::PrefixSuffix(p, s) => {
                text.starts_with(p) && text.ends_with(s) && text.len() >= p.len() + s.len()
            }
            CompiledPattern::Regex(re) => re.is_match(text),
        }
    }
}

/// Translate a SQL LIKE pattern into an anchored regex
fn like_to_regex(pattern: &str) -> String {
    let mut re = String::with_capacity(pattern.len() + 4);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    re
}
