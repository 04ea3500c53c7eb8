//! `!help`: the command list, paged to fit chat's message limit.

use async_trait::async_trait;
use duelbot_core::error::DomainError;

use crate::router::{CommandHandler, Invocation};
use crate::state::BotState;

/// Longest message chat accepts, in characters.
pub const MESSAGE_LIMIT: usize = 400;

const SEPARATOR: &str = " | ";

/// Packs `entries` into pages of at most `limit` characters, joined by
/// `" | "`. An entry longer than `limit` is split across pages.
#[must_use]
pub fn paginate(entries: &[String], limit: usize) -> Vec<String> {
    let mut pages = Vec::new();
    let mut page = String::new();

    for entry in entries {
        let needed = if page.is_empty() {
            entry.chars().count()
        } else {
            page.chars().count() + SEPARATOR.len() + entry.chars().count()
        };
        if needed <= limit {
            if !page.is_empty() {
                page.push_str(SEPARATOR);
            }
            page.push_str(entry);
            continue;
        }

        if !page.is_empty() {
            pages.push(std::mem::take(&mut page));
        }
        let chars: Vec<char> = entry.chars().collect();
        let mut chunks = chars.chunks(limit.max(1)).peekable();
        while let Some(chunk) = chunks.next() {
            let piece: String = chunk.iter().collect();
            if chunks.peek().is_some() {
                pages.push(piece);
            } else {
                page = piece;
            }
        }
    }

    if !page.is_empty() {
        pages.push(page);
    }
    pages
}

/// `!help`
#[derive(Debug)]
pub struct Help;

#[async_trait]
impl CommandHandler for Help {
    async fn handle(
        &self,
        _state: &BotState,
        invocation: &Invocation<'_>,
    ) -> Result<Vec<String>, DomainError> {
        let entries: Vec<String> = invocation
            .commands
            .iter()
            .map(|command| format!("{}: {}", command.name, command.description))
            .collect();
        Ok(paginate(&entries, MESSAGE_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize, width: usize) -> Vec<String> {
        (0..n).map(|i| format!("{i:0>width$}")).collect()
    }

    #[test]
    fn test_short_list_fits_one_page() {
        let pages = paginate(&["!a: one".to_owned(), "!b: two".to_owned()], MESSAGE_LIMIT);
        assert_eq!(pages, vec!["!a: one | !b: two".to_owned()]);
    }

    #[test]
    fn test_pages_never_exceed_limit() {
        let pages = paginate(&entries(40, 37), MESSAGE_LIMIT);

        assert!(pages.len() > 1);
        assert!(pages.iter().all(|p| p.chars().count() <= MESSAGE_LIMIT));
        let rejoined: usize = pages.iter().map(|p| p.split(SEPARATOR).count()).sum();
        assert_eq!(rejoined, 40);
    }

    #[test]
    fn test_oversized_entry_is_split() {
        let pages = paginate(&["x".repeat(950)], MESSAGE_LIMIT);

        assert_eq!(
            pages.iter().map(String::len).collect::<Vec<_>>(),
            vec![400, 400, 150]
        );
    }

    #[test]
    fn test_no_entries_no_pages() {
        assert!(paginate(&[], MESSAGE_LIMIT).is_empty());
    }
}
