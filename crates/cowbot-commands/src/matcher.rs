//! Trigger command recognition.
//!
//! Syntax: `<marker><trigger-word><whitespace><payload>`, anchored at the start
//! of the message. The trigger word is the whole run of non-whitespace after
//! the marker and must equal a table entry exactly, so one trigger being a
//! prefix of another (or of an arbitrary word) never causes a false match.

use cowbot_core::config::COMMAND_MARKER;

use crate::trigger::{TriggerCommand, TriggerSpec, TRIGGERS};

/// A trigger command with its payload. The payload is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: TriggerCommand,
    pub payload: String,
}

/// Recognize a trigger command in raw message text.
///
/// Returns `None` for anything that is not a command; that is the normal case
/// for channel traffic, not an error.
pub fn parse_command(text: &str) -> Option<ParsedCommand> {
    parse_with(text, COMMAND_MARKER, TRIGGERS)
}

fn parse_with(text: &str, marker: char, table: &[TriggerSpec]) -> Option<ParsedCommand> {
    let rest = text.strip_prefix(marker)?;

    // No whitespace after the word means no payload.
    let word_end = rest.find(char::is_whitespace)?;
    let (word, tail) = rest.split_at(word_end);

    let spec = table.iter().find(|spec| spec.word == word)?;

    let payload = tail.trim();
    if payload.is_empty() {
        return None;
    }

    Some(ParsedCommand {
        command: spec.command,
        payload: payload.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(command: TriggerCommand, payload: &str) -> Option<ParsedCommand> {
        Some(ParsedCommand {
            command,
            payload: payload.to_string(),
        })
    }

    #[test]
    fn default_trigger_with_payload() {
        assert_eq!(
            parse_command("!cowsay hello world"),
            parsed(TriggerCommand::Default, "hello world")
        );
    }

    #[test]
    fn every_table_word_matches() {
        for spec in TRIGGERS {
            let text = format!("!{} moo", spec.word);
            assert_eq!(parse_command(&text), parsed(spec.command, "moo"), "{text}");
        }
    }

    #[test]
    fn payload_starts_after_first_whitespace_run() {
        assert_eq!(
            parse_command("!tuxsay \t  hi  there"),
            parsed(TriggerCommand::Tux, "hi  there")
        );
    }

    #[test]
    fn trailing_whitespace_and_newlines_are_ignored() {
        assert_eq!(
            parse_command("!vadersay join us\r\n"),
            parsed(TriggerCommand::Vader, "join us")
        );
        assert_eq!(
            parse_command("!moosesay moo   "),
            parsed(TriggerCommand::Moose, "moo")
        );
    }

    #[test]
    fn trigger_without_payload_is_not_a_match() {
        assert_eq!(parse_command("!cowsay"), None);
        assert_eq!(parse_command("!cowsay "), None);
        assert_eq!(parse_command("!cowsay \t \n"), None);
    }

    #[test]
    fn ordinary_chat_is_not_a_match() {
        assert_eq!(parse_command("hello everyone"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("!"), None);
        assert_eq!(parse_command("cowsay hi"), None);
    }

    #[test]
    fn match_is_anchored_at_start() {
        assert_eq!(parse_command(" !cowsay hi"), None);
        assert_eq!(parse_command("look: !cowsay hi"), None);
    }

    #[test]
    fn unknown_or_extended_words_do_not_match() {
        assert_eq!(parse_command("!cowsayx hi"), None);
        assert_eq!(parse_command("!cow hi"), None);
        assert_eq!(parse_command("!dragonsay hi"), None);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(parse_command("!CowSay hi"), None);
        assert_eq!(parse_command("!TUXSAY hi"), None);
    }

    #[test]
    fn wrong_marker_is_not_a_match() {
        assert_eq!(parse_command("/cowsay hi"), None);
        assert_eq!(parse_command("!!cowsay hi"), None);
    }

    #[test]
    fn nested_trigger_in_payload_is_plain_text() {
        assert_eq!(
            parse_command("!lionsay !cowsay moo"),
            parsed(TriggerCommand::Lion, "!cowsay moo")
        );
    }

    #[test]
    fn unicode_payload_is_preserved() {
        assert_eq!(
            parse_command("!cowsay ¡Hola, señor! 🐄"),
            parsed(TriggerCommand::Default, "¡Hola, señor! 🐄")
        );
    }

    #[test]
    fn custom_marker_and_table() {
        let table = [TriggerSpec {
            command: TriggerCommand::Moose,
            word: "elk",
            variant: Some("moose"),
        }];
        assert_eq!(
            parse_with("?elk hi", '?', &table),
            parsed(TriggerCommand::Moose, "hi")
        );
        assert_eq!(parse_with("!elk hi", '?', &table), None);
        assert_eq!(parse_with("?cowsay hi", '?', &table), None);
    }
}
