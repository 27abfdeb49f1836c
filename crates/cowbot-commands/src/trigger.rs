//! Trigger words and the renderer variant each one selects.
//!
//! [`TRIGGERS`] is the only place that knows about individual variants:
//! adding a figure means adding an enum value and one table row.

use cowbot_render::RenderFlags;

/// A recognized trigger command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerCommand {
    /// The renderer's baseline figure.
    Default,
    Tux,
    Vader,
    Moose,
    Lion,
}

/// One row of the trigger table.
#[derive(Debug, Clone, Copy)]
pub struct TriggerSpec {
    pub command: TriggerCommand,
    /// Literal word typed after the marker (case-sensitive).
    pub word: &'static str,
    /// Renderer figure passed as `-f <variant>`; `None` keeps the default.
    pub variant: Option<&'static str>,
}

pub const TRIGGERS: &[TriggerSpec] = &[
    TriggerSpec {
        command: TriggerCommand::Default,
        word: "cowsay",
        variant: None,
    },
    TriggerSpec {
        command: TriggerCommand::Tux,
        word: "tuxsay",
        variant: Some("tux"),
    },
    TriggerSpec {
        command: TriggerCommand::Vader,
        word: "vadersay",
        variant: Some("vader"),
    },
    TriggerSpec {
        command: TriggerCommand::Moose,
        word: "moosesay",
        variant: Some("moose"),
    },
    TriggerSpec {
        command: TriggerCommand::Lion,
        word: "lionsay",
        variant: Some("moofasa"),
    },
];

/// Map a command to renderer flags. Total: a command without a table row
/// falls back to the default figure instead of failing.
pub fn resolve_flags(command: TriggerCommand) -> RenderFlags {
    flags_in(TRIGGERS, |spec| spec.command == command)
}

fn flags_in(table: &[TriggerSpec], pred: impl Fn(&TriggerSpec) -> bool) -> RenderFlags {
    match lookup(table, pred).and_then(|spec| spec.variant) {
        Some(variant) => RenderFlags::variant(variant),
        None => RenderFlags::none(),
    }
}

fn lookup(table: &[TriggerSpec], pred: impl Fn(&TriggerSpec) -> bool) -> Option<&TriggerSpec> {
    table.iter().find(|&spec| pred(spec))
}
