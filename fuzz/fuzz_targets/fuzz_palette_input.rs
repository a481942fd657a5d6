#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lectern_core::{PaletteCommand, StatePatch};
use lectern_palette::{Command, CommandPalette, Invocation};

#[derive(Debug, Arbitrary)]
enum Step {
    Open(String),
    Key(u8),
    Query(String),
    Move(i8),
    Prompt(String),
    Close,
}

const COMMANDS: [PaletteCommand; 6] = [
    PaletteCommand::Next,
    PaletteCommand::Previous,
    PaletteCommand::Activate,
    PaletteCommand::Deeper,
    PaletteCommand::Back,
    PaletteCommand::Cancel,
];

fuzz_target!(|steps: Vec<Step>| {
    let mut palette = CommandPalette::new();
    palette.add_command(Command::new("Refresh", "", |_| Invocation::Refresh));
    palette.add_command(Command::new("Close", "", |_| Invocation::Close));
    palette.add_command(Command::new("Retype", "", |s| {
        Invocation::SetQuery(format!("{}x", s.query()))
    }));

    for step in steps.into_iter().take(256) {
        match step {
            Step::Open(query) => palette.open(StatePatch::new().query(query)),
            Step::Key(k) => {
                palette.handle_command(COMMANDS[usize::from(k) % COMMANDS.len()]);
            }
            Step::Query(text) => palette.set_value(text, false),
            Step::Move(delta) => palette.move_selection(isize::from(delta)),
            Step::Prompt(text) => {
                let _ = palette.prompt(&text);
            }
            Step::Close => palette.close(),
        }
        if let Some(i) = palette.selected_index() {
            assert!(i < palette.results().len());
        }
        assert_eq!(palette.is_open(), palette.depth() > 0);
    }
});
