//! Console with a few static commands for the shell tests.

use console_core::{CacheSlot, CommandCache, Console, ConsoleOptions, EmptyDirectory, TypeUniverse};
use console_macros::console_commands;

pub struct Demo;

#[console_commands]
impl Demo {
    #[command]
    pub fn echo(text: &str) -> String {
        text.to_string()
    }

    #[command]
    pub fn add(a: i32, b: i32) -> i32 {
        a + b
    }

    #[command]
    pub fn restart() {}

    #[command(get)]
    pub fn version() -> String {
        "1.0".to_string()
    }
}

pub fn demo_console<R>(f: impl FnOnce(&Console<'_>) -> R) -> R {
    let universe = TypeUniverse::new().register(Demo::console_methods);
    let slot = CacheSlot::new(CommandCache::build(false, &universe));
    let directory = EmptyDirectory;
    let console = Console::new(&slot, &directory, ConsoleOptions::default());
    f(&console)
}
