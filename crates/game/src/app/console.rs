use std::io::{self, Write};

use quest_engine::host::AnimationFn;
use quest_engine::{
    AnimationCue, AnimationTable, Completion, CraftingMenu, MapLayer, MapSurface, MessageBox,
    Submission, SubmissionMenu, SubmissionRequest, TargetType, WorldContent,
};
use tracing::debug;

pub(crate) type LineSource = Box<dyn FnMut() -> Option<String>>;

/// Next line of stdin, `None` at end of input.
pub(crate) fn read_stdin_line() -> Option<String> {
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

fn prompt(text: &str) {
    print!("{text}");
    let _ = io::stdout().flush();
}

pub(crate) struct ConsoleMessages;

impl MessageBox for ConsoleMessages {
    fn open(&mut self, text: String, on_complete: Completion<()>) {
        println!("  \"{text}\"");
        on_complete.done();
    }
}

pub(crate) struct ConsoleMenu {
    read_line: LineSource,
}

impl ConsoleMenu {
    pub(crate) fn new(read_line: LineSource) -> Self {
        Self { read_line }
    }
}

impl SubmissionMenu for ConsoleMenu {
    fn open(&mut self, request: SubmissionRequest, on_complete: Completion<Submission>) {
        println!("  {} vs {}", request.caster_name, request.enemy_name);
        for (index, choice) in request.actions.iter().enumerate() {
            println!("    {}) {}  {}", index + 1, choice.name, choice.description);
        }
        println!("    f) flee");
        prompt("  choose> ");

        // End of input drops the completion; the battle treats that as fleeing.
        if let Some(line) = (self.read_line)() {
            on_complete.complete(parse_menu_choice(&line, &request));
        }
    }
}

pub(crate) struct ConsoleCrafting {
    read_line: LineSource,
}

impl ConsoleCrafting {
    pub(crate) fn new(read_line: LineSource) -> Self {
        Self { read_line }
    }
}

impl CraftingMenu for ConsoleCrafting {
    fn open(&mut self, pizzas: Vec<String>, on_complete: Completion<Option<String>>) {
        for (index, pizza) in pizzas.iter().enumerate() {
            println!("    {}) {pizza}", index + 1);
        }
        println!("    anything else) leave");
        prompt("  craft> ");

        let choice = (self.read_line)().and_then(|line| parse_crafting_choice(&line, &pizzas));
        on_complete.complete(choice);
    }
}

pub(crate) fn parse_crafting_choice(line: &str, pizzas: &[String]) -> Option<String> {
    let index = line.trim().parse::<usize>().ok()?.checked_sub(1)?;
    pizzas.get(index).cloned()
}

/// Content animations with no registered function; they resolve at once.
pub(crate) fn unregistered_animations<'a>(
    table: &AnimationTable,
    content: &'a WorldContent,
) -> Vec<&'a str> {
    content
        .animation_names()
        .into_iter()
        .filter(|name| !table.contains(name))
        .collect()
}

/// Unrecognised input is passed through as an action name so the battle
/// rejects it and asks again.
pub(crate) fn parse_menu_choice(line: &str, request: &SubmissionRequest) -> Submission {
    let line = line.trim();
    if line.eq_ignore_ascii_case("f") || line.eq_ignore_ascii_case("flee") {
        return Submission::Flee;
    }
    let choice = line
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| request.actions.get(index));
    match choice {
        Some(choice) => Submission::Use {
            action: choice.key.clone(),
            target: match choice.target_type {
                TargetType::Friendly => request.caster,
                TargetType::Enemy => request.enemy,
            },
        },
        None => Submission::Use {
            action: line.to_string(),
            target: request.enemy,
        },
    }
}

fn narrate(verb: &'static str) -> AnimationFn {
    Box::new(move |cue: &AnimationCue, on_complete: Completion<()>| {
        println!("  * {} {verb} {} *", cue.caster, cue.target);
        on_complete.done();
    })
}

pub(crate) fn animations() -> AnimationTable {
    let mut table = AnimationTable::new();
    table.register("spin", narrate("spins into"));
    table.register("glob", narrate("hurls a glob at"));
    table
}

/// Stands in for a renderer: reports each layer draw to the log.
#[derive(Default)]
pub(crate) struct LoggingSurface {
    pub(crate) draw_count: usize,
}

impl MapSurface for LoggingSurface {
    fn draw_image(&mut self, layer: MapLayer, src: &str, x: i32, y: i32) {
        self.draw_count += 1;
        debug!(layer = ?layer, src, x, y, "draw_image");
    }
}
