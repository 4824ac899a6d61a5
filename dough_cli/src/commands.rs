//! Command handlers for the `dough` CLI.

use std::fs;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use dough_core::engine::{Command, RecipeEngine};
use dough_core::errors::DoughError;
use dough_core::library::RecipeBook;
use dough_core::timeline::{generate, TimelineMode, TimelineSettings, TimelineStep};
use serde::Serialize;
use tracing::debug;

use crate::cli::{
    BlendCommands, BlendSaveArgs, CalcArgs, ExportArgs, FormulaArgs, IdArgs, ImportArgs, ListArgs,
    SaveArgs, ShowArgs, TimelineArgs,
};
use crate::context::RuntimeContext;

#[derive(Serialize)]
struct CalcView<'a> {
    mode: String,
    settings: &'a dough_core::Settings,
    recipe: &'a dough_core::Recipe,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build an engine from formula flags, applied as one batch.
fn build_engine(ctx: &RuntimeContext, args: &FormulaArgs) -> Result<RecipeEngine> {
    let mut commands = Vec::new();
    if let Some(unit) = args.starter_unit {
        commands.push(Command::SetStarterUnit(unit));
    }
    let numeric: [(Option<f64>, fn(f64) -> Command); 6] = [
        (args.dough_weight, Command::SetDoughWeight),
        (args.flour_weight, Command::SetFlourWeight),
        (args.hydration, Command::SetHydration),
        (args.salt, Command::SetSalt),
        (args.starter_amount, Command::SetStarterAmount),
        (args.starter_hydration, Command::SetStarterHydration),
    ];
    commands.extend(numeric.into_iter().filter_map(|(value, command)| value.map(command)));

    if let Some(id) = &args.blend {
        let book = ctx.read_book()?;
        let preset = book
            .get_blend(id)
            .ok_or_else(|| DoughError::not_found("Blend", id.as_str()))?;
        commands.push(Command::SetFlourBlend(preset.blend.clone()));
    } else if !args.flour.is_empty() {
        commands.push(Command::SetFlourBlend(args.flour.clone()));
    }
    commands.extend(args.lock.iter().map(|field| Command::SetLock(*field, true)));

    debug!(count = commands.len(), "applying formula flags");
    let mut engine = RecipeEngine::new();
    engine.apply_all(commands).context("invalid formula")?;
    Ok(engine)
}

fn timeline_for(ctx: &RuntimeContext, engine: &RecipeEngine) -> Result<Vec<TimelineStep>> {
    let settings = TimelineSettings {
        room_temp_c: ctx.config.timeline.room_temp_c,
        starter_fed: ctx.config.timeline.starter_fed,
        ..TimelineSettings::default()
    };
    generate(engine.recipe(), &engine.settings().flour_blend, &settings).context("invalid timeline settings")
}

pub fn calc(ctx: &RuntimeContext, args: &CalcArgs) -> Result<()> {
    let engine = build_engine(ctx, &args.formula)?;
    if args.json {
        return print_json(&CalcView {
            mode: engine.solve_mode().to_string(),
            settings: engine.settings(),
            recipe: engine.recipe(),
        });
    }
    print!("{}", engine.recipe().formula_card(engine.settings()));
    println!("\nSolved for: {}", engine.solve_mode());
    Ok(())
}

pub fn timeline(ctx: &RuntimeContext, args: &TimelineArgs) -> Result<()> {
    let engine = build_engine(ctx, &args.formula)?;

    let start_time = match &args.start {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .with_context(|| format!("invalid --start time '{text}', expected RFC 3339"))?,
        None => Local::now().fixed_offset(),
    };
    let settings = TimelineSettings {
        start_time,
        mode: if args.end { TimelineMode::End } else { TimelineMode::Start },
        room_temp_c: args.room_temp.unwrap_or(ctx.config.timeline.room_temp_c),
        starter_fed: !args.starter_unfed && ctx.config.timeline.starter_fed,
    };

    let steps = generate(engine.recipe(), &engine.settings().flour_blend, &settings)
        .context("invalid timeline settings")?;
    if args.json {
        return print_json(&steps);
    }
    for step in &steps {
        println!("{} {}  {}", step.date, step.time, step.step);
        println!("    {}", step.description);
    }
    Ok(())
}

pub fn save(ctx: &RuntimeContext, args: &SaveArgs) -> Result<()> {
    let engine = build_engine(ctx, &args.formula)?;
    let snapshot = engine.snapshot(timeline_for(ctx, &engine)?);

    let id = ctx.edit_book(|book| Ok(book.save_recipe(args.name.clone(), args.notes.clone(), snapshot)))?;
    println!("{id}");
    Ok(())
}

pub fn list(ctx: &RuntimeContext, args: &ListArgs) -> Result<()> {
    let book = ctx.read_book()?;
    let records = book.recipes_by_date();
    if args.json {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("No saved formulas.");
    }
    for record in records {
        println!(
            "{}  {}  {}",
            record.id,
            record.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            record.name
        );
    }
    Ok(())
}

pub fn show(ctx: &RuntimeContext, args: &ShowArgs) -> Result<()> {
    let book = ctx.read_book()?;
    let record = book
        .get_recipe(&args.id)
        .ok_or_else(|| DoughError::not_found("Recipe", args.id.as_str()))?;
    if args.json {
        return print_json(record);
    }

    let mut engine = RecipeEngine::new();
    engine
        .load_recipe(&record.recipe)
        .with_context(|| format!("saved formula {} is invalid", record.id))?;

    println!("{}", record.name);
    if !record.notes.is_empty() {
        println!("{}", record.notes);
    }
    println!();
    print!("{}", engine.recipe().formula_card(engine.settings()));
    Ok(())
}

pub fn delete(ctx: &RuntimeContext, args: &IdArgs) -> Result<()> {
    let removed = ctx.edit_book(|book| {
        book.delete_recipe(&args.id)
            .ok_or_else(|| anyhow!(DoughError::not_found("Recipe", args.id.as_str())))
    })?;
    println!("Deleted {} ({})", removed.id, removed.name);
    Ok(())
}

pub fn export(ctx: &RuntimeContext, args: &ExportArgs) -> Result<()> {
    let json = ctx.read_book()?.export_recipes()?;
    match &args.out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Exported to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn import(ctx: &RuntimeContext, args: &ImportArgs) -> Result<()> {
    let json = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let count = ctx.edit_book(|book| Ok(book.import_recipes(&json, !args.replace)?))?;
    println!("Imported {count} formula(s)");
    Ok(())
}

pub fn blend(ctx: &RuntimeContext, command: &BlendCommands) -> Result<()> {
    match command {
        BlendCommands::Save(args) => blend_save(ctx, args),
        BlendCommands::List(args) => blend_list(&ctx.read_book()?, args),
        BlendCommands::Delete(args) => {
            let removed = ctx.edit_book(|book| {
                book.delete_blend(&args.id)
                    .ok_or_else(|| anyhow!(DoughError::not_found("Blend", args.id.as_str())))
            })?;
            println!("Deleted {} ({})", removed.id, removed.name);
            Ok(())
        }
    }
}

fn blend_save(ctx: &RuntimeContext, args: &BlendSaveArgs) -> Result<()> {
    let id = ctx.edit_book(|book| Ok(book.save_blend(args.name.clone(), args.flour.clone())?))?;
    println!("{id}");
    Ok(())
}

fn blend_list(book: &RecipeBook, args: &ListArgs) -> Result<()> {
    if args.json {
        return print_json(&book.blends);
    }
    if book.blends.is_empty() {
        println!("No blend presets.");
    }
    for preset in book.blends.values() {
        let flours: Vec<String> = preset
            .blend
            .iter()
            .map(|f| format!("{} {}%", f.flour_type.display_name(), dough_core::recipe::round_tenth(f.percentage)))
            .collect();
        println!("{}  {}  {}", preset.id, preset.name, flours.join(", "));
    }
    Ok(())
}
