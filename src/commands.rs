use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use log::info;
use serde::Serialize;
use std::future::Future;
use tokio::sync::broadcast;

use crate::{
    chart::ChartModel,
    cli::{Command, SettingsAction},
    db::{CountdownInput, CountdownPatch, CountdownProgress, WidgetSlot},
    gradient::Gradient,
    progress::today_local,
    settings::{is_valid_date_format, DisplaySettings, WidgetSettings},
    widget::{RefreshReason, RefreshScheduler, WidgetTimeline},
    AppState,
};

const BAR_WIDTH: usize = 30;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_date(date: Option<NaiveDate>, display: &DisplaySettings, today: NaiveDate) -> String {
    let date = date.unwrap_or(today);
    if is_valid_date_format(&display.date_format) {
        date.format(&display.date_format).to_string()
    } else {
        date.format(&DisplaySettings::default().date_format).to_string()
    }
}

fn render_bar(whole_percent: u32) -> String {
    let filled = (whole_percent.min(100) as usize * BAR_WIDTH) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn render_countdown(view: &CountdownProgress, display: &DisplaySettings, today: NaiveDate) -> String {
    let countdown = &view.countdown;
    let progress = &view.progress;
    let markers: String = [(WidgetSlot::Primary, " [widget 1]"), (WidgetSlot::Secondary, " [widget 2]")]
        .into_iter()
        .filter(|(slot, _)| countdown.holds(*slot))
        .map(|(_, marker)| marker)
        .collect();

    format!(
        "{title}{markers}  ({id})\n  → {remaining}  ← {completed}  of {total}\n  {bar} {done}% / {left}%  {gradient}\n  {start} … {end}",
        title = countdown.display_title(),
        id = countdown.id,
        remaining = progress.days_remaining,
        completed = progress.days_completed,
        total = progress.total_days,
        bar = render_bar(progress.whole_percent_complete()),
        done = progress.whole_percent_complete(),
        left = progress.whole_percent_left(),
        gradient = countdown.gradient().name,
        start = format_date(countdown.start_date, display, today),
        end = format_date(countdown.end_date, display, today),
    )
}

fn render_timeline(timeline: &WidgetTimeline) -> String {
    let mut lines = Vec::new();
    for entry in &timeline.entries {
        let mut line = format!(
            "{}  {:?}  {}: → {} ← {} ({}%)",
            entry.date.format("%a %d %H:%M"),
            entry.view_style,
            if entry.primary.title.is_empty() { "-" } else { entry.primary.title.as_str() },
            entry.primary.remaining_days,
            entry.primary.completed_days,
            entry.primary.whole_percent(),
        );
        if let Some(secondary) = &entry.secondary {
            line.push_str(&format!(
                " | {}: → {} ← {} ({}%)",
                secondary.title,
                secondary.remaining_days,
                secondary.completed_days,
                secondary.whole_percent(),
            ));
        }
        lines.push(line);
    }
    lines.push(format!("reload after {}", timeline.reload_after.format("%a %d %H:%M")));
    lines.join("\n")
}

pub async fn dispatch(state: &AppState, command: Command, json: bool) -> Result<()> {
    let store = &state.store;

    match command {
        Command::List { today } => {
            let today = today.unwrap_or_else(today_local);
            let views = store.list_with_progress(today).await?;
            if json {
                return print_json(&views);
            }
            if views.is_empty() {
                println!("No countdowns yet. Create one with `remaining add`.");
            }
            let display = state.settings.display();
            for view in &views {
                println!("{}\n", render_countdown(view, &display, today));
            }
        }
        Command::Add {
            title,
            start,
            end,
            gradient,
            primary,
            secondary,
        } => {
            let gradient_name = gradient
                .unwrap_or_else(|| state.settings.display().default_gradient().name.to_string());
            let countdown = store
                .create(CountdownInput {
                    title,
                    start_date: Some(start),
                    end_date: Some(end),
                    primary_widget: primary,
                    secondary_widget: secondary,
                    gradient_name: Some(gradient_name),
                })
                .await?;
            if json {
                return print_json(&countdown);
            }
            println!("Created {} ({})", countdown.display_title(), countdown.id);
        }
        Command::Edit {
            id,
            title,
            start,
            end,
            gradient,
            primary,
            secondary,
        } => {
            let countdown = store
                .update(
                    &id,
                    CountdownPatch {
                        title,
                        start_date: start,
                        end_date: end,
                        primary_widget: primary,
                        secondary_widget: secondary,
                        gradient_name: gradient,
                    },
                )
                .await?;
            if json {
                return print_json(&countdown);
            }
            println!("Updated {} ({})", countdown.display_title(), countdown.id);
        }
        Command::Delete { id } => {
            store.delete(&id).await?;
            println!("Deleted {id}");
        }
        Command::Reorder { ids } => {
            let countdowns = store.reorder(ids).await?;
            if json {
                return print_json(&countdowns);
            }
            for countdown in &countdowns {
                println!("{}. {} ({})", countdown.order, countdown.display_title(), countdown.id);
            }
        }
        Command::Move { from, to } => {
            let countdowns = store.move_items(&from, to).await?;
            if json {
                return print_json(&countdowns);
            }
            for countdown in &countdowns {
                println!("{}. {} ({})", countdown.order, countdown.display_title(), countdown.id);
            }
        }
        Command::Select { id, slot } => {
            let countdown = store.set_widget_slot(&id, slot.into(), true).await?;
            println!("{} now shows on the {:?} widget", countdown.display_title(), slot);
        }
        Command::Deselect { id, slot } => {
            let countdown = store.set_widget_slot(&id, slot.into(), false).await?;
            println!("{} removed from the {:?} widget", countdown.display_title(), slot);
        }
        Command::Widget { style } => {
            let view_style = style
                .map(Into::into)
                .unwrap_or_else(|| state.settings.widget().view_style);
            let timeline = store.widget_timeline(Local::now(), view_style).await?;
            if json {
                return print_json(&timeline);
            }
            println!("{}", render_timeline(&timeline));
        }
        Command::Chart { today } => {
            let today = today.unwrap_or_else(today_local);
            let model = ChartModel::build(&store.list().await?, today);
            print_json(&model)?;
        }
        Command::Gradients => {
            if json {
                return print_json(&Gradient::all());
            }
            for gradient in Gradient::all() {
                println!(
                    "{:<12} {} → {}",
                    gradient.name,
                    gradient.from.to_hex(),
                    gradient.to.to_hex()
                );
            }
        }
        Command::Settings { action } => {
            run_settings(state, action.unwrap_or(SettingsAction::Show))?;
        }
        Command::Refresh => {
            let count = store.refresh().await?;
            println!("Refreshed widgets for {count} countdown(s)");
        }
        Command::Watch => watch(state).await?,
    }

    Ok(())
}

fn run_settings(state: &AppState, action: SettingsAction) -> Result<()> {
    let settings = &state.settings;
    match action {
        SettingsAction::Show => {}
        SettingsAction::ViewStyle { style } => {
            settings.update_widget(WidgetSettings {
                view_style: style.into(),
            })?;
        }
        SettingsAction::DateFormat { format } => {
            if format.trim().is_empty() || !is_valid_date_format(&format) {
                bail!("invalid date format '{format}'");
            }
            settings.update_display(DisplaySettings {
                date_format: format,
                ..settings.display()
            })?;
        }
        SettingsAction::DefaultGradient { name } => {
            if !Gradient::is_known(&name) {
                bail!("unknown gradient '{name}'");
            }
            settings.update_display(DisplaySettings {
                default_gradient: name,
                ..settings.display()
            })?;
        }
    }

    print_json(&serde_json::json!({
        "path": settings.path(),
        "widget": settings.widget(),
        "display": settings.display(),
    }))
}

async fn watch(state: &AppState) -> Result<()> {
    let signals = state.store.notifier().subscribe();
    let mut scheduler = RefreshScheduler::new();
    watch_until(state, &mut scheduler, signals, tokio::signal::ctrl_c()).await
}

/// Print a fresh timeline for every refresh signal until `shutdown` resolves.
/// The scheduler is stopped on every exit path.
async fn watch_until<F: Future>(
    state: &AppState,
    scheduler: &mut RefreshScheduler,
    mut signals: broadcast::Receiver<RefreshReason>,
    shutdown: F,
) -> Result<()> {
    scheduler.start(state.store.notifier().clone())?;
    info!("Watching for widget refresh signals; press Ctrl-C to stop");
    tokio::pin!(shutdown);

    let outcome: Result<()> = loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Ok(reason) => {
                    let timeline = match state
                        .store
                        .widget_timeline(Local::now(), state.settings.widget().view_style)
                        .await
                    {
                        Ok(timeline) => timeline,
                        Err(err) => break Err(err.into()),
                    };
                    println!("refresh: {reason:?}");
                    println!("{}", render_timeline(&timeline));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    info!("Skipped {skipped} refresh signal(s)");
                }
                Err(broadcast::error::RecvError::Closed) => break Ok(()),
            },
            _ = &mut shutdown => break Ok(()),
        }
    };

    scheduler.stop().await?;
    outcome
}
