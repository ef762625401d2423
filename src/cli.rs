use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::db::WidgetSlot;
use crate::widget::ViewStyle;

/// Track named date ranges and how far through them you are.
#[derive(Parser, Debug)]
#[command(name = "remaining", version, about)]
pub struct Cli {
    /// Database file shared with widgets. Defaults to the platform data dir.
    #[arg(long, global = true, env = "REMAINING_DB")]
    pub db: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log progress to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show every countdown with its progress.
    List {
        /// Compute progress as of this date instead of today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Create a countdown.
    Add {
        #[arg(short, long, default_value = "")]
        title: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// Gradient name (see `gradients`).
        #[arg(long)]
        gradient: Option<String>,
        /// Show on the primary widget.
        #[arg(long)]
        primary: bool,
        /// Show on the secondary widget.
        #[arg(long)]
        secondary: bool,
    },

    /// Change fields of a countdown.
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        gradient: Option<String>,
        #[arg(long)]
        primary: Option<bool>,
        #[arg(long)]
        secondary: Option<bool>,
    },

    /// Delete a countdown permanently.
    Delete { id: String },

    /// Set the list order to exactly these ids.
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Move the countdowns at the given list positions before position `to`.
    Move {
        #[arg(long = "from", required = true, num_args = 1..)]
        from: Vec<usize>,
        #[arg(long)]
        to: usize,
    },

    /// Show a countdown on a widget, replacing whatever was there.
    Select {
        id: String,
        #[arg(long, value_enum, default_value_t = SlotArg::Primary)]
        slot: SlotArg,
    },

    /// Take a countdown off a widget.
    Deselect {
        id: String,
        #[arg(long, value_enum, default_value_t = SlotArg::Primary)]
        slot: SlotArg,
    },

    /// Print the widget timeline the widget extension would render.
    Widget {
        /// Override the configured view style.
        #[arg(long, value_enum)]
        style: Option<StyleArg>,
    },

    /// Print the timeline chart model.
    Chart {
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// List available gradients.
    Gradients,

    /// Show or change settings.
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Re-read the store and signal widgets to refresh.
    Refresh,

    /// Stay running, refresh widgets after every midnight, print signals.
    Watch,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    Show,
    ViewStyle {
        #[arg(value_enum)]
        style: StyleArg,
    },
    DateFormat { format: String },
    DefaultGradient { name: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotArg {
    Primary,
    Secondary,
}

impl From<SlotArg> for WidgetSlot {
    fn from(value: SlotArg) -> Self {
        match value {
            SlotArg::Primary => WidgetSlot::Primary,
            SlotArg::Secondary => WidgetSlot::Secondary,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleArg {
    Single,
    Double,
}

impl From<StyleArg> for ViewStyle {
    fn from(value: StyleArg) -> Self {
        match value {
            StyleArg::Single => ViewStyle::SingleProgressBar,
            StyleArg::Double => ViewStyle::DoubleProgressBar,
        }
    }
}
