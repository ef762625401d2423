pub mod countdown;

pub use countdown::{
    Countdown, CountdownInput, CountdownPatch, CountdownProgress, WidgetSelection, WidgetSlot,
};
