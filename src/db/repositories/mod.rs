mod countdowns;
mod widget_slots;

#[cfg(test)]
mod tests;
