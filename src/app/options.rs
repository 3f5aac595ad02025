use std::time::Duration;

use crate::domain::{ArrayDefault, InstantiateOptions};

#[derive(Debug, Clone)]
pub struct UiOptions {
    pub tick_rate: Duration,
    pub confirm_exit: bool,
    pub show_help: bool,
    /// Show the live JSON of the document next to the form.
    pub show_mirror: bool,
    pub instantiate: InstantiateOptions,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
            confirm_exit: true,
            show_help: true,
            show_mirror: true,
            instantiate: InstantiateOptions::default(),
        }
    }
}

impl UiOptions {
    pub fn with_help(mut self, show: bool) -> Self {
        self.show_help = show;
        self
    }

    pub fn with_mirror(mut self, show: bool) -> Self {
        self.show_mirror = show;
        self
    }

    pub fn with_confirm_exit(mut self, confirm: bool) -> Self {
        self.confirm_exit = confirm;
        self
    }

    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn with_array_default(mut self, array_default: ArrayDefault) -> Self {
        self.instantiate = self.instantiate.with_array_default(array_default);
        self
    }
}
