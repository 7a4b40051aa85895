//! User settings: the monthly budget and colour theme.

mod core;
mod settings_page;

pub use core::{Settings, SettingsPatch, create_settings_table, get_settings, save_settings};
pub use settings_page::{get_settings_page, save_settings_endpoint};

#[cfg(test)]
pub(crate) use core::Theme;
#[cfg(test)]
pub(crate) use settings_page::{SettingsForm, SettingsState};
