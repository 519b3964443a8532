mod settings;

pub use settings::{
    Command, Config, NetworkSettings, NotificationSettings, Settings, UiSettings, UsageSettings,
};
