#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::{env::current_exe, io::stdout, path::PathBuf};

use backend::{ConnectionStatus, DeviceState, Settings, device_state_receiver, query_settings};
use dioxus::{
    desktop::{
        WindowBuilder,
        wry::dpi::{PhysicalSize, Size},
    },
    prelude::*,
};
use fern::Dispatch;
use log::LevelFilter;
use tokio::sync::broadcast::error::RecvError;

use crate::{
    components::indicator::Indicator, dashboard::DashboardScreen, settings::SettingsScreen,
};

mod components;
mod dashboard;
mod settings;
mod surface;

const TAILWIND_CSS: Asset = asset!("/public/tailwind.css");

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Screen {
    Dashboard,
    Settings,
}

impl Screen {
    const ALL: [Screen; 2] = [Screen::Dashboard, Screen::Settings];

    fn title(self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::Settings => "Settings",
        }
    }
}

fn main() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_path = current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("log.txt")))
        .unwrap_or_else(|| PathBuf::from("log.txt"));
    let mut dispatch = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(stdout());
    match fern::log_file(&log_path) {
        Ok(file) => dispatch = dispatch.chain(file),
        Err(err) => eprintln!("cannot open {}: {err}", log_path.display()),
    }
    if let Err(err) = dispatch.apply() {
        eprintln!("cannot install logger: {err}");
    }
    log_panics::init();

    backend::init();
    let window = WindowBuilder::new()
        .with_drag_and_drop(false)
        .with_inner_size(Size::new(PhysicalSize::new(1100, 720)))
        .with_min_inner_size(Size::new(PhysicalSize::new(480, 480)))
        .with_title("Tracker Dashboard");
    let cfg = dioxus::desktop::Config::default()
        .with_menu(None)
        .with_window(window);
    dioxus::LaunchBuilder::desktop().with_cfg(cfg).launch(App);
}

#[derive(Clone, Copy)]
pub struct AppState {
    settings: Signal<Option<Settings>>,
    /// Latest state published by the status poller, `None` until the first poll.
    device: Signal<Option<DeviceState>>,
}

#[component]
fn App() -> Element {
    let mut screen = use_signal(|| Screen::Dashboard);
    let mut settings = use_signal(|| None);
    let mut device = use_signal(|| None);

    use_context_provider(|| AppState { settings, device });

    use_future(move || async move {
        settings.set(Some(query_settings().await));
    });
    use_future(move || async move {
        let mut receiver = device_state_receiver().await;
        loop {
            match receiver.recv().await {
                Ok(state) => device.set(Some(state)),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    rsx! {
        document::Link { rel: "stylesheet", href: TAILWIND_CSS }
        if settings().is_some() {
            div { class: "flex flex-col h-full min-h-120 bg-primary-surface",
                div { class: "flex items-center h-12 pr-4",
                    ScreenBar {
                        selected: screen(),
                        on_select: move |selected| {
                            screen.set(selected);
                        },
                    }
                    div { class: "flex-grow" }
                    ConnectionIndicator {}
                }
                div { class: "relative flex-grow w-full overflow-x-hidden overflow-y-auto px-2",
                    match screen() {
                        Screen::Dashboard => rsx! {
                            DashboardScreen {}
                        },
                        Screen::Settings => rsx! {
                            SettingsScreen {}
                        },
                    }
                }
            }
        } else {
            div { class: "flex items-center justify-center h-full text-sm text-secondary-text",
                "Loading settings..."
            }
        }
    }
}

#[component]
fn ConnectionIndicator() -> Element {
    let device = use_context::<AppState>().device;
    let status = use_memo(move || {
        device()
            .map(|state| state.connection())
            .unwrap_or(ConnectionStatus::Disconnected)
    });

    rsx! {
        Indicator {
            label: "Controller",
            on: status() == ConnectionStatus::Connected,
            text: status().to_string(),
        }
    }
}

#[component]
fn ScreenBar(selected: Screen, on_select: Callback<Screen>) -> Element {
    rsx! {
        nav { class: "flex flex-row h-full px-2 gap-1",
            for screen in Screen::ALL {
                button {
                    class: "px-3 h-full border-b-2 border-transparent hover:bg-secondary-surface data-[selected=true]:border-active-border",
                    "data-selected": screen == selected,
                    onclick: move |_| {
                        if screen != selected {
                            on_select(screen);
                        }
                    },
                    span { class: "text-sm text-primary-text font-medium", {screen.title()} }
                }
            }
        }
    }
}
