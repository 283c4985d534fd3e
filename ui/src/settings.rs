use backend::{Settings, update_settings, upsert_settings};
use dioxus::prelude::*;
use futures_util::StreamExt;
use log::info;

use crate::{
    AppState,
    components::{
        button::{Button, ButtonStyle},
        checkbox::Checkbox,
        labeled::Labeled,
        numbers::{MillisInput, NumberInput},
        section::Section,
        text::TextInput,
    },
};

#[derive(Debug)]
enum SettingsUpdate {
    Update(Settings),
}

#[derive(PartialEq, Clone)]
struct SettingsContext {
    settings: Memo<Settings>,
    save_settings: Callback<Settings>,
}

#[component]
pub fn SettingsScreen() -> Element {
    let mut settings = use_context::<AppState>().settings;
    let settings_view = use_memo(move || settings().unwrap_or_default());

    // Persists first then applies to the backend so both agree on the stored row
    let coroutine = use_coroutine(
        move |mut rx: UnboundedReceiver<SettingsUpdate>| async move {
            while let Some(message) = rx.next().await {
                match message {
                    SettingsUpdate::Update(new_settings) => {
                        let saved = upsert_settings(new_settings).await;
                        update_settings(saved.clone()).await;
                        settings.set(Some(saved));
                    }
                }
            }
        },
    );

    let save_settings = use_callback(move |new_settings: Settings| {
        coroutine.send(SettingsUpdate::Update(new_settings));
    });

    use_context_provider(|| SettingsContext {
        settings: settings_view,
        save_settings,
    });

    rsx! {
        div { class: "flex flex-col h-full overflow-y-auto py-2",
            SectionController {}
            SectionSelection {}
            SectionOthers {}
        }
    }
}

#[component]
fn SectionController() -> Element {
    let context = use_context::<SettingsContext>();
    let settings = context.settings;
    let save_settings = context.save_settings;

    rsx! {
        Section { title: "Controller",
            SettingsTextInput {
                text_label: "URL",
                button_label: "Apply",
                hint: "Commands, telemetry and the video feed are requested from this address",
                on_value: move |controller_url: String| {
                    let controller_url = controller_url.trim().to_string();
                    if controller_url.is_empty() {
                        return;
                    }
                    info!(target: "settings", "controller url changed to {controller_url}");
                    save_settings(Settings {
                        controller_url,
                        ..settings.peek().clone()
                    });
                },
                value: settings().controller_url,
            }
            div { class: "grid grid-cols-2 gap-3",
                SettingsMillisInput {
                    label: "Status interval",
                    min: 100,
                    max: 60_000,
                    on_value: move |status_interval_millis| {
                        save_settings(Settings {
                            status_interval_millis,
                            ..settings.peek().clone()
                        });
                    },
                    value: settings().status_interval_millis,
                }
                SettingsMillisInput {
                    label: "Request timeout",
                    min: 100,
                    max: 60_000,
                    on_value: move |request_timeout_millis| {
                        save_settings(Settings {
                            request_timeout_millis,
                            ..settings.peek().clone()
                        });
                    },
                    value: settings().request_timeout_millis,
                }
            }
        }
    }
}

#[component]
fn SectionSelection() -> Element {
    let context = use_context::<SettingsContext>();
    let settings = context.settings;
    let save_settings = context.save_settings;

    rsx! {
        Section { title: "Selection",
            div { class: "grid grid-cols-2 gap-3",
                Labeled { label: "Empty selections",
                    Checkbox {
                        text: "Ignore selections without area",
                        on_checked: move |ignore_empty_selection| {
                            save_settings(Settings {
                                ignore_empty_selection,
                                ..settings.peek().clone()
                            });
                        },
                        checked: settings().ignore_empty_selection,
                    }
                }
                Labeled { label: "Minimum size",
                    NumberInput::<f64> {
                        value: settings().min_selection_size,
                        min: 0.0,
                        max: 1000.0,
                        suffix: "px",
                        on_value: move |min_selection_size| {
                            save_settings(Settings {
                                min_selection_size,
                                ..settings.peek().clone()
                            });
                        },
                    }
                }
            }
        }
    }
}

#[component]
fn SectionOthers() -> Element {
    let context = use_context::<SettingsContext>();
    let settings = context.settings;
    let save_settings = context.save_settings;

    rsx! {
        Section { title: "Others",
            Button {
                class: "w-40",
                style: ButtonStyle::Danger,
                on_click: move |_| {
                    save_settings(Settings {
                        id: settings.peek().id,
                        ..Settings::default()
                    });
                },
                "Reset to defaults"
            }
        }
    }
}

#[component]
fn SettingsMillisInput(
    label: &'static str,
    value: u64,
    min: u64,
    max: u64,
    on_value: Callback<u64>,
) -> Element {
    rsx! {
        Labeled { label,
            MillisInput { value, min, max, on_value }
        }
    }
}

#[component]
fn SettingsTextInput(
    text_label: String,
    button_label: String,
    #[props(default)] hint: Option<String>,
    on_value: Callback<String>,
    value: String,
) -> Element {
    let mut text = use_signal(String::default);

    use_effect(use_reactive!(|value| text.set(value)));

    rsx! {
        div { class: "grid grid-cols-[1fr_auto] gap-3",
            Labeled { label: text_label, hint,
                TextInput {
                    class: "h-6",
                    on_value: move |new_text| {
                        text.set(new_text);
                    },
                    on_commit: move |committed: String| {
                        on_value(committed);
                    },
                    value: text(),
                }
            }
            div { class: "flex items-start pt-4",
                Button {
                    class: "w-20",
                    style: ButtonStyle::Primary,
                    on_click: move |_| {
                        on_value(text.peek().clone());
                    },

                    {button_label}
                }
            }
        }
    }
}
