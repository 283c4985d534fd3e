use dioxus::prelude::*;

const DOT_CLASS: &str = "inline-block size-2 rounded-full bg-inactive-surface data-[on=true]:bg-active-surface";

/// A labeled dot showing whether something is on.
#[component]
pub fn Indicator(
    label: String,
    on: ReadSignal<bool>,
    #[props(default)] text: String,
) -> Element {
    let text = if text.is_empty() {
        if on() { "On" } else { "Off" }.to_string()
    } else {
        text
    };

    rsx! {
        div {
            class: "flex items-center gap-2 h-6 text-xs text-primary-text",
            title: "{label}: {text}",
            span { class: DOT_CLASS, "data-on": on }
            span { class: "font-medium", {label} }
            span { class: "text-secondary-text", {text} }
        }
    }
}
